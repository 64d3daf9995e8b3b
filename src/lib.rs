#![forbid(unsafe_code)]
#![cfg_attr(feature = "strict", deny(warnings))]

pub mod bot;
pub mod client;
pub mod clock;
pub mod coord;
pub mod display;
pub mod error;
pub mod force;
pub mod game;
pub mod interaction;
pub mod markup;
pub mod piece;
pub mod protocol;
pub mod settings;
pub mod test_util;
pub mod timer;
pub mod util;
