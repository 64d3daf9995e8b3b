use std::fmt;

use enum_map::Enum;
use serde::{Deserialize, Serialize};
use strum::EnumIter;


// The server calls these "colors": light moves first and is shown as white.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Enum, EnumIter, Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Force {
    Light,
    Dark,
}

impl Force {
    pub fn opponent(self) -> Force {
        match self {
            Force::Light => Force::Dark,
            Force::Dark => Force::Light,
        }
    }

    pub fn to_wire(self) -> &'static str {
        match self {
            Force::Light => "light",
            Force::Dark => "dark",
        }
    }

    pub fn from_wire(s: &str) -> Option<Force> {
        match s.trim() {
            "light" => Some(Force::Light),
            "dark" => Some(Force::Dark),
            _ => None,
        }
    }

    // Name used in user-facing texts.
    pub fn display_name(self) -> &'static str {
        match self {
            Force::Light => "White",
            Force::Dark => "Black",
        }
    }
}

impl fmt::Display for Force {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.to_wire()) }
}
