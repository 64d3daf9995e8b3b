use crate::coord::Square;
use crate::error::ViewError;
use crate::force::Force;
use crate::game::{GameState, winner_banner};
use crate::piece::BoardSnapshot;
use crate::settings::{GameSettings, SettingsForm};


#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Highlight {
    Hovered,
    Selected,
    // A legal destination for the selected piece.
    OptionalMove,
}

// Presentation layer. Markup itself always comes from the server: implementations only swap it
// in, toggle highlights and fill in texts.
pub trait GameView {
    // Pieces and board dimensions as currently rendered.
    fn board(&self) -> Result<BoardSnapshot, ViewError>;
    // Page-level authoritative state, refreshed by every server render.
    fn game_state(&self) -> Result<GameState, ViewError>;
    // Page-level settings the current game was started with.
    fn game_settings(&self) -> Result<GameSettings, ViewError>;
    // Current values of the settings inputs.
    fn settings_form(&self) -> Result<SettingsForm, ViewError>;

    fn replace_board(&mut self, fragment: &str) -> Result<(), ViewError>;
    fn replace_page(&mut self, markup: &str) -> Result<(), ViewError>;

    fn show_settings(&mut self, settings: &GameSettings) -> Result<(), ViewError>;
    fn show_time_preview(&mut self, text: &str) -> Result<(), ViewError>;
    fn show_board_size_preview(&mut self, size: u32) -> Result<(), ViewError>;
    fn show_clock(&mut self, force: Force, text: &str) -> Result<(), ViewError>;
    // `None` hides both indicators.
    fn show_turn(&mut self, active: Option<Force>) -> Result<(), ViewError>;
    fn show_winner(&mut self, banner: &str) -> Result<(), ViewError>;
    fn show_error(&mut self, message: Option<&str>) -> Result<(), ViewError>;
    fn hide_start_overlay(&mut self) -> Result<(), ViewError>;

    fn set_highlight(&mut self, square: Square, highlight: Highlight, on: bool)
        -> Result<(), ViewError>;
    fn clear_highlight(&mut self, highlight: Highlight) -> Result<(), ViewError>;
    // Starts moving the piece on `from` by `(dx, dy)` pixels; `None` puts it back.
    fn glide_piece(&mut self, from: Square, translation: Option<(f64, f64)>)
        -> Result<(), ViewError>;

    fn confirm_restart(&mut self) -> bool;
}

// Reflects authoritative state: at most one lit indicator, and the banner once decided.
pub fn sync_turn_display(view: &mut impl GameView, state: &GameState) -> Result<(), ViewError> {
    view.show_turn(state.active_force())?;
    view.show_winner(&winner_banner(state.winner))
}
