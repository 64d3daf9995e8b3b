// `GameView` for the terminal: keeps the served markup as is and renders a text board from it.

use std::collections::HashSet;

use crossterm::style::{self, Stylize};
use enum_map::EnumMap;
use itertools::Itertools;
use latrones_client::clock::secs_to_mss;
use latrones_client::coord::{PixelOffset, Square};
use latrones_client::display::{GameView, Highlight};
use latrones_client::error::ViewError;
use latrones_client::force::Force;
use latrones_client::game::GameState;
use latrones_client::markup;
use latrones_client::piece::{BoardSnapshot, PieceSnapshot};
use latrones_client::settings::{GameSettings, SettingsForm};


// Width of a rendered square, in characters. Only used to make up pixel offsets.
pub const CELL_WIDTH: f64 = 3.0;

pub fn square_offset(square: Square) -> PixelOffset {
    PixelOffset::new(square.x as f64 * CELL_WIDTH, square.y as f64)
}

pub struct TerminalView {
    settings_markup: String,
    board_markup: String,
    pub form: SettingsForm,
    // Whether a restart during a running game was confirmed up front.
    pub restart_confirmed: bool,
    pub restart_refused: bool,
    clocks: EnumMap<Force, String>,
    turn: Option<Force>,
    banner: String,
    error: Option<String>,
    time_preview: String,
    board_size_preview: String,
    started: bool,
    highlights: HashSet<(Square, Highlight)>,
    gliding: Option<Square>,
}

impl TerminalView {
    pub fn new(page: &str) -> Result<Self, ViewError> {
        Ok(TerminalView {
            settings_markup: page.to_owned(),
            board_markup: page.to_owned(),
            form: markup::read_settings_form(page)?,
            restart_confirmed: false,
            restart_refused: false,
            clocks: EnumMap::default(),
            turn: None,
            banner: String::new(),
            error: None,
            time_preview: String::new(),
            board_size_preview: String::new(),
            started: false,
            highlights: HashSet::new(),
            gliding: None,
        })
    }

    pub fn has_highlight(&self, square: Square, highlight: Highlight) -> bool {
        self.highlights.contains(&(square, highlight))
    }

    fn render_square(&self, square: Square, piece: Option<&PieceSnapshot>) -> String {
        let text = match piece {
            _ if self.gliding == Some(square) => " ~ ".to_owned(),
            Some(piece) => {
                let symbol = match (piece.force(), piece.king) {
                    (Force::Light, false) => 'o',
                    (Force::Light, true) => 'O',
                    (Force::Dark, false) => 'x',
                    (Force::Dark, true) => 'X',
                };
                format!(" {symbol} ")
            }
            None => "   ".to_owned(),
        };
        let background = if self.has_highlight(square, Highlight::Selected) {
            style::Color::DarkYellow
        } else if self.has_highlight(square, Highlight::OptionalMove) {
            style::Color::DarkGreen
        } else if self.has_highlight(square, Highlight::Hovered) {
            style::Color::DarkCyan
        } else if (square.x + square.y) % 2 == 1 {
            style::Color::DarkGrey
        } else {
            style::Color::Grey
        };
        let foreground = match piece.map(|p| p.force()) {
            Some(Force::Light) => style::Color::White,
            _ => style::Color::Black,
        };
        text.with(foreground).on(background).to_string()
    }

    pub fn render_board(&self, board: &BoardSnapshot) -> String {
        let header = (0..board.size_x).map(|x| format!("{x:^3}")).join("");
        let rows = (0..board.size_y).map(|y| {
            let squares = (0..board.size_x)
                .map(|x| {
                    let square = Square::new(x, y);
                    self.render_square(square, board.piece_at(square))
                })
                .join("");
            format!("{y:>2} {squares}")
        });
        std::iter::once(format!("   {header}")).chain(rows).join("\n")
    }

    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        let clock = |force: Force| {
            let text = format!("{}: {}", force.display_name(), self.clocks[force]);
            if self.turn == Some(force) { text.bold().to_string() } else { text }
        };
        lines.push(clock(Force::Dark));
        match markup::read_board(&self.board_markup) {
            Ok(board) => lines.push(self.render_board(&board)),
            Err(err) => lines.push(format!("Cannot show the board: {err}").red().to_string()),
        }
        lines.push(clock(Force::Light));
        if !self.banner.is_empty() {
            lines.push(self.banner.clone().magenta().to_string());
        }
        if !self.started {
            lines.push("Type \"start\" to begin.".to_owned());
        }
        lines.push(format!(
            "Next game: {} ({}), board {}, you play {}, bot {}",
            self.form.game_time_seconds,
            self.time_preview,
            self.board_size_preview,
            self.form.user_color,
            self.form.play_against_bot
        ));
        if let Some(ref error) = self.error {
            lines.push(error.clone().red().to_string());
        }
        if self.restart_refused {
            lines.push("Game in progress: type \"restart!\" to abandon it.".yellow().to_string());
        }
        lines.join("\n")
    }
}

impl GameView for TerminalView {
    fn board(&self) -> Result<BoardSnapshot, ViewError> { markup::read_board(&self.board_markup) }
    fn game_state(&self) -> Result<GameState, ViewError> {
        markup::read_game_state(&self.board_markup)
    }
    fn game_settings(&self) -> Result<GameSettings, ViewError> {
        markup::read_game_settings(&self.settings_markup)
    }
    fn settings_form(&self) -> Result<SettingsForm, ViewError> { Ok(self.form.clone()) }

    fn replace_board(&mut self, fragment: &str) -> Result<(), ViewError> {
        self.board_markup = fragment.to_owned();
        self.gliding = None;
        Ok(())
    }
    fn replace_page(&mut self, page: &str) -> Result<(), ViewError> {
        self.settings_markup = page.to_owned();
        self.board_markup = page.to_owned();
        self.gliding = None;
        self.started = false;
        Ok(())
    }

    fn show_settings(&mut self, settings: &GameSettings) -> Result<(), ViewError> {
        self.form = settings.to_form();
        self.time_preview = secs_to_mss(settings.time_budget_seconds.into());
        self.show_board_size_preview(settings.board_size)
    }
    fn show_time_preview(&mut self, text: &str) -> Result<(), ViewError> {
        self.time_preview = text.to_owned();
        Ok(())
    }
    fn show_board_size_preview(&mut self, size: u32) -> Result<(), ViewError> {
        self.board_size_preview = format!("{size}x{size}");
        Ok(())
    }
    fn show_clock(&mut self, force: Force, text: &str) -> Result<(), ViewError> {
        self.clocks[force] = text.to_owned();
        Ok(())
    }
    fn show_turn(&mut self, active: Option<Force>) -> Result<(), ViewError> {
        self.turn = active;
        Ok(())
    }
    fn show_winner(&mut self, banner: &str) -> Result<(), ViewError> {
        self.banner = banner.to_owned();
        Ok(())
    }
    fn show_error(&mut self, message: Option<&str>) -> Result<(), ViewError> {
        self.error = message.map(str::to_owned);
        Ok(())
    }
    fn hide_start_overlay(&mut self) -> Result<(), ViewError> {
        self.started = true;
        Ok(())
    }

    fn set_highlight(&mut self, square: Square, highlight: Highlight, on: bool)
        -> Result<(), ViewError>
    {
        if on {
            self.highlights.insert((square, highlight));
        } else {
            self.highlights.remove(&(square, highlight));
        }
        Ok(())
    }
    fn clear_highlight(&mut self, highlight: Highlight) -> Result<(), ViewError> {
        self.highlights.retain(|&(_, h)| h != highlight);
        Ok(())
    }
    fn glide_piece(&mut self, from: Square, translation: Option<(f64, f64)>)
        -> Result<(), ViewError>
    {
        self.gliding = translation.map(|_| from);
        Ok(())
    }

    fn confirm_restart(&mut self) -> bool {
        self.restart_refused = !self.restart_confirmed;
        !self.restart_refused
    }
}


#[cfg(test)]
mod tests {
    use latrones_client::test_util::{render_board, starting_board, starting_page};

    use super::*;

    #[test]
    fn reads_served_markup() {
        let settings = GameSettings { board_size: 6, ..GameSettings::default() };
        let mut view = TerminalView::new(&starting_page(&settings)).unwrap();
        assert_eq!(view.game_settings().unwrap(), settings);
        assert_eq!(view.board().unwrap(), starting_board(6));

        let state = GameState { current_turn: Force::Dark, winner: None };
        view.replace_board(&render_board(&starting_board(6), &state)).unwrap();
        assert_eq!(view.game_state().unwrap(), state);
    }

    #[test]
    fn restart_needs_explicit_confirmation() {
        let mut view = TerminalView::new(&starting_page(&GameSettings::default())).unwrap();
        assert!(!view.confirm_restart());
        assert!(view.render().contains("restart!"));
        view.restart_confirmed = true;
        assert!(view.confirm_restart());
    }
}
