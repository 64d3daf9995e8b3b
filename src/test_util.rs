// Test utilities shared by unit tests and the "tests" folder: a view that works on markup strings
// instead of a DOM, page rendering in the server's format, and a host that keeps track of
// requests and timers the way a browser would.

use std::collections::{HashMap, HashSet};
use std::sync::mpsc;

use enum_map::EnumMap;
use itertools::Itertools;

use crate::client::{GameController, NotableEvent};
use crate::coord::{PixelOffset, Square};
use crate::display::{GameView, Highlight};
use crate::error::ViewError;
use crate::force::Force;
use crate::game::GameState;
use crate::markup;
use crate::piece::{BoardSnapshot, PieceColor, PieceSnapshot};
use crate::protocol::OutgoingRequest;
use crate::settings::{GameSettings, SettingsForm};
use crate::timer::{TimerCommand, TimerHandle};


pub const SQUARE_SIZE_PX: f64 = 50.0;

pub fn square_offset(square: Square) -> PixelOffset {
    PixelOffset::new(square.x as f64 * SQUARE_SIZE_PX, square.y as f64 * SQUARE_SIZE_PX)
}

pub fn piece(x: u32, y: u32, force: Force) -> PieceSnapshot {
    PieceSnapshot { x, y, color: PieceColor::of_force(force), king: false }
}

pub fn render_game_state(state: &GameState) -> String {
    let winner = state.winner.map_or("None", |force| force.to_wire());
    format!(
        r#"<div id="{}" data-current-turn="{}" data-winner="{}"></div>"#,
        markup::GAME_STATE_ID,
        state.current_turn.to_wire(),
        winner
    )
}

// Board fragment as returned by "/move" and "/move_bot".
pub fn render_board(board: &BoardSnapshot, state: &GameState) -> String {
    let rows = (0..board.size_y)
        .map(|y| {
            let squares = (0..board.size_x)
                .map(|x| {
                    let square = Square::new(x, y);
                    let piece = board.piece_at(square).map_or(String::new(), |p| {
                        let color_class = match p.color {
                            PieceColor::LightPiece => markup::LIGHT_PIECE_CLASS,
                            PieceColor::DarkPiece => markup::DARK_PIECE_CLASS,
                        };
                        let king_class = if p.king { markup::KING_CLASS } else { "" };
                        format!(
                            r#"<div class="{} {} {}"></div>"#,
                            markup::PIECE_CLASS,
                            color_class,
                            king_class
                        )
                    });
                    format!(
                        r#"<td class="{}" data-x="{}" data-y="{}">{}</td>"#,
                        markup::SQUARE_CLASS,
                        x,
                        y,
                        piece
                    )
                })
                .join("");
            format!("<tr>{squares}</tr>")
        })
        .join("\n");
    format!("{}\n<table class=\"board\">\n{}\n</table>", render_game_state(state), rows)
}

pub fn render_settings(settings: &GameSettings) -> String {
    let form = settings.to_form();
    format!(
        r#"<div id="{}" data-game-time-seconds="{}" data-board-size="{}" data-user-color="{}" data-play-against-bot="{}"></div>"#,
        markup::GAME_SETTINGS_ID,
        form.game_time_seconds,
        form.board_size,
        form.user_color,
        form.play_against_bot
    )
}

// Full page as returned by "/restart".
pub fn render_page(settings: &GameSettings, board: &BoardSnapshot, state: &GameState) -> String {
    format!(
        "<html><body>\n{}\n<div id=\"board_with_figures_id\">\n{}\n</div>\n</body></html>",
        render_settings(settings),
        render_board(board, state)
    )
}

// Two rows of pieces for each side, on dark squares only.
pub fn starting_board(size: u32) -> BoardSnapshot {
    let pieces = (0..size)
        .cartesian_product(0..size)
        .filter(|(y, x)| (x + y) % 2 == 1)
        .filter_map(|(y, x)| {
            if y < 2 {
                Some(piece(x, y, Force::Dark))
            } else if y + 2 >= size {
                Some(piece(x, y, Force::Light))
            } else {
                None
            }
        })
        .collect();
    BoardSnapshot { size_x: size, size_y: size, pieces }
}

pub fn starting_page(settings: &GameSettings) -> String {
    render_page(settings, &starting_board(settings.board_size), &GameState::new_game())
}

// `GameView` over markup strings that remembers everything shown to the user.
pub struct RecordingView {
    settings_markup: String,
    board_markup: String,
    pub form: SettingsForm,
    pub confirm_answer: bool,
    pub confirm_requests: usize,
    pub shown_settings: Option<GameSettings>,
    pub time_preview: Option<String>,
    pub board_size_preview: Option<u32>,
    pub clocks: EnumMap<Force, String>,
    pub turn: Option<Force>,
    pub banner: String,
    pub error: Option<String>,
    pub start_overlay_visible: bool,
    pub highlights: HashSet<(Square, Highlight)>,
    pub glides: HashMap<Square, (f64, f64)>,
    pub board_swaps: usize,
}

impl RecordingView {
    pub fn new(page: &str) -> Result<Self, ViewError> {
        Ok(RecordingView {
            settings_markup: page.to_owned(),
            board_markup: page.to_owned(),
            form: markup::read_settings_form(page)?,
            confirm_answer: true,
            confirm_requests: 0,
            shown_settings: None,
            time_preview: None,
            board_size_preview: None,
            clocks: EnumMap::default(),
            turn: None,
            banner: String::new(),
            error: None,
            start_overlay_visible: true,
            highlights: HashSet::new(),
            glides: HashMap::new(),
            board_swaps: 0,
        })
    }

    pub fn highlighted(&self, highlight: Highlight) -> Vec<Square> {
        self.highlights
            .iter()
            .filter(|(_, h)| *h == highlight)
            .map(|(square, _)| *square)
            .sorted()
            .collect()
    }
}

impl GameView for RecordingView {
    fn board(&self) -> Result<BoardSnapshot, ViewError> { markup::read_board(&self.board_markup) }
    fn game_state(&self) -> Result<GameState, ViewError> {
        markup::read_game_state(&self.board_markup)
    }
    fn game_settings(&self) -> Result<GameSettings, ViewError> {
        markup::read_game_settings(&self.settings_markup)
    }
    fn settings_form(&self) -> Result<SettingsForm, ViewError> { Ok(self.form.clone()) }

    fn replace_board(&mut self, fragment: &str) -> Result<(), ViewError> {
        markup::read_board(fragment)?;
        self.board_markup = fragment.to_owned();
        self.glides.clear();
        self.board_swaps += 1;
        Ok(())
    }

    fn replace_page(&mut self, page: &str) -> Result<(), ViewError> {
        self.form = markup::read_settings_form(page)?;
        self.settings_markup = page.to_owned();
        self.board_markup = page.to_owned();
        self.glides.clear();
        self.highlights.clear();
        self.start_overlay_visible = true;
        Ok(())
    }

    fn show_settings(&mut self, settings: &GameSettings) -> Result<(), ViewError> {
        self.shown_settings = Some(settings.clone());
        Ok(())
    }
    fn show_time_preview(&mut self, text: &str) -> Result<(), ViewError> {
        self.time_preview = Some(text.to_owned());
        Ok(())
    }
    fn show_board_size_preview(&mut self, size: u32) -> Result<(), ViewError> {
        self.board_size_preview = Some(size);
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
        self.start_overlay_visible = false;
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
        self.highlights.retain(|(_, h)| *h != highlight);
        Ok(())
    }
    fn glide_piece(&mut self, from: Square, translation: Option<(f64, f64)>)
        -> Result<(), ViewError>
    {
        match translation {
            Some(translation) => self.glides.insert(from, translation),
            None => self.glides.remove(&from),
        };
        Ok(())
    }

    fn confirm_restart(&mut self) -> bool {
        self.confirm_requests += 1;
        self.confirm_answer
    }
}

// Plays the role of the browser: collects requests and keeps track of live timers.
pub struct TestHost {
    pub controller: GameController<RecordingView>,
    requests_rx: mpsc::Receiver<OutgoingRequest>,
    timer_commands_rx: mpsc::Receiver<TimerCommand>,
    intervals: Vec<TimerHandle>,
    timeouts: Vec<TimerHandle>,
}

impl TestHost {
    pub fn new(page: &str) -> Self {
        let (requests_tx, requests_rx) = mpsc::channel();
        let (timer_commands_tx, timer_commands_rx) = mpsc::channel();
        let view = RecordingView::new(page).unwrap();
        let controller = GameController::new(view, requests_tx, timer_commands_tx).unwrap();
        let mut host = TestHost {
            controller,
            requests_rx,
            timer_commands_rx,
            intervals: Vec::new(),
            timeouts: Vec::new(),
        };
        host.process_timer_commands();
        host
    }

    pub fn with_settings(settings: &GameSettings) -> Self { Self::new(&starting_page(settings)) }

    pub fn view(&self) -> &RecordingView { self.controller.view() }
    pub fn view_mut(&mut self) -> &mut RecordingView { self.controller.view_mut() }

    pub fn requests(&mut self) -> Vec<OutgoingRequest> { self.requests_rx.try_iter().collect() }

    pub fn events(&mut self) -> Vec<NotableEvent> {
        std::iter::from_fn(|| self.controller.next_notable_event()).collect()
    }

    pub fn live_intervals(&mut self) -> Vec<TimerHandle> {
        self.process_timer_commands();
        self.intervals.clone()
    }

    pub fn live_timeouts(&mut self) -> Vec<TimerHandle> {
        self.process_timer_commands();
        self.timeouts.clone()
    }

    pub fn click(&mut self, x: u32, y: u32) {
        let square = Square::new(x, y);
        self.controller.on_square_click(square, square_offset(square)).unwrap();
    }

    // Fires every live interval once per second, `secs` times.
    pub fn advance_clock(&mut self, secs: u32) {
        for _ in 0..secs {
            for handle in self.live_intervals() {
                self.controller.on_timer(handle).unwrap();
            }
        }
        self.process_timer_commands();
    }

    pub fn fire_timeouts(&mut self) {
        for handle in self.live_timeouts() {
            self.timeouts.retain(|&h| h != handle);
            self.controller.on_timer(handle).unwrap();
        }
        self.process_timer_commands();
    }

    fn process_timer_commands(&mut self) {
        for command in self.timer_commands_rx.try_iter() {
            match command {
                TimerCommand::StartInterval { handle, .. } => self.intervals.push(handle),
                TimerCommand::StartTimeout { handle, .. } => self.timeouts.push(handle),
                TimerCommand::Cancel { handle } => {
                    self.intervals.retain(|&h| h != handle);
                    self.timeouts.retain(|&h| h != handle);
                }
            }
        }
    }
}
