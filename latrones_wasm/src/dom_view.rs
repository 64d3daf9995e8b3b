// `GameView` over the live page. Board and page markup are swapped in as served; everything else
// is a matter of toggling classes and filling in texts on elements the page template provides.

use enum_map::{EnumMap, enum_map};
use latrones_client::clock::secs_to_mss;
use latrones_client::coord::{PixelOffset, Square};
use latrones_client::display::{GameView, Highlight};
use latrones_client::error::ViewError;
use latrones_client::force::Force;
use latrones_client::game::{GameState, parse_winner};
use latrones_client::markup;
use latrones_client::piece::{BoardSnapshot, PieceColor, PieceSnapshot};
use latrones_client::settings::{GameSettings, SettingsForm};
use latrones_client::view_error;
use strum::IntoEnumIterator;
use wasm_bindgen::JsCast;

use crate::web_document::web_document;
use crate::web_element_ext::WebElementExt;
use crate::rust_error;
use crate::web_error_handling::{JsResult, ViewResultExt};


pub const BOARD_CONTAINER_ID: &str = "board_with_figures_id";
pub const WINNER_DISPLAY_ID: &str = "winner_display";
pub const ERROR_DISPLAY_ID: &str = "error_display";
pub const TIME_INPUT_ID: &str = "game_time_seconds";
pub const TIME_PREVIEW_ID: &str = "game_time_display";
pub const BOARD_SIZE_INPUT_ID: &str = "board_size";
pub const BOARD_SIZE_PREVIEW_ID: &str = "board_size_display";
pub const START_BUTTON_ID: &str = "start-game-btn";
pub const START_OVERLAY_ID: &str = "play-overlay";
pub const USER_COLOR_RADIO: &str = "user_color";
pub const PLAY_AGAINST_BOT_RADIO: &str = "play_against_bot";

const INVISIBLE_TURN_CLASS: &str = "currentturn--invisible";

pub struct DomView {
    clock_display_ids: EnumMap<Force, &'static str>,
    turn_indicator_ids: EnumMap<Force, &'static str>,
    turn_indicator_classes: EnumMap<Force, &'static str>,
}

impl DomView {
    pub fn new() -> Self {
        DomView {
            clock_display_ids: enum_map! {
                Force::Light => "light_time_display",
                Force::Dark => "dark_time_display",
            },
            turn_indicator_ids: enum_map! {
                Force::Light => "light_turn_indicator",
                Force::Dark => "dark_turn_indicator",
            },
            turn_indicator_classes: enum_map! {
                Force::Light => "currentturn--light",
                Force::Dark => "currentturn--dark",
            },
        }
    }

    pub fn square_element(&self, square: Square) -> JsResult<web_sys::Element> {
        web_document().query_selector_existing(&format!(
            ".{}[data-x=\"{}\"][data-y=\"{}\"]",
            markup::SQUARE_CLASS,
            square.x,
            square.y
        ))
    }

    // Square position on the page. Only differences between squares matter, so viewport
    // coordinates are as good as document ones.
    pub fn square_offset(&self, square: Square) -> JsResult<PixelOffset> {
        let rect = self.square_element(square)?.get_bounding_client_rect();
        Ok(PixelOffset::new(rect.left(), rect.top()))
    }

    fn read_board(&self) -> JsResult<BoardSnapshot> {
        let mut size_x = 0;
        let mut size_y = 0;
        let mut pieces = Vec::new();
        for square_element in web_document().get_elements_by_class_name(markup::SQUARE_CLASS) {
            let x = square_element.data_u32("x")?;
            let y = square_element.data_u32("y")?;
            size_x = size_x.max(x + 1);
            size_y = size_y.max(y + 1);
            let Some(piece) = square_element.query_selector(&format!(".{}", markup::PIECE_CLASS))?
            else {
                continue;
            };
            let classes = piece.class_list();
            let color = if classes.contains(markup::LIGHT_PIECE_CLASS) {
                PieceColor::LightPiece
            } else if classes.contains(markup::DARK_PIECE_CLASS) {
                PieceColor::DarkPiece
            } else {
                return Err(rust_error!("Piece at ({}, {}) has no color", x, y));
            };
            let king = classes.contains(markup::KING_CLASS);
            pieces.push(PieceSnapshot { x, y, color, king });
        }
        if size_x == 0 {
            return Err(rust_error!("No board squares on the page"));
        }
        Ok(BoardSnapshot { size_x, size_y, pieces })
    }

    fn read_game_state(&self) -> JsResult<GameState> {
        let element = web_document().get_existing_element_by_id(markup::GAME_STATE_ID)?;
        let turn = element.data_attribute("current-turn")?;
        let current_turn = Force::from_wire(&turn)
            .ok_or_else(|| rust_error!("Unexpected current turn: {:?}", turn))?;
        let winner = element.get_attribute("data-winner").unwrap_or_default();
        let winner =
            parse_winner(&winner).map_err(|()| rust_error!("Unexpected winner: {:?}", winner))?;
        Ok(GameState { current_turn, winner })
    }

    fn read_page_settings(&self) -> JsResult<SettingsForm> {
        let element = web_document().get_existing_element_by_id(markup::GAME_SETTINGS_ID)?;
        Ok(SettingsForm {
            game_time_seconds: element.data_attribute("game-time-seconds")?,
            board_size: element.data_attribute("board-size")?,
            user_color: element.data_attribute("user-color")?,
            play_against_bot: element.data_attribute("play-against-bot")?,
        })
    }

    fn read_settings_inputs(&self) -> JsResult<SettingsForm> {
        let document = web_document();
        Ok(SettingsForm {
            game_time_seconds: document.get_existing_input_by_id(TIME_INPUT_ID)?.value(),
            board_size: document.get_existing_input_by_id(BOARD_SIZE_INPUT_ID)?.value(),
            user_color: checked_radio_value(USER_COLOR_RADIO)?,
            play_against_bot: checked_radio_value(PLAY_AGAINST_BOT_RADIO)?,
        })
    }

    fn write_settings_inputs(&self, settings: &GameSettings) -> JsResult<()> {
        let document = web_document();
        let form = settings.to_form();
        document.get_existing_input_by_id(TIME_INPUT_ID)?.set_value(&form.game_time_seconds);
        document.get_existing_input_by_id(BOARD_SIZE_INPUT_ID)?.set_value(&form.board_size);
        check_radio(USER_COLOR_RADIO, &form.user_color)?;
        check_radio(PLAY_AGAINST_BOT_RADIO, &form.play_against_bot)?;
        set_text(TIME_PREVIEW_ID, &secs_to_mss(settings.time_budget_seconds.into()))?;
        set_text(BOARD_SIZE_PREVIEW_ID, &form.board_size)?;
        Ok(())
    }

    fn write_turn(&self, active: Option<Force>) -> JsResult<()> {
        for force in Force::iter() {
            let indicator =
                web_document().get_existing_element_by_id(self.turn_indicator_ids[force])?;
            let is_active = active == Some(force);
            indicator.set_class(self.turn_indicator_classes[force], is_active)?;
            indicator.set_class(INVISIBLE_TURN_CLASS, !is_active)?;
        }
        Ok(())
    }

    fn write_glide(&self, from: Square, translation: Option<(f64, f64)>) -> JsResult<()> {
        let piece = self
            .square_element(from)?
            .query_selector(&format!(".{}", markup::PIECE_CLASS))?
            .ok_or_else(|| rust_error!("No piece at {}", from))?;
        piece.set_translation(translation)
    }
}

impl GameView for DomView {
    fn board(&self) -> Result<BoardSnapshot, ViewError> { self.read_board().view_err() }
    fn game_state(&self) -> Result<GameState, ViewError> { self.read_game_state().view_err() }
    fn game_settings(&self) -> Result<GameSettings, ViewError> {
        let form = self.read_page_settings().view_err()?;
        GameSettings::from_form(&form).map_err(|err| view_error!("Bad page settings: {}", err))
    }
    fn settings_form(&self) -> Result<SettingsForm, ViewError> {
        self.read_settings_inputs().view_err()
    }

    fn replace_board(&mut self, fragment: &str) -> Result<(), ViewError> {
        let container = web_document().get_existing_element_by_id(BOARD_CONTAINER_ID).view_err()?;
        container.set_inner_html(fragment);
        Ok(())
    }
    fn replace_page(&mut self, page: &str) -> Result<(), ViewError> {
        web_document().body().view_err()?.set_inner_html(page);
        Ok(())
    }

    fn show_settings(&mut self, settings: &GameSettings) -> Result<(), ViewError> {
        self.write_settings_inputs(settings).view_err()
    }
    fn show_time_preview(&mut self, text: &str) -> Result<(), ViewError> {
        set_text(TIME_PREVIEW_ID, text).view_err()
    }
    fn show_board_size_preview(&mut self, size: u32) -> Result<(), ViewError> {
        set_text(BOARD_SIZE_PREVIEW_ID, &size.to_string()).view_err()
    }
    fn show_clock(&mut self, force: Force, text: &str) -> Result<(), ViewError> {
        set_text(self.clock_display_ids[force], text).view_err()
    }
    fn show_turn(&mut self, active: Option<Force>) -> Result<(), ViewError> {
        self.write_turn(active).view_err()
    }
    fn show_winner(&mut self, banner: &str) -> Result<(), ViewError> {
        set_text(WINNER_DISPLAY_ID, banner).view_err()
    }
    fn show_error(&mut self, message: Option<&str>) -> Result<(), ViewError> {
        // Older page templates have no place for errors; the log still has them.
        let Ok(element) = web_document().get_existing_element_by_id(ERROR_DISPLAY_ID) else {
            return Ok(());
        };
        element.set_text_content(message);
        element.set_displayed(message.is_some()).view_err()
    }
    fn hide_start_overlay(&mut self) -> Result<(), ViewError> {
        let document = web_document();
        let overlay = document.get_existing_element_by_id(START_OVERLAY_ID).view_err()?;
        overlay.set_displayed(false).view_err()?;
        let button = document.get_existing_element_by_id(START_BUTTON_ID).view_err()?;
        button.set_attribute("disabled", "").view_err()
    }

    fn set_highlight(&mut self, square: Square, highlight: Highlight, on: bool)
        -> Result<(), ViewError>
    {
        let element = self.square_element(square).view_err()?;
        element.set_class(highlight_class(highlight), on).view_err()
    }
    fn clear_highlight(&mut self, highlight: Highlight) -> Result<(), ViewError> {
        web_document().purge_class_name(highlight_class(highlight)).view_err()
    }
    fn glide_piece(&mut self, from: Square, translation: Option<(f64, f64)>)
        -> Result<(), ViewError>
    {
        self.write_glide(from, translation).view_err()
    }

    fn confirm_restart(&mut self) -> bool {
        web_sys::window()
            .and_then(|w| w.confirm_with_message("Do you really want to restart the game?").ok())
            .unwrap_or(false)
    }
}

pub fn highlight_class(highlight: Highlight) -> &'static str {
    match highlight {
        Highlight::Hovered => "board__square--hovered",
        Highlight::Selected => "board__square--selected",
        Highlight::OptionalMove => "board__square--optionalmove",
    }
}

fn set_text(element_id: &str, text: &str) -> JsResult<()> {
    web_document().get_existing_element_by_id(element_id)?.set_text_content(Some(text));
    Ok(())
}

fn radio_buttons(name: &str) -> JsResult<Vec<web_sys::HtmlInputElement>> {
    Ok(web_document()
        .query_selector_all(&format!("input[name=\"{name}\"]"))?
        .filter_map(|node| node.dyn_into::<web_sys::HtmlInputElement>().ok())
        .collect())
}

fn checked_radio_value(name: &str) -> JsResult<String> {
    radio_buttons(name)?
        .into_iter()
        .find(|radio| radio.checked())
        .map(|radio| radio.value())
        .ok_or_else(|| rust_error!("No option selected for \"{}\"", name))
}

fn check_radio(name: &str, value: &str) -> JsResult<()> {
    for radio in radio_buttons(name)? {
        radio.set_checked(radio.value() == value);
    }
    Ok(())
}
