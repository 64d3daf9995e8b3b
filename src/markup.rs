// Reads client-relevant facts out of server-rendered markup: the pieces on the board, the
// authoritative game state and the page settings. Browser hosts read the live DOM instead; this
// is for hosts without one, and for tests.
//
// Only opening tags are looked at. A piece belongs to the closest preceding square.

use crate::coord::Square;
use crate::error::ViewError;
use crate::force::Force;
use crate::game::{GameState, parse_winner};
use crate::lazy_regex;
use crate::piece::{BoardSnapshot, PieceColor, PieceSnapshot};
use crate::settings::{GameSettings, SettingsForm};
use crate::view_error;


pub const SQUARE_CLASS: &str = "board__square";
pub const PIECE_CLASS: &str = "board__piece";
pub const LIGHT_PIECE_CLASS: &str = "board__piece--light";
pub const DARK_PIECE_CLASS: &str = "board__piece--dark";
pub const KING_CLASS: &str = "board__piece--king";
pub const GAME_STATE_ID: &str = "game_state";
pub const GAME_SETTINGS_ID: &str = "game_settings";

struct Tag<'a> {
    attributes: Vec<(&'a str, &'a str)>,
}

impl<'a> Tag<'a> {
    fn attr(&self, name: &str) -> Option<&'a str> {
        self.attributes.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)).map(|(_, v)| *v)
    }

    fn has_class(&self, class: &str) -> bool {
        self.attr("class").is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    fn required_attr(&self, name: &str) -> Result<&'a str, ViewError> {
        self.attr(name).ok_or_else(|| view_error!("Missing attribute \"{}\"", name))
    }

    fn required_u32(&self, name: &str) -> Result<u32, ViewError> {
        let value = self.required_attr(name)?;
        value
            .trim()
            .parse()
            .map_err(|_| view_error!("Attribute \"{}\" is not a number: {:?}", name, value))
    }
}

fn opening_tags(markup: &str) -> impl Iterator<Item = Tag<'_>> {
    let tag_re = lazy_regex!(r"<[a-zA-Z][a-zA-Z0-9-]*(\s[^<>]*)?>");
    let attr_re = lazy_regex!(r#"([a-zA-Z_:][-a-zA-Z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#);
    tag_re.captures_iter(markup).map(move |tag| {
        let attributes = match tag.get(1) {
            Some(body) => attr_re
                .captures_iter(body.as_str())
                .filter_map(|attr| {
                    let name = attr.get(1)?.as_str();
                    let value = attr.get(2).or_else(|| attr.get(3))?.as_str();
                    Some((name, value))
                })
                .collect(),
            None => Vec::new(),
        };
        Tag { attributes }
    })
}

fn find_by_id<'a>(markup: &'a str, id: &str) -> Result<Tag<'a>, ViewError> {
    opening_tags(markup)
        .find(|tag| tag.attr("id") == Some(id))
        .ok_or_else(|| view_error!("Cannot find element \"{}\"", id))
}

pub fn read_board(markup: &str) -> Result<BoardSnapshot, ViewError> {
    let mut current_square: Option<Square> = None;
    let mut size_x = 0;
    let mut size_y = 0;
    let mut pieces = Vec::new();
    for tag in opening_tags(markup) {
        if tag.has_class(SQUARE_CLASS) {
            let square = Square::new(tag.required_u32("data-x")?, tag.required_u32("data-y")?);
            size_x = size_x.max(square.x + 1);
            size_y = size_y.max(square.y + 1);
            current_square = Some(square);
        } else if tag.has_class(PIECE_CLASS) {
            let square = current_square
                .take()
                .ok_or_else(|| view_error!("Piece outside of a board square"))?;
            let color = if tag.has_class(LIGHT_PIECE_CLASS) {
                PieceColor::LightPiece
            } else if tag.has_class(DARK_PIECE_CLASS) {
                PieceColor::DarkPiece
            } else {
                return Err(view_error!("Piece at {} has no color", square));
            };
            pieces.push(PieceSnapshot {
                x: square.x,
                y: square.y,
                color,
                king: tag.has_class(KING_CLASS),
            });
        }
    }
    if size_x == 0 {
        return Err(view_error!("No board squares in markup"));
    }
    Ok(BoardSnapshot { size_x, size_y, pieces })
}

pub fn read_game_state(markup: &str) -> Result<GameState, ViewError> {
    let tag = find_by_id(markup, GAME_STATE_ID)?;
    let turn = tag.required_attr("data-current-turn")?;
    let current_turn =
        Force::from_wire(turn).ok_or_else(|| view_error!("Unexpected current turn: {:?}", turn))?;
    let winner = tag.attr("data-winner").unwrap_or("");
    let winner = parse_winner(winner).map_err(|()| view_error!("Unexpected winner: {:?}", winner))?;
    Ok(GameState { current_turn, winner })
}

pub fn read_settings_form(markup: &str) -> Result<SettingsForm, ViewError> {
    let tag = find_by_id(markup, GAME_SETTINGS_ID)?;
    Ok(SettingsForm {
        game_time_seconds: tag.required_attr("data-game-time-seconds")?.to_owned(),
        board_size: tag.required_attr("data-board-size")?.to_owned(),
        user_color: tag.required_attr("data-user-color")?.to_owned(),
        play_against_bot: tag.required_attr("data-play-against-bot")?.to_owned(),
    })
}

pub fn read_game_settings(markup: &str) -> Result<GameSettings, ViewError> {
    let form = read_settings_form(markup)?;
    GameSettings::from_form(&form).map_err(|err| view_error!("Bad page settings: {}", err))
}
