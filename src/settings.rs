use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::force::Force;


pub const MIN_BOARD_SIZE: u32 = 3;
pub const MAX_BOARD_SIZE: u32 = 12;

// Settings of one game. Never mutated while the game is on: restart replaces them wholesale.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct GameSettings {
    pub time_budget_seconds: u32,
    pub user_color: Force,
    pub play_against_bot: bool,
    pub board_size: u32,
}

// Raw values of the settings inputs, exactly as the user left them.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct SettingsForm {
    pub game_time_seconds: String,
    pub board_size: String,
    pub user_color: String,
    pub play_against_bot: String,
}

impl Default for GameSettings {
    // Matches the server defaults.
    fn default() -> Self {
        GameSettings {
            time_budget_seconds: 300,
            user_color: Force::Light,
            play_against_bot: true,
            board_size: 8,
        }
    }
}

impl GameSettings {
    pub fn bot_color(&self) -> Force { self.user_color.opponent() }

    pub fn is_bot(&self, force: Force) -> bool {
        self.play_against_bot && force == self.bot_color()
    }

    pub fn from_form(form: &SettingsForm) -> Result<Self, ClientError> {
        let time_budget_seconds = parse_number("game time", &form.game_time_seconds)?;
        let board_size = parse_number("board size", &form.board_size)?;
        if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&board_size) {
            return Err(ClientError::InvalidSettings(format!(
                "board size must be between {MIN_BOARD_SIZE} and {MAX_BOARD_SIZE}, got {board_size}"
            )));
        }
        let user_color = Force::from_wire(&form.user_color).ok_or_else(|| {
            ClientError::InvalidSettings(format!("unknown color: {:?}", form.user_color))
        })?;
        let play_against_bot = parse_bool(&form.play_against_bot).ok_or_else(|| {
            ClientError::InvalidSettings(format!(
                "expected true or false for bot play, got {:?}",
                form.play_against_bot
            ))
        })?;
        Ok(GameSettings {
            time_budget_seconds,
            user_color,
            play_against_bot,
            board_size,
        })
    }

    pub fn to_form(&self) -> SettingsForm {
        SettingsForm {
            game_time_seconds: self.time_budget_seconds.to_string(),
            board_size: self.board_size.to_string(),
            user_color: self.user_color.to_wire().to_owned(),
            play_against_bot: self.play_against_bot.to_string(),
        }
    }
}

fn parse_number(what: &str, value: &str) -> Result<u32, ClientError> {
    value
        .trim()
        .parse()
        .map_err(|_| ClientError::InvalidSettings(format!("{what} is not a number: {value:?}")))
}

// The page renders Python booleans ("True"), radio buttons send "true".
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn form(time: &str, size: &str, color: &str, bot: &str) -> SettingsForm {
        SettingsForm {
            game_time_seconds: time.to_owned(),
            board_size: size.to_owned(),
            user_color: color.to_owned(),
            play_against_bot: bot.to_owned(),
        }
    }

    #[test]
    fn parse_form() {
        assert_eq!(
            GameSettings::from_form(&form("120", " 6", "dark", "True")).unwrap(),
            GameSettings {
                time_budget_seconds: 120,
                user_color: Force::Dark,
                play_against_bot: true,
                board_size: 6,
            }
        );
        let default = GameSettings::default();
        assert_eq!(GameSettings::from_form(&default.to_form()).unwrap(), default);
    }

    #[test]
    fn reject_bad_form() {
        use ClientError::InvalidSettings;
        assert!(matches!(GameSettings::from_form(&form("abc", "8", "light", "true")), Err(InvalidSettings(_))));
        assert!(matches!(GameSettings::from_form(&form("-5", "8", "light", "true")), Err(InvalidSettings(_))));
        assert!(matches!(GameSettings::from_form(&form("60", "2", "light", "true")), Err(InvalidSettings(_))));
        assert!(matches!(GameSettings::from_form(&form("60", "8", "red", "true")), Err(InvalidSettings(_))));
        assert!(matches!(GameSettings::from_form(&form("60", "8", "light", "yes")), Err(InvalidSettings(_))));
    }

    #[test]
    fn bot_color() {
        let settings = GameSettings { user_color: Force::Dark, ..GameSettings::default() };
        assert_eq!(settings.bot_color(), Force::Light);
        assert!(settings.is_bot(Force::Light));
        assert!(!settings.is_bot(Force::Dark));
        let no_bot = GameSettings { play_against_bot: false, ..settings };
        assert!(!no_bot.is_bot(Force::Light));
    }
}
