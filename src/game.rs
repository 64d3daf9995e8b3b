use serde::{Deserialize, Serialize};

use crate::force::Force;


// Authoritative game state. The server decides it; the client mirrors it after each exchange
// and never advances it optimistically.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct GameState {
    pub current_turn: Force,
    pub winner: Option<Force>,
}

impl GameState {
    pub fn new_game() -> Self {
        GameState {
            current_turn: Force::Light,
            winner: None,
        }
    }

    pub fn is_over(&self) -> bool { self.winner.is_some() }

    // Side whose turn indicator should be lit: nobody once the game is decided.
    pub fn active_force(&self) -> Option<Force> {
        match self.winner {
            Some(_) => None,
            None => Some(self.current_turn),
        }
    }
}

// Server templates render a missing winner as Python's `None`.
pub fn parse_winner(s: &str) -> Result<Option<Force>, ()> {
    match s.trim() {
        "" | "none" | "None" | "null" => Ok(None),
        other => Force::from_wire(other).map(Some).ok_or(()),
    }
}

pub fn winner_banner(winner: Option<Force>) -> String {
    match winner {
        Some(force) => format!("{} won!", force.display_name()),
        None => String::new(),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_force() {
        let mut state = GameState::new_game();
        assert_eq!(state.active_force(), Some(Force::Light));
        state.current_turn = Force::Dark;
        assert_eq!(state.active_force(), Some(Force::Dark));
        state.winner = Some(Force::Light);
        assert_eq!(state.active_force(), None);
        assert!(state.is_over());
    }

    #[test]
    fn winner_parsing() {
        assert_eq!(parse_winner("None"), Ok(None));
        assert_eq!(parse_winner(""), Ok(None));
        assert_eq!(parse_winner("dark"), Ok(Some(Force::Dark)));
        assert_eq!(parse_winner("draw"), Err(()));
    }

    #[test]
    fn banner_text() {
        assert_eq!(winner_banner(Some(Force::Light)), "White won!");
        assert_eq!(winner_banner(Some(Force::Dark)), "Black won!");
        assert_eq!(winner_banner(None), "");
    }
}
