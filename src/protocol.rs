// Request/response contract with the game server.
//
// Requests are form-encoded POSTs. Piece lists use the nested-field convention the server
// parses (`pieces[0][x]=1&pieces[0][y]=4&...`), together with an explicit `pieces_count`.

use serde::{Deserialize, Serialize};

use crate::coord::Square;
use crate::error::ClientError;
use crate::force::Force;
use crate::piece::BoardSnapshot;
use crate::settings::GameSettings;


#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct RequestId(pub u64);

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ServerRequest {
    PossibleMoves {
        origin: Square,
        board: BoardSnapshot,
        current_turn: Force,
    },
    Move {
        from: Square,
        to: Square,
        board: BoardSnapshot,
        current_turn: Force,
    },
    MoveBot {
        board: BoardSnapshot,
        current_turn: Force,
    },
    Restart {
        settings: GameSettings,
    },
}

// What the answer to a request is expected to look like.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ResponseKind {
    // JSON list of `[x, y]` pairs.
    Destinations,
    // Board fragment markup.
    BoardFragment,
    // Full page markup.
    Page,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct OutgoingRequest {
    pub id: RequestId,
    pub request: ServerRequest,
}

// Host-facing form of an `OutgoingRequest`.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct WireRequest {
    pub id: RequestId,
    pub path: String,
    pub fields: Vec<(String, String)>,
}

impl ServerRequest {
    pub fn path(&self) -> &'static str {
        match self {
            ServerRequest::PossibleMoves { .. } => "/possible_moves",
            ServerRequest::Move { .. } => "/move",
            ServerRequest::MoveBot { .. } => "/move_bot",
            ServerRequest::Restart { .. } => "/restart",
        }
    }

    pub fn response_kind(&self) -> ResponseKind {
        match self {
            ServerRequest::PossibleMoves { .. } => ResponseKind::Destinations,
            ServerRequest::Move { .. } | ServerRequest::MoveBot { .. } => {
                ResponseKind::BoardFragment
            }
            ServerRequest::Restart { .. } => ResponseKind::Page,
        }
    }

    pub fn form_fields(&self) -> Vec<(String, String)> {
        let mut fields = FormBuilder::default();
        match self {
            ServerRequest::PossibleMoves { origin, board, current_turn } => {
                fields.square("cur", *origin);
                fields.board(board);
                fields.push("current_turn", current_turn.to_wire());
            }
            ServerRequest::Move { from, to, board, current_turn } => {
                fields.square("cur", *from);
                fields.square("dst", *to);
                fields.board(board);
                fields.push("current_turn", current_turn.to_wire());
            }
            ServerRequest::MoveBot { board, current_turn } => {
                fields.board(board);
                fields.push("current_turn", current_turn.to_wire());
            }
            ServerRequest::Restart { settings } => {
                let form = settings.to_form();
                fields.push("game_time_seconds", form.game_time_seconds);
                fields.push("board_size", form.board_size);
                fields.push("user_color", form.user_color);
                fields.push("play_against_bot", form.play_against_bot);
            }
        }
        fields.0
    }
}

impl OutgoingRequest {
    pub fn to_wire(&self) -> WireRequest {
        WireRequest {
            id: self.id,
            path: self.request.path().to_owned(),
            fields: self.request.form_fields(),
        }
    }
}

#[derive(Default)]
struct FormBuilder(Vec<(String, String)>);

impl FormBuilder {
    fn push(&mut self, key: impl Into<String>, value: impl ToString) {
        self.0.push((key.into(), value.to_string()));
    }

    fn square(&mut self, prefix: &str, square: Square) {
        self.push(format!("{prefix}_x"), square.x);
        self.push(format!("{prefix}_y"), square.y);
    }

    fn board(&mut self, board: &BoardSnapshot) {
        for (i, piece) in board.pieces.iter().enumerate() {
            self.push(format!("pieces[{i}][x]"), piece.x);
            self.push(format!("pieces[{i}][y]"), piece.y);
            self.push(format!("pieces[{i}][color]"), piece.color.to_wire());
            self.push(format!("pieces[{i}][king]"), piece.king);
        }
        self.push("pieces_count", board.pieces.len());
        self.push("board_size_x", board.size_x);
        self.push("board_size_y", board.size_y);
    }
}

pub fn parse_destinations(body: &str) -> Result<Vec<Square>, ClientError> {
    let pairs: Vec<(u32, u32)> = serde_json::from_str(body).map_err(|err| {
        ClientError::MalformedResponse(format!("cannot parse destinations {body:?}: {err}"))
    })?;
    Ok(pairs.into_iter().map(Square::from).collect())
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::piece::{PieceColor, PieceSnapshot};

    fn fields(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn small_board() -> BoardSnapshot {
        BoardSnapshot {
            size_x: 3,
            size_y: 4,
            pieces: vec![
                PieceSnapshot { x: 0, y: 3, color: PieceColor::LightPiece, king: false },
                PieceSnapshot { x: 1, y: 0, color: PieceColor::DarkPiece, king: true },
            ],
        }
    }

    #[test]
    fn move_form() {
        let request = ServerRequest::Move {
            from: Square::new(0, 3),
            to: Square::new(0, 1),
            board: small_board(),
            current_turn: Force::Light,
        };
        assert_eq!(request.path(), "/move");
        assert_eq!(request.form_fields(), fields(&[
            ("cur_x", "0"),
            ("cur_y", "3"),
            ("dst_x", "0"),
            ("dst_y", "1"),
            ("pieces[0][x]", "0"),
            ("pieces[0][y]", "3"),
            ("pieces[0][color]", "LightPiece"),
            ("pieces[0][king]", "false"),
            ("pieces[1][x]", "1"),
            ("pieces[1][y]", "0"),
            ("pieces[1][color]", "DarkPiece"),
            ("pieces[1][king]", "true"),
            ("pieces_count", "2"),
            ("board_size_x", "3"),
            ("board_size_y", "4"),
            ("current_turn", "light"),
        ]));
    }

    #[test]
    fn bot_form_has_no_squares() {
        let request = ServerRequest::MoveBot { board: small_board(), current_turn: Force::Dark };
        let form = request.form_fields();
        assert!(form.iter().all(|(k, _)| !k.starts_with("cur_") && !k.starts_with("dst_")));
        assert_eq!(form.last().unwrap(), &("current_turn".to_owned(), "dark".to_owned()));
        assert_eq!(request.response_kind(), ResponseKind::BoardFragment);
    }

    #[test]
    fn restart_form() {
        let request = ServerRequest::Restart {
            settings: GameSettings {
                time_budget_seconds: 90,
                user_color: Force::Dark,
                play_against_bot: false,
                board_size: 6,
            },
        };
        assert_eq!(request.form_fields(), fields(&[
            ("game_time_seconds", "90"),
            ("board_size", "6"),
            ("user_color", "dark"),
            ("play_against_bot", "false"),
        ]));
        assert_eq!(request.response_kind(), ResponseKind::Page);
    }

    #[test]
    fn wire_json() {
        let outgoing = OutgoingRequest {
            id: RequestId(3),
            request: ServerRequest::Restart { settings: GameSettings::default() },
        };
        let json = serde_json::to_string(&outgoing.to_wire()).unwrap();
        assert!(json.starts_with(r#"{"id":3,"path":"/restart","fields":[["game_time_seconds","300"]"#));
    }

    #[test]
    fn destinations() {
        assert_eq!(
            parse_destinations("[[1, 2], [3, 0]]").unwrap(),
            vec![Square::new(1, 2), Square::new(3, 0)]
        );
        assert_eq!(parse_destinations("[]").unwrap(), Vec::<Square>::new());
        assert!(matches!(parse_destinations("<html>"), Err(ClientError::MalformedResponse(_))));
        assert!(matches!(parse_destinations("[[-1, 2]]"), Err(ClientError::MalformedResponse(_))));
    }
}
