// Rust-upgrade (https://github.com/rust-lang/rust/issues/46379):
//   remove `#[allow(dead_code)]` before public functions.

use latrones_client::coord::Square;
use latrones_client::force::Force;
use latrones_client::game::GameState;
use latrones_client::piece::BoardSnapshot;
use latrones_client::protocol::{OutgoingRequest, ServerRequest};
use latrones_client::settings::GameSettings;
use latrones_client::test_util::{TestHost, render_board, starting_board};


#[allow(dead_code)]
pub fn human_vs_human(time_budget_seconds: u32) -> GameSettings {
    GameSettings {
        time_budget_seconds,
        play_against_bot: false,
        ..GameSettings::default()
    }
}

#[allow(dead_code)]
pub fn against_bot(user_color: Force) -> GameSettings {
    GameSettings { user_color, ..GameSettings::default() }
}

// Moves the piece without any rules: the server is the one who knows them.
#[allow(dead_code)]
pub fn board_after_move(board: &BoardSnapshot, from: Square, to: Square) -> BoardSnapshot {
    let mut board = board.clone();
    for piece in board.pieces.iter_mut() {
        if piece.square() == from {
            piece.x = to.x;
            piece.y = to.y;
        }
    }
    board
}

#[allow(dead_code)]
pub fn single_request(host: &mut TestHost) -> OutgoingRequest {
    let mut requests = host.requests();
    assert_eq!(requests.len(), 1, "{requests:?}");
    requests.pop().unwrap()
}

// Selects `from`, receives `to` as the only destination and clicks it.
// Returns the "/move" request.
#[allow(dead_code)]
pub fn submit_move(host: &mut TestHost, from: (u32, u32), to: (u32, u32)) -> OutgoingRequest {
    host.click(from.0, from.1);
    let possible_moves = single_request(host);
    let destinations = format!("[[{}, {}]]", to.0, to.1);
    host.controller.process_response(possible_moves.id, &destinations).unwrap();
    host.click(to.0, to.1);
    let request = single_request(host);
    assert!(matches!(request.request, ServerRequest::Move { .. }), "{request:?}");
    request
}

// Answers a "/move" or "/move_bot" request with the given position and lets the glide finish.
#[allow(dead_code)]
pub fn answer_with_board(
    host: &mut TestHost, request: &OutgoingRequest, board: &BoardSnapshot, state: GameState,
) {
    host.controller.process_response(request.id, &render_board(board, &state)).unwrap();
    host.fire_timeouts();
}

// Full user move on the starting board of the given size; the server passes the turn.
#[allow(dead_code)]
pub fn play_opening_move(host: &mut TestHost, board_size: u32, from: (u32, u32), to: (u32, u32))
    -> BoardSnapshot
{
    let request = submit_move(host, from, to);
    let board = board_after_move(&starting_board(board_size), from.into(), to.into());
    let state = GameState { current_turn: Force::Dark, winner: None };
    answer_with_board(host, &request, &board, state);
    board
}
