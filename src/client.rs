use std::collections::VecDeque;
use std::sync::mpsc;

use log::{debug, info, warn};

use crate::bot::bot_to_move;
use crate::clock::{Clock, TimeControl, secs_to_mss};
use crate::coord::{PixelOffset, Square};
use crate::display::{GameView, Highlight, sync_turn_display};
use crate::error::{ClientError, ViewError};
use crate::force::Force;
use crate::game::GameState;
use crate::interaction::{ClickOutcome, Interaction, SquareClick};
use crate::markup;
use crate::protocol::{OutgoingRequest, RequestId, ServerRequest, parse_destinations};
use crate::settings::GameSettings;
use crate::timer::{BOARD_SWAP_DELAY, TimerCommand, TimerHandle, Timers};


#[derive(Clone, PartialEq, Eq, Debug)]
pub enum NotableEvent {
    PieceSelected(Square),
    MoveSubmitted { from: Square, to: Square },
    BotMoveRequested,
    BoardUpdated(GameState),
    GameOver { winner: Force },
    GameRestarted,
    RequestFailed(String),
}

// A server answer waiting for the glide animation to finish.
struct PendingSwap {
    handle: TimerHandle,
    request: ServerRequest,
    fragment: String,
}

struct FailedRequest {
    request: ServerRequest,
    // On-screen glide of a failed move, replayed on retry.
    glide: Option<(f64, f64)>,
}

// Everything the page used to keep in globals. Entry points run to completion and never block:
// requests go out through `requests_tx`, timers through `Timers`, and their completions come
// back via `process_response`, `request_failed` and `on_timer`.
//
// Only response handling writes `state`. The single exception is a fallen flag, which is
// decided locally.
pub struct GameController<V: GameView> {
    view: V,
    settings: GameSettings,
    state: GameState,
    clock: Clock,
    timers: Timers,
    interaction: Interaction,
    requests_tx: mpsc::Sender<OutgoingRequest>,
    next_request_id: u64,
    // At most one request is acted upon at a time; user input is dropped meanwhile.
    in_flight: Option<OutgoingRequest>,
    pending_swap: Option<PendingSwap>,
    // Last request that failed, kept for `retry`.
    failed: Option<FailedRequest>,
    notable_events: VecDeque<NotableEvent>,
}

impl<V: GameView> GameController<V> {
    pub fn new(
        view: V, requests_tx: mpsc::Sender<OutgoingRequest>,
        timer_commands_tx: mpsc::Sender<TimerCommand>,
    ) -> Result<Self, ClientError> {
        let settings = view.game_settings()?;
        let state = view.game_state()?;
        let clock = Clock::new(TimeControl::from_secs(settings.time_budget_seconds));
        let mut controller = GameController {
            view,
            settings,
            state,
            clock,
            timers: Timers::new(timer_commands_tx),
            interaction: Interaction::Idle,
            requests_tx,
            next_request_id: 1,
            in_flight: None,
            pending_swap: None,
            failed: None,
            notable_events: VecDeque::new(),
        };
        controller.initialize()?;
        Ok(controller)
    }

    pub fn view(&self) -> &V { &self.view }
    pub fn view_mut(&mut self) -> &mut V { &mut self.view }
    pub fn settings(&self) -> &GameSettings { &self.settings }
    pub fn state(&self) -> &GameState { &self.state }
    pub fn clock(&self) -> &Clock { &self.clock }
    pub fn interaction(&self) -> &Interaction { &self.interaction }
    pub fn has_outstanding_request(&self) -> bool {
        self.in_flight.is_some() || self.pending_swap.is_some()
    }
    pub fn failed_request(&self) -> Option<&ServerRequest> {
        self.failed.as_ref().map(|failed| &failed.request)
    }

    pub fn is_interaction_enabled(&self) -> bool {
        !self.state.is_over()
            && !self.clock.is_flag_fallen()
            && !self.settings.is_bot(self.state.current_turn)
            && !self.has_outstanding_request()
    }

    pub fn next_notable_event(&mut self) -> Option<NotableEvent> { self.notable_events.pop_front() }

    // (Re)reads everything from a freshly rendered page.
    pub fn initialize(&mut self) -> Result<(), ClientError> {
        self.settings = self.view.game_settings()?;
        self.state = self.view.game_state()?;
        self.cancel_outstanding();
        self.failed = None;
        self.interaction.reset();
        self.view.show_settings(&self.settings)?;
        self.view.show_error(None)?;
        self.clear_selection_highlights()?;
        self.view.clear_highlight(Highlight::Hovered)?;
        let control = TimeControl::from_secs(self.settings.time_budget_seconds);
        self.clock.reset(control, &mut self.timers);
        self.show_clocks()?;
        sync_turn_display(&mut self.view, &self.state)?;
        Ok(())
    }

    pub fn start(&mut self) -> Result<(), ClientError> {
        if !self.state.is_over() && self.clock.start(&mut self.timers) {
            info!("Game started, {} to move", self.state.current_turn);
        }
        self.view.hide_start_overlay()?;
        self.maybe_request_bot_move()?;
        Ok(())
    }

    pub fn restart(&mut self) -> Result<(), ClientError> {
        if self.clock.is_running() && !self.view.confirm_restart() {
            return Ok(());
        }
        let settings = match GameSettings::from_form(&self.view.settings_form()?) {
            Ok(settings) => settings,
            Err(err) => {
                self.view.show_error(Some(&err.to_string()))?;
                return Err(err);
            }
        };
        info!("Restarting: {settings:?}");
        self.clock.pause(&mut self.timers);
        self.cancel_outstanding();
        self.interaction.reset();
        self.send_request(ServerRequest::Restart { settings });
        Ok(())
    }

    pub fn on_square_click(&mut self, square: Square, offset: PixelOffset)
        -> Result<(), ClientError>
    {
        if !self.is_interaction_enabled() {
            debug!("Click on {square} ignored: interaction disabled");
            return Ok(());
        }
        let board = self.view.board()?;
        let click = SquareClick { square, offset, piece: board.force_at(square) };
        let current_turn = self.state.current_turn;
        match self.interaction.click(click, current_turn) {
            ClickOutcome::Ignored => {}
            ClickOutcome::Selected { origin } => {
                self.clear_selection_highlights()?;
                self.view.set_highlight(origin, Highlight::Selected, true)?;
                self.send_request(ServerRequest::PossibleMoves { origin, board, current_turn });
                self.notable_events.push_back(NotableEvent::PieceSelected(origin));
            }
            ClickOutcome::Submitted { from, to, glide } => {
                self.view.glide_piece(from, Some(glide))?;
                self.send_request(ServerRequest::Move { from, to, board, current_turn });
                self.notable_events.push_back(NotableEvent::MoveSubmitted { from, to });
            }
        }
        Ok(())
    }

    pub fn on_square_enter(&mut self, square: Square) -> Result<(), ClientError> {
        if !self.is_interaction_enabled() {
            return Ok(());
        }
        let piece = self.view.board()?.force_at(square);
        if self.interaction.should_highlight_hover(piece, self.state.current_turn) {
            self.view.set_highlight(square, Highlight::Hovered, true)?;
        }
        Ok(())
    }

    pub fn on_square_leave(&mut self, square: Square) -> Result<(), ClientError> {
        self.view.set_highlight(square, Highlight::Hovered, false)?;
        Ok(())
    }

    pub fn on_time_input(&mut self, value: &str) -> Result<(), ClientError> {
        match value.trim().parse::<u64>() {
            Ok(secs) => self.view.show_time_preview(&secs_to_mss(secs))?,
            Err(_) => debug!("Ignoring time input {value:?}"),
        }
        Ok(())
    }

    pub fn on_board_size_input(&mut self, value: &str) -> Result<(), ClientError> {
        match value.trim().parse::<u32>() {
            Ok(size) => self.view.show_board_size_preview(size)?,
            Err(_) => debug!("Ignoring board size input {value:?}"),
        }
        Ok(())
    }

    pub fn on_timer(&mut self, handle: TimerHandle) -> Result<(), ClientError> {
        if self.clock.interval() == Some(handle) {
            self.on_clock_tick(handle)
        } else if self.pending_swap.as_ref().is_some_and(|swap| swap.handle == handle) {
            self.complete_swap()
        } else {
            debug!("Stale timer {handle:?}");
            Ok(())
        }
    }

    pub fn process_response(&mut self, id: RequestId, body: &str) -> Result<(), ClientError> {
        let Some(request) = self.take_in_flight(id) else {
            debug!("Dropping stale response to {id:?}");
            return Ok(());
        };
        match request {
            ServerRequest::PossibleMoves { origin, .. } => {
                let candidates = match parse_destinations(body) {
                    Ok(candidates) => candidates,
                    Err(err) => {
                        self.fail(request, err.to_string())?;
                        return Err(err);
                    }
                };
                self.view.show_error(None)?;
                self.view.clear_highlight(Highlight::OptionalMove)?;
                if self.interaction.set_candidates(origin, candidates.clone()) {
                    for square in candidates {
                        self.view.set_highlight(square, Highlight::OptionalMove, true)?;
                    }
                } else {
                    debug!("Destinations for {origin} arrived after the selection changed");
                }
            }
            ServerRequest::Move { .. } | ServerRequest::MoveBot { .. } => {
                let checked = markup::read_game_state(body).and_then(|_| markup::read_board(body));
                if let Err(err) = checked {
                    return self.reject_response(request, err.to_string());
                }
                self.view.show_error(None)?;
                let handle = self.timers.start_timeout(BOARD_SWAP_DELAY);
                let fragment = body.to_owned();
                self.pending_swap = Some(PendingSwap { handle, request, fragment });
            }
            ServerRequest::Restart { .. } => {
                let checked = markup::read_game_settings(body)
                    .and_then(|_| markup::read_game_state(body))
                    .and_then(|_| markup::read_board(body));
                if let Err(err) = checked {
                    return self.reject_response(request, err.to_string());
                }
                self.view.replace_page(body)?;
                self.initialize()?;
                info!("New game: {:?}", self.settings);
                self.notable_events.push_back(NotableEvent::GameRestarted);
            }
        }
        Ok(())
    }

    // Transport-level failure (or a response the host could not read).
    pub fn request_failed(&mut self, id: RequestId, message: &str) -> Result<(), ClientError> {
        let Some(request) = self.take_in_flight(id) else {
            debug!("Dropping stale failure of {id:?}: {message}");
            return Ok(());
        };
        self.fail(request, message.to_owned())
    }

    // Re-issues the last failed request, if it still makes sense.
    pub fn retry(&mut self) -> Result<(), ClientError> {
        if self.has_outstanding_request() {
            debug!("Retry postponed: another request is outstanding");
            return Ok(());
        }
        let Some(FailedRequest { request, glide }) = self.failed.take() else {
            return Ok(());
        };
        let game_on = !self.state.is_over() && !self.clock.is_flag_fallen();
        let still_relevant = match &request {
            ServerRequest::PossibleMoves { origin, .. } => {
                game_on && self.interaction.selection().map(|s| s.origin) == Some(*origin)
            }
            ServerRequest::Move { current_turn, .. } => {
                game_on && self.interaction.is_idle() && *current_turn == self.state.current_turn
            }
            ServerRequest::MoveBot { .. } => game_on && bot_to_move(&self.settings, &self.state),
            ServerRequest::Restart { .. } => true,
        };
        if !still_relevant {
            debug!("Dropping obsolete retry of {}", request.path());
            self.view.show_error(None)?;
            return Ok(());
        }
        if let (ServerRequest::Move { from, to, .. }, Some(glide)) = (&request, glide) {
            self.view.glide_piece(*from, Some(glide))?;
            self.interaction = Interaction::Moving { from: *from, to: *to, glide };
        }
        self.view.show_error(None)?;
        self.send_request(request);
        Ok(())
    }

    fn on_clock_tick(&mut self, handle: TimerHandle) -> Result<(), ClientError> {
        let outcome = self.clock.tick(handle, self.state.current_turn, &mut self.timers);
        if let Some(force) = outcome.decremented {
            self.view.show_clock(force, &self.clock.showing_for(force))?;
        }
        if let Some(loser) = outcome.flagged {
            let winner = loser.opponent();
            info!("{loser} ran out of time, {winner} wins");
            self.state.winner = Some(winner);
            self.interaction.reset();
            self.clear_selection_highlights()?;
            self.view.clear_highlight(Highlight::Hovered)?;
            sync_turn_display(&mut self.view, &self.state)?;
            self.notable_events.push_back(NotableEvent::GameOver { winner });
        }
        Ok(())
    }

    fn complete_swap(&mut self) -> Result<(), ClientError> {
        let Some(PendingSwap { request, fragment, .. }) = self.pending_swap.take() else {
            return Ok(());
        };
        let was_over = self.state.is_over();
        let swapped = self.view.replace_board(&fragment).and_then(|()| self.refresh_state());
        if let Err(err) = swapped {
            self.fail(request, err.to_string())?;
            return Err(err.into());
        }
        self.interaction.reset();
        self.clear_selection_highlights()?;
        self.view.clear_highlight(Highlight::Hovered)?;
        self.notable_events.push_back(NotableEvent::BoardUpdated(self.state));
        if let (false, Some(winner)) = (was_over, self.state.winner) {
            info!("{winner} wins");
            self.notable_events.push_back(NotableEvent::GameOver { winner });
        }
        self.after_state_refresh()
    }

    fn refresh_state(&mut self) -> Result<(), ViewError> {
        let mut state = self.view.game_state()?;
        if state.winner.is_none() && self.clock.is_flag_fallen() {
            // The server does not know about the clock.
            state.winner = self.state.winner;
        }
        self.state = state;
        Ok(())
    }

    // Post-move hook: runs after every board swap.
    fn after_state_refresh(&mut self) -> Result<(), ClientError> {
        sync_turn_display(&mut self.view, &self.state)?;
        if self.state.is_over() {
            self.clock.pause(&mut self.timers);
        }
        self.maybe_request_bot_move()?;
        Ok(())
    }

    fn maybe_request_bot_move(&mut self) -> Result<bool, ClientError> {
        if self.has_outstanding_request()
            || self.clock.is_flag_fallen()
            || !bot_to_move(&self.settings, &self.state)
        {
            return Ok(false);
        }
        let board = self.view.board()?;
        let current_turn = self.state.current_turn;
        self.send_request(ServerRequest::MoveBot { board, current_turn });
        self.notable_events.push_back(NotableEvent::BotMoveRequested);
        Ok(true)
    }

    // A response that arrived but cannot be used is handled like a transport failure.
    fn reject_response(&mut self, request: ServerRequest, message: String)
        -> Result<(), ClientError>
    {
        let err = ClientError::MalformedResponse(message);
        self.fail(request, err.to_string())?;
        Err(err)
    }

    fn fail(&mut self, request: ServerRequest, message: String) -> Result<(), ClientError> {
        warn!("Request to {} failed: {message}", request.path());
        self.view.show_error(Some(&format!("Server request failed: {message}")))?;
        let glide = match self.interaction {
            Interaction::Moving { glide, .. } => Some(glide),
            _ => None,
        };
        if let ServerRequest::Move { from, .. } = request {
            // The board may already be swapped, leaving nothing to put back.
            if let Err(err) = self.view.glide_piece(from, None) {
                debug!("Cannot revert glide on {from}: {err}");
            }
            self.interaction.reset();
            self.clear_selection_highlights()?;
        }
        self.failed = Some(FailedRequest { request, glide });
        self.notable_events.push_back(NotableEvent::RequestFailed(message));
        Ok(())
    }

    fn send_request(&mut self, request: ServerRequest) {
        let id = RequestId(self.next_request_id);
        self.next_request_id += 1;
        let outgoing = OutgoingRequest { id, request };
        self.in_flight = Some(outgoing.clone());
        self.failed = None;
        if self.requests_tx.send(outgoing).is_err() {
            debug!("Request {id:?} dropped: host is gone");
        }
    }

    fn take_in_flight(&mut self, id: RequestId) -> Option<ServerRequest> {
        if self.in_flight.as_ref().is_some_and(|outgoing| outgoing.id == id) {
            self.in_flight.take().map(|outgoing| outgoing.request)
        } else {
            None
        }
    }

    fn cancel_outstanding(&mut self) {
        self.in_flight = None;
        if let Some(swap) = self.pending_swap.take() {
            self.timers.cancel(swap.handle);
        }
    }

    fn clear_selection_highlights(&mut self) -> Result<(), ClientError> {
        self.view.clear_highlight(Highlight::Selected)?;
        self.view.clear_highlight(Highlight::OptionalMove)?;
        Ok(())
    }

    fn show_clocks(&mut self) -> Result<(), ClientError> {
        for force in [Force::Light, Force::Dark] {
            self.view.show_clock(force, &self.clock.showing_for(force))?;
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_util::*;

    fn human_vs_human() -> GameSettings {
        GameSettings { play_against_bot: false, ..GameSettings::default() }
    }

    #[test]
    fn initial_display() {
        let settings = GameSettings { time_budget_seconds: 120, ..human_vs_human() };
        let host = TestHost::with_settings(&settings);
        assert_eq!(host.view().clocks[Force::Light], "2:00");
        assert_eq!(host.view().clocks[Force::Dark], "2:00");
        assert_eq!(host.view().turn, Some(Force::Light));
        assert_eq!(host.view().banner, "");
        assert!(!host.controller.clock().is_running());
    }

    #[test]
    fn hover_only_own_pieces_when_idle() {
        let mut host = TestHost::with_settings(&human_vs_human());
        host.controller.on_square_enter(Square::new(0, 7)).unwrap();
        host.controller.on_square_enter(Square::new(1, 0)).unwrap();
        host.controller.on_square_enter(Square::new(0, 4)).unwrap();
        assert_eq!(host.view().highlighted(Highlight::Hovered), vec![Square::new(0, 7)]);
        host.controller.on_square_leave(Square::new(0, 7)).unwrap();
        assert!(host.view().highlighted(Highlight::Hovered).is_empty());
    }

    #[test]
    fn input_dropped_while_request_outstanding() {
        let mut host = TestHost::with_settings(&human_vs_human());
        host.click(0, 7);
        assert_eq!(host.requests().len(), 1);
        host.click(2, 7);
        assert!(host.requests().is_empty());
        assert_eq!(host.controller.interaction().selection().unwrap().origin, Square::new(0, 7));
    }

    #[test]
    fn late_destinations_for_previous_selection() {
        let mut host = TestHost::with_settings(&human_vs_human());
        host.click(0, 7);
        let first = host.requests().pop().unwrap();
        host.controller.process_response(first.id, "[[1, 6]]").unwrap();
        host.click(2, 7);
        let second = host.requests().pop().unwrap();
        // The first answer was already consumed, a duplicate is stale.
        host.controller.process_response(first.id, "[[1, 6]]").unwrap();
        assert_eq!(host.controller.interaction().selection().unwrap().candidates, None);
        host.controller.process_response(second.id, "[[3, 6]]").unwrap();
        assert_eq!(
            host.controller.interaction().selection().unwrap().candidates,
            Some(vec![Square::new(3, 6)])
        );
        assert_eq!(host.view().highlighted(Highlight::OptionalMove), vec![Square::new(3, 6)]);
        assert_eq!(host.view().highlighted(Highlight::Selected), vec![Square::new(2, 7)]);
    }

    #[test]
    fn malformed_destinations() {
        let mut host = TestHost::with_settings(&human_vs_human());
        host.click(0, 7);
        let request = host.requests().pop().unwrap();
        assert!(host.controller.process_response(request.id, "<html>").is_err());
        assert!(host.view().error.is_some());
        assert!(matches!(
            host.controller.failed_request(),
            Some(ServerRequest::PossibleMoves { .. })
        ));
        assert!(host.controller.is_interaction_enabled());
    }

    #[test]
    fn settings_previews() {
        let mut host = TestHost::with_settings(&human_vs_human());
        host.controller.on_time_input("95").unwrap();
        host.controller.on_board_size_input("10").unwrap();
        host.controller.on_time_input("abc").unwrap();
        assert_eq!(host.view().time_preview.as_deref(), Some("1:35"));
        assert_eq!(host.view().board_size_preview, Some(10));
    }
}
