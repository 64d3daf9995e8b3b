extern crate console_error_panic_hook;
extern crate serde_json;
extern crate wasm_bindgen;

extern crate latrones_client;

mod dom_view;
mod web_document;
mod web_element_ext;
mod web_error_handling;
mod web_iterators;

use std::sync::mpsc;

use latrones_client::client::{GameController, NotableEvent};
use latrones_client::coord::Square;
use latrones_client::protocol::{OutgoingRequest, RequestId};
use latrones_client::timer::{TimerCommand, TimerHandle};
use wasm_bindgen::prelude::*;

pub use crate::web_error_handling::{
    RustError, last_panic, make_rust_error_report, make_unknown_error_report, set_panic_hook,
};

use crate::dom_view::DomView;
use crate::web_error_handling::{JsResult, client_error};


#[wasm_bindgen]
pub struct JsEventNoop {}  // in contrast to `null`, indicates that event list is not over

#[wasm_bindgen]
pub struct JsEventMoveMade {}

#[wasm_bindgen]
pub struct JsEventGameOver {
    winner: String,
}
#[wasm_bindgen]
impl JsEventGameOver {
    pub fn winner(&self) -> String { self.winner.clone() }
}

#[wasm_bindgen]
pub struct JsEventGameRestarted {}

#[wasm_bindgen]
pub struct JsEventRequestFailed {
    message: String,
}
#[wasm_bindgen]
impl JsEventRequestFailed {
    pub fn message(&self) -> String { self.message.clone() }
}


// Everything asynchronous is done by the page script: it drains `next_outgoing_request` and
// `next_timer_command` after every call, POSTs the requests, arms the timers and reports back.
#[wasm_bindgen]
pub struct WebClient {
    controller: GameController<DomView>,
    requests_rx: mpsc::Receiver<OutgoingRequest>,
    timer_commands_rx: mpsc::Receiver<TimerCommand>,
}

#[wasm_bindgen]
impl WebClient {
    pub fn new_client() -> JsResult<WebClient> {
        let (requests_tx, requests_rx) = mpsc::channel();
        let (timer_commands_tx, timer_commands_rx) = mpsc::channel();
        let controller = GameController::new(DomView::new(), requests_tx, timer_commands_tx)
            .map_err(client_error)?;
        Ok(WebClient { controller, requests_rx, timer_commands_rx })
    }

    pub fn start(&mut self) -> JsResult<()> { self.controller.start().map_err(client_error) }

    pub fn restart(&mut self) -> JsResult<()> { self.controller.restart().map_err(client_error) }

    pub fn retry(&mut self) -> JsResult<()> { self.controller.retry().map_err(client_error) }

    pub fn on_square_click(&mut self, x: u32, y: u32) -> JsResult<()> {
        let square = Square::new(x, y);
        let offset = self.controller.view().square_offset(square)?;
        self.controller.on_square_click(square, offset).map_err(client_error)
    }

    pub fn on_square_enter(&mut self, x: u32, y: u32) -> JsResult<()> {
        self.controller.on_square_enter(Square::new(x, y)).map_err(client_error)
    }

    pub fn on_square_leave(&mut self, x: u32, y: u32) -> JsResult<()> {
        self.controller.on_square_leave(Square::new(x, y)).map_err(client_error)
    }

    pub fn on_time_input(&mut self, value: &str) -> JsResult<()> {
        self.controller.on_time_input(value).map_err(client_error)
    }

    pub fn on_board_size_input(&mut self, value: &str) -> JsResult<()> {
        self.controller.on_board_size_input(value).map_err(client_error)
    }

    pub fn on_timer(&mut self, handle: u32) -> JsResult<()> {
        self.controller.on_timer(TimerHandle(handle.into())).map_err(client_error)
    }

    pub fn process_response(&mut self, request_id: u32, body: &str) -> JsResult<()> {
        self.controller.process_response(RequestId(request_id.into()), body).map_err(client_error)
    }

    pub fn request_failed(&mut self, request_id: u32, message: &str) -> JsResult<()> {
        self.controller.request_failed(RequestId(request_id.into()), message).map_err(client_error)
    }

    pub fn is_interaction_enabled(&self) -> bool { self.controller.is_interaction_enabled() }

    pub fn next_notable_event(&mut self) -> JsValue {
        match self.controller.next_notable_event() {
            Some(NotableEvent::MoveSubmitted { .. } | NotableEvent::BoardUpdated(_)) => {
                JsEventMoveMade {}.into()
            }
            Some(NotableEvent::GameOver { winner }) => {
                JsEventGameOver { winner: winner.to_wire().to_owned() }.into()
            }
            Some(NotableEvent::GameRestarted) => JsEventGameRestarted {}.into(),
            Some(NotableEvent::RequestFailed(message)) => JsEventRequestFailed { message }.into(),
            Some(NotableEvent::PieceSelected(_) | NotableEvent::BotMoveRequested) => {
                JsEventNoop {}.into()
            }
            None => JsValue::NULL,
        }
    }

    // JSON `{"id": .., "path": .., "fields": [[name, value], ...]}`.
    pub fn next_outgoing_request(&mut self) -> JsResult<Option<String>> {
        match self.requests_rx.try_recv() {
            Ok(request) => serde_json::to_string(&request.to_wire())
                .map(Some)
                .map_err(|err| rust_error!("Cannot serialize request: {}", err)),
            Err(_) => Ok(None),
        }
    }

    // JSON `{"kind": "start_interval" | "start_timeout" | "cancel", "handle": .., ...}`.
    pub fn next_timer_command(&mut self) -> JsResult<Option<String>> {
        match self.timer_commands_rx.try_recv() {
            Ok(command) => serde_json::to_string(&command)
                .map(Some)
                .map_err(|err| rust_error!("Cannot serialize timer command: {}", err)),
            Err(_) => Ok(None),
        }
    }
}

#[wasm_bindgen]
pub fn init_page() { set_panic_hook(); }
