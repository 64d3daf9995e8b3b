use std::cell::RefCell;

use latrones_client::error::{ClientError, ViewError};
use serde::Serialize;
use wasm_bindgen::prelude::*;


pub type JsResult<T> = Result<T, JsValue>;

// The client is single-threaded, so wrapping all mutable singletons in `thread_local!` seems ok.
thread_local! {
    static LAST_PANIC: RefCell<String> = RefCell::new(String::new());
}

// Sent by the page to wherever it collects client errors.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "kind")]
pub enum ClientErrorReport {
    RustPanic { panic_info: String, backtrace: String },
    RustError { message: String },
    UnknownError { message: String },
}

// Copied from console_error_panic_hook
#[wasm_bindgen]
extern "C" {
    type Error;
    #[wasm_bindgen(constructor)]
    fn new() -> Error;
    #[wasm_bindgen(structural, method, getter)]
    fn stack(error: &Error) -> String;
}

#[wasm_bindgen]
pub fn set_panic_hook() {
    use std::panic;
    use std::sync::Once;
    static SET_HOOK: Once = Once::new();
    SET_HOOK.call_once(|| {
        panic::set_hook(Box::new(|panic_info| {
            // Log to the browser developer console. For more details see
            // https://github.com/rustwasm/console_error_panic_hook#readme
            console_error_panic_hook::hook(panic_info);

            let js_error = Error::new();
            let report = ClientErrorReport::RustPanic {
                panic_info: panic_info.to_string(),
                backtrace: js_error.stack(),
            };
            LAST_PANIC.with(|cell| *cell.borrow_mut() = report_to_json(&report));
        }));
    });
}

#[wasm_bindgen]
pub fn last_panic() -> String { LAST_PANIC.with(|cell| cell.borrow().clone()) }

#[wasm_bindgen(getter_with_clone)]
pub struct RustError {
    pub message: String,
}

#[macro_export]
macro_rules! rust_error {
    ($($arg:tt)*) => {
        wasm_bindgen::JsValue::from(
            $crate::web_error_handling::RustError{ message: format!($($arg)*) }
        )
    };
}

#[wasm_bindgen]
pub fn make_rust_error_report(error: RustError) -> String {
    report_to_json(&ClientErrorReport::RustError { message: error.message })
}

#[wasm_bindgen]
pub fn make_unknown_error_report(message: String) -> String {
    report_to_json(&ClientErrorReport::UnknownError { message })
}

fn report_to_json(report: &ClientErrorReport) -> String {
    serde_json::to_string(report).unwrap_or_else(|err| format!("{report:?} ({err})"))
}

pub fn client_error(err: ClientError) -> JsValue { rust_error!("{}", err) }

// DOM calls fail with opaque JS values; the controller only needs their description.
pub trait ViewResultExt<T> {
    fn view_err(self) -> Result<T, ViewError>;
}

impl<T> ViewResultExt<T> for JsResult<T> {
    fn view_err(self) -> Result<T, ViewError> {
        self.map_err(|err| ViewError::new(err.as_string().unwrap_or_else(|| format!("{err:?}"))))
    }
}
