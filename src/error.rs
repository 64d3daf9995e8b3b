use std::fmt;


// Something the presentation layer could not do: a missing DOM target, an unreadable attribute.
// On a server-rendered page these are setup preconditions, so callers usually just bubble them.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ViewError {
    pub message: String,
}

impl ViewError {
    pub fn new(message: impl Into<String>) -> Self { ViewError { message: message.into() } }
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.message) }
}

impl std::error::Error for ViewError {}

#[macro_export]
macro_rules! view_error {
    ($($arg:tt)*) => {
        $crate::error::ViewError::new(format!($($arg)*))
    };
}


#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ClientError {
    View(ViewError),
    MalformedResponse(String),
    InvalidSettings(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::View(err) => write!(f, "View error: {err}"),
            ClientError::MalformedResponse(msg) => write!(f, "Malformed server response: {msg}"),
            ClientError::InvalidSettings(msg) => write!(f, "Invalid settings: {msg}"),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<ViewError> for ClientError {
    fn from(err: ViewError) -> Self { ClientError::View(err) }
}
