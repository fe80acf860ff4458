use std::fmt;

/// Fixed user-facing message for failures without an HTTP status
/// (network errors, unreadable bodies, malformed JSON).
pub const SERVICE_UNAVAILABLE_MESSAGE: &str =
    "Serviço indisponível. Tente novamente mais tarde.";

/// Central error type for every call that crosses the API boundary.
///
/// All failure causes collapse into this one kind: non-2xx statuses keep
/// their status code, transport and decode failures carry no status. The
/// message is always safe to show to a user; the underlying cause is
/// logged where it happens and never transported in the error itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub message: String,
    pub status: Option<u16>,
}

impl ApiError {
    pub fn new(message: impl Into<String>, status: Option<u16>) -> Self {
        Self {
            message: message.into(),
            status,
        }
    }

    /// Error for a response with a non-success HTTP status.
    pub fn from_status(status: u16) -> Self {
        Self {
            message: format!("Erro {}", status),
            status: Some(status),
        }
    }

    /// Error for failures that never produced an HTTP status.
    pub fn unavailable() -> Self {
        Self {
            message: SERVICE_UNAVAILABLE_MESSAGE.to_string(),
            status: None,
        }
    }

    pub fn is_status(&self, status: u16) -> bool {
        self.status == Some(status)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (HTTP {})", self.message, status),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ApiError {}
