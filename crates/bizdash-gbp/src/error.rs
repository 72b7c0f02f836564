use bizdash_core::Endpoint;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GbpError {
    /// The upstream answered with a non-2xx status. Endpoint, status and
    /// body are kept intact so the diagnostic classifier can consume them.
    #[error("{} returned {status}: {body}", .endpoint.display_name())]
    CallFailed {
        endpoint: Endpoint,
        status: u16,
        body: String,
    },

    /// The request never produced an HTTP response (DNS, TLS, timeout).
    #[error("{} unreachable: {message}", .endpoint.display_name())]
    Transport {
        endpoint: Endpoint,
        message: String,
    },

    #[error("unexpected response shape from {}: {message}", .endpoint.display_name())]
    MalformedResponse {
        endpoint: Endpoint,
        message: String,
    },
}

impl GbpError {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            GbpError::CallFailed { endpoint, .. }
            | GbpError::Transport { endpoint, .. }
            | GbpError::MalformedResponse { endpoint, .. } => *endpoint,
        }
    }

    /// Status code for classification; 0 when no HTTP response was received.
    pub fn status(&self) -> u16 {
        match self {
            GbpError::CallFailed { status, .. } => *status,
            _ => 0,
        }
    }
}

pub type Result<T> = std::result::Result<T, GbpError>;
