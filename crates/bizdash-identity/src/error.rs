use thiserror::Error;

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("no active session")]
    Unauthenticated,

    #[error("identity provider returned {status}: {body}")]
    TokenUnavailable { status: u16, body: String },

    #[error("no Google OAuth token on file for this user")]
    NoTokenFound,

    #[error("identity provider returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, IdentityError>;
