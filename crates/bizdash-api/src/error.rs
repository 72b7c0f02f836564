use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bizdash_core::CoreError;
use bizdash_gbp::GbpError;
use bizdash_identity::IdentityError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    /// Non-2xx from an upstream collaborator; the status is mirrored outward
    /// when it is a valid HTTP code.
    #[error("upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Upstream { status, .. } => StatusCode::from_u16(*status)
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::Unauthenticated => ApiError::Unauthenticated,
            IdentityError::Forbidden(msg) => ApiError::Forbidden(msg),
            IdentityError::Validation(msg) => ApiError::BadRequest(msg),
            IdentityError::NotFound(msg) => ApiError::NotFound(msg),
            IdentityError::NoTokenFound => {
                ApiError::BadRequest("no Google account connected for this user".into())
            }
            IdentityError::TokenUnavailable { status, body } => ApiError::Upstream {
                status,
                message: body,
            },
            IdentityError::Upstream { status, message } => ApiError::Upstream { status, message },
            IdentityError::Http(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<GbpError> for ApiError {
    fn from(err: GbpError) -> Self {
        match err {
            GbpError::CallFailed { status, body, .. } => ApiError::Upstream {
                status,
                message: body,
            },
            GbpError::Transport { message, .. } => ApiError::Internal(message),
            GbpError::MalformedResponse { message, .. } => ApiError::Internal(message),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Unauthenticated => ApiError::Unauthenticated,
            CoreError::Unauthorized(msg) => ApiError::Forbidden(msg),
            CoreError::Upstream { status, message } => ApiError::Upstream { status, message },
            CoreError::NotFound(msg) => ApiError::NotFound(msg),
            CoreError::Validation(msg) => ApiError::BadRequest(msg),
            CoreError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
