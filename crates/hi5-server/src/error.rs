use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::domain::{DecodeError, ParseError};

/// Body text shown in chat when the search or publish phase fails.
pub const INTERNAL_ERROR_TEXT: &str = "Internal Server Error";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Validation(#[from] ParseError),

    #[error("token mismatch")]
    Unauthorized,

    #[error("search api error: {0}")]
    Upstream(#[source] reqwest::Error),

    #[error("publish error: {0}")]
    Publish(#[source] reqwest::Error),
}

impl From<DecodeError> for AppError {
    fn from(err: DecodeError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl AppError {
    /// Plain text written to the webhook response body. The chat platform
    /// only displays a body that arrives with status 200.
    pub fn body_text(&self) -> String {
        match self {
            Self::BadRequest(_) => "Bad request".into(),
            Self::Validation(err) => err.to_string(),
            Self::Unauthorized => String::new(),
            Self::Upstream(_) | Self::Publish(_) => INTERNAL_ERROR_TEXT.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::OK,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), self.body_text()).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
