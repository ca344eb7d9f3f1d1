use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{Html, IntoResponse},
};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

#[derive(Debug, ThisError)]
pub enum LinkHubError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("request body too large")]
    PayloadTooLarge,

    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    #[error("media storage error: {0}")]
    Media(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl LinkHubError {
    pub fn status(&self) -> StatusCode {
        match self {
            LinkHubError::Validation(_) => StatusCode::BAD_REQUEST,
            LinkHubError::Unauthorized => StatusCode::UNAUTHORIZED,
            LinkHubError::NotFound(_) => StatusCode::NOT_FOUND,
            LinkHubError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            LinkHubError::Database(_)
            | LinkHubError::Media(_)
            | LinkHubError::Io(_)
            | LinkHubError::Config(_)
            | LinkHubError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to a client. Server-side failures are collapsed
    /// into a generic sentence; the detail only goes to the log.
    pub fn public_message(&self) -> String {
        match self {
            LinkHubError::Validation(msg) => msg.clone(),
            LinkHubError::Unauthorized => "Unauthorized".to_string(),
            LinkHubError::NotFound(_) => "Link not found.".to_string(),
            LinkHubError::PayloadTooLarge => "Upload is too large.".to_string(),
            LinkHubError::Database(_) => "Database error".to_string(),
            LinkHubError::Media(_) => "Image upload failed".to_string(),
            LinkHubError::Io(_) | LinkHubError::Config(_) | LinkHubError::Internal(_) => {
                "Server error".to_string()
            }
        }
    }

    fn log(&self) {
        if self.status().is_server_error() {
            error!(error = %self, "request failed");
        }
    }
}

impl IntoResponse for LinkHubError {
    fn into_response(self) -> axum::response::Response {
        self.log();
        let status = self.status();
        let page = crate::views::error_page(status, &self.public_message());
        (status, Html(page.into_string())).into_response()
    }
}

impl From<JsonRejection> for LinkHubError {
    fn from(e: JsonRejection) -> Self {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            LinkHubError::PayloadTooLarge
        } else {
            LinkHubError::Validation(e.body_text())
        }
    }
}

/// JSON error envelope for the machine-facing endpoints.
#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub success: bool,
    pub message: String,
}

/// Wraps [`LinkHubError`] so that it renders as `{success: false, message}`.
#[derive(Debug)]
pub struct ApiFailure(pub LinkHubError);

impl From<LinkHubError> for ApiFailure {
    fn from(e: LinkHubError) -> Self {
        ApiFailure(e)
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> axum::response::Response {
        let ApiFailure(err) = self;
        err.log();
        let body = ApiErrorBody {
            success: false,
            message: err.public_message(),
        };
        (err.status(), Json(body)).into_response()
    }
}
