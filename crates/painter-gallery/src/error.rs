use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GalleryError>;

/// Record store failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GalleryError {
    /// Request is missing a required field or carries an unusable one
    #[error("{0}")]
    InvalidInput(String),

    /// No record with the given id
    #[error("image record not found: {0}")]
    NotFound(String),

    /// A record with the supplied id already exists
    #[error("image record already exists: {0}")]
    Conflict(String),

    /// Backing medium could not be read or written
    #[error("persistence error: {0}")]
    Persistence(String),
}

impl GalleryError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<&'a str>,
}

impl IntoResponse for GalleryError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            Self::InvalidInput(message) => ErrorResponse {
                error: message,
                detail: None,
            },
            Self::NotFound(id) => ErrorResponse {
                error: "Image not found",
                detail: Some(id),
            },
            Self::Conflict(id) => ErrorResponse {
                error: "Image already exists",
                detail: Some(id),
            },
            Self::Persistence(message) => ErrorResponse {
                error: "Failed to access image storage",
                detail: Some(message),
            },
        };

        (status, Json(body)).into_response()
    }
}
