use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_with::SerializeDisplay;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ImageGenError>;

/// Normalized generation failure
///
/// Every outcome of a provider call that is not an image ends up as one of
/// these; provider-specific response shapes never reach callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageGenError {
    /// Caller supplied an unusable request (e.g. empty prompt)
    #[error("{0}")]
    InvalidInput(String),

    /// Provider or credential missing from configuration
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Provider rejected the request or could not be reached
    ///
    /// `status` is `None` when no HTTP response was received
    #[error("provider error: {message}")]
    Provider { status: Option<u16>, message: String },

    /// Account quota or credits exhausted
    #[error("quota exceeded: {message}")]
    QuotaExceeded { status: u16, message: String },

    /// Provider is throttling requests
    #[error("rate limited: {message}")]
    RateLimited { status: u16, message: String },

    /// Prompt refused by the provider's content policy
    #[error("content rejected: {message}")]
    ContentRejected { status: u16, message: String },

    /// Provider answered successfully but no known response shape matched
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}

/// Coarse classification of an [`ImageGenError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, SerializeDisplay)]
#[strum(serialize_all = "snake_case")]
pub enum FailureKind {
    InvalidInput,
    Configuration,
    Provider,
    QuotaExceeded,
    RateLimited,
    ContentRejected,
    MalformedResponse,
}

impl ImageGenError {
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::InvalidInput(_) => FailureKind::InvalidInput,
            Self::Configuration(_) => FailureKind::Configuration,
            Self::Provider { .. } => FailureKind::Provider,
            Self::QuotaExceeded { .. } => FailureKind::QuotaExceeded,
            Self::RateLimited { .. } => FailureKind::RateLimited,
            Self::ContentRejected { .. } => FailureKind::ContentRejected,
            Self::MalformedResponse(_) => FailureKind::MalformedResponse,
        }
    }

    /// HTTP status the provider answered with, if any
    pub const fn provider_status(&self) -> Option<u16> {
        match self {
            Self::Provider { status, .. } => *status,
            Self::QuotaExceeded { status, .. }
            | Self::RateLimited { status, .. }
            | Self::ContentRejected { status, .. } => Some(*status),
            Self::InvalidInput(_) | Self::Configuration(_) | Self::MalformedResponse(_) => None,
        }
    }

    /// Get the HTTP status code exposed to our own clients
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) | Self::ContentRejected { .. } => StatusCode::BAD_REQUEST,
            Self::QuotaExceeded { .. } => StatusCode::PAYMENT_REQUIRED,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Provider { status: Some(404), .. } => StatusCode::NOT_FOUND,
            Self::Configuration(_) | Self::Provider { .. } | Self::MalformedResponse(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Whether repeating the same request later might succeed
    ///
    /// Nothing retries automatically; this is only reported.
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } => true,
            Self::Provider { status, .. } => match status {
                None => true,
                Some(status) => *status >= 500,
            },
            Self::InvalidInput(_)
            | Self::Configuration(_)
            | Self::QuotaExceeded { .. }
            | Self::ContentRejected { .. }
            | Self::MalformedResponse(_) => false,
        }
    }

    /// Message shown to end users, distinct from the raw provider text
    pub fn client_message(&self) -> String {
        match self {
            Self::InvalidInput(message) => message.clone(),
            Self::Configuration(_) => "Image generation is not configured".to_string(),
            Self::Provider { .. } => "Failed to generate image".to_string(),
            Self::QuotaExceeded { .. } => {
                "Image generation quota exhausted. Please check the account plan or try again later.".to_string()
            }
            Self::RateLimited { .. } => "Rate limit exceeded. Please try again later.".to_string(),
            Self::ContentRejected { .. } => {
                "Your request violates content policy. Please modify your prompt and try again.".to_string()
            }
            Self::MalformedResponse(_) => "Image provider returned an unexpected response".to_string(),
        }
    }

    /// Underlying detail (raw provider message) when there is one
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::InvalidInput(_) => None,
            Self::Configuration(message) | Self::MalformedResponse(message) => Some(message),
            Self::Provider { message, .. }
            | Self::QuotaExceeded { message, .. }
            | Self::RateLimited { message, .. }
            | Self::ContentRejected { message, .. } => Some(message),
        }
    }
}

/// Error body returned to clients
#[derive(Debug, Serialize)]
struct ErrorResponse<'a> {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<&'a str>,
    kind: FailureKind,
}

impl IntoResponse for ImageGenError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = ErrorResponse {
            error: self.client_message(),
            detail: self.detail(),
            kind: self.kind(),
        };

        (status, Json(body)).into_response()
    }
}
