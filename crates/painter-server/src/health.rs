use axum::{Json, response::IntoResponse};
use http::StatusCode;
use serde::Serialize;

/// Health check handler
pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    status: &'static str,
}

/// API status handler used by the front-end to probe the backend
pub async fn status_handler() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "API is operational",
    })
}
