//! JSON envelope shared by every REST endpoint.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// `{success, data?, error?}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

/// Error envelope with an explicit HTTP status.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = Json(ApiResponse::<()> {
        success: false,
        data: None,
        error: Some(message.into()),
    });
    (status, body).into_response()
}
