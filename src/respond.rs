//! Terminal plain-text responses.
//!
//! Shapes every failure response the filter sends: always the status code,
//! and a plain-text body only when there is a message to show.

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

/// Exact content-type for plain-text failure bodies. The charset suffix
/// is a compatibility requirement for existing consumers.
pub const TEXT_PLAIN_UTF8: &str = "text/plain;charset=UTF-8";

/// Build a terminal response with the given status.
///
/// An absent or empty message produces an empty body with no content-type
/// header; otherwise the message bytes become the entire body.
pub fn respond_status(status: StatusCode, message: Option<&str>) -> Response {
    match message {
        Some(message) if !message.is_empty() => (
            status,
            [(header::CONTENT_TYPE, TEXT_PLAIN_UTF8)],
            message.to_string(),
        )
            .into_response(),
        _ => status.into_response(),
    }
}

/// `401 Unauthorized` with an optional plain-text body.
pub fn unauthorized(message: Option<&str>) -> Response {
    respond_status(StatusCode::UNAUTHORIZED, message)
}

/// `400 Bad Request` with an optional plain-text body.
pub fn bad_request(message: Option<&str>) -> Response {
    respond_status(StatusCode::BAD_REQUEST, message)
}

/// `404 Not Found` with an optional plain-text body.
pub fn not_found(message: Option<&str>) -> Response {
    respond_status(StatusCode::NOT_FOUND, message)
}
