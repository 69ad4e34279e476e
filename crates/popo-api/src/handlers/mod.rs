//! Request handlers organized by resource.

pub mod cache;
pub mod daily;
pub mod health;

use axum::http::StatusCode;
use popo_core::Error;

/// Map a core error to a response.
pub(crate) fn error_response(err: Error) -> (StatusCode, String) {
    let status = match &err {
        Error::DeadlineExceeded { .. } => StatusCode::GATEWAY_TIMEOUT,
        Error::InvalidDate(_) | Error::UnknownField(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string())
}
