//! # Error Handling Middleware
//!
//! This module provides a standardized way to handle errors in the OMMS
//! API. It maps domain-specific errors to HTTP status codes and renders
//! them through the same `{code, message, data}` envelope successful
//! responses use, so clients can branch on the body alone.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use omms_core::{errors::OmmsError, response::Envelope};
use serde_json::Value;

/// Application error wrapper that provides HTTP status code mapping
///
/// `AppError` wraps domain-specific `OmmsError` instances and implements
/// `IntoResponse` to convert them into envelope responses whose `code`
/// mirrors the HTTP status.
#[derive(Debug)]
pub struct AppError(pub OmmsError);

/// Converts application errors to HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.0.code();
        let status =
            StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Infrastructure failures carry detail the client must not see;
        // log them here and send the masked message.
        if let OmmsError::Database(report) = &self.0 {
            tracing::error!("database error: {report:?}");
        }

        let body = Json(Envelope::<Value>::err(code, self.0.client_message()));

        (status, body).into_response()
    }
}

/// Automatic conversion from OmmsError to AppError
///
/// This implementation allows using `?` operator with functions that return
/// `Result<T, OmmsError>` in handler functions that return `Result<T, AppError>`.
impl From<OmmsError> for AppError {
    fn from(err: OmmsError) -> Self {
        AppError(err)
    }
}

/// Automatic conversion from eyre::Report to AppError
///
/// Allows `?` on repository calls returning `eyre::Result`; the report is
/// wrapped as a database error.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(OmmsError::Database(err))
    }
}

/// Maps an OmmsError to an HTTP response.
pub fn map_error(err: OmmsError) -> Response {
    AppError(err).into_response()
}
