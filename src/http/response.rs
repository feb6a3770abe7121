//! Response assembly.
//!
//! # Responsibilities
//! - Serialize the final `Message` and error into an HTTP response
//! - Report parse failures before a `Message` exists
//!
//! # Design Decisions
//! - Content type is always JSON unless a response header overrides it
//! - Only the first value of each response header is sent
//! - Raw bytes are written before the structured body
//! - Serialization failures are logged and appended, never retracted

use axum::body::Body;
use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum::response::Response;
use serde_json::{Map, Value};

use crate::http::request::ParseError;
use crate::message::{ApiError, Message};
use crate::observability::metrics;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

const INTERNAL_ERROR_TEXT: &[u8] = b"Internal server error\n";

/// Build the network response from the final response and error.
pub fn build_response(mut response: Message, error: Option<&ApiError>) -> Response {
    if let Some(err) = error {
        if response.status == 0 {
            response.status = err.code();
        }
        if response.body.is_none() {
            response.body = Some(err.to_body());
        }
    }

    let mut status = match response.status {
        0 => StatusCode::OK,
        code => StatusCode::from_u16(code).unwrap_or_else(|_| {
            tracing::warn!(status = code, "Response carries an invalid status code");
            StatusCode::INTERNAL_SERVER_ERROR
        }),
    };

    let mut payload = Vec::with_capacity(response.raw_body.len());
    payload.extend_from_slice(&response.raw_body);

    if let Some(body) = &response.body {
        match serde_json::to_vec(body) {
            Ok(encoded) => payload.extend_from_slice(&encoded),
            Err(e) => {
                tracing::error!(error = %e, "Encoding response body failed.");
                metrics::record_serialization_failure();
                // Nothing has been written yet, so the status can still change.
                if response.status == 0 && response.raw_body.is_empty() {
                    status = StatusCode::INTERNAL_SERVER_ERROR;
                }
                payload.extend_from_slice(INTERNAL_ERROR_TEXT);
            }
        }
    }

    let mut http_response = Response::new(Body::from(payload));
    *http_response.status_mut() = status;

    let headers = http_response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
    for (name, values) in response.headers.iter().flatten() {
        let Some(first) = values.first() else {
            continue;
        };
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(first),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => tracing::warn!(header = %name, "Skipping invalid response header"),
        }
    }

    http_response
}

/// Report a parse failure: only the message text goes into the body.
pub fn print_error(err: &ParseError) -> Response {
    tracing::error!(status = err.status().as_u16(), "{}", err);

    let mut body = Map::new();
    body.insert("message".to_string(), Value::from(err.to_string()));

    let payload = serde_json::to_vec(&body).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Generating error message failed.");
        INTERNAL_ERROR_TEXT.to_vec()
    });

    let mut response = Response::new(Body::from(payload));
    *response.status_mut() = err.status();
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
    response
}
