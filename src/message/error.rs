//! Errors raised by interceptors and handlers.

use axum::http::StatusCode;
use serde_json::{Map, Value};
use thiserror::Error;

/// An error carried through the pipeline into response assembly.
///
/// Serialized on the wire as `{"code": <int>, "message": <string>}`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (status {status})")]
pub struct ApiError {
    /// Status code adopted by the response when it has none of its own.
    pub status: StatusCode,
    /// Human readable message.
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Numeric code written into the error body.
    pub fn code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Body synthesized when a failed response carries none.
    pub fn to_body(&self) -> Map<String, Value> {
        let mut body = Map::new();
        body.insert("code".to_string(), Value::from(self.code()));
        body.insert("message".to_string(), Value::from(self.message.clone()));
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_shape() {
        let err = ApiError::new(StatusCode::FORBIDDEN, "nope");
        let body = err.to_body();
        assert_eq!(body.get("code"), Some(&Value::from(403)));
        assert_eq!(body.get("message"), Some(&Value::from("nope")));
        assert_eq!(body.len(), 2);
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::bad_request("Input must contain 'name' field.");
        assert_eq!(
            err.to_string(),
            "Input must contain 'name' field. (status 400 Bad Request)"
        );
    }
}
