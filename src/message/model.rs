//! The request/response unit threaded through the pipeline.

use std::collections::HashMap;

use axum::body::Bytes;
use serde_json::{Map, Value};

use crate::message::body::RequestBody;

/// Name → ordered values. Used for headers and query parameters.
pub type MultiMap = HashMap<String, Vec<String>>;

/// A single uploaded file inside a multipart form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilePart {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Decoded `multipart/form-data` content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    pub values: MultiMap,
    pub files: HashMap<String, Vec<FilePart>>,
}

/// Canonical representation of an inbound request or an outbound response.
///
/// `Message::default()` is the empty message; see [`Message::is_empty`].
#[derive(Debug, Clone, Default)]
pub struct Message {
    /// Resource path, trailing slashes stripped.
    pub res: String,
    /// Lower-cased verb.
    pub command: String,
    pub headers: Option<MultiMap>,
    pub parameters: Option<MultiMap>,
    pub multipart: Option<MultipartForm>,
    /// Structured payload for every non-file resource.
    pub body: Option<Map<String, Value>>,
    /// Raw payload for binary responses.
    pub raw_body: Bytes,
    /// Unread upload stream, only set for file resources.
    pub req_body_raw: Option<RequestBody>,
    /// Response status, 0 = unset.
    pub status: u16,
}

impl Message {
    /// A response carrying a status and structured body.
    pub fn response(status: u16, body: Map<String, Value>) -> Self {
        Self {
            status,
            body: Some(body),
            ..Self::default()
        }
    }

    /// A response carrying only a status.
    pub fn with_status(status: u16) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    /// True only for the all-zero construction.
    pub fn is_empty(&self) -> bool {
        self.status == 0
            && self.res.is_empty()
            && self.command.is_empty()
            && self.headers.is_none()
            && self.parameters.is_none()
            && self.multipart.is_none()
            && self.body.is_none()
            && self.raw_body.is_empty()
            && self.req_body_raw.is_none()
    }

    /// First value of a header, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .as_ref()?
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .and_then(|(_, values)| values.first())
            .map(String::as_str)
    }

    /// Append a header value, keeping earlier values for the same name.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers
            .get_or_insert_with(MultiMap::new)
            .entry(name.into())
            .or_default()
            .push(value.into());
    }

    /// First value of a query parameter.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .as_ref()?
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Field of the structured body.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.body.as_ref()?.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_default_is_empty() {
        assert!(Message::default().is_empty());
    }

    #[test]
    fn test_any_field_makes_non_empty() {
        let variants: Vec<Message> = vec![
            Message {
                status: 200,
                ..Message::default()
            },
            Message {
                res: "/widgets".into(),
                ..Message::default()
            },
            Message {
                command: "get".into(),
                ..Message::default()
            },
            Message {
                headers: Some(MultiMap::new()),
                ..Message::default()
            },
            Message {
                parameters: Some(MultiMap::new()),
                ..Message::default()
            },
            Message {
                multipart: Some(MultipartForm::default()),
                ..Message::default()
            },
            Message {
                body: Some(Map::new()),
                ..Message::default()
            },
            Message {
                raw_body: Bytes::from_static(b"x"),
                ..Message::default()
            },
            Message {
                req_body_raw: Some(RequestBody::new(Body::empty())),
                ..Message::default()
            },
        ];

        for message in variants {
            assert!(!message.is_empty(), "{message:?} should not be empty");
        }
    }

    #[test]
    fn test_header_order_and_lookup() {
        let mut message = Message::default();
        message.add_header("accept", "text/html");
        message.add_header("accept", "application/json");

        assert_eq!(message.header("Accept"), Some("text/html"));
        let values = message.headers.as_ref().and_then(|h| h.get("accept")).unwrap();
        assert_eq!(values, &vec!["text/html".to_string(), "application/json".to_string()]);
    }
}
