//! Request parsing.
//!
//! # Responsibilities
//! - Turn an axum request into a `Message`
//! - Reject the root path and malformed bodies
//! - Hand file uploads over as an unread stream
//!
//! # Design Decisions
//! - Resource path is the percent-decoded URL path, trailing slashes trimmed
//! - A missing or `null` payload is an empty body, not an error
//! - Only the first JSON value is decoded; trailing data is ignored
//! - File bodies are never buffered here; uploads are peeked for emptiness

use axum::body::{Body, Bytes, HttpBody};
use axum::http::{HeaderMap, Request, StatusCode};
use futures_util::{stream, StreamExt};
use percent_encoding::percent_decode_str;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::GatewayConfig;
use crate::message::{Message, MultiMap, RequestBody};

/// Failures that stop a request before a `Message` exists.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Root path '/' cannot be requested directly.")]
    RootPath,

    #[error("Request body cannot be empty for create file requests.")]
    EmptyFileBody,

    #[error("Request body is not a valid json.")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Request body could not be read: {0}")]
    UnreadableBody(String),

    #[error("Request body exceeds the limit of {limit} bytes.")]
    BodyTooLarge { limit: usize },
}

impl ParseError {
    pub fn status(&self) -> StatusCode {
        match self {
            ParseError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

/// Parsing knobs taken from configuration.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Resources starting with this prefix are file resources.
    pub files_prefix: String,
    /// Upper bound for buffered structured bodies.
    pub max_body_size: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            files_prefix: "/files".to_string(),
            max_body_size: 2 * 1024 * 1024,
        }
    }
}

impl From<&GatewayConfig> for ParseOptions {
    fn from(config: &GatewayConfig) -> Self {
        Self {
            files_prefix: config.files.resource_prefix.clone(),
            max_body_size: config.limits.max_body_size,
        }
    }
}

/// True if `res` addresses a file resource.
pub fn is_file_resource(res: &str, files_prefix: &str) -> bool {
    res.starts_with(files_prefix)
}

/// Commands whose file body must carry bytes. Reads and deletes still get
/// a (possibly empty) stream attached.
fn writes_content(command: &str) -> bool {
    matches!(command, "post" | "put" | "patch")
}

/// Build a `Message` from an inbound request.
pub async fn parse_request(
    request: Request<Body>,
    options: &ParseOptions,
) -> Result<Message, ParseError> {
    let (parts, body) = request.into_parts();

    let path = percent_decode_str(parts.uri.path()).decode_utf8_lossy();
    let res = path.trim_end_matches('/');
    if res.is_empty() {
        return Err(ParseError::RootPath);
    }

    let mut message = Message {
        res: res.to_string(),
        command: parts.method.as_str().to_lowercase(),
        headers: Some(collect_headers(&parts.headers)),
        parameters: Some(collect_query(parts.uri.query())),
        ..Message::default()
    };

    if is_file_resource(&message.res, &options.files_prefix) {
        let body = if writes_content(&message.command) {
            require_content(body).await?
        } else {
            body
        };
        message.req_body_raw = Some(RequestBody::new(body));
    } else {
        message.body = Some(decode_body(body, options.max_body_size).await?);
    }

    Ok(message)
}

/// Fail on an upload stream that ends without data, otherwise hand back an
/// equivalent stream with the first chunk put back in front.
async fn require_content(body: Body) -> Result<Body, ParseError> {
    if body.is_end_stream() || body.size_hint().exact() == Some(0) {
        return Err(ParseError::EmptyFileBody);
    }

    let mut chunks = body.into_data_stream();
    loop {
        match chunks.next().await {
            None => return Err(ParseError::EmptyFileBody),
            Some(Err(e)) => return Err(ParseError::UnreadableBody(e.to_string())),
            Some(Ok(chunk)) if chunk.is_empty() => continue,
            Some(Ok(chunk)) => {
                let first = stream::once(async move { Ok::<Bytes, axum::Error>(chunk) });
                return Ok(Body::from_stream(first.chain(chunks)));
            }
        }
    }
}

async fn decode_body(body: Body, limit: usize) -> Result<Map<String, Value>, ParseError> {
    if body.size_hint().lower() > limit as u64 {
        return Err(ParseError::BodyTooLarge { limit });
    }

    let mut chunks = body.into_data_stream();
    let mut bytes = Vec::new();
    while let Some(chunk) = chunks.next().await {
        let chunk = chunk.map_err(|e| ParseError::UnreadableBody(e.to_string()))?;
        if bytes.len() + chunk.len() > limit {
            return Err(ParseError::BodyTooLarge { limit });
        }
        bytes.extend_from_slice(&chunk);
    }

    let mut values =
        serde_json::Deserializer::from_slice(&bytes).into_iter::<Option<Map<String, Value>>>();
    match values.next() {
        None => Ok(Map::new()),
        Some(Ok(body)) => Ok(body.unwrap_or_default()),
        Some(Err(e)) => Err(ParseError::InvalidJson(e)),
    }
}

fn collect_headers(headers: &HeaderMap) -> MultiMap {
    let mut collected = MultiMap::new();
    for (name, value) in headers {
        collected
            .entry(name.as_str().to_string())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    collected
}

fn collect_query(query: Option<&str>) -> MultiMap {
    let mut collected = MultiMap::new();
    if let Some(query) = query {
        for (name, value) in url::form_urlencoded::parse(query.as_bytes()) {
            collected.entry(name.into_owned()).or_default().push(value.into_owned());
        }
    }
    collected
}
