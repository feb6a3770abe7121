//! In-memory generic resource handler.
//!
//! # Responsibilities
//! - CRUD on JSON documents under `/<collection>` and `/<collection>/<id>`
//! - Streamed uploads and raw downloads under the file resource prefix
//!
//! # Design Decisions
//! - Concurrent maps, no global lock across requests
//! - Documents carry their id in `_id`
//! - Listing is sorted by id so responses are deterministic

use std::sync::Arc;

use axum::body::Bytes;
use axum::http::StatusCode;
use dashmap::DashMap;
use futures_util::StreamExt;
use futures_util::future::{BoxFuture, FutureExt};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::handlers::{HandlerResult, Reply, ResourceHandler};
use crate::http::request::is_file_resource;
use crate::message::{ApiError, Message, RequestBody, RequestScope};

const ID_FIELD: &str = "_id";
const OCTET_STREAM: &str = "application/octet-stream";
const EMPTY_UPLOAD: &str = "Request body cannot be empty for create file requests.";

#[derive(Debug, Clone)]
struct StoredFile {
    data: Bytes,
    content_type: String,
}

/// A generic resource handler keeping everything in process memory.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    /// collection → (id → document)
    documents: Arc<DashMap<String, DashMap<String, Map<String, Value>>>>,
    /// file resource path → contents
    files: Arc<DashMap<String, StoredFile>>,
    files_prefix: String,
}

impl MemoryStore {
    pub fn new(files_prefix: impl Into<String>) -> Self {
        Self {
            documents: Arc::new(DashMap::new()),
            files: Arc::new(DashMap::new()),
            files_prefix: files_prefix.into(),
        }
    }

    /// Number of documents in a collection.
    pub fn count(&self, collection: &str) -> usize {
        self.documents.get(collection).map(|c| c.len()).unwrap_or(0)
    }

    async fn serve(&self, request: Message) -> HandlerResult {
        if is_file_resource(&request.res, &self.files_prefix) {
            return self.serve_file(request).await;
        }

        let segments: Vec<&str> = request.res.trim_start_matches('/').split('/').collect();
        match segments.as_slice() {
            [collection] => self.serve_collection(collection, &request),
            [collection, id] => self.serve_document(collection, id, &request),
            _ => Err(not_found(&request.res)),
        }
    }

    fn serve_collection(&self, collection: &str, request: &Message) -> HandlerResult {
        match request.command.as_str() {
            "get" => {
                let mut results: Vec<Map<String, Value>> = self
                    .documents
                    .get(collection)
                    .map(|c| c.iter().map(|entry| entry.value().clone()).collect())
                    .unwrap_or_default();
                results.sort_by(|a, b| document_id(a).cmp(document_id(b)));

                let mut body = Map::new();
                body.insert(
                    "results".to_string(),
                    Value::Array(results.into_iter().map(Value::Object).collect()),
                );
                Ok(Reply::new(Message::response(200, body)))
            }
            "post" => {
                let id = Uuid::new_v4().simple().to_string();
                let mut document = request.body.clone().unwrap_or_default();
                document.insert(ID_FIELD.to_string(), Value::from(id.clone()));

                self.documents
                    .entry(collection.to_string())
                    .or_default()
                    .insert(id.clone(), document.clone());
                tracing::debug!(collection, id = %id, "Document created");
                Ok(Reply::new(Message::response(201, document)))
            }
            _ => Err(not_allowed(request)),
        }
    }

    fn serve_document(&self, collection: &str, id: &str, request: &Message) -> HandlerResult {
        let Some(documents) = self.documents.get(collection) else {
            return Err(not_found(&request.res));
        };

        match request.command.as_str() {
            "get" => documents
                .get(id)
                .map(|doc| Reply::new(Message::response(200, doc.value().clone())))
                .ok_or_else(|| not_found(&request.res)),
            "put" => {
                let mut document = documents.get_mut(id).ok_or_else(|| not_found(&request.res))?;
                let mut replacement = request.body.clone().unwrap_or_default();
                replacement.insert(ID_FIELD.to_string(), Value::from(id));
                *document = replacement.clone();
                Ok(Reply::new(Message::response(200, replacement)))
            }
            "patch" => {
                let mut document = documents.get_mut(id).ok_or_else(|| not_found(&request.res))?;
                for (key, value) in request.body.clone().unwrap_or_default() {
                    if key != ID_FIELD {
                        document.insert(key, value);
                    }
                }
                Ok(Reply::new(Message::response(200, document.value().clone())))
            }
            "delete" => documents
                .remove(id)
                .map(|_| Reply::new(Message::with_status(204)))
                .ok_or_else(|| not_found(&request.res)),
            _ => Err(not_allowed(request)),
        }
    }

    async fn serve_file(&self, request: Message) -> HandlerResult {
        let name = request.res[self.files_prefix.len()..].trim_matches('/');

        match (request.command.as_str(), name.is_empty()) {
            ("get", true) => {
                let mut results: Vec<Value> = self
                    .files
                    .iter()
                    .map(|entry| Value::Object(file_summary(entry.key(), &entry.value().data)))
                    .collect();
                results.sort_by(|a, b| a[ID_FIELD].as_str().cmp(&b[ID_FIELD].as_str()));

                let mut body = Map::new();
                body.insert("results".to_string(), Value::Array(results));
                Ok(Reply::new(Message::response(200, body)))
            }
            ("get", false) => {
                let file = self.files.get(name).ok_or_else(|| not_found(&request.res))?;
                let mut response = Message::with_status(200);
                response.raw_body = file.data.clone();
                response.add_header("content-type", file.content_type.clone());
                Ok(Reply::new(response))
            }
            ("post", _) | ("put", false) => {
                let name = if name.is_empty() {
                    Uuid::new_v4().simple().to_string()
                } else {
                    name.to_string()
                };
                let stream = request
                    .req_body_raw
                    .as_ref()
                    .ok_or_else(|| ApiError::bad_request(EMPTY_UPLOAD))?;
                let data = read_stream(stream).await?;
                let content_type = request
                    .header("content-type")
                    .unwrap_or(OCTET_STREAM)
                    .to_string();

                let summary = file_summary(&name, &data);
                tracing::debug!(file = %name, size = data.len(), "File stored");
                self.files.insert(name, StoredFile { data, content_type });

                let status = if request.command == "post" { 201 } else { 200 };
                Ok(Reply::new(Message::response(status, summary)))
            }
            ("delete", false) => self
                .files
                .remove(name)
                .map(|_| Reply::new(Message::with_status(204)))
                .ok_or_else(|| not_found(&request.res)),
            _ => Err(not_allowed(&request)),
        }
    }
}

impl ResourceHandler for MemoryStore {
    fn handle(&self, request: Message, _scope: RequestScope) -> BoxFuture<'_, HandlerResult> {
        self.serve(request).boxed()
    }
}

/// Drain an upload stream into memory.
async fn read_stream(body: &RequestBody) -> Result<Bytes, ApiError> {
    let body = body
        .take()
        .ok_or_else(|| ApiError::bad_request("Request body was already consumed."))?;

    let mut stream = body.into_data_stream();
    let mut data = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk
            .map_err(|e| ApiError::bad_request(format!("Reading request body failed: {e}")))?;
        data.extend_from_slice(&chunk);
    }
    Ok(Bytes::from(data))
}

fn file_summary(name: &str, data: &Bytes) -> Map<String, Value> {
    let mut summary = Map::new();
    summary.insert(ID_FIELD.to_string(), Value::from(name));
    summary.insert("size".to_string(), Value::from(data.len()));
    summary
}

fn document_id(document: &Map<String, Value>) -> &str {
    document.get(ID_FIELD).and_then(Value::as_str).unwrap_or_default()
}

fn not_found(res: &str) -> ApiError {
    ApiError::not_found(format!("Resource '{res}' not found."))
}

fn not_allowed(request: &Message) -> ApiError {
    ApiError::new(
        StatusCode::METHOD_NOT_ALLOWED,
        format!("Command '{}' is not allowed on '{}'.", request.command, request.res),
    )
}
