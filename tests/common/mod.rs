//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use dispatch_gateway::dispatcher::Dispatcher;
use dispatch_gateway::{
    GatewayConfig, HandlerResult, HttpServer, Message, Reply, RequestScope, ResourceHandler,
};

/// Fully layered router around `dispatcher`, with default configuration.
pub fn router(dispatcher: Arc<Dispatcher>) -> Router {
    HttpServer::new(GatewayConfig::default(), dispatcher).router()
}

/// Drive one request through `router` without a socket.
pub async fn send(
    router: Router,
    method: &str,
    uri: &str,
    body: impl Into<Body>,
) -> (StatusCode, Bytes) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(body.into())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes)
}

pub fn json(bytes: &Bytes) -> Value {
    serde_json::from_slice(bytes).unwrap()
}

/// Generic handler answering `status` with `{"handled": true}` and counting calls.
pub fn counting_handler(calls: Arc<AtomicUsize>, status: u16) -> impl ResourceHandler {
    move |_request: Message, _scope: RequestScope| {
        calls.fetch_add(1, Ordering::SeqCst);
        async move {
            let mut body = serde_json::Map::new();
            body.insert("handled".to_string(), Value::Bool(true));
            HandlerResult::Ok(Reply::new(Message::response(status, body)))
        }
    }
}
