//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the generic resource handler from configuration
//! - Register built-in custom functions
//! - Freeze everything into a dispatcher before the listener starts
//!
//! # Design Decisions
//! - Fail fast: configuration is validated before this runs
//! - Embedding applications use `Dispatcher::builder` directly for their own
//!   interceptors and functions

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::config::GatewayConfig;
use crate::dispatcher::{Dispatcher, DispatcherBuilder};
use crate::handlers::{HandlerResult, MemoryStore, Reply};
use crate::http::request::ParseOptions;
use crate::message::{Message, RequestScope};

/// Resource path answered by the built-in liveness function.
pub const HEALTH_PATH: &str = "/health";

/// Registrations every gateway starts with.
pub fn default_builder(config: &GatewayConfig) -> DispatcherBuilder {
    Dispatcher::builder(MemoryStore::new(config.files.resource_prefix.clone()))
        .options(ParseOptions::from(config))
        .add_function(HEALTH_PATH, health)
}

/// Build the dispatcher used by the standalone binary.
pub fn build_dispatcher(config: &GatewayConfig) -> Arc<Dispatcher> {
    default_builder(config).build()
}

async fn health(_request: Message, _scope: RequestScope) -> HandlerResult {
    let mut body = Map::new();
    body.insert("status".to_string(), Value::from("ok"));
    body.insert("version".to_string(), Value::from(env!("CARGO_PKG_VERSION")));
    Ok(Reply::new(Message::response(200, body)))
}
