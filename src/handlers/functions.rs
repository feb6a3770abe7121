//! Custom handler registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::handlers::{HandlerResult, ResourceHandler};
use crate::message::{ApiError, Message, RequestScope};

/// Resource-specific handlers that replace the generic handler entirely.
///
/// Keys are exact resource paths. Built at startup, read-only afterwards.
#[derive(Default, Clone)]
pub struct FunctionRegistry {
    handlers: HashMap<String, Arc<dyn ResourceHandler>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `path`. A later registration for the same path wins.
    pub fn register(&mut self, path: &str, handler: impl ResourceHandler + 'static) {
        let path = path.trim_end_matches('/').to_string();
        tracing::debug!(path = %path, "Function handler registered");
        if self.handlers.insert(path.clone(), Arc::new(handler)).is_some() {
            tracing::warn!(path = %path, "Function handler replaced");
        }
    }

    pub fn contains(&self, res: &str) -> bool {
        self.handlers.contains_key(res)
    }

    pub async fn invoke(&self, request: Message, scope: RequestScope) -> HandlerResult {
        match self.handlers.get(&request.res) {
            Some(handler) => handler.handle(request, scope).await,
            None => Err(ApiError::not_found(format!(
                "No function registered for '{}'.",
                request.res
            ))),
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}
