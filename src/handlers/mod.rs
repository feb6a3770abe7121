//! Request handlers.
//!
//! # Data Flow
//! ```text
//! Dispatcher (after BEFORE_EXEC)
//!     → functions.rs   custom handler registered for the exact resource
//!     → memory.rs      otherwise, the generic resource handler
//!     → Reply { response, scope?, error? } | ApiError
//! ```
//!
//! # Design Decisions
//! - One trait for custom and generic handlers
//! - A registered custom handler always wins over the generic one
//! - Handlers own the request; file streams are consumed at most once

pub mod functions;
pub mod memory;

use std::future::Future;

use futures_util::future::{BoxFuture, FutureExt};

use crate::message::{ApiError, Message, RequestScope};

pub use functions::FunctionRegistry;
pub use memory::MemoryStore;

/// What a handler hands back.
///
/// A handler that fails but still has a response or scope to report sets
/// `error` here instead of returning `Err`.
#[derive(Debug, Clone, Default)]
pub struct Reply {
    pub response: Message,
    /// Replacement scope, `None` to keep the current one.
    pub scope: Option<RequestScope>,
    pub error: Option<ApiError>,
}

impl Reply {
    pub fn new(response: Message) -> Self {
        Self {
            response,
            ..Self::default()
        }
    }

    pub fn with_error(mut self, error: ApiError) -> Self {
        self.error = Some(error);
        self
    }

    pub fn with_scope(mut self, scope: RequestScope) -> Self {
        self.scope = Some(scope);
        self
    }
}

/// `Err(e)` is shorthand for a `Reply` with an empty response and error `e`.
pub type HandlerResult = Result<Reply, ApiError>;

/// Turns a request into a response.
///
/// Implemented by async closures of the shape `Fn(Message, RequestScope) -> Fut`.
pub trait ResourceHandler: Send + Sync {
    fn handle(&self, request: Message, scope: RequestScope) -> BoxFuture<'_, HandlerResult>;
}

impl<F, Fut> ResourceHandler for F
where
    F: Fn(Message, RequestScope) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn handle(&self, request: Message, scope: RequestScope) -> BoxFuture<'_, HandlerResult> {
        self(request, scope).boxed()
    }
}
