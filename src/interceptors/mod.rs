//! Interceptor subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     add_interceptor(resource, command, phase, interceptor)
//!     → registry.rs (ordered registrations, frozen once built)
//!
//! Per request, per phase:
//!     registry.rs resolve(res, command, phase)   (matcher.rs)
//!     → executor.rs fold over the chain
//!     → PhaseOutcome { request?, response?, scope?, error? }
//! ```
//!
//! # Design Decisions
//! - First registered, first executed
//! - A response or an error stops the chain; request/scope edits flow on
//! - `None` means "no change" for every edited value

pub mod executor;
pub mod matcher;
pub mod registry;

use std::fmt;
use std::future::Future;

use futures_util::future::{BoxFuture, FutureExt};

use crate::message::{ApiError, Message, RequestScope};

pub use executor::PhaseOutcome;
pub use matcher::{CommandPattern, KeyMatcher, ResourcePattern};
pub use registry::InterceptorRegistry;

/// Point in the dispatch sequence where interceptors run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Before the handler. May edit the request or answer on its behalf.
    BeforeExec,
    /// After the handler. May edit the response and scope.
    AfterExec,
    /// Detached, once the response is decided. Outputs are discarded.
    Final,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::BeforeExec => "BEFORE_EXEC",
            Phase::AfterExec => "AFTER_EXEC",
            Phase::Final => "FINAL",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Edits produced by one interceptor.
///
/// An error set here stops the chain like `Err` does, but the request and
/// scope edits made alongside it are kept.
#[derive(Debug, Clone, Default)]
pub struct Interception {
    pub request: Option<Message>,
    pub response: Option<Message>,
    pub scope: Option<RequestScope>,
    pub error: Option<ApiError>,
}

impl Interception {
    /// No edits; the chain continues.
    pub fn pass() -> Self {
        Self::default()
    }

    /// Answer with `response`, stopping the chain.
    pub fn respond(response: Message) -> Self {
        Self {
            response: Some(response),
            ..Self::default()
        }
    }

    /// Fail with `error`, stopping the chain. Chain edits onto it to keep them.
    pub fn fail(error: ApiError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    pub fn with_request(mut self, request: Message) -> Self {
        self.request = Some(request);
        self
    }

    pub fn with_scope(mut self, scope: RequestScope) -> Self {
        self.scope = Some(scope);
        self
    }
}

/// `Err(e)` is shorthand for `Ok(Interception::fail(e))`.
pub type InterceptorResult = Result<Interception, ApiError>;

/// A unit of cross-cutting behavior bound to a (resource, command, phase) key.
///
/// Async closures of the shape `Fn(RequestScope, Message, Message) -> Fut`
/// implement this trait, taking (scope, request, response-so-far).
pub trait Interceptor: Send + Sync {
    fn intercept(
        &self,
        scope: RequestScope,
        request: Message,
        response: Message,
    ) -> BoxFuture<'_, InterceptorResult>;
}

impl<F, Fut> Interceptor for F
where
    F: Fn(RequestScope, Message, Message) -> Fut + Send + Sync,
    Fut: Future<Output = InterceptorResult> + Send + 'static,
{
    fn intercept(
        &self,
        scope: RequestScope,
        request: Message,
        response: Message,
    ) -> BoxFuture<'_, InterceptorResult> {
        self(scope, request, response).boxed()
    }
}
