//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Request<Body>
//!     → PARSE     http/request.rs (ParseError → print_error, stop)
//!     → BEFORE    interceptors (response or error skips DISPATCH)
//!     → DISPATCH  function handler | generic resource handler
//!     → AFTER     interceptors (response/scope edits, error replaces error)
//!     → FINAL     spawned, not awaited
//!     → RESPOND   http/response.rs
//! ```
//!
//! # Design Decisions
//! - Registries are frozen by the builder and shared read-only via Arc
//! - PARSE → AFTER run sequentially on the request's own task
//! - AFTER cannot change the request that was dispatched
//! - No timeouts or cancellation inside the pipeline

pub mod builder;
pub mod pipeline;

pub use builder::DispatcherBuilder;
pub use pipeline::{Dispatched, Dispatcher};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{HandlerResult, Reply, ResourceHandler};
    use crate::interceptors::{Interception, InterceptorResult, Phase};
    use crate::message::{ApiError, Message, RequestScope};
    use axum::http::StatusCode;
    use serde_json::{json, Map, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn counted_handler(counter: Arc<AtomicUsize>, status: u16) -> impl ResourceHandler {
        move |_req: Message, scope: RequestScope| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move {
                let reply = Reply::new(Message::with_status(status))
                    .with_scope(scope.with("handled", true));
                HandlerResult::Ok(reply)
            }
        }
    }

    fn request(res: &str, command: &str) -> Message {
        Message {
            res: res.into(),
            command: command.into(),
            ..Message::default()
        }
    }

    fn body(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn test_function_takes_precedence() {
        let generic = Arc::new(AtomicUsize::new(0));
        let custom = Arc::new(AtomicUsize::new(0));
        let dispatcher = Dispatcher::builder(counted_handler(generic.clone(), 200))
            .add_function("/reports", counted_handler(custom.clone(), 202))
            .build();

        let dispatched = dispatcher.dispatch(request("/reports", "get")).await;
        assert_eq!(dispatched.response.status, 202);
        assert!(dispatched.scope.contains_key("handled"));
        assert_eq!(custom.load(Ordering::SeqCst), 1);
        assert_eq!(generic.load(Ordering::SeqCst), 0);

        dispatcher.dispatch(request("/reports/1", "get")).await;
        assert_eq!(generic.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_before_error_skips_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = Dispatcher::builder(counted_handler(calls.clone(), 200))
            .add_interceptor(
                "*",
                "*",
                Phase::BeforeExec,
                |_s: RequestScope, _q: Message, _r: Message| async {
                    InterceptorResult::Err(ApiError::new(StatusCode::UNAUTHORIZED, "missing key"))
                },
            )
            .build();

        let dispatched = dispatcher.dispatch(request("/widgets", "get")).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(dispatched.response.is_empty());
        assert_eq!(dispatched.error.unwrap().status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_before_error_scope_reaches_after() {
        let seen = Arc::new(Mutex::new(None::<Value>));
        let seen_by_after = seen.clone();
        let dispatcher = Dispatcher::builder(counted_handler(Arc::new(AtomicUsize::new(0)), 200))
            .add_interceptor(
                "/widgets",
                "*",
                Phase::BeforeExec,
                |scope: RequestScope, _q: Message, _r: Message| async move {
                    let err = ApiError::new(StatusCode::UNAUTHORIZED, "bad key");
                    let edit = Interception::fail(err).with_scope(scope.with("auth_failed", true));
                    InterceptorResult::Ok(edit)
                },
            )
            .add_interceptor(
                "/widgets",
                "*",
                Phase::AfterExec,
                move |scope: RequestScope, _q: Message, _r: Message| {
                    *seen_by_after.lock().unwrap() = scope.get("auth_failed").cloned();
                    async {
                        InterceptorResult::Err(ApiError::new(StatusCode::UNAUTHORIZED, "bad key"))
                    }
                },
            )
            .build();

        let dispatched = dispatcher.dispatch(request("/widgets", "get")).await;
        assert_eq!(*seen.lock().unwrap(), Some(json!(true)));
        assert!(dispatched.scope.contains_key("auth_failed"));
        assert!(!dispatched.scope.contains_key("handled"));
        assert_eq!(dispatched.error.unwrap().status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_before_request_edit_reaches_handler() {
        let dispatcher = Dispatcher::builder(|req: Message, _scope: RequestScope| async move {
            let status = if req.header("x-auth").is_some() { 200 } else { 401 };
            HandlerResult::Ok(Reply::new(Message::with_status(status)))
        })
        .add_interceptor(
            "/widgets",
            "get",
            Phase::BeforeExec,
            |_s: RequestScope, mut req: Message, _r: Message| async move {
                req.add_header("x-auth", "ok");
                InterceptorResult::Ok(Interception::pass().with_request(req))
            },
        )
        .build();

        let dispatched = dispatcher.dispatch(request("/widgets", "get")).await;
        assert_eq!(dispatched.response.status, 200);
        assert_eq!(dispatched.request.header("x-auth"), Some("ok"));
    }

    #[tokio::test]
    async fn test_handler_error_kept_without_after_chain() {
        let dispatcher = Dispatcher::builder(|_req: Message, _scope: RequestScope| async {
            HandlerResult::Err(ApiError::not_found("gone"))
        })
        .build();

        let dispatched = dispatcher.dispatch(request("/widgets/1", "get")).await;
        assert_eq!(dispatched.error.unwrap().status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_handler_error_keeps_response_and_scope() {
        let dispatcher = Dispatcher::builder(|_req: Message, scope: RequestScope| async move {
            let conflict = Message::response(409, body(json!({"conflict": "name"})));
            let reply = Reply::new(conflict)
                .with_scope(scope.with("attempted", true))
                .with_error(ApiError::new(StatusCode::CONFLICT, "duplicate"));
            HandlerResult::Ok(reply)
        })
        .build();

        let dispatched = dispatcher.dispatch(request("/widgets", "post")).await;
        assert_eq!(dispatched.response.field("conflict"), Some(&json!("name")));
        assert!(dispatched.scope.contains_key("attempted"));
        assert_eq!(dispatched.error.unwrap().status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_after_success_clears_handler_error() {
        let dispatcher = Dispatcher::builder(|_req: Message, _scope: RequestScope| async {
            HandlerResult::Err(ApiError::not_found("gone"))
        })
        .add_interceptor(
            "*",
            "*",
            Phase::AfterExec,
            |_s: RequestScope, _q: Message, _r: Message| async {
                InterceptorResult::Ok(Interception::pass())
            },
        )
        .build();

        let dispatched = dispatcher.dispatch(request("/widgets/1", "get")).await;
        assert!(dispatched.error.is_none());
    }

    #[tokio::test]
    async fn test_after_replaces_response() {
        let dispatcher = Dispatcher::builder(counted_handler(Arc::new(AtomicUsize::new(0)), 200))
            .add_interceptor(
                "/widgets",
                "get",
                Phase::AfterExec,
                |scope: RequestScope, _q: Message, response: Message| async move {
                    assert_eq!(response.status, 200);
                    let mut wrapped = Message::response(203, body(json!({"wrapped": true})));
                    wrapped.add_header("x-wrapped", "1");
                    let edit =
                        Interception::respond(wrapped).with_scope(scope.with("wrapped", true));
                    InterceptorResult::Ok(edit)
                },
            )
            .build();

        let dispatched = dispatcher.dispatch(request("/widgets", "get")).await;
        assert_eq!(dispatched.response.status, 203);
        assert_eq!(dispatched.response.header("x-wrapped"), Some("1"));
        assert!(dispatched.scope.contains_key("handled"));
        assert!(dispatched.scope.contains_key("wrapped"));
        assert!(dispatched.error.is_none());
    }

    #[tokio::test]
    async fn test_after_sees_before_short_circuit() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(0u16));
        let seen_by_after = seen.clone();
        let dispatcher = Dispatcher::builder(counted_handler(calls.clone(), 200))
            .add_interceptor(
                "/widgets",
                "post",
                Phase::BeforeExec,
                |_s: RequestScope, _q: Message, _r: Message| async {
                    let blocked = Message::response(403, body(json!({"reason": "blocked"})));
                    InterceptorResult::Ok(Interception::respond(blocked))
                },
            )
            .add_interceptor(
                "/widgets",
                "post",
                Phase::AfterExec,
                move |_s: RequestScope, _q: Message, response: Message| {
                    *seen_by_after.lock().unwrap() = response.status;
                    async { InterceptorResult::Ok(Interception::pass()) }
                },
            )
            .build();

        let dispatched = dispatcher.dispatch(request("/widgets", "post")).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(*seen.lock().unwrap(), 403);
        assert_eq!(dispatched.response.field("reason"), Some(&json!("blocked")));
    }
}
