//! The per-request dispatch sequence.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use futures_util::FutureExt;

use crate::dispatcher::DispatcherBuilder;
use crate::handlers::{FunctionRegistry, HandlerResult, Reply, ResourceHandler};
use crate::http::request::{parse_request, ParseOptions};
use crate::http::response::{build_response, print_error};
use crate::interceptors::{InterceptorRegistry, Phase};
use crate::message::{ApiError, Message, RequestScope};
use crate::observability::metrics;

/// Owns the frozen registries and runs the pipeline for each request.
pub struct Dispatcher {
    pub(crate) interceptors: InterceptorRegistry,
    pub(crate) functions: FunctionRegistry,
    pub(crate) resources: Arc<dyn ResourceHandler>,
    pub(crate) options: ParseOptions,
}

/// Final state of one dispatch, before serialization.
#[derive(Debug)]
pub struct Dispatched {
    /// The request as the handler saw it.
    pub request: Message,
    pub response: Message,
    pub scope: RequestScope,
    pub error: Option<ApiError>,
}

impl Dispatcher {
    /// Start registering interceptors and functions around a generic handler.
    pub fn builder(resources: impl ResourceHandler + 'static) -> DispatcherBuilder {
        DispatcherBuilder::new(resources)
    }

    pub fn interceptors(&self) -> &InterceptorRegistry {
        &self.interceptors
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse, dispatch and serialize one network request.
    pub async fn handle(self: &Arc<Self>, request: Request<Body>) -> Response {
        let start = Instant::now();

        let message = match parse_request(request, &self.options).await {
            Ok(message) => message,
            Err(err) => {
                metrics::record_request("unparsed", err.status().as_u16(), start);
                return print_error(&err);
            }
        };

        let dispatched = self.dispatch(message).await;
        if let Some(err) = &dispatched.error {
            tracing::warn!(
                res = %dispatched.request.res,
                command = %dispatched.request.command,
                error_code = err.code(),
                error_message = %err.message,
                "Got error."
            );
        } else if dispatched.response.is_empty() {
            tracing::debug!(res = %dispatched.request.res, "Pipeline produced an empty response");
        }

        let response = build_response(dispatched.response, dispatched.error.as_ref());
        metrics::record_request(&dispatched.request.command, response.status().as_u16(), start);
        response
    }

    /// Run BEFORE_EXEC, the handler, AFTER_EXEC, and schedule FINAL.
    pub async fn dispatch(self: &Arc<Self>, request: Message) -> Dispatched {
        let mut request = request;
        let mut scope = RequestScope::init();
        let mut response = Message::default();

        let before = self
            .interceptors
            .run_phase(
                &request.res,
                &request.command,
                Phase::BeforeExec,
                &scope,
                &request,
                &response,
            )
            .await;
        if let Some(edited) = before.scope {
            scope = edited;
        }
        let mut error = before.error;

        match before.response {
            Some(answer) => response = answer,
            None if error.is_none() => {
                if let Some(edited) = before.request {
                    request = edited;
                }
                let reply = self
                    .execute(request.clone(), scope.clone())
                    .await
                    .unwrap_or_else(|err| Reply::default().with_error(err));
                response = reply.response;
                if let Some(edited) = reply.scope {
                    scope = edited;
                }
                error = reply.error;
            }
            None => {}
        }

        let after = self
            .interceptors
            .run_phase(
                &request.res,
                &request.command,
                Phase::AfterExec,
                &scope,
                &request,
                &response,
            )
            .await;
        if let Some(edited) = after.response {
            response = edited;
        }
        if let Some(edited) = after.scope {
            scope = edited;
        }
        // A chain that ran replaces the prevailing error, clearing it on success.
        if after.executed > 0 {
            if let (Some(previous), None) = (&error, &after.error) {
                tracing::debug!(error = %previous, "AFTER_EXEC cleared a pending error");
            }
            error = after.error;
        }

        self.schedule_final(&request, &response, &scope);

        Dispatched {
            request,
            response,
            scope,
            error,
        }
    }

    /// Custom handler if one is registered for the resource, generic otherwise.
    async fn execute(&self, request: Message, scope: RequestScope) -> HandlerResult {
        if self.functions.contains(&request.res) {
            tracing::debug!(res = %request.res, "Executing function handler");
            self.functions.invoke(request, scope).await
        } else {
            self.resources.handle(request, scope).await
        }
    }

    /// Launch FINAL detached. Nothing waits for it and nothing it returns
    /// reaches the caller; panics are caught and logged.
    fn schedule_final(
        self: &Arc<Self>,
        request: &Message,
        response: &Message,
        scope: &RequestScope,
    ) {
        if !self.interceptors.has_match(&request.res, &request.command, Phase::Final) {
            return;
        }

        let dispatcher = Arc::clone(self);
        let (request, response, scope) = (request.clone(), response.clone(), scope.clone());
        tokio::spawn(async move {
            let run = dispatcher.interceptors.run_phase(
                &request.res,
                &request.command,
                Phase::Final,
                &scope,
                &request,
                &response,
            );
            match AssertUnwindSafe(run).catch_unwind().await {
                Ok(outcome) => {
                    if let Some(err) = outcome.error {
                        tracing::error!(
                            res = %request.res,
                            command = %request.command,
                            error = %err,
                            "FINAL interceptor failed"
                        );
                        metrics::record_final_failure();
                    }
                }
                Err(_) => {
                    tracing::error!(
                        res = %request.res,
                        command = %request.command,
                        "FINAL interceptor panicked"
                    );
                    metrics::record_final_failure();
                }
            }
        });
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("interceptors", &self.interceptors)
            .field("functions", &self.functions)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
