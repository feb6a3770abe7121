//! Phase execution.
//!
//! # Responsibilities
//! - Run the resolved chain for one phase in order
//! - Fold request/scope edits into the running values
//! - Stop at the first response or error
//!
//! # Design Decisions
//! - The fold accumulator is the outcome itself; no shared mutable state
//! - A short-circuiting interceptor's own request/scope edits are kept
//! - Edits returned together with an error are kept; a bare `Err` has none

use crate::interceptors::{Interception, InterceptorRegistry, Phase};
use crate::message::{ApiError, Message, RequestScope};
use crate::observability::metrics;

/// Accumulated result of one phase.
#[derive(Debug, Default)]
pub struct PhaseOutcome {
    /// Last request edit, if any interceptor made one.
    pub request: Option<Message>,
    /// Response of the interceptor that short-circuited.
    pub response: Option<Message>,
    /// Last scope edit, if any interceptor made one.
    pub scope: Option<RequestScope>,
    pub error: Option<ApiError>,
    /// Number of interceptors invoked.
    pub executed: usize,
}

impl PhaseOutcome {
    /// True if an interceptor answered or failed.
    pub fn short_circuited(&self) -> bool {
        self.response.is_some() || self.error.is_some()
    }

    /// Fold one interceptor's edits in. True if the chain must stop.
    fn fold(&mut self, edit: Interception) -> bool {
        if let Some(request) = edit.request {
            self.request = Some(request);
        }
        if let Some(scope) = edit.scope {
            self.scope = Some(scope);
        }
        if let Some(response) = edit.response {
            self.response = Some(response);
        }
        if let Some(error) = edit.error {
            self.error = Some(error);
        }
        self.short_circuited()
    }
}

impl InterceptorRegistry {
    /// Run every interceptor registered for (`res`, `command`, `phase`).
    ///
    /// Each interceptor sees the request and scope as edited by the ones before
    /// it, and the `response` given here. An empty chain yields an empty outcome.
    pub async fn run_phase(
        &self,
        res: &str,
        command: &str,
        phase: Phase,
        scope: &RequestScope,
        request: &Message,
        response: &Message,
    ) -> PhaseOutcome {
        let mut outcome = PhaseOutcome::default();

        for interceptor in self.resolve(res, command, phase) {
            let current_request = outcome.request.clone().unwrap_or_else(|| request.clone());
            let current_scope = outcome.scope.clone().unwrap_or_else(|| scope.clone());
            outcome.executed += 1;

            let edit = interceptor
                .intercept(current_scope, current_request, response.clone())
                .await
                .unwrap_or_else(Interception::fail);

            if outcome.fold(edit) {
                tracing::debug!(
                    res,
                    command,
                    %phase,
                    position = outcome.executed,
                    failed = outcome.error.is_some(),
                    "Interceptor short-circuited"
                );
                metrics::record_short_circuit(phase);
                break;
            }
        }

        outcome
    }
}
