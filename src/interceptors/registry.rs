//! Interceptor storage and lookup.
//!
//! # Responsibilities
//! - Store interceptors under (resource, command, phase) keys
//! - Resolve the ordered chain for a request
//!
//! # Design Decisions
//! - Populated at startup, read-only while serving (shared via Arc)
//! - Registration order is execution order
//! - No removal

use std::fmt;
use std::sync::Arc;

use crate::interceptors::matcher::KeyMatcher;
use crate::interceptors::{Interceptor, Phase};

struct Registration {
    key: KeyMatcher,
    phase: Phase,
    interceptor: Arc<dyn Interceptor>,
}

#[derive(Default)]
pub struct InterceptorRegistry {
    entries: Vec<Registration>,
}

impl InterceptorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an interceptor. `resource` and `command` accept `*` wildcards;
    /// `resource` also accepts `<prefix>/*`.
    pub fn add_interceptor(
        &mut self,
        resource: &str,
        command: &str,
        phase: Phase,
        interceptor: impl Interceptor + 'static,
    ) {
        tracing::debug!(resource, command, %phase, "Interceptor registered");
        self.entries.push(Registration {
            key: KeyMatcher::new(resource, command),
            phase,
            interceptor: Arc::new(interceptor),
        });
    }

    /// Interceptors matching the key, in registration order.
    pub fn resolve(&self, res: &str, command: &str, phase: Phase) -> Vec<Arc<dyn Interceptor>> {
        self.entries
            .iter()
            .filter(|entry| entry.phase == phase && entry.key.matches(res, command))
            .map(|entry| Arc::clone(&entry.interceptor))
            .collect()
    }

    /// True if at least one interceptor would run for the key.
    pub fn has_match(&self, res: &str, command: &str, phase: Phase) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.phase == phase && entry.key.matches(res, command))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for InterceptorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|entry| (&entry.key, entry.phase)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interceptors::{Interception, InterceptorResult};
    use crate::message::{Message, RequestScope};

    fn tagged(tag: &'static str) -> impl Interceptor {
        move |scope: RequestScope, _req: Message, _res: Message| async move {
            InterceptorResult::Ok(Interception::pass().with_scope(scope.with("tag", tag)))
        }
    }

    async fn tags(
        registry: &InterceptorRegistry,
        res: &str,
        command: &str,
        phase: Phase,
    ) -> Vec<String> {
        let mut out = Vec::new();
        for interceptor in registry.resolve(res, command, phase) {
            let edit = interceptor
                .intercept(RequestScope::init(), Message::default(), Message::default())
                .await
                .unwrap();
            out.push(edit.scope.unwrap().get_as::<String>("tag").unwrap());
        }
        out
    }

    #[tokio::test]
    async fn test_resolution_keeps_registration_order() {
        let mut registry = InterceptorRegistry::new();
        registry.add_interceptor("*", "*", Phase::BeforeExec, tagged("any"));
        registry.add_interceptor("/widgets", "post", Phase::BeforeExec, tagged("exact"));
        registry.add_interceptor("/widgets/*", "*", Phase::BeforeExec, tagged("prefix"));
        registry.add_interceptor("/widgets", "post", Phase::AfterExec, tagged("after"));

        assert_eq!(
            tags(&registry, "/widgets", "post", Phase::BeforeExec).await,
            vec!["any", "exact", "prefix"]
        );
        assert_eq!(
            tags(&registry, "/widgets/7", "get", Phase::BeforeExec).await,
            vec!["any", "prefix"]
        );
        assert_eq!(tags(&registry, "/widgets", "post", Phase::AfterExec).await, vec!["after"]);
        assert!(tags(&registry, "/widgets", "get", Phase::Final).await.is_empty());
    }

    #[test]
    fn test_has_match() {
        let mut registry = InterceptorRegistry::new();
        assert!(registry.is_empty());
        registry.add_interceptor("/files/*", "post", Phase::Final, tagged("final"));

        assert_eq!(registry.len(), 1);
        assert!(registry.has_match("/files/a", "post", Phase::Final));
        assert!(!registry.has_match("/files/a", "get", Phase::Final));
        assert!(!registry.has_match("/files/a", "post", Phase::BeforeExec));
    }
}
