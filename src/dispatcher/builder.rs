//! Startup-time registration.

use std::sync::Arc;

use crate::dispatcher::Dispatcher;
use crate::handlers::{FunctionRegistry, ResourceHandler};
use crate::http::request::ParseOptions;
use crate::interceptors::{Interceptor, InterceptorRegistry, Phase};

/// Collects registrations, then freezes them into a [`Dispatcher`].
pub struct DispatcherBuilder {
    interceptors: InterceptorRegistry,
    functions: FunctionRegistry,
    resources: Arc<dyn ResourceHandler>,
    options: ParseOptions,
}

impl DispatcherBuilder {
    pub fn new(resources: impl ResourceHandler + 'static) -> Self {
        Self {
            interceptors: InterceptorRegistry::new(),
            functions: FunctionRegistry::new(),
            resources: Arc::new(resources),
            options: ParseOptions::default(),
        }
    }

    /// Bind `interceptor` to (`resource`, `command`, `phase`).
    pub fn add_interceptor(
        mut self,
        resource: &str,
        command: &str,
        phase: Phase,
        interceptor: impl Interceptor + 'static,
    ) -> Self {
        self.interceptors.add_interceptor(resource, command, phase, interceptor);
        self
    }

    /// Route `path` to a custom handler instead of the generic one.
    pub fn add_function(mut self, path: &str, handler: impl ResourceHandler + 'static) -> Self {
        self.functions.register(path, handler);
        self
    }

    pub fn options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Arc<Dispatcher> {
        tracing::info!(
            interceptors = self.interceptors.len(),
            functions = self.functions.len(),
            files_prefix = %self.options.files_prefix,
            "Dispatcher ready"
        );
        Arc::new(Dispatcher {
            interceptors: self.interceptors,
            functions: self.functions,
            resources: self.resources,
            options: self.options,
        })
    }
}
