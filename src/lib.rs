//! Request-dispatch gateway library.
//!
//! Every inbound request is parsed into a [`Message`], run through
//! BEFORE_EXEC interceptors, handed to exactly one handler (a registered
//! function or the generic resource handler), run through AFTER_EXEC
//! interceptors and serialized. FINAL interceptors run detached afterwards.

pub mod config;
pub mod dispatcher;
pub mod handlers;
pub mod http;
pub mod interceptors;
pub mod lifecycle;
pub mod message;
pub mod observability;
pub mod validator;

pub use config::GatewayConfig;
pub use dispatcher::{Dispatcher, DispatcherBuilder};
pub use handlers::{HandlerResult, Reply, ResourceHandler};
pub use http::HttpServer;
pub use interceptors::{Interception, Interceptor, InterceptorResult, Phase};
pub use lifecycle::Shutdown;
pub use message::{ApiError, Message, RequestScope};
