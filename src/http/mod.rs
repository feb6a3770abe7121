//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, catch-all route)
//!     → request.rs (parse into Message, or ParseError)
//!     → [dispatcher runs the interceptor phases and a handler]
//!     → response.rs (serialize Message + error)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{parse_request, ParseError, ParseOptions};
pub use response::{build_response, print_error};
pub use server::{AppState, HttpServer};
