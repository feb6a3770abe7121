//! Canonical message model.
//!
//! # Data Flow
//! ```text
//! axum Request
//!     → http/request.rs (parse)
//!     → Message + RequestScope
//!     → interceptors / handlers (copies with edits)
//!     → http/response.rs (serialize)
//! ```
//!
//! # Design Decisions
//! - "No override" is `None` at every interceptor and handler boundary
//! - `Message::is_empty` still reports the all-zero construction
//! - The raw request stream is single-consumer; clones share one handle

pub mod body;
pub mod error;
pub mod model;
pub mod scope;

pub use body::RequestBody;
pub use error::ApiError;
pub use model::{FilePart, Message, MultiMap, MultipartForm};
pub use scope::RequestScope;
