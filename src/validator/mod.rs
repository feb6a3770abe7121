//! Request body validation interceptors.
//!
//! # Data Flow
//! ```text
//! BEFORE_EXEC chain
//!     → fields.rs  required / forbidden / unexpected field checks (400)
//!     → typed.rs   decode into a type and run its own checks (500)
//! ```
//!
//! # Design Decisions
//! - Validators never edit the request; they pass or fail
//! - Rules are ordered maps so the reported field is deterministic

pub mod fields;
pub mod typed;

pub use fields::{
    validate_exact_input_fields, validate_input_fields, FieldRules, InputFieldValidator,
};
pub use typed::{BodyValidator, Validate};
