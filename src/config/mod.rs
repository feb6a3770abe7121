//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → consumed at startup by the server and the dispatcher
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; registries built from it never change
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    FilesConfig, GatewayConfig, LimitsConfig, ListenerConfig, ObservabilityConfig, SecurityConfig,
};
pub use validation::{validate_config, ValidationError};
