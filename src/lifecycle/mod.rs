//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     GatewayConfig → register handlers and interceptors → Arc<Dispatcher>
//!
//! Shutdown (shutdown.rs):
//!     trigger() → every subscriber wakes → server drains and exits
//!
//! Signals (signals.rs):
//!     SIGINT/SIGTERM or internal trigger → graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Registries are complete before the listener accepts traffic
//! - Detached FINAL work is not awaited on shutdown

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::build_dispatcher;
