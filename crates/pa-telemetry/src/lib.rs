//! # Phone-Attest Telemetry
//!
//! `tracing` subscriber setup and logging macros shared by every crate.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pa_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     init_logging(&config).expect("Failed to init logging");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `PA_SERVICE_NAME` | `phone-attest` | Service name in log lines |
//! | `PA_LOG_LEVEL` | `info` | Log filter (falls back to `RUST_LOG`) |
//! | `PA_JSON_LOGS` | `false` | JSON output |
//! | `PA_ANSI` | `true` | Coloured output |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::init_logging;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    #[error("A global tracing subscriber is already installed")]
    AlreadyInitialized,

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
