//! Crate-wide configuration and error types.

pub mod config;
pub mod error;

// Re-export commonly used types
pub use config::{Config, ConfigBuilder, OutputFormat, ReportMode};
pub use error::{FormatError, GcmonError, Result};
