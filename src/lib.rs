//! Gridle - Grid Window Tiler
//!
//! Gridle arranges the windows of a chosen application into a grid on a
//! chosen monitor. Window and monitor discovery, as well as the actual
//! move/resize/activate calls, are delegated to platform providers so the
//! layout and matching logic stays pure and testable.

pub mod cli;
pub mod config;
pub mod logging;
pub mod models;
pub mod platform;
pub mod services;

pub use models::*;
pub use services::*;

/// Result type alias for Gridle operations
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to Gridle operations
#[derive(thiserror::Error, Debug)]
pub enum GridleError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Window not found: {0}")]
    WindowNotFound(u32),

    #[error("Monitor not found: {0}")]
    MonitorNotFound(String),

    #[error("Layer not found: {0}")]
    LayerNotFound(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Platform API error: {0}")]
    PlatformError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
