//! Real-time cross-exchange spread monitor
//!
//! Polls MEXC and LBank order books for a selected trading pair, computes the
//! arbitrage spread in both directions and fans the results out to WebSocket
//! subscribers.

pub mod broadcast;
pub mod core;
pub mod dedup;
pub mod engine;
pub mod exchanges;
pub mod infrastructure;

// Re-export commonly used types
pub use infrastructure::config::{ApiConfig, Config, MonitorConfig};

use thiserror::Error;

/// Main error type for the monitor
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] exchanges::gateway::GatewayError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, MonitorError>;
