//! Infrastructure - off the polling hot path
//!
//! - Configuration management
//! - Logging setup
//! - HTTP/WebSocket server

pub mod api;
pub mod config;
pub mod logging;

pub use api::{start_server, AppState};
pub use logging::init_logging;
