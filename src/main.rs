//! Real-time cross-exchange spread monitor for MEXC and LBank
//!
//! # Architecture
//! - **core**: Order book, spread and selection types
//! - **exchanges**: REST gateway and per-exchange response parsing
//! - **engine**: The polling loop driving spread computation and broadcast
//! - **broadcast**: Subscriber fan-out hub
//! - **infrastructure**: Config, logging and the HTTP/WebSocket server

use spread_monitor::broadcast::BroadcastHub;
use spread_monitor::core::{selection, SymbolSelection};
use spread_monitor::engine::PollingEngine;
use spread_monitor::exchanges::ExchangeGateway;
use spread_monitor::infrastructure::{init_logging, start_server, AppState};
use spread_monitor::{Config, MonitorError, Result};
use std::sync::Arc;

/// Main application state
pub struct MonitorApp {
    config: Config,
}

impl MonitorApp {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Wire up the gateway, hub and selection, start the API server and run
    /// the polling engine for the lifetime of the process.
    pub async fn run(&self) -> Result<()> {
        tracing::info!("Starting spread monitor...");

        let gateway = Arc::new(ExchangeGateway::new(&self.config.monitor));
        gateway.load_symbols().await;

        let selection = selection::shared(SymbolSelection::new(
            self.config.monitor.default_symbol.clone(),
        ));
        let hub = Arc::new(BroadcastHub::new());

        let state = AppState {
            gateway: gateway.clone(),
            selection: selection.clone(),
            hub: hub.clone(),
        };
        let api_config = self.config.api.clone();
        tokio::spawn(async move {
            if let Err(e) = start_server(state, &api_config).await {
                tracing::error!("API server failed: {}", e);
            }
        });

        let engine = PollingEngine::new(gateway, selection, hub, &self.config.monitor);
        engine.run().await;

        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _guards = init_logging();

    let config = Config::load().map_err(|e| MonitorError::Config(e.to_string()))?;

    MonitorApp::new(config).run().await
}
