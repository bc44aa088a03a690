//! Exchange-specific implementations

pub mod gateway;
pub mod lbank;
pub mod mexc;

pub use gateway::{ExchangeGateway, GatewayError, OrderBookSource};

use serde::Serialize;

/// Exchange identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Exchange {
    Mexc,
    LBank,
}

impl Exchange {
    pub fn name(&self) -> &'static str {
        match self {
            Exchange::Mexc => "mexc",
            Exchange::LBank => "lbank",
        }
    }

    /// Translate a canonical symbol ("BTC/USDT") into this exchange's native
    /// encoding: "BTCUSDT" for MEXC, "btc_usdt" for LBank.
    pub fn native_symbol(&self, canonical: &str) -> String {
        match self {
            Exchange::Mexc => canonical.replace('/', ""),
            Exchange::LBank => canonical.to_lowercase().replace('/', "_"),
        }
    }
}
