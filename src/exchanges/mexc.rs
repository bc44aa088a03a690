//! MEXC response parsing
//!
//! Depth: GET /api/v3/depth?symbol=BTCUSDT&limit=20
//! Symbols: GET /api/v3/exchangeInfo (status "1" means tradable)

use serde::Deserialize;
use std::collections::HashSet;

/// MEXC depth response. Levels arrive as [price, quantity] string pairs.
#[derive(Debug, Deserialize)]
pub struct MexcDepth {
    #[serde(default)]
    pub bids: Vec<(String, String)>,
    #[serde(default)]
    pub asks: Vec<(String, String)>,
}

/// MEXC exchangeInfo response
#[derive(Debug, Deserialize)]
pub struct MexcExchangeInfo {
    #[serde(default)]
    pub symbols: Vec<MexcSymbolInfo>,
}

#[derive(Debug, Deserialize)]
pub struct MexcSymbolInfo {
    pub symbol: String,
    #[serde(default)]
    pub status: String,
}

/// Extract tradable USDT pairs in canonical form ("BTCUSDT" -> "BTC/USDT").
pub fn parse_symbols(info: MexcExchangeInfo) -> HashSet<String> {
    info.symbols
        .into_iter()
        .filter(|s| s.status == "1")
        .filter_map(|s| {
            let base = s.symbol.strip_suffix("USDT")?;
            if base.is_empty() {
                return None;
            }
            Some(format!("{}/USDT", base))
        })
        .collect()
}
