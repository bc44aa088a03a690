//! Active symbol selection
//!
//! Process-wide configuration shared between the request layer and the
//! polling engine. The engine reads one snapshot per cycle via `ArcSwap`, so
//! a change takes effect on the next cycle, never mid-cycle.

use arc_swap::ArcSwap;
use std::sync::Arc;

use crate::exchanges::Exchange;

/// Independently chosen symbols per exchange (custom mode).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomSymbols {
    pub mexc: String,
    pub lbank: String,
}

/// The monitored trading pair.
///
/// In the default mode both exchanges are queried under `symbol`; in custom
/// mode each exchange gets its own pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolSelection {
    pub symbol: String,
    pub custom: Option<CustomSymbols>,
}

impl SymbolSelection {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            custom: None,
        }
    }

    pub fn custom(mexc: impl Into<String>, lbank: impl Into<String>) -> Self {
        let mexc = mexc.into();
        let lbank = lbank.into();
        Self {
            // Display symbol follows the buy-side default of the first
            // direction (MEXC)
            symbol: mexc.clone(),
            custom: Some(CustomSymbols { mexc, lbank }),
        }
    }

    /// Symbol to query on the given exchange under this selection.
    pub fn resolve(&self, exchange: Exchange) -> &str {
        match (&self.custom, exchange) {
            (Some(custom), Exchange::Mexc) => &custom.mexc,
            (Some(custom), Exchange::LBank) => &custom.lbank,
            (None, _) => &self.symbol,
        }
    }
}

impl Default for SymbolSelection {
    fn default() -> Self {
        Self::new("BTC/USDT")
    }
}

/// Shared atomically-replaceable selection handle.
pub type SharedSelection = Arc<ArcSwap<SymbolSelection>>;

/// Create a shared handle holding the given initial selection.
pub fn shared(initial: SymbolSelection) -> SharedSelection {
    Arc::new(ArcSwap::from_pointee(initial))
}
