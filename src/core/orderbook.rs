//! Normalized order book snapshot
//!
//! Both exchanges are normalized into the same shape: bids sorted descending,
//! asks sorted ascending, at most `depth_limit` levels per side. A book is
//! built fresh on every poll and never mutated afterwards.

use serde::Serialize;

use crate::exchanges::Exchange;

/// A single price level: (price, quantity), both non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OrderBookEntry {
    pub price: f64,
    pub quantity: f64,
}

impl OrderBookEntry {
    pub fn new(price: f64, quantity: f64) -> Self {
        debug_assert!(price >= 0.0 && quantity >= 0.0);
        Self { price, quantity }
    }
}

/// Normalized depth snapshot for one exchange and symbol.
#[derive(Debug, Clone, Serialize)]
pub struct OrderBook {
    pub exchange: Exchange,
    /// Canonical symbol, e.g. "BTC/USDT"
    pub symbol: String,
    /// Buy side, highest price first
    pub bids: Vec<OrderBookEntry>,
    /// Sell side, lowest price first
    pub asks: Vec<OrderBookEntry>,
    /// Capture time, unix milliseconds
    pub timestamp: i64,
    /// Decimal digits observed in price strings (floor of 4)
    pub price_precision: u32,
    /// Decimal digits observed in quantity strings
    pub quantity_precision: u32,
}

impl OrderBook {
    /// Best (highest) bid, if any level exists.
    #[inline]
    pub fn best_bid(&self) -> Option<&OrderBookEntry> {
        self.bids.first()
    }

    /// Best (lowest) ask, if any level exists.
    #[inline]
    pub fn best_ask(&self) -> Option<&OrderBookEntry> {
        self.asks.first()
    }

    /// True when either side has no levels. The polling engine treats an
    /// empty book like a failed fetch and skips the cycle.
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() || self.asks.is_empty()
    }
}

/// Count decimal digits in a numeric string after stripping trailing zeros.
///
/// "100.50" -> 1, "0.00012300" -> 6, "42" -> 0. Used to derive display
/// precision empirically from exchange payloads.
pub fn decimal_precision(value: &str) -> u32 {
    let trimmed = value.trim_end_matches('0').trim_end_matches('.');
    match trimmed.split_once('.') {
        Some((_, frac)) => frac.len() as u32,
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_book(bids: Vec<OrderBookEntry>, asks: Vec<OrderBookEntry>) -> OrderBook {
        OrderBook {
            exchange: Exchange::Mexc,
            symbol: "BTC/USDT".to_string(),
            bids,
            asks,
            timestamp: 1_700_000_000_000,
            price_precision: 4,
            quantity_precision: 6,
        }
    }

    #[test]
    fn test_best_levels() {
        let book = make_book(
            vec![OrderBookEntry::new(100.0, 2.0), OrderBookEntry::new(99.5, 1.0)],
            vec![OrderBookEntry::new(100.5, 3.0), OrderBookEntry::new(101.0, 1.0)],
        );
        assert_eq!(book.best_bid().unwrap().price, 100.0);
        assert_eq!(book.best_ask().unwrap().price, 100.5);
        assert!(!book.is_empty());
    }

    #[test]
    fn test_empty_when_one_side_missing() {
        let book = make_book(vec![], vec![OrderBookEntry::new(100.5, 3.0)]);
        assert!(book.best_bid().is_none());
        assert!(book.is_empty());
    }

    #[test]
    fn test_decimal_precision() {
        assert_eq!(decimal_precision("100.50"), 1);
        assert_eq!(decimal_precision("100.5"), 1);
        assert_eq!(decimal_precision("0.00012300"), 6);
        assert_eq!(decimal_precision("42"), 0);
        assert_eq!(decimal_precision("42.000"), 0);
    }

    #[test]
    fn test_serializes_with_exchange_name() {
        let book = make_book(vec![OrderBookEntry::new(1.0, 1.0)], vec![]);
        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(json["exchange"], "Mexc");
        assert_eq!(json["bids"][0]["price"], 1.0);
    }
}
