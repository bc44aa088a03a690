//! Core types for spread monitoring
//!
//! This module contains the fundamental types used throughout the system:
//! - OrderBook / OrderBookEntry: normalized depth snapshots
//! - SpreadResult: directional arbitrage spread between two books
//! - SymbolSelection: the atomically swapped active-pair configuration

pub mod orderbook;
pub mod selection;
pub mod spread;

pub use orderbook::{OrderBook, OrderBookEntry};
pub use selection::{CustomSymbols, SymbolSelection};
pub use spread::{compute_spread, estimate_profit, Direction, ProfitEstimate, SpreadResult};

use time::OffsetDateTime;

/// Current wall-clock time as unix milliseconds.
///
/// All capture and broadcast timestamps use this representation so payloads
/// stay plain JSON numbers.
#[inline]
pub fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}
