//! Polling engine
//!
//! The orchestrating control loop: every cycle it snapshots the symbol
//! selection, fetches both order books concurrently, runs the spread engine
//! for both directions, deduplicates and drives the broadcast hub. Runs for
//! the lifetime of the service; an unexpected cycle fault logs and backs off,
//! it never terminates the loop.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::broadcast::BroadcastHub;
use crate::core::selection::SharedSelection;
use crate::core::{compute_spread, Direction, OrderBook, SpreadResult};
use crate::dedup::UpdateDeduplicator;
use crate::exchanges::{Exchange, OrderBookSource};
use crate::infrastructure::config::MonitorConfig;
use crate::Result;

/// Outbound payload, one per emitted direction per cycle.
#[derive(Debug, Serialize)]
struct MarketUpdate<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    symbol: &'a str,
    mode: Direction,
    mexc_orderbook: &'a OrderBook,
    lbank_orderbook: &'a OrderBook,
    spread_data: &'a SpreadResult,
    timestamp: i64,
}

/// The long-lived polling task. Sole writer of the dedup map and sole caller
/// of [`BroadcastHub::broadcast`].
pub struct PollingEngine<S> {
    source: Arc<S>,
    selection: SharedSelection,
    hub: Arc<BroadcastHub>,
    dedup: UpdateDeduplicator,
    poll_interval: Duration,
    backoff_interval: Duration,
}

impl<S: OrderBookSource> PollingEngine<S> {
    pub fn new(
        source: Arc<S>,
        selection: SharedSelection,
        hub: Arc<BroadcastHub>,
        config: &MonitorConfig,
    ) -> Self {
        Self {
            source,
            selection,
            hub,
            dedup: UpdateDeduplicator::new(),
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            backoff_interval: Duration::from_secs(config.backoff_secs),
        }
    }

    /// Run indefinitely: Polling at the steady cadence, Backoff after an
    /// unexpected cycle fault.
    pub async fn run(mut self) {
        tracing::info!(
            "Polling engine started (cadence {:?}, backoff {:?})",
            self.poll_interval,
            self.backoff_interval
        );

        loop {
            match self.cycle().await {
                Ok(_) => tokio::time::sleep(self.poll_interval).await,
                Err(e) => {
                    tracing::error!("Poll cycle failed: {}", e);
                    tokio::time::sleep(self.backoff_interval).await;
                }
            }
        }
    }

    /// One poll cycle. Returns the number of updates broadcast.
    ///
    /// A failed or empty fetch is an expected condition: it logs, skips the
    /// cycle and still returns Ok so the engine keeps the steady cadence.
    pub async fn cycle(&mut self) -> Result<usize> {
        let selection = self.selection.load_full();
        let mexc_symbol = selection.resolve(Exchange::Mexc);
        let lbank_symbol = selection.resolve(Exchange::LBank);

        let (mexc_result, lbank_result) = tokio::join!(
            self.source.fetch_order_book(Exchange::Mexc, mexc_symbol),
            self.source.fetch_order_book(Exchange::LBank, lbank_symbol),
        );

        let (mexc_book, lbank_book) = match (mexc_result, lbank_result) {
            (Ok(mexc), Ok(lbank)) => (mexc, lbank),
            (mexc, lbank) => {
                if let Err(e) = &mexc {
                    tracing::warn!("MEXC fetch failed for {}: {}", mexc_symbol, e);
                }
                if let Err(e) = &lbank {
                    tracing::warn!("LBank fetch failed for {}: {}", lbank_symbol, e);
                }
                return Ok(0);
            }
        };

        if mexc_book.is_empty() || lbank_book.is_empty() {
            tracing::warn!(
                "Incomplete books for {}: MEXC {}x{}, LBank {}x{}",
                selection.symbol,
                mexc_book.bids.len(),
                mexc_book.asks.len(),
                lbank_book.bids.len(),
                lbank_book.asks.len()
            );
            return Ok(0);
        }

        let mut emitted = 0;
        for direction in Direction::ALL {
            let Some(result) = compute_spread(&mexc_book, &lbank_book, direction) else {
                continue;
            };

            if !self.dedup.should_emit(&result) {
                continue;
            }

            let payload = serde_json::to_string(&MarketUpdate {
                kind: "market_update",
                symbol: &result.symbol,
                mode: direction,
                mexc_orderbook: &mexc_book,
                lbank_orderbook: &lbank_book,
                spread_data: &result,
                timestamp: result.timestamp,
            })?;

            tracing::debug!(
                "Broadcasting {} {}: spread {:.6} ({:.4}%)",
                result.symbol,
                direction.as_str(),
                result.spread,
                result.spread_percentage
            );
            self.hub.broadcast(&payload);
            emitted += 1;
        }

        Ok(emitted)
    }
}
