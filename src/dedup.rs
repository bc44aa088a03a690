//! Update deduplicator
//!
//! Keeps a SHA-256 fingerprint of the last emitted spread result per
//! (symbol, direction) key and suppresses broadcasts whose content has not
//! changed since. Written only by the polling engine.
//!
//! The fingerprint deliberately excludes the capture timestamp: with it
//! included every cycle would hash differently and deduplication would be a
//! no-op. Price, quantity and venue fields all participate, in fixed order.

use sha2::{Digest, Sha256};
use std::collections::HashMap;

use crate::core::{Direction, SpreadResult};

type Fingerprint = [u8; 32];

/// Content-based change detector for outbound spread updates.
#[derive(Default)]
pub struct UpdateDeduplicator {
    last_emitted: HashMap<(String, Direction), Fingerprint>,
}

impl UpdateDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true and records the candidate when its content differs from
    /// the last emitted result for the same (symbol, direction) key.
    pub fn should_emit(&mut self, result: &SpreadResult) -> bool {
        let key = (result.symbol.clone(), result.mode);
        let fingerprint = fingerprint(result);

        match self.last_emitted.get(&key) {
            Some(previous) if *previous == fingerprint => {
                tracing::debug!(
                    "Suppressing unchanged update {} {} ({})",
                    result.symbol,
                    result.mode.as_str(),
                    hex::encode(&fingerprint[..8])
                );
                false
            }
            _ => {
                self.last_emitted.insert(key, fingerprint);
                true
            }
        }
    }
}

/// Canonical digest over all content fields, field order fixed, timestamp
/// excluded.
fn fingerprint(result: &SpreadResult) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(result.symbol.as_bytes());
    hasher.update(result.mode.as_str().as_bytes());
    hasher.update(result.spread.to_bits().to_le_bytes());
    hasher.update(result.spread_percentage.to_bits().to_le_bytes());
    hasher.update(result.max_quantity.to_bits().to_le_bytes());
    hasher.update(result.buy_price.to_bits().to_le_bytes());
    hasher.update(result.sell_price.to_bits().to_le_bytes());
    hasher.update(result.buy_exchange.name().as_bytes());
    hasher.update(result.sell_exchange.name().as_bytes());
    hasher.finalize().into()
}
