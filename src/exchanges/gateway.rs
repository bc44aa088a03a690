//! Exchange gateway
//!
//! REST client plus normalizer: fetches raw depth from each exchange and
//! converts it into the common [`OrderBook`] shape. Also owns the symbol
//! universe used to validate selections and list common pairs.
//!
//! Every fetch boundary returns an explicit `Result` - transport errors,
//! non-2xx statuses and malformed payloads all surface as [`GatewayError`],
//! never as a partial book.

use parking_lot::RwLock;
use std::collections::HashSet;
use std::time::Duration;

use crate::core::orderbook::{decimal_precision, OrderBook, OrderBookEntry};
use crate::core::now_millis;
use crate::exchanges::{lbank, mexc, Exchange};
use crate::infrastructure::config::MonitorConfig;

const MEXC_BASE_URL: &str = "https://api.mexc.com";
const LBANK_BASE_URL: &str = "https://api.lbank.info";

/// Default price precision when no levels are available to sample
const DEFAULT_PRICE_PRECISION: u32 = 4;
/// Default quantity precision when no levels are available to sample
const DEFAULT_QUANTITY_PRECISION: u32 = 6;

/// Gateway errors
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error: {0}")]
    Http(u16),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("API error: {0}")]
    Api(String),
}

/// Source of order books, the seam between the polling engine and the REST
/// layer. Implemented by [`ExchangeGateway`] and by test doubles.
#[allow(async_fn_in_trait)]
pub trait OrderBookSource: Send + Sync {
    async fn fetch_order_book(
        &self,
        exchange: Exchange,
        symbol: &str,
    ) -> Result<OrderBook, GatewayError>;
}

/// REST gateway to both exchanges.
pub struct ExchangeGateway {
    client: reqwest::Client,
    depth_limit: u32,
    mexc_symbols: RwLock<HashSet<String>>,
    lbank_symbols: RwLock<HashSet<String>>,
}

impl ExchangeGateway {
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(config.request_timeout_secs))
                .user_agent("spread-monitor/0.1")
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            depth_limit: config.depth_limit,
            mexc_symbols: RwLock::new(HashSet::new()),
            lbank_symbols: RwLock::new(HashSet::new()),
        }
    }

    /// Load both exchanges' tradable pairs into the cached universe.
    ///
    /// Per-exchange failure degrades to an empty set for that exchange so the
    /// other listing still succeeds.
    pub async fn load_symbols(&self) {
        let (mexc_result, lbank_result) =
            tokio::join!(self.fetch_mexc_symbols(), self.fetch_lbank_symbols());

        let mexc_symbols = mexc_result.unwrap_or_else(|e| {
            tracing::error!("Failed to fetch MEXC symbols: {}", e);
            HashSet::new()
        });
        let lbank_symbols = lbank_result.unwrap_or_else(|e| {
            tracing::error!("Failed to fetch LBank symbols: {}", e);
            HashSet::new()
        });

        let common = mexc_symbols.intersection(&lbank_symbols).count();
        tracing::info!(
            "Symbol universe loaded: {} MEXC, {} LBank, {} common",
            mexc_symbols.len(),
            lbank_symbols.len(),
            common
        );

        *self.mexc_symbols.write() = mexc_symbols;
        *self.lbank_symbols.write() = lbank_symbols;
    }

    /// Sorted intersection of both exchanges' tradable pairs.
    ///
    /// Reloads the universe lazily if either side is still empty.
    pub async fn common_symbols(&self) -> Vec<String> {
        if self.mexc_symbols.read().is_empty() || self.lbank_symbols.read().is_empty() {
            self.load_symbols().await;
        }

        let mexc = self.mexc_symbols.read();
        let lbank = self.lbank_symbols.read();
        let mut common: Vec<String> = mexc.intersection(&lbank).cloned().collect();
        common.sort();
        common
    }

    /// True when the symbol is tradable on the given exchange per the cached
    /// universe.
    pub fn knows_symbol(&self, exchange: Exchange, symbol: &str) -> bool {
        match exchange {
            Exchange::Mexc => self.mexc_symbols.read().contains(symbol),
            Exchange::LBank => self.lbank_symbols.read().contains(symbol),
        }
    }

    async fn fetch_mexc_symbols(&self) -> Result<HashSet<String>, GatewayError> {
        let url = format!("{}/api/v3/exchangeInfo", MEXC_BASE_URL);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GatewayError::Http(response.status().as_u16()));
        }

        let info: mexc::MexcExchangeInfo = response
            .json()
            .await
            .map_err(|e| GatewayError::Parse(e.to_string()))?;

        Ok(mexc::parse_symbols(info))
    }

    async fn fetch_lbank_symbols(&self) -> Result<HashSet<String>, GatewayError> {
        let url = format!("{}/v1/currencyPairs.do", LBANK_BASE_URL);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GatewayError::Http(response.status().as_u16()));
        }

        let pairs: lbank::LbankPairsResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Parse(e.to_string()))?;

        Ok(lbank::parse_symbols(pairs))
    }

    async fn fetch_mexc_book(&self, symbol: &str) -> Result<OrderBook, GatewayError> {
        let native = Exchange::Mexc.native_symbol(symbol);
        let url = format!("{}/api/v3/depth", MEXC_BASE_URL);
        let limit = self.depth_limit.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[("symbol", native.as_str()), ("limit", limit.as_str())])
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GatewayError::Http(response.status().as_u16()));
        }

        let depth: mexc::MexcDepth = response
            .json()
            .await
            .map_err(|e| GatewayError::Parse(e.to_string()))?;

        normalize_book(Exchange::Mexc, symbol, depth.bids, depth.asks, self.depth_limit)
    }

    async fn fetch_lbank_book(&self, symbol: &str) -> Result<OrderBook, GatewayError> {
        let native = Exchange::LBank.native_symbol(symbol);
        let url = format!("{}/v1/depth.do", LBANK_BASE_URL);
        let size = self.depth_limit.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[("symbol", native.as_str()), ("size", size.as_str())])
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GatewayError::Http(response.status().as_u16()));
        }

        let response: lbank::LbankDepthResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Parse(e.to_string()))?;

        let data = response.into_data().map_err(GatewayError::Api)?;
        let to_pairs = |levels: Vec<[lbank::RawNumber; 2]>| {
            levels
                .into_iter()
                .map(|[price, qty]| (price.as_display_string(), qty.as_display_string()))
                .collect::<Vec<_>>()
        };

        normalize_book(
            Exchange::LBank,
            symbol,
            to_pairs(data.bids),
            to_pairs(data.asks),
            self.depth_limit,
        )
    }
}

impl OrderBookSource for ExchangeGateway {
    async fn fetch_order_book(
        &self,
        exchange: Exchange,
        symbol: &str,
    ) -> Result<OrderBook, GatewayError> {
        match exchange {
            Exchange::Mexc => self.fetch_mexc_book(symbol).await,
            Exchange::LBank => self.fetch_lbank_book(symbol).await,
        }
    }
}

/// Build a normalized [`OrderBook`] from raw (price, quantity) string pairs.
///
/// Enforces the ordering invariant (bids descending, asks ascending), caps
/// depth, and derives display precision from the string representations:
/// price from the touching ask, quantity from the touching bid, with a floor
/// of 4 decimal digits for price.
fn normalize_book(
    exchange: Exchange,
    symbol: &str,
    raw_bids: Vec<(String, String)>,
    raw_asks: Vec<(String, String)>,
    depth_limit: u32,
) -> Result<OrderBook, GatewayError> {
    let price_precision = raw_asks
        .first()
        .map(|(price, _)| decimal_precision(price))
        .unwrap_or(DEFAULT_PRICE_PRECISION)
        .max(DEFAULT_PRICE_PRECISION);
    let quantity_precision = raw_bids
        .first()
        .map(|(_, qty)| decimal_precision(qty))
        .unwrap_or(DEFAULT_QUANTITY_PRECISION);

    let parse_levels = |levels: Vec<(String, String)>| -> Result<Vec<OrderBookEntry>, GatewayError> {
        levels
            .into_iter()
            .take(depth_limit as usize)
            .map(|(price, qty)| {
                let price: f64 = price
                    .parse()
                    .map_err(|_| GatewayError::Parse(format!("bad price {:?}", price)))?;
                let qty: f64 = qty
                    .parse()
                    .map_err(|_| GatewayError::Parse(format!("bad quantity {:?}", qty)))?;
                if price < 0.0 || qty < 0.0 {
                    return Err(GatewayError::Parse(format!(
                        "negative level {} x {}",
                        price, qty
                    )));
                }
                Ok(OrderBookEntry::new(price, qty))
            })
            .collect()
    };

    let mut bids = parse_levels(raw_bids)?;
    let mut asks = parse_levels(raw_asks)?;
    bids.sort_by(|a, b| b.price.partial_cmp(&a.price).unwrap_or(std::cmp::Ordering::Equal));
    asks.sort_by(|a, b| a.price.partial_cmp(&b.price).unwrap_or(std::cmp::Ordering::Equal));

    Ok(OrderBook {
        exchange,
        symbol: symbol.to_string(),
        bids,
        asks,
        timestamp: now_millis(),
        price_precision,
        quantity_precision,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(levels: &[(&str, &str)]) -> Vec<(String, String)> {
        levels
            .iter()
            .map(|(p, q)| (p.to_string(), q.to_string()))
            .collect()
    }

    #[test]
    fn test_normalize_orders_and_caps_depth() {
        let bids = pairs(&[("100.1", "1"), ("100.3", "2"), ("100.2", "3")]);
        let asks = pairs(&[("100.6", "1"), ("100.4", "2"), ("100.5", "3")]);
        let book = normalize_book(Exchange::Mexc, "BTC/USDT", bids, asks, 2).unwrap();

        assert_eq!(book.bids.len(), 2);
        assert_eq!(book.asks.len(), 2);
        // Ordering invariant holds even if the exchange shuffled levels
        assert!(book.bids[0].price >= book.bids[1].price);
        assert!(book.asks[0].price <= book.asks[1].price);
    }

    #[test]
    fn test_precision_derived_from_touching_levels() {
        let bids = pairs(&[("100.12345", "0.250000")]);
        let asks = pairs(&[("100.123456", "1.0")]);
        let book = normalize_book(Exchange::LBank, "BTC/USDT", bids, asks, 20).unwrap();

        assert_eq!(book.price_precision, 6); // from ask price string
        assert_eq!(book.quantity_precision, 2); // "0.250000" -> "0.25"
    }

    #[test]
    fn test_price_precision_floor_of_four() {
        let bids = pairs(&[("100.5", "1.123456")]);
        let asks = pairs(&[("101.5", "1.0")]);
        let book = normalize_book(Exchange::Mexc, "BTC/USDT", bids, asks, 20).unwrap();

        assert_eq!(book.price_precision, 4); // "101.5" has 1 digit, floored
        assert_eq!(book.quantity_precision, 6);
    }

    #[test]
    fn test_defaults_when_sides_empty() {
        let book = normalize_book(Exchange::Mexc, "BTC/USDT", vec![], vec![], 20).unwrap();
        assert_eq!(book.price_precision, 4);
        assert_eq!(book.quantity_precision, 6);
        assert!(book.is_empty());
    }

    #[test]
    fn test_malformed_level_is_a_parse_error() {
        let bids = pairs(&[("not-a-price", "1")]);
        let err = normalize_book(Exchange::Mexc, "BTC/USDT", bids, vec![], 20).unwrap_err();
        assert!(matches!(err, GatewayError::Parse(_)));
    }

    #[test]
    fn test_negative_level_rejected() {
        let bids = pairs(&[("-1.0", "1")]);
        let err = normalize_book(Exchange::Mexc, "BTC/USDT", bids, vec![], 20).unwrap_err();
        assert!(matches!(err, GatewayError::Parse(_)));
    }
}
