//! Spread engine
//!
//! Pure computation over two normalized order books. No I/O, fully
//! deterministic - this is the main unit-test surface of the crate.

use serde::Serialize;
use thiserror::Error;

use super::{now_millis, OrderBook};
use crate::exchanges::Exchange;

/// Trade direction across the two venues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    /// Buy at the MEXC ask, sell into the LBank bid
    #[serde(rename = "mexc_buy_lbank_sell")]
    MexcBuyLbankSell,
    /// Buy at the LBank ask, sell into the MEXC bid
    #[serde(rename = "lbank_buy_mexc_sell")]
    LbankBuyMexcSell,
}

impl Direction {
    /// Both supported directions, in broadcast order.
    pub const ALL: [Direction; 2] = [Direction::MexcBuyLbankSell, Direction::LbankBuyMexcSell];

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::MexcBuyLbankSell => "mexc_buy_lbank_sell",
            Direction::LbankBuyMexcSell => "lbank_buy_mexc_sell",
        }
    }

    /// Exchange the buy leg executes on.
    pub fn buy_exchange(&self) -> Exchange {
        match self {
            Direction::MexcBuyLbankSell => Exchange::Mexc,
            Direction::LbankBuyMexcSell => Exchange::LBank,
        }
    }

    /// Exchange the sell leg executes on.
    pub fn sell_exchange(&self) -> Exchange {
        match self {
            Direction::MexcBuyLbankSell => Exchange::LBank,
            Direction::LbankBuyMexcSell => Exchange::Mexc,
        }
    }
}

/// Directional spread between the two venues at the touching price levels.
#[derive(Debug, Clone, Serialize)]
pub struct SpreadResult {
    pub symbol: String,
    pub mode: Direction,
    /// sell_price - buy_price
    pub spread: f64,
    /// spread / buy_price * 100, 0 when buy_price <= 0
    pub spread_percentage: f64,
    /// min(quantity at the touching ask, quantity at the touching bid)
    pub max_quantity: f64,
    pub buy_price: f64,
    pub sell_price: f64,
    pub buy_exchange: Exchange,
    pub sell_exchange: Exchange,
    /// Unix milliseconds
    pub timestamp: i64,
}

/// Compute the spread for one direction.
///
/// Returns None when the required side of either book has no levels - a thin
/// book is an expected condition, not a fault.
pub fn compute_spread(
    mexc_book: &OrderBook,
    lbank_book: &OrderBook,
    direction: Direction,
) -> Option<SpreadResult> {
    let (buy_book, sell_book) = match direction {
        Direction::MexcBuyLbankSell => (mexc_book, lbank_book),
        Direction::LbankBuyMexcSell => (lbank_book, mexc_book),
    };

    let buy_level = buy_book.best_ask()?;
    let sell_level = sell_book.best_bid()?;

    let buy_price = buy_level.price;
    let sell_price = sell_level.price;
    let spread = sell_price - buy_price;
    let spread_percentage = if buy_price > 0.0 {
        spread / buy_price * 100.0
    } else {
        0.0
    };

    Some(SpreadResult {
        symbol: buy_book.symbol.clone(),
        mode: direction,
        spread,
        spread_percentage,
        max_quantity: buy_level.quantity.min(sell_level.quantity),
        buy_price,
        sell_price,
        buy_exchange: direction.buy_exchange(),
        sell_exchange: direction.sell_exchange(),
        timestamp: now_millis(),
    })
}

/// Spread engine errors
#[derive(Debug, Error, PartialEq)]
pub enum SpreadError {
    #[error("Invalid buy price: {0}")]
    InvalidBuyPrice(f64),
}

/// Profit estimate for a given notional investment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfitEstimate {
    pub investment_amount: f64,
    /// Investment actually deployed after depth clamping
    pub actual_investment: f64,
    /// Quantity tradeable, clamped to the book's max_quantity
    pub tradeable_quantity: f64,
    pub potential_profit: f64,
    /// Profit as a percentage of actual investment
    pub profit_rate: f64,
    pub spread_percentage: f64,
}

/// Estimate the realized profit of executing `result` with `investment_amount`
/// of quote currency.
///
/// The purchasable quantity is clamped to the liquidity available at the
/// touching levels, so oversized investments report the depth-limited fill.
pub fn estimate_profit(
    result: &SpreadResult,
    investment_amount: f64,
) -> Result<ProfitEstimate, SpreadError> {
    if result.buy_price <= 0.0 {
        return Err(SpreadError::InvalidBuyPrice(result.buy_price));
    }

    let desired_quantity = investment_amount / result.buy_price;
    let tradeable_quantity = desired_quantity.min(result.max_quantity);
    let actual_investment = tradeable_quantity * result.buy_price;
    let potential_profit = tradeable_quantity * result.spread;
    let profit_rate = if actual_investment > 0.0 {
        potential_profit / actual_investment * 100.0
    } else {
        0.0
    };

    Ok(ProfitEstimate {
        investment_amount,
        actual_investment,
        tradeable_quantity,
        potential_profit,
        profit_rate,
        spread_percentage: result.spread_percentage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::OrderBookEntry;
    use proptest::prelude::*;

    fn make_book(exchange: Exchange, bid: (f64, f64), ask: (f64, f64)) -> OrderBook {
        OrderBook {
            exchange,
            symbol: "BTC/USDT".to_string(),
            bids: vec![OrderBookEntry::new(bid.0, bid.1)],
            asks: vec![OrderBookEntry::new(ask.0, ask.1)],
            timestamp: 1_700_000_000_000,
            price_precision: 4,
            quantity_precision: 6,
        }
    }

    fn empty_side_book(exchange: Exchange, bids: bool) -> OrderBook {
        let mut book = make_book(exchange, (100.0, 1.0), (101.0, 1.0));
        if bids {
            book.bids.clear();
        } else {
            book.asks.clear();
        }
        book
    }

    #[test]
    fn test_mexc_buy_lbank_sell() {
        // MEXC ask 100 x 2, LBank bid 101 x 1
        let mexc = make_book(Exchange::Mexc, (99.0, 5.0), (100.0, 2.0));
        let lbank = make_book(Exchange::LBank, (101.0, 1.0), (102.0, 5.0));

        let result = compute_spread(&mexc, &lbank, Direction::MexcBuyLbankSell).unwrap();
        assert_eq!(result.buy_price, 100.0);
        assert_eq!(result.sell_price, 101.0);
        assert_eq!(result.spread, 1.0);
        assert_eq!(result.spread_percentage, 1.0);
        assert_eq!(result.max_quantity, 1.0);
        assert_eq!(result.buy_exchange, Exchange::Mexc);
        assert_eq!(result.sell_exchange, Exchange::LBank);
    }

    #[test]
    fn test_lbank_buy_mexc_sell_mirrors() {
        let mexc = make_book(Exchange::Mexc, (105.0, 3.0), (106.0, 1.0));
        let lbank = make_book(Exchange::LBank, (99.0, 1.0), (100.0, 2.0));

        let result = compute_spread(&mexc, &lbank, Direction::LbankBuyMexcSell).unwrap();
        assert_eq!(result.buy_price, 100.0);
        assert_eq!(result.sell_price, 105.0);
        assert_eq!(result.spread, 5.0);
        assert_eq!(result.max_quantity, 2.0);
        assert_eq!(result.buy_exchange, Exchange::LBank);
        assert_eq!(result.sell_exchange, Exchange::Mexc);
    }

    #[test]
    fn test_none_on_empty_required_sides() {
        let lbank = make_book(Exchange::LBank, (101.0, 1.0), (102.0, 1.0));

        // Buy side needs MEXC asks
        let no_asks = empty_side_book(Exchange::Mexc, false);
        assert!(compute_spread(&no_asks, &lbank, Direction::MexcBuyLbankSell).is_none());

        // Sell side needs LBank bids
        let mexc = make_book(Exchange::Mexc, (99.0, 1.0), (100.0, 1.0));
        let no_bids = empty_side_book(Exchange::LBank, true);
        assert!(compute_spread(&mexc, &no_bids, Direction::MexcBuyLbankSell).is_none());
    }

    #[test]
    fn test_zero_percentage_on_nonpositive_buy_price() {
        let mexc = make_book(Exchange::Mexc, (0.0, 1.0), (0.0, 1.0));
        let lbank = make_book(Exchange::LBank, (101.0, 1.0), (102.0, 1.0));

        let result = compute_spread(&mexc, &lbank, Direction::MexcBuyLbankSell).unwrap();
        assert_eq!(result.spread_percentage, 0.0);
        assert!(result.spread_percentage.is_finite());
    }

    #[test]
    fn test_negative_spread_preserved() {
        // Same book both sides: sell into the bid below the ask
        let mexc = make_book(Exchange::Mexc, (100.0, 1.0), (101.0, 1.0));
        let lbank = make_book(Exchange::LBank, (100.0, 1.0), (101.0, 1.0));

        let result = compute_spread(&mexc, &lbank, Direction::MexcBuyLbankSell).unwrap();
        assert_eq!(result.spread, -1.0);
        assert!(result.spread_percentage < 0.0);
    }

    #[test]
    fn test_direction_serialization() {
        assert_eq!(
            serde_json::to_value(Direction::MexcBuyLbankSell).unwrap(),
            "mexc_buy_lbank_sell"
        );
        assert_eq!(
            serde_json::to_value(Direction::LbankBuyMexcSell).unwrap(),
            "lbank_buy_mexc_sell"
        );
    }

    #[test]
    fn test_estimate_profit_clamps_to_depth() {
        let mexc = make_book(Exchange::Mexc, (99.0, 5.0), (100.0, 2.0));
        let lbank = make_book(Exchange::LBank, (101.0, 1.0), (102.0, 5.0));
        let result = compute_spread(&mexc, &lbank, Direction::MexcBuyLbankSell).unwrap();

        // 10_000 buys 100 units at price 100, but only 1.0 is executable
        let estimate = estimate_profit(&result, 10_000.0).unwrap();
        assert_eq!(estimate.tradeable_quantity, 1.0);
        assert_eq!(estimate.actual_investment, 100.0);
        assert_eq!(estimate.potential_profit, 1.0);
        assert_eq!(estimate.profit_rate, 1.0);
    }

    #[test]
    fn test_estimate_profit_small_investment() {
        let mexc = make_book(Exchange::Mexc, (99.0, 5.0), (100.0, 2.0));
        let lbank = make_book(Exchange::LBank, (101.0, 1.0), (102.0, 5.0));
        let result = compute_spread(&mexc, &lbank, Direction::MexcBuyLbankSell).unwrap();

        let estimate = estimate_profit(&result, 50.0).unwrap();
        assert_eq!(estimate.tradeable_quantity, 0.5);
        assert_eq!(estimate.actual_investment, 50.0);
    }

    #[test]
    fn test_estimate_profit_rejects_nonpositive_buy_price() {
        let mexc = make_book(Exchange::Mexc, (0.0, 1.0), (0.0, 1.0));
        let lbank = make_book(Exchange::LBank, (101.0, 1.0), (102.0, 1.0));
        let result = compute_spread(&mexc, &lbank, Direction::MexcBuyLbankSell).unwrap();

        assert_eq!(
            estimate_profit(&result, 100.0),
            Err(SpreadError::InvalidBuyPrice(0.0))
        );
    }

    proptest! {
        /// Both directions over positive books: spread fields are internally
        /// consistent and max_quantity never exceeds either touching level.
        #[test]
        fn prop_spread_consistency(
            mexc_bid in 1.0f64..1e6, mexc_ask in 1.0f64..1e6,
            lbank_bid in 1.0f64..1e6, lbank_ask in 1.0f64..1e6,
            qty_a in 0.001f64..1e4, qty_b in 0.001f64..1e4,
        ) {
            let mexc = make_book(Exchange::Mexc, (mexc_bid, qty_a), (mexc_ask, qty_b));
            let lbank = make_book(Exchange::LBank, (lbank_bid, qty_b), (lbank_ask, qty_a));

            for direction in Direction::ALL {
                let result = compute_spread(&mexc, &lbank, direction).unwrap();
                prop_assert!((result.spread - (result.sell_price - result.buy_price)).abs() < 1e-9);
                prop_assert!(result.max_quantity <= qty_a.max(qty_b));
                let expected_pct = result.spread / result.buy_price * 100.0;
                prop_assert!((result.spread_percentage - expected_pct).abs() < 1e-9);
            }
        }
    }
}
