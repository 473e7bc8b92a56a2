//! Market data structures for prediction markets

use crate::platform::Platform;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Status of a prediction market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketStatus {
    /// Market is open for trading
    Open,
    /// Market is closed but not yet settled
    Closed,
    /// Market has been settled with a final outcome
    Settled,
    /// Status not reported or not recognized
    Unknown,
}

impl MarketStatus {
    /// Whether contracts can currently be traded at this status
    pub fn is_trading(&self) -> bool {
        matches!(self, MarketStatus::Open)
    }
}

impl Default for MarketStatus {
    fn default() -> Self {
        MarketStatus::Open
    }
}

/// A binary prediction market from a specific platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionMarket {
    /// Unique identifier on the platform
    pub id: String,

    /// Which platform this market is from
    pub platform: Platform,

    /// Platform-specific ticker symbol (e.g., "KXBTC-100K-25DEC31" for Kalshi)
    pub ticker: String,

    /// Human-readable title/question
    pub title: String,

    /// Category or event grouping
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Best YES bid (0.00 - 1.00, represents probability)
    pub yes_bid: Decimal,

    /// Best YES ask (0.00 - 1.00)
    pub yes_ask: Decimal,

    /// Trading volume (contracts)
    pub volume: Decimal,

    /// Open interest, if the platform reports it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_interest: Option<Decimal>,

    /// When the market closes for trading
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_time: Option<DateTime<Utc>>,

    /// Current status of the market
    pub status: MarketStatus,
}

impl PredictionMarket {
    /// Midpoint of the YES bid/ask, the mark price for open positions
    pub fn mid(&self) -> Decimal {
        (self.yes_bid + self.yes_ask) / Decimal::from(2)
    }

    /// Bid/ask spread
    pub fn spread(&self) -> Decimal {
        self.yes_ask - self.yes_bid
    }

    /// Check if this market is currently tradeable
    pub fn is_tradeable(&self) -> bool {
        self.status.is_trading()
    }
}

/// A single price level in the order book
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBookLevel {
    /// Price (0.00 - 1.00 representing probability)
    pub price: Decimal,
    /// Total quantity at this level
    pub quantity: Decimal,
}

impl OrderBookLevel {
    /// Create a new order book level
    pub fn new(price: Decimal, quantity: Decimal) -> Self {
        Self { price, quantity }
    }
}

/// Order book snapshot for a prediction market
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBook {
    /// Market identifier
    pub market_id: String,
    /// Platform
    pub platform: Platform,
    /// Timestamp of the snapshot
    pub timestamp: DateTime<Utc>,
    /// YES outcome bids (sorted by price descending - best bid first)
    pub yes_bids: Vec<OrderBookLevel>,
    /// YES outcome asks (sorted by price ascending - best ask first)
    pub yes_asks: Vec<OrderBookLevel>,
}

impl OrderBook {
    /// Create an empty order book
    pub fn new(market_id: String, platform: Platform) -> Self {
        Self {
            market_id,
            platform,
            timestamp: Utc::now(),
            yes_bids: Vec::new(),
            yes_asks: Vec::new(),
        }
    }

    /// Get the best YES bid price
    pub fn best_bid(&self) -> Option<Decimal> {
        self.yes_bids.first().map(|l| l.price)
    }

    /// Get the best YES ask price
    pub fn best_ask(&self) -> Option<Decimal> {
        self.yes_asks.first().map(|l| l.price)
    }

    /// Calculate the YES mid price
    pub fn mid(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some((bid + ask) / Decimal::from(2)),
            _ => None,
        }
    }

    /// Calculate the YES spread (best ask - best bid)
    pub fn spread(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn book_with(bids: &[(Decimal, i64)], asks: &[(Decimal, i64)]) -> OrderBook {
        let mut book = OrderBook::new("TEST".to_string(), Platform::Kalshi);
        book.yes_bids = bids
            .iter()
            .map(|(p, q)| OrderBookLevel::new(*p, Decimal::from(*q)))
            .collect();
        book.yes_asks = asks
            .iter()
            .map(|(p, q)| OrderBookLevel::new(*p, Decimal::from(*q)))
            .collect();
        book
    }

    #[test]
    fn mid_is_average_of_best_bid_and_ask() {
        let book = book_with(&[(dec!(0.45), 10)], &[(dec!(0.55), 8)]);
        assert_eq!(book.mid(), Some(dec!(0.50)));
        assert_eq!(book.spread(), Some(dec!(0.10)));
    }

    #[test]
    fn empty_book_has_no_mid() {
        let book = OrderBook::new("TEST".to_string(), Platform::Kalshi);
        assert_eq!(book.mid(), None);
        assert_eq!(book.spread(), None);
    }
}
