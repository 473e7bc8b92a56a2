//! Kalshi API response types
//!
//! These types mirror the Kalshi API responses and are converted to
//! arbiter-core types for use across the workspace. Kalshi prices cents
//! (1-99); everything is converted to dollars at this boundary.

use arbiter_core::{Fill, MarketStatus, OrderSide, Outcome, Settlement};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Convert a cent amount to dollars
pub fn cents_to_dollars(cents: i64) -> Decimal {
    Decimal::from(cents) / Decimal::from(100)
}

/// Response from GET /markets
#[derive(Debug, Clone, Deserialize)]
pub struct MarketsResponse {
    pub markets: Vec<KalshiMarket>,
    #[serde(default)]
    pub cursor: Option<String>,
}

/// Response from GET /markets/{ticker}
#[derive(Debug, Clone, Deserialize)]
pub struct MarketResponse {
    pub market: KalshiMarket,
}

/// A Kalshi market from the API
#[derive(Debug, Clone, Deserialize)]
pub struct KalshiMarket {
    /// Market ticker (unique identifier)
    pub ticker: String,

    /// Event ticker this market belongs to
    #[serde(default)]
    pub event_ticker: Option<String>,

    /// Market title
    #[serde(default)]
    pub title: String,

    /// Current YES bid in cents (1-99)
    #[serde(default)]
    pub yes_bid: Option<i64>,

    /// Current YES ask in cents
    #[serde(default)]
    pub yes_ask: Option<i64>,

    /// Total volume
    #[serde(default)]
    pub volume: Option<i64>,

    /// Open interest
    #[serde(default)]
    pub open_interest: Option<i64>,

    /// Market status string ("active", "closed", "settled", ...)
    #[serde(default)]
    pub status: Option<String>,

    /// When the market closes
    #[serde(default)]
    pub close_time: Option<DateTime<Utc>>,
}

impl KalshiMarket {
    /// Map a Kalshi status string onto the shared status enum.
    ///
    /// The API reports statuses beyond what its docs list (e.g.
    /// "finalized"); anything unrecognized maps to `Unknown` rather than
    /// failing the conversion.
    pub fn parse_status(status: Option<&str>) -> MarketStatus {
        match status {
            Some("active") | Some("open") => MarketStatus::Open,
            Some("closed") => MarketStatus::Closed,
            Some("settled") | Some("finalized") => MarketStatus::Settled,
            _ => MarketStatus::Unknown,
        }
    }

    /// Convert to the shared market type
    pub fn to_market(&self) -> arbiter_core::PredictionMarket {
        use arbiter_core::{Platform, PredictionMarket};

        PredictionMarket {
            id: self.ticker.clone(),
            platform: Platform::Kalshi,
            ticker: self.ticker.clone(),
            title: self.title.clone(),
            category: self.event_ticker.clone(),
            yes_bid: cents_to_dollars(self.yes_bid.unwrap_or(0)),
            yes_ask: cents_to_dollars(self.yes_ask.unwrap_or(0)),
            volume: Decimal::from(self.volume.unwrap_or(0)),
            open_interest: self.open_interest.map(Decimal::from),
            close_time: self.close_time,
            status: Self::parse_status(self.status.as_deref()),
        }
    }
}

/// Response from GET /portfolio/balance
#[derive(Debug, Clone, Deserialize)]
pub struct BalanceResponse {
    /// Balance in cents
    pub balance: i64,
}

/// Response from GET /markets/{ticker}/orderbook
#[derive(Debug, Clone, Deserialize)]
pub struct OrderbookResponse {
    pub orderbook: KalshiOrderbook,
}

/// Kalshi orderbook structure
///
/// Kalshi returns resting limit orders (bids) as [price_cents, quantity]
/// pairs for each outcome. YES asks are derived from NO bids: buying NO at
/// X cents is selling YES at 100 - X.
#[derive(Debug, Clone, Deserialize)]
pub struct KalshiOrderbook {
    #[serde(default)]
    pub yes: Option<Vec<Vec<i64>>>,
    #[serde(default)]
    pub no: Option<Vec<Vec<i64>>>,
}

impl KalshiOrderbook {
    /// Convert to the shared order book type
    pub fn to_order_book(&self, market_id: &str) -> arbiter_core::OrderBook {
        use arbiter_core::{OrderBook, OrderBookLevel, Platform};

        let mut book = OrderBook::new(market_id.to_string(), Platform::Kalshi);

        if let Some(yes_orders) = &self.yes {
            book.yes_bids = yes_orders
                .iter()
                .filter(|level| level.len() >= 2)
                .map(|level| {
                    OrderBookLevel::new(cents_to_dollars(level[0]), Decimal::from(level[1]))
                })
                .collect();
            // Best bid first
            book.yes_bids.sort_by(|a, b| b.price.cmp(&a.price));
        }

        if let Some(no_orders) = &self.no {
            book.yes_asks = no_orders
                .iter()
                .filter(|level| level.len() >= 2)
                .map(|level| {
                    // NO bid at X cents = YES ask at (100 - X) cents
                    OrderBookLevel::new(cents_to_dollars(100 - level[0]), Decimal::from(level[1]))
                })
                .collect();
            // Best ask first
            book.yes_asks.sort_by(|a, b| a.price.cmp(&b.price));
        }

        book
    }
}

/// Response from GET /portfolio/fills
#[derive(Debug, Clone, Deserialize)]
pub struct FillsResponse {
    #[serde(default)]
    pub fills: Vec<KalshiFill>,
    #[serde(default)]
    pub cursor: Option<String>,
}

/// A single fill from the portfolio history
#[derive(Debug, Clone, Deserialize)]
pub struct KalshiFill {
    /// Market ticker
    pub ticker: String,

    /// "buy" or "sell"
    #[serde(default)]
    pub action: Option<String>,

    /// "yes" or "no"
    #[serde(default)]
    pub side: Option<String>,

    /// Number of contracts
    #[serde(default)]
    pub count: u32,

    /// YES price in cents
    #[serde(default)]
    pub yes_price: Option<i64>,

    /// NO price in cents
    #[serde(default)]
    pub no_price: Option<i64>,

    /// When the fill occurred
    #[serde(default)]
    pub created_time: Option<DateTime<Utc>>,
}

impl KalshiFill {
    /// Price paid per contract, in cents, for the side actually traded
    fn price_cents(&self) -> i64 {
        match self.side.as_deref() {
            Some("no") => self.no_price.unwrap_or(0),
            _ => self.yes_price.unwrap_or(0),
        }
    }

    /// Convert to the shared fill type
    pub fn to_fill(&self) -> Fill {
        let action = match self.action.as_deref() {
            Some("sell") => OrderSide::Sell,
            _ => OrderSide::Buy,
        };
        let outcome = match self.side.as_deref() {
            Some("no") => Outcome::No,
            _ => Outcome::Yes,
        };

        Fill {
            market_id: self.ticker.clone(),
            action,
            outcome,
            quantity: self.count,
            price: cents_to_dollars(self.price_cents()),
        }
    }
}

/// Response from GET /portfolio/settlements
#[derive(Debug, Clone, Deserialize)]
pub struct SettlementsResponse {
    #[serde(default)]
    pub settlements: Vec<KalshiSettlement>,
    #[serde(default)]
    pub cursor: Option<String>,
}

/// A settlement record for a resolved market
#[derive(Debug, Clone, Deserialize)]
pub struct KalshiSettlement {
    /// Market ticker
    pub ticker: String,

    /// Payout in cents
    #[serde(default)]
    pub revenue: i64,

    /// Final market result ("yes" or "no")
    #[serde(default)]
    pub market_result: Option<String>,

    /// When the market settled
    #[serde(default)]
    pub settled_time: Option<DateTime<Utc>>,
}

impl KalshiSettlement {
    /// Convert to the shared settlement type
    pub fn to_settlement(&self) -> Settlement {
        Settlement {
            market_id: self.ticker.clone(),
            revenue: cents_to_dollars(self.revenue),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn converts_cents_to_dollars() {
        assert_eq!(cents_to_dollars(50), dec!(0.50));
        assert_eq!(cents_to_dollars(0), dec!(0));
        assert_eq!(cents_to_dollars(100), dec!(1));
    }

    #[test]
    fn maps_status_strings() {
        assert_eq!(
            KalshiMarket::parse_status(Some("active")),
            MarketStatus::Open
        );
        assert_eq!(KalshiMarket::parse_status(Some("open")), MarketStatus::Open);
        assert_eq!(
            KalshiMarket::parse_status(Some("closed")),
            MarketStatus::Closed
        );
        assert_eq!(
            KalshiMarket::parse_status(Some("settled")),
            MarketStatus::Settled
        );
        assert_eq!(
            KalshiMarket::parse_status(Some("finalized")),
            MarketStatus::Settled
        );
        assert_eq!(
            KalshiMarket::parse_status(Some("determined")),
            MarketStatus::Unknown
        );
        assert_eq!(KalshiMarket::parse_status(None), MarketStatus::Unknown);
    }

    #[test]
    fn market_converts_with_mid() {
        let market = KalshiMarket {
            ticker: "TICKER-A".to_string(),
            event_ticker: Some("EVENT-X".to_string()),
            title: "Will X happen?".to_string(),
            yes_bid: Some(40),
            yes_ask: Some(60),
            volume: Some(1000),
            open_interest: None,
            status: Some("open".to_string()),
            close_time: None,
        };
        let m = market.to_market();
        assert_eq!(m.yes_bid, dec!(0.40));
        assert_eq!(m.yes_ask, dec!(0.60));
        assert_eq!(m.mid(), dec!(0.50));
        assert!(m.is_tradeable());
    }

    #[test]
    fn orderbook_derives_yes_asks_from_no_bids() {
        let book = KalshiOrderbook {
            yes: Some(vec![vec![45, 10], vec![40, 5]]),
            no: Some(vec![vec![45, 8]]),
        };
        let converted = book.to_order_book("TEST");
        assert_eq!(converted.best_bid(), Some(dec!(0.45)));
        // NO bid at 45 cents = YES ask at 55 cents
        assert_eq!(converted.best_ask(), Some(dec!(0.55)));
        assert_eq!(converted.yes_bids[0].quantity, Decimal::from(10));
        assert_eq!(converted.mid(), Some(dec!(0.50)));
    }

    #[test]
    fn fill_prices_the_side_actually_traded() {
        let fill = KalshiFill {
            ticker: "M1".to_string(),
            action: Some("buy".to_string()),
            side: Some("no".to_string()),
            count: 10,
            yes_price: Some(70),
            no_price: Some(30),
            created_time: None,
        };
        let converted = fill.to_fill();
        assert_eq!(converted.outcome, Outcome::No);
        assert_eq!(converted.action, OrderSide::Buy);
        assert_eq!(converted.price, dec!(0.30));
        assert_eq!(converted.quantity, 10);
    }

    #[test]
    fn settlement_converts_revenue() {
        let settlement = KalshiSettlement {
            ticker: "M1".to_string(),
            revenue: 1000,
            market_result: Some("yes".to_string()),
            settled_time: None,
        };
        assert_eq!(settlement.to_settlement().revenue, dec!(10.00));
    }

    #[test]
    fn fills_response_deserializes() {
        let json = r#"{
            "fills": [
                {"ticker": "M1", "action": "buy", "side": "yes",
                 "count": 10, "yes_price": 30, "no_price": 70}
            ],
            "cursor": "abc"
        }"#;
        let resp: FillsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.fills.len(), 1);
        assert_eq!(resp.cursor.as_deref(), Some("abc"));
        assert_eq!(resp.fills[0].to_fill().price, dec!(0.30));
    }
}
