//! Fills, settlements, and reconstructed positions

use crate::platform::Platform;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Outcome type for a prediction market position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Yes,
    No,
}

impl std::str::FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yes" | "y" => Ok(Outcome::Yes),
            "no" | "n" => Ok(Outcome::No),
            _ => Err(format!("Unknown outcome: {}", s)),
        }
    }
}

/// A single executed trade leg, emitted once per matched trade
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fill {
    /// Market identifier on the platform
    pub market_id: String,

    /// Buy or sell
    pub action: crate::order::OrderSide,

    /// Which outcome was traded (YES or NO)
    pub outcome: Outcome,

    /// Number of contracts in this fill
    pub quantity: u32,

    /// Per-contract price as a fraction of $1 (0.00 - 1.00)
    pub price: Decimal,
}

/// Final payout recorded for a resolved market
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settlement {
    /// Market identifier on the platform
    pub market_id: String,

    /// Total payout received for this market, in dollars
    pub revenue: Decimal,
}

/// Lifecycle status of a reconstructed position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionStatus {
    /// Market is still trading; position marked at the current mid
    Active,
    /// Market resolved (payout posted, or trading halted pending payout)
    Settled,
    /// Market state could not be determined
    Unknown,
}

/// A position in a market, derived from fill and settlement history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    /// Market identifier on the platform
    pub market_id: String,

    /// Human-readable market title, when known
    pub market_title: String,

    /// Which platform this position is on
    pub platform: Platform,

    /// Which outcome we hold (YES or NO)
    pub outcome: Outcome,

    /// Signed net contracts held (buys minus sells)
    pub quantity: i64,

    /// Net dollars paid for the current holding
    pub cost_basis: Decimal,

    /// Current mid price, for active positions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_price: Option<Decimal>,

    /// Settlement payout, once the market has resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settlement_revenue: Option<Decimal>,

    /// Lifecycle status
    pub status: PositionStatus,
}

impl Position {
    /// Current paper value of the position.
    ///
    /// Settlement revenue is authoritative once present; otherwise the
    /// position is marked at the current price, or zero if no mark exists.
    pub fn market_value(&self) -> Decimal {
        if let Some(revenue) = self.settlement_revenue {
            return revenue;
        }
        if let Some(price) = self.current_price {
            return price * Decimal::from(self.quantity);
        }
        Decimal::ZERO
    }

    /// Profit or loss relative to cost basis
    pub fn pnl(&self) -> Decimal {
        self.market_value() - self.cost_basis
    }
}

/// Account balance on a platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Balance {
    /// Which platform this balance is on
    pub platform: Platform,

    /// Available balance for trading, in dollars
    pub available: Decimal,

    /// Currency symbol (USD for Kalshi, USDC for Polymarket)
    pub currency: String,
}

impl Balance {
    /// Create a new balance
    pub fn new(platform: Platform, available: Decimal, currency: &str) -> Self {
        Self {
            platform,
            available,
            currency: currency.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn position() -> Position {
        Position {
            market_id: "M1".to_string(),
            market_title: String::new(),
            platform: Platform::Kalshi,
            outcome: Outcome::Yes,
            quantity: 6,
            cost_basis: dec!(1.80),
            current_price: None,
            settlement_revenue: None,
            status: PositionStatus::Active,
        }
    }

    #[test]
    fn market_value_uses_current_price() {
        let mut pos = position();
        pos.current_price = Some(dec!(0.50));
        assert_eq!(pos.market_value(), dec!(3.00));
        assert_eq!(pos.pnl(), dec!(1.20));
    }

    #[test]
    fn settlement_revenue_overrides_price() {
        let mut pos = position();
        pos.current_price = Some(dec!(0.50));
        pos.settlement_revenue = Some(dec!(6.00));
        assert_eq!(pos.market_value(), dec!(6.00));
        assert_eq!(pos.pnl(), dec!(4.20));
    }

    #[test]
    fn market_value_defaults_to_zero_without_mark() {
        let pos = position();
        assert_eq!(pos.market_value(), Decimal::ZERO);
        assert_eq!(pos.pnl(), dec!(-1.80));
    }
}
