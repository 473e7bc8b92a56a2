//! Order request shape checked by the risk gate
//!
//! Order execution itself is out of scope; these types only describe a
//! proposed order so it can be priced and vetted before submission.

use crate::position::Outcome;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Buy or sell direction of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl std::str::FromStr for OrderSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "buy" | "b" => Ok(OrderSide::Buy),
            "sell" | "s" => Ok(OrderSide::Sell),
            _ => Err(format!("Unknown order side: {}", s)),
        }
    }
}

/// A proposed order, constructed per risk check and never persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Market identifier on the platform
    pub market_id: String,

    /// Which outcome the order trades (YES or NO)
    pub outcome: Outcome,

    /// Buy or sell
    pub order_side: OrderSide,

    /// Limit price per contract (0.00 - 1.00)
    pub price: Decimal,

    /// Number of contracts
    pub quantity: u32,
}

impl OrderRequest {
    /// Total cost of the order at its limit price
    pub fn cost(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}
