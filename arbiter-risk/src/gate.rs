//! Order gating against position, exposure, and daily-loss limits

use arbiter_core::{OrderRequest, Position, PositionStatus};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::warn;

/// Hard limits fixed at construction, all in dollars
#[derive(Debug, Clone)]
pub struct RiskLimits {
    /// Largest order cost allowed into a single market
    pub max_position_per_market: Decimal,
    /// Cap on total market value of unsettled positions plus the new order
    pub max_total_exposure: Decimal,
    /// Daily loss beyond which the kill switch trips
    pub max_daily_loss: Decimal,
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            max_position_per_market: Decimal::from(10),
            max_total_exposure: Decimal::from(50),
            max_daily_loss: Decimal::from(20),
        }
    }
}

/// Why an order was refused.
///
/// A rejection is a normal, expected outcome, not an error: the caller
/// simply does not submit the order.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    #[error("Kill switch active: all trading halted")]
    KillSwitch,

    #[error("Order cost ${cost:.2} exceeds per-market limit ${limit:.2}")]
    PerMarketLimit { cost: Decimal, limit: Decimal },

    #[error("Total exposure ${total:.2} would exceed limit ${limit:.2}")]
    TotalExposure { total: Decimal, limit: Decimal },

    #[error("Daily loss ${daily_pnl:.2} exceeds limit ${limit:.2}")]
    DailyLoss { daily_pnl: Decimal, limit: Decimal },
}

/// Enforces position limits, exposure caps, and the daily loss kill switch.
///
/// The gate holds small mutable state (the daily P&L counter and the kill
/// switch latch) and is not internally synchronized: a single logical owner
/// must perform the check-then-record transitions per order, otherwise two
/// in-flight orders could both pass the exposure check before either is
/// reflected in the position set.
#[derive(Debug)]
pub struct RiskGate {
    limits: RiskLimits,
    daily_pnl: Decimal,
    kill_switch: bool,
}

impl RiskGate {
    /// Create a gate with the kill switch armed and the daily counter at zero
    pub fn new(limits: RiskLimits) -> Self {
        Self {
            limits,
            daily_pnl: Decimal::ZERO,
            kill_switch: false,
        }
    }

    /// Whether the kill switch has tripped
    pub fn is_killed(&self) -> bool {
        self.kill_switch
    }

    /// Cumulative P&L recorded since the last daily reset
    pub fn daily_pnl(&self) -> Decimal {
        self.daily_pnl
    }

    /// Return the rejection reason, or `None` if the order is allowed.
    ///
    /// Checks run in a fixed order and short-circuit on the first failure:
    /// kill switch, per-market cost cap, total exposure cap, daily loss.
    /// The daily-loss check re-fires here in case the loss was recorded but
    /// no order has re-tripped the switch since.
    pub fn check_order(
        &mut self,
        order: &OrderRequest,
        positions: &[Position],
    ) -> Option<Rejection> {
        if self.kill_switch {
            return Some(Rejection::KillSwitch);
        }

        let cost = order.cost();
        if cost > self.limits.max_position_per_market {
            return Some(Rejection::PerMarketLimit {
                cost,
                limit: self.limits.max_position_per_market,
            });
        }

        // Settled positions are resolved; only unsettled ones still carry risk.
        let active_exposure: Decimal = positions
            .iter()
            .filter(|p| p.status != PositionStatus::Settled)
            .map(|p| p.market_value())
            .sum();
        let total = active_exposure + cost;
        if total > self.limits.max_total_exposure {
            return Some(Rejection::TotalExposure {
                total,
                limit: self.limits.max_total_exposure,
            });
        }

        if self.daily_pnl < -self.limits.max_daily_loss {
            self.kill_switch = true;
            return Some(Rejection::DailyLoss {
                daily_pnl: self.daily_pnl,
                limit: self.limits.max_daily_loss,
            });
        }

        None
    }

    /// Add realized P&L to the daily counter, tripping the kill switch if
    /// the accumulated loss crosses the limit
    pub fn record_pnl(&mut self, amount: Decimal) {
        self.daily_pnl += amount;
        if self.daily_pnl < -self.limits.max_daily_loss {
            warn!(daily_pnl = %self.daily_pnl, "KILL SWITCH: daily loss exceeds limit");
            self.kill_switch = true;
        }
    }

    /// Zero the daily counter and re-arm the kill switch.
    ///
    /// Invoked once per trading-day boundary by the caller's scheduler; the
    /// gate imposes no timing itself.
    pub fn reset_daily(&mut self) {
        self.daily_pnl = Decimal::ZERO;
        self.kill_switch = false;
    }
}
