//! Configuration via environment variables

use anyhow::{Context, Result};
use arbiter_risk::RiskLimits;
use rust_decimal::Decimal;

/// Runtime configuration, read from `ARBITER_*` environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Kalshi API key; portfolio commands require it
    pub kalshi_api_key: Option<String>,
    /// Use the demo API instead of production
    pub use_demo: bool,
    /// Risk gate limits
    pub limits: RiskLimits,
}

fn env_decimal(name: &str, default: Decimal) -> Result<Decimal> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<Decimal>()
            .with_context(|| format!("{} must be a decimal amount, got {:?}", name, raw)),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = RiskLimits::default();
        let limits = RiskLimits {
            max_position_per_market: env_decimal(
                "ARBITER_MAX_POSITION_PER_MARKET",
                defaults.max_position_per_market,
            )?,
            max_total_exposure: env_decimal(
                "ARBITER_MAX_TOTAL_EXPOSURE",
                defaults.max_total_exposure,
            )?,
            max_daily_loss: env_decimal("ARBITER_MAX_DAILY_LOSS", defaults.max_daily_loss)?,
        };

        let use_demo = std::env::var("ARBITER_USE_DEMO")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            kalshi_api_key: std::env::var("ARBITER_KALSHI_API_KEY").ok(),
            use_demo,
            limits,
        })
    }
}
