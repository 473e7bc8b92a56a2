//! Netting of fills and settlements into per-market positions

use arbiter_core::{
    Fill, MarketStatus, OrderSide, Outcome, Platform, Position, PositionStatus, Settlement,
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::debug;

/// A market's live quote, as consulted for unsettled positions
#[derive(Debug, Clone)]
pub struct MarketQuote {
    /// Human-readable market title
    pub title: String,
    /// Midpoint of the best bid/ask, used as the mark price
    pub mid: Decimal,
    /// Trading status reported by the platform
    pub status: MarketStatus,
}

/// Running totals for one market while netting fills
#[derive(Debug)]
struct Netting {
    quantity: i64,
    cost: Decimal,
    outcome: Outcome,
}

/// Reconstruct positions from raw fill and settlement history.
///
/// Fills are netted per market (buys add quantity and cost, sells subtract
/// both) using exact decimal arithmetic. A market with settlement revenue is
/// reported as settled without consulting its quote. Remaining markets are
/// classified from `quotes`: a trading status marks the position active at
/// the quoted mid; any other status means the market resolved but the payout
/// has not posted yet; a failed lookup degrades that single market to
/// unknown without aborting the rest of the batch.
///
/// Markets whose fills net to zero are dropped, and a settlement with no
/// matching fills never synthesizes a position. Output is ordered by market
/// id ascending.
pub fn reconcile(
    platform: Platform,
    fills: &[Fill],
    settlements: &[Settlement],
    quotes: impl Fn(&str) -> Option<MarketQuote>,
) -> Vec<Position> {
    // A market with settlement revenue is resolved regardless of its fills.
    let mut settled_revenue: BTreeMap<&str, Decimal> = BTreeMap::new();
    for settlement in settlements {
        *settled_revenue
            .entry(settlement.market_id.as_str())
            .or_insert(Decimal::ZERO) += settlement.revenue;
    }

    // Net fills per market. BTreeMap keeps the output ordered by market id.
    let mut netted: BTreeMap<&str, Netting> = BTreeMap::new();
    for fill in fills {
        let entry = netted.entry(fill.market_id.as_str()).or_insert(Netting {
            quantity: 0,
            cost: Decimal::ZERO,
            outcome: fill.outcome,
        });
        let notional = Decimal::from(fill.quantity) * fill.price;
        match fill.action {
            OrderSide::Buy => {
                entry.quantity += i64::from(fill.quantity);
                entry.cost += notional;
            }
            OrderSide::Sell => {
                entry.quantity -= i64::from(fill.quantity);
                entry.cost -= notional;
            }
        }
        // Fills for a market share one outcome in practice; last one wins.
        entry.outcome = fill.outcome;
    }

    let mut positions = Vec::new();
    for (market_id, net) in netted {
        if net.quantity == 0 {
            // Fully closed round-trip, nothing to report.
            continue;
        }

        if let Some(&revenue) = settled_revenue.get(market_id) {
            positions.push(Position {
                market_id: market_id.to_string(),
                market_title: String::new(),
                platform,
                outcome: net.outcome,
                quantity: net.quantity,
                cost_basis: net.cost,
                current_price: None,
                settlement_revenue: Some(revenue),
                status: PositionStatus::Settled,
            });
            continue;
        }

        let (title, current_price, status) = match quotes(market_id) {
            Some(quote) if quote.status.is_trading() => {
                (quote.title, Some(quote.mid), PositionStatus::Active)
            }
            // Closed or finalized but the payout has not posted yet.
            Some(quote) => (quote.title, None, PositionStatus::Settled),
            None => {
                debug!(market_id, "quote lookup failed, marking position unknown");
                (String::new(), None, PositionStatus::Unknown)
            }
        };

        positions.push(Position {
            market_id: market_id.to_string(),
            market_title: title,
            platform,
            outcome: net.outcome,
            quantity: net.quantity,
            cost_basis: net.cost,
            current_price,
            settlement_revenue: None,
            status,
        });
    }

    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn fill(market_id: &str, action: OrderSide, quantity: u32, price: Decimal) -> Fill {
        Fill {
            market_id: market_id.to_string(),
            action,
            outcome: Outcome::Yes,
            quantity,
            price,
        }
    }

    fn open_quote(title: &str, mid: Decimal) -> MarketQuote {
        MarketQuote {
            title: title.to_string(),
            mid,
            status: MarketStatus::Open,
        }
    }

    #[test]
    fn nets_buys_and_sells_per_market() {
        let fills = vec![
            fill("M1", OrderSide::Buy, 10, dec!(0.30)),
            fill("M1", OrderSide::Sell, 4, dec!(0.30)),
        ];
        let positions = reconcile(Platform::Kalshi, &fills, &[], |_| {
            Some(open_quote("Will it rain?", dec!(0.50)))
        });

        assert_eq!(positions.len(), 1);
        let pos = &positions[0];
        assert_eq!(pos.market_id, "M1");
        assert_eq!(pos.quantity, 6);
        assert_eq!(pos.cost_basis, dec!(1.80));
        assert_eq!(pos.current_price, Some(dec!(0.50)));
        assert_eq!(pos.status, PositionStatus::Active);
        assert_eq!(pos.market_value(), dec!(3.00));
        assert_eq!(pos.pnl(), dec!(1.20));
    }

    #[test]
    fn zero_net_markets_are_dropped() {
        let fills = vec![
            fill("M1", OrderSide::Buy, 10, dec!(0.30)),
            fill("M1", OrderSide::Sell, 10, dec!(0.70)),
        ];
        let positions = reconcile(Platform::Kalshi, &fills, &[], |_| {
            Some(open_quote("", dec!(0.50)))
        });
        assert!(positions.is_empty());
    }

    #[test]
    fn settlement_overrides_quote_classification() {
        let fills = vec![fill("M1", OrderSide::Buy, 10, dec!(0.40))];
        let settlements = vec![Settlement {
            market_id: "M1".to_string(),
            revenue: dec!(10.00),
        }];
        // Quote says the market is still open; settlement wins anyway.
        let positions = reconcile(Platform::Kalshi, &fills, &settlements, |_| {
            Some(open_quote("", dec!(0.99)))
        });

        assert_eq!(positions.len(), 1);
        let pos = &positions[0];
        assert_eq!(pos.status, PositionStatus::Settled);
        assert_eq!(pos.settlement_revenue, Some(dec!(10.00)));
        assert_eq!(pos.current_price, None);
        assert_eq!(pos.market_value(), dec!(10.00));
    }

    #[test]
    fn settlement_revenue_is_summed_per_market() {
        let fills = vec![fill("M1", OrderSide::Buy, 10, dec!(0.40))];
        let settlements = vec![
            Settlement {
                market_id: "M1".to_string(),
                revenue: dec!(4.00),
            },
            Settlement {
                market_id: "M1".to_string(),
                revenue: dec!(6.00),
            },
        ];
        let positions = reconcile(Platform::Kalshi, &fills, &settlements, |_| None);
        assert_eq!(positions[0].settlement_revenue, Some(dec!(10.00)));
    }

    #[test]
    fn settlement_without_fills_is_not_reported() {
        let settlements = vec![Settlement {
            market_id: "GHOST".to_string(),
            revenue: dec!(5.00),
        }];
        let positions = reconcile(Platform::Kalshi, &[], &settlements, |_| None);
        assert!(positions.is_empty());
    }

    #[test]
    fn non_trading_quote_means_settled_pending_payout() {
        let fills = vec![fill("M1", OrderSide::Buy, 5, dec!(0.60))];
        let positions = reconcile(Platform::Kalshi, &fills, &[], |_| {
            Some(MarketQuote {
                title: "Closed market".to_string(),
                mid: dec!(0.50),
                status: MarketStatus::Closed,
            })
        });

        let pos = &positions[0];
        assert_eq!(pos.status, PositionStatus::Settled);
        assert_eq!(pos.current_price, None);
        assert_eq!(pos.settlement_revenue, None);
        assert_eq!(pos.market_value(), Decimal::ZERO);
    }

    #[test]
    fn failed_lookup_degrades_single_market_to_unknown() {
        let fills = vec![
            fill("BAD", OrderSide::Buy, 5, dec!(0.50)),
            fill("GOOD", OrderSide::Buy, 5, dec!(0.50)),
        ];
        let positions = reconcile(Platform::Kalshi, &fills, &[], |id| {
            (id == "GOOD").then(|| open_quote("Good market", dec!(0.55)))
        });

        assert_eq!(positions.len(), 2);
        assert_eq!(positions[0].market_id, "BAD");
        assert_eq!(positions[0].status, PositionStatus::Unknown);
        assert_eq!(positions[0].current_price, None);
        assert_eq!(positions[1].market_id, "GOOD");
        assert_eq!(positions[1].status, PositionStatus::Active);
    }

    #[test]
    fn output_is_ordered_by_market_id() {
        let fills = vec![
            fill("ZULU", OrderSide::Buy, 1, dec!(0.50)),
            fill("ALPHA", OrderSide::Buy, 1, dec!(0.50)),
            fill("MIKE", OrderSide::Buy, 1, dec!(0.50)),
        ];
        let positions = reconcile(Platform::Kalshi, &fills, &[], |_| None);
        let ids: Vec<&str> = positions.iter().map(|p| p.market_id.as_str()).collect();
        assert_eq!(ids, vec!["ALPHA", "MIKE", "ZULU"]);
    }

    #[test]
    fn last_fill_outcome_wins() {
        let fills = vec![
            Fill {
                market_id: "M1".to_string(),
                action: OrderSide::Buy,
                outcome: Outcome::Yes,
                quantity: 5,
                price: dec!(0.50),
            },
            Fill {
                market_id: "M1".to_string(),
                action: OrderSide::Buy,
                outcome: Outcome::No,
                quantity: 5,
                price: dec!(0.50),
            },
        ];
        let positions = reconcile(Platform::Kalshi, &fills, &[], |_| None);
        assert_eq!(positions[0].outcome, Outcome::No);
    }

    #[test]
    fn sells_reduce_cost_basis_exactly() {
        // Buy 3 @ 0.10, sell 1 @ 0.30: cost = 0.30 - 0.30 = 0, quantity = 2.
        let fills = vec![
            fill("M1", OrderSide::Buy, 3, dec!(0.10)),
            fill("M1", OrderSide::Sell, 1, dec!(0.30)),
        ];
        let positions = reconcile(Platform::Kalshi, &fills, &[], |_| None);
        assert_eq!(positions[0].quantity, 2);
        assert_eq!(positions[0].cost_basis, dec!(0.00));
    }
}
