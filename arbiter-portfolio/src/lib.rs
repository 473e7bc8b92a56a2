//! Position reconstruction from trade history
//!
//! Exchanges' native position queries are unreliable for some accounts, so
//! this crate derives ground-truth positions from the system of record:
//! the full fill history netted per market, with settlement payouts layered
//! on top and live quotes used to mark whatever is still open.

pub mod reconciler;

pub use reconciler::{reconcile, MarketQuote};
