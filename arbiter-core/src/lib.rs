//! Core types for the arbiter prediction market client
//!
//! This crate defines the shared data structures used across the workspace:
//! market snapshots, order books, fills, settlements, positions, and the
//! order request shape checked by the risk gate.

pub mod error;
pub mod market;
pub mod order;
pub mod platform;
pub mod position;

pub use error::{ArbiterError, ArbiterResult};
pub use market::{MarketStatus, OrderBook, OrderBookLevel, PredictionMarket};
pub use order::{OrderRequest, OrderSide};
pub use platform::Platform;
pub use position::{Balance, Fill, Outcome, Position, PositionStatus, Settlement};
