//! Risk controls for order proposals
//!
//! A small, synchronous gate that vetoes orders violating configured
//! limits and latches a kill switch once cumulative daily losses breach
//! their threshold. The gate performs no I/O; it is a pure advisory check
//! consumed before any order is dispatched to an exchange.

pub mod gate;

pub use gate::{Rejection, RiskGate, RiskLimits};
