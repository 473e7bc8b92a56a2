//! Kalshi integration for the arbiter prediction market client
//!
//! Wraps the Kalshi REST API: market listings, order books, account
//! balance, and the paginated fill/settlement history that feeds position
//! reconstruction.

pub mod client;
pub mod types;

pub use client::KalshiClient;
