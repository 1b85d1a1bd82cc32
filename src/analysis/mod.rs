//! Aggregation over the deposit ledger and alliance roster.

pub mod aggregator;
pub mod filter;

pub use aggregator::*;
pub use filter::DepositFilter;
