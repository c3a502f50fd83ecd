// src/scoring/mod.rs

//! Quiz-attempt scoring core: the attempt ledger, the pure scorer and the
//! leaderboard aggregation.

pub mod error;
pub mod leaderboard;
pub mod ledger;
pub mod scorer;

pub use error::ScoringError;
pub use ledger::AttemptLedger;
