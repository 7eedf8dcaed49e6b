//! Scoring, ranking and aggregation engine.
//!
//! Turns raw per-period scores into ranked period results, then rolls
//! those up into a best-N season leaderboard and fixed-window month
//! leaderboards. Everything here is a pure function of its inputs.

pub mod monthly;
pub mod period;
pub mod rank;
pub mod season;
pub mod types;
pub mod utility;
