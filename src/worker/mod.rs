//! Concurrent vanity search.
//!
//! This module provides:
//! - The per-slice search state machine over an injectable candidate source
//! - A coordinator running one worker thread per slice
//! - Shared progress statistics

mod pool;
mod search;

pub use pool::{SearchCoordinator, SearchError};
pub use search::{
    CandidateSource, MatcherState, RandomWallets, SearchResult, VanityMatcher, WorkerStats,
};
