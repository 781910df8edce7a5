//! Per-slice brute-force search.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::matcher::Pattern;
use crate::wallet::{Wallet, WalletError, WalletOptions};

/// Statistics shared by all search workers.
#[derive(Debug, Default)]
pub struct WorkerStats {
    /// Total wallets generated
    pub wallets_generated: AtomicU64,
    /// Candidates dropped because derivation failed
    pub candidates_discarded: AtomicU64,
    /// Matches found
    pub matches_found: AtomicU64,
}

impl WorkerStats {
    /// Creates new worker stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total wallets generated.
    pub fn total_wallets(&self) -> u64 {
        self.wallets_generated.load(Ordering::Relaxed)
    }

    /// Returns the total candidates discarded.
    pub fn total_discarded(&self) -> u64 {
        self.candidates_discarded.load(Ordering::Relaxed)
    }

    /// Returns the total matches found.
    pub fn total_matches(&self) -> u64 {
        self.matches_found.load(Ordering::Relaxed)
    }
}

/// Supplies candidate wallets to a search.
pub trait CandidateSource {
    fn next_candidate(&mut self) -> Result<Wallet, WalletError>;
}

impl<F> CandidateSource for F
where
    F: FnMut() -> Result<Wallet, WalletError>,
{
    fn next_candidate(&mut self) -> Result<Wallet, WalletError> {
        self()
    }
}

/// Fresh wallets from random mnemonics.
#[derive(Debug, Clone)]
pub struct RandomWallets {
    options: WalletOptions,
}

impl RandomWallets {
    pub fn new(options: WalletOptions) -> Self {
        Self { options }
    }
}

impl CandidateSource for RandomWallets {
    #[inline]
    fn next_candidate(&mut self) -> Result<Wallet, WalletError> {
        Wallet::generate(&self.options)
    }
}

/// A matched slice.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The slice that was searched for
    pub slice: String,
    /// The matching wallet
    pub wallet: Wallet,
    /// Wallets generated up to and including the match
    pub mileage: u64,
}

/// Search progress of one slice.
#[derive(Debug, Clone, Default)]
pub enum MatcherState {
    #[default]
    Searching,
    Matched(SearchResult),
}

/// Generates candidates until one matches the pattern.
pub struct VanityMatcher<S> {
    pattern: Pattern,
    source: S,
    mileage: u64,
    state: MatcherState,
    stats: Option<Arc<WorkerStats>>,
}

impl<S: CandidateSource> VanityMatcher<S> {
    pub fn new(pattern: Pattern, source: S) -> Self {
        Self {
            pattern,
            source,
            mileage: 0,
            state: MatcherState::Searching,
            stats: None,
        }
    }

    /// Reports progress into shared statistics.
    pub fn with_stats(mut self, stats: Arc<WorkerStats>) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Wallets generated so far.
    pub fn mileage(&self) -> u64 {
        self.mileage
    }

    pub fn is_matched(&self) -> bool {
        matches!(self.state, MatcherState::Matched(_))
    }

    /// Tests one candidate. A candidate whose derivation fails is dropped
    /// without counting towards the mileage. Once matched, further calls are
    /// no-ops.
    pub fn step(&mut self) -> &MatcherState {
        if self.is_matched() {
            return &self.state;
        }

        let wallet = match self.source.next_candidate() {
            Ok(wallet) => wallet,
            Err(e) => {
                tracing::trace!(slice = %self.pattern.slice(), error = %e, "discarding candidate");
                if let Some(stats) = &self.stats {
                    stats.candidates_discarded.fetch_add(1, Ordering::Relaxed);
                }
                return &self.state;
            }
        };

        self.mileage += 1;
        if let Some(stats) = &self.stats {
            stats.wallets_generated.fetch_add(1, Ordering::Relaxed);
        }

        if self.pattern.matches(&wallet).is_match() {
            if let Some(stats) = &self.stats {
                stats.matches_found.fetch_add(1, Ordering::Relaxed);
            }
            self.state = MatcherState::Matched(SearchResult {
                slice: self.pattern.slice().to_owned(),
                wallet,
                mileage: self.mileage,
            });
        }

        &self.state
    }

    /// Runs the search loop.
    ///
    /// Steps until a match is found (returned) or the stop flag is set
    /// (returns `None`).
    pub fn run(mut self, stop_flag: &AtomicBool) -> Option<SearchResult> {
        while !stop_flag.load(Ordering::Relaxed) {
            self.step();
            if let MatcherState::Matched(result) = std::mem::take(&mut self.state) {
                return Some(result);
            }
        }
        None
    }
}
