//! Search coordination: one worker thread per slice.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};

use crate::matcher::Pattern;
use crate::wallet::WalletOptions;

use super::search::{CandidateSource, RandomWallets, SearchResult, VanityMatcher, WorkerStats};

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("failed to spawn search worker: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("search workers exited with {found} of {total} slices matched")]
    Incomplete { found: usize, total: usize },
}

/// Runs one search per slice concurrently and collects their results.
pub struct SearchCoordinator {
    /// Patterns in input order
    patterns: Vec<Pattern>,
    /// Worker thread handles (Option to allow taking during join)
    handles: Option<Vec<JoinHandle<()>>>,
    /// Channel receiver for (pattern index, result)
    result_rx: Receiver<(usize, SearchResult)>,
    /// Results received so far, indexed like `patterns`
    results: Vec<Option<SearchResult>>,
    /// Shared stop flag
    stop_flag: Arc<AtomicBool>,
    /// Shared statistics
    stats: Arc<WorkerStats>,
    /// Start time
    start_time: Instant,
}

impl SearchCoordinator {
    /// Starts a search over random wallets for every pattern.
    pub fn start(patterns: Vec<Pattern>, options: WalletOptions) -> Result<Self, SearchError> {
        Self::start_with(patterns, |_| RandomWallets::new(options.clone()))
    }

    /// Starts a search per pattern, each drawing candidates from the source
    /// built by `make_source`.
    pub fn start_with<S, F>(patterns: Vec<Pattern>, mut make_source: F) -> Result<Self, SearchError>
    where
        S: CandidateSource + Send + 'static,
        F: FnMut(&Pattern) -> S,
    {
        // Every worker sends at most once, so sends never block.
        let (result_tx, result_rx) = bounded(patterns.len().max(1));
        let stop_flag = Arc::new(AtomicBool::new(false));
        let stats = Arc::new(WorkerStats::new());
        let mut handles = Vec::with_capacity(patterns.len());

        for (index, pattern) in patterns.iter().enumerate() {
            let source = make_source(pattern);
            let pattern = pattern.clone();
            let result_tx = result_tx.clone();
            let stop_flag_worker = stop_flag.clone();
            let stats = stats.clone();

            let spawned = thread::Builder::new()
                .name(format!("vanity-worker-{}", index))
                .spawn(move || {
                    tracing::debug!(slice = %pattern.slice(), "search started");
                    let matcher = VanityMatcher::new(pattern, source).with_stats(stats);
                    if let Some(result) = matcher.run(&stop_flag_worker) {
                        tracing::debug!(
                            slice = %result.slice,
                            mileage = result.mileage,
                            "slice matched"
                        );
                        let _ = result_tx.send((index, result));
                    }
                });

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    stop_flag.store(true, Ordering::Relaxed);
                    for handle in handles {
                        let _ = handle.join();
                    }
                    return Err(SearchError::Spawn(e));
                }
            }
        }

        // Drop our sender so the channel disconnects once every worker exits
        drop(result_tx);

        tracing::info!(workers = handles.len(), "search started");

        Ok(Self {
            results: vec![None; patterns.len()],
            patterns,
            handles: Some(handles),
            result_rx,
            stop_flag,
            stats,
            start_time: Instant::now(),
        })
    }

    /// Waits for the next match with a timeout.
    ///
    /// Returns `Ok(Some(result))` when a slice matched, `Ok(None)` if the
    /// timeout expired, and an error if every worker exited with slices
    /// still unmatched.
    pub fn wait_for_result(&mut self, timeout: Duration) -> Result<Option<SearchResult>, SearchError> {
        if self.is_complete() {
            return Ok(None);
        }
        match self.result_rx.recv_timeout(timeout) {
            Ok((index, result)) => {
                self.results[index] = Some(result.clone());
                Ok(Some(result))
            }
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(self.incomplete()),
        }
    }

    /// Blocks until every slice matched; results come back in pattern order.
    pub fn wait_all(mut self) -> Result<Vec<SearchResult>, SearchError> {
        while !self.is_complete() {
            match self.result_rx.recv() {
                Ok((index, result)) => self.results[index] = Some(result),
                Err(_) => return Err(self.incomplete()),
            }
        }
        self.join_workers();
        Ok(std::mem::take(&mut self.results).into_iter().flatten().collect())
    }

    fn incomplete(&self) -> SearchError {
        SearchError::Incomplete {
            found: self.matched_count(),
            total: self.patterns.len(),
        }
    }

    fn join_workers(&mut self) {
        if let Some(handles) = self.handles.take() {
            for handle in handles {
                let _ = handle.join();
            }
        }
    }

    /// Returns true once every slice has matched.
    pub fn is_complete(&self) -> bool {
        self.results.iter().all(Option::is_some)
    }

    /// Number of slices matched so far.
    pub fn matched_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_some()).count()
    }

    /// Signals all workers to stop.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }

    /// Returns the number of workers.
    pub fn num_workers(&self) -> usize {
        self.patterns.len()
    }

    /// Returns the total wallets generated across all workers.
    pub fn total_wallets(&self) -> u64 {
        self.stats.total_wallets()
    }

    /// Returns the candidates dropped because derivation failed.
    pub fn total_discarded(&self) -> u64 {
        self.stats.total_discarded()
    }

    /// Returns the total matches found.
    pub fn total_matches(&self) -> u64 {
        self.stats.total_matches()
    }

    /// Returns the elapsed time since the search started.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Returns the current generation rate (wallets per second).
    pub fn wallets_per_second(&self) -> f64 {
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.total_wallets() as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Returns a clone of the stop flag for external use (e.g., signal handlers).
    pub fn stop_flag_clone(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    /// Returns true if the search has been signaled to stop.
    pub fn is_stopped(&self) -> bool {
        self.stop_flag.load(Ordering::Relaxed)
    }
}

impl Drop for SearchCoordinator {
    fn drop(&mut self) {
        self.stop();
        self.join_workers();
    }
}
