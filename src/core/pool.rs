//! Bounded worker pool with completion-order results
//!
//! Per-file tasks (parsing, compression) run on a rayon pool sized
//! `min(pending, max_workers)`. Results come back in the order tasks finish,
//! each paired with the key it was submitted with, so callers aggregate by
//! key rather than by arrival order.

use crate::core::error::{FileFailure, InstallError};
use log::{debug, error};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};

/// Number of workers for `pending` tasks given an upper bound
pub fn worker_count(pending: usize, max_workers: usize) -> usize {
    pending.min(max_workers).max(1)
}

/// Iterator over `(key, result)` pairs in completion order
///
/// Yields exactly one item per submitted key, then ends.
pub struct Completed<K, T> {
    rx: mpsc::Receiver<(K, T)>,
    remaining: usize,
    // keeps the workers alive until every result has been received
    _pool: rayon::ThreadPool,
}

impl<K, T> Completed<K, T> {
    /// Results not yet received
    pub fn remaining(&self) -> usize {
        self.remaining
    }
}

impl<K, T> Iterator for Completed<K, T> {
    type Item = (K, T);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        // a panicked task never sends; recv fails once every sender is gone
        let item = self.rx.recv().ok()?;
        self.remaining -= 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

/// Run `task` for every key on a bounded pool, yielding results as they complete.
pub fn as_completed<K, T, F>(
    keys: Vec<K>,
    max_workers: usize,
    task: F,
) -> Result<Completed<K, T>, InstallError>
where
    K: Send + 'static,
    T: Send + 'static,
    F: Fn(&K) -> T + Send + Sync + 'static,
{
    let workers = worker_count(keys.len(), max_workers);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .panic_handler(|_| error!("Worker task panicked, its result is lost"))
        .build()
        .map_err(|e| {
            InstallError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to create thread pool: {}", e),
            ))
        })?;
    debug!("Submitting {} task(s) to {} worker(s)", keys.len(), workers);

    let (tx, rx) = mpsc::channel();
    let task = Arc::new(task);
    let remaining = keys.len();
    for key in keys {
        let tx = tx.clone();
        let task = Arc::clone(&task);
        pool.spawn(move || {
            let result = task(&key);
            // receiver gone means the caller stopped listening
            let _ = tx.send((key, result));
        });
    }

    Ok(Completed {
        rx,
        remaining,
        _pool: pool,
    })
}

/// Drain per-file results into successes keyed by path and failures.
///
/// Every task is waited for. `on_done` is called once per finished file,
/// in completion order.
pub fn partition_by_path<T, E, I, F>(results: I, mut on_done: F) -> (BTreeMap<PathBuf, T>, Vec<FileFailure>)
where
    I: IntoIterator<Item = (PathBuf, Result<T, E>)>,
    E: Into<InstallError>,
    F: FnMut(&PathBuf),
{
    let mut collected = BTreeMap::new();
    let mut failures = Vec::new();
    for (path, result) in results {
        on_done(&path);
        match result {
            Ok(value) => {
                collected.insert(path, value);
            }
            Err(e) => failures.push(FileFailure {
                path,
                error: Box::new(e.into()),
            }),
        }
    }
    (collected, failures)
}

/// Drain per-file results, keyed by path.
///
/// Every task is waited for before failures are reported, so one bad file
/// does not hide the outcome of its siblings.
pub fn collect_by_path<T, E, I, F>(results: I, on_done: F) -> Result<BTreeMap<PathBuf, T>, InstallError>
where
    I: IntoIterator<Item = (PathBuf, Result<T, E>)>,
    E: Into<InstallError>,
    F: FnMut(&PathBuf),
{
    let (collected, failures) = partition_by_path(results, on_done);
    if failures.is_empty() {
        Ok(collected)
    } else {
        Err(InstallError::FileFailures(failures))
    }
}
