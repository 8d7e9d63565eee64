//! Parallel replay of independent documents.

use crossbeam_channel::unbounded;
use tracing::debug;

use super::engine::compute_chunked_diffs;
use super::ReplayConfig;
use crate::error::Result;
use crate::types::{Chunk, DocumentId, Operation};

/// Replay many documents' logs on a bounded pool of worker threads.
///
/// Each log is replayed sequentially by a single worker; logs share
/// nothing. Results are returned in the order the jobs were given, and a
/// failing document does not affect the others.
pub fn replay_documents(
    jobs: Vec<(DocumentId, Vec<Operation>)>,
    config: &ReplayConfig,
) -> Vec<(DocumentId, Result<Vec<Chunk>>)> {
    let total = jobs.len();
    if total == 0 {
        return Vec::new();
    }

    let workers = config.workers.clamp(1, total);
    let threshold_ms = config.threshold_ms;

    let (job_tx, job_rx) = unbounded();
    let (result_tx, result_rx) = unbounded();
    for (slot, (id, log)) in jobs.into_iter().enumerate() {
        // The receiver is alive until the scope below ends.
        let _ = job_tx.send((slot, id, log));
    }
    drop(job_tx);

    debug!(documents = total, workers, "parallel replay started");

    std::thread::scope(|scope| {
        for worker in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            scope.spawn(move || {
                for (slot, id, log) in job_rx.iter() {
                    debug!(worker, document = %id, operations = log.len(), "replaying document");
                    let result = compute_chunked_diffs(&log, threshold_ms);
                    if result_tx.send((slot, id, result)).is_err() {
                        break;
                    }
                }
            });
        }
    });
    drop(result_tx);

    let mut results: Vec<(usize, DocumentId, Result<Vec<Chunk>>)> = result_rx.iter().collect();
    results.sort_by_key(|(slot, _, _)| *slot);
    results
        .into_iter()
        .map(|(_, id, result)| (id, result))
        .collect()
}
