//! `History` ties a log source and a replay configuration together.

use crate::diff::merge_chunks;
use crate::error::Result;
use crate::replay::{replay, replay_documents, state_at, Replay, ReplayConfig};
use crate::source::OperationSource;
use crate::types::{Chunk, DocumentId, DocumentState, MergedDiff};
use tracing::debug;

/// Edit-history queries over the logs of an [`OperationSource`].
///
/// Every call reads the log afresh and recomputes; nothing is cached.
pub struct History<S> {
    source: S,
    config: ReplayConfig,
}

impl<S: OperationSource> History<S> {
    pub fn new(source: S, config: ReplayConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &ReplayConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Full replay of one document.
    pub fn replay(&self, doc: &DocumentId) -> Result<Replay> {
        let log = self.source.operations(doc)?;
        debug!(document = %doc, operations = log.len(), "replaying");
        replay(&log, self.config.policy())
    }

    /// Time-gap chunks of one document.
    pub fn chunked_diffs(&self, doc: &DocumentId) -> Result<Vec<Chunk>> {
        self.replay(doc).map(|replay| replay.chunks)
    }

    /// All chunk diffs of one document folded into one.
    pub fn merged_diff(&self, doc: &DocumentId) -> Result<MergedDiff> {
        let chunks = self.chunked_diffs(doc)?;
        Ok(merge_chunks(&chunks)?)
    }

    /// Document state as of `cutoff_ms`.
    pub fn state_at(&self, doc: &DocumentId, cutoff_ms: i64) -> Result<DocumentState> {
        let log = self.source.operations(doc)?;
        state_at(&log, cutoff_ms)
    }

    /// Time-gap chunks for several documents, replayed in parallel.
    ///
    /// Results follow the order of `docs`. A document whose log cannot be
    /// read gets that error as its result.
    pub fn chunked_diffs_many(&self, docs: &[DocumentId]) -> Vec<(DocumentId, Result<Vec<Chunk>>)> {
        let mut results: Vec<Option<Result<Vec<Chunk>>>> = Vec::with_capacity(docs.len());
        let mut jobs = Vec::new();
        let mut job_slots = Vec::new();

        for (slot, doc) in docs.iter().enumerate() {
            match self.source.operations(doc) {
                Ok(log) => {
                    jobs.push((doc.clone(), log));
                    job_slots.push(slot);
                    results.push(None);
                }
                Err(e) => results.push(Some(Err(e))),
            }
        }

        for (slot, (_, result)) in job_slots.into_iter().zip(replay_documents(jobs, &self.config)) {
            results[slot] = Some(result);
        }

        docs.iter()
            .cloned()
            .zip(results)
            .filter_map(|(doc, result)| result.map(|result| (doc, result)))
            .collect()
    }
}
