//! Replaying an operation log into chunks.

use tracing::{debug, trace, warn};

use super::policy::ChunkPolicy;
use crate::diff::{diff_lines, is_unchanged, DiffStats};
use crate::error::{ApplyError, HistoryError, Result};
use crate::state::apply_operation;
use crate::types::{Chunk, DocumentState, Operation};

/// Result of replaying a whole log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Replay {
    /// Chunks with a net change, in timeline order.
    pub chunks: Vec<Chunk>,
    /// Document state after the last operation.
    pub final_state: DocumentState,
    /// Number of operations applied.
    pub operations: usize,
}

/// Incremental replay of one document's log.
///
/// Only the open chunk's baseline and the current document are held, so a
/// log can be fed one operation at a time and chunks taken as they close.
///
/// The first baseline is the empty document, unless the first operation
/// creates the document, in which case the created text is the baseline.
/// If no chunk closes before [`Replayer::finish`] and the created text was
/// never changed, the trailing chunk is diffed against the empty document.
///
/// A failed operation poisons the replayer: every later `push` and
/// `finish` returns the same error.
#[derive(Clone, Debug)]
pub struct Replayer {
    policy: ChunkPolicy,
    baseline: DocumentState,
    current: DocumentState,
    last_ts: Option<i64>,
    applied: usize,
    sealed: usize,
    failure: Option<(usize, i64, ApplyError)>,
}

impl Replayer {
    pub fn new(policy: ChunkPolicy) -> Self {
        Self {
            policy,
            baseline: DocumentState::empty(),
            current: DocumentState::empty(),
            last_ts: None,
            applied: 0,
            sealed: 0,
            failure: None,
        }
    }

    /// Baseline of the chunk that is currently open.
    pub fn baseline(&self) -> &DocumentState {
        &self.baseline
    }

    /// Document state after the last pushed operation.
    pub fn current(&self) -> &DocumentState {
        &self.current
    }

    pub fn operations_applied(&self) -> usize {
        self.applied
    }

    /// Apply the next operation in log order.
    ///
    /// Returns the chunk that the operation's timestamp closed, if it had
    /// any net change. An apply failure poisons the whole replay: callers
    /// must discard chunks already taken from this replayer.
    pub fn push(&mut self, op: &Operation) -> Result<Option<Chunk>> {
        self.check_poisoned()?;
        let index = self.applied;
        let ts = op.timestamp();

        let closed = if self.policy.should_close(self.last_ts, ts) {
            self.seal()
        } else {
            None
        };

        let next = match apply_operation(&self.current, op) {
            Ok(next) => next,
            Err(source) => {
                warn!(index, ts, error = %source, "replay aborted");
                self.failure = Some((index, ts, source.clone()));
                return Err(HistoryError::Apply {
                    index,
                    timestamp: ts,
                    source,
                });
            }
        };
        trace!(index, version = next.version, "operation applied");

        if index == 0 && op.is_create() {
            self.baseline = next.clone();
        }
        self.current = next;
        self.last_ts = Some(ts);
        self.applied += 1;

        Ok(closed)
    }

    /// Close the trailing chunk.
    ///
    /// Fails with [`HistoryError::EmptyLog`] if nothing was pushed.
    pub fn finish(&mut self) -> Result<Option<Chunk>> {
        self.check_poisoned()?;
        if self.applied == 0 {
            return Err(HistoryError::EmptyLog);
        }

        let chunk = self.seal();
        if chunk.is_none() && self.sealed == 0 {
            return Ok(self.close(DocumentState::empty()));
        }
        Ok(chunk)
    }

    fn check_poisoned(&self) -> Result<()> {
        match &self.failure {
            Some((index, timestamp, source)) => Err(HistoryError::Apply {
                index: *index,
                timestamp: *timestamp,
                source: source.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Consume the replayer, keeping the latest document state.
    pub fn into_state(self) -> DocumentState {
        self.current
    }

    /// Diff the open chunk and start a new one at the current state.
    fn seal(&mut self) -> Option<Chunk> {
        let baseline = std::mem::replace(&mut self.baseline, self.current.clone());
        self.close(baseline)
    }

    /// Diff `baseline` against the current state, dropping it if unchanged.
    fn close(&mut self, baseline: DocumentState) -> Option<Chunk> {
        let diff = diff_lines(&baseline.text, &self.current.text);
        if is_unchanged(&diff) {
            trace!(version = self.current.version, "window without net change dropped");
            return None;
        }

        let stats = DiffStats::of(&diff);
        debug!(
            chunk = self.sealed,
            from = baseline.version,
            to = self.current.version,
            added = stats.added_lines,
            removed = stats.removed_lines,
            "chunk sealed"
        );
        self.sealed += 1;

        Some(Chunk {
            baseline,
            end: self.current.clone(),
            diff,
        })
    }
}

/// Replay a whole log, collecting every chunk and the final state.
pub fn replay(log: &[Operation], policy: ChunkPolicy) -> Result<Replay> {
    let mut replayer = Replayer::new(policy);
    let mut chunks = Vec::new();

    for op in log {
        if let Some(chunk) = replayer.push(op)? {
            chunks.push(chunk);
        }
    }
    if let Some(chunk) = replayer.finish()? {
        chunks.push(chunk);
    }

    Ok(Replay {
        chunks,
        operations: replayer.operations_applied(),
        final_state: replayer.into_state(),
    })
}

/// Split a log into time-gap chunks, each with its line diff.
pub fn compute_chunked_diffs(log: &[Operation], threshold_ms: i64) -> Result<Vec<Chunk>> {
    replay(log, ChunkPolicy::new(threshold_ms)).map(|replay| replay.chunks)
}

/// Document state as of `cutoff_ms`.
///
/// Replays the log prefix whose timestamps are at or before the cutoff and
/// stops at the first operation past it.
pub fn state_at(log: &[Operation], cutoff_ms: i64) -> Result<DocumentState> {
    if log.is_empty() {
        return Err(HistoryError::EmptyLog);
    }

    let mut state = DocumentState::empty();
    for (index, op) in log.iter().enumerate() {
        if op.timestamp() > cutoff_ms {
            break;
        }
        state = apply_operation(&state, op).map_err(|source| HistoryError::Apply {
            index,
            timestamp: op.timestamp(),
            source,
        })?;
    }
    Ok(state)
}
