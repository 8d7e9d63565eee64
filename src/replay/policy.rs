//! Time-gap chunk boundaries.

use serde::{Deserialize, Serialize};

/// Default gap between two operations that closes a chunk.
///
/// On typical course-sized logs, 2s gives ~90 chunks, 10s ~35, 100s ~6.
pub const DEFAULT_THRESHOLD_MS: i64 = 100_000;

/// Whether the gap between two consecutive operations closes a chunk.
pub fn should_close_chunk(
    last_op_timestamp: i64,
    current_op_timestamp: i64,
    threshold_ms: i64,
) -> bool {
    current_op_timestamp.saturating_sub(last_op_timestamp) > threshold_ms
}

/// Fixed-threshold chunk policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkPolicy {
    pub threshold_ms: i64,
}

impl ChunkPolicy {
    pub fn new(threshold_ms: i64) -> Self {
        Self { threshold_ms }
    }

    /// `last` is `None` before the first operation, which never closes a chunk.
    pub fn should_close(&self, last: Option<i64>, current: i64) -> bool {
        match last {
            Some(last) => should_close_chunk(last, current, self.threshold_ms),
            None => false,
        }
    }
}

impl Default for ChunkPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD_MS)
    }
}
