//! Replaying operation logs into time-gap chunks.
//!
//! A log is folded one operation at a time. Whenever two consecutive
//! operations are further apart than the configured threshold, the open
//! chunk is closed and diffed against its baseline, and the current state
//! becomes the next baseline. Whatever is left after the last operation is
//! closed as a trailing chunk. Chunks with no net change are skipped.
//!
//! # Example
//!
//! ```ignore
//! let log = Operation::from_json_lines(&raw_log)?;
//! let chunks = compute_chunked_diffs(&log, DEFAULT_THRESHOLD_MS)?;
//! let merged = merge_chunks(&chunks)?;
//! ```

mod engine;
mod policy;
mod pool;

pub use engine::{compute_chunked_diffs, replay, state_at, Replay, Replayer};
pub use policy::{should_close_chunk, ChunkPolicy, DEFAULT_THRESHOLD_MS};
pub use pool::replay_documents;

use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

/// Replay configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Gap between consecutive operations that closes a chunk.
    pub threshold_ms: i64,

    /// Worker threads for multi-document replay.
    pub workers: usize,
}

impl ReplayConfig {
    pub fn policy(&self) -> ChunkPolicy {
        ChunkPolicy::new(self.threshold_ms)
    }
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            threshold_ms: DEFAULT_THRESHOLD_MS,
            workers: std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ReplayConfig::default();
        assert_eq!(config.threshold_ms, DEFAULT_THRESHOLD_MS);
        assert!(config.workers >= 1);
    }

    #[test]
    fn test_config_partial_json() {
        let config: ReplayConfig = serde_json::from_str(r#"{ "threshold_ms": 2000 }"#).unwrap();
        assert_eq!(config.threshold_ms, 2_000);
        assert_eq!(config.workers, ReplayConfig::default().workers);
        assert_eq!(config.policy(), ChunkPolicy::new(2_000));
    }
}
