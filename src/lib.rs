//! # Edit Replay
//!
//! Reconstructs the edit history of collaboratively edited documents from
//! their OT operation logs.
//!
//! ## Core Concepts
//!
//! - **Operations**: ShareDB-style json0 records applied to a versioned text
//! - **Chunks**: Spans of the timeline separated by idle gaps, each with a line diff
//! - **Merged diffs**: Chunk diffs folded into one diff against the first baseline
//! - **History**: Replay queries over any [`OperationSource`]
//!
//! ## Example
//!
//! ```ignore
//! use edit_replay::{compute_chunked_diffs, merge_chunks, Operation};
//!
//! let log = vec![
//!     Operation::create(0, "fn main() {\n}\n"),
//!     Operation::insert(1_000, 12, "    run();\n"),
//!     Operation::insert(900_000, 25, "// done\n"),
//! ];
//!
//! let chunks = compute_chunked_diffs(&log, 100_000)?;
//! let merged = merge_chunks(&chunks)?;
//! ```

pub mod diff;
pub mod error;
pub mod history;
pub mod replay;
pub mod source;
pub mod state;
pub mod types;

// Re-exports
pub use diff::{
    diff_lines, is_unchanged, merge_chunk_diffs, merge_chunks, new_text, old_text, DiffStats,
};
pub use error::{ApplyError, ApplyErrorKind, HistoryError, MergeAlignmentError, Result};
pub use history::History;
pub use replay::{
    compute_chunked_diffs, replay, replay_documents, should_close_chunk, state_at, ChunkPolicy,
    Replay, ReplayConfig, Replayer, DEFAULT_THRESHOLD_MS,
};
pub use source::{MemoryLog, OperationSource, SnapshotSource};
pub use state::{apply_operation, Payload, TextEdit};
pub use types::*;
