//! Line diffs between document states, and merging of chunk diffs.

mod lines;
mod merge;

pub use lines::{diff_lines, is_unchanged, new_text, old_text, DiffStats};
pub use merge::{merge_chunk_diffs, merge_chunks};
