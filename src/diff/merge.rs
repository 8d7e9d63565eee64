//! Folding an ordered run of chunk diffs into one diff.
//!
//! Diff `i` edits `baseline[i]` into `baseline[i + 1]`. The merged sequence
//! is kept as segments of `baseline[0]` text plus every insertion seen so
//! far. At any step, the visible segments (Unchanged and Added) spell out
//! the current baseline, and Removed segments take up no room in it. Each
//! new diff is spliced in by walking its parts with a cursor over the
//! visible text. That cursor is what translates a position in `baseline[i]`
//! into a position in the merged sequence: removed text on the left is
//! skipped, and segments get split wherever an edit lands inside them.

use std::collections::VecDeque;

use tracing::{debug, trace};

use super::lines::{old_text, push_coalesced};
use crate::error::MergeAlignmentError;
use crate::types::{Chunk, DiffKind, DiffPart, MergedDiff, TransientEdit};

#[derive(Clone, Debug)]
struct Segment {
    value: String,
    kind: DiffKind,
    /// Chunk that introduced the text, for Added segments.
    origin: usize,
}

/// Walks the merged segments while one chunk diff is spliced in.
struct Splice<'a> {
    pending: VecDeque<Segment>,
    out: Vec<Segment>,
    transient: &'a mut Vec<TransientEdit>,
    chunk: usize,
    /// Byte offset into `baseline[chunk]`.
    offset: usize,
}

impl<'a> Splice<'a> {
    fn new(merged: Vec<Segment>, chunk: usize, transient: &'a mut Vec<TransientEdit>) -> Self {
        let capacity = merged.len() + 4;
        Self {
            pending: merged.into(),
            out: Vec::with_capacity(capacity),
            transient,
            chunk,
            offset: 0,
        }
    }

    fn misaligned(&self, reason: impl Into<String>) -> MergeAlignmentError {
        MergeAlignmentError::new(self.chunk, self.offset, reason)
    }

    /// Move removed text sitting at the cursor into the output.
    fn pass_removed(&mut self) {
        while let Some(seg) = self.pending.front() {
            if seg.kind != DiffKind::Removed {
                break;
            }
            if let Some(seg) = self.pending.pop_front() {
                self.out.push(seg);
            }
        }
    }

    fn insert(&mut self, value: &str) {
        if value.is_empty() {
            return;
        }
        self.pass_removed();
        self.out.push(Segment {
            value: value.to_string(),
            kind: DiffKind::Added,
            origin: self.chunk,
        });
    }

    /// Consume `expected` from the visible text at the cursor.
    fn consume(&mut self, expected: &str, removing: bool) -> Result<(), MergeAlignmentError> {
        let mut rest = expected;
        while !rest.is_empty() {
            self.pass_removed();
            let mut seg = self
                .pending
                .pop_front()
                .ok_or_else(|| self.misaligned("diff runs past the end of its baseline"))?;

            let n = rest.len().min(seg.value.len());
            if !seg.value.is_char_boundary(n)
                || seg.value.as_bytes()[..n] != rest.as_bytes()[..n]
            {
                return Err(self.misaligned(format!(
                    "expected {:?} but baseline has {:?}",
                    rest, seg.value
                )));
            }

            if n < seg.value.len() {
                let tail = seg.value.split_off(n);
                self.pending.push_front(Segment {
                    value: tail,
                    kind: seg.kind,
                    origin: seg.origin,
                });
            }

            rest = rest
                .get(n..)
                .ok_or_else(|| self.misaligned("span splits a character"))?;
            self.offset += n;

            if !removing {
                self.out.push(seg);
            } else if seg.kind == DiffKind::Added {
                trace!(added_in = seg.origin, removed_in = self.chunk, "transient edit");
                self.transient.push(TransientEdit {
                    value: seg.value,
                    added_in: seg.origin,
                    removed_in: self.chunk,
                });
            } else {
                self.out.push(Segment {
                    value: seg.value,
                    kind: DiffKind::Removed,
                    origin: seg.origin,
                });
            }
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<Segment>, MergeAlignmentError> {
        self.pass_removed();
        if let Some(seg) = self.pending.front() {
            return Err(self.misaligned(format!(
                "diff ends before its baseline does; {:?} left over",
                seg.value
            )));
        }
        Ok(self.out)
    }
}

fn splice(
    merged: Vec<Segment>,
    diff: &[DiffPart],
    chunk: usize,
    transient: &mut Vec<TransientEdit>,
) -> Result<Vec<Segment>, MergeAlignmentError> {
    let mut splice = Splice::new(merged, chunk, transient);
    for part in diff {
        match part.kind {
            DiffKind::Added => splice.insert(&part.value),
            DiffKind::Unchanged => splice.consume(&part.value, false)?,
            DiffKind::Removed => splice.consume(&part.value, true)?,
        }
    }
    splice.finish()
}

/// Merge ordered chunk diffs into a single diff against the first baseline.
///
/// Every Added span of every diff shows up as Added and every Removed span
/// as Removed, except for text added by one chunk and removed by a later
/// one: that text is in neither the first baseline nor the final text, so
/// it is reported in [`MergedDiff::transient`] instead.
pub fn merge_chunk_diffs(diffs: &[Vec<DiffPart>]) -> Result<MergedDiff, MergeAlignmentError> {
    merge_parts(diffs.iter().map(Vec::as_slice))
}

/// Merge the diffs of replayed chunks, in order.
pub fn merge_chunks(chunks: &[Chunk]) -> Result<MergedDiff, MergeAlignmentError> {
    merge_parts(chunks.iter().map(|chunk| chunk.diff.as_slice()))
}

fn merge_parts<'a>(
    diffs: impl IntoIterator<Item = &'a [DiffPart]>,
) -> Result<MergedDiff, MergeAlignmentError> {
    let mut diffs = diffs.into_iter().enumerate().peekable();
    let Some((_, first)) = diffs.peek() else {
        return Ok(MergedDiff::default());
    };

    let baseline = old_text(first);
    let mut merged = Vec::new();
    if !baseline.is_empty() {
        merged.push(Segment {
            value: baseline,
            kind: DiffKind::Unchanged,
            origin: 0,
        });
    }
    let mut transient = Vec::new();

    for (chunk, diff) in diffs {
        merged = splice(merged, diff, chunk, &mut transient)?;
        debug!(chunk, segments = merged.len(), "chunk diff spliced");
    }

    let mut parts = Vec::with_capacity(merged.len());
    for seg in &merged {
        push_coalesced(&mut parts, &seg.value, seg.kind);
    }
    if parts.is_empty() {
        parts.push(DiffPart::unchanged(""));
    }

    Ok(MergedDiff { parts, transient })
}
