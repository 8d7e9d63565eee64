//! Whole-document line diff.
//!
//! Uses the `similar` crate's LCS algorithm so that equal inputs always
//! produce the same parts.

use crate::types::{DiffKind, DiffPart};
use similar::{Algorithm, ChangeTag, TextDiff};

/// Compute a line diff between two document texts.
///
/// Both texts are trimmed at the document level first. Each part's value
/// holds one or more whole lines; consecutive lines with the same tag are
/// grouped into one part.
pub fn diff_lines(baseline: &str, end: &str) -> Vec<DiffPart> {
    let old = baseline.trim();
    let new = end.trim();

    if old == new {
        return vec![DiffPart::unchanged(old)];
    }

    let text_diff = TextDiff::configure()
        .algorithm(Algorithm::Lcs)
        .diff_lines(old, new);

    let mut parts: Vec<DiffPart> = Vec::new();
    for change in text_diff.iter_all_changes() {
        let kind = match change.tag() {
            ChangeTag::Equal => DiffKind::Unchanged,
            ChangeTag::Insert => DiffKind::Added,
            ChangeTag::Delete => DiffKind::Removed,
        };
        push_coalesced(&mut parts, change.value(), kind);
    }
    parts
}

/// Append a span, extending the last part when the kind matches.
pub(crate) fn push_coalesced(parts: &mut Vec<DiffPart>, value: &str, kind: DiffKind) {
    if value.is_empty() {
        return;
    }
    match parts.last_mut() {
        Some(last) if last.kind == kind => last.value.push_str(value),
        _ => parts.push(DiffPart::new(value, kind)),
    }
}

/// Whether a diff records no change at all.
pub fn is_unchanged(parts: &[DiffPart]) -> bool {
    parts.iter().all(|part| !part.is_change())
}

/// The "before" side of a diff: Unchanged and Removed parts in order.
pub fn old_text(parts: &[DiffPart]) -> String {
    parts
        .iter()
        .filter(|part| !part.is_added())
        .map(|part| part.value.as_str())
        .collect()
}

/// The "after" side of a diff: Unchanged and Added parts in order.
pub fn new_text(parts: &[DiffPart]) -> String {
    parts
        .iter()
        .filter(|part| !part.is_removed())
        .map(|part| part.value.as_str())
        .collect()
}

/// Line counts for a diff.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub added_lines: usize,
    pub removed_lines: usize,
    pub unchanged_lines: usize,
}

impl DiffStats {
    pub fn of(parts: &[DiffPart]) -> Self {
        let mut stats = DiffStats::default();
        for part in parts {
            let lines = part.value.lines().count();
            match part.kind {
                DiffKind::Added => stats.added_lines += lines,
                DiffKind::Removed => stats.removed_lines += lines,
                DiffKind::Unchanged => stats.unchanged_lines += lines,
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_texts_single_unchanged_part() {
        let diff = diff_lines("one\ntwo\n", "one\ntwo\n");
        assert_eq!(diff, vec![DiffPart::unchanged("one\ntwo")]);
        assert!(is_unchanged(&diff));
    }

    #[test]
    fn test_empty_texts_single_unchanged_part() {
        assert_eq!(diff_lines("", ""), vec![DiffPart::unchanged("")]);
        assert_eq!(diff_lines("  \n", "\n"), vec![DiffPart::unchanged("")]);
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        let diff = diff_lines("\n\nbody\n", "body\n\n\n  ");
        assert!(is_unchanged(&diff));
    }

    #[test]
    fn test_insertion_into_empty_document() {
        assert_eq!(diff_lines("", "ab"), vec![DiffPart::added("ab")]);
    }

    #[test]
    fn test_appended_line() {
        let diff = diff_lines("line1\nline2", "line1\nline2\nline3");
        assert_eq!(old_text(&diff), "line1\nline2");
        assert_eq!(new_text(&diff), "line1\nline2\nline3");
        assert_eq!(diff[0], DiffPart::unchanged("line1\n"));

        let stats = DiffStats::of(&diff);
        assert_eq!(stats.unchanged_lines, 1);
        assert!(stats.added_lines >= 1);
    }

    #[test]
    fn test_replaced_middle_line() {
        let diff = diff_lines("a\nb\nc", "a\nx\nc");
        assert_eq!(
            diff,
            vec![
                DiffPart::unchanged("a\n"),
                DiffPart::removed("b\n"),
                DiffPart::added("x\n"),
                DiffPart::unchanged("c"),
            ]
        );
    }

    #[test]
    fn test_repeated_runs_are_deterministic() {
        let old = "x\ny\nx\ny\nx";
        let new = "y\nx\ny\nx\ny";
        let first = diff_lines(old, new);
        for _ in 0..10 {
            assert_eq!(diff_lines(old, new), first);
        }
        assert_eq!(old_text(&first), old);
        assert_eq!(new_text(&first), new);
    }

    #[test]
    fn test_ties_extend_earliest_unchanged_run() {
        let diff = diff_lines("x\ny", "x\ny\nx\ny");
        assert_eq!(diff[0], DiffPart::unchanged("x\n"));
        assert_eq!(old_text(&diff), "x\ny");
        assert_eq!(new_text(&diff), "x\ny\nx\ny");
    }

    #[test]
    fn test_push_coalesced_merges_same_kind() {
        let mut parts = Vec::new();
        push_coalesced(&mut parts, "a\n", DiffKind::Added);
        push_coalesced(&mut parts, "b\n", DiffKind::Added);
        push_coalesced(&mut parts, "", DiffKind::Removed);
        push_coalesced(&mut parts, "c", DiffKind::Removed);
        assert_eq!(parts, vec![DiffPart::added("a\nb\n"), DiffPart::removed("c")]);
    }
}
