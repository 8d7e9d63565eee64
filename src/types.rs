//! Core types for edit-history replay.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;

/// Identifier of a document whose operation log is replayed.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(pub String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        DocumentId(id.into())
    }
}

impl fmt::Debug for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocumentId({})", self.0)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        DocumentId(s.to_string())
    }
}

/// Metadata attached to every logged operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationMeta {
    /// Milliseconds since Unix epoch, as recorded by the OT server.
    pub ts: i64,
}

/// One record of an OT operation log.
///
/// The edit itself is kept as an opaque JSON object and only interpreted
/// by [`apply_operation`](crate::apply_operation). Records are immutable
/// once read; the position in the log, not the timestamp, orders them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Version the operation expects to be applied to.
    #[serde(rename = "v", default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,

    #[serde(rename = "m")]
    pub meta: OperationMeta,

    /// Everything else in the record (`create`, `op`, `del`, ...).
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Operation {
    /// Create an operation from a raw payload object.
    pub fn new(ts: i64, payload: Map<String, Value>) -> Self {
        Self {
            version: None,
            meta: OperationMeta { ts },
            payload,
        }
    }

    /// Document creation with starter text.
    pub fn create(ts: i64, text: &str) -> Self {
        Self::from_payload(
            ts,
            json!({ "create": { "type": "json0", "data": { "text": text } } }),
        )
    }

    /// Insert `text` at `offset` (counted in chars).
    pub fn insert(ts: i64, offset: usize, text: &str) -> Self {
        Self::from_payload(ts, json!({ "op": [{ "p": ["text", offset], "si": text }] }))
    }

    /// Delete `text`, which must currently sit at `offset`.
    pub fn delete(ts: i64, offset: usize, text: &str) -> Self {
        Self::from_payload(ts, json!({ "op": [{ "p": ["text", offset], "sd": text }] }))
    }

    /// Document deletion.
    pub fn delete_document(ts: i64) -> Self {
        Self::from_payload(ts, json!({ "del": true }))
    }

    /// Pin the version this operation must be applied to.
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = Some(version);
        self
    }

    /// Whether the payload creates the document.
    pub fn is_create(&self) -> bool {
        self.payload.contains_key("create")
    }

    /// Timestamp used for chunk decisions.
    pub fn timestamp(&self) -> i64 {
        self.meta.ts
    }

    /// Parse a single raw log record.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Parse a newline-delimited log, skipping blank lines.
    pub fn from_json_lines(raw: &str) -> Result<Vec<Self>, serde_json::Error> {
        raw.lines()
            .filter(|line| !line.trim().is_empty())
            .map(serde_json::from_str)
            .collect()
    }

    fn from_payload(ts: i64, payload: Value) -> Self {
        match payload {
            Value::Object(map) => Self::new(ts, map),
            _ => Self::new(ts, Map::new()),
        }
    }
}

/// A versioned document text produced by replaying operations.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentState {
    /// Number of operations applied so far.
    pub version: u64,
    pub text: String,
}

impl DocumentState {
    /// The state before any operation has been applied.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// How a diff span relates the baseline to the end text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    Unchanged,
    Added,
    Removed,
}

/// One contiguous span of a diff.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffPart {
    pub value: String,
    pub kind: DiffKind,
}

impl DiffPart {
    pub fn new(value: impl Into<String>, kind: DiffKind) -> Self {
        Self {
            value: value.into(),
            kind,
        }
    }

    pub fn unchanged(value: impl Into<String>) -> Self {
        Self::new(value, DiffKind::Unchanged)
    }

    pub fn added(value: impl Into<String>) -> Self {
        Self::new(value, DiffKind::Added)
    }

    pub fn removed(value: impl Into<String>) -> Self {
        Self::new(value, DiffKind::Removed)
    }

    pub fn is_added(&self) -> bool {
        self.kind == DiffKind::Added
    }

    pub fn is_removed(&self) -> bool {
        self.kind == DiffKind::Removed
    }

    /// Whether the span is Added or Removed.
    pub fn is_change(&self) -> bool {
        self.kind != DiffKind::Unchanged
    }
}

/// A contiguous span of the edit timeline and its diff.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Document state when the chunk opened.
    pub baseline: DocumentState,

    /// Document state when the chunk closed.
    pub end: DocumentState,

    /// Line diff from `baseline.text` to `end.text` (both trimmed).
    pub diff: Vec<DiffPart>,
}

/// Text that one chunk added and a later chunk removed again.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransientEdit {
    pub value: String,
    /// Index of the chunk diff that added the text.
    pub added_in: usize,
    /// Index of the chunk diff that removed it.
    pub removed_in: usize,
}

/// Several chunk diffs folded into one diff against the first baseline.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedDiff {
    pub parts: Vec<DiffPart>,

    /// Edits that belong to neither the first baseline nor the final text.
    #[serde(default)]
    pub transient: Vec<TransientEdit>,
}
