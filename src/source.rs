//! Read-side interface to the storage that holds operation logs.
//!
//! The engine never talks to a database itself. Storage layers implement
//! [`OperationSource`] (and optionally [`SnapshotSource`]) and hand over
//! fully materialized logs.

use crate::error::{HistoryError, Result};
use crate::types::{DocumentId, Operation};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Ordered operation logs, by document.
pub trait OperationSource {
    /// The full log for a document, in log order.
    fn operations(&self, doc: &DocumentId) -> Result<Vec<Operation>>;
}

/// Raw stored snapshots, by document and time.
pub trait SnapshotSource {
    /// The latest stored snapshot at or before `ts`, if any.
    fn snapshot_at(&self, doc: &DocumentId, ts: i64) -> Result<Option<String>>;
}

impl<S: OperationSource + ?Sized> OperationSource for &S {
    fn operations(&self, doc: &DocumentId) -> Result<Vec<Operation>> {
        (**self).operations(doc)
    }
}

/// In-memory logs and snapshots.
#[derive(Default)]
pub struct MemoryLog {
    logs: RwLock<HashMap<DocumentId, Vec<Operation>>>,
    /// Per document, sorted by timestamp.
    snapshots: RwLock<HashMap<DocumentId, Vec<(i64, String)>>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an operation to a document's log.
    pub fn append(&self, doc: &DocumentId, op: Operation) {
        self.logs.write().entry(doc.clone()).or_default().push(op);
    }

    /// Replace a document's whole log.
    pub fn insert_log(&self, doc: DocumentId, log: Vec<Operation>) {
        self.logs.write().insert(doc, log);
    }

    /// Record a raw snapshot taken at `ts`.
    pub fn insert_snapshot(&self, doc: &DocumentId, ts: i64, text: impl Into<String>) {
        let mut snapshots = self.snapshots.write();
        let list = snapshots.entry(doc.clone()).or_default();
        let at = list.partition_point(|(t, _)| *t <= ts);
        list.insert(at, (ts, text.into()));
    }

    /// Documents that have a log, sorted.
    pub fn documents(&self) -> Vec<DocumentId> {
        let mut ids: Vec<DocumentId> = self.logs.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self, doc: &DocumentId) -> usize {
        self.logs.read().get(doc).map_or(0, Vec::len)
    }

    pub fn is_empty(&self, doc: &DocumentId) -> bool {
        self.len(doc) == 0
    }
}

impl OperationSource for MemoryLog {
    fn operations(&self, doc: &DocumentId) -> Result<Vec<Operation>> {
        self.logs
            .read()
            .get(doc)
            .cloned()
            .ok_or_else(|| HistoryError::DocumentNotFound(doc.clone()))
    }
}

impl SnapshotSource for MemoryLog {
    fn snapshot_at(&self, doc: &DocumentId, ts: i64) -> Result<Option<String>> {
        let snapshots = self.snapshots.read();
        let Some(list) = snapshots.get(doc) else {
            return Ok(None);
        };
        let at = list.partition_point(|(t, _)| *t <= ts);
        Ok(at.checked_sub(1).map(|i| list[i].1.clone()))
    }
}
