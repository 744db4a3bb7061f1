//! In-memory audit sink for tests and development.

use std::sync::Mutex;

use supplyline_core::{AuditEntry, AuditSink};

/// Append-only in-memory audit trail.
#[derive(Debug, Default)]
pub struct InMemoryAuditSink {
    inner: Mutex<Vec<AuditEntry>>,
}

impl InMemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<AuditEntry> {
        self.inner.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&self, entry: AuditEntry) {
        self.inner.lock().unwrap().push(entry);
    }
}
