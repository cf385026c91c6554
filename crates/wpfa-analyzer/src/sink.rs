//! Diagnostic sink.
//!
//! Thread-safe accumulator for rule output, sharded by source unit so rules running
//! on different files never contend. The host drains one source unit at a time or
//! everything at once.

use dashmap::DashMap;
use tracing::trace;
use wpfa_common::{Diagnostic, FileId};

/// Accumulated diagnostics, keyed by source unit.
///
/// Within a source unit diagnostics keep insertion order.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    by_file: DashMap<FileId, Vec<Diagnostic>>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self {
            by_file: DashMap::new(),
        }
    }

    pub fn push(&self, diagnostic: Diagnostic) {
        trace!(code = diagnostic.code, file = diagnostic.file().0, "DiagnosticSink::push");
        self.by_file
            .entry(diagnostic.file())
            .or_default()
            .push(diagnostic);
    }

    /// Append a batch produced for one source unit.
    pub fn extend(&self, file: FileId, diagnostics: Vec<Diagnostic>) {
        if diagnostics.is_empty() {
            return;
        }
        self.by_file.entry(file).or_default().extend(diagnostics);
    }

    /// Remove and return everything reported for `file`.
    pub fn drain_file(&self, file: FileId) -> Vec<Diagnostic> {
        self.by_file
            .remove(&file)
            .map(|(_, diagnostics)| diagnostics)
            .unwrap_or_default()
    }

    /// Remove and return everything, ordered by source unit.
    pub fn drain(&self) -> Vec<Diagnostic> {
        let mut files: Vec<FileId> = self.by_file.iter().map(|entry| *entry.key()).collect();
        files.sort_unstable();
        files
            .into_iter()
            .flat_map(|file| self.drain_file(file))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.by_file.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
