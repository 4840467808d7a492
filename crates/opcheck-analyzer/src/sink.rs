//! Concurrent collection of committed diagnostics.

use dashmap::DashMap;
use opcheck_common::Diagnostic;
use opcheck_ir::BodyId;

/// Position of a method body within a run: unit index, then body index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyKey {
    pub unit: u32,
    pub body: BodyId,
}

impl BodyKey {
    pub const fn new(unit: u32, body: BodyId) -> Self {
        BodyKey { unit, body }
    }
}

/// Receives the diagnostics of each completed body.
///
/// Workers buffer a body's diagnostics locally and commit them in one call
/// once the body finishes, so an abandoned body contributes nothing.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    bodies: DashMap<BodyKey, Vec<Diagnostic>>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        DiagnosticSink::default()
    }

    pub fn commit(&self, key: BodyKey, diagnostics: Vec<Diagnostic>) {
        if diagnostics.is_empty() {
            return;
        }
        self.bodies.entry(key).or_default().extend(diagnostics);
    }

    /// Number of committed diagnostics.
    pub fn len(&self) -> usize {
        self.bodies.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drain into a flat list ordered by unit, then body, then emission.
    pub fn into_sorted(self) -> Vec<Diagnostic> {
        let mut bodies: Vec<(BodyKey, Vec<Diagnostic>)> = self.bodies.into_iter().collect();
        bodies.sort_unstable_by_key(|(key, _)| *key);
        bodies
            .into_iter()
            .flat_map(|(_, diagnostics)| diagnostics)
            .collect()
    }
}

#[cfg(test)]
#[path = "../tests/sink_tests.rs"]
mod tests;
