//! Audit trail: append-only log of stage transitions
//!
//! Stages that choose to record themselves push one entry per invocation.
//! Snapshots are truncated for readability; the blake3 digests are taken
//! over the untruncated text so entries stay verifiable.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Characters kept of each snapshot.
const SNAPSHOT_LIMIT: usize = 200;

/// One recorded stage transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub step: String,
    pub timestamp: DateTime<Utc>,
    pub input_snapshot: String,
    pub output_snapshot: String,
    pub input_hash: String,
    pub output_hash: String,
}

/// Shared collector handed to the stages of one run.
///
/// Constructed per run and passed in explicitly; sharing a sink between
/// concurrent runs would interleave their trails.
#[derive(Debug, Default)]
pub struct AuditSink {
    entries: Mutex<Vec<AuditRecord>>,
}

impl AuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry for `step` with truncated input/output snapshots.
    pub fn record(&self, step: &str, input: &str, output: &str) {
        let entry = AuditRecord {
            step: step.to_string(),
            timestamp: Utc::now(),
            input_snapshot: truncate(input),
            output_snapshot: truncate(output),
            input_hash: digest(input),
            output_hash: digest(output),
        };
        tracing::debug!(step, "audit entry recorded");
        self.lock().push(entry);
    }

    /// Snapshot of all entries in arrival order.
    pub fn entries(&self) -> Vec<AuditRecord> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<AuditRecord>> {
        // A poisoned lock only means a panic elsewhere mid-push; the log
        // itself is still usable.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= SNAPSHOT_LIMIT {
        return text.to_string();
    }
    let mut kept: String = text.chars().take(SNAPSHOT_LIMIT).collect();
    kept.push_str("...");
    kept
}

fn digest(text: &str) -> String {
    format!("blake3:{}", blake3::hash(text.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_keep_arrival_order() {
        let sink = AuditSink::new();
        sink.record("Intake", "request", "Initialized");
        sink.record("Planner", "request", "plan");
        sink.record("Compliance", "draft", "Score: 0.67");

        let steps: Vec<String> = sink.entries().into_iter().map(|e| e.step).collect();
        assert_eq!(steps, vec!["Intake", "Planner", "Compliance"]);
    }

    #[test]
    fn test_long_snapshots_are_truncated() {
        let sink = AuditSink::new();
        let long = "x".repeat(500);
        sink.record("Drafting", &long, "ok");

        let entry = &sink.entries()[0];
        assert_eq!(entry.input_snapshot.chars().count(), SNAPSHOT_LIMIT + 3);
        assert!(entry.input_snapshot.ends_with("..."));
        assert_eq!(entry.output_snapshot, "ok");
    }

    #[test]
    fn test_digest_covers_untruncated_text() {
        let sink = AuditSink::new();
        let long_a = format!("{}a", "x".repeat(300));
        let long_b = format!("{}b", "x".repeat(300));
        sink.record("Drafting", &long_a, "");
        sink.record("Drafting", &long_b, "");

        let entries = sink.entries();
        // Same truncated prefix, different digests.
        assert_eq!(entries[0].input_snapshot, entries[1].input_snapshot);
        assert_ne!(entries[0].input_hash, entries[1].input_hash);
        assert!(entries[0].input_hash.starts_with("blake3:"));
    }

    #[test]
    fn test_multibyte_truncation_keeps_char_boundary() {
        let sink = AuditSink::new();
        let long = "é".repeat(300);
        sink.record("Research", &long, "");

        let entry = &sink.entries()[0];
        assert!(entry.input_snapshot.ends_with("..."));
    }
}
