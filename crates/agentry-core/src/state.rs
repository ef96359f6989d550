//! Run State: the record threaded through one workflow execution
//!
//! The runner owns a single `RunState` per run. Stages receive a read-only
//! snapshot and hand back a sparse `StateDelta` carrying only the fields
//! they changed; `RunState::apply` folds the delta in with a fixed rule per
//! field, so stages never need to know the full prior state.
use crate::audit::AuditRecord;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One conversational entry. Every stage appends exactly one, so the
/// message log doubles as the authoritative execution trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    /// Entry attributed to the requesting user.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }
}

/// Accumulated state for one workflow execution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunState {
    /// Originating request payload. Set once; later writes are ignored.
    pub input: Option<Value>,

    /// Research/retrieval findings. Replaced wholesale on write.
    pub context: Option<Value>,

    /// Step outputs (plan, draft, analysis reports). Keys are overwritten
    /// individually and never deleted, so earlier outputs stay visible to
    /// later stages.
    pub intermediate: Map<String, Value>,

    /// Final deliverable payload.
    pub output: Option<Value>,

    /// Named scores. A later write to the same key replaces the prior
    /// value, never duplicates it.
    pub metrics: BTreeMap<String, f64>,

    /// Audit trail entries, appended in arrival order.
    pub history: Vec<AuditRecord>,

    /// Ordered message log, one entry per stage invocation plus any seeds.
    pub messages: Vec<Message>,

    /// Advisory successor hint. Informational only; the graph decides the
    /// actual control flow.
    pub next_node: Option<String>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State seeded with a single user message, the usual entry point for
    /// a prompt-driven run.
    pub fn seeded(prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(prompt)],
            ..Self::default()
        }
    }

    /// Fold a sparse delta into this state, field by field.
    pub fn apply(&mut self, delta: StateDelta) {
        if let Some(input) = delta.input {
            // First writer wins: the originating request is immutable once
            // intake has set it.
            if self.input.is_none() {
                self.input = Some(input);
            }
        }
        if let Some(context) = delta.context {
            self.context = Some(context);
        }
        for (key, value) in delta.intermediate {
            self.intermediate.insert(key, value);
        }
        if let Some(output) = delta.output {
            self.output = Some(output);
        }
        for (name, value) in delta.metrics {
            self.metrics.insert(name, value);
        }
        self.history.extend(delta.history);
        self.messages.extend(delta.messages);
        if let Some(next) = delta.next_node {
            self.next_node = Some(next);
        }
    }

    /// Named score, if any stage has written it.
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }

    /// String value stored under `intermediate[key]`, if present.
    pub fn intermediate_str(&self, key: &str) -> Option<&str> {
        self.intermediate.get(key).and_then(Value::as_str)
    }

    /// Content of the most recent message.
    pub fn last_message(&self) -> Option<&str> {
        self.messages.last().map(|m| m.content.as_str())
    }
}

/// Sparse update returned by a stage: only the fields it changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateDelta {
    pub input: Option<Value>,
    pub context: Option<Value>,
    #[serde(default)]
    pub intermediate: Map<String, Value>,
    pub output: Option<Value>,
    #[serde(default)]
    pub metrics: BTreeMap<String, f64>,
    #[serde(default)]
    pub history: Vec<AuditRecord>,
    #[serde(default)]
    pub messages: Vec<Message>,
    pub next_node: Option<String>,
}

impl StateDelta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(mut self, input: Value) -> Self {
        self.input = Some(input);
        self
    }

    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_intermediate(mut self, key: impl Into<String>, value: Value) -> Self {
        self.intermediate.insert(key.into(), value);
        self
    }

    pub fn with_output(mut self, output: Value) -> Self {
        self.output = Some(output);
        self
    }

    pub fn with_metric(mut self, name: impl Into<String>, value: f64) -> Self {
        self.metrics.insert(name.into(), value);
        self
    }

    pub fn with_history(mut self, entries: Vec<AuditRecord>) -> Self {
        self.history = entries;
        self
    }

    pub fn with_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(Message::new(role, content));
        self
    }

    pub fn with_next(mut self, next: impl Into<String>) -> Self {
        self.next_node = Some(next.into());
        self
    }
}
