//! Stage Trait: contract shared by every unit of pipeline work
use crate::state::{RunState, StateDelta};

/// A named unit of work in a workflow graph.
///
/// A stage reads a snapshot of the run state and returns only the fields
/// it changed. Two rules implementations must honour:
///
/// - never mutate upstream data; the snapshot is read-only and the runner
///   alone folds deltas into the state;
/// - never fail. Collaborator outages and missing upstream fields are
///   absorbed inside the stage with a documented fallback value, so a
///   degraded partial update comes back instead of an error.
pub trait Stage: Send + Sync {
    /// Stage name, unique within a graph (ex: "compliance").
    fn name(&self) -> &'static str;

    /// Produce a sparse update from the current state.
    fn run(&self, state: &RunState) -> StateDelta;
}
