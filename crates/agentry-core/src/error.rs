//! Unified Error Model
use thiserror::Error;

/// Construction-time failures. All of these are programming errors in the
/// graph wiring and are reported before any run starts.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("stage `{0}` is registered twice")]
    DuplicateStage(String),

    #[error("`{0}` is a reserved name and cannot be used for a stage")]
    ReservedName(String),

    #[error("edge declared from unknown stage `{0}`")]
    UnknownSource(String),

    #[error("edge from `{from}` points at unknown stage `{to}`")]
    UnknownTarget { from: String, to: String },

    #[error("stage `{0}` has no outgoing edge")]
    MissingEdge(String),

    #[error("stage `{0}` has more than one outgoing edge")]
    DuplicateEdge(String),

    #[error("no start stage declared")]
    NoStart,

    #[error("start stage `{0}` is not registered")]
    UnknownStart(String),

    #[error("conditional edge on `{0}` declares no candidates")]
    EmptyCandidates(String),

    #[error("no path from stage `{0}` to the end marker")]
    DeadEnd(String),

    #[error("every candidate after `{0}` loops back to it")]
    NoEscape(String),

    #[error("step budget {budget} cannot cover the shortest run of {required} stages")]
    BudgetTooSmall { budget: u32, required: u32 },
}

/// Abort-class failures surfaced while a run is in flight.
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("GRAPH/{0}")]
    Graph(#[from] GraphError),

    #[error("ROUTER/stage `{stage}` chose `{returned}`, which is not a declared candidate")]
    RouterContract { stage: String, returned: String },

    #[error("BUDGET/run stopped after {steps} of {budget} allowed steps")]
    BudgetExhausted { steps: u32, budget: u32 },
}
