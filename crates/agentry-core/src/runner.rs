//! Workflow Runner: drives one run through the graph
//!
//! The runner owns the state for the duration of the run: invoke the
//! current stage, fold its delta in, pick the successor from the graph,
//! repeat until the end marker. Termination is guaranteed by a step
//! budget: a router's choice is honoured only while the shortest exit
//! from that choice still fits in the budget, otherwise the precomputed
//! escape candidate is taken instead and the run is flagged as forced.
use crate::error::{GraphError, WorkflowError};
use crate::graph::{Edge, Graph, END};
use crate::state::RunState;
use serde::Serialize;
use std::time::Instant;
use uuid::Uuid;

/// What to do when a router's choice no longer fits in the step budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BudgetPolicy {
    /// Substitute the escape candidate and finish the run degraded.
    #[default]
    ForceFinish,
    /// Stop the run with [`WorkflowError::BudgetExhausted`].
    Abort,
}

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Hard ceiling on stage invocations per run.
    pub max_steps: u32,
    pub budget_policy: BudgetPolicy,
    /// Checked between stage invocations only; a stage in flight is never
    /// interrupted.
    pub deadline: Option<Instant>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_steps: 50,
            budget_policy: BudgetPolicy::ForceFinish,
            deadline: None,
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    /// The caller's deadline expired; the state holds whatever had been
    /// accumulated so far.
    DeadlineExpired,
}

/// Final state plus run accounting, returned to the caller.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub state: RunState,
    pub steps: u32,
    /// True when the step budget overrode at least one router decision.
    pub forced_finish: bool,
    pub status: RunStatus,
}

pub struct WorkflowRunner {
    graph: Graph,
    config: RunnerConfig,
}

impl WorkflowRunner {
    /// A budget smaller than the shortest possible run could never finish,
    /// so it is rejected here rather than discovered mid-run.
    pub fn new(graph: Graph, config: RunnerConfig) -> Result<Self, GraphError> {
        let required = graph.shortest_run();
        if config.max_steps < required {
            return Err(GraphError::BudgetTooSmall {
                budget: config.max_steps,
                required,
            });
        }
        Ok(Self { graph, config })
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Execute one run to the end marker.
    pub async fn run(&self, initial: RunState) -> Result<RunReport, WorkflowError> {
        let run_id = Uuid::new_v4().to_string();
        let mut state = initial;
        let mut steps: u32 = 0;
        let mut forced_finish = false;
        let mut current = self.graph.start().to_string();

        loop {
            if let Some(deadline) = self.config.deadline {
                if Instant::now() >= deadline {
                    tracing::warn!(%run_id, steps, stage = %current, "deadline expired between stages");
                    return Ok(RunReport {
                        run_id,
                        state,
                        steps,
                        forced_finish,
                        status: RunStatus::DeadlineExpired,
                    });
                }
            }

            let node = self
                .graph
                .nodes
                .get(&current)
                .expect("stage names are validated at graph construction");

            let delta = node.stage.run(&state);
            steps += 1;
            state.apply(delta);
            tracing::debug!(%run_id, stage = %current, steps, "stage completed");

            let next = match &node.edge {
                Edge::Next(target) => target.clone(),
                Edge::Conditional { router, candidates } => {
                    let choice = router.route(&state);
                    if !candidates.contains(&choice) {
                        return Err(WorkflowError::RouterContract {
                            stage: current,
                            returned: choice,
                        });
                    }
                    if steps + self.graph.remaining(&choice) > self.config.max_steps {
                        match self.config.budget_policy {
                            BudgetPolicy::Abort => {
                                return Err(WorkflowError::BudgetExhausted {
                                    steps,
                                    budget: self.config.max_steps,
                                });
                            }
                            BudgetPolicy::ForceFinish => {
                                let escape = self.graph.escapes[&current].clone();
                                if escape != choice {
                                    tracing::warn!(
                                        %run_id,
                                        stage = %current,
                                        chose = %choice,
                                        taking = %escape,
                                        "step budget spent, overriding router"
                                    );
                                    forced_finish = true;
                                }
                                escape
                            }
                        }
                    } else {
                        choice
                    }
                }
            };

            if next == END {
                tracing::info!(%run_id, steps, forced_finish, "run complete");
                return Ok(RunReport {
                    run_id,
                    state,
                    steps,
                    forced_finish,
                    status: RunStatus::Completed,
                });
            }
            current = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Router;
    use crate::stage::Stage;
    use crate::state::StateDelta;
    use std::time::Duration;

    /// Stage that appends one message under its own name.
    struct Echo(&'static str);

    impl Stage for Echo {
        fn name(&self) -> &'static str {
            self.0
        }

        fn run(&self, _state: &RunState) -> StateDelta {
            StateDelta::new().with_message(self.0, "done")
        }
    }

    struct FixedRouter(&'static str);

    impl Router for FixedRouter {
        fn route(&self, _state: &RunState) -> String {
            self.0.to_string()
        }
    }

    fn looped_graph(route_to: &'static str) -> Graph {
        Graph::builder()
            .stage(Box::new(Echo("work")))
            .stage(Box::new(Echo("check")))
            .stage(Box::new(Echo("done")))
            .start("work")
            .edge("work", "check")
            .conditional("check", Box::new(FixedRouter(route_to)), &["work", "done"])
            .edge("done", END)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_chain_runs_to_completion() {
        let graph = Graph::builder()
            .stage(Box::new(Echo("a")))
            .stage(Box::new(Echo("b")))
            .start("a")
            .edge("a", "b")
            .edge("b", END)
            .build()
            .unwrap();
        let runner = WorkflowRunner::new(graph, RunnerConfig::default()).unwrap();

        let report = runner.run(RunState::new()).await.unwrap();
        assert_eq!(report.status, RunStatus::Completed);
        assert_eq!(report.steps, 2);
        assert!(!report.forced_finish);
        // One message per stage invocation.
        assert_eq!(report.state.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_permanent_loop_still_terminates_within_budget() {
        let runner = WorkflowRunner::new(
            looped_graph("work"),
            RunnerConfig {
                max_steps: 10,
                ..Default::default()
            },
        )
        .unwrap();

        let report = runner.run(RunState::new()).await.unwrap();
        assert_eq!(report.status, RunStatus::Completed);
        assert!(report.forced_finish);
        assert!(report.steps <= 10);
        // Last stage executed must be the escape target.
        assert_eq!(report.state.messages.last().unwrap().role, "done");
        assert_eq!(report.state.messages.len() as u32, report.steps);
    }

    #[tokio::test]
    async fn test_router_honoured_while_budget_allows() {
        let runner =
            WorkflowRunner::new(looped_graph("done"), RunnerConfig::default()).unwrap();

        let report = runner.run(RunState::new()).await.unwrap();
        assert_eq!(report.steps, 3);
        assert!(!report.forced_finish);
    }

    #[tokio::test]
    async fn test_router_outside_candidates_aborts() {
        let graph = Graph::builder()
            .stage(Box::new(Echo("work")))
            .stage(Box::new(Echo("done")))
            .start("work")
            .conditional("work", Box::new(FixedRouter("ghost")), &["work", "done"])
            .edge("done", END)
            .build()
            .unwrap();
        let runner = WorkflowRunner::new(graph, RunnerConfig::default()).unwrap();

        let err = runner.run(RunState::new()).await.unwrap_err();
        assert!(matches!(err, WorkflowError::RouterContract { returned, .. } if returned == "ghost"));
    }

    #[tokio::test]
    async fn test_abort_policy_surfaces_budget_error() {
        let runner = WorkflowRunner::new(
            looped_graph("work"),
            RunnerConfig {
                max_steps: 10,
                budget_policy: BudgetPolicy::Abort,
                ..Default::default()
            },
        )
        .unwrap();

        let err = runner.run(RunState::new()).await.unwrap_err();
        assert!(matches!(err, WorkflowError::BudgetExhausted { budget: 10, .. }));
    }

    #[tokio::test]
    async fn test_expired_deadline_returns_accumulated_state() {
        let runner = WorkflowRunner::new(
            looped_graph("done"),
            RunnerConfig {
                deadline: Some(Instant::now() - Duration::from_secs(1)),
                ..Default::default()
            },
        )
        .unwrap();

        let report = runner.run(RunState::seeded("hello")).await.unwrap();
        assert_eq!(report.status, RunStatus::DeadlineExpired);
        assert_eq!(report.steps, 0);
        assert_eq!(report.state.messages.len(), 1);
    }

    #[test]
    fn test_budget_below_shortest_run_rejected() {
        let err = WorkflowRunner::new(
            looped_graph("done"),
            RunnerConfig {
                max_steps: 2,
                ..Default::default()
            },
        )
        .err()
        .unwrap();
        assert!(matches!(err, GraphError::BudgetTooSmall { budget: 2, required: 3 }));
    }
}
