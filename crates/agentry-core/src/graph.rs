//! Graph Definition: named stages wired by static and conditional edges
//!
//! A graph is fixed at construction time: every stage has exactly one
//! outgoing edge, either a static successor or a router choosing from a
//! declared candidate set. `GraphBuilder::build` validates the topology
//! up front so a malformed graph fails before any run starts, and it
//! precomputes the data the runner needs to guarantee termination: the
//! shortest remaining path from every stage to the end marker, and for
//! every conditional edge the non-looping "escape" candidate.
use crate::error::GraphError;
use crate::stage::Stage;
use crate::state::RunState;
use std::collections::{HashMap, HashSet};

/// Reserved terminal marker. An edge to `END` finishes the run.
pub const END: &str = "end";

/// Decision function attached to a conditional edge. Receives the
/// just-merged state and must return one of the candidates declared when
/// the edge was added; anything else aborts the run as a programming
/// error.
pub trait Router: Send + Sync {
    fn route(&self, state: &RunState) -> String;
}

pub(crate) enum Edge {
    Next(String),
    Conditional {
        router: Box<dyn Router>,
        candidates: Vec<String>,
    },
}

impl Edge {
    fn successors(&self) -> Vec<&str> {
        match self {
            Edge::Next(target) => vec![target.as_str()],
            Edge::Conditional { candidates, .. } => {
                candidates.iter().map(String::as_str).collect()
            }
        }
    }
}

pub(crate) struct Node {
    pub stage: Box<dyn Stage>,
    pub edge: Edge,
}

/// Validated, immutable workflow topology.
pub struct Graph {
    pub(crate) start: String,
    pub(crate) nodes: HashMap<String, Node>,
    /// Shortest number of stage invocations from each stage through END,
    /// counting the stage itself.
    pub(crate) min_remaining: HashMap<String, u32>,
    /// Escape candidate per conditional stage: the declared candidate with
    /// the shortest exit that cannot loop back to its router.
    pub(crate) escapes: HashMap<String, String>,
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut stages: Vec<&str> = self.nodes.keys().map(String::as_str).collect();
        stages.sort_unstable();
        f.debug_struct("Graph")
            .field("start", &self.start)
            .field("stages", &stages)
            .finish()
    }
}

impl Graph {
    pub fn builder() -> GraphBuilder {
        GraphBuilder::new()
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Stage invocations a run needs when every router takes its shortest
    /// exit.
    pub fn shortest_run(&self) -> u32 {
        self.remaining(&self.start)
    }

    pub(crate) fn remaining(&self, name: &str) -> u32 {
        if name == END {
            return 0;
        }
        self.min_remaining.get(name).copied().unwrap_or(0)
    }
}

enum EdgeSpec {
    Next(String),
    Conditional {
        router: Box<dyn Router>,
        candidates: Vec<String>,
    },
}

/// Builder for [`Graph`]. Stages and edges are collected in any order;
/// all validation happens in [`GraphBuilder::build`].
#[derive(Default)]
pub struct GraphBuilder {
    stages: Vec<Box<dyn Stage>>,
    edges: Vec<(String, EdgeSpec)>,
    start: Option<String>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a stage under its own name.
    pub fn stage(mut self, stage: Box<dyn Stage>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Declare the entry stage.
    pub fn start(mut self, name: &str) -> Self {
        self.start = Some(name.to_string());
        self
    }

    /// Static edge: `from` always proceeds to `to` (or to [`END`]).
    pub fn edge(mut self, from: &str, to: &str) -> Self {
        self.edges
            .push((from.to_string(), EdgeSpec::Next(to.to_string())));
        self
    }

    /// Conditional edge: after `from`, `router` picks one of `candidates`.
    pub fn conditional(
        mut self,
        from: &str,
        router: Box<dyn Router>,
        candidates: &[&str],
    ) -> Self {
        self.edges.push((
            from.to_string(),
            EdgeSpec::Conditional {
                router,
                candidates: candidates.iter().map(|c| c.to_string()).collect(),
            },
        ));
        self
    }

    pub fn build(self) -> Result<Graph, GraphError> {
        let mut stages: HashMap<String, Box<dyn Stage>> = HashMap::new();
        for stage in self.stages {
            let name = stage.name().to_string();
            if name == END {
                return Err(GraphError::ReservedName(name));
            }
            if stages.contains_key(&name) {
                return Err(GraphError::DuplicateStage(name));
            }
            stages.insert(name, stage);
        }

        let mut edges: HashMap<String, Edge> = HashMap::new();
        for (from, spec) in self.edges {
            if !stages.contains_key(&from) {
                return Err(GraphError::UnknownSource(from));
            }
            if edges.contains_key(&from) {
                return Err(GraphError::DuplicateEdge(from));
            }
            let edge = match spec {
                EdgeSpec::Next(to) => {
                    if to != END && !stages.contains_key(&to) {
                        return Err(GraphError::UnknownTarget { from, to });
                    }
                    Edge::Next(to)
                }
                EdgeSpec::Conditional { router, candidates } => {
                    if candidates.is_empty() {
                        return Err(GraphError::EmptyCandidates(from));
                    }
                    for candidate in &candidates {
                        if candidate != END && !stages.contains_key(candidate) {
                            return Err(GraphError::UnknownTarget {
                                from,
                                to: candidate.clone(),
                            });
                        }
                    }
                    Edge::Conditional { router, candidates }
                }
            };
            edges.insert(from, edge);
        }

        for name in stages.keys() {
            if !edges.contains_key(name) {
                return Err(GraphError::MissingEdge(name.clone()));
            }
        }

        let start = self.start.ok_or(GraphError::NoStart)?;
        if !stages.contains_key(&start) {
            return Err(GraphError::UnknownStart(start));
        }

        let min_remaining = shortest_paths(&edges)?;
        let escapes = escape_candidates(&edges, &min_remaining)?;

        let nodes = stages
            .into_iter()
            .map(|(name, stage)| {
                let edge = edges
                    .remove(&name)
                    .unwrap_or(Edge::Next(END.to_string()));
                (name, Node { stage, edge })
            })
            .collect::<HashMap<_, _>>();

        Ok(Graph {
            start,
            nodes,
            min_remaining,
            escapes,
        })
    }
}

/// Shortest invocation count from every stage through END, treating a
/// conditional edge as free to take any candidate. A stage END cannot be
/// reached from is a construction error.
fn shortest_paths(edges: &HashMap<String, Edge>) -> Result<HashMap<String, u32>, GraphError> {
    let mut dist: HashMap<String, u32> = HashMap::new();
    let mut changed = true;
    while changed {
        changed = false;
        for (name, edge) in edges {
            let best = edge
                .successors()
                .iter()
                .filter_map(|s| {
                    if *s == END {
                        Some(0)
                    } else {
                        dist.get(*s).copied()
                    }
                })
                .min();
            if let Some(best) = best {
                let through = best + 1;
                if dist.get(name).map_or(true, |&d| through < d) {
                    dist.insert(name.clone(), through);
                    changed = true;
                }
            }
        }
    }

    for name in edges.keys() {
        if !dist.contains_key(name) {
            return Err(GraphError::DeadEnd(name.clone()));
        }
    }
    Ok(dist)
}

/// For every conditional edge, the candidate with the shortest exit among
/// those that cannot reach the routing stage again. A conditional edge
/// whose candidates all loop back has no way out once the step budget is
/// spent, so it is rejected up front.
fn escape_candidates(
    edges: &HashMap<String, Edge>,
    dist: &HashMap<String, u32>,
) -> Result<HashMap<String, String>, GraphError> {
    let mut escapes = HashMap::new();
    for (name, edge) in edges {
        let Edge::Conditional { candidates, .. } = edge else {
            continue;
        };
        let mut escape: Option<(&String, u32)> = None;
        for candidate in candidates {
            if candidate != END && reaches(edges, candidate, name) {
                continue;
            }
            let exit = if candidate == END {
                0
            } else {
                dist.get(candidate).copied().unwrap_or(u32::MAX)
            };
            if escape.map_or(true, |(_, best)| exit < best) {
                escape = Some((candidate, exit));
            }
        }
        match escape {
            Some((candidate, _)) => {
                escapes.insert(name.clone(), candidate.clone());
            }
            None => return Err(GraphError::NoEscape(name.clone())),
        }
    }
    Ok(escapes)
}

/// Whether `target` is reachable from `from` by following edges forward.
fn reaches(edges: &HashMap<String, Edge>, from: &str, target: &str) -> bool {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut stack = vec![from];
    while let Some(current) = stack.pop() {
        if current == target {
            return true;
        }
        if current == END || !visited.insert(current) {
            continue;
        }
        if let Some(edge) = edges.get(current) {
            stack.extend(edge.successors());
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateDelta;

    struct Noop(&'static str);

    impl Stage for Noop {
        fn name(&self) -> &'static str {
            self.0
        }

        fn run(&self, _state: &RunState) -> StateDelta {
            StateDelta::new()
        }
    }

    struct FixedRouter(&'static str);

    impl Router for FixedRouter {
        fn route(&self, _state: &RunState) -> String {
            self.0.to_string()
        }
    }

    fn looped_graph() -> GraphBuilder {
        // work → check → {work (loop) | done → END}
        Graph::builder()
            .stage(Box::new(Noop("work")))
            .stage(Box::new(Noop("check")))
            .stage(Box::new(Noop("done")))
            .start("work")
            .edge("work", "check")
            .conditional("check", Box::new(FixedRouter("work")), &["work", "done"])
            .edge("done", END)
    }

    #[test]
    fn test_build_valid_loop_graph() {
        let graph = looped_graph().build().unwrap();
        assert_eq!(graph.start(), "work");
        assert_eq!(graph.remaining("done"), 1);
        assert_eq!(graph.remaining("check"), 2);
        assert_eq!(graph.remaining("work"), 3);
        assert_eq!(graph.shortest_run(), 3);
        assert_eq!(graph.escapes.get("check"), Some(&"done".to_string()));
    }

    #[test]
    fn test_unknown_edge_target_rejected() {
        let err = Graph::builder()
            .stage(Box::new(Noop("a")))
            .start("a")
            .edge("a", "ghost")
            .build()
            .unwrap_err();
        assert!(matches!(err, GraphError::UnknownTarget { .. }));
    }

    #[test]
    fn test_missing_edge_rejected() {
        let err = Graph::builder()
            .stage(Box::new(Noop("a")))
            .stage(Box::new(Noop("b")))
            .start("a")
            .edge("a", "b")
            .build()
            .unwrap_err();
        assert!(matches!(err, GraphError::MissingEdge(name) if name == "b"));
    }

    #[test]
    fn test_static_cycle_has_no_path_to_end() {
        let err = Graph::builder()
            .stage(Box::new(Noop("a")))
            .stage(Box::new(Noop("b")))
            .start("a")
            .edge("a", "b")
            .edge("b", "a")
            .build()
            .unwrap_err();
        assert!(matches!(err, GraphError::DeadEnd(_)));
    }

    #[test]
    fn test_all_looping_candidates_rejected() {
        // END stays reachable through d, but b's only candidate re-enters
        // b, so b has no exit once the step budget runs out.
        let err = Graph::builder()
            .stage(Box::new(Noop("a")))
            .stage(Box::new(Noop("b")))
            .stage(Box::new(Noop("c")))
            .stage(Box::new(Noop("d")))
            .start("a")
            .edge("a", "b")
            .conditional("b", Box::new(FixedRouter("c")), &["c"])
            .edge("c", "d")
            .conditional("d", Box::new(FixedRouter(END)), &["b", END])
            .build()
            .unwrap_err();
        assert!(matches!(err, GraphError::NoEscape(name) if name == "b"));
    }

    #[test]
    fn test_reserved_and_duplicate_names_rejected() {
        let err = Graph::builder().stage(Box::new(Noop(END))).build().unwrap_err();
        assert!(matches!(err, GraphError::ReservedName(_)));

        let err = Graph::builder()
            .stage(Box::new(Noop("a")))
            .stage(Box::new(Noop("a")))
            .build()
            .unwrap_err();
        assert!(matches!(err, GraphError::DuplicateStage(_)));
    }

    #[test]
    fn test_end_is_a_valid_router_candidate() {
        let graph = Graph::builder()
            .stage(Box::new(Noop("a")))
            .start("a")
            .conditional("a", Box::new(FixedRouter(END)), &["a", END])
            .build()
            .unwrap();
        assert_eq!(graph.escapes.get("a"), Some(&END.to_string()));
        assert_eq!(graph.shortest_run(), 1);
    }
}
