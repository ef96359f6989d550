//! Legal document workflow
//!
//! Topology: `intake → planner → researcher → drafter → compliance →
//! risk → evaluation`, then a quality gate routes either back through
//! `refinement → compliance` or forward through `citation → audit`.
//!
//! Every collaborator is constructed per run and handed to its stage
//! explicitly, so concurrent runs share nothing mutable.
use crate::config::LegalConfig;
use agentry_core::{
    AuditSink, Graph, GraphError, Router, RunState, RunnerConfig, Stage, StateDelta,
    WorkflowRunner, END,
};
use agentry_tools::{
    CaseFinding, CitationEngine, ComplianceChecker, Drafter, Evaluator, Researcher, Retriever,
    RiskScanner, StatuteFinding,
};
use serde_json::{json, Value};
use std::sync::Arc;

/// Collaborators behind one legal run.
pub struct LegalToolkit {
    pub researcher: Researcher,
    pub drafter: Arc<Drafter>,
    pub checker: ComplianceChecker,
    pub scanner: RiskScanner,
    pub evaluator: Evaluator,
    pub citations: CitationEngine,
    pub sink: Arc<AuditSink>,
}

impl LegalToolkit {
    pub fn new(store: Arc<dyn Retriever>, config: &LegalConfig) -> Self {
        Self {
            researcher: Researcher::new(store),
            drafter: Arc::new(Drafter::new()),
            checker: ComplianceChecker::new(),
            scanner: RiskScanner::new(),
            evaluator: Evaluator::new(config.weights.clone()),
            citations: CitationEngine::new(),
            sink: Arc::new(AuditSink::new()),
        }
    }
}

/// Quality gate: accept at or above the threshold, refine below it.
/// Loop safety is the runner's job, not the router's.
pub struct QualityRouter {
    pub threshold: f64,
}

impl Router for QualityRouter {
    fn route(&self, state: &RunState) -> String {
        let overall = state.metric("overall").unwrap_or(0.0);
        if overall >= self.threshold {
            "citation".to_string()
        } else {
            "refinement".to_string()
        }
    }
}

/// Build the legal workflow graph around a toolkit.
pub fn legal_graph(toolkit: LegalToolkit, config: &LegalConfig) -> Result<Graph, GraphError> {
    let LegalToolkit {
        researcher,
        drafter,
        checker,
        scanner,
        evaluator,
        citations,
        sink,
    } = toolkit;

    Graph::builder()
        .stage(Box::new(IntakeStage { sink: sink.clone() }))
        .stage(Box::new(PlannerStage {
            sink: sink.clone(),
            rules: config.compliance_rules.clone(),
        }))
        .stage(Box::new(ResearchStage {
            researcher,
            sink: sink.clone(),
        }))
        .stage(Box::new(DraftStage {
            drafter: drafter.clone(),
            sink: sink.clone(),
        }))
        .stage(Box::new(ComplianceStage {
            checker,
            sink: sink.clone(),
        }))
        .stage(Box::new(RiskStage {
            scanner,
            sink: sink.clone(),
        }))
        .stage(Box::new(EvaluationStage {
            evaluator,
            sink: sink.clone(),
        }))
        .stage(Box::new(RefinementStage { drafter }))
        .stage(Box::new(CitationStage {
            citations,
            sink: sink.clone(),
        }))
        .stage(Box::new(AuditStage { sink }))
        .start("intake")
        .edge("intake", "planner")
        .edge("planner", "researcher")
        .edge("researcher", "drafter")
        .edge("drafter", "compliance")
        .edge("compliance", "risk")
        .edge("risk", "evaluation")
        .conditional(
            "evaluation",
            Box::new(QualityRouter {
                threshold: config.accept_threshold,
            }),
            &["refinement", "citation"],
        )
        .edge("refinement", "compliance")
        .edge("citation", "audit")
        .edge("audit", END)
        .build()
}

/// Toolkit, graph and runner in one call, configured from `config`.
///
/// The runner carries the toolkit's audit sink, so build a fresh runner
/// per run; reusing one would interleave audit trails.
pub fn legal_runner(
    store: Arc<dyn Retriever>,
    config: &LegalConfig,
) -> Result<WorkflowRunner, GraphError> {
    let toolkit = LegalToolkit::new(store, config);
    let graph = legal_graph(toolkit, config)?;
    WorkflowRunner::new(
        graph,
        RunnerConfig {
            max_steps: config.max_steps,
            ..Default::default()
        },
    )
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

struct IntakeStage {
    sink: Arc<AuditSink>,
}

impl Stage for IntakeStage {
    fn name(&self) -> &'static str {
        "intake"
    }

    fn run(&self, state: &RunState) -> StateDelta {
        let request = state.last_message().unwrap_or_default().to_string();
        self.sink.record("Intake", &request, "Initialized");

        StateDelta::new()
            .with_input(json!({ "request": request }))
            .with_next("planner")
            .with_message("Intake", "Request received. Starting legal workflow.")
    }
}

struct PlannerStage {
    sink: Arc<AuditSink>,
    rules: Vec<String>,
}

impl Stage for PlannerStage {
    fn name(&self) -> &'static str {
        "planner"
    }

    fn run(&self, state: &RunState) -> StateDelta {
        // Upstream intake should have set the request; fall back to the
        // message log if it did not.
        let request = state
            .input
            .as_ref()
            .and_then(|i| i.get("request"))
            .and_then(Value::as_str)
            .or_else(|| state.last_message())
            .unwrap_or_default()
            .to_string();

        let lower = request.to_lowercase();
        let doc_type = if lower.contains("nda") {
            "NDA"
        } else if lower.contains("agreement") {
            "Service Agreement"
        } else {
            "Unknown"
        };

        let plan = json!({
            "doc_type": doc_type,
            "research_needed": true,
            "compliance_rules": self.rules,
        });
        self.sink.record("Planner", &request, &plan.to_string());

        StateDelta::new()
            .with_intermediate("plan", plan)
            .with_next("researcher")
            .with_message("Planner", format!("Plan created: Draft {doc_type}"))
    }
}

struct ResearchStage {
    researcher: Researcher,
    sink: Arc<AuditSink>,
}

impl Stage for ResearchStage {
    fn name(&self) -> &'static str {
        "researcher"
    }

    fn run(&self, state: &RunState) -> StateDelta {
        let doc_type = state
            .intermediate
            .get("plan")
            .and_then(|p| p.get("doc_type"))
            .and_then(Value::as_str)
            .unwrap_or("contract");

        let query = format!("precedents for {doc_type}");
        let context = self.researcher.structured_context(&query);
        self.sink.record("Research", &query, &context.summary);

        let context_value = serde_json::to_value(&context).unwrap_or_else(|_| json!({}));

        StateDelta::new()
            .with_context(context_value)
            .with_next("drafter")
            .with_message("Researcher", "Research completed.")
    }
}

struct DraftStage {
    drafter: Arc<Drafter>,
    sink: Arc<AuditSink>,
}

impl Stage for DraftStage {
    fn name(&self) -> &'static str {
        "drafter"
    }

    fn run(&self, state: &RunState) -> StateDelta {
        let doc_type = state
            .intermediate
            .get("plan")
            .and_then(|p| p.get("doc_type"))
            .and_then(Value::as_str)
            .unwrap_or("General");

        let background = state
            .context
            .as_ref()
            .and_then(|c| c.get("summary"))
            .and_then(Value::as_str)
            .unwrap_or("");

        let draft = self.drafter.draft(doc_type, background).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "drafting failed, emitting skeleton document");
            format!(
                "LEGAL DOCUMENT: {}\n\n[Drafting backend unavailable.]",
                doc_type.to_uppercase()
            )
        });
        self.sink.record("Drafting", "Context+Plan", "Draft Generated");

        StateDelta::new()
            .with_intermediate("draft", json!(draft))
            .with_next("compliance")
            .with_message("Drafter", "Draft generated.")
    }
}

struct ComplianceStage {
    checker: ComplianceChecker,
    sink: Arc<AuditSink>,
}

impl Stage for ComplianceStage {
    fn name(&self) -> &'static str {
        "compliance"
    }

    fn run(&self, state: &RunState) -> StateDelta {
        let draft = state.intermediate_str("draft").unwrap_or_default();
        let rules: Vec<String> = state
            .intermediate
            .get("plan")
            .and_then(|p| p.get("compliance_rules"))
            .and_then(Value::as_array)
            .map(|rules| {
                rules
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let report = self.checker.analyze(draft, &rules);
        self.sink
            .record("Compliance", "Draft", &format!("Score: {:.2}", report.score));

        let score = report.score;
        let report_value = serde_json::to_value(&report).unwrap_or_else(|_| json!({}));

        StateDelta::new()
            .with_intermediate("compliance_report", report_value)
            .with_metric("compliance", score)
            .with_next("risk")
            .with_message(
                "Compliance",
                format!("Compliance check complete. Score: {score:.2}"),
            )
    }
}

struct RiskStage {
    scanner: RiskScanner,
    sink: Arc<AuditSink>,
}

impl Stage for RiskStage {
    fn name(&self) -> &'static str {
        "risk"
    }

    fn run(&self, state: &RunState) -> StateDelta {
        let draft = state.intermediate_str("draft").unwrap_or_default();
        let report = self.scanner.analyze(draft);
        self.sink.record(
            "Risk",
            "Draft",
            &format!("Risk Level: {}", report.risk_level),
        );

        let level = report.risk_level;
        let score = report.score;
        let report_value = serde_json::to_value(&report).unwrap_or_else(|_| json!({}));

        StateDelta::new()
            .with_intermediate("risk_report", report_value)
            .with_metric("risk", score)
            .with_next("evaluation")
            .with_message("Risk", format!("Risk analysis complete. Level: {level}"))
    }
}

struct EvaluationStage {
    evaluator: Evaluator,
    sink: Arc<AuditSink>,
}

impl Stage for EvaluationStage {
    fn name(&self) -> &'static str {
        "evaluation"
    }

    fn run(&self, state: &RunState) -> StateDelta {
        let compliance = state.metric("compliance").unwrap_or(0.0);
        let risk = state.metric("risk").unwrap_or(0.0);

        let overall = self.evaluator.evaluate(compliance, risk);
        self.sink
            .record("Evaluation", "Metrics", &format!("Overall: {overall}"));

        StateDelta::new()
            .with_metric("overall", overall)
            .with_next("quality_gate")
            .with_message("Evaluator", format!("Evaluation complete. Score: {overall}"))
    }
}

struct RefinementStage {
    drafter: Arc<Drafter>,
}

impl Stage for RefinementStage {
    fn name(&self) -> &'static str {
        "refinement"
    }

    fn run(&self, state: &RunState) -> StateDelta {
        let draft = state.intermediate_str("draft").unwrap_or_default();

        let missing = string_list(state.intermediate.get("compliance_report"), "missing");
        let vulnerabilities = string_list(state.intermediate.get("risk_report"), "vulnerabilities");

        let improved = self.drafter.refine(draft, &missing, &vulnerabilities);

        StateDelta::new()
            .with_intermediate("draft", json!(improved))
            .with_next("compliance")
            .with_message("Refiner", "Refining document based on feedback.")
    }
}

struct CitationStage {
    citations: CitationEngine,
    sink: Arc<AuditSink>,
}

impl Stage for CitationStage {
    fn name(&self) -> &'static str {
        "citation"
    }

    fn run(&self, state: &RunState) -> StateDelta {
        let draft = state.intermediate_str("draft").unwrap_or_default();

        let cases: Vec<CaseFinding> = context_list(state, "cases");
        let statutes: Vec<StatuteFinding> = context_list(state, "statutes");

        let document = self.citations.attach(draft, &cases, &statutes);
        self.sink.record("Citation", "Draft", "Citations Attached");

        StateDelta::new()
            .with_output(json!({ "document": document }))
            .with_next("audit")
            .with_message("Citation", "Citations attached.")
    }
}

struct AuditStage {
    sink: Arc<AuditSink>,
}

impl Stage for AuditStage {
    fn name(&self) -> &'static str {
        "audit"
    }

    fn run(&self, _state: &RunState) -> StateDelta {
        let entries = self.sink.entries();
        tracing::info!(entries = entries.len(), "legal workflow finished");

        StateDelta::new()
            .with_history(entries)
            .with_next(END)
            .with_message("Audit", "Workflow complete. Audit log saved.")
    }
}

/// String array stored under `report[key]`, tolerating absent upstream
/// reports.
fn string_list(report: Option<&Value>, key: &str) -> Vec<String> {
    report
        .and_then(|r| r.get(key))
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Typed list deserialized out of the research context.
fn context_list<T: serde::de::DeserializeOwned>(state: &RunState, key: &str) -> Vec<T> {
    state
        .context
        .as_ref()
        .and_then(|c| c.get(key))
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default()
}
