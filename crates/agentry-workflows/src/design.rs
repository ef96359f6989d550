//! Design studio workflow
//!
//! A straight chain with no quality gate: `project_manager → designer →
//! copywriter → creative_director → END`. Each stage asks the generation
//! collaborator for role-tagged text and degrades to a fixed line when
//! the backend is down.
use agentry_core::{Graph, GraphError, RunState, Stage, StateDelta, END};
use agentry_tools::Generator;
use serde_json::{json, Value};
use std::sync::Arc;

/// Build the design workflow graph around a generation backend.
pub fn design_graph(generator: Arc<dyn Generator>) -> Result<Graph, GraphError> {
    Graph::builder()
        .stage(Box::new(ProjectManagerStage {
            generator: generator.clone(),
        }))
        .stage(Box::new(DesignerStage {
            generator: generator.clone(),
        }))
        .stage(Box::new(CopywriterStage {
            generator: generator.clone(),
        }))
        .stage(Box::new(CreativeDirectorStage { generator }))
        .start("project_manager")
        .edge("project_manager", "designer")
        .edge("designer", "copywriter")
        .edge("copywriter", "creative_director")
        .edge("creative_director", END)
        .build()
}

fn generate_or(generator: &dyn Generator, role: &str, task: &str, fallback: &str) -> String {
    generator.generate(role, task).unwrap_or_else(|e| {
        tracing::warn!(role, error = %e, "generation failed, using fallback");
        fallback.to_string()
    })
}

struct ProjectManagerStage {
    generator: Arc<dyn Generator>,
}

impl Stage for ProjectManagerStage {
    fn name(&self) -> &'static str {
        "project_manager"
    }

    fn run(&self, state: &RunState) -> StateDelta {
        let request = state
            .last_message()
            .unwrap_or("Create a visual concept.")
            .to_string();

        let notes = generate_or(
            self.generator.as_ref(),
            "Project Manager",
            &format!("Break down this request: {request}"),
            "Plan: analyze the brief, produce a concept, draft the copy.",
        );

        StateDelta::new()
            .with_input(json!({ "request": request }))
            .with_intermediate("plan_notes", json!(notes))
            .with_next("designer")
            .with_message("Project Manager", notes)
    }
}

struct DesignerStage {
    generator: Arc<dyn Generator>,
}

impl Stage for DesignerStage {
    fn name(&self) -> &'static str {
        "designer"
    }

    fn run(&self, state: &RunState) -> StateDelta {
        let request = state
            .input
            .as_ref()
            .and_then(|i| i.get("request"))
            .and_then(Value::as_str)
            .unwrap_or("Create a visual concept.");

        let concept = generate_or(
            self.generator.as_ref(),
            "Designer",
            request,
            "Visual concept unavailable; using the house-style placeholder frame.",
        );

        StateDelta::new()
            .with_intermediate("design_concept", json!(concept))
            .with_next("copywriter")
            .with_message("Designer", concept)
    }
}

struct CopywriterStage {
    generator: Arc<dyn Generator>,
}

impl Stage for CopywriterStage {
    fn name(&self) -> &'static str {
        "copywriter"
    }

    fn run(&self, state: &RunState) -> StateDelta {
        let concept = state
            .intermediate_str("design_concept")
            .unwrap_or_default()
            .to_string();

        let copy = generate_or(
            self.generator.as_ref(),
            "Copywriter",
            &format!("Write copy for: {concept}"),
            "Copy unavailable; placeholder caption pending review.",
        );

        StateDelta::new()
            .with_intermediate("copy_draft", json!(copy))
            .with_next("creative_director")
            .with_message("Copywriter", copy)
    }
}

struct CreativeDirectorStage {
    generator: Arc<dyn Generator>,
}

impl Stage for CreativeDirectorStage {
    fn name(&self) -> &'static str {
        "creative_director"
    }

    fn run(&self, state: &RunState) -> StateDelta {
        let concept = state.intermediate_str("design_concept").unwrap_or_default();
        let copy = state.intermediate_str("copy_draft").unwrap_or_default();

        let feedback = generate_or(
            self.generator.as_ref(),
            "Creative Director",
            "Review the work.",
            "Feedback unavailable; deliverable passed through unreviewed.",
        );

        StateDelta::new()
            .with_output(json!({
                "concept": concept,
                "copy": copy,
                "feedback": feedback,
            }))
            .with_next(END)
            .with_message("Creative Director", feedback)
    }
}
