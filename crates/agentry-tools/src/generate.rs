//! Generation collaborator: role-tagged text production
//!
//! The pipeline treats generation as a slow, possibly-failing call. Remote
//! LLM backends implement [`Generator`]; the canned implementation below
//! keeps workflows runnable offline and in tests.
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("generation backend unavailable: {0}")]
    Unavailable(String),
}

pub trait Generator: Send + Sync {
    /// Produce text for `task` as the given role.
    fn generate(&self, role: &str, task: &str) -> Result<String, GenerationError>;
}

/// Fixed response per role, keyed case-insensitively.
#[derive(Default)]
pub struct CannedGenerator {
    responses: HashMap<String, String>,
}

impl CannedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_to(mut self, role: &str, response: impl Into<String>) -> Self {
        self.responses.insert(role.to_lowercase(), response.into());
        self
    }

    /// Generator preloaded with the design-studio roles.
    pub fn studio() -> Self {
        Self::new()
            .respond_to(
                "Project Manager",
                "Plan: 1. Analyze the target audience. 2. Create a visual concept. \
                 3. Draft copy for the product features.",
            )
            .respond_to(
                "Designer",
                "Image Prompt: A steaming cup of artisanal coffee on a rustic wooden \
                 table, morning sunlight streaming through a window, 4k, photorealistic.",
            )
            .respond_to(
                "Copywriter",
                "Caption: Start your day with the perfect brew. #CoffeeLover #MorningVibes",
            )
            .respond_to(
                "Creative Director",
                "Feedback: The image prompt is good, but make the caption punchier. APPROVED.",
            )
    }
}

impl Generator for CannedGenerator {
    fn generate(&self, role: &str, task: &str) -> Result<String, GenerationError> {
        tracing::debug!(role, task, "generating canned response");
        self.responses
            .get(&role.to_lowercase())
            .cloned()
            .ok_or_else(|| GenerationError::Unavailable(format!("no response for role `{role}`")))
    }
}
