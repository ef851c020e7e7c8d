//! Generation client: prompt generation, image rendering, and refinement
//! against a remote generative model.
//!
//! Operations thread their outcome through the return value; there is no
//! shared error slot. Partial failure in image rendering is reported
//! alongside the successful subset, never as an all-or-nothing error.

mod gemini;

pub use gemini::{GeminiClient, GeminiConfig};

use crate::model::{GeneratedLogo, LogoPrompt};

/// Errors from the remote generation service.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("API key not found. Set GEMINI_API_KEY or pass --api-key.")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("malformed model response: {0}")]
    MalformedResponse(String),
    #[error("no image returned for prompt")]
    NoImage,
}

/// Result of a best-effort image batch: the successful logos in source
/// order, plus how many prompts failed and the last failure seen.
#[derive(Debug, Default)]
pub struct ImageBatch {
    pub logos: Vec<GeneratedLogo>,
    pub failed: usize,
    pub last_error: Option<GenerateError>,
}

impl ImageBatch {
    pub fn had_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Seam between the controller and the remote service. The production
/// implementation is [`GeminiClient`]; controller tests substitute a mock.
#[allow(async_fn_in_trait)]
pub trait LogoGenerator {
    /// Generate candidate logo prompts from the positional answers. The
    /// brief asks for four concepts but the returned count is not validated.
    async fn generate_prompts(&self, answers: &[String]) -> Result<Vec<LogoPrompt>, GenerateError>;

    /// Render one image per prompt, strictly sequentially. Per-item failures
    /// are recorded in the batch and processing continues with the rest.
    async fn generate_images(&self, prompts: &[LogoPrompt]) -> ImageBatch;

    /// Produce a single replacement prompt from the original plus feedback.
    async fn refine_prompt(
        &self,
        original: &str,
        feedback: &str,
    ) -> Result<LogoPrompt, GenerateError>;
}

/// Build the natural-language brief for prompt generation from the five
/// positional answers.
pub(crate) fn build_brief(answers: &[String]) -> String {
    let field = |i: usize| answers.get(i).map(String::as_str).unwrap_or("");
    format!(
        "Company Name: {}\n\
         Business Type: {}\n\
         Target Audience: {}\n\
         Core Values: {}\n\
         Desired Style: {}\n\n\
         Based on the information above, generate 4 distinct and highly \
         detailed image generation prompts for a professional company logo. \
         The prompts should be creative and suitable for an AI image \
         generation model. Each prompt should specify a different design \
         style (e.g., minimalist, modern, abstract, classic).",
        field(0),
        field(1),
        field(2),
        field(3),
        field(4),
    )
}

/// Build the refinement brief from the original prompt and user feedback.
pub(crate) fn build_refine_brief(original: &str, feedback: &str) -> String {
    format!(
        "Original Logo Prompt: \"{original}\"\n\n\
         User Feedback for modification: \"{feedback}\"\n\n\
         Based on the user feedback, generate a new, single, refined image \
         generation prompt. The new prompt must retain the core concept of \
         the original but incorporate the requested changes. It should be \
         highly detailed and suitable for an AI image generation model. The \
         new prompt should also have an updated style description."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brief_lists_answers_in_question_order() {
        let answers: Vec<String> = ["Nova", "Software", "Startups", "Trust", "Minimal"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let brief = build_brief(&answers);
        let name_at = brief.find("Company Name: Nova").unwrap();
        let style_at = brief.find("Desired Style: Minimal").unwrap();
        assert!(name_at < style_at);
        assert!(brief.contains("generate 4 distinct"));
    }

    #[test]
    fn brief_tolerates_short_answer_vectors() {
        // Defensive: headless callers are validated upstream, but a short
        // vector must not panic here.
        let brief = build_brief(&["Nova".to_string()]);
        assert!(brief.contains("Company Name: Nova"));
        assert!(brief.contains("Desired Style: \n"));
    }

    #[test]
    fn refine_brief_quotes_both_inputs() {
        let brief = build_refine_brief("a blue star", "make it gold");
        assert!(brief.contains("\"a blue star\""));
        assert!(brief.contains("\"make it gold\""));
    }
}
