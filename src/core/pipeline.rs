use std::sync::Arc;

use thiserror::Error;

use crate::core::candidates::{merge_candidates, PREFERRED_MODELS};
use crate::core::extraction::{extract_profile, ExtractionError};
use crate::core::taxonomy::{Taxonomy, AFFILIATIONS};
use crate::models::domain::{InterestProfile, OutputShape};
use crate::services::gemini::{classify_failure, FailureKind, GeminiClient};

/// Errors the classification pipeline can surface to callers
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Service configuration error: {0}")]
    Configuration(String),

    #[error("API key rejected: {0}")]
    Credential(String),

    #[error("API key lacks permission: {0}")]
    Permission(String),

    #[error("Could not parse model output: {0}")]
    Parse(#[from] ExtractionError),

    #[error("All candidate models failed ({}); last error: {last_error}", .attempted.join(", "))]
    Exhausted {
        attempted: Vec<String>,
        last_error: String,
    },
}

/// Classification orchestrator - turns interest text into a profile
///
/// # Pipeline Stages
/// 1. Credential check
/// 2. Model discovery (best effort)
/// 3. Candidate merge with the static preference list
/// 4. Sequential generation with failure classification
/// 5. Extraction and taxonomy filtering
pub struct MatchPipeline {
    client: Arc<GeminiClient>,
    taxonomy: Taxonomy,
    shape: OutputShape,
    max_attempts: usize,
}

impl MatchPipeline {
    pub fn new(
        client: Arc<GeminiClient>,
        taxonomy: Taxonomy,
        shape: OutputShape,
        max_attempts: usize,
    ) -> Self {
        Self {
            client,
            taxonomy,
            shape,
            max_attempts,
        }
    }

    pub fn shape(&self) -> OutputShape {
        self.shape
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Classify a student's interest text into a validated profile.
    ///
    /// Candidate models are tried strictly in order. Failures that only
    /// concern one model move the loop along; failures that doom every
    /// candidate abort immediately. A model that responds but cannot be
    /// parsed is final too, since retrying a different model on valid
    /// output rarely improves anything.
    ///
    /// # Arguments
    /// * `interest` - Free-form interest text, already known non-empty
    ///
    /// # Returns
    /// A taxonomy-filtered profile, or the first fatal error
    pub async fn classify(&self, interest: &str) -> Result<InterestProfile, MatchError> {
        if !self.client.has_credentials() {
            return Err(MatchError::Configuration(
                "AI provider API key is not configured".to_string(),
            ));
        }

        let prompt = self.build_prompt(interest);

        // Stage 2 + 3: discovery result first, static list as safety net
        let discovered = self.client.list_models().await;
        let mut candidates = merge_candidates(&discovered, PREFERRED_MODELS);
        candidates.truncate(self.max_attempts.max(1));

        tracing::debug!("Trying up to {} candidate models", candidates.len());

        let mut last_error = String::from("no models attempted");

        for model in &candidates {
            match self.client.generate(model, &prompt).await {
                Ok(text) => {
                    tracing::info!("Model {} answered, extracting profile", model);
                    let profile = extract_profile(&text, self.shape, &self.taxonomy)?;
                    return Ok(profile);
                }
                Err(err) => {
                    let (status, message) = err.parts();
                    match classify_failure(status, &message) {
                        FailureKind::ModelUnavailable => {
                            tracing::debug!("Model {} unavailable, trying next: {}", model, message);
                            last_error = message;
                        }
                        FailureKind::CredentialRevoked => {
                            return Err(MatchError::Credential(format!(
                                "the key was reported as leaked or compromised; revoke it and issue a new one ({})",
                                message
                            )));
                        }
                        FailureKind::PermissionDenied => {
                            return Err(MatchError::Permission(format!(
                                "check that the key is valid and the Gemini API is enabled for it ({})",
                                message
                            )));
                        }
                        FailureKind::Transient => {
                            tracing::warn!("Model {} failed, trying next: {}", model, message);
                            last_error = message;
                        }
                    }
                }
            }
        }

        Err(MatchError::Exhausted {
            attempted: candidates,
            last_error,
        })
    }

    /// Build the instruction prompt for the configured output shape
    fn build_prompt(&self, interest: &str) -> String {
        let count = self.taxonomy.categories().len();
        let list = self.taxonomy.prompt_list();

        let directive = match self.shape {
            OutputShape::Categories => {
                "Respond with ONLY a JSON array of matching category names taken verbatim from \
                 the list, for example: [\"Category A\", \"Category B\"]. No explanations, no markdown."
                    .to_string()
            }
            OutputShape::Profile => format!(
                "Respond with ONLY a JSON object with these keys: \"matched_categories\" (array \
                 of category names taken verbatim from the list), \"user_affiliation\" (one of {} \
                 if the student mentions their college, otherwise \"NONE\"), \"specific_keywords\" \
                 (array of short lowercase keywords from the input), \"negative_keywords\" (array \
                 of things the student wants to avoid). No explanations, no markdown.",
                AFFILIATIONS.join(", ")
            ),
        };

        format!(
            "You are a matching assistant for a university student organization directory. \
             Classify the student's interests into the {} categories below.\n\n{}\n\nStudent \
             input: \"{}\"\n\n{}",
            count,
            list,
            interest.trim(),
            directive
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn create_pipeline(shape: OutputShape) -> MatchPipeline {
        let client = Arc::new(GeminiClient::new(
            "https://generativelanguage.test/v1beta".to_string(),
            "test_key".to_string(),
            Duration::from_secs(5),
        ));
        MatchPipeline::new(client, Taxonomy::canonical(), shape, 6)
    }

    #[test]
    fn test_prompt_lists_every_category() {
        let pipeline = create_pipeline(OutputShape::Categories);
        let prompt = pipeline.build_prompt("I like robots");

        assert!(prompt.contains("10 categories"));
        assert!(prompt.contains("1. Academic/Research"));
        assert!(prompt.contains("10. Culture/Religion"));
        assert!(prompt.contains("Student input: \"I like robots\""));
    }

    #[test]
    fn test_categories_prompt_asks_for_array() {
        let pipeline = create_pipeline(OutputShape::Categories);
        let prompt = pipeline.build_prompt("music");
        assert!(prompt.contains("JSON array"));
        assert!(!prompt.contains("user_affiliation"));
    }

    #[test]
    fn test_profile_prompt_asks_for_object_with_affiliations() {
        let pipeline = create_pipeline(OutputShape::Profile);
        let prompt = pipeline.build_prompt("music");
        assert!(prompt.contains("JSON object"));
        assert!(prompt.contains("matched_categories"));
        assert!(prompt.contains("COS, COE, CIT, CAFA, CLA, CIE, NONE"));
    }

    #[test]
    fn test_prompt_trims_interest_text() {
        let pipeline = create_pipeline(OutputShape::Profile);
        let prompt = pipeline.build_prompt("  chess club  ");
        assert!(prompt.contains("Student input: \"chess club\""));
    }

    #[test]
    fn test_exhausted_error_names_every_attempted_model() {
        let err = MatchError::Exhausted {
            attempted: vec!["gemini-a".to_string(), "gemini-b".to_string()],
            last_error: "HTTP 500".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("gemini-a, gemini-b"));
        assert!(text.contains("HTTP 500"));
    }
}
