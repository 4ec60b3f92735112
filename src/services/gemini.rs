use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Default Gemini REST endpoint
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Errors that can occur when calling the Gemini API
#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Response contained no candidate text")]
    MissingText,
}

impl GeminiError {
    /// Status code and message text for failure classification
    pub fn parts(&self) -> (Option<u16>, String) {
        match self {
            GeminiError::RequestError(e) => (e.status().map(|s| s.as_u16()), e.to_string()),
            GeminiError::ApiError { status, message } => (Some(*status), message.clone()),
            GeminiError::MissingText => (None, self.to_string()),
        }
    }
}

/// How a generation failure should steer the fallback loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Model id does not exist or was retired; try the next candidate
    ModelUnavailable,
    /// Key was flagged as leaked or reported; no candidate can succeed
    CredentialRevoked,
    /// Key lacks access to the API; no candidate can succeed
    PermissionDenied,
    /// Anything else; still worth trying the next candidate
    Transient,
}

/// Classify a generation failure by status code and message text.
///
/// Checks run in priority order: model-missing first, then revoked
/// credentials, then permission problems. The substring checks back up
/// the status code because transport errors carry no status.
pub fn classify_failure(status: Option<u16>, message: &str) -> FailureKind {
    let lower = message.to_lowercase();

    if status == Some(404) || lower.contains("404") || lower.contains("not found") {
        return FailureKind::ModelUnavailable;
    }

    let forbidden = status == Some(403) || lower.contains("403");
    if forbidden && (lower.contains("leaked") || lower.contains("reported")) {
        return FailureKind::CredentialRevoked;
    }

    if forbidden
        || lower.contains("api key")
        || lower.contains("api_key")
        || lower.contains("permission")
        || lower.contains("credential")
    {
        return FailureKind::PermissionDenied;
    }

    FailureKind::Transient
}

/// Pull the human-readable message out of a Gemini error body
fn extract_api_error(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("error")?
        .get("message")
        .and_then(|m| m.as_str())
        .map(str::to_string)
}

#[derive(Debug, Deserialize)]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

#[derive(Debug, Deserialize)]
struct ModelInfo {
    name: String,
    #[serde(rename = "supportedGenerationMethods", default)]
    supported_generation_methods: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GenerateCandidate>,
}

#[derive(Debug, Deserialize)]
struct GenerateCandidate {
    content: Option<GenerateContent>,
}

#[derive(Debug, Deserialize)]
struct GenerateContent {
    #[serde(default)]
    parts: Vec<GeneratePart>,
}

#[derive(Debug, Deserialize)]
struct GeneratePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}

/// Gemini API client
///
/// Handles all communication with the Gemini REST API including:
/// - Discovering generation-capable models
/// - Running generateContent against a chosen model
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key,
            client,
        }
    }

    /// Whether an API key is configured at all
    pub fn has_credentials(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// List generation-capable model ids, best effort.
    ///
    /// Discovery failures degrade to an empty list; the static
    /// preference list covers that case.
    pub async fn list_models(&self) -> Vec<String> {
        match self.try_list_models().await {
            Ok(models) => models,
            Err(e) => {
                tracing::warn!("Model discovery failed, falling back to static list: {}", e);
                Vec::new()
            }
        }
    }

    async fn try_list_models(&self) -> Result<Vec<String>, GeminiError> {
        let url = format!(
            "{}/models?key={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&self.api_key)
        );

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            let message = extract_api_error(&body).unwrap_or(body);
            return Err(GeminiError::ApiError { status, message });
        }

        let parsed: ListModelsResponse = response.json().await?;

        let mut models: Vec<String> = parsed
            .models
            .into_iter()
            .filter(|m| {
                m.supported_generation_methods
                    .iter()
                    .any(|method| method == "generateContent")
            })
            .map(|m| m.name.trim_start_matches("models/").to_string())
            .collect();
        models.sort();

        tracing::debug!("Discovered {} generation-capable models", models.len());

        Ok(models)
    }

    /// Run generateContent against one model and return its text
    pub async fn generate(&self, model: &str, prompt: &str) -> Result<String, GeminiError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url.trim_end_matches('/'),
            model,
            urlencoding::encode(&self.api_key)
        );

        let payload = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        tracing::debug!("Calling Gemini model: {}", model);

        let response = self.client.post(&url).json(&payload).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            let message = extract_api_error(&body).unwrap_or(body);
            return Err(GeminiError::ApiError { status, message });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let text = parsed.first_text().ok_or(GeminiError::MissingText)?;

        Ok(text.trim().to_string())
    }
}
