use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AssistConfig, Provider, TextGenerator};
use crate::AssistError;

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const GEMINI_MODEL: &str = "gemini-2.5-flash";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    response: String,
}

#[derive(Debug, Serialize)]
struct GeminiRequest<'a> {
    contents: [GeminiContent<'a>; 1],
}

impl<'a> GeminiRequest<'a> {
    fn new(text: &'a str) -> Self {
        Self { contents: [GeminiContent { parts: [GeminiPart { text }] }] }
    }
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    parts: [GeminiPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Default, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: GeminiReplyContent,
}

#[derive(Debug, Default, Deserialize)]
struct GeminiReplyContent {
    #[serde(default)]
    parts: Vec<GeminiReplyPart>,
}

#[derive(Debug, Default, Deserialize)]
struct GeminiReplyPart {
    #[serde(default)]
    text: String,
}

impl GeminiResponse {
    fn into_text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .map(|candidate| {
                candidate.content.parts.into_iter().map(|part| part.text).collect()
            })
            .unwrap_or_default()
    }
}

/// Blocking HTTP client for the configured assist backend.
#[derive(Clone, Debug)]
pub struct AssistClient {
    http: Client,
    config: AssistConfig,
}

impl AssistClient {
    /// Builds a client with a request timeout suitable for local model inference.
    pub fn new(config: AssistConfig) -> Result<Self, AssistError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { http, config })
    }

    /// Settings this client was built with.
    #[must_use]
    pub fn config(&self) -> &AssistConfig {
        &self.config
    }

    /// Checks whether the Ollama server answers `GET /api/tags`.
    ///
    /// Any transport failure is reported as `false`.
    #[must_use]
    pub fn test_connection(&self) -> bool {
        let url = format!("{}/api/tags", self.config.ollama_url());
        match self.http.get(&url).timeout(PROBE_TIMEOUT).send() {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                debug!(%url, error = %err, "ollama probe failed");
                false
            }
        }
    }

    fn generate_ollama(&self, prompt: &str) -> Result<String, AssistError> {
        let url = format!("{}/api/generate", self.config.ollama_url());
        let body = OllamaRequest { model: self.config.ollama_model(), prompt, stream: false };
        debug!(%url, model = body.model, "sending ollama request");
        let response = self.http.post(&url).json(&body).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(AssistError::Status { status: status.as_u16() });
        }
        Ok(response.json::<OllamaResponse>()?.response)
    }

    fn generate_gemini(&self, prompt: &str) -> Result<String, AssistError> {
        let key = self.config.api_key().ok_or(AssistError::MissingApiKey)?;
        let url = format!("{GEMINI_ENDPOINT}/{GEMINI_MODEL}:generateContent");
        let body = GeminiRequest::new(prompt);
        debug!(model = GEMINI_MODEL, "sending gemini request");
        let response = self.http.post(&url).query(&[("key", key)]).json(&body).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(AssistError::Status { status: status.as_u16() });
        }
        Ok(response.json::<GeminiResponse>()?.into_text())
    }
}

impl TextGenerator for AssistClient {
    fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String, AssistError> {
        let full_prompt = match system {
            Some(system) => format!("{system}\n\n{prompt}"),
            None => prompt.to_owned(),
        };
        let text = match self.config.provider() {
            Provider::Ollama => self.generate_ollama(&full_prompt)?,
            Provider::Gemini => self.generate_gemini(&full_prompt)?,
        };
        if text.trim().is_empty() {
            return Err(AssistError::EmptyResponse);
        }
        Ok(text)
    }
}
