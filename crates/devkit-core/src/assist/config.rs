use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::AssistError;

/// Default address of a local Ollama daemon.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
/// Default model requested from Ollama.
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3";

/// Which backend answers assist requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Google's hosted Gemini API. Requires an API key.
    #[default]
    Gemini,
    /// A self-hosted Ollama server.
    Ollama,
}

impl Provider {
    /// Lowercase name used on the command line and in serialized config.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Ollama => "ollama",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = AssistError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "ollama" => Ok(Self::Ollama),
            other => Err(AssistError::UnknownProvider(other.to_owned())),
        }
    }
}

/// Connection settings for the assist backends.
///
/// Built once by the caller and passed by reference; nothing here is global.
///
/// ```
/// use devkit_core::assist::{AssistConfig, Provider};
///
/// let config = AssistConfig::default()
///     .with_provider(Provider::Ollama)
///     .with_ollama_url("http://gpu-box:11434/");
/// assert_eq!(config.ollama_url(), "http://gpu-box:11434");
/// assert_eq!(config.ollama_model(), "llama3");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssistConfig {
    provider: Provider,
    ollama_url: String,
    ollama_model: String,
    #[serde(skip_serializing)]
    api_key: Option<String>,
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            ollama_url: DEFAULT_OLLAMA_URL.to_owned(),
            ollama_model: DEFAULT_OLLAMA_MODEL.to_owned(),
            api_key: None,
        }
    }
}

impl AssistConfig {
    /// Selects the backend.
    #[must_use]
    pub fn with_provider(mut self, provider: Provider) -> Self {
        self.provider = provider;
        self
    }

    /// Sets the Ollama base URL. A trailing slash is dropped.
    #[must_use]
    pub fn with_ollama_url<S: Into<String>>(mut self, url: S) -> Self {
        self.ollama_url = normalize_url(&url.into()).to_owned();
        self
    }

    /// Sets the Ollama model name.
    #[must_use]
    pub fn with_ollama_model<S: Into<String>>(mut self, model: S) -> Self {
        self.ollama_model = model.into();
        self
    }

    /// Sets the Gemini API key. Blank keys are treated as absent.
    #[must_use]
    pub fn with_api_key<S: Into<String>>(mut self, key: Option<S>) -> Self {
        self.api_key = key.map(Into::into).filter(|key| !key.trim().is_empty());
        self
    }

    /// Selected backend.
    #[must_use]
    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// Ollama base URL without a trailing slash.
    #[must_use]
    pub fn ollama_url(&self) -> &str {
        normalize_url(&self.ollama_url)
    }

    /// Ollama model name.
    #[must_use]
    pub fn ollama_model(&self) -> &str {
        &self.ollama_model
    }

    /// Gemini API key, if one was supplied.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }
}

/// Drops a single trailing `/` from a base URL.
///
/// ```
/// assert_eq!(devkit_core::assist::normalize_url("http://h:1/"), "http://h:1");
/// assert_eq!(devkit_core::assist::normalize_url("http://h:1"), "http://h:1");
/// ```
#[must_use]
pub fn normalize_url(url: &str) -> &str {
    url.strip_suffix('/').unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_names_parse_case_insensitively() {
        assert_eq!("Ollama".parse::<Provider>().unwrap(), Provider::Ollama);
        assert_eq!(" gemini ".parse::<Provider>().unwrap(), Provider::Gemini);
        let err = "openai".parse::<Provider>().unwrap_err();
        assert!(matches!(err, AssistError::UnknownProvider(name) if name == "openai"));
    }

    #[test]
    fn only_one_trailing_slash_is_removed() {
        assert_eq!(normalize_url("http://h//"), "http://h/");
    }

    #[test]
    fn blank_api_key_is_absent() {
        let config = AssistConfig::default().with_api_key(Some("  "));
        assert_eq!(config.api_key(), None);
    }

    #[test]
    fn serialized_config_omits_the_key() {
        let config = AssistConfig::default().with_api_key(Some("secret"));
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(
            json,
            "{\"provider\":\"gemini\",\"ollamaUrl\":\"http://localhost:11434\",\"ollamaModel\":\"llama3\"}"
        );
        let restored: AssistConfig = serde_json::from_str("{\"provider\":\"ollama\"}").unwrap();
        assert_eq!(restored.provider(), Provider::Ollama);
        assert_eq!(restored.ollama_model(), DEFAULT_OLLAMA_MODEL);
    }
}
