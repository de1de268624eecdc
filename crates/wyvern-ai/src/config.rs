//! Local LLM configuration.

use std::time::Duration;

use wyvern_local_ai::{ClientTimeouts, LlamaCppClient, DEFAULT_PORT};

use crate::ollama::{OllamaClient, DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_URL};

/// Configuration for the local LLM router.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    /// llama-server base URL
    pub llama_url: String,
    /// Ollama base URL
    pub ollama_url: String,
    /// Model Ollama uses when a request names none
    pub ollama_model: String,
    /// Health probe timeout
    pub probe_timeout: Duration,
    /// Chat completion timeout, both backends
    pub request_timeout: Duration,
    /// Model listing timeout
    pub models_timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        let timeouts = ClientTimeouts::default();
        Self {
            llama_url: format!("http://localhost:{}", DEFAULT_PORT),
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            ollama_model: DEFAULT_OLLAMA_MODEL.to_string(),
            probe_timeout: timeouts.probe,
            request_timeout: timeouts.request,
            models_timeout: timeouts.models,
        }
    }
}

impl LlmConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let secs = |key: &str, fallback: Duration| {
            lookup(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(fallback)
        };

        Self {
            llama_url: lookup("WYVERN_LLAMA_URL").unwrap_or(defaults.llama_url),
            ollama_url: lookup("WYVERN_OLLAMA_URL").unwrap_or(defaults.ollama_url),
            ollama_model: lookup("WYVERN_OLLAMA_MODEL").unwrap_or(defaults.ollama_model),
            probe_timeout: secs("WYVERN_PROBE_TIMEOUT_SECS", defaults.probe_timeout),
            request_timeout: secs("WYVERN_REQUEST_TIMEOUT_SECS", defaults.request_timeout),
            models_timeout: defaults.models_timeout,
        }
    }

    /// Create a builder for configuration.
    pub fn builder() -> LlmConfigBuilder {
        LlmConfigBuilder::default()
    }

    /// Build the primary client this config describes.
    pub fn llama_client(&self) -> LlamaCppClient {
        LlamaCppClient::with_url(&self.llama_url).with_timeouts(ClientTimeouts {
            probe: self.probe_timeout,
            request: self.request_timeout,
            models: self.models_timeout,
        })
    }

    /// Build the fallback client this config describes.
    pub fn ollama_client(&self) -> OllamaClient {
        OllamaClient::with_config(&self.ollama_url, &self.ollama_model)
            .with_timeout(self.request_timeout)
    }
}

/// Builder for local LLM configuration.
#[derive(Debug, Default)]
pub struct LlmConfigBuilder {
    config: LlmConfig,
}

impl LlmConfigBuilder {
    pub fn llama_url(mut self, url: impl Into<String>) -> Self {
        self.config.llama_url = url.into();
        self
    }

    pub fn ollama_url(mut self, url: impl Into<String>) -> Self {
        self.config.ollama_url = url.into();
        self
    }

    pub fn ollama_model(mut self, model: impl Into<String>) -> Self {
        self.config.ollama_model = model.into();
        self
    }

    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.config.probe_timeout = timeout;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn models_timeout(mut self, timeout: Duration) -> Self {
        self.config.models_timeout = timeout;
        self
    }

    pub fn build(self) -> LlmConfig {
        self.config
    }
}
