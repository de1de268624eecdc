//! Unified local LLM: llama.cpp when it answers, Ollama otherwise.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use wyvern_local_ai::{
    ChatMessage, Completion, CompletionRequest, LlamaCppClient, LocalAIError, RequestError,
};

use crate::config::LlmConfig;
use crate::ollama::{OllamaClient, OllamaError};

/// Which server handles chat requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// llama.cpp `llama-server`
    Primary,
    /// Ollama
    Fallback,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Primary => write!(f, "llama.cpp"),
            Backend::Fallback => write!(f, "ollama"),
        }
    }
}

/// Snapshot reported by [`LocalLlm::status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendStatus {
    pub selected_backend: Backend,
    pub primary_available: bool,
    pub available_models: BTreeSet<String>,
}

/// Per-call options for [`LocalLlm::chat`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChatOptions {
    pub model: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            model: None,
            temperature: CompletionRequest::DEFAULT_TEMPERATURE,
            max_tokens: CompletionRequest::DEFAULT_MAX_TOKENS,
        }
    }
}

impl ChatOptions {
    fn into_request(self, messages: Vec<ChatMessage>) -> CompletionRequest {
        let request = CompletionRequest::new(messages)
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens);
        match self.model {
            Some(model) => request.with_model(model),
            None => request,
        }
    }
}

/// Errors from the router, whichever backend produced them.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("llama.cpp backend failed: {0}")]
    Primary(#[from] LocalAIError),
    #[error("ollama backend failed: {0}")]
    Fallback(#[from] OllamaError),
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] RequestError),
}

impl LlmError {
    /// The backend that failed, if the request got that far.
    pub fn backend(&self) -> Option<Backend> {
        match self {
            LlmError::Primary(_) => Some(Backend::Primary),
            LlmError::Fallback(_) => Some(Backend::Fallback),
            LlmError::InvalidRequest(_) => None,
        }
    }
}

/// Chat front end over the two local backends.
///
/// The backend is chosen once, when the instance is built, and `chat` never
/// re-probes. Call [`LocalLlm::reselect`] to pick again. All request methods
/// take `&self`, so one instance can be shared across tasks.
#[derive(Debug)]
pub struct LocalLlm {
    primary: LlamaCppClient,
    fallback: OllamaClient,
    selected: Backend,
    primary_available: bool,
}

impl LocalLlm {
    /// Build both clients from `config` and probe llama-server.
    pub async fn connect(config: &LlmConfig) -> Self {
        Self::with_clients(config.llama_client(), config.ollama_client()).await
    }

    /// Probe `primary` and select a backend.
    pub async fn with_clients(primary: LlamaCppClient, fallback: OllamaClient) -> Self {
        let primary_available = primary.probe().await;
        let selected = select(primary_available);
        info!(
            "Selected {} backend (llama-server at {} {})",
            selected,
            primary.base_url(),
            if primary_available { "is up" } else { "is down" }
        );

        Self {
            primary,
            fallback,
            selected,
            primary_available,
        }
    }

    /// Backend chosen at construction or by the last [`reselect`](Self::reselect).
    pub fn selected_backend(&self) -> Backend {
        self.selected
    }

    /// Whether llama-server answered the probe that made the current selection.
    pub fn primary_available(&self) -> bool {
        self.primary_available
    }

    pub fn primary(&self) -> &LlamaCppClient {
        &self.primary
    }

    pub fn fallback(&self) -> &OllamaClient {
        &self.fallback
    }

    /// Probe llama-server again and update the selection.
    pub async fn reselect(&mut self) -> Backend {
        self.primary_available = self.primary.probe().await;
        let selected = select(self.primary_available);
        if selected != self.selected {
            info!("Switching backend: {} -> {}", self.selected, selected);
        }
        self.selected = selected;
        selected
    }

    /// Send a conversation and return only the reply text.
    pub async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        options: ChatOptions,
    ) -> Result<String, LlmError> {
        let request = options.into_request(messages);
        Ok(self.complete(&request).await?.text)
    }

    /// Send a request to the selected backend, keeping token and timing data.
    pub async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError> {
        request.validate()?;
        debug!("Routing completion to {}", self.selected);

        match self.selected {
            Backend::Primary => Ok(self.primary.complete(request).await?),
            Backend::Fallback => Ok(self.fallback.complete(request).await?),
        }
    }

    /// Probe llama-server now and report what it offers.
    ///
    /// Unlike `chat`, this always re-checks. It does not change the
    /// selection; `selected_backend` is the one `chat` will use.
    pub async fn status(&self) -> BackendStatus {
        let primary_available = self.primary.probe().await;
        let available_models = if primary_available {
            self.primary.list_models().await
        } else {
            BTreeSet::new()
        };

        BackendStatus {
            selected_backend: self.selected,
            primary_available,
            available_models,
        }
    }
}

fn select(primary_available: bool) -> Backend {
    if primary_available {
        Backend::Primary
    } else {
        Backend::Fallback
    }
}
