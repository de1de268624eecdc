//! HTTP client for llama-server's OpenAI-compatible API.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::LocalAIError;
use crate::types::{ChatMessage, Completion, CompletionRequest};
use crate::DEFAULT_PORT;

/// Outcome of a primary completion call.
pub type CompletionResult = Result<Completion, LocalAIError>;

/// Per-operation timeouts for [`LlamaCppClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientTimeouts {
    /// Health probe.
    pub probe: Duration,
    /// Chat completion.
    pub request: Duration,
    /// Model listing.
    pub models: Duration,
}

impl Default for ClientTimeouts {
    fn default() -> Self {
        Self {
            probe: Duration::from_secs(2),
            request: Duration::from_secs(60),
            models: Duration::from_secs(5),
        }
    }
}

/// Client for communicating with llama-server.
#[derive(Debug, Clone)]
pub struct LlamaCppClient {
    client: reqwest::Client,
    base_url: String,
    timeouts: ClientTimeouts,
}

/// OpenAI-compatible chat completion request.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
}

/// OpenAI-compatible chat completion response.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct Usage {
    completion_tokens: Option<u32>,
}

/// One server-sent event of a streamed completion.
#[derive(Debug, Deserialize)]
struct ChatCompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

impl LlamaCppClient {
    /// Create a new client with default URL (localhost:8080).
    pub fn new() -> Self {
        Self::with_url(format!("http://localhost:{}", DEFAULT_PORT))
    }

    /// Create a new client with a custom URL.
    pub fn with_url(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeouts: ClientTimeouts::default(),
        }
    }

    /// Create a new client with a custom port on localhost.
    pub fn with_port(port: u16) -> Self {
        Self::with_url(format!("http://localhost:{}", port))
    }

    /// Replace the per-operation timeouts.
    pub fn with_timeouts(mut self, timeouts: ClientTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeouts(&self) -> ClientTimeouts {
        self.timeouts
    }

    /// Check whether the server answers its health endpoint.
    ///
    /// Never fails: any network or protocol problem reads as "not available".
    pub async fn probe(&self) -> bool {
        match self.check_health().await {
            Ok(()) => true,
            Err(e) => {
                debug!("llama-server probe failed: {}", e);
                false
            }
        }
    }

    /// Check if the server is running and healthy.
    pub async fn check_health(&self) -> Result<(), LocalAIError> {
        let url = format!("{}/health", self.base_url);

        let response = self
            .client
            .get(&url)
            .timeout(self.timeouts.probe)
            .send()
            .await
            .map_err(|e| self.connect_error(e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(LocalAIError::ServerNotRunning(self.base_url.clone()))
        }
    }

    /// Send a chat completion request to the server.
    ///
    /// Uses the OpenAI-compatible `/v1/chat/completions` endpoint. Failures
    /// come back as `Err`; this method never panics on a bad reply.
    pub async fn complete(&self, request: &CompletionRequest) -> CompletionResult {
        request.validate()?;

        let body = ChatCompletionRequest {
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: request.stream,
            model: request.model.as_deref(),
        };

        let url = format!("{}/v1/chat/completions", self.base_url);
        debug!(
            "POST {} ({} messages, stream={})",
            url,
            request.messages.len(),
            request.stream
        );

        let start = Instant::now();

        let response = self
            .client
            .post(&url)
            .timeout(self.timeouts.request)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.connect_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(LocalAIError::Api(format!("{}: {}", status, text)));
        }

        let (text, tokens_generated) = if request.stream {
            let raw = response.text().await?;
            parse_event_stream(&raw)?
        } else {
            let raw = response.text().await?;
            parse_completion(&raw)?
        };

        Ok(Completion {
            text,
            tokens_generated,
            generation_time: start.elapsed(),
        })
    }

    /// List the models the server reports. Empty on any failure.
    pub async fn list_models(&self) -> BTreeSet<String> {
        match self.fetch_models().await {
            Ok(models) => models,
            Err(e) => {
                warn!("Could not list llama-server models: {}", e);
                BTreeSet::new()
            }
        }
    }

    async fn fetch_models(&self) -> Result<BTreeSet<String>, LocalAIError> {
        let url = format!("{}/v1/models", self.base_url);

        let response = self
            .client
            .get(&url)
            .timeout(self.timeouts.models)
            .send()
            .await
            .map_err(|e| self.connect_error(e))?;

        if !response.status().is_success() {
            return Err(LocalAIError::Api(format!("{}", response.status())));
        }

        let models: ModelsResponse = serde_json::from_str(&response.text().await?)?;
        Ok(models.data.into_iter().map(|m| m.id).collect())
    }

    fn connect_error(&self, e: reqwest::Error) -> LocalAIError {
        if e.is_connect() {
            LocalAIError::ServerNotRunning(self.base_url.clone())
        } else {
            LocalAIError::Http(e)
        }
    }
}

impl Default for LlamaCppClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Pull the reply text and completion token count out of a JSON body.
fn parse_completion(raw: &str) -> Result<(String, u32), LocalAIError> {
    let completion: ChatCompletionResponse = serde_json::from_str(raw)?;
    let tokens = completion
        .usage
        .and_then(|u| u.completion_tokens)
        .unwrap_or(0);

    let text = completion
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .ok_or_else(|| LocalAIError::Api("No completion returned".to_string()))?;

    Ok((text, tokens))
}

/// Accumulate a server-sent event stream into one reply.
///
/// Token count comes from the last chunk carrying `usage`; without one it
/// falls back to the number of content-bearing chunks.
fn parse_event_stream(raw: &str) -> Result<(String, u32), LocalAIError> {
    let mut text = String::new();
    let mut content_chunks = 0u32;
    let mut reported = None;
    let mut saw_chunk = false;

    for line in raw.lines() {
        let Some(data) = line.trim().strip_prefix("data:") else {
            continue;
        };
        let data = data.trim();
        if data == "[DONE]" {
            break;
        }

        let chunk: ChatCompletionChunk = serde_json::from_str(data)?;
        saw_chunk = true;

        if let Some(tokens) = chunk.usage.and_then(|u| u.completion_tokens) {
            reported = Some(tokens);
        }
        if let Some(content) = chunk.choices.into_iter().next().and_then(|c| c.delta.content) {
            if !content.is_empty() {
                content_chunks += 1;
                text.push_str(&content);
            }
        }
    }

    if !saw_chunk {
        return Err(LocalAIError::Api("Empty completion stream".to_string()));
    }

    Ok((text, reported.unwrap_or(content_chunks)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub::{unreachable_url, Reply, StubServer};
    use crate::types::Role;

    fn hello_request() -> CompletionRequest {
        CompletionRequest::new(vec![
            ChatMessage::system("be brief"),
            ChatMessage::user("hello"),
        ])
    }

    #[test]
    fn test_default_url() {
        let client = LlamaCppClient::new();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_custom_url() {
        let client = LlamaCppClient::with_url("http://192.168.1.100:8080/");
        assert_eq!(client.base_url(), "http://192.168.1.100:8080");
    }

    #[test]
    fn test_custom_port() {
        let client = LlamaCppClient::with_port(9000);
        assert_eq!(client.base_url(), "http://localhost:9000");
    }

    #[test]
    fn test_default_timeouts() {
        let timeouts = LlamaCppClient::new().timeouts();
        assert_eq!(timeouts.probe, Duration::from_secs(2));
        assert_eq!(timeouts.request, Duration::from_secs(60));
        assert_eq!(timeouts.models, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_probe_healthy_server() {
        let server = StubServer::start(vec![("GET /health", Reply::json(200, r#"{"status":"ok"}"#))]).await;
        let client = LlamaCppClient::with_url(&server.url);
        assert!(client.probe().await);
    }

    #[tokio::test]
    async fn test_probe_unhealthy_status() {
        let server = StubServer::start(vec![(
            "GET /health",
            Reply::json(503, r#"{"error":"loading model"}"#),
        )])
        .await;
        let client = LlamaCppClient::with_url(&server.url);
        assert!(!client.probe().await);
    }

    #[tokio::test]
    async fn test_probe_unreachable() {
        let client = LlamaCppClient::with_url(unreachable_url().await);
        assert!(!client.probe().await);
    }

    #[tokio::test]
    async fn test_complete_extracts_text_and_tokens() {
        let server = StubServer::start(vec![(
            "POST /v1/chat/completions",
            Reply::json(
                200,
                r#"{"choices":[{"message":{"content":"hi"}}],"usage":{"completion_tokens":3}}"#,
            ),
        )])
        .await;
        let client = LlamaCppClient::with_url(&server.url);

        let completion = client.complete(&hello_request()).await.unwrap();
        assert_eq!(completion.text, "hi");
        assert_eq!(completion.tokens_generated, 3);
    }

    #[tokio::test]
    async fn test_complete_request_body() {
        let server = StubServer::start(vec![(
            "POST /v1/chat/completions",
            Reply::json(200, r#"{"choices":[{"message":{"content":"ok"}}]}"#),
        )])
        .await;
        let client = LlamaCppClient::with_url(&server.url);

        client.complete(&hello_request()).await.unwrap();
        let body = server.body_of("POST /v1/chat/completions");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hello");
        assert_eq!(body["max_tokens"], 2048);
        assert_eq!(body["stream"], false);
        assert!(body.get("model").is_none());

        let request = hello_request().with_model("qwen2.5-7b");
        client.complete(&request).await.unwrap();
        let recorded = server.requests();
        let last: serde_json::Value = serde_json::from_str(&recorded.last().unwrap().body).unwrap();
        assert_eq!(last["model"], "qwen2.5-7b");
    }

    #[tokio::test]
    async fn test_complete_missing_usage_defaults_to_zero() {
        let server = StubServer::start(vec![(
            "POST /v1/chat/completions",
            Reply::json(200, r#"{"choices":[{"message":{"role":"assistant","content":"hello"}}]}"#),
        )])
        .await;
        let client = LlamaCppClient::with_url(&server.url);

        let completion = client.complete(&hello_request()).await.unwrap();
        assert_eq!(completion.text, "hello");
        assert_eq!(completion.tokens_generated, 0);
    }

    #[tokio::test]
    async fn test_complete_null_usage_defaults_to_zero() {
        let server = StubServer::start(vec![(
            "POST /v1/chat/completions",
            Reply::json(
                200,
                r#"{"choices":[{"message":{"content":"hello"}}],"usage":{"completion_tokens":null}}"#,
            ),
        )])
        .await;
        let client = LlamaCppClient::with_url(&server.url);

        let completion = client.complete(&hello_request()).await.unwrap();
        assert_eq!(completion.text, "hello");
        assert_eq!(completion.tokens_generated, 0);
    }

    #[tokio::test]
    async fn test_complete_reply_starting_with_error_is_ok() {
        let server = StubServer::start(vec![(
            "POST /v1/chat/completions",
            Reply::json(200, r#"{"choices":[{"message":{"content":"Error: is a fine word"}}]}"#),
        )])
        .await;
        let client = LlamaCppClient::with_url(&server.url);

        let result = client.complete(&hello_request()).await;
        assert_eq!(result.unwrap().text, "Error: is a fine word");
    }

    #[tokio::test]
    async fn test_complete_connection_refused() {
        let client = LlamaCppClient::with_url(unreachable_url().await);

        let result = client.complete(&hello_request()).await;
        assert!(matches!(result, Err(LocalAIError::ServerNotRunning(_))));

        let legacy = Completion::flatten(result);
        assert!(legacy.text.starts_with("Error: "));
        assert_eq!(legacy.tokens_generated, 0);
        assert_eq!(legacy.generation_time, Duration::ZERO);
    }

    #[tokio::test]
    async fn test_complete_malformed_body() {
        let server = StubServer::start(vec![(
            "POST /v1/chat/completions",
            Reply::json(200, r#"{"result":"not openai"}"#),
        )])
        .await;
        let client = LlamaCppClient::with_url(&server.url);

        let result = client.complete(&hello_request()).await;
        assert!(matches!(result, Err(LocalAIError::Json(_))));
    }

    #[tokio::test]
    async fn test_complete_no_choices() {
        let server = StubServer::start(vec![(
            "POST /v1/chat/completions",
            Reply::json(200, r#"{"choices":[]}"#),
        )])
        .await;
        let client = LlamaCppClient::with_url(&server.url);

        let result = client.complete(&hello_request()).await;
        assert!(matches!(result, Err(LocalAIError::Api(_))));
    }

    #[tokio::test]
    async fn test_complete_server_error_status() {
        let server = StubServer::start(vec![(
            "POST /v1/chat/completions",
            Reply::json(500, r#"{"error":"out of memory"}"#),
        )])
        .await;
        let client = LlamaCppClient::with_url(&server.url);

        match client.complete(&hello_request()).await {
            Err(LocalAIError::Api(msg)) => assert!(msg.contains("out of memory")),
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_complete_rejects_invalid_request_without_sending() {
        let server = StubServer::start(vec![]).await;
        let client = LlamaCppClient::with_url(&server.url);

        let result = client.complete(&CompletionRequest::new(vec![])).await;
        assert!(matches!(result, Err(LocalAIError::InvalidRequest(_))));
        assert!(server.requests().is_empty());
    }

    #[tokio::test]
    async fn test_complete_streamed_reply() {
        let events = concat!(
            "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"Stone \"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"by day\"}}]}\n\n",
            "data: [DONE]\n\n",
        );
        let server = StubServer::start(vec![(
            "POST /v1/chat/completions",
            Reply::event_stream(events),
        )])
        .await;
        let client = LlamaCppClient::with_url(&server.url);

        let completion = client
            .complete(&hello_request().with_stream(true))
            .await
            .unwrap();
        assert_eq!(completion.text, "Stone by day");
        assert_eq!(completion.tokens_generated, 2);
        assert_eq!(server.body_of("POST /v1/chat/completions")["stream"], true);
    }

    #[test]
    fn test_event_stream_prefers_reported_usage() {
        let events = concat!(
            "data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\n",
            "data: {\"choices\":[],\"usage\":{\"completion_tokens\":7}}\n",
            "data: [DONE]\n",
        );
        let (text, tokens) = parse_event_stream(events).unwrap();
        assert_eq!(text, "a");
        assert_eq!(tokens, 7);
    }

    #[test]
    fn test_event_stream_null_usage_counts_chunks() {
        let events = concat!(
            "data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"b\"}}],\"usage\":{\"completion_tokens\":null}}\n",
            "data: [DONE]\n",
        );
        let (text, tokens) = parse_event_stream(events).unwrap();
        assert_eq!(text, "ab");
        assert_eq!(tokens, 2);
    }

    #[test]
    fn test_event_stream_without_events_is_error() {
        assert!(parse_event_stream(": keep-alive\n").is_err());
    }

    #[tokio::test]
    async fn test_list_models() {
        let server = StubServer::start(vec![(
            "GET /v1/models",
            Reply::json(
                200,
                r#"{"object":"list","data":[{"id":"qwen2.5-7b.gguf"},{"id":"llama-3.2-3b.gguf"}]}"#,
            ),
        )])
        .await;
        let client = LlamaCppClient::with_url(&server.url);

        let models = client.list_models().await;
        assert_eq!(models.len(), 2);
        assert!(models.contains("qwen2.5-7b.gguf"));
        assert!(models.contains("llama-3.2-3b.gguf"));
    }

    #[tokio::test]
    async fn test_list_models_unreachable_is_empty() {
        let client = LlamaCppClient::with_url(unreachable_url().await);
        assert!(client.list_models().await.is_empty());
    }

    #[tokio::test]
    async fn test_list_models_bad_body_is_empty() {
        let server = StubServer::start(vec![("GET /v1/models", Reply::json(200, "not json"))]).await;
        let client = LlamaCppClient::with_url(&server.url);
        assert!(client.list_models().await.is_empty());
    }

    #[test]
    fn test_request_body_serialization() {
        let messages = vec![ChatMessage::new(Role::User, "hi")];
        let body = ChatCompletionRequest {
            messages: &messages,
            temperature: 0.5,
            max_tokens: 16,
            stream: false,
            model: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["temperature"], 0.5);
        assert!(json.get("model").is_none());
    }
}
