//! # Wyvern local LLM
//!
//! Chat with whichever local inference server is running, and dress prompts
//! up as members of the clan.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐
//! │  enhance()      │ --> │    LocalLlm     │ --> │  llama-server   │
//! │  (persona)      │     │  chat / status  │     │  (primary)      │
//! └─────────────────┘     └─────────────────┘     └─────────────────┘
//!                               │
//!                         ┌─────┴─────┐
//!                         │  Ollama   │
//!                         │ (fallback)│
//!                         └───────────┘
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use wyvern_ai::{enhance, ChatMessage, ChatOptions, LlmConfig, LocalLlm};
//!
//! let llm = LocalLlm::connect(&LlmConfig::from_env()).await;
//! let system = enhance("Audit the firewall rules.", "xanatos");
//! let reply = llm
//!     .chat(
//!         vec![ChatMessage::system(system), ChatMessage::user("Start with port 22.")],
//!         ChatOptions::default(),
//!     )
//!     .await?;
//! ```

mod config;
mod ollama;
pub mod persona;
mod prompt;
mod router;

pub use config::{LlmConfig, LlmConfigBuilder};
pub use ollama::{OllamaClient, OllamaError, DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_URL};
pub use persona::PersonaEntry;
pub use prompt::{enhance, CLOSING_REMINDER};
pub use router::{Backend, BackendStatus, ChatOptions, LlmError, LocalLlm};

// Re-export local AI types
pub use wyvern_local_ai::{
    ChatMessage, ClientTimeouts, Completion, CompletionRequest, CompletionResult, LaunchOptions,
    LlamaCppClient, LlamaCppServer, LocalAIError, RequestError, Role, ServerHandle,
    DEFAULT_CONTEXT_SIZE, DEFAULT_PORT as DEFAULT_LOCAL_AI_PORT, DEFAULT_SERVER_BINARY,
};
