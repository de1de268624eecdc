//! Local AI backend for Wyvern using llama.cpp.
//!
//! This crate talks to a locally running `llama-server` through its
//! OpenAI-compatible HTTP API and can spawn that server as a child process.
//! The chat types defined here are shared with the fallback backend in
//! `wyvern-ai`.

mod client;
mod error;
mod server;
mod types;

#[cfg(any(test, feature = "test-util"))]
pub mod stub;

pub use client::{ClientTimeouts, CompletionResult, LlamaCppClient};
pub use error::{LocalAIError, RequestError};
pub use server::{LaunchOptions, LlamaCppServer, ServerHandle};
pub use types::{ChatMessage, Completion, CompletionRequest, Role};

/// Default port for the local llama-server instance.
pub const DEFAULT_PORT: u16 = 8080;

/// Default llama-server executable name, resolved through `PATH`.
pub const DEFAULT_SERVER_BINARY: &str = "llama-server";

/// Default context size passed to llama-server.
pub const DEFAULT_CONTEXT_SIZE: u32 = 4096;
