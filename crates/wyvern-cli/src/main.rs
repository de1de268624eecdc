//! Wyvern CLI - talk to the local LLM backends and the clan personas.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

/// Wyvern - local LLM chat with llama.cpp first and Ollama as fallback
#[derive(Parser)]
#[command(name = "wyvern")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show which backend is selected and what llama-server offers
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Send one prompt to the selected backend
    Chat {
        /// User prompt
        prompt: String,
        /// Speak as this clan member (decorates the system prompt)
        #[arg(short, long)]
        member: Option<String>,
        /// Base system prompt
        #[arg(short, long, default_value = "You are a helpful assistant.")]
        system: String,
        /// Model identifier passed to the backend
        #[arg(long)]
        model: Option<String>,
        /// Sampling temperature (0.0 - 2.0)
        #[arg(short, long, default_value_t = 0.7)]
        temperature: f32,
        /// Maximum tokens to generate
        #[arg(long, default_value_t = 2048)]
        max_tokens: u32,
    },

    /// List the models llama-server reports
    Models,

    /// Start llama-server in the background
    Launch {
        /// GGUF model file
        model: PathBuf,
        /// Port to listen on
        #[arg(short, long, default_value_t = wyvern_ai::DEFAULT_LOCAL_AI_PORT)]
        port: u16,
        /// Context size
        #[arg(short = 'c', long, default_value_t = wyvern_ai::DEFAULT_CONTEXT_SIZE)]
        ctx_size: u32,
        /// Layers to offload to the GPU
        #[arg(long, default_value_t = 0)]
        gpu_layers: u32,
        /// llama-server executable
        #[arg(long, default_value = wyvern_ai::DEFAULT_SERVER_BINARY)]
        executable: PathBuf,
        /// Wait up to this many seconds for the server to answer /health
        #[arg(long)]
        wait: Option<u64>,
    },

    /// Inspect the clan personas
    Persona {
        #[command(subcommand)]
        action: PersonaAction,
    },
}

#[derive(Subcommand)]
enum PersonaAction {
    /// List known clan members
    List,
    /// Show one member's persona
    Show {
        /// Member identifier (case-insensitive)
        member: String,
    },
    /// Print a prompt decorated with a member's persona
    Enhance {
        /// Member identifier (case-insensitive)
        member: String,
        /// Base prompt
        prompt: String,
    },
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    match cli.command {
        Commands::Status { json } => block_on(commands::status::run(json)),
        Commands::Chat {
            prompt,
            member,
            system,
            model,
            temperature,
            max_tokens,
        } => block_on(commands::chat::run(commands::chat::ChatArgs {
            prompt,
            member,
            system,
            model,
            temperature,
            max_tokens,
        })),
        Commands::Models => block_on(commands::models::run()),
        Commands::Launch {
            model,
            port,
            ctx_size,
            gpu_layers,
            executable,
            wait,
        } => {
            let options = wyvern_ai::LaunchOptions::new(model)
                .with_executable(executable)
                .with_port(port)
                .with_context_size(ctx_size)
                .with_gpu_layers(gpu_layers);
            block_on(commands::launch::run(options, wait))
        }
        Commands::Persona { action } => match action {
            PersonaAction::List => commands::persona::list(),
            PersonaAction::Show { member } => commands::persona::show(&member),
            PersonaAction::Enhance { member, prompt } => commands::persona::enhance(&member, &prompt),
        },
    }
}

fn block_on<F>(future: F) -> miette::Result<()>
where
    F: std::future::Future<Output = miette::Result<()>>,
{
    tokio::runtime::Runtime::new()
        .map_err(|e| miette::miette!("Failed to start async runtime: {}", e))?
        .block_on(future)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_chat_defaults() {
        let cli = Cli::parse_from(["wyvern", "chat", "hello"]);
        match cli.command {
            Commands::Chat {
                prompt,
                member,
                temperature,
                max_tokens,
                ..
            } => {
                assert_eq!(prompt, "hello");
                assert!(member.is_none());
                assert_eq!(temperature, 0.7);
                assert_eq!(max_tokens, 2048);
            }
            _ => panic!("expected chat"),
        }
    }

    #[test]
    fn test_launch_defaults() {
        let cli = Cli::parse_from(["wyvern", "launch", "models/goliath.gguf", "--gpu-layers", "20"]);
        match cli.command {
            Commands::Launch {
                model,
                port,
                ctx_size,
                gpu_layers,
                executable,
                wait,
            } => {
                assert_eq!(model, PathBuf::from("models/goliath.gguf"));
                assert_eq!(port, 8080);
                assert_eq!(ctx_size, 4096);
                assert_eq!(gpu_layers, 20);
                assert_eq!(executable, PathBuf::from("llama-server"));
                assert!(wait.is_none());
            }
            _ => panic!("expected launch"),
        }
    }

    #[test]
    fn test_persona_enhance_args() {
        let cli = Cli::parse_from(["wyvern", "-v", "persona", "enhance", "Hudson", "Tell a story"]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Persona {
                action: PersonaAction::Enhance { member, prompt },
            } => {
                assert_eq!(member, "Hudson");
                assert_eq!(prompt, "Tell a story");
            }
            _ => panic!("expected persona enhance"),
        }
    }
}
