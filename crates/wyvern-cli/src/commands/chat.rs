//! Chat command - one prompt, one reply, through whichever backend is up.

use wyvern_ai::{enhance, persona, ChatMessage, ChatOptions, LlmConfig, LocalLlm};

pub(crate) struct ChatArgs {
    pub prompt: String,
    pub member: Option<String>,
    pub system: String,
    pub model: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
}

pub(crate) async fn run(args: ChatArgs) -> miette::Result<()> {
    if let Some(member) = &args.member {
        if !persona::is_known(member) {
            tracing::warn!("Unknown clan member '{}', using a generic persona", member);
        }
    }

    let messages = build_messages(&args);
    let options = ChatOptions {
        model: args.model,
        temperature: args.temperature,
        max_tokens: args.max_tokens,
    };

    let llm = LocalLlm::connect(&LlmConfig::from_env()).await;
    tracing::info!("Using {} backend", llm.selected_backend());

    let reply = llm
        .chat(messages, options)
        .await
        .map_err(|e| miette::miette!("{}", e))?;

    println!("{}", reply);
    Ok(())
}

/// System message (persona-decorated when a member is given), then the prompt.
fn build_messages(args: &ChatArgs) -> Vec<ChatMessage> {
    let system = match &args.member {
        Some(member) => enhance(&args.system, member),
        None => args.system.clone(),
    };

    vec![ChatMessage::system(system), ChatMessage::user(args.prompt.clone())]
}
