//! Status command - report backend selection and llama-server models.

use wyvern_ai::{LlmConfig, LocalLlm};

pub(crate) async fn run(json: bool) -> miette::Result<()> {
    let config = LlmConfig::from_env();
    let llm = LocalLlm::connect(&config).await;
    let status = llm.status().await;

    if json {
        let out = serde_json::to_string_pretty(&status)
            .map_err(|e| miette::miette!("Failed to serialize status: {}", e))?;
        println!("{}", out);
        return Ok(());
    }

    println!("Wyvern Local LLM");
    println!("================");
    println!();
    println!("Selected backend: {}", status.selected_backend);
    println!(
        "llama.cpp:        {} ({})",
        if status.primary_available { "available" } else { "unavailable" },
        config.llama_url
    );
    println!(
        "Ollama:           {} (model {})",
        config.ollama_url, config.ollama_model
    );
    println!();

    if status.available_models.is_empty() {
        println!("No llama.cpp models reported.");
    } else {
        println!("llama.cpp models:");
        for model in &status.available_models {
            println!("  - {}", model);
        }
    }

    Ok(())
}
