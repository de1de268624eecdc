//! Models command - list what llama-server has loaded.

use wyvern_ai::LlmConfig;

pub(crate) async fn run() -> miette::Result<()> {
    let config = LlmConfig::from_env();
    let client = config.llama_client();

    if !client.probe().await {
        return Err(miette::miette!(
            "llama-server is not reachable at {}. Start it with: wyvern launch <model.gguf>",
            client.base_url()
        ));
    }

    let models = client.list_models().await;
    if models.is_empty() {
        println!("llama-server reported no models.");
        return Ok(());
    }

    println!("Models served by {}:", client.base_url());
    for model in models {
        println!("  - {}", model);
    }

    Ok(())
}
