//! Launch command - start llama-server and optionally wait for it.

use std::time::{Duration, Instant};

use wyvern_ai::{LaunchOptions, LlamaCppClient, LlamaCppServer};

const POLL_INTERVAL: Duration = Duration::from_millis(500);

pub(crate) async fn run(options: LaunchOptions, wait_secs: Option<u64>) -> miette::Result<()> {
    let handle = LlamaCppServer::launch(&options).map_err(|e| miette::miette!("{}", e))?;

    println!(
        "Started {} (PID {}) on port {}",
        options.executable.display(),
        handle.id(),
        handle.port()
    );

    let Some(secs) = wait_secs else {
        println!("The server loads its model in the background; check it with: wyvern status");
        return Ok(());
    };

    let client = handle.client();
    if wait_ready(&client, Duration::from_secs(secs)).await {
        println!("llama-server is ready at {}", client.base_url());
        Ok(())
    } else {
        Err(miette::miette!(
            "llama-server did not answer {}/health within {}s",
            client.base_url(),
            secs
        ))
    }
}

/// Poll the health endpoint until it answers or `timeout` passes.
async fn wait_ready(client: &LlamaCppClient, timeout: Duration) -> bool {
    let start = Instant::now();

    loop {
        if client.probe().await {
            return true;
        }
        if start.elapsed() >= timeout {
            return false;
        }
        tracing::debug!("llama-server not ready yet");
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}
