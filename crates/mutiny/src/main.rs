//! Basic client entry point
//!
//! Run with:
//! ```bash
//! MUTINY_BOT_TOKEN=... cargo run -p mutiny --bin mutiny-basic-client
//! ```
//!
//! Configuration is loaded from environment variables.

use mutiny::events::{MessageEvent, ReadyEvent};
use mutiny::{try_init_tracing, Client};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = try_init_tracing() {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run().await {
        error!(error = %e, "Client stopped");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let client = Client::from_env().map_err(|e| {
        error!(error = %e, "Failed to load configuration");
        e
    })?;

    info!(api_url = %client.config().api_url, "Starting client");

    let state = client.state().clone();
    client.add_listener(move |event: ReadyEvent| {
        let state = state.clone();
        async move {
            let (servers, channels, users) =
                state.with(|s| (s.server_count(), s.channel_count(), s.user_count()));
            info!(servers, channels, users, "Ready");
            tracing::debug!(payload = %event.raw(), "Ready payload");
            Ok(())
        }
    });

    client.add_listener(|event: MessageEvent| async move {
        info!(
            message_id = %event.message.id,
            channel_id = %event.message.channel_id,
            payload = %event.raw(),
            "Message"
        );
        Ok(())
    });

    tokio::select! {
        result = client.start() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, closing");
            client.close().await?;
        }
    }

    Ok(())
}
