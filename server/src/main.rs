//! Hookwire Server - Main Entry Point
//!
//! Webhook interaction server for the chat platform.

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use hookwire_server::{
    api, config,
    interactions::{ClientBuilder, Command, CommandInteraction},
    rest::RestClient,
};
use hw_common::ResponseData;

/// Built-in command reporting the REST round-trip time.
fn ping_command() -> Command {
    Command::new(
        "ping",
        "Check the latency to the platform API",
        |ctx: CommandInteraction| async move {
            let content = match ctx.rest().latency().await {
                Ok(ms) => format!("Pong! API latency: {ms}ms"),
                Err(e) => {
                    warn!(error = %e, "Latency check failed");
                    "Pong! API latency is unavailable right now.".to_string()
                }
            };

            if let Err(e) = ctx.send_followup(&ResponseData::ephemeral(content)).await {
                error!(error = %e, "Failed to send ping follow-up");
            }
        },
    )
    .allow_dm()
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hookwire_server=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        application_id = %config.application_id,
        "Starting Hookwire Server"
    );

    let rest = RestClient::from_config(&config).context("Failed to build REST client")?;
    let client = ClientBuilder::from_config(&config, rest)
        .context("PUBLIC_KEY is not a valid Ed25519 public key")?
        .register_command(ping_command())?
        .build();

    let bot = client
        .fetch_bot_user()
        .await
        .context("Failed to fetch the bot user (check APPLICATION_ID, BOT_TOKEN and connectivity)")?;
    info!(user_id = %bot.id, username = %bot.username, "Bot user fetched");

    if config.sync_commands {
        client
            .sync_commands(&config.sync_guild_ids, None)
            .await
            .context("Failed to sync commands")?;
    }

    let app = api::create_router(api::AppState::new(client));

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!(address = %config.bind_address, "Server listening");

    // Graceful shutdown handler
    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
        info!("Received shutdown signal, cleaning up...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shutdown complete");

    Ok(())
}
