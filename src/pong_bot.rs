// pong_bot.rs - Discord Client and Event Handler
// Builds the serenity client, routes every message event through the
// dispatcher, and shuts the shards down on SIGINT/SIGTERM.

use crate::config::BotConfig;
use crate::dispatch::Dispatcher;
use crate::fetch::HttpApis;
use crate::session::{IncomingMessage, SerenitySession};
use log::{error, info, warn};
use serenity::{
    async_trait,
    client::{Client, Context, EventHandler},
    model::{channel::Message, gateway::Ready},
    prelude::GatewayIntents,
};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Error creating Discord client: {0}")]
    Client(#[source] serenity::Error),
    #[error("Gateway connection failed: {0}")]
    Gateway(#[source] serenity::Error),
}

// Event handler implementation
struct Handler {
    dispatcher: Dispatcher,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _: Context, ready: Ready) {
        info!("✅ Bot connected as {} (ID: {})", ready.user.name, ready.user.id);
        info!("📊 Connected to {} guilds", ready.guilds.len());
        println!("✅ Bot connected as {}!", ready.user.name);
    }

    async fn message(&self, ctx: Context, msg: Message) {
        let incoming = IncomingMessage::from(&msg);
        // Same HTTP handle the client owns, not a new connection
        let session = SerenitySession::new(ctx.http.clone());
        self.dispatcher.dispatch(&session, &incoming).await;
    }
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("❌ Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("❌ Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("📡 Received SIGINT"),
        _ = terminate => info!("📡 Received SIGTERM"),
    }
}

// Main bot function
pub async fn run(config: BotConfig) -> Result<(), StartupError> {
    if config.apis.weather_api_key.is_none() {
        warn!("⚠️ WEATHER_API_KEY is not set; !weather will always report a failure");
    }

    let dispatcher = Dispatcher::new(Arc::new(HttpApis::new(config.apis.clone())));

    // Message content is needed to match plain-text commands
    let intents = GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(Handler { dispatcher })
        .await
        .map_err(StartupError::Client)?;

    let shard_manager = client.shard_manager.clone();

    println!("🚀 The bot is now running. Press Ctrl+C to exit.");
    tokio::select! {
        _ = shutdown_signal() => {
            println!("\n⏹️ Stopping bot gracefully...");
            shard_manager.lock().await.shutdown_all().await;
        }
        result = client.start() => {
            result.map_err(StartupError::Gateway)?;
        }
    }

    info!("👋 Bot shutdown complete");
    println!("✅ Bot stopped");
    Ok(())
}
