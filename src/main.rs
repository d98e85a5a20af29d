mod commands;
mod config;
mod dispatch;
mod fetch;
mod pong_bot;
mod session;

use crate::config::{BotConfig, ConfigSources};
use std::process::ExitCode;

const DEFAULT_LOG_FILTER: &str = "info";

#[tokio::main]
async fn main() -> ExitCode {
    // botconfig.txt is read first so a RUST_LOG line there reaches the logger
    let sources = ConfigSources::discover();
    let log_filter = sources.log_filter();

    // Initialize logger - must be done before any logging calls
    env_logger::Builder::new()
        .parse_filters(log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER))
        .format_timestamp_secs()
        .init();

    log::info!("🚀 Pong Bot starting up...");

    let config = match BotConfig::load(&sources) {
        Ok(config) => {
            match config.source {
                Some(path) => println!("✅ Configuration loaded from {} and environment", path),
                None => println!("✅ Configuration loaded from environment"),
            }
            config
        }
        Err(error) => {
            log::error!("❌ Failed to load configuration: {}", error);
            eprintln!("❌ {}", error);
            eprintln!(
                "Set DISCORD_TOKEN in the environment or in a botconfig.txt file \
                (DISCORD_TOKEN=your_token_here)"
            );
            return ExitCode::FAILURE;
        }
    };

    if let Err(error) = pong_bot::run(config).await {
        log::error!("❌ {}", error);
        eprintln!("❌ {}", error);
        eprintln!("Check DISCORD_TOKEN and network connectivity");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
