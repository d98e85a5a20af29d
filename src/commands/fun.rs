// fun.rs - Dice roll and external API replies
//
// Each API command makes exactly one fetch. Any FetchError collapses to a
// fixed user-facing line; the variant only shows up in the logs.

use super::CommandContext;
use crate::fetch::FetchResult;
use log::warn;
use rand::Rng;

pub const WEATHER_PREFIX: &str = "!weather ";

const WEATHER_FAILED: &str = "Could not fetch weather data.";
const JOKE_FAILED: &str = "Could not fetch a joke.";
const QUOTE_FAILED: &str = "Could not fetch a quote.";

pub async fn weather(ctx: &CommandContext<'_>) {
    let city = ctx
        .msg
        .content
        .strip_prefix(WEATHER_PREFIX)
        .unwrap_or_default();
    let result = ctx.apis.weather(city).await;
    reply_with(ctx, "weather", result, WEATHER_FAILED).await;
}

pub async fn joke(ctx: &CommandContext<'_>) {
    let result = ctx.apis.joke().await;
    reply_with(ctx, "joke", result, JOKE_FAILED).await;
}

pub async fn quote(ctx: &CommandContext<'_>) {
    let result = ctx.apis.quote().await;
    reply_with(ctx, "quote", result, QUOTE_FAILED).await;
}

pub async fn roll(ctx: &CommandContext<'_>) {
    let value = roll_die();
    ctx.reply(&format!("You rolled a {}", value)).await;
}

/// Uniform in 1..=6
pub fn roll_die() -> u8 {
    rand::thread_rng().gen_range(1..=6)
}

async fn reply_with(ctx: &CommandContext<'_>, api: &str, result: FetchResult, failure: &str) {
    match result {
        Ok(line) => ctx.reply(&line).await,
        Err(e) => {
            warn!(
                "⚠️ {} fetch failed for user {} ({}): {}",
                api, ctx.msg.author.name, ctx.msg.author.id, e
            );
            ctx.reply(failure).await;
        }
    }
}
