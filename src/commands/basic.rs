// basic.rs - Static and metadata replies
// ping, hello, echo, time and the empty-content reply.

use super::CommandContext;
use chrono::Local;

pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub async fn ping(ctx: &CommandContext<'_>) {
    ctx.reply("Pong").await;
}

pub async fn hello(ctx: &CommandContext<'_>) {
    ctx.reply("Hello").await;
}

/// Echo the content back with mentions shown as display names
pub async fn echo(ctx: &CommandContext<'_>) {
    let content = ctx.msg.content_with_mentions_replaced();
    ctx.reply(&content).await;
}

pub async fn time(ctx: &CommandContext<'_>) {
    let now = Local::now().format(TIME_FORMAT).to_string();
    ctx.reply(&format!("Current server time is: {}", now)).await;
}

/// The platform rejects empty messages; the failed send is logged by `reply`.
pub async fn empty(ctx: &CommandContext<'_>) {
    ctx.reply("").await;
}
