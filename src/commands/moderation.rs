// moderation.rs - Ban and kick
// Acts on the first mentioned user in the guild the message came from.
// The rule table only routes here when at least one user is mentioned.

use super::CommandContext;
use crate::session::{MentionedUser, SessionError};
use log::{error, info};

pub const BAN_REASON: &str = "Banned by bot";
pub const KICK_REASON: &str = "Kicked by bot";

pub async fn ban(ctx: &CommandContext<'_>) {
    let Some(target) = ctx.msg.first_mention() else {
        return;
    };

    match try_ban(ctx, target).await {
        Ok(()) => {
            info!(
                "🔨 {} ({}) banned {} ({})",
                ctx.msg.author.name, ctx.msg.author.id, target.name, target.id
            );
            ctx.reply("User banned successfully.").await;
        }
        Err(e) => {
            error!("❌ Failed to ban {} ({}): {}", target.name, target.id, e);
            ctx.reply("Failed to ban user.").await;
        }
    }
}

pub async fn kick(ctx: &CommandContext<'_>) {
    let Some(target) = ctx.msg.first_mention() else {
        return;
    };

    match try_kick(ctx, target).await {
        Ok(()) => {
            info!(
                "👢 {} ({}) kicked {} ({})",
                ctx.msg.author.name, ctx.msg.author.id, target.name, target.id
            );
            ctx.reply("User kicked successfully.").await;
        }
        Err(e) => {
            error!("❌ Failed to kick {} ({}): {}", target.name, target.id, e);
            ctx.reply("Failed to kick user.").await;
        }
    }
}

async fn try_ban(ctx: &CommandContext<'_>, target: &MentionedUser) -> Result<(), SessionError> {
    let guild_id = ctx.msg.guild_id.ok_or(SessionError::NotInGuild)?;
    ctx.session.ban_member(guild_id, target.id, BAN_REASON, 0).await
}

async fn try_kick(ctx: &CommandContext<'_>, target: &MentionedUser) -> Result<(), SessionError> {
    let guild_id = ctx.msg.guild_id.ok_or(SessionError::NotInGuild)?;
    ctx.session.remove_member(guild_id, target.id, KICK_REASON).await
}
