// user.rs - Author metadata replies
// avatar and userinfo, both built from the message author alone.

use super::CommandContext;

pub async fn avatar(ctx: &CommandContext<'_>) {
    ctx.reply(ctx.msg.avatar_url()).await;
}

pub async fn userinfo(ctx: &CommandContext<'_>) {
    ctx.reply(&user_info(ctx)).await;
}

/// Three lines: username, ID, avatar URL
fn user_info(ctx: &CommandContext<'_>) -> String {
    let author = &ctx.msg.author;
    format!(
        "Username: {}\nID: {}\nAvatar: {}",
        author.name,
        author.id,
        ctx.msg.avatar_url()
    )
}
