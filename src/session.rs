// session.rs - Gateway Session Adapter
// Wraps the serenity HTTP handle behind a small capability trait so the
// dispatcher only ever sees "send text" and "moderate member".
//
// Used by: pong_bot.rs (event conversion), dispatch.rs, commands/*

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serenity::{
    http::Http,
    model::{
        channel::Message,
        id::{ChannelId, GuildId, UserId},
    },
};
use std::sync::Arc;
use thiserror::Error;

static MENTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<@!?(\d+)>").unwrap());

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Discord API error: {0}")]
    Discord(#[from] serenity::Error),
    #[error("Message was not sent in a guild")]
    NotInGuild,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Author {
    pub id: UserId,
    pub name: String,
    pub bot: bool,
    pub avatar_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MentionedUser {
    pub id: UserId,
    pub name: String,
}

/// One inbound chat message, detached from the gateway event that carried it.
#[derive(Debug, Clone, PartialEq)]
pub struct IncomingMessage {
    pub author: Author,
    pub content: String,
    pub channel_id: ChannelId,
    pub guild_id: Option<GuildId>,
    pub mentions: Vec<MentionedUser>,
}

impl IncomingMessage {
    pub fn avatar_url(&self) -> &str {
        &self.author.avatar_url
    }

    pub fn first_mention(&self) -> Option<&MentionedUser> {
        self.mentions.first()
    }

    /// Content with every `<@id>` / `<@!id>` of a mentioned user turned into `@name`.
    pub fn content_with_mentions_replaced(&self) -> String {
        MENTION_RE
            .replace_all(&self.content, |caps: &Captures| {
                let mentioned = caps[1]
                    .parse::<u64>()
                    .ok()
                    .and_then(|id| self.mentions.iter().find(|m| m.id.0 == id));

                match mentioned {
                    Some(user) => format!("@{}", user.name),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}

impl From<&Message> for IncomingMessage {
    fn from(msg: &Message) -> Self {
        Self {
            author: Author {
                id: msg.author.id,
                name: msg.author.name.clone(),
                bot: msg.author.bot,
                // Custom avatar, or the default one when the user has none
                avatar_url: msg.author.face(),
            },
            content: msg.content.clone(),
            channel_id: msg.channel_id,
            guild_id: msg.guild_id,
            mentions: msg
                .mentions
                .iter()
                .map(|user| MentionedUser {
                    id: user.id,
                    name: user.name.clone(),
                })
                .collect(),
        }
    }
}

/// Outbound capabilities the dispatcher needs from the chat platform.
#[async_trait]
pub trait ChatSession: Send + Sync {
    async fn send_text(&self, channel_id: ChannelId, text: &str) -> Result<(), SessionError>;

    async fn ban_member(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        reason: &str,
        delete_message_days: u8,
    ) -> Result<(), SessionError>;

    async fn remove_member(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        reason: &str,
    ) -> Result<(), SessionError>;
}

/// `ChatSession` backed by the client's shared HTTP handle.
#[derive(Clone)]
pub struct SerenitySession {
    http: Arc<Http>,
}

impl SerenitySession {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ChatSession for SerenitySession {
    async fn send_text(&self, channel_id: ChannelId, text: &str) -> Result<(), SessionError> {
        channel_id.say(&self.http, text).await?;
        Ok(())
    }

    async fn ban_member(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        reason: &str,
        delete_message_days: u8,
    ) -> Result<(), SessionError> {
        guild_id
            .ban_with_reason(&self.http, user_id, delete_message_days, reason)
            .await?;
        Ok(())
    }

    async fn remove_member(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        reason: &str,
    ) -> Result<(), SessionError> {
        guild_id.kick_with_reason(&self.http, user_id, reason).await?;
        Ok(())
    }
}
