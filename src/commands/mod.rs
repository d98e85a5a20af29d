// commands/mod.rs - Command Module Registry
// Every command action takes a CommandContext: the message being handled,
// the session to answer through, and the external APIs.

pub mod basic;          // ping, hello, echo, time, empty content
pub mod fun;            // roll plus the weather/joke/quote API replies
pub mod moderation;     // ban and kick of the first mentioned user
pub mod user;           // avatar and userinfo

use crate::fetch::ExternalApis;
use crate::session::{ChatSession, IncomingMessage};
use log::error;

pub struct CommandContext<'a> {
    pub msg: &'a IncomingMessage,
    pub session: &'a dyn ChatSession,
    pub apis: &'a dyn ExternalApis,
}

impl<'a> CommandContext<'a> {
    pub fn new(
        msg: &'a IncomingMessage,
        session: &'a dyn ChatSession,
        apis: &'a dyn ExternalApis,
    ) -> Self {
        Self { msg, session, apis }
    }

    /// Send `text` to the message's channel. Failures are logged, never retried.
    pub async fn reply(&self, text: &str) {
        if let Err(e) = self.session.send_text(self.msg.channel_id, text).await {
            error!(
                "❌ Failed to send reply to channel {} for user {} ({}): {}",
                self.msg.channel_id, self.msg.author.name, self.msg.author.id, e
            );
        }
    }
}
