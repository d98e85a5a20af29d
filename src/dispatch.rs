// dispatch.rs - Command Dispatcher
// Maps one incoming message to zero or more command actions.
//
// Rules are evaluated in table order and are NOT exclusive: every rule whose
// trigger matches fires, each issuing its own reply. There is no fallback
// reply for unmatched content.
//
// Used by: pong_bot.rs (Handler::message)

use crate::commands::{basic, fun, moderation, user, CommandContext};
use crate::fetch::ExternalApis;
use crate::session::{ChatSession, IncomingMessage};
use log::debug;
use std::sync::Arc;

// ============================================================================
// RULE TABLE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Content equals one of the given strings
    Exact(&'static [&'static str]),
    /// Content starts with the prefix
    Prefix(&'static str),
    /// Content starts with the prefix and mentions at least one user
    PrefixWithMention(&'static str),
}

impl Trigger {
    pub fn matches(&self, msg: &IncomingMessage) -> bool {
        match self {
            Trigger::Exact(options) => options.contains(&msg.content.as_str()),
            Trigger::Prefix(prefix) => msg.content.starts_with(prefix),
            Trigger::PrefixWithMention(prefix) => {
                msg.content.starts_with(prefix) && !msg.mentions.is_empty()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    Hello,
    Echo,
    Time,
    Empty,
    Weather,
    Joke,
    Quote,
    Roll,
    Avatar,
    Ban,
    Kick,
    UserInfo,
}

#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub trigger: Trigger,
    pub command: Command,
}

const fn rule(trigger: Trigger, command: Command) -> Rule {
    Rule { trigger, command }
}

pub const RULES: &[Rule] = &[
    rule(Trigger::Exact(&["ping"]), Command::Ping),
    rule(Trigger::Exact(&["hello", "Hello"]), Command::Hello),
    rule(Trigger::Exact(&["!echo"]), Command::Echo),
    rule(Trigger::Exact(&["!time"]), Command::Time),
    rule(Trigger::Exact(&[""]), Command::Empty),
    rule(Trigger::Prefix(fun::WEATHER_PREFIX), Command::Weather),
    rule(Trigger::Prefix("!joke"), Command::Joke),
    rule(Trigger::Prefix("!quote"), Command::Quote),
    rule(Trigger::Prefix("!roll"), Command::Roll),
    rule(Trigger::Prefix("!avatar"), Command::Avatar),
    rule(Trigger::PrefixWithMention("!ban"), Command::Ban),
    rule(Trigger::PrefixWithMention("!kick"), Command::Kick),
    rule(Trigger::Prefix("!userinfo"), Command::UserInfo),
];

// ============================================================================
// DISPATCHER
// ============================================================================

/// Stateless apart from the shared API client, so one instance serves all events.
#[derive(Clone)]
pub struct Dispatcher {
    apis: Arc<dyn ExternalApis>,
    rules: &'static [Rule],
}

impl Dispatcher {
    pub fn new(apis: Arc<dyn ExternalApis>) -> Self {
        Self::with_rules(apis, RULES)
    }

    pub fn with_rules(apis: Arc<dyn ExternalApis>, rules: &'static [Rule]) -> Self {
        Self { apis, rules }
    }

    /// Commands whose rule matches `msg`, in table order.
    pub fn matching_commands(&self, msg: &IncomingMessage) -> Vec<Command> {
        if msg.author.bot {
            return Vec::new();
        }

        self.rules
            .iter()
            .filter(|rule| rule.trigger.matches(msg))
            .map(|rule| rule.command)
            .collect()
    }

    /// Run every matching rule against `session`. Returns how many fired.
    pub async fn dispatch(&self, session: &dyn ChatSession, msg: &IncomingMessage) -> usize {
        let commands = self.matching_commands(msg);
        if commands.is_empty() {
            return 0;
        }

        let ctx = CommandContext::new(msg, session, self.apis.as_ref());
        for command in &commands {
            debug!(
                "🎯 {:?} triggered by {} ({}) in channel {}",
                command, msg.author.name, msg.author.id, msg.channel_id
            );
            execute(*command, &ctx).await;
        }

        commands.len()
    }
}

async fn execute(command: Command, ctx: &CommandContext<'_>) {
    match command {
        Command::Ping => basic::ping(ctx).await,
        Command::Hello => basic::hello(ctx).await,
        Command::Echo => basic::echo(ctx).await,
        Command::Time => basic::time(ctx).await,
        Command::Empty => basic::empty(ctx).await,
        Command::Weather => fun::weather(ctx).await,
        Command::Joke => fun::joke(ctx).await,
        Command::Quote => fun::quote(ctx).await,
        Command::Roll => fun::roll(ctx).await,
        Command::Avatar => user::avatar(ctx).await,
        Command::Ban => moderation::ban(ctx).await,
        Command::Kick => moderation::kick(ctx).await,
        Command::UserInfo => user::userinfo(ctx).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{FetchError, FetchResult};
    use crate::session::tests::message;
    use crate::session::{MentionedUser, SessionError};
    use async_trait::async_trait;
    use regex::Regex;
    use serenity::model::id::{ChannelId, GuildId, UserId};
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Action {
        Send(ChannelId, String),
        Ban(GuildId, UserId, String, u8),
        Remove(GuildId, UserId, String),
    }

    #[derive(Default)]
    struct RecordingSession {
        actions: Mutex<Vec<Action>>,
        fail_moderation: bool,
        fail_sends: bool,
    }

    impl RecordingSession {
        fn failing_moderation() -> Self {
            Self {
                fail_moderation: true,
                ..Self::default()
            }
        }

        fn failing_sends() -> Self {
            Self {
                fail_sends: true,
                ..Self::default()
            }
        }

        fn actions(&self) -> Vec<Action> {
            self.actions.lock().unwrap().clone()
        }

        fn sent(&self) -> Vec<String> {
            self.actions()
                .into_iter()
                .filter_map(|a| match a {
                    Action::Send(_, text) => Some(text),
                    _ => None,
                })
                .collect()
        }

        fn moderation_result(&self) -> Result<(), SessionError> {
            if self.fail_moderation {
                Err(SessionError::Discord(serenity::Error::Other("missing permissions")))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl ChatSession for RecordingSession {
        async fn send_text(&self, channel_id: ChannelId, text: &str) -> Result<(), SessionError> {
            self.actions
                .lock()
                .unwrap()
                .push(Action::Send(channel_id, text.to_string()));
            if self.fail_sends {
                Err(SessionError::Discord(serenity::Error::Other("channel not found")))
            } else {
                Ok(())
            }
        }

        async fn ban_member(
            &self,
            guild_id: GuildId,
            user_id: UserId,
            reason: &str,
            delete_message_days: u8,
        ) -> Result<(), SessionError> {
            self.actions
                .lock()
                .unwrap()
                .push(Action::Ban(guild_id, user_id, reason.to_string(), delete_message_days));
            self.moderation_result()
        }

        async fn remove_member(
            &self,
            guild_id: GuildId,
            user_id: UserId,
            reason: &str,
        ) -> Result<(), SessionError> {
            self.actions
                .lock()
                .unwrap()
                .push(Action::Remove(guild_id, user_id, reason.to_string()));
            self.moderation_result()
        }
    }

    /// Canned API answers; `None` means the fetch fails.
    #[derive(Default)]
    struct StubApis {
        weather: Option<String>,
        joke: Option<String>,
        quote: Option<String>,
        cities: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ExternalApis for StubApis {
        async fn weather(&self, city: &str) -> FetchResult {
            self.cities.lock().unwrap().push(city.to_string());
            self.weather
                .clone()
                .ok_or_else(|| FetchError::NotFound(city.to_string()))
        }

        async fn joke(&self) -> FetchResult {
            self.joke.clone().ok_or(FetchError::MissingField("punchline"))
        }

        async fn quote(&self) -> FetchResult {
            self.quote.clone().ok_or(FetchError::NotConfigured("quote"))
        }
    }

    fn mentioning(content: &str, users: &[(u64, &str)]) -> IncomingMessage {
        let mut msg = message(content);
        msg.mentions = users
            .iter()
            .map(|(id, name)| MentionedUser {
                id: UserId(*id),
                name: name.to_string(),
            })
            .collect();
        msg
    }

    async fn run(apis: StubApis, msg: &IncomingMessage) -> (RecordingSession, usize) {
        let session = RecordingSession::default();
        let fired = Dispatcher::new(Arc::new(apis)).dispatch(&session, msg).await;
        (session, fired)
    }

    #[tokio::test]
    async fn test_ping_replies_pong_once() {
        let (session, fired) = run(StubApis::default(), &message("ping")).await;
        assert_eq!(fired, 1);
        assert_eq!(session.actions(), vec![Action::Send(ChannelId(42), "Pong".to_string())]);
    }

    #[tokio::test]
    async fn test_bot_authors_are_ignored() {
        for content in ["ping", "hello", "!roll", "!userinfo", "", "!weather Paris"] {
            let mut msg = mentioning(content, &[(2002, "bob")]);
            msg.author.bot = true;
            let (session, fired) = run(StubApis::default(), &msg).await;
            assert_eq!(fired, 0);
            assert!(session.actions().is_empty(), "bot message {:?} produced actions", content);
        }
    }

    #[tokio::test]
    async fn test_hello_both_cases() {
        for content in ["hello", "Hello"] {
            let (session, _) = run(StubApis::default(), &message(content)).await;
            assert_eq!(session.sent(), vec!["Hello"]);
        }
        let (session, fired) = run(StubApis::default(), &message("HELLO")).await;
        assert_eq!(fired, 0);
        assert!(session.sent().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_content_is_silent() {
        for content in ["pong", "ping ", "!help", "weather Paris", "!weather", "just chatting"] {
            let (session, fired) = run(StubApis::default(), &message(content)).await;
            assert_eq!(fired, 0, "{:?} should not match", content);
            assert!(session.actions().is_empty());
        }
    }

    #[tokio::test]
    async fn test_empty_content_sends_one_empty_reply() {
        let (session, fired) = run(StubApis::default(), &message("")).await;
        assert_eq!(fired, 1);
        assert_eq!(session.sent(), vec![""]);
    }

    #[tokio::test]
    async fn test_echo_replies_with_content() {
        let (session, _) = run(StubApis::default(), &message("!echo")).await;
        assert_eq!(session.sent(), vec!["!echo"]);
    }

    #[tokio::test]
    async fn test_time_format() {
        let (session, _) = run(StubApis::default(), &message("!time")).await;
        let sent = session.sent();
        assert_eq!(sent.len(), 1);

        let re = Regex::new(r"^Current server time is: \d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}$")
            .unwrap();
        assert!(re.is_match(&sent[0]), "unexpected time reply {:?}", sent[0]);
    }

    #[tokio::test]
    async fn test_weather_success_and_failure() {
        let apis = StubApis {
            weather: Some("Weather in Paris: clear sky, 18.00°C".to_string()),
            ..StubApis::default()
        };
        let session = RecordingSession::default();
        let dispatcher = Dispatcher::new(Arc::new(apis));
        dispatcher.dispatch(&session, &message("!weather Paris")).await;
        assert_eq!(session.sent(), vec!["Weather in Paris: clear sky, 18.00°C"]);

        let (session, _) = run(StubApis::default(), &message("!weather Paris")).await;
        assert_eq!(session.sent(), vec!["Could not fetch weather data."]);
    }

    #[tokio::test]
    async fn test_weather_city_is_text_after_prefix() {
        let apis = Arc::new(StubApis::default());
        let session = RecordingSession::default();
        Dispatcher::new(apis.clone())
            .dispatch(&session, &message("!weather New York"))
            .await;
        assert_eq!(*apis.cities.lock().unwrap(), vec!["New York".to_string()]);
    }

    #[tokio::test]
    async fn test_joke_and_quote_replies() {
        let apis = StubApis {
            joke: Some("Why? - Because.".to_string()),
            quote: Some("Be yourself. - Oscar Wilde".to_string()),
            ..StubApis::default()
        };
        let session = RecordingSession::default();
        let dispatcher = Dispatcher::new(Arc::new(apis));
        dispatcher.dispatch(&session, &message("!joke")).await;
        dispatcher.dispatch(&session, &message("!quote please")).await;
        assert_eq!(session.sent(), vec!["Why? - Because.", "Be yourself. - Oscar Wilde"]);

        let (session, _) = run(StubApis::default(), &message("!joke")).await;
        assert_eq!(session.sent(), vec!["Could not fetch a joke."]);
        let (session, _) = run(StubApis::default(), &message("!quote")).await;
        assert_eq!(session.sent(), vec!["Could not fetch a quote."]);
    }

    #[tokio::test]
    async fn test_roll_is_roughly_uniform() {
        let session = RecordingSession::default();
        let dispatcher = Dispatcher::new(Arc::new(StubApis::default()));
        let msg = message("!roll");
        for _ in 0..600 {
            dispatcher.dispatch(&session, &msg).await;
        }

        let mut counts: HashMap<String, usize> = HashMap::new();
        for text in session.sent() {
            *counts.entry(text).or_default() += 1;
        }

        assert_eq!(counts.len(), 6, "faces seen: {:?}", counts.keys());
        for face in 1..=6 {
            let count = counts[&format!("You rolled a {}", face)];
            // Expected 100 per face; 40..=160 is far outside normal variation
            assert!((40..=160).contains(&count), "face {} rolled {} times", face, count);
        }
    }

    #[tokio::test]
    async fn test_avatar_replies_with_author_avatar() {
        let (session, _) = run(StubApis::default(), &message("!avatar")).await;
        assert_eq!(
            session.sent(),
            vec!["https://cdn.discordapp.com/avatars/1001/abc.webp?size=1024"]
        );
    }

    #[tokio::test]
    async fn test_userinfo_three_lines() {
        let (session, _) = run(StubApis::default(), &message("!userinfo")).await;
        let sent = session.sent();
        assert_eq!(sent.len(), 1);

        let lines: Vec<&str> = sent[0].lines().collect();
        assert_eq!(
            lines,
            vec![
                "Username: alice",
                "ID: 1001",
                "Avatar: https://cdn.discordapp.com/avatars/1001/abc.webp?size=1024",
            ]
        );
    }

    #[tokio::test]
    async fn test_ban_without_mentions_does_nothing() {
        let (session, fired) = run(StubApis::default(), &message("!ban @user")).await;
        assert_eq!(fired, 0);
        assert!(session.actions().is_empty());

        let (session, _) = run(StubApis::default(), &message("!kick @user")).await;
        assert!(session.actions().is_empty());
    }

    #[tokio::test]
    async fn test_ban_first_mention() {
        let msg = mentioning("!ban <@2002> <@3003>", &[(2002, "bob"), (3003, "carol")]);
        let (session, fired) = run(StubApis::default(), &msg).await;
        assert_eq!(fired, 1);
        assert_eq!(
            session.actions(),
            vec![
                Action::Ban(GuildId(7), UserId(2002), "Banned by bot".to_string(), 0),
                Action::Send(ChannelId(42), "User banned successfully.".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_kick_first_mention() {
        let msg = mentioning("!kick <@2002>", &[(2002, "bob")]);
        let (session, _) = run(StubApis::default(), &msg).await;
        assert_eq!(
            session.actions(),
            vec![
                Action::Remove(GuildId(7), UserId(2002), "Kicked by bot".to_string()),
                Action::Send(ChannelId(42), "User kicked successfully.".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_moderation_failures_reply() {
        let dispatcher = Dispatcher::new(Arc::new(StubApis::default()));
        let session = RecordingSession::failing_moderation();

        dispatcher
            .dispatch(&session, &mentioning("!ban <@2002>", &[(2002, "bob")]))
            .await;
        dispatcher
            .dispatch(&session, &mentioning("!kick <@2002>", &[(2002, "bob")]))
            .await;

        assert_eq!(session.sent(), vec!["Failed to ban user.", "Failed to kick user."]);
    }

    #[tokio::test]
    async fn test_moderation_outside_guild_fails() {
        let mut msg = mentioning("!ban <@2002>", &[(2002, "bob")]);
        msg.guild_id = None;
        let (session, _) = run(StubApis::default(), &msg).await;
        assert_eq!(
            session.actions(),
            vec![Action::Send(ChannelId(42), "Failed to ban user.".to_string())]
        );
    }

    #[tokio::test]
    async fn test_failed_send_is_not_retried() {
        let session = RecordingSession::failing_sends();
        let dispatcher = Dispatcher::new(Arc::new(StubApis::default()));

        let fired = dispatcher.dispatch(&session, &message("ping")).await;
        assert_eq!(fired, 1);
        assert_eq!(session.actions(), vec![Action::Send(ChannelId(42), "Pong".to_string())]);

        let fired = dispatcher.dispatch(&session, &message("!joke")).await;
        assert_eq!(fired, 1);
        assert_eq!(session.sent(), vec!["Pong", "Could not fetch a joke."]);
    }

    #[tokio::test]
    async fn test_moderation_runs_before_failed_reply() {
        let session = RecordingSession::failing_sends();
        let dispatcher = Dispatcher::new(Arc::new(StubApis::default()));
        let msg = mentioning("!kick <@2002>", &[(2002, "bob")]);

        let fired = dispatcher.dispatch(&session, &msg).await;
        assert_eq!(fired, 1);
        assert_eq!(
            session.actions(),
            vec![
                Action::Remove(GuildId(7), UserId(2002), "Kicked by bot".to_string()),
                Action::Send(ChannelId(42), "User kicked successfully.".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_send_does_not_stop_later_rules() {
        const TWO_REPLIES: &[Rule] = &[
            rule(Trigger::Prefix("!r"), Command::Ping),
            rule(Trigger::Prefix("!roll"), Command::Hello),
        ];

        let session = RecordingSession::failing_sends();
        let dispatcher = Dispatcher::with_rules(Arc::new(StubApis::default()), TWO_REPLIES);
        let fired = dispatcher.dispatch(&session, &message("!roll")).await;

        assert_eq!(fired, 2);
        assert_eq!(session.sent(), vec!["Pong", "Hello"]);
    }

    #[tokio::test]
    async fn test_overlapping_rules_all_fire() {
        const OVERLAPPING: &[Rule] = &[
            rule(Trigger::Prefix("!"), Command::Ping),
            rule(Trigger::Prefix("!r"), Command::Hello),
            rule(Trigger::Exact(&["!roll"]), Command::Echo),
            rule(Trigger::Prefix("!x"), Command::Time),
        ];

        let session = RecordingSession::default();
        let dispatcher = Dispatcher::with_rules(Arc::new(StubApis::default()), OVERLAPPING);
        let fired = dispatcher.dispatch(&session, &message("!roll")).await;

        assert_eq!(fired, 3);
        assert_eq!(session.sent(), vec!["Pong", "Hello", "!roll"]);
    }

    #[test]
    fn test_default_table_matches_one_rule_per_command() {
        let dispatcher = Dispatcher::new(Arc::new(StubApis::default()));
        let cases = [
            ("ping", Command::Ping),
            ("!echo", Command::Echo),
            ("!time", Command::Time),
            ("!weather Rome", Command::Weather),
            ("!jokes", Command::Joke),
            ("!quote", Command::Quote),
            ("!roll 2d6", Command::Roll),
            ("!avatar", Command::Avatar),
            ("!userinfo", Command::UserInfo),
        ];

        for (content, expected) in cases {
            let matched = dispatcher.matching_commands(&message(content));
            assert_eq!(matched, vec![expected], "{:?}", content);
        }

        let msg = mentioning("!kick <@2002>", &[(2002, "bob")]);
        assert_eq!(dispatcher.matching_commands(&msg), vec![Command::Kick]);
    }
}
