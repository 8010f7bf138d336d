// ABOUTME: Bot context object owning config and command registry
// ABOUTME: Wires session, outbound sender, and dispatcher together and runs the loop

use crate::api::ApiClient;
use crate::config::BotConfig;
use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::registry::{CommandHandler, CommandRegistry};
use crate::session::Session;
use std::sync::Arc;

/// One bot instance: configuration plus its command registry.
///
/// Registration happens before [`Bot::run`]; `run` consumes the bot and
/// moves the registry behind an `Arc`, so the registry can never be
/// mutated while dispatches are in flight.
pub struct Bot {
    config: BotConfig,
    registry: CommandRegistry,
}

impl Bot {
    pub fn new(config: BotConfig) -> Self {
        Self {
            config,
            registry: CommandRegistry::new(),
        }
    }

    /// Register a command. Fails with [`crate::Error::Pattern`] when the
    /// pattern text is not a valid regex.
    pub fn command(
        &mut self,
        pattern: &str,
        name: &str,
        description: &str,
        handler: impl CommandHandler + 'static,
    ) -> Result<()> {
        self.registry.register(pattern, name, description, handler)
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Client for the auxiliary Web API operations, sharing this bot's
    /// token and base URL.
    pub fn api(&self) -> ApiClient {
        ApiClient::new(&self.config)
    }

    /// Connect and run the dispatch loop until the transport fails.
    ///
    /// The returned error is the caller's decision to treat as fatal or
    /// not; the loop itself never panics on transport problems.
    pub async fn run(self) -> Result<()> {
        let mut session = Session::connect(&self.config).await?;
        let outbound = session.outbound();
        let dispatcher = Dispatcher::new(
            Arc::new(self.registry),
            Arc::new(outbound),
            session.bot_id().to_string(),
            self.config.require_prefix,
        );

        tracing::info!("bot ready, hit ^C to exit");
        dispatcher.run(&mut session).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::handler_fn;
    use futures_util::FutureExt;

    #[test]
    fn test_bot_starts_with_empty_registry() {
        let bot = Bot::new(BotConfig::new("xoxb-test"));
        assert!(bot.registry().is_empty());
    }

    #[test]
    fn test_command_registration() {
        let mut bot = Bot::new(BotConfig::new("xoxb-test"));
        bot.command(
            "^ping",
            "ping",
            "reply with pong",
            handler_fn(|_cmd, _msg, _sink| async { anyhow::Ok(()) }.boxed()),
        )
        .unwrap();
        bot.command(
            "^echo",
            "echo",
            "repeat the text",
            handler_fn(|_cmd, _msg, _sink| async { anyhow::Ok(()) }.boxed()),
        )
        .unwrap();

        assert_eq!(bot.registry().len(), 2);
        assert_eq!(bot.registry().commands()[0].name, "ping");
    }

    #[test]
    fn test_invalid_command_pattern_rejected() {
        let mut bot = Bot::new(BotConfig::new("xoxb-test"));
        let result = bot.command(
            "(unclosed",
            "bad",
            "broken",
            handler_fn(|_cmd, _msg, _sink| async { anyhow::Ok(()) }.boxed()),
        );
        assert!(result.is_err());
        assert!(bot.registry().is_empty());
    }
}
