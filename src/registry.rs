// ABOUTME: Append-only command registry mapping regex patterns to handlers
// ABOUTME: Scanned in registration order; also generates the help listing

use crate::error::Result;
use crate::outbound::MessageSink;
use crate::wire::Event;
use async_trait::async_trait;
use futures_util::future::BoxFuture;
use regex::Regex;
use std::fmt;
use std::sync::Arc;

/// Handler invoked when an inbound entry matches a command pattern.
///
/// Handler errors are logged by the dispatch loop and never terminate it,
/// so `anyhow::Result` is enough here.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(
        &self,
        command: Command,
        message: Event,
        sink: Arc<dyn MessageSink>,
    ) -> anyhow::Result<()>;
}

/// Adapter so plain async closures can be registered as handlers.
pub struct FnHandler<F>(F);

#[async_trait]
impl<F> CommandHandler for FnHandler<F>
where
    F: Fn(Command, Event, Arc<dyn MessageSink>) -> BoxFuture<'static, anyhow::Result<()>>
        + Send
        + Sync,
{
    async fn handle(
        &self,
        command: Command,
        message: Event,
        sink: Arc<dyn MessageSink>,
    ) -> anyhow::Result<()> {
        (self.0)(command, message, sink).await
    }
}

/// Wrap an async closure as a [`CommandHandler`].
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: Fn(Command, Event, Arc<dyn MessageSink>) -> BoxFuture<'static, anyhow::Result<()>>
        + Send
        + Sync,
{
    FnHandler(f)
}

/// An immutable (pattern, name, description, handler) binding.
#[derive(Clone)]
pub struct Command {
    pub pattern: Regex,
    pub name: String,
    pub description: String,
    pub(crate) handler: Arc<dyn CommandHandler>,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("pattern", &self.pattern.as_str())
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Ordered, append-only collection of commands.
///
/// All registration happens before the dispatch loop starts; the registry
/// then moves behind an `Arc` and is read concurrently without locking.
#[derive(Default)]
pub struct CommandRegistry {
    commands: Vec<Command>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `pattern` and append a new command.
    ///
    /// Fails with [`crate::Error::Pattern`] when the pattern is not a
    /// valid regex; on success the entry is never mutated or removed.
    pub fn register(
        &mut self,
        pattern: &str,
        name: &str,
        description: &str,
        handler: impl CommandHandler + 'static,
    ) -> Result<()> {
        let pattern = Regex::new(pattern)?;
        self.commands.push(Command {
            pattern,
            name: name.to_string(),
            description: description.to_string(),
            handler: Arc::new(handler),
        });
        Ok(())
    }

    /// All commands in registration order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Human-readable listing, one line per command: `` `name`: description ``
    pub fn help_text(&self) -> String {
        let mut help = String::new();
        for command in &self.commands {
            help.push_str(&format!("`{}`: {}\n", command.name, command.description));
        }
        help
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    struct NoopHandler;

    #[async_trait]
    impl CommandHandler for NoopHandler {
        async fn handle(
            &self,
            _command: Command,
            _message: Event,
            _sink: Arc<dyn MessageSink>,
        ) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_registry_starts_empty() {
        let registry = CommandRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_register_appends_in_order() {
        let mut registry = CommandRegistry::new();
        registry.register("test-a", "a", "test a", NoopHandler).unwrap();
        registry.register("test-b", "b", "test b", NoopHandler).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.commands()[0].name, "a");
        assert_eq!(registry.commands()[1].name, "b");
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let mut registry = CommandRegistry::new();
        let err = registry
            .register("(unclosed", "bad", "broken pattern", NoopHandler)
            .unwrap_err();
        assert!(matches!(err, Error::Pattern(_)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_help_text_accumulates_all_commands() {
        let mut registry = CommandRegistry::new();
        registry.register("test-a", "a", "test a", NoopHandler).unwrap();
        registry.register("test-b", "b", "test b", NoopHandler).unwrap();

        let help = registry.help_text();
        assert!(help.contains("`a`: test a\n"));
        assert!(help.contains("`b`: test b\n"));
    }

    #[test]
    fn test_help_text_empty_registry() {
        let registry = CommandRegistry::new();
        assert!(registry.help_text().is_empty());
    }

    #[test]
    fn test_repeated_reads_are_stable() {
        let mut registry = CommandRegistry::new();
        registry.register("^ping", "ping", "reply pong", NoopHandler).unwrap();
        registry.register("^echo", "echo", "repeat text", NoopHandler).unwrap();

        let first: Vec<String> = registry.commands().iter().map(|c| c.name.clone()).collect();
        let second: Vec<String> = registry.commands().iter().map(|c| c.name.clone()).collect();
        assert_eq!(first, second);
        assert_eq!(first, vec!["ping", "echo"]);
    }

    #[test]
    fn test_command_debug_omits_handler() {
        let mut registry = CommandRegistry::new();
        registry.register("^ping", "ping", "reply pong", NoopHandler).unwrap();
        let debug = format!("{:?}", registry.commands()[0]);
        assert!(debug.contains("ping"));
        assert!(debug.contains("reply pong"));
    }
}
