// ABOUTME: Dispatch loop pulling inbound entries off the session and routing them to handlers
// ABOUTME: Prefix policy, first-match scanning, help fallback, fire-and-forget task spawning

use crate::error::Result;
use crate::outbound::MessageSink;
use crate::registry::CommandRegistry;
use crate::session::EventSource;
use crate::wire::{Event, OutboundMessage};
use std::sync::Arc;

/// Reserved text that triggers the help listing when no command matches.
const HELP_PREFIX: &str = "help";

/// Task-spawning policy for accepted entries.
///
/// `Concurrent` is the production mode: each entry is handled on its own
/// tokio task and the loop returns to waiting immediately. `Inline`
/// awaits each dispatch so tests can assert deterministic ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpawnMode {
    #[default]
    Concurrent,
    Inline,
}

/// The receive loop: filters inbound entries, applies the prefix policy,
/// and invokes at most one matching handler per entry.
pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
    sink: Arc<dyn MessageSink>,
    bot_id: String,
    require_prefix: bool,
    spawn_mode: SpawnMode,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<CommandRegistry>,
        sink: Arc<dyn MessageSink>,
        bot_id: impl Into<String>,
        require_prefix: bool,
    ) -> Self {
        Self {
            registry,
            sink,
            bot_id: bot_id.into(),
            require_prefix,
            spawn_mode: SpawnMode::default(),
        }
    }

    pub fn with_spawn_mode(mut self, mode: SpawnMode) -> Self {
        self.spawn_mode = mode;
        self
    }

    /// The mention prefix a message must open with under prefix enforcement.
    pub fn required_prefix(&self) -> String {
        format!("<@{}> ", self.bot_id)
    }

    /// Run until the source fails.
    ///
    /// Transport errors are returned to the caller, who decides whether
    /// they are fatal. Handler errors never reach here; they are logged
    /// inside the dispatched task.
    pub async fn run<S: EventSource>(&self, source: &mut S) -> Result<()> {
        loop {
            let event = source.next_event().await?;
            self.dispatch(event).await;
        }
    }

    /// Filter one inbound entry and, if accepted, hand it to the registry
    /// scan according to the spawn policy.
    pub async fn dispatch(&self, event: Event) {
        let Some(event) = self.accept(event) else {
            return;
        };

        let registry = Arc::clone(&self.registry);
        let sink = Arc::clone(&self.sink);
        match self.spawn_mode {
            SpawnMode::Concurrent => {
                tokio::spawn(dispatch_entry(registry, sink, event));
            }
            SpawnMode::Inline => dispatch_entry(registry, sink, event).await,
        }
    }

    /// Accept only message-kind entries that satisfy the prefix policy,
    /// stripping a single leading occurrence of the mention prefix.
    ///
    /// A repeated mention later in the text is deliberately left intact.
    fn accept(&self, mut event: Event) -> Option<Event> {
        if event.kind != "message" {
            return None;
        }

        let prefix = self.required_prefix();
        match event.text.strip_prefix(&prefix) {
            Some(stripped) => event.text = stripped.to_string(),
            None if self.require_prefix => {
                tracing::debug!(channel = %event.channel, "dropping message without bot mention");
                return None;
            }
            None => {}
        }
        Some(event)
    }
}

/// Scan the registry in registration order; the first matching command's
/// handler fires and scanning stops. When nothing matches, text starting
/// with the reserved help word gets the generated listing instead.
async fn dispatch_entry(
    registry: Arc<CommandRegistry>,
    sink: Arc<dyn MessageSink>,
    event: Event,
) {
    for command in registry.commands() {
        if command.pattern.is_match(&event.text) {
            tracing::info!(command = %command.name, channel = %event.channel, "dispatching command");
            if let Err(e) = command
                .handler
                .handle(command.clone(), event.clone(), Arc::clone(&sink))
                .await
            {
                tracing::error!(error = %e, command = %command.name, "command handler failed");
            }
            return;
        }
    }

    if event.text.starts_with(HELP_PREFIX) {
        tracing::info!(channel = %event.channel, "generating help listing");
        let reply = OutboundMessage::new(event.channel.clone(), registry.help_text());
        if let Err(e) = sink.send(reply).await {
            tracing::error!(error = %e, "failed to send help listing");
        }
    }
}
