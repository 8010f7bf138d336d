// ABOUTME: Minimal framework for chat bots over the Slack RTM streaming API
// ABOUTME: Command registry, concurrent dispatch loop, outbound sender, and Web API client

pub mod api;
pub mod bot;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod outbound;
pub mod registry;
pub mod session;
pub mod wire;

// Re-export the surface a bot author touches
pub use api::ApiClient;
pub use bot::Bot;
pub use config::BotConfig;
pub use dispatch::{Dispatcher, SpawnMode};
pub use error::{Error, Result};
pub use outbound::{MessageSink, Outbound};
pub use registry::{handler_fn, Command, CommandHandler, CommandRegistry, FnHandler};
pub use session::{EventSource, Session};
pub use wire::{Conversation, Event, Member, OutboundMessage};
