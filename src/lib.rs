//! # chatcmd - Prefix Commands for Chat Bots
//!
//! chatcmd decides whether a chat message is a command, finds the command in
//! a registry, checks its preconditions, parses its arguments and runs it.
//!
//! ## Features
//!
//! - **Shell-style arguments**: `"quoted words"` stay together, with a plain
//!   whitespace split when the quoting is broken
//! - **Subcommands**: Command groups with an optional default leaf
//! - **Predicates**: Ordered precondition checks that answer the user on failure
//! - **Argument parsers**: Optional per-command conversion of raw tokens
//! - **Async handlers**: Built on Tokio; one dispatcher serves every channel
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              chatcmd                                    │
//! │                                                                         │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐                  │
//! │  │  Gateway    │───>│ Dispatcher  │───>│  Command    │                  │
//! │  │ (transport) │    │             │    │  Registry   │                  │
//! │  └──────▲──────┘    └──────┬──────┘    └──────┬──────┘                  │
//! │         │                  │                  │                         │
//! │         │                  ▼                  ▼                         │
//! │  ┌──────┴──────┐    ┌─────────────┐    ┌──────────────────────────┐    │
//! │  │ ChannelHub  │<───│  Responder  │    │ Leaf / Group descriptors │    │
//! │  │             │    │   (trait)   │    │ predicates, parsers      │    │
//! │  └─────────────┘    └─────────────┘    └──────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use chatcmd::commands::{Leaf, MemoryRegistry};
//! use chatcmd::config::Prefix;
//! use chatcmd::dispatch::{Dispatcher, Outcome};
//! use chatcmd::message::{Author, ChannelId, Message, Value};
//! use std::sync::Arc;
//!
//! let mut registry = MemoryRegistry::new();
//! registry.register("ping", Leaf::new(|_m, _a| async { Ok(Value::text("pong")) }));
//!
//! let dispatcher = Dispatcher::new(Prefix::default(), Arc::new(registry), responder);
//!
//! let message = Message::new(".ping", ChannelId::new("general"), Author::new("1", "ariz"));
//! let outcome = dispatcher.handle_message(message).await?;
//! assert_eq!(outcome, Outcome::Completed(Value::text("pong")));
//! ```
//!
//! ## Module Overview
//!
//! - [`config`]: Prefix and server configuration
//! - [`message`]: Message, channel and author types, and the [`Value`] payload
//! - [`tokenizer`]: Splitting message content and stripping the prefix
//! - [`commands`]: Descriptors, registry, predicates and built-in commands
//! - [`dispatch`]: The dispatcher and its responder seam
//! - [`gateway`]: A line-based TCP transport hosting the dispatcher
//!
//! ## Design Highlights
//!
//! ### Silence by Default
//!
//! Messages without the prefix and unknown commands are ignored without a
//! reply. The dispatcher only speaks when a predicate fails or a group gets a
//! subcommand it does not know, and then exactly once.
//!
//! ### Errors Go Up
//!
//! Handler, parser and delivery errors are returned to the caller as a
//! [`DispatchError`]. The gateway turns them into an `error:` line and keeps
//! the connection alive.

pub mod commands;
pub mod config;
pub mod dispatch;
pub mod gateway;
pub mod message;
pub mod tokenizer;

// Re-export commonly used types for convenience
pub use commands::{CommandDescriptor, CommandRegistry, Group, Leaf, MemoryRegistry};
pub use config::{Config, Prefix};
pub use dispatch::{DispatchError, Dispatcher, Outcome, Responder};
pub use gateway::{serve, ChannelHub, GatewayStats};
pub use message::{Author, ChannelId, Message, Value};

/// The default command prefix
pub const DEFAULT_PREFIX: &str = ".";

/// The default port the gateway listens on
pub const DEFAULT_PORT: u16 = 7878;

/// The default host the gateway binds to
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Version of chatcmd
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
