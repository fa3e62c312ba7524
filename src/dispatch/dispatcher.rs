//! The Dispatcher
//!
//! [`Dispatcher::handle_message`] runs the whole pipeline for one message.
//! A dispatcher holds only shared, read-only state (plus relaxed counters), so
//! it can be cloned into as many tasks as there are incoming messages.

use crate::commands::{Check, CommandDescriptor, CommandRegistry};
use crate::config::Prefix;
use crate::dispatch::responder::{DeliveryError, Responder};
use crate::message::{ChannelId, Message, Value};
use crate::tokenizer;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, trace};

/// Why the dispatcher answered on its own instead of running a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    /// A predicate failed and its message was sent
    PredicateFailed,
    /// A group had no matching subcommand and no default
    UnknownSubcommand,
}

/// The result of a successful dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Not a command: no prefix, or no such command
    Ignored,
    /// The dispatcher sent exactly one response and stopped
    Responded(Response),
    /// The handler ran and returned this value
    Completed(Value),
}

/// Faults raised while dispatching. None of them are retried.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The command's argument parser rejected its arguments
    #[error("invalid arguments for `{command}`: {source}")]
    Arguments {
        command: String,
        #[source]
        source: anyhow::Error,
    },

    /// The command's handler failed
    #[error("`{command}` failed: {source}")]
    Handler {
        command: String,
        #[source]
        source: anyhow::Error,
    },

    /// A response could not be delivered
    #[error("failed to deliver response: {0}")]
    Delivery(#[from] DeliveryError),
}

/// Counters for dispatch results
#[derive(Debug, Default)]
pub struct DispatchStats {
    /// Messages passed to the dispatcher
    pub messages_seen: AtomicU64,
    /// Messages that were not commands
    pub ignored: AtomicU64,
    /// Dispatches that ended in a response from the dispatcher
    pub responded: AtomicU64,
    /// Handlers that returned a value
    pub completed: AtomicU64,
    /// Dispatches that returned an error
    pub failed: AtomicU64,
}

impl DispatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, result: &Result<Outcome, DispatchError>) {
        self.messages_seen.fetch_add(1, Ordering::Relaxed);
        let counter = match result {
            Ok(Outcome::Ignored) => &self.ignored,
            Ok(Outcome::Responded(_)) => &self.responded,
            Ok(Outcome::Completed(_)) => &self.completed,
            Err(_) => &self.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Routes messages to commands.
#[derive(Clone)]
pub struct Dispatcher {
    /// Command prefix, fixed for the dispatcher's lifetime
    prefix: Prefix,
    /// Registry used when the caller does not supply one
    registry: Arc<dyn CommandRegistry>,
    /// Where predicate failures and unknown-subcommand messages go
    responder: Arc<dyn Responder>,
    stats: Arc<DispatchStats>,
}

impl Dispatcher {
    /// Creates a dispatcher.
    ///
    /// # Arguments
    ///
    /// * `prefix` - The command prefix
    /// * `registry` - The default command registry
    /// * `responder` - Delivery for responses the dispatcher sends itself
    pub fn new(
        prefix: Prefix,
        registry: Arc<dyn CommandRegistry>,
        responder: Arc<dyn Responder>,
    ) -> Self {
        Self {
            prefix,
            registry,
            responder,
            stats: Arc::new(DispatchStats::new()),
        }
    }

    pub fn prefix(&self) -> &Prefix {
        &self.prefix
    }

    /// Counters shared by every clone of this dispatcher.
    pub fn stats(&self) -> &Arc<DispatchStats> {
        &self.stats
    }

    /// Dispatches a message against the dispatcher's own registry.
    pub async fn handle_message(&self, message: Message) -> Result<Outcome, DispatchError> {
        self.handle_message_with(message, self.registry.as_ref()).await
    }

    /// Dispatches a message against `registry` instead of the default one.
    pub async fn handle_message_with(
        &self,
        message: Message,
        registry: &dyn CommandRegistry,
    ) -> Result<Outcome, DispatchError> {
        let result = self.dispatch(message, registry).await;
        self.stats.record(&result);
        result
    }

    async fn dispatch(
        &self,
        message: Message,
        registry: &dyn CommandRegistry,
    ) -> Result<Outcome, DispatchError> {
        let tokens = tokenizer::split(message.content());
        let line = match tokenizer::strip_prefix(tokens, self.prefix.as_str()) {
            Some(line) => line,
            None => {
                trace!(channel = %message.channel(), "No command prefix");
                return Ok(Outcome::Ignored);
            }
        };

        let descriptor = match registry.lookup(&line.name) {
            Some(descriptor) => descriptor,
            None => {
                debug!(command = %line.name, "Unknown command");
                return Ok(Outcome::Ignored);
            }
        };

        let (leaf, args, command) = match descriptor.as_ref() {
            CommandDescriptor::Leaf(leaf) => (leaf, line.args, line.name),
            CommandDescriptor::Group(group) => {
                let command = match line.args.first() {
                    Some(sub) if group.get(sub).is_some() => format!("{} {}", line.name, sub),
                    _ => line.name.clone(),
                };

                match group.resolve(line.args) {
                    Some((leaf, args)) => (leaf, args, command),
                    None => {
                        debug!(command = %line.name, "Unknown subcommand");
                        self.respond(message.channel(), &group.unknown_subcommand_message())
                            .await?;
                        return Ok(Outcome::Responded(Response::UnknownSubcommand));
                    }
                }
            }
        };

        let channel = message.channel().clone();
        let message = match leaf.check(message) {
            Check::Pass(message) => message,
            Check::Fail(text) => {
                debug!(command = %command, "Predicate failed");
                self.respond(&channel, &text).await?;
                return Ok(Outcome::Responded(Response::PredicateFailed));
            }
        };

        let args = leaf
            .parse_args(args)
            .map_err(|source| DispatchError::Arguments {
                command: command.clone(),
                source,
            })?;

        debug!(command = %command, channel = %channel, "Invoking command");
        let value = leaf
            .invoke(message, args)
            .await
            .map_err(|source| DispatchError::Handler { command, source })?;

        Ok(Outcome::Completed(value))
    }

    async fn respond(&self, channel: &ChannelId, text: &str) -> Result<(), DispatchError> {
        self.responder.send(channel, text).await?;
        trace!(channel = %channel, bytes = text.len(), "Sent response");
        Ok(())
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("prefix", &self.prefix)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
