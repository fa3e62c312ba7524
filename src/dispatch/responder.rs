//! Response Delivery
//!
//! The dispatcher talks back to users through a [`Responder`]. It only does so
//! for predicate failures and unknown subcommands; everything else a command
//! wants to say travels in its returned [`Value`](crate::message::Value).

use crate::message::ChannelId;
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while delivering a response.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DeliveryError {
    /// The channel no longer accepts messages
    #[error("channel {0} is closed")]
    ChannelClosed(ChannelId),

    /// The messaging backend refused the message
    #[error("delivery rejected: {0}")]
    Rejected(String),
}

/// Sends text to a channel.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn send(&self, channel: &ChannelId, text: &str) -> Result<(), DeliveryError>;
}
