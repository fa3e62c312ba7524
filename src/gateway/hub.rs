//! Channel Hub
//!
//! Maps each open channel to the outbox of the connection that owns it, so
//! the dispatcher can address responses by [`ChannelId`] alone.
//!
//! Replies longer than [`MAX_LINE_LENGTH`] are rejected, since a client could
//! not send a line that long back.

use crate::dispatch::{DeliveryError, Responder};
use crate::gateway::handler::MAX_LINE_LENGTH;
use crate::message::ChannelId;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use tokio::sync::mpsc;
use tracing::trace;

/// Routes outgoing text to open channels.
#[derive(Debug, Default)]
pub struct ChannelHub {
    channels: RwLock<HashMap<ChannelId, mpsc::UnboundedSender<String>>>,
}

impl ChannelHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a channel and returns the receiving end of its outbox.
    ///
    /// Re-opening a channel replaces the previous outbox.
    pub fn open(&self, channel: ChannelId) -> mpsc::UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.channels.write().unwrap().insert(channel, tx);
        rx
    }

    /// Closes a channel. Later sends to it fail.
    pub fn close(&self, channel: &ChannelId) {
        self.channels.write().unwrap().remove(channel);
    }

    /// Number of open channels.
    pub fn len(&self) -> usize {
        self.channels.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Responder for ChannelHub {
    async fn send(&self, channel: &ChannelId, text: &str) -> Result<(), DeliveryError> {
        if text.len() > MAX_LINE_LENGTH {
            return Err(DeliveryError::Rejected(format!(
                "reply of {} bytes exceeds the {} byte line limit",
                text.len(),
                MAX_LINE_LENGTH
            )));
        }

        let tx = self
            .channels
            .read()
            .unwrap()
            .get(channel)
            .cloned()
            .ok_or_else(|| DeliveryError::ChannelClosed(channel.clone()))?;

        tx.send(text.to_string())
            .map_err(|_| DeliveryError::ChannelClosed(channel.clone()))?;
        trace!(channel = %channel, "Queued response");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_to_open_channel() {
        let hub = ChannelHub::new();
        let channel = ChannelId::new("a");
        let mut rx = hub.open(channel.clone());

        hub.send(&channel, "hello").await.unwrap();
        assert_eq!(rx.recv().await, Some("hello".to_string()));
        assert_eq!(hub.len(), 1);
    }

    #[tokio::test]
    async fn test_send_to_unknown_channel() {
        let hub = ChannelHub::new();
        let channel = ChannelId::new("missing");
        assert_eq!(
            hub.send(&channel, "hello").await,
            Err(DeliveryError::ChannelClosed(channel))
        );
    }

    #[tokio::test]
    async fn test_oversized_reply_is_rejected() {
        let hub = ChannelHub::new();
        let channel = ChannelId::new("a");
        let mut rx = hub.open(channel.clone());

        let long = "a".repeat(MAX_LINE_LENGTH + 1);
        assert!(matches!(
            hub.send(&channel, &long).await,
            Err(DeliveryError::Rejected(_))
        ));

        let exact = "a".repeat(MAX_LINE_LENGTH);
        hub.send(&channel, &exact).await.unwrap();
        assert_eq!(rx.recv().await, Some(exact));
    }

    #[tokio::test]
    async fn test_close_and_dropped_receiver() {
        let hub = ChannelHub::new();
        let channel = ChannelId::new("a");

        let rx = hub.open(channel.clone());
        drop(rx);
        assert!(hub.send(&channel, "x").await.is_err());

        let _rx = hub.open(channel.clone());
        hub.close(&channel);
        assert!(hub.is_empty());
        assert!(hub.send(&channel, "x").await.is_err());
    }
}
