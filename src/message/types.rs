//! Message Types
//!
//! A [`Message`] is created once per incoming chat line and discarded after
//! dispatch. The dispatcher never looks inside [`Author`]; only predicates do.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Opaque identifier of the channel a message came from.
///
/// Used only to address responses. Cloning is cheap.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(Arc<str>);

impl ChannelId {
    pub fn new(id: impl AsRef<str>) -> Self {
        ChannelId(Arc::from(id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who sent a message, and what they are allowed to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    /// Stable identifier (used for per-user state such as cooldowns)
    pub id: String,
    /// Display name
    pub name: String,
    /// Permission names granted to this author
    pub permissions: BTreeSet<String>,
    /// Whether the author is another bot
    pub is_bot: bool,
}

impl Author {
    /// Creates an author with no permissions.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            permissions: BTreeSet::new(),
            is_bot: false,
        }
    }

    /// Grants a permission.
    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permissions.insert(permission.into());
        self
    }

    /// Marks the author as a bot account.
    pub fn bot(mut self) -> Self {
        self.is_bot = true;
        self
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }
}

/// An incoming chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    content: String,
    channel: ChannelId,
    author: Author,
}

impl Message {
    pub fn new(content: impl Into<String>, channel: ChannelId, author: Author) -> Self {
        Self {
            content: content.into(),
            channel,
            author,
        }
    }

    /// The raw text content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// The channel to address responses to.
    pub fn channel(&self) -> &ChannelId {
        &self.channel
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    /// Returns a copy of this message with a different author.
    ///
    /// Predicates use this to pass an enriched message down the chain.
    pub fn with_author(self, author: Author) -> Self {
        Self { author, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_id_display() {
        let channel = ChannelId::new("general");
        assert_eq!(channel.to_string(), "general");
        assert_eq!(channel.as_str(), "general");
        assert_eq!(channel.clone(), channel);
    }

    #[test]
    fn test_author_permissions() {
        let author = Author::new("1", "ariz").with_permission("manage_tags");
        assert!(author.has_permission("manage_tags"));
        assert!(!author.has_permission("admin"));
        assert!(!author.is_bot);
        assert!(Author::new("2", "helper").bot().is_bot);
    }

    #[test]
    fn test_message_with_author() {
        let message = Message::new(".ping", ChannelId::new("c"), Author::new("1", "a"));
        let replaced = message.with_author(Author::new("2", "b"));
        assert_eq!(replaced.author().id, "2");
        assert_eq!(replaced.content(), ".ping");
        assert_eq!(replaced.channel().as_str(), "c");
    }
}
