//! Message Module
//!
//! Input and payload types shared by every layer of chatcmd.
//!
//! ## Overview
//!
//! - `types`: The immutable [`Message`] a dispatch runs against, plus the
//!   [`ChannelId`] used to address responses and the [`Author`] context that
//!   predicates inspect.
//! - `value`: The [`Value`] payload produced by argument parsers and returned
//!   by command handlers.
//!
//! ## Example
//!
//! ```
//! use chatcmd::message::{Author, ChannelId, Message, Value};
//!
//! let message = Message::new(".echo hi", ChannelId::new("general"), Author::new("42", "ariz"));
//! assert_eq!(message.content(), ".echo hi");
//!
//! let reply = Value::text("hi");
//! assert_eq!(reply.to_string(), "hi");
//! ```

pub mod types;
pub mod value;

// Re-export commonly used types for convenience
pub use types::{Author, ChannelId, Message};
pub use value::Value;
