//! Gateway Module
//!
//! A minimal chat transport that hosts the dispatcher: every TCP connection
//! is one channel and every newline-terminated line is one message.
//!
//! This is a demo transport. Clients name themselves and claim whatever
//! permissions they like through `HELLO`, so nothing here authenticates
//! anyone.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     TCP Listener                            │
//! │                  (gateway::serve)                           │
//! └──────────────────────┬──────────────────────────────────────┘
//!                        │ accept()
//!                        ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 ConnectionHandler                           │
//! │                                                             │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐     │
//! │  │ Read line   │───>│  Dispatch   │───>│ Write reply │     │
//! │  └─────────────┘    └──────┬──────┘    └──────▲──────┘     │
//! │                            │                  │             │
//! │                            ▼                  │             │
//! │                     ┌─────────────┐    ┌──────┴──────┐     │
//! │                     │ ChannelHub  │───>│   outbox    │     │
//! │                     │ (Responder) │    │   (mpsc)    │     │
//! │                     └─────────────┘    └─────────────┘     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Protocol
//!
//! - Any line is a chat message from the connection's current author.
//! - `HELLO <name> [permission ...]` switches the author and is not
//!   dispatched. The word `bot` in place of a permission marks the author
//!   as a bot.
//! - Non-null handler results and dispatcher responses are written back as
//!   lines. Dispatch errors are written as `error: <message>` and the
//!   connection stays open.
//!
//! ## Example
//!
//! ```ignore
//! use chatcmd::gateway::{serve, ChannelHub, GatewayStats};
//!
//! let hub = Arc::new(ChannelHub::new());
//! let dispatcher = Dispatcher::new(prefix, registry, hub.clone());
//! let listener = TcpListener::bind("127.0.0.1:7878").await?;
//! serve(listener, dispatcher, hub, Arc::new(GatewayStats::new())).await;
//! ```

pub mod handler;
pub mod hub;

// Re-export commonly used types
pub use handler::{handle_connection, serve, ConnectionHandler, GatewayError, GatewayStats};
pub use hub::ChannelHub;
