//! Dispatch Module
//!
//! Turns one incoming [`Message`](crate::message::Message) into at most one
//! command invocation.
//!
//! ## Pipeline
//!
//! ```text
//! Message
//!    │
//!    ▼
//! ┌──────────────┐  no prefix            ┌──────────┐
//! │  tokenize +  │──────────────────────>│ Ignored  │
//! │ prefix check │                       └──────────┘
//! └──────┬───────┘                             ▲
//!        ▼                unknown command      │
//! ┌──────────────┐─────────────────────────────┘
//! │   registry   │
//! │    lookup    │
//! └──────┬───────┘
//!        ▼                unknown subcommand   ┌──────────────┐
//! ┌──────────────┐────────────────────────────>│  Responded   │
//! │   resolve    │                             │ (1 response) │
//! └──────┬───────┘                             └──────────────┘
//!        ▼                first failure               ▲
//! ┌──────────────┐────────────────────────────────────┘
//! │  predicates  │
//! └──────┬───────┘
//!        ▼
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ parse args   │────>│   handler    │────>│  Completed   │
//! └──────────────┘     └──────────────┘     └──────────────┘
//! ```
//!
//! Errors from the argument parser, the handler or the [`Responder`] are
//! returned to the caller untouched. Containing them is the host's job.

pub mod dispatcher;
pub mod responder;

pub use dispatcher::{DispatchError, DispatchStats, Dispatcher, Outcome, Response};
pub use responder::{DeliveryError, Responder};
