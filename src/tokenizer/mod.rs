//! Tokenizer Module
//!
//! Turns message content into a command name and its arguments.
//!
//! ## How It Works
//!
//! ```text
//! ".tag set greeting \"hello there\""
//!        │
//!        ▼  split()            shell-style quoting, whitespace fallback
//! [".tag", "set", "greeting", "hello there"]
//!        │
//!        ▼  strip_prefix(".")
//! ("tag", ["set", "greeting", "hello there"])
//! ```
//!
//! Neither step can fail. Malformed quoting degrades to a plain whitespace
//! split, and a missing prefix yields `None`.

pub mod split;

pub use split::{split, strip_prefix, CommandLine};
