//! Commands Module
//!
//! Everything a bot registers: descriptors, the registry they live in, and
//! the predicates and built-in commands shipped with chatcmd.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  CommandRegistry (trait)                    │
//! │            lookup(name) -> Arc<CommandDescriptor>           │
//! │                                                             │
//! │   "ping" ──> Leaf { handler, predicates, parser? }          │
//! │   "tag"  ──> Group {                                        │
//! │                "set"    ──> Leaf                            │
//! │                "delete" ──> Leaf                            │
//! │                "list"   ──> Leaf                            │
//! │                default  ──> Leaf                            │
//! │              }                                              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `descriptor`: [`CommandDescriptor`], [`Leaf`], [`Group`] and the
//!   handler/predicate/parser types
//! - `registry`: The [`CommandRegistry`] trait and [`MemoryRegistry`]
//! - `predicates`: Permission, bot and cooldown checks
//! - `builtin`: `ping`, `echo`, `sum`, `tag` and `help`

pub mod builtin;
pub mod descriptor;
pub mod predicates;
pub mod registry;

// Re-export the building blocks
pub use descriptor::{
    ArgParser, Arguments, Check, CommandDescriptor, Group, GroupBuilder, Handler, Leaf,
    Predicate, DEFAULT_SUBCOMMAND,
};
pub use registry::{CommandRegistry, MemoryRegistry};
