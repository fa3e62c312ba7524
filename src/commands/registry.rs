//! Command Registry
//!
//! The dispatcher only ever asks a registry one question: which descriptor is
//! registered under this name? [`CommandRegistry`] is that seam.
//! [`MemoryRegistry`] is the in-process implementation used by the gateway and
//! by tests; a bot with persistent command storage supplies its own.

use crate::commands::CommandDescriptor;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Read-only lookup of commands by name.
pub trait CommandRegistry: Send + Sync {
    /// Returns the descriptor registered under `name`, if any.
    fn lookup(&self, name: &str) -> Option<Arc<CommandDescriptor>>;
}

/// A `HashMap`-backed registry.
///
/// Filled in during startup, then shared behind an `Arc` and never mutated.
#[derive(Debug, Default, Clone)]
pub struct MemoryRegistry {
    commands: HashMap<String, Arc<CommandDescriptor>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a command, returning the descriptor it replaced.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        descriptor: impl Into<CommandDescriptor>,
    ) -> Option<Arc<CommandDescriptor>> {
        let name = name.into();
        debug!(command = %name, "Registering command");
        self.commands.insert(name, Arc::new(descriptor.into()))
    }

    /// Registered command names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.commands.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl CommandRegistry for MemoryRegistry {
    fn lookup(&self, name: &str) -> Option<Arc<CommandDescriptor>> {
        self.commands.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{Group, Leaf};
    use crate::message::Value;

    fn leaf() -> Leaf {
        Leaf::new(|_message, _args| async { Ok(Value::null()) })
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = MemoryRegistry::new();
        assert!(registry.is_empty());

        assert!(registry.register("ping", leaf()).is_none());
        registry.register("tag", Group::builder().subcommand("list", leaf()).build());

        assert_eq!(registry.len(), 2);
        assert!(matches!(
            registry.lookup("ping").as_deref(),
            Some(CommandDescriptor::Leaf(_))
        ));
        assert!(matches!(
            registry.lookup("tag").as_deref(),
            Some(CommandDescriptor::Group(_))
        ));
        assert!(registry.lookup("missing").is_none());
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let mut registry = MemoryRegistry::new();
        registry.register("ping", leaf());
        assert!(registry.lookup("PING").is_none());
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = MemoryRegistry::new();
        registry.register("ping", leaf());
        let replaced = registry.register("ping", Group::default());

        assert!(matches!(replaced.as_deref(), Some(CommandDescriptor::Leaf(_))));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_names_sorted() {
        let mut registry = MemoryRegistry::new();
        for name in ["tag", "echo", "ping"] {
            registry.register(name, leaf());
        }
        assert_eq!(registry.names(), vec!["echo", "ping", "tag"]);
    }

    #[test]
    fn test_shared_lookup_returns_same_descriptor() {
        let mut registry = MemoryRegistry::new();
        registry.register("ping", leaf());

        let first = registry.lookup("ping").unwrap();
        let second = registry.lookup("ping").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
