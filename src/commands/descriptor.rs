//! Command Descriptors
//!
//! A registered command is either a [`Leaf`] that can be invoked, or a
//! [`Group`] of named leaves with an optional default.
//!
//! ## Resolution
//!
//! ```text
//!             CommandDescriptor
//!              │            │
//!          Leaf(..)     Group(..)
//!              │            │
//!              │     first arg is a subcommand? ──yes──> that leaf, rest of args
//!              │            │ no
//!              │     default declared? ──yes──> default leaf, all args
//!              │            │ no
//!              │     unknown subcommand response
//!              ▼
//!      predicates ─fail─> failure response
//!              │ pass
//!              ▼
//!      argument parser (optional)
//!              │
//!              ▼
//!           handler
//! ```

use crate::message::{Message, Value};
use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Key that marks a group's default leaf.
///
/// Passing this name to [`GroupBuilder::subcommand`] sets the default instead
/// of adding a subcommand, so users can never select it by name.
pub const DEFAULT_SUBCOMMAND: &str = "__default__";

/// What a handler receives as its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arguments {
    /// The raw tokens, for leaves without an argument parser
    Raw(Vec<String>),
    /// Whatever the leaf's argument parser produced
    Parsed(Value),
}

impl Arguments {
    pub fn as_raw(&self) -> Option<&[String]> {
        match self {
            Arguments::Raw(tokens) => Some(tokens),
            Arguments::Parsed(_) => None,
        }
    }

    pub fn as_parsed(&self) -> Option<&Value> {
        match self {
            Arguments::Parsed(value) => Some(value),
            Arguments::Raw(_) => None,
        }
    }

    /// Converts to a [`Value`]; raw tokens become a list of text values.
    pub fn into_value(self) -> Value {
        match self {
            Arguments::Raw(tokens) => Value::from(tokens),
            Arguments::Parsed(value) => value,
        }
    }
}

/// The outcome of a single predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    /// Continue with this (possibly modified) message
    Pass(Message),
    /// Stop and send this text to the message's channel
    Fail(String),
}

/// A precondition evaluated before a leaf's handler runs.
pub type Predicate = Arc<dyn Fn(Message) -> Check + Send + Sync>;

/// Turns raw argument tokens into the value handed to the handler.
pub type ArgParser = Arc<dyn Fn(Vec<String>) -> anyhow::Result<Value> + Send + Sync>;

/// An async command handler.
///
/// Closures of the form `|message, args| async move { ... }` implement this
/// trait automatically.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, message: Message, args: Arguments) -> anyhow::Result<Value>;
}

#[async_trait]
impl<F, Fut> Handler for F
where
    F: Fn(Message, Arguments) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
{
    async fn call(&self, message: Message, args: Arguments) -> anyhow::Result<Value> {
        (self)(message, args).await
    }
}

/// An invocable command: handler, predicates and optional argument parser.
#[derive(Clone)]
pub struct Leaf {
    handler: Arc<dyn Handler>,
    predicates: Vec<Predicate>,
    parser: Option<ArgParser>,
}

impl Leaf {
    /// Creates a leaf from an async closure.
    ///
    /// # Example
    ///
    /// ```
    /// use chatcmd::commands::Leaf;
    /// use chatcmd::message::Value;
    ///
    /// let ping = Leaf::new(|_message, _args| async { Ok(Value::text("pong")) });
    /// ```
    pub fn new<F, Fut>(handler: F) -> Self
    where
        F: Fn(Message, Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        Self::from_handler(handler)
    }

    /// Creates a leaf from any [`Handler`] implementation.
    pub fn from_handler<H: Handler + 'static>(handler: H) -> Self {
        Self {
            handler: Arc::new(handler),
            predicates: Vec::new(),
            parser: None,
        }
    }

    /// Appends a predicate. Predicates run in the order they were added.
    pub fn predicate<P>(mut self, predicate: P) -> Self
    where
        P: Fn(Message) -> Check + Send + Sync + 'static,
    {
        self.predicates.push(Arc::new(predicate));
        self
    }

    /// Appends an already shared predicate.
    pub fn shared_predicate(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Sets the argument parser.
    pub fn parser<P>(mut self, parser: P) -> Self
    where
        P: Fn(Vec<String>) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.parser = Some(Arc::new(parser));
        self
    }

    pub fn has_parser(&self) -> bool {
        self.parser.is_some()
    }

    pub fn predicate_count(&self) -> usize {
        self.predicates.len()
    }

    /// Runs the predicate chain, stopping at the first failure.
    ///
    /// Each passing predicate hands its message to the next one. With no
    /// predicates the message passes unchanged.
    pub fn check(&self, mut message: Message) -> Check {
        for predicate in &self.predicates {
            match predicate(message) {
                Check::Pass(next) => message = next,
                failed @ Check::Fail(_) => return failed,
            }
        }
        Check::Pass(message)
    }

    /// Applies the argument parser, or passes the tokens through untouched.
    pub fn parse_args(&self, args: Vec<String>) -> anyhow::Result<Arguments> {
        match &self.parser {
            Some(parser) => parser(args).map(Arguments::Parsed),
            None => Ok(Arguments::Raw(args)),
        }
    }

    /// Calls the handler.
    pub async fn invoke(&self, message: Message, args: Arguments) -> anyhow::Result<Value> {
        self.handler.call(message, args).await
    }
}

impl fmt::Debug for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Leaf")
            .field("predicates", &self.predicates.len())
            .field("parser", &self.parser.is_some())
            .finish_non_exhaustive()
    }
}

/// A set of named subcommands with an optional default leaf.
#[derive(Debug, Clone, Default)]
pub struct Group {
    /// Declaration order is kept for the unknown-subcommand listing
    subcommands: Vec<(String, Leaf)>,
    default: Option<Leaf>,
}

impl Group {
    pub fn builder() -> GroupBuilder {
        GroupBuilder {
            group: Group::default(),
        }
    }

    /// Looks up an explicitly declared subcommand.
    pub fn get(&self, name: &str) -> Option<&Leaf> {
        self.subcommands
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, leaf)| leaf)
    }

    pub fn default_leaf(&self) -> Option<&Leaf> {
        self.default.as_ref()
    }

    /// Subcommand names in declaration order. The default is not listed.
    pub fn subcommand_names(&self) -> impl Iterator<Item = &str> {
        self.subcommands.iter().map(|(name, _)| name.as_str())
    }

    /// Picks the leaf for `args` and the arguments it should receive.
    ///
    /// - The first argument names a subcommand: that leaf gets the rest.
    /// - Otherwise, or with no arguments: the default leaf gets all of them.
    /// - Otherwise `None`.
    pub fn resolve(&self, mut args: Vec<String>) -> Option<(&Leaf, Vec<String>)> {
        if let Some(leaf) = args.first().and_then(|candidate| self.get(candidate)) {
            args.remove(0);
            return Some((leaf, args));
        }

        self.default.as_ref().map(|leaf| (leaf, args))
    }

    /// The response sent when no subcommand matches and there is no default.
    ///
    /// ```
    /// use chatcmd::commands::{Group, Leaf};
    /// use chatcmd::message::Value;
    ///
    /// let leaf = Leaf::new(|_m, _a| async { Ok(Value::null()) });
    /// let group = Group::builder()
    ///     .subcommand("add", leaf.clone())
    ///     .subcommand("remove", leaf)
    ///     .build();
    /// assert_eq!(
    ///     group.unknown_subcommand_message(),
    ///     "Unknown subcommand. Available subcommands: `add`, `remove`"
    /// );
    /// ```
    pub fn unknown_subcommand_message(&self) -> String {
        let names: Vec<String> = self
            .subcommand_names()
            .map(|name| format!("`{}`", name))
            .collect();
        format!(
            "Unknown subcommand. Available subcommands: {}",
            names.join(", ")
        )
    }
}

/// Builder for [`Group`].
#[derive(Debug)]
pub struct GroupBuilder {
    group: Group,
}

impl GroupBuilder {
    /// Adds a subcommand, replacing any earlier one with the same name.
    ///
    /// The name [`DEFAULT_SUBCOMMAND`] sets the default leaf instead.
    pub fn subcommand(mut self, name: impl Into<String>, leaf: Leaf) -> Self {
        let name = name.into();
        if name == DEFAULT_SUBCOMMAND {
            return self.default_leaf(leaf);
        }

        match self.group.subcommands.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = leaf,
            None => self.group.subcommands.push((name, leaf)),
        }
        self
    }

    /// Sets the leaf invoked when no subcommand name matches.
    pub fn default_leaf(mut self, leaf: Leaf) -> Self {
        self.group.default = Some(leaf);
        self
    }

    pub fn build(self) -> Group {
        self.group
    }
}

/// A registered command.
#[derive(Debug, Clone)]
pub enum CommandDescriptor {
    /// Invoked directly with every argument
    Leaf(Leaf),
    /// Dispatches on its first argument
    Group(Group),
}

impl From<Leaf> for CommandDescriptor {
    fn from(leaf: Leaf) -> Self {
        CommandDescriptor::Leaf(leaf)
    }
}

impl From<Group> for CommandDescriptor {
    fn from(group: Group) -> Self {
        CommandDescriptor::Group(group)
    }
}
