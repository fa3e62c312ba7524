//! Built-in Commands
//!
//! The command set the gateway binary ships with:
//!
//! - `ping` - Replies `pong`
//! - `echo <text...>` - Repeats its arguments
//! - `sum <n...>` - Adds integers
//! - `tag <name>` / `tag set <name> <text...>` / `tag delete <name>` / `tag list`
//! - `help` - Lists every command
//!
//! Changing tags requires the `manage_tags` permission.

use crate::commands::predicates::{deny_bots, require_permission, Cooldown};
use crate::commands::{Arguments, Group, Handler, Leaf, MemoryRegistry};
use crate::config::Prefix;
use crate::message::{Message, Value};
use anyhow::{anyhow, bail};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Permission needed to create or delete tags.
pub const MANAGE_TAGS: &str = "manage_tags";

/// How often one author may run `sum`.
const SUM_COOLDOWN: Duration = Duration::from_secs(2);

/// In-memory text snippets for the `tag` command.
#[derive(Debug, Default)]
pub struct TagStore {
    tags: RwLock<HashMap<String, String>>,
}

impl TagStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a tag, returning true if it already existed.
    pub fn set(&self, name: impl Into<String>, text: impl Into<String>) -> bool {
        let mut tags = self.tags.write().unwrap();
        tags.insert(name.into(), text.into()).is_some()
    }

    pub fn get(&self, name: &str) -> Option<String> {
        let tags = self.tags.read().unwrap();
        tags.get(name).cloned()
    }

    /// Deletes a tag, returning true if it existed.
    pub fn delete(&self, name: &str) -> bool {
        let mut tags = self.tags.write().unwrap();
        tags.remove(name).is_some()
    }

    /// Tag names, sorted.
    pub fn names(&self) -> Vec<String> {
        let tags = self.tags.read().unwrap();
        let mut names: Vec<String> = tags.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Registers every built-in command.
///
/// `help` is registered last so it can list everything else.
pub fn register_builtins(registry: &mut MemoryRegistry, prefix: &Prefix, tags: Arc<TagStore>) {
    registry.register(
        "ping",
        Leaf::new(|_message, _args| async { Ok(Value::text("pong")) }),
    );

    registry.register("echo", Leaf::new(echo));

    // Predicates run before the parser, so `.sum abc` still starts the
    // author's cooldown even though the arguments are then rejected.
    registry.register(
        "sum",
        Leaf::new(sum)
            .shared_predicate(deny_bots())
            .shared_predicate(Arc::new(Cooldown::new(SUM_COOLDOWN)).into_predicate())
            .parser(parse_integers),
    );

    registry.register("tag", tag_group(prefix, tags));

    let mut names = registry.names();
    names.push("help".to_string());
    names.sort();
    let listing = names
        .iter()
        .map(|name| format!("`{}{}`", prefix, name))
        .collect::<Vec<_>>()
        .join(", ");
    let reply = format!("Commands: {}", listing);

    registry.register(
        "help",
        Leaf::new(move |_message, _args| {
            let reply = reply.clone();
            async move { Ok(Value::text(reply)) }
        }),
    );
}

async fn echo(_message: Message, args: Arguments) -> anyhow::Result<Value> {
    let text = args
        .as_raw()
        .map(|tokens| tokens.join(" "))
        .unwrap_or_default();

    if text.is_empty() {
        Ok(Value::null())
    } else {
        Ok(Value::text(text))
    }
}

fn parse_integers(args: Vec<String>) -> anyhow::Result<Value> {
    if args.is_empty() {
        bail!("Give me at least one number");
    }

    args.iter()
        .map(|token| {
            token
                .parse::<i64>()
                .map(Value::integer)
                .map_err(|_| anyhow!("`{}` is not a whole number", token))
        })
        .collect::<anyhow::Result<Vec<_>>>()
        .map(Value::list)
}

async fn sum(_message: Message, args: Arguments) -> anyhow::Result<Value> {
    let numbers = args
        .as_parsed()
        .and_then(Value::as_list)
        .ok_or_else(|| anyhow!("sum expects parsed integers"))?;

    let mut total: i64 = 0;
    for number in numbers {
        let n = number
            .as_integer()
            .ok_or_else(|| anyhow!("sum expects parsed integers"))?;
        total = total
            .checked_add(n)
            .ok_or_else(|| anyhow!("That sum overflows"))?;
    }

    Ok(Value::integer(total))
}

fn tag_group(prefix: &Prefix, tags: Arc<TagStore>) -> Group {
    Group::builder()
        .subcommand(
            "set",
            Leaf::from_handler(SetTag {
                tags: Arc::clone(&tags),
            })
            .shared_predicate(require_permission(MANAGE_TAGS))
            .parser(|args| {
                if args.len() < 2 {
                    bail!("Usage: tag set <name> <text>");
                }
                let mut args = args.into_iter();
                let name = args.next().unwrap_or_default();
                let text = args.collect::<Vec<_>>().join(" ");
                Ok(Value::list(vec![Value::text(name), Value::text(text)]))
            }),
        )
        .subcommand(
            "delete",
            Leaf::from_handler(DeleteTag {
                tags: Arc::clone(&tags),
            })
            .shared_predicate(require_permission(MANAGE_TAGS)),
        )
        .subcommand(
            "list",
            Leaf::from_handler(ListTags {
                tags: Arc::clone(&tags),
            }),
        )
        .default_leaf(Leaf::from_handler(ShowTag {
            tags,
            usage: format!(
                "Usage: {p}tag <name> | {p}tag set <name> <text> | {p}tag delete <name> | {p}tag list",
                p = prefix
            ),
        }))
        .build()
}

struct SetTag {
    tags: Arc<TagStore>,
}

#[async_trait]
impl Handler for SetTag {
    async fn call(&self, _message: Message, args: Arguments) -> anyhow::Result<Value> {
        let parts = args
            .as_parsed()
            .and_then(Value::as_list)
            .ok_or_else(|| anyhow!("tag set expects a parsed name and text"))?;

        let (name, text) = match parts {
            [Value::Text(name), Value::Text(text)] => (name, text),
            _ => bail!("tag set expects a parsed name and text"),
        };

        let verb = if self.tags.set(name.as_str(), text.as_str()) {
            "Updated"
        } else {
            "Saved"
        };
        Ok(Value::text(format!("{} tag `{}`.", verb, name)))
    }
}

struct DeleteTag {
    tags: Arc<TagStore>,
}

#[async_trait]
impl Handler for DeleteTag {
    async fn call(&self, _message: Message, args: Arguments) -> anyhow::Result<Value> {
        let name = match args.as_raw() {
            Some([name]) => name,
            _ => return Ok(Value::text("Usage: tag delete <name>")),
        };

        if self.tags.delete(name) {
            Ok(Value::text(format!("Deleted tag `{}`.", name)))
        } else {
            Ok(Value::text(format!("No tag named `{}`.", name)))
        }
    }
}

struct ListTags {
    tags: Arc<TagStore>,
}

#[async_trait]
impl Handler for ListTags {
    async fn call(&self, _message: Message, _args: Arguments) -> anyhow::Result<Value> {
        let names = self.tags.names();
        if names.is_empty() {
            return Ok(Value::text("No tags yet."));
        }

        let names: Vec<String> = names.iter().map(|name| format!("`{}`", name)).collect();
        Ok(Value::text(format!("Tags: {}", names.join(", "))))
    }
}

/// Default leaf of `tag`: the first argument is a tag name.
struct ShowTag {
    tags: Arc<TagStore>,
    usage: String,
}

#[async_trait]
impl Handler for ShowTag {
    async fn call(&self, _message: Message, args: Arguments) -> anyhow::Result<Value> {
        let name = match args.as_raw().and_then(|tokens| tokens.first()) {
            Some(name) => name,
            None => return Ok(Value::text(self.usage.as_str())),
        };

        match self.tags.get(name) {
            Some(text) => Ok(Value::text(text)),
            None => Ok(Value::text(format!("No tag named `{}`.", name))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{Check, CommandDescriptor, CommandRegistry};
    use crate::message::{Author, ChannelId};

    fn strings(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|s| s.to_string()).collect()
    }

    fn message() -> Message {
        Message::new("", ChannelId::new("test"), Author::new("1", "tester"))
    }

    fn registry() -> (MemoryRegistry, Arc<TagStore>) {
        let tags = Arc::new(TagStore::new());
        let mut registry = MemoryRegistry::new();
        register_builtins(&mut registry, &Prefix::default(), Arc::clone(&tags));
        (registry, tags)
    }

    fn leaf(registry: &MemoryRegistry, name: &str) -> Leaf {
        match registry.lookup(name).as_deref() {
            Some(CommandDescriptor::Leaf(leaf)) => leaf.clone(),
            other => panic!("expected leaf for {}, got {:?}", name, other),
        }
    }

    fn group(registry: &MemoryRegistry, name: &str) -> Group {
        match registry.lookup(name).as_deref() {
            Some(CommandDescriptor::Group(group)) => group.clone(),
            other => panic!("expected group for {}, got {:?}", name, other),
        }
    }

    async fn run(leaf: &Leaf, args: &[&str]) -> anyhow::Result<Value> {
        let args = leaf.parse_args(strings(args))?;
        leaf.invoke(message(), args).await
    }

    #[test]
    fn test_tag_store() {
        let store = TagStore::new();
        assert!(!store.set("b", "two"));
        assert!(store.set("b", "deux"));
        store.set("a", "one");

        assert_eq!(store.get("b"), Some("deux".to_string()));
        assert_eq!(store.names(), vec!["a", "b"]);
        assert!(store.delete("a"));
        assert!(!store.delete("a"));
        assert_eq!(store.get("a"), None);
    }

    #[test]
    fn test_registers_everything() {
        let (registry, _) = registry();
        assert_eq!(registry.names(), vec!["echo", "help", "ping", "sum", "tag"]);
    }

    #[tokio::test]
    async fn test_ping_and_echo() {
        let (registry, _) = registry();

        let ping = leaf(&registry, "ping");
        let echo = leaf(&registry, "echo");

        assert_eq!(run(&ping, &[]).await.unwrap(), Value::text("pong"));
        assert_eq!(
            run(&echo, &["hello", "world"]).await.unwrap(),
            Value::text("hello world")
        );
        assert_eq!(run(&echo, &[]).await.unwrap(), Value::null());
    }

    #[tokio::test]
    async fn test_help_lists_commands_with_prefix() {
        let (registry, _) = registry();
        assert_eq!(
            run(&leaf(&registry, "help"), &[]).await.unwrap(),
            Value::text("Commands: `.echo`, `.help`, `.ping`, `.sum`, `.tag`")
        );
    }

    #[tokio::test]
    async fn test_sum() {
        let (registry, _) = registry();
        let sum = leaf(&registry, "sum");

        assert_eq!(
            run(&sum, &["1", "2", "-4"]).await.unwrap(),
            Value::integer(-1)
        );
        assert_eq!(
            run(&sum, &["1", "two"]).await.unwrap_err().to_string(),
            "`two` is not a whole number"
        );
        assert!(run(&sum, &[]).await.is_err());
        let max = i64::MAX.to_string();
        assert_eq!(
            run(&sum, &[max.as_str(), "1"])
                .await
                .unwrap_err()
                .to_string(),
            "That sum overflows"
        );
    }

    #[test]
    fn test_sum_predicates() {
        let (registry, _) = registry();
        let sum = leaf(&registry, "sum");
        assert_eq!(sum.predicate_count(), 2);
        assert!(sum.has_parser());
    }

    #[test]
    fn test_sum_rejected_arguments_still_use_cooldown() {
        let (registry, _) = registry();
        let sum = leaf(&registry, "sum");

        assert!(matches!(sum.check(message()), Check::Pass(_)));
        assert!(sum.parse_args(strings(&["abc"])).is_err());

        match sum.check(message()) {
            Check::Fail(text) => assert!(text.starts_with("Slow down!")),
            Check::Pass(_) => panic!("cooldown should still be running"),
        }
    }

    #[tokio::test]
    async fn test_tag_lifecycle() {
        let (registry, tags) = registry();
        let tag = group(&registry, "tag");

        let set = tag.get("set").unwrap();
        assert_eq!(
            run(set, &["greeting", "hello", "there"]).await.unwrap(),
            Value::text("Saved tag `greeting`.")
        );
        assert_eq!(tags.get("greeting"), Some("hello there".to_string()));
        assert_eq!(
            run(set, &["greeting", "hi"]).await.unwrap(),
            Value::text("Updated tag `greeting`.")
        );
        assert!(run(set, &["lonely"]).await.is_err());

        assert_eq!(
            run(tag.get("list").unwrap(), &[]).await.unwrap(),
            Value::text("Tags: `greeting`")
        );

        let show = tag.default_leaf().unwrap();
        assert_eq!(run(show, &["greeting"]).await.unwrap(), Value::text("hi"));
        assert_eq!(
            run(show, &["nope"]).await.unwrap(),
            Value::text("No tag named `nope`.")
        );

        let delete = tag.get("delete").unwrap();
        assert_eq!(
            run(delete, &["greeting"]).await.unwrap(),
            Value::text("Deleted tag `greeting`.")
        );
        assert_eq!(
            run(tag.get("list").unwrap(), &[]).await.unwrap(),
            Value::text("No tags yet.")
        );
    }

    #[tokio::test]
    async fn test_tag_usage() {
        let (registry, _) = registry();
        let tag = group(&registry, "tag");

        let usage = run(tag.default_leaf().unwrap(), &[]).await.unwrap();
        assert!(usage.as_str().unwrap().starts_with("Usage: .tag <name>"));
        assert_eq!(
            run(tag.get("delete").unwrap(), &["a", "b"]).await.unwrap(),
            Value::text("Usage: tag delete <name>")
        );
    }

    #[test]
    fn test_tag_mutations_need_permission() {
        let (registry, _) = registry();
        let tag = group(&registry, "tag");

        assert_eq!(tag.get("set").unwrap().predicate_count(), 1);
        assert_eq!(tag.get("delete").unwrap().predicate_count(), 1);
        assert_eq!(tag.get("list").unwrap().predicate_count(), 0);
        assert_eq!(
            tag.subcommand_names().collect::<Vec<_>>(),
            vec!["set", "delete", "list"]
        );
    }
}
