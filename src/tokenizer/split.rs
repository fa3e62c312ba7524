//! Message Splitting
//!
//! Shell-style splitting is delegated to `shell_words`, which understands
//! single quotes, double quotes and backslash escapes. When it rejects the
//! input (an unterminated quote or a dangling backslash) we split on plain
//! whitespace instead and keep every character literally.
//!
//! A `#` at the start of a word would start a shell comment. Chat text is
//! full of `#channel` and hashtags, so such a `#` is escaped first and kept
//! as part of the word.

use std::borrow::Cow;
use tracing::trace;

/// Splits message content into tokens.
///
/// # Example
///
/// ```
/// use chatcmd::tokenizer::split;
///
/// assert_eq!(split(r#"foo "bar baz" qux"#), vec!["foo", "bar baz", "qux"]);
/// assert_eq!(split(r#"foo "bar"#), vec!["foo", "\"bar"]);
/// ```
pub fn split(content: &str) -> Vec<String> {
    match shell_words::split(&escape_comments(content)) {
        Ok(tokens) => tokens,
        Err(e) => {
            trace!(error = %e, "Shell-style split failed, falling back to whitespace");
            content.split_whitespace().map(String::from).collect()
        }
    }
}

/// Escapes every unquoted `#` that begins a word.
fn escape_comments(content: &str) -> Cow<'_, str> {
    if !content.contains('#') {
        return Cow::Borrowed(content);
    }

    let mut escaped = String::with_capacity(content.len() + 4);
    let mut quote: Option<char> = None;
    let mut word_start = true;
    let mut after_backslash = false;

    for c in content.chars() {
        if after_backslash {
            after_backslash = false;
            escaped.push(c);
            continue;
        }

        match quote {
            Some(open) => {
                if c == open {
                    quote = None;
                } else if c == '\\' && open == '"' {
                    after_backslash = true;
                }
                escaped.push(c);
            }
            None => {
                match c {
                    '#' if word_start => escaped.push_str("\\#"),
                    '\\' => {
                        after_backslash = true;
                        escaped.push(c);
                    }
                    '\'' | '"' => {
                        quote = Some(c);
                        escaped.push(c);
                    }
                    _ => escaped.push(c),
                }
                word_start = c.is_whitespace();
            }
        }
    }

    Cow::Owned(escaped)
}

/// A tokenized invocation with the prefix removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    /// Command name without the prefix
    pub name: String,
    /// Every token after the command name
    pub args: Vec<String>,
}

/// Checks the first token for `prefix` and strips it.
///
/// Returns `None` when there are no tokens or the first token does not start
/// with the prefix. The prefix is removed once; `..ping` with prefix `.`
/// names the command `.ping`.
pub fn strip_prefix(mut tokens: Vec<String>, prefix: &str) -> Option<CommandLine> {
    let name = tokens.first()?.strip_prefix(prefix)?.to_string();
    tokens.remove(0);

    Some(CommandLine { name, args: tokens })
}
