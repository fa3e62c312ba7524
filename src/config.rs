//! Process Configuration
//!
//! Configuration is read once at startup and then passed around explicitly.
//! Later sources override earlier ones:
//!
//! 1. Built-in defaults
//! 2. Environment (`CHATCMD_PREFIX`, `CHATCMD_HOST`, `CHATCMD_PORT`, `RUST_LOG`)
//! 3. Command-line flags

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while building the configuration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// The command prefix is empty
    #[error("command prefix must not be empty")]
    EmptyPrefix,

    /// The command prefix contains whitespace and could never match a token
    #[error("command prefix must not contain whitespace: {0:?}")]
    WhitespaceInPrefix(String),

    /// A flag that needs a value was last on the command line
    #[error("{0} requires a value")]
    MissingValue(String),

    /// The port is not a valid u16
    #[error("invalid port number: {0}")]
    InvalidPort(String),

    /// An unrecognised command-line argument
    #[error("unknown argument: {0}")]
    UnknownArgument(String),
}

/// The command prefix, e.g. `.` or `!`.
///
/// Always non-empty and free of whitespace. Cloning is cheap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prefix(Arc<str>);

impl Prefix {
    pub fn new(prefix: impl AsRef<str>) -> Result<Self, ConfigError> {
        let prefix = prefix.as_ref();
        if prefix.is_empty() {
            return Err(ConfigError::EmptyPrefix);
        }
        if prefix.chars().any(char::is_whitespace) {
            return Err(ConfigError::WhitespaceInPrefix(prefix.to_string()));
        }
        Ok(Prefix(Arc::from(prefix)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Prefix {
    fn default() -> Self {
        Prefix(Arc::from(crate::DEFAULT_PREFIX))
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What `main` should do after parsing the command line.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Run the gateway with this configuration
    Run(Config),
    /// Print usage and exit
    Help,
    /// Print the version and exit
    Version,
}

/// Server configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Command prefix
    pub prefix: Prefix,
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// `tracing_subscriber::EnvFilter` directive
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prefix: Prefix::default(),
            host: crate::DEFAULT_HOST.to_string(),
            port: crate::DEFAULT_PORT,
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from the process environment and arguments.
    pub fn load() -> Result<Action, ConfigError> {
        let mut config = Config::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        config.apply_args(std::env::args().skip(1))
    }

    /// Applies environment overrides, reading variables through `var`.
    pub fn apply_env<F>(&mut self, var: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(prefix) = var("CHATCMD_PREFIX") {
            self.prefix = Prefix::new(prefix)?;
        }
        if let Some(host) = var("CHATCMD_HOST") {
            self.host = host;
        }
        if let Some(port) = var("CHATCMD_PORT") {
            self.port = parse_port(&port)?;
        }
        if let Some(filter) = var("RUST_LOG") {
            self.log_filter = filter;
        }
        Ok(())
    }

    /// Applies command-line flags (without the program name).
    pub fn apply_args<I>(mut self, args: I) -> Result<Action, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--prefix" => {
                    let value = args
                        .next()
                        .ok_or_else(|| ConfigError::MissingValue(arg.clone()))?;
                    self.prefix = Prefix::new(value)?;
                }
                "--host" | "-h" => {
                    self.host = args
                        .next()
                        .ok_or_else(|| ConfigError::MissingValue(arg.clone()))?;
                }
                "--port" | "-p" => {
                    let value = args
                        .next()
                        .ok_or_else(|| ConfigError::MissingValue(arg.clone()))?;
                    self.port = parse_port(&value)?;
                }
                "--help" => return Ok(Action::Help),
                "--version" | "-v" => return Ok(Action::Version),
                _ => return Err(ConfigError::UnknownArgument(arg.clone())),
            }
        }

        Ok(Action::Run(self))
    }

    /// Returns the bind address as a string
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_port(value: &str) -> Result<u16, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidPort(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_prefix_validation() {
        assert_eq!(Prefix::new("!").unwrap().as_str(), "!");
        assert_eq!(Prefix::new(""), Err(ConfigError::EmptyPrefix));
        assert!(matches!(
            Prefix::new("! "),
            Err(ConfigError::WhitespaceInPrefix(_))
        ));
        assert_eq!(Prefix::default().as_str(), ".");
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.bind_address(), "127.0.0.1:7878");
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("CHATCMD_PREFIX", "!"),
            ("CHATCMD_PORT", "9000"),
            ("RUST_LOG", "chatcmd=debug"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.prefix.as_str(), "!");
        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.log_filter, "chatcmd=debug");
    }

    #[test]
    fn test_env_invalid_port() {
        let mut config = Config::default();
        let result =
            config.apply_env(|key| (key == "CHATCMD_PORT").then(|| "http".to_string()));
        assert_eq!(result, Err(ConfigError::InvalidPort("http".to_string())));
    }

    #[test]
    fn test_args_override_env() {
        let mut config = Config::default();
        config
            .apply_env(|key| (key == "CHATCMD_PREFIX").then(|| "!".to_string()))
            .unwrap();

        let action = config
            .apply_args(args(&["--prefix", "?", "-p", "6000", "--host", "0.0.0.0"]))
            .unwrap();

        match action {
            Action::Run(config) => {
                assert_eq!(config.prefix.as_str(), "?");
                assert_eq!(config.bind_address(), "0.0.0.0:6000");
            }
            other => panic!("expected Run, got {:?}", other),
        }
    }

    #[test]
    fn test_args_help_and_version() {
        assert_eq!(
            Config::default().apply_args(args(&["--help"])),
            Ok(Action::Help)
        );
        assert_eq!(
            Config::default().apply_args(args(&["-v"])),
            Ok(Action::Version)
        );
    }

    #[test]
    fn test_args_errors() {
        assert_eq!(
            Config::default().apply_args(args(&["--port"])),
            Err(ConfigError::MissingValue("--port".to_string()))
        );
        assert_eq!(
            Config::default().apply_args(args(&["--bogus"])),
            Err(ConfigError::UnknownArgument("--bogus".to_string()))
        );
        assert_eq!(
            Config::default().apply_args(args(&["--prefix", ""])),
            Err(ConfigError::EmptyPrefix)
        );
    }
}
