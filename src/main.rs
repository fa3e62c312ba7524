//! chatcmd - Prefix Commands for Chat Bots
//!
//! This is the main entry point for the chatcmd gateway.
//! It loads the configuration, registers the built-in commands and serves
//! line-based chat connections.

use chatcmd::commands::builtin::{register_builtins, TagStore};
use chatcmd::commands::MemoryRegistry;
use chatcmd::config::{Action, Config};
use chatcmd::dispatch::Dispatcher;
use chatcmd::gateway::{serve, ChannelHub, GatewayStats};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn print_help() {
    println!(
        r#"
chatcmd - Prefix Commands for Chat Bots

USAGE:
    chatcmd [OPTIONS]

OPTIONS:
        --prefix <PREFIX>  Command prefix (default: .)
    -h, --host <HOST>      Host to bind to (default: 127.0.0.1)
    -p, --port <PORT>      Port to listen on (default: 7878)
    -v, --version          Print version information
        --help             Print this help message

ENVIRONMENT:
    CHATCMD_PREFIX, CHATCMD_HOST, CHATCMD_PORT, RUST_LOG

EXAMPLES:
    chatcmd                        # Start on 127.0.0.1:7878 with prefix "."
    chatcmd --prefix '!'           # Use "!" as the command prefix
    chatcmd --host 0.0.0.0         # Listen on all interfaces

CONNECTING:
    Every line you send is a chat message:
    $ nc 127.0.0.1 7878
    .ping
    pong
    HELLO ariz manage_tags
    Welcome, ariz!
    .tag set motd "be nice"
    Saved tag `motd`.
"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match Config::load()? {
        Action::Run(config) => config,
        Action::Help => {
            print_help();
            return Ok(());
        }
        Action::Version => {
            println!("chatcmd version {}", chatcmd::VERSION);
            return Ok(());
        }
    };

    // Set up logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .with_target(false)
        .init();

    let mut registry = MemoryRegistry::new();
    register_builtins(&mut registry, &config.prefix, Arc::new(TagStore::new()));
    info!(
        commands = registry.len(),
        prefix = %config.prefix,
        "Command registry initialized"
    );

    let hub = Arc::new(ChannelHub::new());
    let dispatcher = Dispatcher::new(config.prefix.clone(), Arc::new(registry), hub.clone());
    let stats = Arc::new(GatewayStats::new());

    let listener = TcpListener::bind(config.bind_address()).await?;
    info!("chatcmd v{} listening on {}", chatcmd::VERSION, config.bind_address());

    // Set up graceful shutdown
    let shutdown = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received, stopping gateway...");
    };

    tokio::select! {
        _ = serve(listener, dispatcher.clone(), hub, stats) => {}
        _ = shutdown => {}
    }

    let dispatch_stats = dispatcher.stats();
    info!(
        messages = dispatch_stats.messages_seen.load(Ordering::Relaxed),
        failed = dispatch_stats.failed.load(Ordering::Relaxed),
        "Gateway shutdown complete"
    );
    Ok(())
}
