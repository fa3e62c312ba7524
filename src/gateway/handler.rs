//! Connection Handler
//!
//! Each client connection gets its own task that reads lines, dispatches
//! them and writes replies until the client goes away.
//!
//! ## Connection Lifecycle
//!
//! ```text
//! 1. Client connects, channel `tcp-<addr>` is opened in the hub
//!        │
//!        ▼
//! 2. ┌──────────────────────────────┐
//!    │      Main Loop               │
//!    │                              │
//!    │  read line ─> dispatch ─>    │
//!    │  drain outbox ─> write reply │
//!    │         [loop back]          │
//!    └──────────────────────────────┘
//!        │
//!        ▼
//! 3. Client disconnects / error, channel is closed
//! ```
//!
//! ## Buffer Management
//!
//! Incoming bytes accumulate in a `BytesMut` until a newline arrives. A line
//! longer than [`MAX_LINE_LENGTH`] ends the connection.

use crate::dispatch::{Dispatcher, Outcome};
use crate::gateway::ChannelHub;
use crate::message::{Author, ChannelId, Message};
use bytes::BytesMut;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace, warn};

/// Maximum length of a single line (64 KB)
pub const MAX_LINE_LENGTH: usize = 64 * 1024;

/// `HELLO` word that marks the author as a bot instead of granting a permission
const BOT_MARKER: &str = "bot";

/// Initial buffer capacity
const INITIAL_BUFFER_SIZE: usize = 4096;

/// Statistics for the gateway
#[derive(Debug, Default)]
pub struct GatewayStats {
    /// Total number of connections accepted
    pub connections_accepted: AtomicU64,
    /// Currently active connections
    pub active_connections: AtomicU64,
    /// Total lines received
    pub lines_received: AtomicU64,
    /// Total bytes read
    pub bytes_read: AtomicU64,
    /// Total bytes written
    pub bytes_written: AtomicU64,
}

impl GatewayStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_opened(&self) {
        self.connections_accepted.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn line_received(&self) {
        self.lines_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bytes_read(&self, count: usize) {
        self.bytes_read.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn bytes_written(&self, count: usize) {
        self.bytes_written
            .fetch_add(count as u64, Ordering::Relaxed);
    }
}

/// Handles a single client connection.
pub struct ConnectionHandler {
    /// The TCP stream for this connection
    stream: BufWriter<TcpStream>,

    /// Client's address (for logging)
    addr: SocketAddr,

    /// Buffer for incoming data
    buffer: BytesMut,

    /// The channel this connection represents
    channel: ChannelId,

    /// Author attached to outgoing messages, changed by `HELLO`
    author: Author,

    /// Responses the dispatcher addressed to this channel
    outbox: mpsc::UnboundedReceiver<String>,

    /// The dispatcher (shared across connections)
    dispatcher: Dispatcher,

    hub: Arc<ChannelHub>,

    /// Gateway statistics (shared)
    stats: Arc<GatewayStats>,
}

impl ConnectionHandler {
    /// Creates a new connection handler and opens its channel in `hub`.
    pub fn new(
        stream: TcpStream,
        addr: SocketAddr,
        dispatcher: Dispatcher,
        hub: Arc<ChannelHub>,
        stats: Arc<GatewayStats>,
    ) -> Self {
        stats.connection_opened();

        let channel = ChannelId::new(format!("tcp-{}", addr));
        let outbox = hub.open(channel.clone());

        Self {
            stream: BufWriter::new(stream),
            addr,
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_SIZE),
            channel,
            author: Author::new(addr.to_string(), format!("guest-{}", addr.port())),
            outbox,
            dispatcher,
            hub,
            stats,
        }
    }

    /// Runs the main connection loop until the client disconnects or an
    /// error occurs.
    pub async fn run(mut self) -> Result<(), GatewayError> {
        info!(client = %self.addr, channel = %self.channel, "Client connected");

        let result = self.main_loop().await;

        match &result {
            Ok(()) => info!(client = %self.addr, "Client disconnected gracefully"),
            Err(GatewayError::ClientDisconnected) => {
                debug!(client = %self.addr, "Client disconnected")
            }
            Err(GatewayError::IoError(io_err))
                if io_err.kind() == std::io::ErrorKind::ConnectionReset =>
            {
                debug!(client = %self.addr, "Connection reset by client")
            }
            Err(e) => warn!(client = %self.addr, error = %e, "Connection error"),
        }

        self.hub.close(&self.channel);
        self.stats.connection_closed();
        result
    }

    /// The main read-dispatch-respond loop.
    async fn main_loop(&mut self) -> Result<(), GatewayError> {
        loop {
            while let Some(line) = self.try_take_line()? {
                self.stats.line_received();
                self.handle_line(line).await?;
            }

            self.read_more_data().await?;
        }
    }

    /// Takes one complete line off the front of the buffer.
    fn try_take_line(&mut self) -> Result<Option<String>, GatewayError> {
        let newline = match self.buffer.iter().position(|&b| b == b'\n') {
            Some(pos) => pos,
            None if self.buffer.len() >= MAX_LINE_LENGTH => {
                error!(
                    client = %self.addr,
                    size = self.buffer.len(),
                    "Line length limit exceeded"
                );
                return Err(GatewayError::LineTooLong);
            }
            None => return Ok(None),
        };

        let raw = self.buffer.split_to(newline + 1);
        let line = String::from_utf8_lossy(&raw[..newline]);
        let line = line.strip_suffix('\r').unwrap_or(&line).to_string();

        trace!(client = %self.addr, remaining = self.buffer.len(), "Took line");
        Ok(Some(line))
    }

    async fn handle_line(&mut self, line: String) -> Result<(), GatewayError> {
        if line.trim().is_empty() {
            return Ok(());
        }

        if let Some(rest) = line.strip_prefix("HELLO ") {
            return self.hello(rest).await;
        }

        let message = Message::new(line, self.channel.clone(), self.author.clone());
        let result = self.dispatcher.handle_message(message).await;

        // Anything the dispatcher sent through the hub goes out first
        while let Ok(text) = self.outbox.try_recv() {
            self.send_line(&text).await?;
        }

        match result {
            Ok(Outcome::Completed(value)) if !value.is_null() => {
                self.send_line(&value.to_string()).await?;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(client = %self.addr, error = %e, "Command failed");
                self.send_line(&format!("error: {}", e)).await?;
            }
        }

        Ok(())
    }

    /// `HELLO <name> [permission ...]`
    async fn hello(&mut self, rest: &str) -> Result<(), GatewayError> {
        let mut words = rest.split_whitespace();
        let name = match words.next() {
            Some(name) => name,
            None => return self.send_line("usage: HELLO <name> [permission ...]").await,
        };

        let mut author = Author::new(name, name);
        for permission in words {
            author = if permission == BOT_MARKER {
                author.bot()
            } else {
                author.with_permission(permission)
            };
        }
        debug!(client = %self.addr, author = %name, "Author changed");
        self.author = author;

        self.send_line(&format!("Welcome, {}!", name)).await
    }

    /// Reads more data from the socket into the buffer.
    async fn read_more_data(&mut self) -> Result<(), GatewayError> {
        if self.buffer.capacity() - self.buffer.len() < 1024 {
            self.buffer.reserve(INITIAL_BUFFER_SIZE);
        }

        let n = self.stream.get_mut().read_buf(&mut self.buffer).await?;

        if n == 0 {
            if self.buffer.is_empty() {
                return Err(GatewayError::ClientDisconnected);
            } else {
                // Partial line in buffer
                return Err(GatewayError::UnexpectedEof);
            }
        }

        self.stats.bytes_read(n);
        trace!(client = %self.addr, bytes = n, "Read data");

        Ok(())
    }

    /// Writes one line to the client.
    async fn send_line(&mut self, text: &str) -> Result<(), GatewayError> {
        self.stream.write_all(text.as_bytes()).await?;
        self.stream.write_all(b"\n").await?;
        self.stream.flush().await?;
        self.stats.bytes_written(text.len() + 1);
        Ok(())
    }
}

/// Errors that can occur while handling a connection.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// I/O error (network issue)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Client disconnected normally
    #[error("Client disconnected")]
    ClientDisconnected,

    /// Unexpected end of stream (partial line)
    #[error("Unexpected end of stream")]
    UnexpectedEof,

    /// A line exceeded [`MAX_LINE_LENGTH`]
    #[error("Line length limit exceeded")]
    LineTooLong,
}

/// Handles a client connection to completion.
pub async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    dispatcher: Dispatcher,
    hub: Arc<ChannelHub>,
    stats: Arc<GatewayStats>,
) {
    let handler = ConnectionHandler::new(stream, addr, dispatcher, hub, stats);
    if let Err(e) = handler.run().await {
        match e {
            GatewayError::ClientDisconnected => {}
            GatewayError::IoError(ref io_err)
                if io_err.kind() == std::io::ErrorKind::ConnectionReset => {}
            _ => {
                debug!(client = %addr, error = %e, "Connection ended with error");
            }
        }
    }
}

/// Accepts connections forever, one task per client.
pub async fn serve(
    listener: TcpListener,
    dispatcher: Dispatcher,
    hub: Arc<ChannelHub>,
    stats: Arc<GatewayStats>,
) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let dispatcher = dispatcher.clone();
                let hub = Arc::clone(&hub);
                let stats = Arc::clone(&stats);

                tokio::spawn(async move {
                    handle_connection(stream, addr, dispatcher, hub, stats).await;
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
