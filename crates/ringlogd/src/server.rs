//! TCP front end for the ring log.
//!
//! Wire protocol is plain newline-delimited text. Each complete line a
//! client sends becomes one record; after the record commits, the daemon
//! replies with the entire current log content. The one exception is the
//! seek command line `RINGLOG_SEEKTO:X,Y\n`, which is not recorded:
//! it repositions the reply to start `Y` bytes into record `X` (oldest
//! record is 0) and streams from there to the end.

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::BytesMut;
use ringlog_core::{Config, Error, LogStore};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use crate::heartbeat;

/// Command line that repositions the reply instead of being recorded.
pub const SEEK_COMMAND_PREFIX: &[u8] = b"RINGLOG_SEEKTO:";

const REPLY_CHUNK: usize = 4096;

/// Ring log server
pub struct Server {
    config: Config,
    store: Arc<LogStore>,
    listener: Option<TcpListener>,
    shutdown_tx: broadcast::Sender<()>,
    // Subscribed at construction so a shutdown sent any time after `new()`
    // is buffered for the accept loop and the heartbeat, even before
    // `start()` is first polled.
    shutdown_rx: broadcast::Receiver<()>,
    heartbeat_rx: broadcast::Receiver<()>,
}

impl Server {
    /// Create a new server with the given configuration
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Pre-bind the listener so we can report the actual address
        let addr = config.server_address();
        let listener = TcpListener::bind(&addr).await?;
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let heartbeat_rx = shutdown_tx.subscribe();

        Ok(Self {
            store: Arc::new(LogStore::new(config.capacity)),
            config,
            listener: Some(listener),
            shutdown_tx,
            shutdown_rx,
            heartbeat_rx,
        })
    }

    /// Get the local address the server is bound to
    ///
    /// Useful for tests where port 0 is used for random port selection.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener
            .as_ref()
            .ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::NotConnected, "Server not bound")
            })
            .and_then(|l| l.local_addr())
    }

    /// Shared handle to the underlying store.
    pub fn store(&self) -> Arc<LogStore> {
        Arc::clone(&self.store)
    }

    /// Sender that stops the accept loop and the heartbeat when signalled.
    pub fn shutdown_handle(&self) -> broadcast::Sender<()> {
        self.shutdown_tx.clone()
    }

    /// Run the accept loop until shutdown is signalled.
    pub async fn start(mut self) -> anyhow::Result<()> {
        let listener = self
            .listener
            .take()
            .ok_or_else(|| anyhow::anyhow!("Server already started"))?;

        let addr = listener.local_addr()?;
        info!("Starting ringlogd on {}", addr);

        if self.config.heartbeat_enabled() {
            tokio::spawn(heartbeat::run(
                Arc::clone(&self.store),
                self.config.heartbeat_secs,
                self.heartbeat_rx,
            ));
        }

        let mut shutdown_rx = self.shutdown_rx;
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("Shutdown requested, closing listener");
                    return Ok(());
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        info!("Accepted connection from {}", peer);
                        let store = Arc::clone(&self.store);

                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(stream, store, peer).await {
                                error!("Error handling connection from {}: {}", peer, e);
                            }
                        });
                    }
                    Err(e) => {
                        error!("Error accepting connection: {}", e);
                    }
                },
            }
        }
    }
}

/// Handle a single client connection
async fn handle_connection(
    mut stream: TcpStream,
    store: Arc<LogStore>,
    peer: SocketAddr,
) -> anyhow::Result<()> {
    let mut buffer = BytesMut::with_capacity(8192);

    loop {
        let n = stream.read_buf(&mut buffer).await?;
        if n == 0 {
            // A partial line with no terminating newline is dropped with
            // the connection.
            info!("Closed connection from {}", peer);
            return Ok(());
        }

        while let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
            let line = buffer.split_to(pos + 1).freeze();
            if let Some(reply_from) = process_line(&store, &line) {
                stream_from(&store, reply_from, &mut stream).await?;
            }
        }
    }
}

/// Applies one complete line, returning the offset the reply should start
/// from, or `None` when there is nothing to send.
fn process_line(store: &LogStore, line: &[u8]) -> Option<u64> {
    if let Some((record, offset)) = parse_seek_command(line) {
        return match store.seek_to_record(record, offset) {
            Ok(abs) => Some(abs),
            Err(e) => {
                warn!("Rejected seek to record {}, offset {}: {}", record, offset, e);
                None
            }
        };
    }

    match store.write(line) {
        // The line ends in a newline, so the write always commits.
        Ok(_) => Some(0),
        Err(e @ Error::OutOfMemory(_)) => {
            error!("Dropped write of {} bytes: {}", line.len(), e);
            None
        }
        Err(e) => {
            error!("Write failed: {}", e);
            None
        }
    }
}

/// Parses `RINGLOG_SEEKTO:X,Y` (with trailing newline) into (X, Y).
fn parse_seek_command(line: &[u8]) -> Option<(u32, u32)> {
    let rest = line.strip_prefix(SEEK_COMMAND_PREFIX)?;
    let rest = rest.strip_suffix(b"\n").unwrap_or(rest);
    let text = std::str::from_utf8(rest).ok()?;
    let (record, offset) = text.split_once(',')?;
    Some((record.parse().ok()?, offset.parse().ok()?))
}

/// Streams committed content from `offset` to the current end of data.
async fn stream_from(
    store: &LogStore,
    mut offset: u64,
    stream: &mut TcpStream,
) -> anyhow::Result<()> {
    loop {
        let data = store.read_at(offset, REPLY_CHUNK);
        if data.is_empty() {
            return Ok(());
        }
        stream.write_all(&data).await?;
        offset += data.len() as u64;
    }
}
