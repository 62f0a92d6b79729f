//! Line-oriented client connections
//!
//! Each connection is split in two. A reader task owns the read half, cuts
//! the byte stream into trimmed lines and forwards them into an inbox
//! channel; the write half stays with whoever owns the [`Connection`]
//! (a registration handler, the registrar, then the game engine). Waiting on
//! the inbox is cancellation safe, so turn and vote timeouts never lose a
//! partially received line. Writes are bounded too: a peer that stops
//! reading fails the send instead of stalling the owner.

use log::{debug, warn};
use shared::{encode_line, ServerMessage, MAX_LINE_LEN};
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, WriteHalf};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{timeout, timeout_at, Instant};

/// Lines buffered per connection before the reader task waits
const INBOX_CAPACITY: usize = 32;

/// Longest a single message may take to write before the peer is given up
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(2);

/// Outcome of waiting for a line with a deadline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Received {
    Line(String),
    TimedOut,
    Closed,
}

type Writer = WriteHalf<Box<dyn Stream>>;

/// Anything a connection can be built on: TCP sockets in production,
/// in-memory pipes in tests.
pub trait Stream: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> Stream for T {}

pub struct Connection {
    addr: SocketAddr,
    writer: Writer,
    inbox: mpsc::Receiver<String>,
    reader: JoinHandle<()>,
    send_timeout: Duration,
}

impl Connection {
    pub fn new<S>(stream: S, addr: SocketAddr) -> Self
    where
        S: Stream + 'static,
    {
        let boxed: Box<dyn Stream> = Box::new(stream);
        let (read_half, writer) = tokio::io::split(boxed);
        let (tx, inbox) = mpsc::channel(INBOX_CAPACITY);
        let reader = tokio::spawn(read_lines(read_half, tx, addr));

        Self {
            addr,
            writer,
            inbox,
            reader,
            send_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }

    pub fn with_send_timeout(mut self, send_timeout: Duration) -> Self {
        self.send_timeout = send_timeout;
        self
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Writes one message as a JSON line. Fails with `TimedOut` if the peer
    /// does not take it within the send timeout.
    pub async fn send(&mut self, message: &ServerMessage) -> io::Result<()> {
        let line =
            encode_line(message).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let writer = &mut self.writer;
        let write = async move {
            writer.write_all(line.as_bytes()).await?;
            writer.flush().await
        };

        match timeout(self.send_timeout, write).await {
            Ok(result) => result,
            Err(_) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("peer did not read within {:?}", self.send_timeout),
            )),
        }
    }

    /// Waits for the next line. `None` once the peer has disconnected.
    pub async fn recv(&mut self) -> Option<String> {
        self.inbox.recv().await
    }

    pub async fn recv_until(&mut self, deadline: Instant) -> Received {
        match timeout_at(deadline, self.inbox.recv()).await {
            Ok(Some(line)) => Received::Line(line),
            Ok(None) => Received::Closed,
            Err(_) => Received::TimedOut,
        }
    }

    /// Drops lines the peer sent before being asked for input. Returns how
    /// many were dropped.
    pub fn discard_pending(&mut self) -> usize {
        let mut dropped = 0;
        while let Ok(line) = self.inbox.try_recv() {
            debug!("Discarding early input from {}: {:?}", self.addr, line);
            dropped += 1;
        }
        dropped
    }

    /// Flushes and shuts the socket down
    pub async fn close(mut self) {
        if let Err(e) = self.writer.shutdown().await {
            debug!("Error shutting down connection to {}: {}", self.addr, e);
        }
        self.reader.abort();
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection").field("addr", &self.addr).finish()
    }
}

/// Reader task: forwards complete lines until EOF, a read error, or the
/// owning connection going away. A line longer than [`MAX_LINE_LEN`] is cut
/// at that bound.
async fn read_lines<R>(mut reader: R, tx: mpsc::Sender<String>, addr: SocketAddr)
where
    R: AsyncRead + Unpin,
{
    let mut pending: Vec<u8> = Vec::with_capacity(MAX_LINE_LEN);
    let mut chunk = [0u8; MAX_LINE_LEN];

    loop {
        let len = match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(len) => len,
            Err(e) => {
                warn!("Error reading from {}: {}", addr, e);
                break;
            }
        };
        pending.extend_from_slice(&chunk[..len]);

        for line in split_lines(&mut pending) {
            if tx.send(line).await.is_err() {
                return;
            }
        }
    }

    // Whatever is left without a terminator still counts as a line
    if !pending.is_empty() {
        let line = decode(&pending);
        let _ = tx.send(line).await;
    }
    debug!("Connection from {} closed", addr);
}

/// Removes every complete line from `pending`
fn split_lines(pending: &mut Vec<u8>) -> Vec<String> {
    let mut lines = Vec::new();
    loop {
        if let Some(pos) = pending.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = pending.drain(..=pos).collect();
            lines.push(decode(&raw));
        } else if pending.len() >= MAX_LINE_LEN {
            let raw: Vec<u8> = pending.drain(..MAX_LINE_LEN).collect();
            lines.push(decode(&raw));
        } else {
            return lines;
        }
    }
}

fn decode(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).trim().to_string()
}
