//! TCP frame transport.
//!
//! One [`FrameTransport`] owns at most one connection at a time. Outbound
//! frames go through a single locked writer so the per-frame length fields
//! are never built for two frames at once. A background task reads the
//! inbound half, splits it into frames and forwards them as
//! [`TransportEvent`]s.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::SystemTime;

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use lanc_frame::{Frame, FrameDecoder, FrameEncoder, OutboundMessage, TransmitHeader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpSocket;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, info, trace, warn};

use crate::config::TransportConfig;
use crate::error::{Result, TransportError};
use crate::state::ConnectionState;

/// A frame as it came off the wire, with its capture time.
#[derive(Debug, Clone)]
pub struct ReceivedFrame {
    pub frame: Frame,
    pub received_at: SystemTime,
}

/// Everything the transport reports to its owner.
#[derive(Debug)]
pub enum TransportEvent {
    Frame(ReceivedFrame),
    /// A socket, framing or idle failure. Always followed by `Disconnected`.
    Error(TransportError),
    /// The connection is gone, for whatever reason.
    Disconnected,
}

type Writer = FramedWrite<OwnedWriteHalf, FrameEncoder>;
type Reader = FramedRead<OwnedReadHalf, FrameDecoder>;

struct Inner {
    addr: SocketAddr,
    header: TransmitHeader,
    config: TransportConfig,
    state: watch::Sender<ConnectionState>,
    writer: Mutex<Option<Writer>>,
    reader_task: StdMutex<Option<JoinHandle<()>>>,
    events: mpsc::UnboundedSender<TransportEvent>,
    /// Identifies the live connection; bumped on every connect and teardown.
    generation: AtomicU64,
    last_activity: StdMutex<Instant>,
}

/// Framed TCP connection to a single device.
///
/// Cheap to clone; clones share the connection.
#[derive(Clone)]
pub struct FrameTransport {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for FrameTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameTransport")
            .field("addr", &self.inner.addr)
            .field("state", &self.state())
            .finish()
    }
}

impl FrameTransport {
    /// Create a disconnected transport and the receiver for its events.
    pub fn new(
        addr: SocketAddr,
        header: TransmitHeader,
        config: TransportConfig,
    ) -> (Self, mpsc::UnboundedReceiver<TransportEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        let inner = Inner {
            addr,
            header,
            config,
            state,
            writer: Mutex::new(None),
            reader_task: StdMutex::new(None),
            events,
            generation: AtomicU64::new(0),
            last_activity: StdMutex::new(Instant::now()),
        };
        (
            Self {
                inner: Arc::new(inner),
            },
            rx,
        )
    }

    pub fn addr(&self) -> SocketAddr {
        self.inner.addr
    }

    pub fn header(&self) -> &TransmitHeader {
        &self.inner.header
    }

    pub fn state(&self) -> ConnectionState {
        *self.inner.state.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Watch connection state changes.
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state.subscribe()
    }

    /// Connect if not already connected.
    ///
    /// Concurrent callers share one attempt: whoever finds the transport
    /// disconnected opens the socket, everyone else waits for the outcome.
    pub async fn connect(&self) -> Result<()> {
        loop {
            match self.state() {
                ConnectionState::Connected => return Ok(()),
                ConnectionState::Connecting => {
                    self.settle().await;
                    return if self.is_connected() {
                        Ok(())
                    } else {
                        Err(TransportError::NotConnected)
                    };
                }
                ConnectionState::Closing => self.settle().await,
                ConnectionState::Disconnected => {
                    let claimed = self.inner.state.send_if_modified(|state| {
                        transition(state, ConnectionState::Disconnected, ConnectionState::Connecting)
                    });
                    if !claimed {
                        continue;
                    }
                    return match self.open().await {
                        Ok(()) => Ok(()),
                        Err(err) => {
                            self.inner.generation.fetch_add(1, Ordering::SeqCst);
                            self.inner.state.send_replace(ConnectionState::Disconnected);
                            warn!(addr = %self.inner.addr, error = %err, "connect failed");
                            Err(err)
                        }
                    };
                }
            }
        }
    }

    async fn settle(&self) {
        let mut rx = self.inner.state.subscribe();
        // The sender lives in `inner`, so this only ends once settled.
        let _ = rx.wait_for(|state| !state.is_transient()).await;
    }

    async fn open(&self) -> Result<()> {
        let addr = self.inner.addr;
        let config = &self.inner.config;
        debug!(%addr, "connecting");

        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        socket.set_keepalive(config.tcp_keepalive)?;

        let stream = tokio::time::timeout(config.connect_timeout, socket.connect(addr))
            .await
            .map_err(|_| TransportError::Timeout {
                operation: "connect",
                after: config.connect_timeout,
            })?
            .map_err(|source| TransportError::Connect { addr, source })?;
        stream.set_nodelay(true)?;

        let (read_half, write_half) = stream.into_split();
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *self.inner.writer.lock().await = Some(FramedWrite::new(
            write_half,
            FrameEncoder::new(self.inner.header.clone()),
        ));
        self.inner.touch();
        self.inner.state.send_replace(ConnectionState::Connected);

        // Spawned last so a teardown by the reader always wins.
        let reader = FramedRead::new(read_half, FrameDecoder::new(config.max_frame));
        let task = tokio::spawn(read_loop(Arc::clone(&self.inner), reader, generation));
        if let Some(previous) = self.inner.reader_task().replace(task) {
            previous.abort();
        }
        info!(%addr, "connected");
        Ok(())
    }

    /// Frame and write one envelope/body pair.
    ///
    /// Fails with [`TransportError::NotConnected`] unless connected. A write
    /// failure tears the connection down.
    pub async fn send(&self, operation: Bytes, command: Bytes) -> Result<()> {
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }
        let mut guard = self.inner.writer.lock().await;
        let generation = self.inner.generation.load(Ordering::SeqCst);
        let writer = guard.as_mut().ok_or(TransportError::NotConnected)?;

        self.inner.dump("TX", &operation, &command);
        match writer.send(OutboundMessage::new(operation, command)).await {
            Ok(()) => {
                drop(guard);
                self.inner.touch();
                Ok(())
            }
            Err(err) => {
                guard.take();
                drop(guard);
                warn!(error = %err, "write failed, closing connection");
                self.inner.teardown(generation, true).await;
                Err(err.into())
            }
        }
    }

    /// Close the connection. Does nothing when already disconnected.
    pub async fn close(&self) {
        if self.state() == ConnectionState::Connecting {
            self.settle().await;
        }
        let claimed = self.inner.state.send_if_modified(|state| {
            transition(state, ConnectionState::Connected, ConnectionState::Closing)
        });
        if !claimed {
            return;
        }
        let generation = self.inner.generation.load(Ordering::SeqCst);
        if let Some(mut writer) = self.inner.writer.lock().await.take() {
            if let Err(err) = writer.close().await {
                debug!(error = %err, "error while shutting down writer");
            }
        }
        self.inner.teardown(generation, true).await;
        // The reader may have torn this connection down first.
        self.inner.state.send_if_modified(|state| {
            transition(state, ConnectionState::Closing, ConnectionState::Disconnected)
        });
        debug!(addr = %self.inner.addr, "connection closed");
    }
}

impl Inner {
    fn reader_task(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.reader_task
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn touch(&self) {
        *self
            .last_activity
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Instant::now();
    }

    fn last_activity(&self) -> Instant {
        *self
            .last_activity
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn dump(&self, direction: &str, operation: &[u8], command: &[u8]) {
        if self.config.log_payloads {
            debug!(
                direction,
                operation = %hex::encode(operation),
                command = %hex::encode(command),
                "frame"
            );
        } else {
            trace!(
                direction,
                operation = %hex::encode(operation),
                command = %hex::encode(command),
                "frame"
            );
        }
    }

    fn emit(&self, event: TransportEvent) {
        // The owner may have dropped the receiver during shutdown.
        let _ = self.events.send(event);
    }

    /// Drop connection `generation` if it is still the live one.
    async fn teardown(&self, generation: u64, abort_reader: bool) {
        if self
            .generation
            .compare_exchange(generation, generation + 1, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }
        self.writer.lock().await.take();
        let task = self.reader_task().take();
        if abort_reader {
            if let Some(task) = task {
                task.abort();
            }
        }
        self.state.send_replace(ConnectionState::Disconnected);
        self.emit(TransportEvent::Disconnected);
    }
}

/// Move `state` from `from` to `to`; false if it was elsewhere.
fn transition(state: &mut ConnectionState, from: ConnectionState, to: ConnectionState) -> bool {
    if *state == from {
        *state = to;
        true
    } else {
        false
    }
}

async fn read_loop(inner: Arc<Inner>, mut reader: Reader, generation: u64) {
    loop {
        let next = match inner.config.idle_timeout {
            None => reader.next().await,
            Some(idle) => {
                let deadline = inner.last_activity() + idle;
                match tokio::time::timeout_at(deadline, reader.next()).await {
                    Ok(next) => next,
                    Err(_) if inner.last_activity() + idle > Instant::now() => continue,
                    Err(_) => {
                        warn!(?idle, "connection idle, closing");
                        inner.emit(TransportEvent::Error(TransportError::IdleTimeout(idle)));
                        break;
                    }
                }
            }
        };

        match next {
            Some(Ok(frame)) => {
                inner.touch();
                inner.dump("RX", &frame.operation, &frame.command);
                inner.emit(TransportEvent::Frame(ReceivedFrame {
                    frame,
                    received_at: SystemTime::now(),
                }));
            }
            Some(Err(err)) => {
                warn!(error = %err, "inbound stream failed, closing connection");
                inner.emit(TransportEvent::Error(err.into()));
                break;
            }
            None => {
                info!(addr = %inner.addr, "connection closed by device");
                break;
            }
        }
    }
    inner.teardown(generation, false).await;
}
