//! Printer adapters for sending ESC/POS data
//!
//! One TCP connection per job (raw port 9100). The connection is opened,
//! written, half-closed and dropped inside a single call; nothing is pooled.
//!
//! Thermal printers commonly reset the connection as soon as their buffer
//! holds the job. Once every byte was written, a reset, a broken pipe or a
//! peer close is therefore reported as success.

use crate::error::{PrintResult, TransportError};
use shared::models::PrinterConfig;
use std::io;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Default write budget
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_millis(5000);
/// Default wait for the printer to react after the last byte
pub const DEFAULT_POST_WRITE_GRACE: Duration = Duration::from_millis(100);
/// Budget of the reachability probe
pub const ONLINE_CHECK_TIMEOUT: Duration = Duration::from_millis(500);

/// Trait for printer adapters
#[allow(async_fn_in_trait)]
pub trait Printer {
    /// Send raw ESC/POS data to the printer
    async fn print(&self, data: &[u8]) -> PrintResult<SendReport>;

    /// Check if the printer is online/reachable
    async fn is_online(&self) -> bool;
}

/// Opens the byte stream to a printer
#[allow(async_fn_in_trait)]
pub trait Connector {
    type Stream: AsyncRead + AsyncWrite + Unpin;

    async fn connect(&self, addr: &str) -> io::Result<Self::Stream>;
}

/// Plain TCP connector
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    type Stream = TcpStream;

    async fn connect(&self, addr: &str) -> io::Result<TcpStream> {
        let stream = TcpStream::connect(addr).await?;
        // Jobs are written once; don't wait for more data to coalesce
        stream.set_nodelay(true)?;
        Ok(stream)
    }
}

/// Connection lifecycle of one job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Connecting,
    Connected,
    Writing,
    Closing,
    TimedOut,
    Failed,
    ClosedOk,
    ClosedError,
}

/// Outcome of a delivered job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendReport {
    pub bytes_sent: usize,
    /// Printer closed or reset the connection after the write
    pub peer_closed: bool,
    pub elapsed: Duration,
}

/// Traces state transitions of a single connection
struct Session<'a> {
    addr: &'a str,
    state: ConnectionState,
}

impl<'a> Session<'a> {
    fn new(addr: &'a str) -> Self {
        Self {
            addr,
            state: ConnectionState::Idle,
        }
    }

    fn transition(&mut self, next: ConnectionState) {
        debug!(addr = self.addr, from = ?self.state, to = ?next, "Connection state");
        self.state = next;
    }

    /// TIMED_OUT/FAILED -> CLOSED_ERROR
    fn abort(&mut self, via: ConnectionState, err: TransportError) -> TransportError {
        self.transition(via);
        self.transition(ConnectionState::ClosedError);
        err
    }
}

/// Network printer (TCP port 9100)
///
/// Most thermal printers support raw TCP printing on port 9100.
#[derive(Debug, Clone)]
pub struct NetworkPrinter<C = TcpConnector> {
    addr: String,
    connector: C,
    connect_timeout: Duration,
    write_timeout: Duration,
    post_write_grace: Duration,
}

impl NetworkPrinter<TcpConnector> {
    /// Create a new network printer
    pub fn new(host: &str, port: u16) -> Self {
        Self::with_connector(host, port, TcpConnector)
    }

    /// Create from a resolved printer configuration
    pub fn from_config(config: &PrinterConfig) -> Self {
        Self::new(&config.host, config.port)
            .with_connect_timeout(Duration::from_millis(config.connect_timeout_ms))
    }
}

impl<C: Connector> NetworkPrinter<C> {
    /// Create a printer using a custom connector
    pub fn with_connector(host: &str, port: u16, connector: C) -> Self {
        Self {
            addr: format!("{}:{}", host, port),
            connector,
            connect_timeout: Duration::from_millis(shared::models::DEFAULT_CONNECT_TIMEOUT_MS),
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            post_write_grace: DEFAULT_POST_WRITE_GRACE,
        }
    }

    /// Set connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set write timeout
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Set how long to wait for the printer after the last byte
    pub fn with_post_write_grace(mut self, grace: Duration) -> Self {
        self.post_write_grace = grace;
        self
    }

    /// Get the printer address (`host:port`)
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Deliver one payload over a fresh connection
    #[instrument(skip(self, data), fields(addr = %self.addr, data_len = data.len()))]
    pub async fn send(&self, data: &[u8]) -> PrintResult<SendReport> {
        let started = Instant::now();
        let mut session = Session::new(&self.addr);

        session.transition(ConnectionState::Connecting);
        let connect_ms = self.connect_timeout.as_millis() as u64;
        let mut stream =
            match tokio::time::timeout(self.connect_timeout, self.connector.connect(&self.addr))
                .await
            {
                Ok(Ok(stream)) => stream,
                Ok(Err(e)) => {
                    let err = classify_connect_error(&self.addr, connect_ms, e);
                    let via = match err {
                        TransportError::ConnectTimeout { .. } => ConnectionState::TimedOut,
                        _ => ConnectionState::Failed,
                    };
                    warn!(error = %err, "Connect failed");
                    return Err(session.abort(via, err));
                }
                Err(_) => {
                    let err = TransportError::ConnectTimeout {
                        addr: self.addr.clone(),
                        timeout_ms: connect_ms,
                    };
                    warn!(error = %err, "Connect timed out");
                    return Err(session.abort(ConnectionState::TimedOut, err));
                }
            };
        session.transition(ConnectionState::Connected);

        info!("Connected, sending {} bytes", data.len());
        session.transition(ConnectionState::Writing);

        let mut written = 0usize;
        let write = tokio::time::timeout(
            self.write_timeout,
            write_payload(&mut stream, data, &mut written),
        )
        .await;
        match write {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let err = TransportError::WriteFailed {
                    addr: self.addr.clone(),
                    written,
                    source: e,
                };
                warn!(error = %err, "Write failed");
                return Err(session.abort(ConnectionState::Failed, err));
            }
            Err(_) => {
                let err = TransportError::PrinterTimeout {
                    addr: self.addr.clone(),
                    timeout_ms: self.write_timeout.as_millis() as u64,
                };
                warn!(error = %err, written, "Printer stopped accepting data");
                return Err(session.abort(ConnectionState::TimedOut, err));
            }
        }

        // Payload is delivered; nothing from here on can fail the job
        session.transition(ConnectionState::Closing);
        let peer_closed = self.settle(&mut stream).await;
        session.transition(ConnectionState::ClosedOk);
        drop(stream);

        let report = SendReport {
            bytes_sent: data.len(),
            peer_closed,
            elapsed: started.elapsed(),
        };
        info!(
            peer_closed,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Print job sent successfully"
        );
        Ok(report)
    }

    /// Like [`send`](Self::send), aborting when `token` is cancelled
    ///
    /// The in-flight connection is dropped (and closed) on cancellation.
    pub async fn send_cancellable(
        &self,
        data: &[u8],
        token: &CancellationToken,
    ) -> PrintResult<SendReport> {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                warn!(addr = %self.addr, "Print job cancelled");
                Err(TransportError::Cancelled { addr: self.addr.clone() })
            }
            result = self.send(data) => result,
        }
    }

    /// Flush, wait out the grace period, half-close
    ///
    /// Returns whether the printer closed or reset the connection.
    async fn settle(&self, stream: &mut C::Stream) -> bool {
        let mut peer_closed = false;

        match tokio::time::timeout(self.post_write_grace, stream.flush()).await {
            Ok(Err(e)) if is_peer_gone(&e) => {
                debug!(error = %e, "Peer closed during flush");
                peer_closed = true;
            }
            Ok(Err(e)) => debug!(error = %e, "Flush error after write ignored"),
            Ok(Ok(())) | Err(_) => {}
        }

        if !peer_closed {
            let mut buf = [0u8; 64];
            match tokio::time::timeout(self.post_write_grace, stream.read(&mut buf)).await {
                Ok(Ok(0)) => peer_closed = true,
                Ok(Ok(n)) => debug!(bytes = n, "Ignoring printer status bytes"),
                Ok(Err(e)) if is_peer_gone(&e) => {
                    debug!(error = %e, "Peer reset after write");
                    peer_closed = true;
                }
                Ok(Err(e)) => debug!(error = %e, "Read error after write ignored"),
                Err(_) => {}
            }
        }

        if let Ok(Err(e)) = tokio::time::timeout(self.post_write_grace, stream.shutdown()).await {
            debug!(error = %e, "Shutdown error ignored");
        }

        peer_closed
    }

    /// Reachability probe (connect only)
    #[instrument(skip(self), fields(addr = %self.addr))]
    pub async fn probe(&self) -> bool {
        match tokio::time::timeout(ONLINE_CHECK_TIMEOUT, self.connector.connect(&self.addr)).await
        {
            Ok(Ok(_)) => {
                info!("Printer online");
                true
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Printer offline");
                false
            }
            Err(_) => {
                warn!("Printer check timeout");
                false
            }
        }
    }
}

impl<C: Connector> Printer for NetworkPrinter<C> {
    async fn print(&self, data: &[u8]) -> PrintResult<SendReport> {
        self.send(data).await
    }

    async fn is_online(&self) -> bool {
        self.probe().await
    }
}

async fn write_payload<S: AsyncWrite + Unpin>(
    stream: &mut S,
    data: &[u8],
    written: &mut usize,
) -> io::Result<()> {
    while *written < data.len() {
        let n = stream.write(&data[*written..]).await?;
        if n == 0 {
            return Err(io::Error::from(io::ErrorKind::WriteZero));
        }
        *written += n;
    }
    Ok(())
}

/// Map a connect error onto the transport taxonomy
fn classify_connect_error(addr: &str, timeout_ms: u64, e: io::Error) -> TransportError {
    let addr = addr.to_string();
    match e.kind() {
        io::ErrorKind::ConnectionRefused => TransportError::ConnectRefused { addr },
        io::ErrorKind::HostUnreachable | io::ErrorKind::NetworkUnreachable => {
            TransportError::HostUnreachable { addr, source: e }
        }
        io::ErrorKind::TimedOut => TransportError::ConnectTimeout { addr, timeout_ms },
        _ => TransportError::ConnectFailed { addr, source: e },
    }
}

fn is_peer_gone(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionReset
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::UnexpectedEof
    )
}
