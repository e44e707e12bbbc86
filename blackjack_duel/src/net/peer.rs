//! The replication channel between the two peers.
//!
//! Connection establishment has two roles: the host binds a well-known port
//! and accepts exactly one inbound peer; the connector dials out with a
//! bounded timeout. Either way the result is one [`PeerChannel`] per peer,
//! exclusively owning its half of the stream. A background thread runs the
//! blocking receive loop and queues decoded actions for whatever thread owns
//! the session, which keeps the state machine single-writer.

use log::{debug, info};
use std::{
    io,
    net::{Ipv4Addr, SocketAddr, TcpListener, TcpStream},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc,
    },
    thread,
    time::Duration,
};

use super::{errors::NetError, messages::Action, utils};

/// Well-known port the peers meet on.
pub const DEFAULT_PORT: u16 = 55555;

/// How long the connector waits for the host before giving up.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// The host role: bound and listening, waiting for the one inbound peer.
#[derive(Debug)]
pub struct Listener {
    inner: TcpListener,
}

impl Listener {
    /// Bind the listening socket on all interfaces.
    ///
    /// # Errors
    ///
    /// Returns a setup error if the port can't be bound; the caller may
    /// retry with different input.
    pub fn bind(port: u16) -> Result<Self, NetError> {
        let inner = TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
            .map_err(|source| NetError::Bind { port, source })?;
        Ok(Self { inner })
    }

    /// The bound address, useful when binding port 0.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket's local address can't be read.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.inner.local_addr()
    }

    /// Block until the one peer connects. Consumes the listener, so the
    /// listening socket closes and the accepted stream becomes the data
    /// channel.
    ///
    /// # Errors
    ///
    /// Returns a setup error if accepting fails.
    pub fn accept(self) -> Result<PeerChannel, NetError> {
        let (stream, addr) = self.inner.accept().map_err(NetError::Accept)?;
        info!("peer connected from {addr}");
        Ok(PeerChannel::from_stream(stream))
    }
}

/// One established bidirectional action stream to the remote peer.
#[derive(Debug)]
pub struct PeerChannel {
    stream: TcpStream,
    connected: Arc<AtomicBool>,
}

impl PeerChannel {
    /// The connector role: dial the host, bounded by [`CONNECT_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// Returns a setup error on refusal or timeout; the caller may retry
    /// with a different address.
    pub fn connect(addr: SocketAddr) -> Result<Self, NetError> {
        let stream = TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT)
            .map_err(|source| NetError::Connect { addr, source })?;
        info!("connected to {addr}");
        Ok(Self::from_stream(stream))
    }

    fn from_stream(stream: TcpStream) -> Self {
        Self {
            stream,
            connected: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Best-effort synchronous send of one action record.
    ///
    /// # Errors
    ///
    /// Returns a link error and marks the channel disconnected if the write
    /// fails. Local state that already changed is not rolled back.
    pub fn send(&mut self, action: &Action) -> Result<(), NetError> {
        match utils::write_prefixed(&mut self.stream, action) {
            Ok(()) => {
                debug!("sent {action}");
                Ok(())
            }
            Err(source) => {
                self.connected.store(false, Ordering::Release);
                Err(NetError::Link(source))
            }
        }
    }

    /// Spawn the background receive loop and hand back its queue.
    ///
    /// The loop blocks on the stream, and each decoded action is queued
    /// before the next read begins: delivery is sequential, in wire order,
    /// with no concurrent delivery from the same channel. A zero-length
    /// read (peer closed) or a decode failure marks the channel
    /// disconnected and ends the loop; there is no retry and no reconnect.
    ///
    /// # Errors
    ///
    /// Returns a link error if the stream handle can't be cloned for the
    /// receiver thread.
    pub fn start_receiver(&self) -> Result<mpsc::Receiver<Action>, NetError> {
        let mut stream = self.stream.try_clone().map_err(NetError::Link)?;
        let connected = Arc::clone(&self.connected);
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            while connected.load(Ordering::Acquire) {
                match utils::read_prefixed::<Action, TcpStream>(&mut stream) {
                    Ok(action) => {
                        debug!("received {action}");
                        if tx.send(action).is_err() {
                            // Queue consumer is gone; the session is over.
                            break;
                        }
                    }
                    Err(error) => {
                        info!("peer link closed: {error}");
                        break;
                    }
                }
            }
            connected.store(false, Ordering::Release);
        });
        Ok(rx)
    }

    /// Whether the link is still believed up. Flips false on send failure,
    /// EOF, or a decode failure in the receive loop.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// The remote peer's address.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket's peer address can't be read.
    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        self.stream.peer_addr()
    }
}
