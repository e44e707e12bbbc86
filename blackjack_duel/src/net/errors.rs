//! Transport error types for connection setup and the peer link.

use std::{io, net::SocketAddr};
use thiserror::Error;

/// Errors from establishing or using the peer link. Setup variants are
/// recoverable (the caller may retry with new input); a `Link` error means
/// the current session's channel is gone.
#[derive(Debug, Error)]
pub enum NetError {
    /// Failed to bind the listening port.
    #[error("couldn't listen on port {port}: {source}")]
    Bind { port: u16, source: io::Error },

    /// Failed while waiting for the one inbound peer.
    #[error("couldn't accept a peer: {0}")]
    Accept(io::Error),

    /// Outbound connection refused or timed out.
    #[error("couldn't reach {addr}: {source}")]
    Connect { addr: SocketAddr, source: io::Error },

    /// The established stream failed mid-session.
    #[error("peer link lost: {0}")]
    Link(#[from] io::Error),
}
