//! Errors raised by [`Receiver`](super::Receiver) operations.

use std::{io, net::SocketAddr};

use thiserror::Error;

/// Errors that end the receive loop or prevent it from starting.
#[derive(Debug, Error)]
pub enum ReceiverError {
    /// Creating, configuring, or binding the UDP socket failed.
    #[error("failed to bind UDP socket on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    /// The socket reported an unrecoverable error.
    #[error("socket closed: {0}")]
    Closed(#[source] io::Error),
}
