//! UDP socket setup and bounded receives.

use std::{
    io,
    net::{SocketAddr, UdpSocket as StdUdpSocket},
    time::Duration,
};

use log::{debug, warn};
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use tokio::{net::UdpSocket, time::timeout};

use super::{ReceiverConfig, ReceiverError};

/// Create, configure, and bind the listening socket.
///
/// `SO_REUSEADDR` and `SO_RCVBUF` are applied before binding. A receive
/// buffer request the kernel refuses is logged and otherwise ignored.
/// Must be called from within a Tokio runtime.
///
/// # Errors
///
/// Returns [`ReceiverError::Bind`] if the socket cannot be created, bound,
/// or registered with the runtime.
pub fn bind_socket(config: &ReceiverConfig) -> Result<UdpSocket, ReceiverError> {
    let addr = config.bind_address();
    let bind_err = |source| ReceiverError::Bind { addr, source };

    let socket = Socket::new(Domain::for_address(addr), Type::DGRAM, Some(Protocol::UDP))
        .map_err(bind_err)?;
    socket.set_reuse_address(true).map_err(bind_err)?;
    apply_recv_buffer_size(&socket, config.recv_buffer_bytes());
    socket.set_nonblocking(true).map_err(bind_err)?;
    socket.bind(&SockAddr::from(addr)).map_err(bind_err)?;

    UdpSocket::from_std(StdUdpSocket::from(socket)).map_err(bind_err)
}

fn apply_recv_buffer_size(socket: &Socket, requested: usize) {
    if let Err(err) = socket.set_recv_buffer_size(requested) {
        warn!("could not request {requested} byte receive buffer: {err}");
        return;
    }
    if let Ok(effective) = socket.recv_buffer_size() {
        debug!("receive buffer requested={requested} effective={effective}");
    }
}

/// Result of one bounded receive.
#[derive(Debug)]
pub enum RecvOutcome {
    /// `len` bytes were written to the buffer.
    Datagram { len: usize, from: SocketAddr },
    /// Nothing usable arrived within the wait.
    TimedOut,
    /// The socket failed and cannot be used again.
    Closed(io::Error),
}

/// Wait up to `wait` for one datagram.
///
/// Transient errors, including ICMP port-unreachable reports that some
/// platforms surface on the next receive, are logged and reported as
/// [`RecvOutcome::TimedOut`].
pub async fn recv_datagram(socket: &UdpSocket, buf: &mut [u8], wait: Duration) -> RecvOutcome {
    match timeout(wait, socket.recv_from(buf)).await {
        Err(_) => RecvOutcome::TimedOut,
        Ok(Ok((len, from))) => RecvOutcome::Datagram { len, from },
        Ok(Err(err)) if is_transient(&err) => {
            debug!("ignoring transient receive error: {err}");
            RecvOutcome::TimedOut
        }
        Ok(Err(err)) => RecvOutcome::Closed(err),
    }
}

fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
    )
}
