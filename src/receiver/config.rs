//! Tunables for the UDP receive loop.

use std::{
    net::{Ipv4Addr, SocketAddr},
    num::NonZeroUsize,
    time::Duration,
};

use crate::reassembler::DEFAULT_MAX_FRAME_SIZE;

/// Port the camera firmware streams to.
pub const DEFAULT_PORT: u16 = 3333;
/// Requested `SO_RCVBUF`: 4 MiB.
pub const DEFAULT_RECV_BUFFER_SIZE: usize = 4 * 1024 * 1024;
/// How long a single receive waits before the loop checks for shutdown.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(500);
/// Largest datagram read in one call.
pub const DEFAULT_MAX_DATAGRAM_LEN: NonZeroUsize = match NonZeroUsize::new(65_536) {
    Some(len) => len,
    None => panic!("default datagram length must be non-zero"),
};

/// Socket and reassembly settings for a [`Receiver`](super::Receiver).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use snapwire::receiver::ReceiverConfig;
///
/// let config = ReceiverConfig::default()
///     .bind_addr(([127, 0, 0, 1], 0).into())
///     .poll_timeout(Duration::from_millis(50));
/// assert_eq!(config.poll_timeout_duration(), Duration::from_millis(50));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReceiverConfig {
    bind_addr: SocketAddr,
    recv_buffer_size: usize,
    poll_timeout: Duration,
    max_datagram_len: NonZeroUsize,
    max_frame_size: NonZeroUsize,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            recv_buffer_size: DEFAULT_RECV_BUFFER_SIZE,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            max_datagram_len: DEFAULT_MAX_DATAGRAM_LEN,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

impl ReceiverConfig {
    /// Set the local address to listen on.
    #[must_use]
    pub fn bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the requested kernel receive buffer size. The kernel may clamp it.
    #[must_use]
    pub fn recv_buffer_size(mut self, bytes: usize) -> Self {
        self.recv_buffer_size = bytes;
        self
    }

    /// Set how long one receive call may wait.
    ///
    /// Zero is raised to one millisecond so the loop never spins.
    #[must_use]
    pub fn poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout.max(Duration::from_millis(1));
        self
    }

    /// Set the receive buffer length; longer datagrams are truncated by the
    /// operating system.
    #[must_use]
    pub fn max_datagram_len(mut self, len: NonZeroUsize) -> Self {
        self.max_datagram_len = len;
        self
    }

    /// Set the largest frame a header may declare.
    #[must_use]
    pub fn max_frame_size(mut self, size: NonZeroUsize) -> Self {
        self.max_frame_size = size;
        self
    }

    /// Local listen address.
    #[must_use]
    pub const fn bind_address(&self) -> SocketAddr { self.bind_addr }

    /// Requested `SO_RCVBUF` in bytes.
    #[must_use]
    pub const fn recv_buffer_bytes(&self) -> usize { self.recv_buffer_size }

    /// Wait applied to each receive call.
    #[must_use]
    pub const fn poll_timeout_duration(&self) -> Duration { self.poll_timeout }

    /// Length of the datagram read buffer.
    #[must_use]
    pub const fn datagram_buffer_len(&self) -> NonZeroUsize { self.max_datagram_len }

    /// Frame size cap handed to the reassembler.
    #[must_use]
    pub const fn frame_size_limit(&self) -> NonZeroUsize { self.max_frame_size }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn defaults_match_camera_deployment() {
        let config = ReceiverConfig::default();
        assert_eq!(config.bind_address(), "0.0.0.0:3333".parse().expect("addr"));
        assert_eq!(config.recv_buffer_bytes(), 4 * 1024 * 1024);
        assert_eq!(config.poll_timeout_duration(), Duration::from_millis(500));
        assert_eq!(config.datagram_buffer_len().get(), 65_536);
        assert_eq!(config.frame_size_limit(), DEFAULT_MAX_FRAME_SIZE);
    }

    #[rstest]
    #[case(Duration::ZERO, Duration::from_millis(1))]
    #[case(Duration::from_millis(250), Duration::from_millis(250))]
    fn poll_timeout_has_floor(#[case] requested: Duration, #[case] expected: Duration) {
        let config = ReceiverConfig::default().poll_timeout(requested);
        assert_eq!(config.poll_timeout_duration(), expected);
    }
}
