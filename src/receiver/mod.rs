//! UDP receive loop feeding the [`Reassembler`].
//!
//! [`Receiver`] owns one reassembler and one [`FrameSink`]. Each datagram is
//! fed into the reassembler in arrival order; completed frames go to the sink
//! with their [`FrameMeta`]. Nothing a remote sender or a sink does stops the
//! loop; only shutdown or a dead socket does.

mod config;
mod error;
mod socket;

use std::{future::Future, net::SocketAddr};

pub use config::{
    DEFAULT_MAX_DATAGRAM_LEN,
    DEFAULT_POLL_TIMEOUT,
    DEFAULT_PORT,
    DEFAULT_RECV_BUFFER_SIZE,
    ReceiverConfig,
};
pub use error::ReceiverError;
use log::{debug, trace, warn};
pub use socket::{RecvOutcome, bind_socket, recv_datagram};
use tokio::{net::UdpSocket, select, signal, time::Instant};

use crate::{
    metrics,
    reassembler::{CompletedFrame, FeedEvent, Reassembler},
    sink::{FrameMeta, FrameSink},
};

/// Counters accumulated over one run of the receive loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReceiverStats {
    /// Datagrams read from the socket.
    pub datagrams: u64,
    /// Frames handed to the sink.
    pub frames_completed: u64,
    /// Incomplete frames discarded by a newer header.
    pub frames_abandoned: u64,
    /// Datagrams the reassembler ignored.
    pub datagrams_dropped: u64,
    /// Frames the sink rejected.
    pub sink_failures: u64,
}

/// Receives datagrams and delivers reassembled frames to a sink.
///
/// # Examples
///
/// ```no_run
/// use snapwire::{
///     receiver::{Receiver, ReceiverConfig, bind_socket},
///     sink::{FrameLog, JpegInspector, SinkChain},
/// };
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), snapwire::receiver::ReceiverError> {
/// let config = ReceiverConfig::default();
/// let socket = bind_socket(&config)?;
/// let sink = SinkChain::new().with(JpegInspector).with(FrameLog);
/// let stats = Receiver::new(config, sink).run(socket).await?;
/// println!("{} frames", stats.frames_completed);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Receiver<S> {
    config: ReceiverConfig,
    reassembler: Reassembler,
    sink: S,
    stats: ReceiverStats,
}

impl<S: FrameSink> Receiver<S> {
    /// Create a receiver delivering frames to `sink`.
    #[must_use]
    pub fn new(config: ReceiverConfig, sink: S) -> Self {
        Self {
            reassembler: Reassembler::with_max_frame_size(config.frame_size_limit()),
            config,
            sink,
            stats: ReceiverStats::default(),
        }
    }

    /// Settings this receiver was created with.
    #[must_use]
    pub const fn config(&self) -> &ReceiverConfig { &self.config }

    /// Run until Ctrl+C is received.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiverError::Closed`] if the socket fails permanently.
    pub async fn run(self, socket: UdpSocket) -> Result<ReceiverStats, ReceiverError> {
        self.run_with_shutdown(socket, async {
            let _ = signal::ctrl_c().await;
        })
        .await
    }

    /// Run until the `shutdown` future resolves.
    ///
    /// A frame being delivered when shutdown fires finishes delivery first.
    /// Any incomplete frame is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiverError::Closed`] if the socket fails permanently.
    pub async fn run_with_shutdown<F>(
        mut self,
        socket: UdpSocket,
        shutdown: F,
    ) -> Result<ReceiverStats, ReceiverError>
    where
        F: Future<Output = ()> + Send,
    {
        let started = Instant::now();
        let wait = self.config.poll_timeout_duration();
        let mut buf = vec![0_u8; self.config.datagram_buffer_len().get()];
        if let Ok(addr) = socket.local_addr() {
            debug!("listening for frames on {addr}");
        }

        tokio::pin!(shutdown);
        loop {
            let outcome = select! {
                () = &mut shutdown => break,
                outcome = recv_datagram(&socket, &mut buf, wait) => outcome,
            };
            match outcome {
                RecvOutcome::Datagram { len, from } => {
                    let payload = buf.get(..len).unwrap_or(&buf);
                    self.handle_datagram(payload, from, started).await;
                }
                RecvOutcome::TimedOut => {}
                RecvOutcome::Closed(err) => return Err(ReceiverError::Closed(err)),
            }
        }

        if let Some(progress) = self.reassembler.reset() {
            debug!("shutdown discarded incomplete frame at {progress} bytes");
        }
        Ok(self.stats)
    }

    async fn handle_datagram(&mut self, payload: &[u8], from: SocketAddr, started: Instant) {
        self.stats.datagrams += 1;
        metrics::inc_datagrams();

        let outcome = self.reassembler.ingest(payload);
        if let Some(progress) = outcome.superseded {
            self.stats.frames_abandoned += 1;
            metrics::inc_frames_abandoned();
            debug!("new header from {from} abandoned frame at {progress} bytes");
        }

        match outcome.event {
            FeedEvent::Started { total_size } => {
                trace!("frame of {total_size} bytes started by {from}");
            }
            FeedEvent::Progressed { .. } => {}
            FeedEvent::Dropped(reason) => {
                self.stats.datagrams_dropped += 1;
                metrics::inc_dropped(&reason);
                trace!("dropped {} byte datagram from {from}: {reason}", payload.len());
            }
            FeedEvent::Completed(frame) => self.deliver(&frame, from, started).await,
        }
    }

    async fn deliver(&mut self, frame: &CompletedFrame, from: SocketAddr, started: Instant) {
        self.stats.frames_completed += 1;
        metrics::inc_frames_completed();
        let meta = FrameMeta {
            sequence: self.stats.frames_completed,
            source: Some(from),
            elapsed: started.elapsed(),
        };
        tracing::debug!(
            sequence = meta.sequence,
            size = frame.len(),
            source = %from,
            "frame complete"
        );

        if let Err(err) = self.sink.consume(frame, &meta).await {
            self.stats.sink_failures += 1;
            metrics::inc_sink_errors();
            warn!("frame {} rejected by sink: {err}", meta.sequence);
        }
    }
}
