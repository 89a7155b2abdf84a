//! Consumers of completed frames.
//!
//! The receive loop hands every completed frame to a [`FrameSink`]. Sinks own
//! all judgement about frame content: validating markers, persisting bytes,
//! or decoding. A sink error is reported by the loop and never stops it.

mod chain;
mod channel;
mod file;
mod jpeg;
mod stats;

use std::{io, net::SocketAddr, path::PathBuf, time::Duration};

use async_trait::async_trait;
pub use chain::SinkChain;
pub use channel::ChannelSink;
pub use file::{DEFAULT_LAST_FRAME_PATH, LastFrameWriter};
pub use jpeg::{JPEG_EOI, JPEG_SOI, JpegInspector, JpegMarkers, hex_preview, inspect_jpeg};
pub use stats::FrameLog;
use thiserror::Error;

use crate::reassembler::CompletedFrame;

/// Delivery context for a completed frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameMeta {
    /// One-based count of frames completed by this receiver.
    pub sequence: u64,
    /// Sender of the datagram that completed the frame.
    pub source: Option<SocketAddr>,
    /// Time since the receiver started.
    pub elapsed: Duration,
}

/// Errors reported by frame sinks.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The frame lacks the JPEG start or end marker.
    #[error("frame is not a complete JPEG image ({markers})")]
    InvalidJpeg { markers: JpegMarkers },
    /// Persisting the frame failed.
    #[error("failed to write frame to {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The downstream consumer went away.
    #[error("frame consumer closed")]
    Closed,
}

/// Receives each completed frame exactly once, in completion order.
#[async_trait]
pub trait FrameSink: Send {
    /// Consume one completed frame.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] when the frame is rejected or cannot be handled.
    /// The caller logs the error and continues with the next frame.
    async fn consume(&mut self, frame: &CompletedFrame, meta: &FrameMeta) -> Result<(), SinkError>;
}

#[async_trait]
impl<S: FrameSink + ?Sized> FrameSink for Box<S> {
    async fn consume(&mut self, frame: &CompletedFrame, meta: &FrameMeta) -> Result<(), SinkError> {
        (**self).consume(frame, meta).await
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };

    use async_trait::async_trait;

    use super::{FrameMeta, FrameSink, SinkError};
    use crate::reassembler::CompletedFrame;

    pub(crate) fn meta(sequence: u64) -> FrameMeta {
        FrameMeta {
            sequence,
            source: None,
            elapsed: Duration::from_millis(1_500),
        }
    }

    /// Records frame lengths and optionally fails every call.
    #[derive(Clone, Default)]
    pub(crate) struct RecordingSink {
        pub(crate) seen: Arc<Mutex<Vec<usize>>>,
        pub(crate) fail: bool,
    }

    #[async_trait]
    impl FrameSink for RecordingSink {
        async fn consume(
            &mut self,
            frame: &CompletedFrame,
            _meta: &FrameMeta,
        ) -> Result<(), SinkError> {
            self.seen.lock().expect("lock recording sink").push(frame.len());
            if self.fail {
                Err(SinkError::Closed)
            } else {
                Ok(())
            }
        }
    }
}
