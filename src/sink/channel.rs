//! Forward completed frames to another task.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{FrameMeta, FrameSink, SinkError};
use crate::reassembler::CompletedFrame;

/// Sends each frame and its metadata into a bounded channel.
///
/// The receive loop waits while the channel is full, so a slow consumer
/// applies backpressure instead of growing memory.
#[derive(Clone, Debug)]
pub struct ChannelSink {
    tx: mpsc::Sender<(CompletedFrame, FrameMeta)>,
}

impl ChannelSink {
    /// Create a sink and the receiver its frames arrive on.
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<(CompletedFrame, FrameMeta)>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

#[async_trait]
impl FrameSink for ChannelSink {
    async fn consume(&mut self, frame: &CompletedFrame, meta: &FrameMeta) -> Result<(), SinkError> {
        self.tx
            .send((frame.clone(), *meta))
            .await
            .map_err(|_| SinkError::Closed)
    }
}
