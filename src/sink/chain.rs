//! Fan a frame out to several sinks in order.

use async_trait::async_trait;

use super::{FrameMeta, FrameSink, SinkError};
use crate::reassembler::CompletedFrame;

/// Runs each sink in insertion order.
///
/// Every sink sees every frame even when an earlier one fails; the first
/// error is returned once all sinks have run.
#[derive(Default)]
pub struct SinkChain {
    sinks: Vec<Box<dyn FrameSink>>,
}

impl SinkChain {
    /// Create an empty chain that accepts every frame.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Append a sink.
    #[must_use]
    pub fn with(mut self, sink: impl FrameSink + 'static) -> Self {
        self.push(sink);
        self
    }

    /// Append a sink in place.
    pub fn push(&mut self, sink: impl FrameSink + 'static) { self.sinks.push(Box::new(sink)); }

    /// Number of sinks in the chain.
    #[must_use]
    pub fn len(&self) -> usize { self.sinks.len() }

    /// Report whether the chain has no sinks.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.sinks.is_empty() }
}

impl std::fmt::Debug for SinkChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SinkChain")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

#[async_trait]
impl FrameSink for SinkChain {
    async fn consume(&mut self, frame: &CompletedFrame, meta: &FrameMeta) -> Result<(), SinkError> {
        let mut first_error = None;
        for sink in &mut self.sinks {
            if let Err(err) = sink.consume(frame, meta).await {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::test_support::{RecordingSink, meta};

    #[tokio::test]
    async fn later_sinks_run_after_failure() {
        let failing = RecordingSink {
            fail: true,
            ..RecordingSink::default()
        };
        let after = RecordingSink::default();
        let mut chain = SinkChain::new().with(failing.clone()).with(after.clone());
        assert_eq!(chain.len(), 2);

        let err = chain
            .consume(&CompletedFrame::new(vec![1_u8, 2, 3]), &meta(1))
            .await
            .expect_err("first sink fails");
        assert!(matches!(err, SinkError::Closed));
        assert_eq!(*failing.seen.lock().expect("lock"), vec![3]);
        assert_eq!(*after.seen.lock().expect("lock"), vec![3]);
    }

    #[tokio::test]
    async fn empty_chain_accepts_frames() {
        let mut chain = SinkChain::new();
        assert!(chain.is_empty());
        chain
            .consume(&CompletedFrame::new(vec![0_u8]), &meta(1))
            .await
            .expect("empty chain never fails");
    }
}
