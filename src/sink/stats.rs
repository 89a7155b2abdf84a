//! Per-frame summary logging.

use async_trait::async_trait;
use log::info;

use super::{FrameMeta, FrameSink, SinkError};
use crate::reassembler::CompletedFrame;

/// Logs one line per completed frame with size, sender, and elapsed time.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameLog;

impl FrameLog {
    pub(crate) fn line(frame: &CompletedFrame, meta: &FrameMeta) -> String {
        let source = meta
            .source
            .map_or_else(|| "unknown".to_owned(), |addr| addr.to_string());
        format!(
            "[{}] frame {} bytes from {source} time={:.2}s",
            meta.sequence,
            frame.len(),
            meta.elapsed.as_secs_f64()
        )
    }
}

#[async_trait]
impl FrameSink for FrameLog {
    async fn consume(&mut self, frame: &CompletedFrame, meta: &FrameMeta) -> Result<(), SinkError> {
        info!("{}", Self::line(frame, meta));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use super::*;
    use crate::sink::test_support::meta;

    #[test]
    fn line_includes_sequence_size_source_and_time() {
        let mut meta = meta(7);
        meta.source = Some(SocketAddr::from(([192, 168, 4, 2], 50_000)));
        let frame = CompletedFrame::new(vec![0_u8; 1_234]);

        assert_eq!(
            FrameLog::line(&frame, &meta),
            "[7] frame 1234 bytes from 192.168.4.2:50000 time=1.50s"
        );
    }

    #[test]
    fn line_marks_unknown_source() {
        let frame = CompletedFrame::new(vec![0_u8; 2]);
        assert!(FrameLog::line(&frame, &meta(1)).contains("from unknown"));
    }
}
