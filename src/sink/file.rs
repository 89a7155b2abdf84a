//! Persist the most recent frame to a fixed path.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::debug;

use super::{FrameMeta, FrameSink, SinkError};
use crate::reassembler::CompletedFrame;

/// Where the listener saves frames unless told otherwise.
pub const DEFAULT_LAST_FRAME_PATH: &str = "/tmp/last_frame.jpg";

/// Overwrites one file with every completed frame.
///
/// Bytes are written to a sibling `.part` file first and renamed into place,
/// so readers never observe a half-written image.
#[derive(Clone, Debug)]
pub struct LastFrameWriter {
    path: PathBuf,
}

impl LastFrameWriter {
    /// Write frames to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

    /// Destination path.
    #[must_use]
    pub fn path(&self) -> &Path { &self.path }

    fn staging_path(&self) -> PathBuf {
        let mut staging = self.path.clone().into_os_string();
        staging.push(".part");
        PathBuf::from(staging)
    }
}

impl Default for LastFrameWriter {
    fn default() -> Self { Self::new(DEFAULT_LAST_FRAME_PATH) }
}

#[async_trait]
impl FrameSink for LastFrameWriter {
    async fn consume(&mut self, frame: &CompletedFrame, meta: &FrameMeta) -> Result<(), SinkError> {
        let staging = self.staging_path();
        tokio::fs::write(&staging, frame.payload())
            .await
            .map_err(|source| SinkError::Io {
                path: staging.clone(),
                source,
            })?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .map_err(|source| SinkError::Io {
                path: self.path.clone(),
                source,
            })?;
        debug!(
            "saved frame {} to {} ({} bytes)",
            meta.sequence,
            self.path.display(),
            frame.len()
        );
        Ok(())
    }
}
