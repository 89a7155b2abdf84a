//! JPEG start/end marker validation.

use std::fmt::{self, Write as _};

use async_trait::async_trait;
use log::warn;

use super::{FrameMeta, FrameSink, SinkError};
use crate::reassembler::CompletedFrame;

/// Start-of-image marker.
pub const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];
/// End-of-image marker.
pub const JPEG_EOI: [u8; 2] = [0xFF, 0xD9];

const PREVIEW_LEN: usize = 64;

/// Leading and trailing two bytes of a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JpegMarkers {
    /// First two bytes, if present.
    pub soi: Option<[u8; 2]>,
    /// Last two bytes, if present.
    pub eoi: Option<[u8; 2]>,
}

impl JpegMarkers {
    /// Report whether the frame starts with SOI and ends with EOI.
    #[must_use]
    pub fn is_valid(&self) -> bool { self.soi == Some(JPEG_SOI) && self.eoi == Some(JPEG_EOI) }
}

impl fmt::Display for JpegMarkers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let render =
            |marker: Option<[u8; 2]>| marker.map_or_else(|| "--".to_owned(), |m| hex_preview(&m));
        write!(f, "SOI={} EOI={}", render(self.soi), render(self.eoi))
    }
}

/// Read the marker bytes at both ends of `bytes`.
///
/// # Examples
///
/// ```
/// use snapwire::sink::inspect_jpeg;
///
/// assert!(inspect_jpeg(&[0xFF, 0xD8, 0x00, 0xFF, 0xD9]).is_valid());
/// assert!(!inspect_jpeg(&[0xFF, 0xD8]).is_valid());
/// ```
#[must_use]
pub fn inspect_jpeg(bytes: &[u8]) -> JpegMarkers {
    JpegMarkers {
        soi: bytes.first_chunk::<2>().copied(),
        eoi: bytes.last_chunk::<2>().copied(),
    }
}

/// Lower-case hex rendering of up to the first 64 bytes.
#[must_use]
pub fn hex_preview(bytes: &[u8]) -> String {
    bytes
        .iter()
        .take(PREVIEW_LEN)
        .fold(String::with_capacity(PREVIEW_LEN * 2), |mut out, byte| {
            let _ = write!(out, "{byte:02x}");
            out
        })
}

/// Rejects frames that do not start with SOI and end with EOI.
///
/// Only the two ends are checked; the body is never parsed. Mismatches are
/// logged with a hex preview of the frame head.
#[derive(Clone, Copy, Debug, Default)]
pub struct JpegInspector;

#[async_trait]
impl FrameSink for JpegInspector {
    async fn consume(&mut self, frame: &CompletedFrame, meta: &FrameMeta) -> Result<(), SinkError> {
        let markers = inspect_jpeg(frame.payload());
        if markers.is_valid() {
            return Ok(());
        }
        warn!(
            "JPEG marker mismatch in frame {}: {markers} size={}",
            meta.sequence,
            frame.len()
        );
        warn!("first {PREVIEW_LEN} bytes: {}", hex_preview(frame.payload()));
        Err(SinkError::InvalidJpeg { markers })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::sink::test_support::meta;

    #[rstest]
    #[case::minimal(&[0xFF, 0xD8, 0xFF, 0xD9], true)]
    #[case::with_body(&[0xFF, 0xD8, 1, 2, 3, 0xFF, 0xD9], true)]
    #[case::missing_eoi(&[0xFF, 0xD8, 1, 2, 3], false)]
    #[case::missing_soi(&[0, 0xD8, 1, 0xFF, 0xD9], false)]
    #[case::soi_only(&[0xFF, 0xD8], false)]
    #[case::single_byte(&[0xFF], false)]
    #[case::empty(&[], false)]
    fn marker_validation(#[case] bytes: &[u8], #[case] valid: bool) {
        assert_eq!(inspect_jpeg(bytes).is_valid(), valid);
    }

    #[test]
    fn markers_render_as_hex() {
        let markers = inspect_jpeg(&[0xFF, 0xD8, 0x12, 0xAB]);
        assert_eq!(markers.to_string(), "SOI=ffd8 EOI=12ab");
        assert_eq!(inspect_jpeg(&[1]).to_string(), "SOI=-- EOI=--");
    }

    #[test]
    fn preview_is_capped() {
        let preview = hex_preview(&[0xAB; 100]);
        assert_eq!(preview.len(), PREVIEW_LEN * 2);
        assert!(preview.starts_with("abab"));
    }

    #[tokio::test]
    async fn inspector_rejects_truncated_jpeg() {
        let frame = CompletedFrame::new(vec![0xFF_u8, 0xD8, 0x00, 0x00]);
        let err = JpegInspector
            .consume(&frame, &meta(1))
            .await
            .expect_err("missing EOI must be rejected");
        assert!(matches!(err, SinkError::InvalidJpeg { markers } if markers.soi == Some(JPEG_SOI)));
    }

    #[tokio::test]
    async fn inspector_accepts_valid_jpeg() {
        let frame = CompletedFrame::new(vec![0xFF_u8, 0xD8, 0x42, 0xFF, 0xD9]);
        JpegInspector
            .consume(&frame, &meta(1))
            .await
            .expect("valid markers accepted");
    }
}
