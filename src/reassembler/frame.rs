//! Byte arena and coverage index for the frame being assembled.

use bytes::Bytes;

use super::Progress;

/// Frame currently being filled in by fragment datagrams.
///
/// `buffer` and `coverage` are parallel arrays indexed by byte position.
/// `covered_count` is only ever advanced by the number of positions a write
/// newly covers, so it always equals the number of `true` entries in
/// `coverage` without rescanning the mask.
#[derive(Debug)]
pub(crate) struct InFlightFrame {
    buffer: Vec<u8>,
    coverage: Vec<bool>,
    covered_count: usize,
}

impl InFlightFrame {
    pub(crate) fn new(total_size: usize) -> Self {
        Self {
            buffer: vec![0; total_size],
            coverage: vec![false; total_size],
            covered_count: 0,
        }
    }

    pub(crate) fn total_size(&self) -> usize { self.buffer.len() }

    pub(crate) fn covered_count(&self) -> usize { self.covered_count }

    pub(crate) fn progress(&self) -> Progress {
        Progress {
            covered: self.covered_count,
            total: self.total_size(),
        }
    }

    /// Zero-length frames never complete.
    pub(crate) fn is_complete(&self) -> bool {
        self.total_size() > 0 && self.covered_count == self.total_size()
    }

    /// Write `payload` at `offset`, truncating at the frame end.
    ///
    /// Returns the number of byte positions that were not covered before this
    /// write. Writes starting at or past the frame end change nothing.
    pub(crate) fn write(&mut self, offset: usize, payload: &[u8]) -> usize {
        let total = self.total_size();
        if offset >= total || payload.is_empty() {
            return 0;
        }
        let end = total.min(offset.saturating_add(payload.len()));
        let len = end - offset;

        let mask = &mut self.coverage[offset..end];
        let already_covered = mask.iter().filter(|covered| **covered).count();
        mask.fill(true);
        // Last writer wins for overlapping bytes.
        self.buffer[offset..end].copy_from_slice(&payload[..len]);

        let newly_covered = len - already_covered;
        self.covered_count += newly_covered;
        debug_assert!(self.covered_count <= total);
        newly_covered
    }

    pub(crate) fn into_completed(self) -> CompletedFrame { CompletedFrame::new(self.buffer) }
}

/// Immutable snapshot of a fully assembled frame.
///
/// The snapshot owns its bytes; cloning it is cheap and never aliases the
/// reassembler's working state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletedFrame {
    payload: Bytes,
}

impl CompletedFrame {
    /// Wrap assembled frame bytes.
    #[must_use]
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    /// Borrow the frame bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] { &self.payload }

    /// Number of bytes in the frame, equal to the size its header declared.
    #[must_use]
    pub fn len(&self) -> usize { self.payload.len() }

    /// Completed frames always hold at least one byte, so this only returns
    /// `true` for hand-built snapshots.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.payload.is_empty() }

    /// Consume the snapshot, returning the shared byte buffer.
    #[must_use]
    pub fn into_payload(self) -> Bytes { self.payload }
}

impl AsRef<[u8]> for CompletedFrame {
    fn as_ref(&self) -> &[u8] { self.payload() }
}
