//! Outbound helper that splits a frame into header and fragment datagrams.
//!
//! [`Fragmenter`] plays the device's role: the first datagram is a header
//! announcing the frame size and carrying as many leading bytes as fit; every
//! following datagram is a fragment tagged with its byte offset. The
//! reassembler accepts the resulting datagrams in any order.

use std::num::NonZeroUsize;

use thiserror::Error;

use crate::datagram::{
    FRAGMENT_PREFIX_LEN,
    FRAME_MAGIC,
    HEADER_LEN,
    encode_fragment,
    encode_header,
};

/// Errors produced while splitting a frame.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum FragmenterError {
    /// The datagram cap leaves no room for payload after the header.
    #[error("datagram cap of {max_datagram_len} bytes cannot carry a header and payload")]
    DatagramTooSmall { max_datagram_len: usize },
    /// Empty frames would announce a size that can never complete.
    #[error("cannot fragment an empty frame")]
    EmptyFrame,
    /// The frame length does not fit the 32-bit size field.
    #[error("frame of {len} bytes exceeds the 32-bit size field")]
    FrameTooLarge { len: usize },
    /// A fragment would start with the header sentinel and be misread.
    #[error("fragment offset {offset:#010x} collides with the frame sentinel")]
    MagicCollision { offset: u32 },
}

/// Splits frames into datagrams no longer than a fixed cap.
#[derive(Clone, Copy, Debug)]
pub struct Fragmenter {
    max_datagram_len: NonZeroUsize,
}

impl Fragmenter {
    /// Create a fragmenter that never emits datagrams longer than
    /// `max_datagram_len` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`FragmenterError::DatagramTooSmall`] when the cap cannot hold
    /// a 12-byte header plus at least one payload byte.
    pub fn new(max_datagram_len: NonZeroUsize) -> Result<Self, FragmenterError> {
        if max_datagram_len.get() <= HEADER_LEN {
            return Err(FragmenterError::DatagramTooSmall {
                max_datagram_len: max_datagram_len.get(),
            });
        }
        Ok(Self { max_datagram_len })
    }

    /// Return the datagram cap in bytes.
    #[must_use]
    pub const fn max_datagram_len(&self) -> NonZeroUsize { self.max_datagram_len }

    /// Split `frame` into a header datagram followed by fragment datagrams.
    ///
    /// # Errors
    ///
    /// Returns [`FragmenterError`] for empty frames, frames longer than
    /// `u32::MAX`, or when a fragment offset would encode as the sentinel.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::num::NonZeroUsize;
    ///
    /// use snapwire::{fragmenter::Fragmenter, reassembler::Reassembler};
    ///
    /// let fragmenter = Fragmenter::new(NonZeroUsize::new(16).expect("non-zero"))?;
    /// let frame: Vec<u8> = (0..40).collect();
    /// let batch = fragmenter.fragment(&frame)?;
    ///
    /// let mut datagrams = batch.into_iter();
    /// let header = datagrams.next().expect("header comes first");
    ///
    /// let mut reassembler = Reassembler::new();
    /// assert!(reassembler.feed(&header).is_none());
    /// let done = datagrams.rev().find_map(|datagram| reassembler.feed(&datagram));
    /// assert_eq!(done.expect("complete").payload(), frame.as_slice());
    /// # Ok::<(), snapwire::fragmenter::FragmenterError>(())
    /// ```
    pub fn fragment(&self, frame: impl AsRef<[u8]>) -> Result<FragmentBatch, FragmenterError> {
        let frame = frame.as_ref();
        if frame.is_empty() {
            return Err(FragmenterError::EmptyFrame);
        }
        let total_size = u32::try_from(frame.len())
            .map_err(|_| FragmenterError::FrameTooLarge { len: frame.len() })?;

        let max = self.max_datagram_len.get();
        let head_len = frame.len().min(max - HEADER_LEN);
        let (head, mut rest) = frame.split_at(head_len);

        let fragment_cap = max - FRAGMENT_PREFIX_LEN;
        let mut datagrams = Vec::with_capacity(1 + rest.len().div_ceil(fragment_cap));
        datagrams.push(encode_header(total_size, 0, head));

        let mut offset = head_len;
        while !rest.is_empty() {
            let (chunk, tail) = rest.split_at(rest.len().min(fragment_cap));
            // Offsets never exceed `total_size`, which fits in u32.
            let wire_offset = u32::try_from(offset)
                .map_err(|_| FragmenterError::FrameTooLarge { len: frame.len() })?;
            if wire_offset == FRAME_MAGIC {
                return Err(FragmenterError::MagicCollision {
                    offset: wire_offset,
                });
            }
            datagrams.push(encode_fragment(wire_offset, chunk));
            offset += chunk.len();
            rest = tail;
        }

        Ok(FragmentBatch {
            total_size,
            datagrams,
        })
    }
}

/// Datagrams produced for a single frame, header first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FragmentBatch {
    total_size: u32,
    datagrams: Vec<Vec<u8>>,
}

impl FragmentBatch {
    /// Frame length announced by the header.
    #[must_use]
    pub const fn total_size(&self) -> u32 { self.total_size }

    /// Encoded datagrams; the first is always the header.
    #[must_use]
    pub fn datagrams(&self) -> &[Vec<u8>] { self.datagrams.as_slice() }

    /// Number of datagrams in the batch.
    #[expect(
        clippy::len_without_is_empty,
        reason = "batches always contain a header"
    )]
    #[must_use]
    pub fn len(&self) -> usize { self.datagrams.len() }

    /// Whether the frame needed fragment datagrams beyond the header.
    #[must_use]
    pub fn is_fragmented(&self) -> bool { self.len() > 1 }
}

impl IntoIterator for FragmentBatch {
    type Item = Vec<u8>;
    type IntoIter = std::vec::IntoIter<Vec<u8>>;

    fn into_iter(self) -> Self::IntoIter { self.datagrams.into_iter() }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::{
        datagram::{Datagram, parse},
        reassembler::Reassembler,
    };

    fn fragmenter(cap: usize) -> Fragmenter {
        Fragmenter::new(NonZeroUsize::new(cap).expect("non-zero")).expect("valid cap")
    }

    #[rstest]
    #[case::exact_header(12)]
    #[case::tiny(4)]
    fn rejects_caps_without_room_for_payload(#[case] cap: usize) {
        let err = Fragmenter::new(NonZeroUsize::new(cap).expect("non-zero"))
            .expect_err("cap too small");
        assert_eq!(
            err,
            FragmenterError::DatagramTooSmall {
                max_datagram_len: cap
            }
        );
    }

    #[test]
    fn rejects_empty_frame() {
        assert_eq!(
            fragmenter(64).fragment(Vec::<u8>::new()),
            Err(FragmenterError::EmptyFrame)
        );
    }

    #[test]
    fn small_frame_fits_in_header() {
        let batch = fragmenter(64).fragment([0xFF_u8, 0xD8, 0xFF, 0xD9]).expect("fragment");
        assert_eq!(batch.len(), 1);
        assert!(!batch.is_fragmented());
        assert_eq!(batch.total_size(), 4);
    }

    #[test]
    fn datagrams_respect_cap_and_cover_frame() {
        let frame: Vec<u8> = (0..=255).cycle().take(1_000).collect();
        let batch = fragmenter(100).fragment(&frame).expect("fragment");

        let mut rebuilt = vec![0_u8; frame.len()];
        for (i, datagram) in batch.datagrams().iter().enumerate() {
            assert!(datagram.len() <= 100, "datagram {i} exceeds cap");
            match parse(datagram).expect("parseable") {
                Datagram::Header(header) => {
                    assert_eq!(i, 0, "only the first datagram is a header");
                    assert_eq!(header.total_size, 1_000);
                    assert_eq!(header.initial_offset, 0);
                    rebuilt[..header.initial_payload.len()]
                        .copy_from_slice(header.initial_payload);
                }
                Datagram::Fragment(fragment) => {
                    let start = fragment.offset as usize;
                    rebuilt[start..start + fragment.payload.len()]
                        .copy_from_slice(fragment.payload);
                }
            }
        }
        assert_eq!(rebuilt, frame);
    }

    #[test]
    fn batch_reassembles_in_reverse_order() {
        let frame: Vec<u8> = (0..200_u8).collect();
        let batch = fragmenter(32).fragment(&frame).expect("fragment");
        assert!(batch.is_fragmented());

        let mut datagrams = batch.into_iter().collect::<Vec<_>>();
        let header = datagrams.remove(0);
        let mut reassembler = Reassembler::new();
        assert!(reassembler.feed(&header).is_none());

        let mut completed = None;
        for datagram in datagrams.iter().rev() {
            if let Some(frame) = reassembler.feed(datagram) {
                completed = Some(frame);
            }
        }
        assert_eq!(completed.expect("frame completes").payload(), frame.as_slice());
    }
}
