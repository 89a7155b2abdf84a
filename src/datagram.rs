//! Wire format for frame datagrams.
//!
//! Two datagram shapes share the wire, distinguished only by the first four
//! bytes:
//!
//! ```text
//! header:   [magic u32 LE][total_size u32 LE][offset u32 LE][payload ...]
//! fragment: [offset u32 LE][payload ...]
//! ```
//!
//! A datagram is a header if and only if it starts with [`FRAME_MAGIC_BYTES`].
//! A fragment whose offset encodes to the same four bytes is therefore
//! indistinguishable from a header. Senders must avoid that offset; the
//! [`Fragmenter`](crate::fragmenter::Fragmenter) refuses to emit it.

use thiserror::Error;

use crate::byte_order::{read_le_u32_at, write_le_u32};

/// Sentinel announcing a new frame.
pub const FRAME_MAGIC: u32 = 0xDEAD_BEEF;

/// [`FRAME_MAGIC`] as it appears on the wire.
pub const FRAME_MAGIC_BYTES: [u8; 4] = [0xEF, 0xBE, 0xAD, 0xDE];

/// Fixed bytes preceding the payload of a header datagram.
pub const HEADER_LEN: usize = 12;

/// Fixed bytes preceding the payload of a fragment datagram.
pub const FRAGMENT_PREFIX_LEN: usize = 4;

/// Borrowed view of a header datagram.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameHeader<'a> {
    /// Declared byte length of the announced frame.
    pub total_size: u32,
    /// Position of `initial_payload` within the frame.
    pub initial_offset: u32,
    /// Leading frame bytes carried by the header itself. May be empty.
    pub initial_payload: &'a [u8],
}

/// Borrowed view of a fragment datagram.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fragment<'a> {
    /// Declared starting position within the in-flight frame.
    pub offset: u32,
    /// Bytes to place starting at `offset`.
    pub payload: &'a [u8],
}

/// A classified datagram.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Datagram<'a> {
    /// Announces a new frame.
    Header(FrameHeader<'a>),
    /// Contributes a byte range to the in-flight frame.
    Fragment(Fragment<'a>),
}

/// Reasons a datagram cannot be parsed.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum DatagramError {
    /// The datagram starts with the sentinel but is shorter than a header.
    #[error("header datagram too short: {len} bytes, need {min}", min = HEADER_LEN)]
    ShortHeader { len: usize },
    /// The datagram cannot even hold a fragment offset.
    #[error("fragment datagram too short: {len} bytes, need {min}", min = FRAGMENT_PREFIX_LEN)]
    ShortFragment { len: usize },
}

/// Report whether `payload` is classified as a header datagram.
///
/// # Examples
///
/// ```
/// use snapwire::datagram::{FRAME_MAGIC_BYTES, is_header};
///
/// assert!(is_header(&FRAME_MAGIC_BYTES));
/// assert!(!is_header(&[0, 0, 0, 0, 1]));
/// ```
#[must_use]
pub fn is_header(payload: &[u8]) -> bool { payload.starts_with(&FRAME_MAGIC_BYTES) }

/// Classify and parse one datagram payload without copying it.
///
/// # Errors
///
/// Returns [`DatagramError`] when the payload is too short for the shape
/// selected by its first four bytes.
///
/// # Examples
///
/// ```
/// use snapwire::datagram::{Datagram, encode_fragment, parse};
///
/// let bytes = encode_fragment(5, &[6, 7]);
/// let Datagram::Fragment(fragment) = parse(&bytes).expect("valid fragment") else {
///     panic!("expected fragment");
/// };
/// assert_eq!(fragment.offset, 5);
/// assert_eq!(fragment.payload, &[6, 7]);
/// ```
pub fn parse(payload: &[u8]) -> Result<Datagram<'_>, DatagramError> {
    if is_header(payload) {
        let (Some(total_size), Some(initial_offset)) =
            (read_le_u32_at(payload, 4), read_le_u32_at(payload, 8))
        else {
            return Err(DatagramError::ShortHeader { len: payload.len() });
        };
        return Ok(Datagram::Header(FrameHeader {
            total_size,
            initial_offset,
            initial_payload: payload.get(HEADER_LEN..).unwrap_or_default(),
        }));
    }

    let Some(offset) = read_le_u32_at(payload, 0) else {
        return Err(DatagramError::ShortFragment { len: payload.len() });
    };
    Ok(Datagram::Fragment(Fragment {
        offset,
        payload: payload.get(FRAGMENT_PREFIX_LEN..).unwrap_or_default(),
    }))
}

/// Encode a header datagram announcing a frame of `total_size` bytes.
#[must_use]
pub fn encode_header(total_size: u32, initial_offset: u32, payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_LEN + payload.len());
    buf.extend_from_slice(&FRAME_MAGIC_BYTES);
    buf.extend_from_slice(&write_le_u32(total_size));
    buf.extend_from_slice(&write_le_u32(initial_offset));
    buf.extend_from_slice(payload);
    buf
}

/// Encode a fragment datagram placing `payload` at `offset`.
#[must_use]
pub fn encode_fragment(offset: u32, payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(FRAGMENT_PREFIX_LEN + payload.len());
    buf.extend_from_slice(&write_le_u32(offset));
    buf.extend_from_slice(payload);
    buf
}
