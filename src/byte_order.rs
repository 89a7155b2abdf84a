//! Helpers for the little-endian integers carried on the frame wire.
//!
//! Camera firmware writes every field with the host order of its
//! microcontroller, which is little-endian. Keeping the conversions here scopes
//! the Clippy expectations to the conversion points so datagram code stays
//! explicit about endianness without repeating lint annotations.

/// Serialise a `u32` in wire byte order (little-endian).
///
/// # Examples
///
/// ```
/// use snapwire::byte_order::write_le_u32;
///
/// assert_eq!(write_le_u32(0xDEAD_BEEF), [0xEF, 0xBE, 0xAD, 0xDE]);
/// ```
#[must_use]
pub fn write_le_u32(value: u32) -> [u8; 4] {
    #[expect(
        clippy::little_endian_bytes,
        reason = "The frame wire format is little-endian."
    )]
    value.to_le_bytes()
}

/// Parse a wire-order `u32` from its on-wire representation.
///
/// # Examples
///
/// ```
/// use snapwire::byte_order::read_le_u32;
///
/// assert_eq!(read_le_u32([0x0A, 0x00, 0x00, 0x00]), 10);
/// ```
#[must_use]
pub fn read_le_u32(bytes: [u8; 4]) -> u32 {
    #[expect(
        clippy::little_endian_bytes,
        reason = "The frame wire format is little-endian."
    )]
    u32::from_le_bytes(bytes)
}

/// Read a little-endian `u32` starting at `at`, if four bytes are available.
///
/// # Examples
///
/// ```
/// use snapwire::byte_order::read_le_u32_at;
///
/// let bytes = [0xFF, 0x05, 0x00, 0x00, 0x00];
/// assert_eq!(read_le_u32_at(&bytes, 1), Some(5));
/// assert_eq!(read_le_u32_at(&bytes, 2), None);
/// ```
#[must_use]
pub fn read_le_u32_at(bytes: &[u8], at: usize) -> Option<u32> {
    let end = at.checked_add(4)?;
    let field: [u8; 4] = bytes.get(at..end)?.try_into().ok()?;
    Some(read_le_u32(field))
}

#[cfg(test)]
mod tests {
    //! Conversion tests for wire byte-order helpers.

    use rstest::rstest;

    use super::{read_le_u32, read_le_u32_at, write_le_u32};

    #[rstest]
    #[case::zero(0, [0, 0, 0, 0])]
    #[case::small(10, [0x0A, 0, 0, 0])]
    #[case::sentinel(0xDEAD_BEEF, [0xEF, 0xBE, 0xAD, 0xDE])]
    #[case::max(u32::MAX, [0xFF; 4])]
    fn wire_byte_order_round_trip(#[case] value: u32, #[case] bytes: [u8; 4]) {
        assert_eq!(write_le_u32(value), bytes);
        assert_eq!(read_le_u32(bytes), value);
    }

    #[rstest]
    #[case::empty(&[], 0)]
    #[case::short(&[1, 2, 3], 0)]
    #[case::past_end(&[1, 2, 3, 4], 1)]
    #[case::overflowing_index(&[1, 2, 3, 4], usize::MAX)]
    fn read_at_rejects_missing_bytes(#[case] bytes: &[u8], #[case] at: usize) {
        assert_eq!(read_le_u32_at(bytes, at), None);
    }
}
