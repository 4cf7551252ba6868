//! Variable-length quantity decoding, used for delta times and meta payload lengths

use crate::chunk::track::DecodeError;

/// A variable-length quantity never spans more than 4 bytes, capping values at 28 bits
pub const MAX_LEN: usize = 4;

/// Decodes the variable-length quantity starting at `pos` in `buffer`.
///
/// Each byte contributes its low 7 bits, most significant group first, and a byte with its
/// top bit clear ends the sequence. Returns the value together with how many bytes were
/// consumed (1 to 4).
pub fn decode(buffer: &[u8], pos: usize) -> Result<(u32, usize), DecodeError> {
    const MASK: u8 = 0x7F;

    let mut result: u32 = 0;
    for consumed in 1..=MAX_LEN {
        let byte = *buffer
            .get(pos + consumed - 1)
            .ok_or(DecodeError::Truncated)?;

        result <<= 7;
        result |= (byte & MASK) as u32;

        if !msb_is_one(byte) {
            return Ok((result, consumed));
        }
    }

    Err(DecodeError::MalformedVarLen { pos })
}

/// Returns true if the msb of a byte is 1
fn msb_is_one(byte: u8) -> bool {
    byte >> 7 == 1
}

#[cfg(test)]
mod tests {
    use super::decode;
    use crate::chunk::track::DecodeError;

    #[test]
    fn single_byte_quantities() {
        assert_eq!(decode(&[0x00], 0).unwrap(), (0, 1));
        assert_eq!(decode(&[0x40], 0).unwrap(), (0x40, 1));
        assert_eq!(decode(&[0x7F], 0).unwrap(), (0x7F, 1));
    }

    #[test]
    fn multi_byte_quantities() {
        assert_eq!(decode(&[0x81, 0x00], 0).unwrap(), (0x80, 2));
        assert_eq!(decode(&[0xC0, 0x00], 0).unwrap(), (0x2000, 2));
        assert_eq!(decode(&[0xFF, 0x7F], 0).unwrap(), (0x3FFF, 2));
        assert_eq!(decode(&[0x81, 0x80, 0x00], 0).unwrap(), (0x4000, 3));
        assert_eq!(decode(&[0xC0, 0x80, 0x80, 0x00], 0).unwrap(), (0x8000000, 4));
        assert_eq!(decode(&[0xFF, 0xFF, 0xFF, 0x7F], 0).unwrap(), (0xFFFFFFF, 4));
    }

    #[test]
    fn decodes_from_offset_and_ignores_trailing_bytes() {
        // Delta time of 192 sitting behind a note-on's data bytes
        let bytes = [0x3C, 0x64, 0x81, 0x40, 0x90];
        assert_eq!(decode(&bytes, 2).unwrap(), (192, 2));
    }

    #[test]
    fn fifth_continuation_byte_is_malformed() {
        let bytes = [0x00, 0x81, 0x80, 0x80, 0x80, 0x00];
        assert_eq!(decode(&bytes, 1), Err(DecodeError::MalformedVarLen { pos: 1 }));
    }

    #[test]
    fn running_off_the_buffer_is_truncation() {
        assert_eq!(decode(&[0x81, 0x80], 0), Err(DecodeError::Truncated));
        assert_eq!(decode(&[], 0), Err(DecodeError::Truncated));
    }
}
