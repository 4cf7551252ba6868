//! Splitting a file into its header and track chunks

use header::HeaderInfo;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    chunk::chunk_types::{display_tag, HEADER_CHUNK, TRACK_DATA_CHUNK},
    Chunk,
};

pub mod chunk_types;
pub mod header;
pub mod track;

/// Size of a chunk preamble: 4 tag bytes and a 32 bit length
const PREAMBLE_LEN: usize = 8;

/// Length every header chunk must declare
const HEADER_LEN: usize = 6;

/// Errors in the chunk structure or header of a file
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// A chunk had a different tag than its position requires
    #[error("Expected a `{}` chunk at byte {pos} but found `{}`", display_tag(.expected), display_tag(.found))]
    UnexpectedChunk {
        /// Byte offset of the chunk preamble
        pos: usize,
        /// Tag required at this position
        expected: [u8; 4],
        /// Tag actually present
        found: [u8; 4],
    },
    /// Fewer than 8 bytes remained where a chunk preamble should start
    #[error("Incomplete chunk preamble at byte {pos}")]
    IncompletePreamble {
        /// Byte offset of the partial preamble
        pos: usize,
    },
    /// A chunk declared more payload than the file holds
    #[error("Chunk at byte {pos} declares {declared} bytes but only {available} remain")]
    Truncated {
        /// Byte offset of the chunk preamble
        pos: usize,
        /// Declared payload length
        declared: usize,
        /// Bytes actually left in the file
        available: usize,
    },
    /// The header chunk did not declare exactly 6 bytes
    #[error("Header chunk must be 6 bytes long, found {0}")]
    HeaderLength(usize),
    /// Anything other than a format 1 file
    #[error("Unsupported MIDI format {0}, only format 1 is supported")]
    UnsupportedFormat(u16),
    /// Division expressed in SMPTE frames
    #[error("SMPTE time division {0:#06x} is unsupported")]
    SmpteDivision(u16),
    /// Division of zero ticks per quarter note
    #[error("Division of zero ticks per quarter note")]
    ZeroDivision,
}

/// Splits `bytes` into the validated header and the raw payload of every track chunk, in file
/// order.
///
/// The header's declared track count is only compared against the chunks found. A mismatch is
/// logged but tolerated; [`HeaderInfo::declared_tracks`] keeps the declared value.
pub fn parse(bytes: &[u8]) -> Result<(HeaderInfo, Vec<&[u8]>), FormatError> {
    let (chunk, data, mut pos) = read_chunk(bytes, 0, HEADER_CHUNK)?;
    if chunk.len() != HEADER_LEN {
        return Err(FormatError::HeaderLength(chunk.len()));
    }

    let format = u16::from_be_bytes([data[0], data[1]]);
    let ntrk = u16::from_be_bytes([data[2], data[3]]);
    let division = u16::from_be_bytes([data[4], data[5]]);
    let header = HeaderInfo::try_from((format, ntrk, division))?;

    debug!(
        tracks = header.declared_tracks(),
        ticks_per_quarter = header.ticks_per_quarter().get(),
        "Parsed header chunk."
    );

    let mut tracks = vec![];
    while pos < bytes.len() {
        let (chunk, data, next) = read_chunk(bytes, pos, TRACK_DATA_CHUNK)?;
        debug!(pos, length = chunk.len(), "Parsed track chunk.");

        tracks.push(data);
        pos = next;
    }

    if tracks.len() != header.declared_tracks() as usize {
        warn!(
            declared = header.declared_tracks(),
            found = tracks.len(),
            "Header track count does not match the track chunks present."
        );
    }

    Ok((header, tracks))
}

/// Reads the chunk starting at `pos`, requiring tag `expected`. Returns the preamble, its
/// payload, and the offset just past the payload.
fn read_chunk(
    bytes: &[u8],
    pos: usize,
    expected: [u8; 4],
) -> Result<(Chunk, &[u8], usize), FormatError> {
    let preamble = bytes
        .get(pos..pos + PREAMBLE_LEN)
        .ok_or(FormatError::IncompletePreamble { pos })?;

    let mut raw = [0u8; PREAMBLE_LEN];
    raw.copy_from_slice(preamble);
    let chunk = Chunk::from(u64::from_be_bytes(raw));

    if chunk.chunk_type != expected {
        return Err(FormatError::UnexpectedChunk {
            pos,
            expected,
            found: chunk.chunk_type,
        });
    }

    let start = pos + PREAMBLE_LEN;
    let available = bytes.len() - start;
    if chunk.len() > available {
        return Err(FormatError::Truncated {
            pos,
            declared: chunk.len(),
            available,
        });
    }

    let end = start + chunk.len();
    Ok((chunk, &bytes[start..end], end))
}

#[cfg(test)]
mod tests {
    use super::{parse, FormatError};

    /// Header bytes for a format 1 file
    fn header(ntrks: u16, division: u16) -> Vec<u8> {
        let mut bytes = b"MThd\x00\x00\x00\x06\x00\x01".to_vec();
        bytes.extend(ntrks.to_be_bytes());
        bytes.extend(division.to_be_bytes());
        bytes
    }

    /// Wraps a payload in a track chunk
    fn track(payload: &[u8]) -> Vec<u8> {
        let mut bytes = b"MTrk".to_vec();
        bytes.extend((payload.len() as u32).to_be_bytes());
        bytes.extend(payload);
        bytes
    }

    #[test]
    fn splits_header_and_tracks() {
        let mut file = header(2, 96);
        file.extend(track(&[0x00, 0xFF, 0x2F, 0x00]));
        file.extend(track(&[0x10, 0xFF, 0x2F, 0x00]));

        let (header, tracks) = parse(&file).unwrap();
        assert_eq!(header.ticks_per_quarter().get(), 96);
        assert_eq!(
            tracks,
            vec![&[0x00, 0xFF, 0x2F, 0x00][..], &[0x10, 0xFF, 0x2F, 0x00][..]]
        );
    }

    #[test]
    fn format_two_fails_before_tracks() {
        let mut file = b"MThd\x00\x00\x00\x06\x00\x02\x00\x01\x00\x60".to_vec();
        // Garbage where a track chunk should be, never looked at
        file.extend(b"XXXX");

        assert_eq!(parse(&file), Err(FormatError::UnsupportedFormat(2)));
    }

    #[test]
    fn first_chunk_must_be_header() {
        let file = track(&[0x00, 0xFF, 0x2F, 0x00]);
        assert!(matches!(
            parse(&file),
            Err(FormatError::UnexpectedChunk {
                pos: 0,
                expected,
                found,
            }) if &expected == b"MThd" && &found == b"MTrk"
        ));
    }

    #[test]
    fn header_length_must_be_six() {
        let file = b"MThd\x00\x00\x00\x08\x00\x01\x00\x01\x00\x60\x00\x00";
        assert_eq!(parse(file), Err(FormatError::HeaderLength(8)));
    }

    #[test]
    fn truncated_track_is_rejected() {
        let mut file = header(1, 96);
        file.extend(b"MTrk\x00\x00\x00\x10\x00\xFF\x2F\x00");

        assert_eq!(
            parse(&file),
            Err(FormatError::Truncated {
                pos: 14,
                declared: 16,
                available: 4
            })
        );
    }

    #[test]
    fn unknown_chunk_tag_is_rejected() {
        let mut file = header(1, 96);
        file.extend(b"XFIH\x00\x00\x00\x00");

        assert!(matches!(
            parse(&file),
            Err(FormatError::UnexpectedChunk { pos: 14, .. })
        ));
    }

    #[test]
    fn trailing_partial_preamble_is_rejected() {
        let mut file = header(1, 96);
        file.extend(track(&[0x00, 0xFF, 0x2F, 0x00]));
        file.extend(b"MTr");

        assert_eq!(
            parse(&file),
            Err(FormatError::IncompletePreamble { pos: 26 })
        );
    }

    #[test]
    fn track_count_mismatch_is_tolerated() {
        let mut file = header(3, 96);
        file.extend(track(&[0x00, 0xFF, 0x2F, 0x00]));

        let (header, tracks) = parse(&file).unwrap();
        assert_eq!(header.declared_tracks(), 3);
        assert_eq!(tracks.len(), 1);
    }
}
