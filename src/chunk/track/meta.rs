//! Meta event parsing

use super::DecodeError;
use crate::event::{Event, TextKind};

/// Builds the event for meta type `kind` from its payload. Returns `None` for meta types the
/// decoder does not know.
pub fn parse(kind: u8, data: &[u8]) -> Option<Result<Event, DecodeError>> {
    macro_rules! meta_event {
        ($len: expr, $value: expr) => {{
            if data.len() != $len {
                return Some(Err(DecodeError::InvalidMetaLength {
                    kind,
                    expected: $len,
                    found: data.len(),
                }));
            }
            $value
        }};
    }

    let event = match kind {
        0x01 => text(TextKind::Text, data),
        0x02 => text(TextKind::Copyright, data),
        0x03 => text(TextKind::TrackName, data),

        0x21 => meta_event!(1, Event::MidiPort { port: data[0] }),
        0x2F => meta_event!(0, Event::EndOfTrack),

        0x51 => meta_event!(
            3,
            Event::SetTempo {
                microseconds_per_quarter: u32::from_be_bytes([0, data[0], data[1], data[2]])
            }
        ),
        0x54 => meta_event!(
            5,
            Event::SmpteOffset {
                hours: data[0],
                minutes: data[1],
                seconds: data[2],
                frames: data[3],
                subframes: data[4],
            }
        ),
        0x58 => meta_event!(
            4,
            Event::TimeSignature {
                numerator: data[0],
                denominator_power: data[1],
                clocks_per_click: data[2],
                thirty_seconds_per_quarter: data[3],
            }
        ),
        0x59 => meta_event!(
            2,
            Event::KeySignature {
                sharps_flats: data[0] as i8,
                mode: data[1],
            }
        ),

        _ => return None,
    };

    Some(Ok(event))
}

/// Text events keep their raw bytes
fn text(kind: TextKind, data: &[u8]) -> Event {
    Event::Text {
        kind,
        bytes: data.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::parse;
    use crate::{
        chunk::track::DecodeError,
        event::{Event, TextKind},
    };

    /// Parses a meta event known to be supported
    fn known(kind: u8, data: &[u8]) -> Result<Event, DecodeError> {
        parse(kind, data).expect("Meta type is supported")
    }

    #[test]
    fn test_text_event() {
        let result = known(0x01, b"Hello").unwrap();
        assert_eq!(
            result,
            Event::Text {
                kind: TextKind::Text,
                bytes: b"Hello".to_vec()
            }
        );
    }

    #[test]
    fn test_copyright_keeps_non_utf8_bytes() {
        // Latin-1 copyright sign
        let result = known(0x02, &[0xA9, b' ', b'1', b'9', b'9', b'1']).unwrap();
        assert_eq!(
            result,
            Event::Text {
                kind: TextKind::Copyright,
                bytes: vec![0xA9, b' ', b'1', b'9', b'9', b'1']
            }
        );
    }

    #[test]
    fn test_tempo_event() {
        // 500,000 microseconds/quarter note
        let result = known(0x51, &[0x07, 0xA1, 0x20]).unwrap();
        assert_eq!(
            result,
            Event::SetTempo {
                microseconds_per_quarter: 500_000
            }
        );
    }

    #[test]
    fn test_time_signature_event() {
        let result = known(0x58, &[0x04, 0x02, 0x18, 0x08]).unwrap();
        assert_eq!(
            result,
            Event::TimeSignature {
                numerator: 4,
                denominator_power: 2,
                clocks_per_click: 24,
                thirty_seconds_per_quarter: 8,
            }
        );
    }

    #[test]
    fn test_key_signature_event() {
        // 3 flats, minor
        let result = known(0x59, &[0xFD, 0x01]).unwrap();
        assert_eq!(
            result,
            Event::KeySignature {
                sharps_flats: -3,
                mode: 1
            }
        );
    }

    #[test]
    fn test_smpte_offset_event() {
        let result = known(0x54, &[0x01, 0x02, 0x03, 0x04, 0x05]).unwrap();
        assert_eq!(
            result,
            Event::SmpteOffset {
                hours: 1,
                minutes: 2,
                seconds: 3,
                frames: 4,
                subframes: 5,
            }
        );
    }

    #[test]
    fn test_midi_port_event() {
        assert_eq!(known(0x21, &[0x02]).unwrap(), Event::MidiPort { port: 2 });
    }

    #[test]
    fn test_wrong_payload_length() {
        assert_eq!(
            known(0x51, &[0x07, 0xA1]),
            Err(DecodeError::InvalidMetaLength {
                kind: 0x51,
                expected: 3,
                found: 2
            })
        );
        assert_eq!(
            known(0x2F, &[0x00]),
            Err(DecodeError::InvalidMetaLength {
                kind: 0x2F,
                expected: 0,
                found: 1
            })
        );
    }

    #[test]
    fn test_unknown_meta_types() {
        assert!(parse(0x00, &[0x00, 0x01]).is_none());
        assert!(parse(0x05, b"la").is_none());
        assert!(parse(0x7F, &[]).is_none());
    }
}
