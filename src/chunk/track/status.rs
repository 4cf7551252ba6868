//! Channel voice message families

use crate::event::Event;

/// The seven channel voice messages, identified by the high nibble of their status byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelFamily {
    /// 0x8n
    NoteOff,
    /// 0x9n
    NoteOn,
    /// 0xAn
    KeyPressure,
    /// 0xBn
    ControlChange,
    /// 0xCn
    ProgramChange,
    /// 0xDn
    ChannelPressure,
    /// 0xEn
    PitchBend,
}

impl ChannelFamily {
    /// Splits a channel status byte (0x80..=0xEF) into its family and channel
    pub fn from_status(status: u8) -> (Self, u8) {
        let channel = status & 0x0F;
        let family = match status >> 4 {
            0b1000 => Self::NoteOff,
            0b1001 => Self::NoteOn,
            0b1010 => Self::KeyPressure,
            0b1011 => Self::ControlChange,
            0b1100 => Self::ProgramChange,
            0b1101 => Self::ChannelPressure,
            0b1110 => Self::PitchBend,
            _ => unreachable!("Only channel status bytes are classified"),
        };

        (family, channel)
    }

    /// Number of data bytes following the status
    pub fn data_len(self) -> usize {
        match self {
            Self::ProgramChange | Self::ChannelPressure => 1,
            _ => 2,
        }
    }

    /// Builds the event from exactly [`Self::data_len`] data bytes, masking each to 7 bits
    pub fn to_event(self, channel: u8, data: &[u8]) -> Event {
        const MASK: u8 = 0x7F;

        let first = data[0] & MASK;
        let second = || data[1] & MASK;

        match self {
            Self::NoteOff => Event::NoteOff {
                channel,
                note: first,
                velocity: second(),
            },
            Self::NoteOn => Event::NoteOn {
                channel,
                note: first,
                velocity: second(),
            },
            Self::KeyPressure => Event::KeyPressure {
                channel,
                note: first,
                value: second(),
            },
            Self::ControlChange => Event::ControlChange {
                channel,
                controller: first,
                value: second(),
            },
            Self::ProgramChange => Event::ProgramChange {
                channel,
                program: first,
            },
            Self::ChannelPressure => Event::ChannelPressure {
                channel,
                value: first,
            },
            // LSB first, then MSB
            Self::PitchBend => Event::PitchBend {
                channel,
                value: ((second() as u16) << 7) | first as u16,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ChannelFamily;
    use crate::event::Event;

    #[test]
    fn status_splits_into_family_and_channel() {
        assert_eq!(
            ChannelFamily::from_status(0x8F),
            (ChannelFamily::NoteOff, 0x0F)
        );
        assert_eq!(
            ChannelFamily::from_status(0xE2),
            (ChannelFamily::PitchBend, 2)
        );
        assert_eq!(
            ChannelFamily::from_status(0xC0),
            (ChannelFamily::ProgramChange, 0)
        );
    }

    #[test]
    fn data_lengths() {
        assert_eq!(ChannelFamily::ProgramChange.data_len(), 1);
        assert_eq!(ChannelFamily::ChannelPressure.data_len(), 1);
        assert_eq!(ChannelFamily::NoteOn.data_len(), 2);
        assert_eq!(ChannelFamily::PitchBend.data_len(), 2);
    }

    #[test]
    fn data_bytes_are_masked() {
        let key = 0b01010101;
        let velocity = 0b11111111;

        let event = ChannelFamily::NoteOff.to_event(0x0F, &[key, velocity]);
        let expected = Event::NoteOff {
            channel: 0x0F,
            note: key,
            velocity: 0x7F,
        };

        assert_eq!(event, expected)
    }

    #[test]
    fn pitch_bend_combines_lsb_and_msb() {
        let centre = ChannelFamily::PitchBend.to_event(0, &[0x00, 0x40]);
        assert_eq!(
            centre,
            Event::PitchBend {
                channel: 0,
                value: 0x2000
            }
        );

        let max = ChannelFamily::PitchBend.to_event(0, &[0x7F, 0x7F]);
        assert_eq!(max.signed_pitch_bend(), Some(8191));
    }
}
