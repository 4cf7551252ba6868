//! Decoded track events

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Centre position of the 14 bit pitch wheel
pub const PITCH_BEND_CENTER: u16 = 0x2000;

/// Any event that may appear in a track. Channel messages carry their 4 bit channel, all data
/// bytes are already masked to 7 bits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Event {
    /// Sent when a note is depressed, status 0x9n
    NoteOn {
        /// MIDI channel, 0-15
        channel: u8,
        /// Note key
        note: u8,
        /// Note velocity
        velocity: u8,
    },
    /// Sent when a note is released, status 0x8n
    NoteOff {
        /// MIDI channel, 0-15
        channel: u8,
        /// Note key
        note: u8,
        /// Release velocity
        velocity: u8,
    },
    /// A controller value changed, status 0xBn
    ControlChange {
        /// MIDI channel, 0-15
        channel: u8,
        /// Controller number
        controller: u8,
        /// New value
        value: u8,
    },
    /// The patch number changed, status 0xCn
    ProgramChange {
        /// MIDI channel, 0-15
        channel: u8,
        /// New program
        program: u8,
    },
    /// Aftertouch for the whole channel, status 0xDn
    ChannelPressure {
        /// MIDI channel, 0-15
        channel: u8,
        /// Pressure value
        value: u8,
    },
    /// Polyphonic aftertouch for a single key, status 0xAn
    KeyPressure {
        /// MIDI channel, 0-15
        channel: u8,
        /// Note key
        note: u8,
        /// Pressure value
        value: u8,
    },
    /// Pitch wheel position as a fourteen bit value, status 0xEn
    PitchBend {
        /// MIDI channel, 0-15
        channel: u8,
        /// Unsigned wheel position, 0x2000 is centred
        value: u16,
    },
    /// Tempo change, meta 0x51
    SetTempo {
        /// Microseconds per quarter note
        microseconds_per_quarter: u32,
    },
    /// Time signature, meta 0x58
    TimeSignature {
        /// Numerator as notated
        numerator: u8,
        /// Denominator as a power of two
        denominator_power: u8,
        /// MIDI clocks per metronome click
        clocks_per_click: u8,
        /// Notated 32nd notes per MIDI quarter note
        thirty_seconds_per_quarter: u8,
    },
    /// Key signature, meta 0x59
    KeySignature {
        /// Negative for flats, positive for sharps
        sharps_flats: i8,
        /// 0 for major, 1 for minor
        mode: u8,
    },
    /// SMPTE start offset of the track, meta 0x54
    SmpteOffset {
        /// Hours of offset
        hours: u8,
        /// Minutes of offset
        minutes: u8,
        /// Seconds of offset
        seconds: u8,
        /// Frames of offset
        frames: u8,
        /// Fractional frames, in hundredths
        subframes: u8,
    },
    /// One of the textual meta events. No encoding is assumed.
    Text {
        /// Which text meta event this was
        kind: TextKind,
        /// Raw payload
        bytes: Vec<u8>,
    },
    /// Output port for the track, meta 0x21
    MidiPort {
        /// Port number
        port: u8,
    },
    /// End of Track marker, meta 0x2F
    EndOfTrack,
}

/// The textual meta events understood by the decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TextKind {
    /// Free text, tag 0x01
    Text,
    /// Copyright notice, tag 0x02
    Copyright,
    /// Sequence or track name, tag 0x03
    TrackName,
}

impl Event {
    /// Returns the channel of a channel voice message, or `None` for meta events
    pub fn channel(&self) -> Option<u8> {
        match *self {
            Self::NoteOn { channel, .. }
            | Self::NoteOff { channel, .. }
            | Self::ControlChange { channel, .. }
            | Self::ProgramChange { channel, .. }
            | Self::ChannelPressure { channel, .. }
            | Self::KeyPressure { channel, .. }
            | Self::PitchBend { channel, .. } => Some(channel),
            _ => None,
        }
    }

    /// Returns true for messages that would be sent to a synthesizer
    pub fn is_channel_message(&self) -> bool {
        self.channel().is_some()
    }

    /// Pitch wheel position relative to centre, in -8192..=8191
    pub fn signed_pitch_bend(&self) -> Option<i16> {
        match *self {
            Self::PitchBend { value, .. } => Some(value as i16 - PITCH_BEND_CENTER as i16),
            _ => None,
        }
    }

    /// Time signature denominator as notated, e.g. 8 for 6/8
    pub fn time_signature_denominator(&self) -> Option<u32> {
        match *self {
            Self::TimeSignature {
                denominator_power, ..
            } => 2u32.checked_pow(denominator_power as u32),
            _ => None,
        }
    }
}

/// An event positioned at an absolute tick within its track
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimedEvent {
    /// Ticks since the start of the track
    pub tick: u64,
    /// The decoded event
    pub event: Event,
}

/// All events of one track in file order. Ticks never decrease.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EventStream {
    /// Events in the order they were decoded
    events: Vec<TimedEvent>,
}

impl EventStream {
    /// Appends an event. Callers uphold the non-decreasing tick order.
    pub(crate) fn push(&mut self, tick: u64, event: Event) {
        debug_assert!(self.last_tick() <= tick);
        self.events.push(TimedEvent { tick, event });
    }

    /// Events of the track in file order
    pub fn events(&self) -> &[TimedEvent] {
        &self.events
    }

    /// Tick of the final event, which for a decoded track is its End of Track
    pub fn last_tick(&self) -> u64 {
        self.events.last().map_or(0, |timed| timed.tick)
    }

    /// Number of events in the track
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns if the track holds no events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl FromIterator<TimedEvent> for EventStream {
    fn from_iter<T: IntoIterator<Item = TimedEvent>>(iter: T) -> Self {
        let mut events: Vec<TimedEvent> = iter.into_iter().collect();
        events.sort_by_key(|timed| timed.tick);
        Self { events }
    }
}

#[cfg(test)]
mod tests {
    use super::{Event, EventStream, TextKind, TimedEvent};

    #[test]
    fn channel_is_reported_for_voice_messages_only() {
        let note = Event::NoteOn {
            channel: 9,
            note: 36,
            velocity: 100,
        };
        assert_eq!(note.channel(), Some(9));
        assert!(note.is_channel_message());

        let name = Event::Text {
            kind: TextKind::TrackName,
            bytes: b"Drums".to_vec(),
        };
        assert_eq!(name.channel(), None);
        assert!(!Event::EndOfTrack.is_channel_message());
    }

    #[test]
    fn pitch_bend_is_centred() {
        let bend = |value| Event::PitchBend { channel: 0, value };
        assert_eq!(bend(0x2000).signed_pitch_bend(), Some(0));
        assert_eq!(bend(0).signed_pitch_bend(), Some(-8192));
        assert_eq!(bend(0x3FFF).signed_pitch_bend(), Some(8191));
        assert_eq!(Event::EndOfTrack.signed_pitch_bend(), None);
    }

    #[test]
    fn time_signature_denominator() {
        let six_eight = Event::TimeSignature {
            numerator: 6,
            denominator_power: 3,
            clocks_per_click: 36,
            thirty_seconds_per_quarter: 8,
        };
        assert_eq!(six_eight.time_signature_denominator(), Some(8));
    }

    #[test]
    fn collecting_keeps_order_within_a_tick() {
        let stream: EventStream = [
            TimedEvent {
                tick: 10,
                event: Event::EndOfTrack,
            },
            TimedEvent {
                tick: 0,
                event: Event::MidiPort { port: 1 },
            },
            TimedEvent {
                tick: 0,
                event: Event::MidiPort { port: 2 },
            },
        ]
        .into_iter()
        .collect();

        let ports: Vec<_> = stream.events().iter().map(|t| t.event.clone()).collect();
        assert_eq!(
            ports,
            vec![
                Event::MidiPort { port: 1 },
                Event::MidiPort { port: 2 },
                Event::EndOfTrack
            ]
        );
        assert_eq!(stream.last_tick(), 10);
    }
}
