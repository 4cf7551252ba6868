//! Decoding a track chunk into its timed event stream

use thiserror::Error;
use tracing::debug;

use crate::{
    event::{Event, EventStream},
    varlen,
};

pub mod meta;
pub mod status;

use status::ChannelFamily;

/// Meta event prefix byte
const META_PREFIX: u8 = 0xFF;
/// System exclusive start byte
const SYSEX_START: u8 = 0xF0;
/// System exclusive continuation/escape byte
const SYSEX_ESCAPE: u8 = 0xF7;

/// Error types from decoding a track. Every one of them rejects the whole file.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Reached the end of the track in the middle of an event
    #[error("Reached end of track before done decoding")]
    Truncated,
    /// A variable-length quantity still had its continuation bit set after 4 bytes
    #[error("Malformed variable-length quantity at byte {pos}")]
    MalformedVarLen {
        /// Offset of the first byte of the quantity
        pos: usize,
    },
    /// Data bytes appeared before any channel status byte
    #[error("missing running status at byte {pos}")]
    MissingRunningStatus {
        /// Offset of the orphaned data byte
        pos: usize,
    },
    /// A system exclusive message was found
    #[error("sysex unsupported (byte {pos})")]
    SysexUnsupported {
        /// Offset of the 0xF0 or 0xF7 byte
        pos: usize,
    },
    /// A system common or real-time status byte appeared in the stream
    #[error("Unexpected status byte {status:#04x} at byte {pos}")]
    UnexpectedStatus {
        /// The offending status byte
        status: u8,
        /// Offset of the status byte
        pos: usize,
    },
    /// A meta event type outside the supported set
    #[error("Unknown meta event type {kind:#04x} at byte {pos}")]
    UnknownMeta {
        /// Meta event type byte
        kind: u8,
        /// Offset of the 0xFF prefix
        pos: usize,
    },
    /// A known meta event with a payload of the wrong size
    #[error("Meta event {kind:#04x} expects {expected} payload bytes, found {found}")]
    InvalidMetaLength {
        /// Meta event type byte
        kind: u8,
        /// Payload size the event requires
        expected: usize,
        /// Payload size declared in the file
        found: usize,
    },
    /// End of Track did not sit at the very end of the chunk
    #[error("track size mismatch: End of Track ends at byte {pos}, chunk is {end} bytes")]
    TrackSizeMismatch {
        /// Offset just past the End of Track event
        pos: usize,
        /// Declared chunk length
        end: usize,
    },
    /// The chunk ended without an End of Track event
    #[error("Track ended without an End of Track event")]
    MissingEndOfTrack,
}

/// Decodes one track chunk payload. State lives for the duration of a single track.
#[derive(Debug)]
pub struct TrackDecoder<'a> {
    /// Track chunk payload
    data: &'a [u8],
    /// Cursor into `data`
    pos: usize,
    /// Absolute tick of the event being decoded
    tick: u64,
    /// Last channel status byte, implied by data bytes that arrive without one
    running_status: Option<u8>,
    /// Events decoded so far
    stream: EventStream,
}

impl<'a> TrackDecoder<'a> {
    /// Prepares to decode the given track payload
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            tick: 0,
            running_status: None,
            stream: EventStream::default(),
        }
    }

    /// Decodes the whole track. The final event is always an End of Track positioned exactly at
    /// the end of the payload.
    pub fn decode(mut self) -> Result<EventStream, DecodeError> {
        while self.pos < self.data.len() {
            let (delta, consumed) = varlen::decode(self.data, self.pos)?;
            self.pos += consumed;
            self.tick += delta as u64;

            let event = self.next_event()?;
            let end_of_track = event == Event::EndOfTrack;
            self.stream.push(self.tick, event);

            if end_of_track {
                if self.pos != self.data.len() {
                    return Err(DecodeError::TrackSizeMismatch {
                        pos: self.pos,
                        end: self.data.len(),
                    });
                }

                debug!(
                    events = self.stream.len(),
                    last_tick = self.tick,
                    "Decoded track."
                );
                return Ok(self.stream);
            }
        }

        Err(DecodeError::MissingEndOfTrack)
    }

    /// Decodes the event following a delta time
    fn next_event(&mut self) -> Result<Event, DecodeError> {
        let pos = self.pos;
        let prefix = *self.data.get(pos).ok_or(DecodeError::Truncated)?;

        match prefix {
            0x80..=0xEF => {
                self.pos += 1;
                self.running_status = Some(prefix);
                self.channel_message(prefix)
            }

            0x00..=0x7F => {
                let status = self
                    .running_status
                    .ok_or(DecodeError::MissingRunningStatus { pos })?;
                self.channel_message(status)
            }

            META_PREFIX => {
                self.pos += 1;
                let event = self.meta_event(pos)?;
                self.running_status = None;
                Ok(event)
            }

            SYSEX_START | SYSEX_ESCAPE => Err(DecodeError::SysexUnsupported { pos }),

            status => Err(DecodeError::UnexpectedStatus { status, pos }),
        }
    }

    /// Reads the data bytes implied by `status`
    fn channel_message(&mut self, status: u8) -> Result<Event, DecodeError> {
        let (family, channel) = ChannelFamily::from_status(status);
        let data = self.take(family.data_len())?;

        Ok(family.to_event(channel, data))
    }

    /// Reads a meta event, the cursor sitting just past the 0xFF prefix at `start`
    fn meta_event(&mut self, start: usize) -> Result<Event, DecodeError> {
        let kind = self.take(1)?[0];

        let (length, consumed) = varlen::decode(self.data, self.pos)?;
        self.pos += consumed;

        let payload = self.take(length as usize)?;
        meta::parse(kind, payload).ok_or(DecodeError::UnknownMeta { kind, pos: start })?
    }

    /// Consumes `n` bytes, failing if the track ends first
    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let data = self.data;
        let bytes = data
            .get(self.pos..self.pos + n)
            .ok_or(DecodeError::Truncated)?;
        self.pos += n;

        Ok(bytes)
    }
}

/// Decodes one track chunk payload into its event stream
pub fn decode(data: &[u8]) -> Result<EventStream, DecodeError> {
    TrackDecoder::new(data).decode()
}
