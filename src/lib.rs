//! # smfplay
//!
//! A strict Standard MIDI File decoder paired with a tempo-accurate playback scheduler.
//!
//! ## Overview
//!
//! MIDI files are structured as a series of chunks. Each chunk contains a 4-character ASCII
//! type identifier and a 32-bit length that specifies how many bytes of data follow. Loading a
//! file runs the following pipeline:
//!
//! - [`chunk::parse`] splits the bytes into the header and the raw track payloads, rejecting
//!   anything but format 1 files with a ticks-per-quarter-note division.
//! - [`chunk::track::TrackDecoder`] turns each payload into an [`event::EventStream`],
//!   handling running status and the meta events it knows about.
//! - [`timeline::Timeline::merge`] folds all streams into one tick-indexed timeline, wrapped
//!   up in an immutable [`timeline::Song`].
//! - [`player::Scheduler`] walks the song tick by tick, following tempo changes, and hands
//!   every event to a [`player::Sink`] at the right wall-clock moment.
//!
//! Decoding never guesses. Unknown meta events, system exclusive messages, missing running
//! status and size mismatches all reject the file outright.
//!
//! ## Example Usage
//!
//! ```rust
//! use smfplay::{
//!     player::{CancelHandle, OfflineClock, Outcome, PlaybackConfig, Scheduler},
//!     timeline::Song,
//! };
//!
//! let bytes = [
//!     b'M', b'T', b'h', b'd', 0, 0, 0, 6, 0, 1, 0, 1, 0, 96,
//!     b'M', b'T', b'r', b'k', 0, 0, 0, 12,
//!     0x00, 0x90, 60, 100,
//!     0x60, 0x80, 60, 0,
//!     0x00, 0xFF, 0x2F, 0x00,
//! ];
//! let song = Song::from_bytes(&bytes).expect("Decode song");
//! assert_eq!(song.length(), 96);
//!
//! let mut dispatched: Vec<(u64, smfplay::event::Event)> = vec![];
//! let mut scheduler = Scheduler::with_clock(PlaybackConfig::default(), OfflineClock::new());
//! let outcome = scheduler.play(&song, &mut dispatched, &CancelHandle::new());
//!
//! assert_eq!(outcome, Outcome::Finished);
//! assert_eq!(dispatched.len(), 3);
//! ```
//!
//! ## Library Structure
//!
//! - **[`varlen`]**: Variable-length quantity decoding.
//! - **[`chunk`]**: Chunk splitting, header validation and per-track event decoding.
//! - **[`event`]**: The closed set of events the decoder produces.
//! - **[`timeline`]**: Track merging and the [`timeline::Song`] aggregate.
//! - **[`player`]**: Real-time playback, sinks, cancellation and clocks.
//! - **[`reader`]**: Getting file bytes from disk or memory.

use std::convert::Infallible;

use chunk::{track::DecodeError, FormatError};
use thiserror::Error;

pub mod chunk;
pub mod event;
pub mod player;
pub mod reader;
pub mod timeline;
pub mod varlen;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Represents a raw MIDI Chunk preamble.
/// A MIDI Chunk consists of a 4-character ASCII type identifier and a 32-bit unsigned integer specifying the length of its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Chunk {
    /// 4 character ASCII chunk type
    pub chunk_type: [u8; 4],
    /// Length of the data that follows
    length: u32,
}

impl Chunk {
    /// Gets the length of the chunk as a usize
    pub fn len(&self) -> usize {
        self.length as usize
    }

    /// Returns if the chunk has no attributed data
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

impl From<u64> for Chunk {
    fn from(value: u64) -> Self {
        let high = (value >> 32) as u32;
        let low = value as u32;

        Self {
            chunk_type: high.to_be_bytes(),
            length: low,
        }
    }
}

/// Anything that can go wrong while turning a file into a [`timeline::Song`]
#[derive(Debug, Error)]
pub enum LoadError {
    /// The bytes could not be read
    #[error("Failed to read MIDI data")]
    Io(#[from] std::io::Error),
    /// The chunk structure or header is invalid
    #[error("Invalid MIDI file structure")]
    Format(#[from] FormatError),
    /// A track's event stream could not be decoded
    #[error("Failed to decode track {track}")]
    Decode {
        /// Index of the offending track chunk
        track: usize,
        /// What went wrong inside the track
        #[source]
        source: DecodeError,
    },
}

impl From<Infallible> for LoadError {
    fn from(value: Infallible) -> Self {
        match value {}
    }
}
