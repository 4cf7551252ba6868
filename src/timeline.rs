//! Merging decoded tracks into a single song

use std::{collections::BTreeMap, num::NonZeroU16, time::Duration};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    chunk::{self, track},
    event::{Event, EventStream},
    player::pace::Pacer,
    reader::MidiReadable,
    LoadError,
};

/// Every event of every track, keyed by absolute tick.
///
/// Events sharing a tick are ordered by track index, then by their order within the track.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Timeline {
    /// Events per tick, ticks without events are absent
    events: BTreeMap<u64, Vec<Event>>,
}

impl Timeline {
    /// Merges track streams in the order given
    pub fn merge<'a>(streams: impl IntoIterator<Item = &'a EventStream>) -> Self {
        let mut events: BTreeMap<u64, Vec<Event>> = BTreeMap::new();

        for stream in streams {
            for timed in stream.events() {
                events
                    .entry(timed.tick)
                    .or_default()
                    .push(timed.event.clone());
            }
        }

        Self { events }
    }

    /// Events scheduled at `tick`, empty for silent ticks
    pub fn events_at(&self, tick: u64) -> &[Event] {
        self.events.get(&tick).map(Vec::as_slice).unwrap_or_default()
    }

    /// Occupied ticks in ascending order alongside their events
    pub fn iter(&self) -> impl Iterator<Item = (u64, &[Event])> + '_ {
        self.events
            .iter()
            .map(|(tick, events)| (*tick, events.as_slice()))
    }

    /// Highest tick holding an event
    pub fn last_tick(&self) -> u64 {
        self.events.keys().next_back().copied().unwrap_or(0)
    }

    /// Total number of events across all ticks
    pub fn event_count(&self) -> usize {
        self.events.values().map(Vec::len).sum()
    }
}

/// A fully decoded file, ready for playback. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Song {
    /// Merged events of all tracks
    timeline: Timeline,
    /// Latest End of Track across all tracks
    length: u64,
    /// Ticks per quarter note
    ticks_per_quarter: NonZeroU16,
    /// Track count claimed by the header
    declared_tracks: u16,
    /// Track chunks actually decoded
    tracks: usize,
}

impl Song {
    /// Builds a song from decoded tracks
    pub fn new(ticks_per_quarter: NonZeroU16, streams: &[EventStream]) -> Self {
        let length = streams
            .iter()
            .map(EventStream::last_tick)
            .max()
            .unwrap_or(0);

        Self {
            timeline: Timeline::merge(streams),
            length,
            ticks_per_quarter,
            declared_tracks: streams.len().try_into().unwrap_or(u16::MAX),
            tracks: streams.len(),
        }
    }

    /// Decodes a complete file. Either every track decodes or nothing is returned.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LoadError> {
        let (header, tracks) = chunk::parse(bytes)?;

        let streams = tracks
            .iter()
            .enumerate()
            .map(|(index, data)| {
                track::decode(data).map_err(|source| LoadError::Decode {
                    track: index,
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut song = Self::new(header.ticks_per_quarter(), &streams);
        song.declared_tracks = header.declared_tracks();

        debug!(
            tracks = song.tracks,
            length = song.length,
            events = song.timeline.event_count(),
            "Loaded song."
        );

        Ok(song)
    }

    /// Reads and decodes a file from any [`MidiReadable`] source
    pub fn read<SOURCE>(source: SOURCE) -> Result<Self, LoadError>
    where
        SOURCE: MidiReadable,
        LoadError: From<SOURCE::Error>,
    {
        let bytes = source.get_midi_bytes()?;
        Self::from_bytes(&bytes)
    }

    /// The merged timeline
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Events scheduled at `tick`
    pub fn events_at(&self, tick: u64) -> &[Event] {
        self.timeline.events_at(tick)
    }

    /// Tick of the latest End of Track
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Ticks per quarter note
    pub fn ticks_per_quarter(&self) -> NonZeroU16 {
        self.ticks_per_quarter
    }

    /// Track count claimed by the file header
    pub fn declared_tracks(&self) -> u16 {
        self.declared_tracks
    }

    /// Number of track chunks decoded
    pub fn track_count(&self) -> usize {
        self.tracks
    }

    /// Wall-clock length of the song when played from `default_tempo` (microseconds per quarter
    /// note), following every tempo change the way playback does
    pub fn duration(&self, default_tempo: u32) -> Duration {
        let mut pacer = Pacer::new(self.ticks_per_quarter, default_tempo);

        for (tick, events) in self.timeline.iter() {
            for event in events {
                if let Event::SetTempo {
                    microseconds_per_quarter,
                } = *event
                {
                    pacer.set_tempo(tick, microseconds_per_quarter);
                }
            }
        }

        pacer.deadline(self.length)
    }
}
