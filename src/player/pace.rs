//! Tick to wall-clock conversion under a changing tempo

use std::{num::NonZeroU16, time::Duration};

/// Nanoseconds per microsecond, tempo is given in microseconds
const NANOS_PER_MICRO: u128 = 1_000;

/// Tracks the tempo in effect and converts ticks to offsets from the start of playback.
///
/// Offsets are accumulated per tempo segment, so a tempo change at tick `k` only stretches or
/// shrinks the gaps after `k`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacer {
    /// Ticks per quarter note
    ticks_per_quarter: NonZeroU16,
    /// Microseconds per quarter note currently in effect
    tempo: u32,
    /// Tick of the last tempo change
    anchor_tick: u64,
    /// Offset of `anchor_tick`
    anchor_offset: Duration,
}

impl Pacer {
    /// Starts at tick 0 with the given tempo
    pub fn new(ticks_per_quarter: NonZeroU16, tempo: u32) -> Self {
        Self {
            ticks_per_quarter,
            tempo,
            anchor_tick: 0,
            anchor_offset: Duration::ZERO,
        }
    }

    /// Tempo currently in effect
    pub fn tempo(&self) -> u32 {
        self.tempo
    }

    /// Offset from the start of playback at which `tick` is due. `tick` must not precede the
    /// last tempo change.
    pub fn deadline(&self, tick: u64) -> Duration {
        let ticks = tick.saturating_sub(self.anchor_tick) as u128;
        let nanos = ticks * self.tempo as u128 * NANOS_PER_MICRO
            / self.ticks_per_quarter.get() as u128;

        self.anchor_offset + Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }

    /// Switches to `tempo` from `tick` onwards
    pub fn set_tempo(&mut self, tick: u64, tempo: u32) {
        self.anchor_offset = self.deadline(tick);
        self.anchor_tick = tick;
        self.tempo = tempo;
    }
}
