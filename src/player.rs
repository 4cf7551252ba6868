//! Real-time playback of a decoded [`Song`]

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tracing::{info, trace};

use crate::{event::Event, timeline::Song};

pub mod clock;
pub mod config;
pub(crate) mod pace;
pub mod sink;

pub use clock::{Clock, OfflineClock, SystemClock};
pub use config::{PlaybackConfig, SpinMode};
pub use sink::{FnSink, LogSink, Sink};

use pace::Pacer;

/// How a call to [`Scheduler::play`] ended
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every tick up to the song's length was played
    Finished,
    /// The cancel handle was triggered before the end
    Aborted,
}

/// A cancel handle is passed to the scheduler during playback. It is checked once per tick, so
/// the events of the tick in progress are still dispatched.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    /// Set to true once playback should stop
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Creates a new cancel handle.
    pub fn new() -> CancelHandle {
        CancelHandle::default()
    }

    /// Returns true if playback has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Cancel playback.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

/// Walks a song tick by tick, pacing dispatch against a [`Clock`] and following tempo changes.
///
/// Every tick from 0 to the song's length is visited, silent or not. A tick's deadline is
/// computed with the tempo in effect before that tick's own tempo events, so a change at tick
/// `k` only affects the ticks after it.
#[derive(Debug)]
pub struct Scheduler<C = SystemClock> {
    /// Playback settings
    config: PlaybackConfig,
    /// Time source
    clock: C,
    /// Tick being played
    current_tick: u64,
    /// Microseconds per quarter note in effect
    current_tempo: u32,
}

impl Scheduler<SystemClock> {
    /// Creates a real-time scheduler
    pub fn new(config: PlaybackConfig) -> Self {
        let clock = SystemClock::new(&config);
        Self::with_clock(config, clock)
    }
}

impl<C: Clock> Scheduler<C> {
    /// Creates a scheduler driven by a custom clock
    pub fn with_clock(config: PlaybackConfig, clock: C) -> Self {
        Self {
            current_tempo: config.default_tempo,
            config,
            clock,
            current_tick: 0,
        }
    }

    /// Tick most recently reached
    pub fn current_tick(&self) -> u64 {
        self.current_tick
    }

    /// Tempo in effect, in microseconds per quarter note
    pub fn current_tempo(&self) -> u32 {
        self.current_tempo
    }

    /// The scheduler's clock
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Plays the song once from the beginning, sending every event to `sink`.
    ///
    /// Returns [`Outcome::Aborted`] if `cancel` is triggered first.
    pub fn play<S>(&mut self, song: &Song, sink: &mut S, cancel: &CancelHandle) -> Outcome
    where
        S: Sink + ?Sized,
    {
        self.current_tick = 0;
        self.current_tempo = self.config.default_tempo;
        let mut pacer = Pacer::new(song.ticks_per_quarter(), self.current_tempo);

        info!(
            length = song.length(),
            ticks_per_quarter = song.ticks_per_quarter().get(),
            "Starting playback."
        );

        self.clock.restart();
        for tick in 0..=song.length() {
            if cancel.is_cancelled() {
                info!(tick, "Playback has been cancelled.");
                return Outcome::Aborted;
            }

            self.current_tick = tick;
            self.clock.wait_until(pacer.deadline(tick));

            for event in song.events_at(tick) {
                if let Event::SetTempo {
                    microseconds_per_quarter,
                } = *event
                {
                    pacer.set_tempo(tick, microseconds_per_quarter);
                    self.current_tempo = microseconds_per_quarter;
                }

                trace!(tick, event = ?event, "Dispatching event.");
                sink.dispatch(tick, event);
            }
        }

        info!(elapsed = ?self.clock.elapsed(), "Playback finished.");
        Outcome::Finished
    }

    /// Plays the song over and over, each pass starting from a clean state, until cancelled or
    /// until `repeats` passes have finished. `None` repeats forever.
    pub fn play_looped<S>(
        &mut self,
        song: &Song,
        sink: &mut S,
        cancel: &CancelHandle,
        repeats: Option<usize>,
    ) -> Outcome
    where
        S: Sink + ?Sized,
    {
        let mut passes = 0;
        while repeats.map_or(true, |repeats| passes < repeats) {
            if self.play(song, sink, cancel) == Outcome::Aborted {
                return Outcome::Aborted;
            }
            passes += 1;
        }

        Outcome::Finished
    }
}
