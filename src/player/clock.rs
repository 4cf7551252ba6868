//! Wall-clock sources for the scheduler

use std::{
    cell::Cell,
    rc::Rc,
    time::{Duration, Instant},
};

use spin_sleep::SpinSleeper;

use super::config::PlaybackConfig;

/// Measures time since the start of playback and blocks until deadlines
pub trait Clock {
    /// Marks the start of playback
    fn restart(&mut self);

    /// Time elapsed since the last restart
    fn elapsed(&self) -> Duration;

    /// Blocks until `deadline` has elapsed since the last restart. Returns immediately if it
    /// already has.
    fn wait_until(&mut self, deadline: Duration);
}

/// Real time clock. Sleeps while the deadline is far away, then polls so dispatch stays
/// accurate on platforms whose sleep granularity is several milliseconds.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    /// When playback started
    start: Instant,
    /// Sleeps natively down to the spin threshold, then spins
    sleeper: SpinSleeper,
}

impl SystemClock {
    /// Creates a clock using the config's spin threshold and mode
    pub fn new(config: &PlaybackConfig) -> Self {
        let native_accuracy_ns =
            u32::try_from(config.spin_threshold.as_nanos()).unwrap_or(u32::MAX);

        Self {
            start: Instant::now(),
            sleeper: SpinSleeper::new(native_accuracy_ns)
                .with_spin_strategy(config.spin_mode.into()),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(&PlaybackConfig::default())
    }
}

impl Clock for SystemClock {
    fn restart(&mut self) {
        self.start = Instant::now();
    }

    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    fn wait_until(&mut self, deadline: Duration) {
        let now = self.elapsed();
        if deadline > now {
            self.sleeper.sleep(deadline - now);
        }
    }
}

/// A clock that never blocks: every wait jumps straight to its deadline. Useful for dumping a
/// song or rendering it offline. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct OfflineClock {
    /// Current virtual time
    now: Rc<Cell<Duration>>,
}

impl OfflineClock {
    /// Creates a clock at time zero
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for OfflineClock {
    fn restart(&mut self) {
        self.now.set(Duration::ZERO);
    }

    fn elapsed(&self) -> Duration {
        self.now.get()
    }

    fn wait_until(&mut self, deadline: Duration) {
        if deadline > self.now.get() {
            self.now.set(deadline);
        }
    }
}
