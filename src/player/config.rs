//! Playback settings

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Microseconds per quarter note before any tempo event, 120 BPM
pub const DEFAULT_TEMPO: u32 = 500_000;

/// Remaining wait below which the clock stops sleeping and polls
pub const DEFAULT_SPIN_THRESHOLD: Duration = Duration::from_millis(3);

/// How the final stretch of each wait is spent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SpinMode {
    /// Yield the thread between polls
    #[default]
    Yield,
    /// Busy loop with a spin hint, lowest latency and highest CPU use
    Spin,
}

impl From<SpinMode> for spin_sleep::SpinStrategy {
    fn from(value: SpinMode) -> Self {
        match value {
            SpinMode::Yield => spin_sleep::SpinStrategy::YieldThread,
            SpinMode::Spin => spin_sleep::SpinStrategy::SpinLoopHint,
        }
    }
}

/// Settings for a [`super::Scheduler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlaybackConfig {
    /// Microseconds per quarter note until the song sets its own tempo
    pub default_tempo: u32,
    /// Waits longer than this sleep first, then poll for the remainder
    pub spin_threshold: Duration,
    /// How to poll once under the threshold
    pub spin_mode: SpinMode,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            default_tempo: DEFAULT_TEMPO,
            spin_threshold: DEFAULT_SPIN_THRESHOLD,
            spin_mode: SpinMode::default(),
        }
    }
}

impl PlaybackConfig {
    /// Sets the tempo used before the first tempo event
    pub fn with_default_tempo(mut self, microseconds_per_quarter: u32) -> Self {
        self.default_tempo = microseconds_per_quarter;
        self
    }

    /// Sets how close to a deadline the clock switches from sleeping to polling
    pub fn with_spin_threshold(mut self, threshold: Duration) -> Self {
        self.spin_threshold = threshold;
        self
    }

    /// Sets the polling behaviour
    pub fn with_spin_mode(mut self, mode: SpinMode) -> Self {
        self.spin_mode = mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{PlaybackConfig, SpinMode};

    #[test]
    fn defaults_to_120_bpm() {
        let config = PlaybackConfig::default();
        assert_eq!(config.default_tempo, 500_000);
        assert_eq!(config.spin_mode, SpinMode::Yield);
    }

    #[test]
    fn builder_overrides() {
        let config = PlaybackConfig::default()
            .with_default_tempo(400_000)
            .with_spin_threshold(Duration::from_millis(16))
            .with_spin_mode(SpinMode::Spin);

        assert_eq!(
            config,
            PlaybackConfig {
                default_tempo: 400_000,
                spin_threshold: Duration::from_millis(16),
                spin_mode: SpinMode::Spin,
            }
        );
    }
}
