//! Plays a MIDI file through the logging sink.
//!
//! `RUST_LOG=info cargo run --example play -- song.mid [repeats]`

use std::{env, process::ExitCode};

use smfplay::{
    player::{CancelHandle, LogSink, Outcome, PlaybackConfig, Scheduler},
    timeline::Song,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = env::args().skip(1);
    let Some(path) = args.next() else {
        error!("Usage: play <file.mid> [repeats]");
        return ExitCode::FAILURE;
    };
    let repeats = args.next().and_then(|arg| arg.parse().ok()).or(Some(1));

    let song = match Song::read(&path) {
        Ok(song) => song,
        Err(e) => {
            error!(err = %e, path = %path, "Failed to load song.");
            return ExitCode::FAILURE;
        }
    };

    let config = PlaybackConfig::default();
    info!(
        path = %path,
        tracks = song.track_count(),
        duration = ?song.duration(config.default_tempo),
        "Loaded song."
    );

    let mut scheduler = Scheduler::new(config);
    match scheduler.play_looped(&song, &mut LogSink, &CancelHandle::new(), repeats) {
        Outcome::Finished => ExitCode::SUCCESS,
        Outcome::Aborted => ExitCode::FAILURE,
    }
}
