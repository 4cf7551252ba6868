//! Receivers of dispatched events

use tracing::info;

use crate::event::Event;

/// Receives every event of a song, in timeline order, as playback reaches its tick.
///
/// Calls must return promptly: any time spent here delays everything after it.
pub trait Sink {
    /// Handles one event at `tick`
    fn dispatch(&mut self, tick: u64, event: &Event);
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn dispatch(&mut self, tick: u64, event: &Event) {
        (**self).dispatch(tick, event);
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn dispatch(&mut self, tick: u64, event: &Event) {
        (**self).dispatch(tick, event);
    }
}

/// Records every dispatched event
impl Sink for Vec<(u64, Event)> {
    fn dispatch(&mut self, tick: u64, event: &Event) {
        self.push((tick, event.clone()));
    }
}

/// Adapts a closure into a [`Sink`]
#[derive(Debug, Clone)]
pub struct FnSink<F>(pub F);

impl<F> Sink for FnSink<F>
where
    F: FnMut(u64, &Event),
{
    fn dispatch(&mut self, tick: u64, event: &Event) {
        (self.0)(tick, event);
    }
}

/// Logs channel messages and ignores annotations such as text, signatures and End of Track
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl Sink for LogSink {
    fn dispatch(&mut self, tick: u64, event: &Event) {
        if event.is_channel_message() {
            info!(tick, event = ?event, "MIDI event.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FnSink, LogSink, Sink};
    use crate::event::Event;

    #[test]
    fn vec_records_in_order() {
        let mut recorded: Vec<(u64, Event)> = vec![];
        recorded.dispatch(0, &Event::MidiPort { port: 0 });
        recorded.dispatch(4, &Event::EndOfTrack);

        assert_eq!(
            recorded,
            vec![(0, Event::MidiPort { port: 0 }), (4, Event::EndOfTrack)]
        );
    }

    #[test]
    fn closures_receive_events() {
        let mut notes = 0;
        {
            let mut sink = FnSink(|_tick: u64, event: &Event| {
                if matches!(event, Event::NoteOn { .. }) {
                    notes += 1;
                }
            });
            sink.dispatch(
                0,
                &Event::NoteOn {
                    channel: 0,
                    note: 60,
                    velocity: 1,
                },
            );
            sink.dispatch(0, &Event::EndOfTrack);
        }

        assert_eq!(notes, 1);
    }

    #[test]
    fn log_sink_accepts_everything() {
        let mut sink: Box<dyn Sink> = Box::new(LogSink);
        sink.dispatch(0, &Event::EndOfTrack);
        sink.dispatch(
            1,
            &Event::ProgramChange {
                channel: 9,
                program: 0,
            },
        );
    }
}
