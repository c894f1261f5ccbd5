//! Audio cues triggered by session events.
//!
//! The core only decides *which* cue to play and describes its tones; a
//! [`CueSink`] supplied by the front end makes the sound.

use crate::session::SessionEvent;
use crate::ExerciseKind;

/// Seconds remaining at which a countdown pip plays
pub const COUNTDOWN_SECONDS: [u32; 3] = [3, 2, 1];

/// A single tone: frequency in Hz, length in seconds, delay from cue start
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tone {
    pub frequency_hz: f32,
    pub duration_secs: f32,
    pub offset_secs: f32,
}

const fn tone(frequency_hz: f32, duration_secs: f32, offset_secs: f32) -> Tone {
    Tone {
        frequency_hz,
        duration_secs,
        offset_secs,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    /// Final seconds of an exercise
    Countdown,
    /// Moving on from a working exercise
    Transition,
    /// A rest step just ended
    RestEnd,
    /// Workout finished
    Complete,
}

impl Cue {
    pub fn tones(self) -> &'static [Tone] {
        const COUNTDOWN: [Tone; 1] = [tone(880.0, 0.08, 0.0)];
        const TRANSITION: [Tone; 2] = [tone(440.0, 0.15, 0.0), tone(660.0, 0.15, 0.15)];
        const REST_END: [Tone; 2] = [tone(660.0, 0.12, 0.0), tone(880.0, 0.15, 0.12)];
        const COMPLETE: [Tone; 3] = [
            tone(523.0, 0.2, 0.0),
            tone(659.0, 0.2, 0.2),
            tone(784.0, 0.35, 0.4),
        ];

        match self {
            Cue::Countdown => &COUNTDOWN,
            Cue::Transition => &TRANSITION,
            Cue::RestEnd => &REST_END,
            Cue::Complete => &COMPLETE,
        }
    }
}

/// Cues to play for a batch of session events, in order
pub fn cues_for(events: &[SessionEvent]) -> Vec<Cue> {
    events
        .iter()
        .filter_map(|event| match event {
            SessionEvent::Ticked { time_remaining, .. }
                if COUNTDOWN_SECONDS.contains(time_remaining) =>
            {
                Some(Cue::Countdown)
            }
            SessionEvent::Advanced { left_kind, .. } => Some(match left_kind {
                ExerciseKind::Rest => Cue::RestEnd,
                _ => Cue::Transition,
            }),
            SessionEvent::Completed { .. } => Some(Cue::Complete),
            _ => None,
        })
        .collect()
}

/// Something that can play cues
pub trait CueSink {
    fn play(&mut self, cue: Cue);
}

/// Discards every cue
pub struct SilentCues;

impl CueSink for SilentCues {
    fn play(&mut self, _cue: Cue) {}
}

/// Play every cue a batch of events calls for
pub fn play_all<S: CueSink + ?Sized>(sink: &mut S, events: &[SessionEvent]) {
    for cue in cues_for(events) {
        tracing::trace!("Cue {:?}", cue);
        sink.play(cue);
    }
}
