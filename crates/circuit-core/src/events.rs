use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::audio::SoundId;

/// Every state change in the playback core produces an Event.
/// The controller broadcasts them; the CLI prints them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SequenceSelected {
        name: String,
        segments: usize,
        repeat_count: u32,
        total_secs: u64,
        at: DateTime<Utc>,
    },
    TimerStarted {
        segment_index: usize,
        repeat: u32,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    /// A segment counted down to zero. `sound` is the cue to play, if any.
    IntervalCompleted {
        segment_index: usize,
        repeat: u32,
        sound: Option<SoundId>,
        at: DateTime<Utc>,
    },
    IntervalStarted {
        segment_index: usize,
        repeat: u32,
        name: String,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    RepeatStarted {
        repeat: u32,
        repeat_count: u32,
        at: DateTime<Utc>,
    },
    /// Natural end of the final repeat. Starts the completion alert.
    SessionCompleted {
        alert_sound: Option<SoundId>,
        at: DateTime<Utc>,
    },
    /// Manual previous/next.
    Navigated {
        from_index: usize,
        to_index: usize,
        repeat: u32,
        at: DateTime<Utc>,
    },
    /// `next()` on the last segment of the last repeat: stopped, no alert.
    StoppedAtEnd {
        at: DateTime<Utc>,
    },
}

impl Event {
    /// The cue carried by an `IntervalCompleted` event.
    pub fn cue(&self) -> Option<SoundId> {
        match self {
            Event::IntervalCompleted { sound, .. } => *sound,
            _ => None,
        }
    }

    pub fn is_session_completed(&self) -> bool {
        matches!(self, Event::SessionCompleted { .. })
    }
}
