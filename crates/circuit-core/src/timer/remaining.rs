//! Total and remaining session time for display.

use serde::{Deserialize, Serialize};

use super::sequence::Sequence;
use super::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSummary {
    pub total_secs: u64,
    pub remaining_secs: u64,
}

impl TimeSummary {
    pub fn of(seq: &Sequence, session: &Session) -> Self {
        Self {
            total_secs: total_duration(seq),
            remaining_secs: total_remaining(seq, session),
        }
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.total_secs.saturating_sub(self.remaining_secs)
    }
}

/// `sum(durations) * repeat_count`.
pub fn total_duration(seq: &Sequence) -> u64 {
    seq.pass_secs().saturating_mul(seq.repeat_count as u64)
}

/// Seconds left in the whole session, floored at 0.
///
/// Index and repeat are clamped first so reads taken mid-transition stay sane.
pub fn total_remaining(seq: &Sequence, session: &Session) -> u64 {
    if seq.is_empty() || session.is_session_complete {
        return 0;
    }
    let index = session.clamped_index(seq);
    let repeat = session.clamped_repeat(seq);
    let pass = seq.pass_secs();

    let later_repeats = (seq.repeat_count - repeat) as u64 * pass;
    let later_segments: u64 = seq.segments[index + 1..]
        .iter()
        .map(|s| s.duration_secs)
        .sum();
    let current = session.remaining_seconds.min(seq.duration_of(index));

    later_repeats
        .saturating_add(later_segments)
        .saturating_add(current)
}

/// `mm:ss`, or `hh:mm:ss` from one hour up.
pub fn format_clock(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}
