//! Playback engine.
//!
//! The engine is a synchronous state machine over a [`Sequence`] and its
//! [`Session`]. It does not own a timer; the caller invokes `tick()` once per
//! logical second (or `advance_by()` after a late wake-up).
//!
//! ## State Transitions
//!
//! ```text
//! Idle <-> Running -> Complete
//!   ^                    |
//!   +------ reset -------+
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = PlaybackEngine::new(sequence);
//! engine.start();
//! // Once per second:
//! for event in engine.tick() { /* play cues, update UI */ }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::remaining::{format_clock, TimeSummary};
use super::sequence::{SegmentKind, Sequence};
use super::session::{Session, Transition};
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Idle,
    Running,
    Complete,
}

/// Read model handed to UI collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    pub state: PlaybackState,
    pub timer_name: String,
    pub current_interval_index: usize,
    pub segment_name: String,
    pub segment_kind: SegmentKind,
    pub segment_color: String,
    pub remaining_seconds: u64,
    pub current_repeat: u32,
    pub repeat_count: u32,
    pub is_running: bool,
    pub is_session_complete: bool,
    pub total_duration_secs: u64,
    pub total_remaining_secs: u64,
    pub total_duration: String,
    pub total_remaining: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackEngine {
    sequence: Sequence,
    session: Session,
}

impl PlaybackEngine {
    /// Create an engine for `sequence`, Idle at the first segment.
    pub fn new(sequence: Sequence) -> Self {
        let session = Session::initial(&sequence);
        Self { sequence, session }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> PlaybackState {
        if self.session.is_session_complete {
            PlaybackState::Complete
        } else if self.session.is_running {
            PlaybackState::Running
        } else {
            PlaybackState::Idle
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    pub fn is_running(&self) -> bool {
        self.session.is_running
    }

    pub fn time_summary(&self) -> TimeSummary {
        TimeSummary::of(&self.sequence, &self.session)
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        let index = self.session.clamped_index(&self.sequence);
        let segment = self.sequence.segment(index);
        let summary = self.time_summary();
        PlaybackSnapshot {
            state: self.state(),
            timer_name: self.sequence.name.clone(),
            current_interval_index: index,
            segment_name: segment.map(|s| s.name.clone()).unwrap_or_default(),
            segment_kind: segment.map(|s| s.kind).unwrap_or(SegmentKind::Interval),
            segment_color: segment.map(|s| s.color.clone()).unwrap_or_default(),
            remaining_seconds: self.session.remaining_seconds,
            current_repeat: self.session.clamped_repeat(&self.sequence),
            repeat_count: self.sequence.repeat_count,
            is_running: self.session.is_running,
            is_session_complete: self.session.is_session_complete,
            total_duration_secs: summary.total_secs,
            total_remaining_secs: summary.remaining_secs,
            total_duration: format_clock(summary.total_secs),
            total_remaining: format_clock(summary.remaining_secs),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Idle -> Running. `None` when already running, complete, or the
    /// sequence has nothing to play.
    pub fn start(&mut self) -> Option<Event> {
        if !self.can_run() {
            return None;
        }
        self.session.is_running = true;
        debug!(index = self.session.current_interval_index, "playback started");
        Some(Event::TimerStarted {
            segment_index: self.session.current_interval_index,
            repeat: self.session.current_repeat,
            remaining_secs: self.session.remaining_seconds,
            at: Utc::now(),
        })
    }

    /// Same transition as `start`, reported as a resume.
    pub fn resume(&mut self) -> Option<Event> {
        self.start()?;
        Some(Event::TimerResumed {
            remaining_secs: self.session.remaining_seconds,
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if !self.session.is_running {
            return None;
        }
        self.session.is_running = false;
        debug!(remaining = self.session.remaining_seconds, "playback paused");
        Some(Event::TimerPaused {
            remaining_secs: self.session.remaining_seconds,
            at: Utc::now(),
        })
    }

    /// Back to the initial Idle session, from any state.
    pub fn reset(&mut self) -> Event {
        self.session = Session::initial(&self.sequence);
        Event::TimerReset { at: Utc::now() }
    }

    /// Replace the sequence and discard the old session.
    pub fn select_sequence(&mut self, sequence: Sequence) -> Event {
        self.session = Session::initial(&sequence);
        self.sequence = sequence;
        Event::SequenceSelected {
            name: self.sequence.name.clone(),
            segments: self.sequence.len(),
            repeat_count: self.sequence.repeat_count,
            total_secs: self.time_summary().total_secs,
            at: Utc::now(),
        }
    }

    /// One logical second.
    pub fn tick(&mut self) -> Vec<Event> {
        let step = self.session.tick(&self.sequence);
        self.apply(step)
    }

    /// `seconds` ticks applied as one atomic step.
    pub fn advance_by(&mut self, seconds: u64) -> Vec<Event> {
        let step = self.session.advance_by(&self.sequence, seconds);
        self.apply(step)
    }

    pub fn previous(&mut self) -> Vec<Event> {
        let step = self.session.previous(&self.sequence);
        self.apply(step)
    }

    pub fn next(&mut self) -> Vec<Event> {
        let step = self.session.next(&self.sequence);
        self.apply(step)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn can_run(&self) -> bool {
        if self.session.is_running || self.session.is_session_complete {
            return false;
        }
        if !self.sequence.is_playable() {
            debug!(timer = %self.sequence.name, "start ignored: nothing to play");
            return false;
        }
        true
    }

    fn apply(&mut self, step: Transition) -> Vec<Event> {
        self.session = step.session;
        step.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::sequence::{Interval, TimerDefinition};

    fn engine(durations: &[u64], repeats: u32) -> PlaybackEngine {
        let intervals = durations
            .iter()
            .map(|d| Interval::new(format!("{d}s"), *d))
            .collect();
        PlaybackEngine::new(Sequence::from_definition(&TimerDefinition::new(
            "test", intervals, repeats,
        )))
    }

    #[test]
    fn start_pause_resume() {
        let mut engine = engine(&[10], 1);
        assert_eq!(engine.state(), PlaybackState::Idle);

        assert!(engine.start().is_some());
        assert_eq!(engine.state(), PlaybackState::Running);
        assert!(engine.start().is_none());

        assert!(engine.pause().is_some());
        assert_eq!(engine.state(), PlaybackState::Idle);
        assert!(engine.pause().is_none());

        assert!(matches!(engine.resume(), Some(Event::TimerResumed { .. })));
        assert_eq!(engine.state(), PlaybackState::Running);
    }

    #[test]
    fn paused_engine_ignores_ticks() {
        let mut engine = engine(&[10], 1);
        engine.start();
        engine.tick();
        engine.pause();
        engine.advance_by(5);
        assert_eq!(engine.session().remaining_seconds, 9);
    }

    #[test]
    fn empty_or_zero_sequence_refuses_to_start() {
        let mut empty = engine(&[], 1);
        assert!(empty.start().is_none());
        assert_eq!(empty.state(), PlaybackState::Idle);

        let mut zero = engine(&[0, 0], 3);
        assert!(zero.start().is_none());
    }

    #[test]
    fn complete_is_terminal_until_reset() {
        let mut engine = engine(&[2], 1);
        engine.start();
        engine.advance_by(2);
        assert_eq!(engine.state(), PlaybackState::Complete);
        assert!(engine.start().is_none());
        assert!(engine.resume().is_none());

        engine.reset();
        assert_eq!(engine.state(), PlaybackState::Idle);
        assert_eq!(engine.session().remaining_seconds, 2);
        assert!(engine.start().is_some());
    }

    #[test]
    fn reset_goes_to_beginning() {
        let mut engine = engine(&[5, 5], 3);
        engine.start();
        engine.advance_by(12);
        engine.reset();
        assert_eq!(
            engine.session(),
            &Session {
                current_interval_index: 0,
                current_repeat: 1,
                remaining_seconds: 5,
                is_running: false,
                is_session_complete: false,
            }
        );
    }

    #[test]
    fn select_sequence_discards_session() {
        let mut engine = engine(&[5, 5], 3);
        engine.start();
        engine.advance_by(7);
        let event = engine.select_sequence(Sequence::from_definition(&TimerDefinition::new(
            "other",
            vec![Interval::new("x", 42)],
            1,
        )));
        assert!(matches!(event, Event::SequenceSelected { total_secs: 42, .. }));
        assert_eq!(engine.state(), PlaybackState::Idle);
        assert_eq!(engine.session().remaining_seconds, 42);
    }

    #[test]
    fn snapshot_formats_times() {
        let mut engine = engine(&[30, 15], 2);
        engine.start();
        engine.advance_by(31);
        let snap = engine.snapshot();
        assert_eq!(snap.current_interval_index, 1);
        assert_eq!(snap.segment_name, "15s");
        assert_eq!(snap.remaining_seconds, 14);
        assert_eq!(snap.total_duration, "01:30");
        assert_eq!(snap.total_remaining, "00:59");
        assert_eq!(snap.state, PlaybackState::Running);
    }
}
