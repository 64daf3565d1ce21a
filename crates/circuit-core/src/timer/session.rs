//! Session state and the pure tick transition.
//!
//! `Session::tick` takes the current record and the sequence and returns the
//! next record plus the events it produced. Nothing here touches a clock or
//! an audio device, so every transition can be tested by calling it.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::sequence::Sequence;
use crate::events::Event;

/// Ephemeral runtime state for one playback attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub current_interval_index: usize,
    /// 1-based.
    pub current_repeat: u32,
    pub remaining_seconds: u64,
    pub is_running: bool,
    pub is_session_complete: bool,
}

/// Result of one transition.
#[derive(Debug, Clone)]
pub struct Transition {
    pub session: Session,
    pub events: Vec<Event>,
}

impl Transition {
    fn unchanged(session: &Session) -> Self {
        Self {
            session: session.clone(),
            events: Vec::new(),
        }
    }
}

impl Session {
    /// Fresh Idle session positioned at the first segment.
    pub fn initial(seq: &Sequence) -> Self {
        Self {
            current_interval_index: 0,
            current_repeat: 1,
            remaining_seconds: seq.duration_of(0),
            is_running: false,
            is_session_complete: false,
        }
    }

    /// Segment index clamped into the sequence.
    pub fn clamped_index(&self, seq: &Sequence) -> usize {
        self.current_interval_index
            .min(seq.len().saturating_sub(1))
    }

    /// Repeat clamped into `1..=repeat_count`.
    pub fn clamped_repeat(&self, seq: &Sequence) -> u32 {
        self.current_repeat.clamp(1, seq.repeat_count.max(1))
    }

    /// One logical second.
    ///
    /// Decrements once; on reaching zero emits the finished segment's cue and
    /// advances. Zero-length segments are passed through inside the same
    /// transition, so a session always completes after exactly
    /// `total_duration` ticks. A countdown already at zero on a timed segment
    /// only advances, so no cue is fired twice.
    pub fn tick(&self, seq: &Sequence) -> Transition {
        if !self.is_running || self.is_session_complete || seq.is_empty() {
            return Transition::unchanged(self);
        }
        let index = self.clamped_index(seq);
        if seq.segments[index].is_hold() {
            return Transition::unchanged(self);
        }

        let mut next = self.clone();
        next.current_interval_index = index;
        next.current_repeat = self.clamped_repeat(seq);
        let mut events = Vec::new();

        if next.remaining_seconds == 0 {
            if !next.on_zero_length(seq) {
                next.advance(seq, &mut events);
                return Transition {
                    session: next,
                    events,
                };
            }
            if !next.settle(seq, &mut events) {
                return Transition {
                    session: next,
                    events,
                };
            }
            next.announce(seq, &mut events);
        }

        let index = next.current_interval_index;
        if seq.segments[index].is_hold() {
            return Transition {
                session: next,
                events,
            };
        }

        next.remaining_seconds -= 1;
        if next.remaining_seconds == 0 {
            events.push(Event::IntervalCompleted {
                segment_index: index,
                repeat: next.current_repeat,
                sound: seq.completion_sound(index),
                at: Utc::now(),
            });
            next.advance(seq, &mut events);
        }

        Transition {
            session: next,
            events,
        }
    }

    /// Apply `seconds` ticks in one step, stopping early once playback stops.
    pub fn advance_by(&self, seq: &Sequence, seconds: u64) -> Transition {
        let mut current = Transition::unchanged(self);
        for _ in 0..seconds {
            if !current.session.is_running {
                break;
            }
            let step = current.session.tick(seq);
            current.session = step.session;
            current.events.extend(step.events);
        }
        current
    }

    /// Move past the current segment and any zero-length segments after it,
    /// rolling into the next repeat or completing the session.
    fn advance(&mut self, seq: &Sequence, events: &mut Vec<Event>) {
        if self.step(seq, events) && self.settle(seq, events) {
            self.announce(seq, events);
        }
    }

    /// One move: next index, next repeat, or completion. Returns false once
    /// the session is complete.
    fn step(&mut self, seq: &Sequence, events: &mut Vec<Event>) -> bool {
        let last = seq.len() - 1;
        if self.current_interval_index < last {
            self.current_interval_index += 1;
        } else if self.current_repeat < seq.repeat_count {
            self.current_repeat += 1;
            self.current_interval_index = 0;
            events.push(Event::RepeatStarted {
                repeat: self.current_repeat,
                repeat_count: seq.repeat_count,
                at: Utc::now(),
            });
        } else {
            self.is_running = false;
            self.is_session_complete = true;
            self.remaining_seconds = 0;
            events.push(Event::SessionCompleted {
                alert_sound: seq.alert_sound(),
                at: Utc::now(),
            });
            return false;
        }
        self.remaining_seconds = seq.duration_of(self.current_interval_index);
        true
    }

    /// Step over zero-length segments (holds excepted). Returns false if
    /// that ran off the end of the last repeat.
    fn settle(&mut self, seq: &Sequence, events: &mut Vec<Event>) -> bool {
        while self.on_zero_length(seq) {
            if !self.step(seq, events) {
                return false;
            }
        }
        true
    }

    fn on_zero_length(&self, seq: &Sequence) -> bool {
        seq.segment(self.current_interval_index)
            .is_some_and(|s| s.duration_secs == 0 && !s.is_hold())
    }

    fn announce(&self, seq: &Sequence, events: &mut Vec<Event>) {
        events.push(Event::IntervalStarted {
            segment_index: self.current_interval_index,
            repeat: self.current_repeat,
            name: seq.segments[self.current_interval_index].name.clone(),
            duration_secs: self.remaining_seconds,
            at: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SoundId;
    use crate::timer::sequence::{Interval, TimerDefinition};

    fn seq(durations: &[u64], repeats: u32) -> Sequence {
        let intervals = durations
            .iter()
            .enumerate()
            .map(|(i, d)| Interval::new(format!("I{i}"), *d))
            .collect();
        Sequence::from_definition(&TimerDefinition::new("t", intervals, repeats))
    }

    fn running(seq: &Sequence) -> Session {
        Session {
            is_running: true,
            ..Session::initial(seq)
        }
    }

    #[test]
    fn idle_session_does_not_tick() {
        let s = seq(&[5], 1);
        let t = Session::initial(&s).tick(&s);
        assert_eq!(t.session, Session::initial(&s));
        assert!(t.events.is_empty());
    }

    #[test]
    fn tick_decrements_once() {
        let s = seq(&[5, 3], 1);
        let t = running(&s).tick(&s);
        assert_eq!(t.session.remaining_seconds, 4);
        assert!(t.events.is_empty());
    }

    #[test]
    fn boundary_fires_cue_and_advances() {
        let s = seq(&[2, 3], 1);
        let t = running(&s).advance_by(&s, 2);
        assert_eq!(t.session.current_interval_index, 1);
        assert_eq!(t.session.remaining_seconds, 3);
        assert_eq!(t.events[0].cue(), Some(SoundId::Beep));
        assert!(matches!(
            t.events[1],
            Event::IntervalStarted { segment_index: 1, .. }
        ));
    }

    #[test]
    fn last_segment_rolls_into_next_repeat() {
        let s = seq(&[1, 1], 2);
        let t = running(&s).advance_by(&s, 2);
        assert_eq!(t.session.current_repeat, 2);
        assert_eq!(t.session.current_interval_index, 0);
        assert_eq!(t.session.remaining_seconds, 1);
        assert!(t
            .events
            .iter()
            .any(|e| matches!(e, Event::RepeatStarted { repeat: 2, .. })));
    }

    #[test]
    fn final_boundary_completes() {
        let s = seq(&[1], 1);
        let t = running(&s).tick(&s);
        assert!(t.session.is_session_complete);
        assert!(!t.session.is_running);
        assert_eq!(t.session.remaining_seconds, 0);
        assert!(t.events.iter().any(Event::is_session_completed));

        let again = t.session.tick(&s);
        assert!(again.events.is_empty());
    }

    #[test]
    fn leading_zero_segment_costs_no_tick() {
        let s = seq(&[0, 4], 1);
        let t = running(&s).tick(&s);
        assert_eq!(t.session.current_interval_index, 1);
        assert_eq!(t.session.remaining_seconds, 3);
        assert!(t.events.iter().all(|e| e.cue().is_none()));
        assert!(matches!(
            t.events[0],
            Event::IntervalStarted { segment_index: 1, .. }
        ));
    }

    #[test]
    fn zero_segments_complete_after_total_duration() {
        let s = seq(&[0, 3], 2);
        let t = running(&s).advance_by(&s, 5);
        assert!(t.session.is_running);
        assert_eq!(
            (t.session.current_interval_index, t.session.current_repeat),
            (1, 2)
        );
        assert_eq!(t.session.remaining_seconds, 1);

        let t = t.session.tick(&s);
        assert!(t.session.is_session_complete);
        assert!(!t.session.is_running);
    }

    #[test]
    fn boundary_skips_zero_segments_and_rolls_repeat() {
        let s = seq(&[2, 0, 0], 2);
        let t = running(&s).advance_by(&s, 2);
        assert_eq!(t.session.current_interval_index, 0);
        assert_eq!(t.session.current_repeat, 2);
        assert_eq!(t.session.remaining_seconds, 2);
        let cues: Vec<_> = t.events.iter().filter_map(Event::cue).collect();
        assert_eq!(cues, vec![SoundId::Beep]);
    }

    #[test]
    fn trailing_zero_segments_complete_on_last_boundary() {
        let s = seq(&[2, 0], 1);
        let t = running(&s).advance_by(&s, 2);
        assert!(t.session.is_session_complete);
        assert_eq!(
            t.events.iter().filter(|e| e.is_session_completed()).count(),
            1
        );
    }

    #[test]
    fn stale_zero_countdown_advances_without_cue() {
        let s = seq(&[3, 4], 1);
        let stale = Session {
            remaining_seconds: 0,
            ..running(&s)
        };
        let t = stale.tick(&s);
        assert_eq!(t.session.current_interval_index, 1);
        assert_eq!(t.session.remaining_seconds, 4);
        assert!(t.events.iter().all(|e| e.cue().is_none()));
    }

    #[test]
    fn hold_segment_waits() {
        let def = TimerDefinition::new("reps", vec![Interval::new("Squats", 0).rep_based(12)], 1);
        let s = Sequence::from_definition(&def);
        let t = running(&s).advance_by(&s, 10);
        assert_eq!(t.session, running(&s));
    }

    #[test]
    fn silent_interval_emits_completion_without_cue() {
        let def = TimerDefinition::new(
            "quiet",
            vec![
                Interval::new("a", 1).with_sound(SoundId::None),
                Interval::new("b", 1),
            ],
            1,
        );
        let s = Sequence::from_definition(&def);
        let t = running(&s).tick(&s);
        assert!(matches!(
            t.events[0],
            Event::IntervalCompleted { sound: None, .. }
        ));
    }

    #[test]
    fn out_of_range_state_is_clamped() {
        let s = seq(&[3, 3], 1);
        let odd = Session {
            current_interval_index: 9,
            current_repeat: 7,
            remaining_seconds: 2,
            is_running: true,
            is_session_complete: false,
        };
        let t = odd.tick(&s);
        assert_eq!(t.session.current_interval_index, 1);
        assert_eq!(t.session.current_repeat, 1);
        assert_eq!(t.session.remaining_seconds, 1);
    }
}
