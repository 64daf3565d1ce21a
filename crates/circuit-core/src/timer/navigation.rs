//! Manual previous/next across segment and repeat boundaries.

use chrono::Utc;

use super::sequence::Sequence;
use super::session::{Session, Transition};
use crate::events::Event;

impl Session {
    /// Step back one segment. From the first segment, wrap to the last one
    /// and drop a repeat (never below 1).
    ///
    /// A completed session is left alone; only reset leaves Complete.
    pub fn previous(&self, seq: &Sequence) -> Transition {
        if self.is_session_complete || seq.is_empty() {
            return Transition {
                session: self.clone(),
                events: Vec::new(),
            };
        }
        let from = self.clamped_index(seq);
        let mut next = self.clone();
        next.current_repeat = self.clamped_repeat(seq);

        if from > 0 {
            next.current_interval_index = from - 1;
        } else {
            next.current_interval_index = seq.len() - 1;
            if next.current_repeat > 1 {
                next.current_repeat -= 1;
            }
        }
        next.remaining_seconds = seq.duration_of(next.current_interval_index);

        let events = vec![Event::Navigated {
            from_index: from,
            to_index: next.current_interval_index,
            repeat: next.current_repeat,
            at: Utc::now(),
        }];
        Transition {
            session: next,
            events,
        }
    }

    /// Skip forward one segment. Past the last segment of the last repeat
    /// playback stops without marking the session complete, so no
    /// completion alert is raised.
    pub fn next(&self, seq: &Sequence) -> Transition {
        if self.is_session_complete || seq.is_empty() {
            return Transition {
                session: self.clone(),
                events: Vec::new(),
            };
        }
        let from = self.clamped_index(seq);
        let mut next = self.clone();
        next.current_repeat = self.clamped_repeat(seq);
        next.current_interval_index = from;

        let event = if from < seq.len() - 1 {
            next.current_interval_index = from + 1;
            next.remaining_seconds = seq.duration_of(from + 1);
            navigated(from, &next)
        } else if next.current_repeat < seq.repeat_count {
            next.current_repeat += 1;
            next.current_interval_index = 0;
            next.remaining_seconds = seq.duration_of(0);
            navigated(from, &next)
        } else {
            next.is_running = false;
            Event::StoppedAtEnd { at: Utc::now() }
        };

        Transition {
            session: next,
            events: vec![event],
        }
    }
}

fn navigated(from: usize, to: &Session) -> Event {
    Event::Navigated {
        from_index: from,
        to_index: to.current_interval_index,
        repeat: to.current_repeat,
        at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::sequence::{Interval, TimerDefinition};

    fn seq3x2() -> Sequence {
        Sequence::from_definition(&TimerDefinition::new(
            "nav",
            vec![
                Interval::new("a", 10),
                Interval::new("b", 20),
                Interval::new("c", 30),
            ],
            2,
        ))
    }

    fn at(index: usize, repeat: u32, running: bool) -> Session {
        Session {
            current_interval_index: index,
            current_repeat: repeat,
            remaining_seconds: 1,
            is_running: running,
            is_session_complete: false,
        }
    }

    #[test]
    fn previous_within_repeat() {
        let s = seq3x2();
        let t = at(2, 1, true).previous(&s);
        assert_eq!(t.session.current_interval_index, 1);
        assert_eq!(t.session.remaining_seconds, 20);
        assert!(t.session.is_running);
    }

    #[test]
    fn previous_at_start_wraps_but_keeps_first_repeat() {
        let s = seq3x2();
        let t = at(0, 1, false).previous(&s);
        assert_eq!(t.session.current_interval_index, 2);
        assert_eq!(t.session.current_repeat, 1);
        assert_eq!(t.session.remaining_seconds, 30);
    }

    #[test]
    fn previous_at_start_of_second_repeat_drops_repeat() {
        let s = seq3x2();
        let t = at(0, 2, true).previous(&s);
        assert_eq!(t.session.current_interval_index, 2);
        assert_eq!(t.session.current_repeat, 1);
    }

    #[test]
    fn next_within_repeat_and_across_repeat() {
        let s = seq3x2();
        let t = at(0, 1, true).next(&s);
        assert_eq!(t.session.current_interval_index, 1);
        assert_eq!(t.session.remaining_seconds, 20);

        let t = at(2, 1, true).next(&s);
        assert_eq!(t.session.current_interval_index, 0);
        assert_eq!(t.session.current_repeat, 2);
        assert_eq!(t.session.remaining_seconds, 10);
    }

    #[test]
    fn next_at_very_end_stops_without_completing() {
        let s = seq3x2();
        let t = at(2, 2, true).next(&s);
        assert!(!t.session.is_running);
        assert!(!t.session.is_session_complete);
        assert_eq!(t.session.current_interval_index, 2);
        assert!(matches!(t.events[0], Event::StoppedAtEnd { .. }));
    }

    #[test]
    fn completed_session_ignores_navigation() {
        let s = seq3x2();
        let done = Session {
            is_session_complete: true,
            remaining_seconds: 0,
            ..at(2, 2, false)
        };
        assert_eq!(done.previous(&s).session, done);
        assert_eq!(done.next(&s).session, done);
    }

    #[test]
    fn single_segment_previous_wraps_to_itself() {
        let s = Sequence::from_definition(&TimerDefinition::new(
            "one",
            vec![Interval::new("only", 8)],
            3,
        ));
        let t = at(0, 3, true).previous(&s);
        assert_eq!(t.session.current_interval_index, 0);
        assert_eq!(t.session.current_repeat, 2);
        assert_eq!(t.session.remaining_seconds, 8);
    }
}
