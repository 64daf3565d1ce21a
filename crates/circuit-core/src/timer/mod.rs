mod completion;
mod engine;
mod navigation;
mod remaining;
mod sequence;
mod session;

pub use completion::{AlertPolicy, CompletionSequencer, DEFAULT_MAX_PLAYS};
pub use engine::{PlaybackEngine, PlaybackSnapshot, PlaybackState};
pub use remaining::{format_clock, total_duration, total_remaining, TimeSummary};
pub use sequence::{Interval, Segment, SegmentKind, Sequence, Settings, TimerDefinition};
pub use session::{Session, Transition};
