mod render;
mod scheduler;
mod sound;

#[cfg(feature = "audio")]
mod device;

#[cfg(feature = "audio")]
pub use device::AudioEngine;
pub use render::{envelope, ScoreSource, SAMPLE_RATE};
pub use scheduler::{
    LogOutput, NullOutput, RecordingOutput, ScheduledScore, ToneOutput, ToneScheduler,
};
pub use sound::{SoundId, ToneNote};
