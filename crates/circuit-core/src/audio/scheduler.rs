//! Fire-and-forget tone scheduling.
//!
//! The playback engine never waits on audio. [`ToneScheduler::play_sound`]
//! captures one anchor, hands the score to the injected [`ToneOutput`] and
//! logs any failure instead of returning it.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use tracing::{debug, info, warn};

use super::sound::{SoundId, ToneNote};
use crate::error::AudioError;

/// One triggered sound, ready for an output to render.
#[derive(Debug, Clone)]
pub struct ScheduledScore {
    pub sound: SoundId,
    /// Shared time origin for every note offset.
    pub anchor: Instant,
    pub notes: &'static [ToneNote],
    pub volume: f32,
}

/// Something that can render scores. Implementations must not block.
pub trait ToneOutput: Send + Sync {
    fn render(&self, score: ScheduledScore) -> Result<(), AudioError>;
}

#[derive(Clone)]
pub struct ToneScheduler {
    output: Arc<dyn ToneOutput>,
    volume: f32,
    enabled: bool,
}

impl std::fmt::Debug for ToneScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToneScheduler")
            .field("volume", &self.volume)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

impl ToneScheduler {
    pub fn new(output: Arc<dyn ToneOutput>) -> Self {
        Self {
            output,
            volume: 0.8,
            enabled: true,
        }
    }

    /// A scheduler that drops every sound.
    pub fn silent() -> Self {
        Self::new(Arc::new(NullOutput))
    }

    /// Volume as a fraction (0.0 .. 1.0).
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume.clamp(0.0, 1.0);
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Trigger `sound`. Returns immediately; failures are logged.
    pub fn play_sound(&self, sound: SoundId) {
        if !self.enabled || sound.is_silent() {
            return;
        }
        let score = ScheduledScore {
            sound,
            anchor: Instant::now(),
            notes: sound.score(),
            volume: self.volume,
        };
        debug!(%sound, notes = score.notes.len(), "scheduling tone");
        if let Err(err) = self.output.render(score) {
            warn!(%sound, error = %err, "tone playback failed");
        }
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullOutput;

impl ToneOutput for NullOutput {
    fn render(&self, _score: ScheduledScore) -> Result<(), AudioError> {
        Ok(())
    }
}

/// Reports each sound through `tracing` instead of a speaker.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOutput;

impl ToneOutput for LogOutput {
    fn render(&self, score: ScheduledScore) -> Result<(), AudioError> {
        info!(sound = %score.sound, length_secs = score.sound.length_secs(), "sound");
        Ok(())
    }
}

/// Keeps every rendered score in memory.
#[derive(Debug, Default)]
pub struct RecordingOutput {
    plays: Mutex<Vec<ScheduledScore>>,
}

impl RecordingOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sounds(&self) -> Vec<SoundId> {
        self.plays
            .lock()
            .map(|plays| plays.iter().map(|p| p.sound).collect())
            .unwrap_or_default()
    }

    pub fn count(&self, sound: SoundId) -> usize {
        self.sounds().into_iter().filter(|s| *s == sound).count()
    }

    pub fn len(&self) -> usize {
        self.plays.lock().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut plays) = self.plays.lock() {
            plays.clear();
        }
    }
}

impl ToneOutput for RecordingOutput {
    fn render(&self, score: ScheduledScore) -> Result<(), AudioError> {
        self.plays
            .lock()
            .map_err(|e| AudioError::PlaybackFailed(e.to_string()))?
            .push(score);
        Ok(())
    }
}
