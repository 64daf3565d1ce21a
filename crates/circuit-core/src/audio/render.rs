//! Sample renderer for micro-scores.
//!
//! All tones of one score are summed into a single mono stream whose first
//! sample is the anchor, so relative spacing is sample-exact.

use std::f32::consts::PI;
use std::time::Duration;

use super::sound::ToneNote;

pub const SAMPLE_RATE: u32 = 44_100;

/// Level the envelope decays to by the end of each tone.
const FLOOR_GAIN: f32 = 0.001;
/// Short linear fade-in so tones don't start with a click.
const ATTACK_SECS: f32 = 0.005;

/// Amplitude multiplier at `t` seconds into a tone lasting `duration` seconds.
///
/// Exponential decay from 1.0 to [`FLOOR_GAIN`], zero outside the tone.
pub fn envelope(t: f32, duration: f32) -> f32 {
    if t < 0.0 || t >= duration || duration <= 0.0 {
        return 0.0;
    }
    let decay = FLOOR_GAIN.powf(t / duration);
    let attack = (t / ATTACK_SECS.min(duration)).min(1.0);
    decay * attack
}

/// Mono stream rendering one score.
#[derive(Debug, Clone)]
pub struct ScoreSource {
    notes: Vec<ToneNote>,
    volume: f32,
    sample_rate: u32,
    position: u64,
    total_samples: u64,
}

impl ScoreSource {
    pub fn new(notes: &[ToneNote], volume: f32) -> Self {
        Self::with_sample_rate(notes, volume, SAMPLE_RATE)
    }

    pub fn with_sample_rate(notes: &[ToneNote], volume: f32, sample_rate: u32) -> Self {
        let end = notes.iter().map(ToneNote::end_secs).fold(0.0, f32::max);
        Self {
            notes: notes.to_vec(),
            volume: volume.clamp(0.0, 1.0),
            sample_rate,
            position: 0,
            total_samples: (end * sample_rate as f32).ceil() as u64,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.total_samples as f64 / self.sample_rate as f64)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn sample_at(&self, t: f32) -> f32 {
        let mut sum = 0.0;
        for note in &self.notes {
            let local = t - note.offset_secs;
            let env = envelope(local, note.duration_secs);
            if env > 0.0 {
                sum += note.gain * env * (2.0 * PI * note.frequency_hz * local).sin();
            }
        }
        (sum * self.volume).clamp(-1.0, 1.0)
    }
}

impl Iterator for ScoreSource {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.total_samples {
            return None;
        }
        let t = self.position as f32 / self.sample_rate as f32;
        self.position += 1;
        Some(self.sample_at(t))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.total_samples - self.position) as usize;
        (left, Some(left))
    }
}

#[cfg(feature = "audio")]
impl rodio::Source for ScoreSource {
    fn current_frame_len(&self) -> Option<usize> {
        Some((self.total_samples - self.position) as usize)
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(self.duration())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SoundId;

    #[test]
    fn envelope_decays_to_near_silence() {
        assert_eq!(envelope(-0.1, 1.0), 0.0);
        assert!(envelope(0.01, 1.0) > 0.9);
        assert!(envelope(0.999, 1.0) < 0.01);
        assert_eq!(envelope(1.0, 1.0), 0.0);
    }

    #[test]
    fn source_length_covers_last_tone() {
        let src = ScoreSource::with_sample_rate(SoundId::DoubleBeep.score(), 1.0, 1000);
        // Second beep ends at 0.40s.
        let n = src.count() as i64;
        assert!((n - 400).abs() <= 1, "got {n} samples");
    }

    #[test]
    fn silent_score_renders_nothing() {
        let src = ScoreSource::new(SoundId::None.score(), 1.0);
        assert_eq!(src.count(), 0);
    }

    #[test]
    fn gap_between_beeps_is_silent() {
        let rate = 8000;
        let samples: Vec<f32> =
            ScoreSource::with_sample_rate(SoundId::DoubleBeep.score(), 1.0, rate).collect();
        // 0.15s .. 0.25s lies between the two tones.
        let gap = &samples[(0.16 * rate as f32) as usize..(0.24 * rate as f32) as usize];
        assert!(gap.iter().all(|s| *s == 0.0));
        assert!(samples[..(0.1 * rate as f32) as usize].iter().any(|s| s.abs() > 0.1));
    }

    #[test]
    fn tail_is_quiet() {
        let samples: Vec<f32> = ScoreSource::new(SoundId::Beep.score(), 1.0).collect();
        let tail = &samples[samples.len() - 20..];
        assert!(tail.iter().all(|s| s.abs() < 0.01));
    }

    #[test]
    fn volume_scales_output() {
        let loud: f32 = ScoreSource::new(SoundId::Beep.score(), 1.0)
            .map(f32::abs)
            .fold(0.0, f32::max);
        let quiet: f32 = ScoreSource::new(SoundId::Beep.score(), 0.25)
            .map(f32::abs)
            .fold(0.0, f32::max);
        assert!((quiet - loud * 0.25).abs() < 1e-3);
    }
}
