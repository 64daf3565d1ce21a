//! Timer definitions and the playable sequence derived from them.
//!
//! A [`TimerDefinition`] is what the external store hands us. It is expanded
//! once into a [`Sequence`] of [`Segment`]s (interim rests inserted, values
//! sanitized) that stays immutable for the lifetime of a session.

use serde::{Deserialize, Deserializer, Serialize};

use crate::audio::SoundId;

/// One named, timed block of a timer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    #[serde(default = "new_id")]
    pub id: String,
    pub name: String,
    /// Whole seconds. Negative, fractional and NaN inputs are clamped on load.
    #[serde(default, deserialize_with = "lenient_seconds")]
    pub duration_seconds: u64,
    #[serde(default)]
    pub color_tag: String,
    /// Sound played when this interval finishes. Absent means "use the
    /// timer's interval-complete sound"; `none` means silence.
    #[serde(default)]
    pub sound: Option<SoundId>,
    #[serde(default)]
    pub rep_based: bool,
    #[serde(default = "default_reps", deserialize_with = "lenient_count")]
    pub reps: u32,
}

impl Interval {
    pub fn new(name: impl Into<String>, duration_seconds: u64) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            duration_seconds,
            color_tag: String::new(),
            sound: None,
            rep_based: false,
            reps: 1,
        }
    }

    pub fn with_sound(mut self, sound: SoundId) -> Self {
        self.sound = Some(sound);
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color_tag = color.into();
        self
    }

    /// A rep-counted interval; with zero duration it waits for a manual skip.
    pub fn rep_based(mut self, reps: u32) -> Self {
        self.rep_based = true;
        self.reps = reps.max(1);
        self
    }
}

/// Per-timer playback settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_interval_sound")]
    pub interval_complete_sound: SoundId,
    #[serde(default = "default_timer_sound")]
    pub timer_complete_sound: SoundId,
    #[serde(default)]
    pub use_interim_interval: bool,
    #[serde(default, deserialize_with = "lenient_seconds")]
    pub interim_interval_seconds: u64,
    #[serde(default = "default_interval_sound")]
    pub interim_sound: SoundId,
    #[serde(default)]
    pub interim_color: String,
    #[serde(default)]
    pub is_rep_based: bool,
    /// Skip the interim after the last interval of each repeat.
    #[serde(default)]
    pub end_with_interval: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            interval_complete_sound: default_interval_sound(),
            timer_complete_sound: default_timer_sound(),
            use_interim_interval: false,
            interim_interval_seconds: 0,
            interim_sound: default_interval_sound(),
            interim_color: String::new(),
            is_rep_based: false,
            end_with_interval: false,
        }
    }
}

/// The record consumed from the timer-definition store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerDefinition {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_reps", deserialize_with = "lenient_count")]
    pub repeat_count: u32,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub intervals: Vec<Interval>,
}

impl TimerDefinition {
    pub fn new(name: impl Into<String>, intervals: Vec<Interval>, repeat_count: u32) -> Self {
        Self {
            name: name.into(),
            repeat_count: repeat_count.max(1),
            settings: Settings::default(),
            intervals,
        }
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn from_toml_str(s: &str) -> crate::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_json_str(s: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Interval,
    Interim,
}

/// One playable step of a [`Sequence`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub kind: SegmentKind,
    pub name: String,
    pub duration_secs: u64,
    pub color: String,
    pub sound: Option<SoundId>,
    pub rep_based: bool,
    pub reps: u32,
}

impl Segment {
    /// Rep-based with no time limit: ticking leaves it alone.
    pub fn is_hold(&self) -> bool {
        self.rep_based && self.duration_secs == 0
    }
}

/// Immutable playback material: segments, repeat count and settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sequence {
    pub name: String,
    pub segments: Vec<Segment>,
    pub repeat_count: u32,
    pub settings: Settings,
}

impl Sequence {
    /// Expand a definition, inserting interim segments when configured.
    pub fn from_definition(def: &TimerDefinition) -> Self {
        let settings = def.settings.clone();
        let with_interim = settings.use_interim_interval && settings.interim_interval_seconds > 0;
        let mut segments = Vec::with_capacity(def.intervals.len() * 2);

        for (i, interval) in def.intervals.iter().enumerate() {
            segments.push(Segment {
                kind: SegmentKind::Interval,
                name: interval.name.clone(),
                duration_secs: interval.duration_seconds,
                color: interval.color_tag.clone(),
                sound: interval.sound,
                rep_based: interval.rep_based,
                reps: interval.reps.max(1),
            });

            let is_last = i + 1 == def.intervals.len();
            if with_interim && !(is_last && settings.end_with_interval) {
                segments.push(Segment {
                    kind: SegmentKind::Interim,
                    name: "Interim".into(),
                    duration_secs: settings.interim_interval_seconds,
                    color: settings.interim_color.clone(),
                    sound: Some(settings.interim_sound),
                    rep_based: false,
                    reps: 1,
                });
            }
        }

        Self {
            name: def.name.clone(),
            segments,
            repeat_count: def.repeat_count.max(1),
            settings,
        }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segment(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    /// Duration of segment `index`, 0 when out of range.
    pub fn duration_of(&self, index: usize) -> u64 {
        self.segments.get(index).map(|s| s.duration_secs).unwrap_or(0)
    }

    /// Sum of all segment durations for one repeat.
    pub fn pass_secs(&self) -> u64 {
        self.segments
            .iter()
            .fold(0u64, |acc, s| acc.saturating_add(s.duration_secs))
    }

    /// Whether `start()` may leave Idle.
    pub fn is_playable(&self) -> bool {
        !self.is_empty() && (self.pass_secs() > 0 || self.settings.is_rep_based)
    }

    /// The cue for a finished segment, `None` when it should be silent.
    pub fn completion_sound(&self, index: usize) -> Option<SoundId> {
        let sound = self
            .segments
            .get(index)
            .and_then(|s| s.sound)
            .unwrap_or(self.settings.interval_complete_sound);
        (!sound.is_silent()).then_some(sound)
    }

    /// The timer-complete alert sound, `None` when silent.
    pub fn alert_sound(&self) -> Option<SoundId> {
        let sound = self.settings.timer_complete_sound;
        (!sound.is_silent()).then_some(sound)
    }
}

impl From<&TimerDefinition> for Sequence {
    fn from(def: &TimerDefinition) -> Self {
        Sequence::from_definition(def)
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn default_reps() -> u32 {
    1
}

fn default_interval_sound() -> SoundId {
    SoundId::Beep
}

fn default_timer_sound() -> SoundId {
    SoundId::Bell
}

/// Accepts any number and clamps it into whole non-negative seconds.
fn lenient_seconds<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    Ok(clamp_seconds(raw))
}

fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    Ok((clamp_seconds(raw).min(u32::MAX as u64) as u32).max(1))
}

pub(crate) fn clamp_seconds(raw: f64) -> u64 {
    if !raw.is_finite() || raw <= 0.0 {
        0
    } else {
        raw.floor().min(u64::MAX as f64) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn work_rest() -> TimerDefinition {
        TimerDefinition::new(
            "Work/Rest",
            vec![Interval::new("Work", 30), Interval::new("Rest", 15)],
            2,
        )
    }

    #[test]
    fn plain_definition_maps_one_to_one() {
        let seq = Sequence::from_definition(&work_rest());
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.pass_secs(), 45);
        assert_eq!(seq.repeat_count, 2);
        assert!(seq.segments.iter().all(|s| s.kind == SegmentKind::Interval));
    }

    #[test]
    fn interim_follows_every_interval() {
        let mut def = work_rest();
        def.settings.use_interim_interval = true;
        def.settings.interim_interval_seconds = 5;
        let seq = Sequence::from_definition(&def);
        let kinds: Vec<_> = seq.segments.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SegmentKind::Interval,
                SegmentKind::Interim,
                SegmentKind::Interval,
                SegmentKind::Interim
            ]
        );
        assert_eq!(seq.pass_secs(), 55);
    }

    #[test]
    fn end_with_interval_drops_trailing_interim() {
        let mut def = work_rest();
        def.settings.use_interim_interval = true;
        def.settings.interim_interval_seconds = 5;
        def.settings.end_with_interval = true;
        let seq = Sequence::from_definition(&def);
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.segments[2].name, "Rest");
    }

    #[test]
    fn zero_second_interim_is_ignored() {
        let mut def = work_rest();
        def.settings.use_interim_interval = true;
        let seq = Sequence::from_definition(&def);
        assert_eq!(seq.len(), 2);
    }

    #[test]
    fn sound_fallback_and_explicit_silence() {
        let mut def = work_rest();
        def.intervals[0].sound = Some(SoundId::Gong);
        def.intervals[1].sound = Some(SoundId::None);
        def.intervals.push(Interval::new("Cooldown", 10));
        let seq = Sequence::from_definition(&def);
        assert_eq!(seq.completion_sound(0), Some(SoundId::Gong));
        assert_eq!(seq.completion_sound(1), None);
        assert_eq!(seq.completion_sound(2), Some(SoundId::Beep));
    }

    #[test]
    fn playability() {
        let empty = Sequence::from_definition(&TimerDefinition::new("e", vec![], 1));
        assert!(!empty.is_playable());

        let zero = TimerDefinition::new("z", vec![Interval::new("Push-ups", 0)], 1);
        assert!(!Sequence::from_definition(&zero).is_playable());

        let mut reps = zero.clone();
        reps.settings.is_rep_based = true;
        assert!(Sequence::from_definition(&reps).is_playable());
    }

    #[test]
    fn lenient_toml_values_are_clamped() {
        let def = TimerDefinition::from_toml_str(
            r#"
            name = "messy"
            repeat_count = 0

            [[intervals]]
            name = "neg"
            duration_seconds = -12

            [[intervals]]
            name = "frac"
            duration_seconds = 7.9
            reps = -3

            [[intervals]]
            name = "nan"
            duration_seconds = nan
            "#,
        )
        .unwrap();
        assert_eq!(def.repeat_count, 1);
        assert_eq!(def.intervals[0].duration_seconds, 0);
        assert_eq!(def.intervals[1].duration_seconds, 7);
        assert_eq!(def.intervals[1].reps, 1);
        assert_eq!(def.intervals[2].duration_seconds, 0);
        assert!(!def.intervals[0].id.is_empty());
    }

    #[test]
    fn json_definition_with_settings() {
        let def = TimerDefinition::from_json_str(
            r#"{
                "name": "Tabata",
                "repeat_count": 8,
                "settings": { "timer_complete_sound": "gong", "interval_complete_sound": "doublebeep" },
                "intervals": [
                    { "name": "Go", "duration_seconds": 20, "sound": "whistle" },
                    { "name": "Rest", "duration_seconds": 10 }
                ]
            }"#,
        )
        .unwrap();
        let seq = Sequence::from(&def);
        assert_eq!(seq.alert_sound(), Some(SoundId::Gong));
        assert_eq!(seq.completion_sound(0), Some(SoundId::Whistle));
        assert_eq!(seq.completion_sound(1), Some(SoundId::DoubleBeep));
    }

    #[test]
    fn clamp_seconds_edges() {
        assert_eq!(clamp_seconds(f64::NAN), 0);
        assert_eq!(clamp_seconds(f64::INFINITY), 0);
        assert_eq!(clamp_seconds(-0.5), 0);
        assert_eq!(clamp_seconds(59.99), 59);
    }
}
