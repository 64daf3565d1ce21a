//! Symbolic sound identifiers and their micro-scores.
//!
//! Every sound is a fixed list of tones. Offsets are measured from a single
//! anchor taken when the sound is triggered, so multi-tone patterns keep their
//! spacing however late the trigger runs.

use serde::{Deserialize, Serialize};

/// One tone inside a micro-score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ToneNote {
    pub frequency_hz: f32,
    /// Start, relative to the shared anchor.
    pub offset_secs: f32,
    pub duration_secs: f32,
    /// Peak amplitude before the decay envelope (0.0 .. 1.0).
    pub gain: f32,
}

impl ToneNote {
    const fn new(frequency_hz: f32, offset_secs: f32, duration_secs: f32, gain: f32) -> Self {
        Self {
            frequency_hz,
            offset_secs,
            duration_secs,
            gain,
        }
    }

    pub fn end_secs(&self) -> f32 {
        self.offset_secs + self.duration_secs
    }
}

/// Closed set of sounds a timer can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundId {
    /// Silence. Explicitly chosen, so no fallback applies.
    None,
    Beep,
    DoubleBeep,
    Triplet,
    Chime,
    Gong,
    Bell,
    SingingBowl,
    Whistle,
    Buzzer,
    Click,
}

const BEEP: &[ToneNote] = &[ToneNote::new(880.0, 0.0, 0.25, 0.5)];

const DOUBLE_BEEP: &[ToneNote] = &[
    ToneNote::new(880.0, 0.0, 0.15, 0.5),
    ToneNote::new(880.0, 0.25, 0.15, 0.5),
];

const TRIPLET: &[ToneNote] = &[
    ToneNote::new(659.25, 0.0, 0.12, 0.45),
    ToneNote::new(659.25, 0.18, 0.12, 0.45),
    ToneNote::new(987.77, 0.36, 0.3, 0.5),
];

const CHIME: &[ToneNote] = &[
    ToneNote::new(1046.5, 0.0, 0.9, 0.35),
    ToneNote::new(1318.51, 0.15, 0.9, 0.3),
    ToneNote::new(1567.98, 0.3, 1.2, 0.3),
];

const GONG: &[ToneNote] = &[
    ToneNote::new(98.0, 0.0, 3.0, 0.6),
    ToneNote::new(196.5, 0.0, 2.4, 0.35),
    ToneNote::new(293.0, 0.02, 1.8, 0.2),
    ToneNote::new(415.3, 0.04, 1.2, 0.1),
];

const BELL: &[ToneNote] = &[
    ToneNote::new(783.99, 0.0, 1.5, 0.45),
    ToneNote::new(1567.98, 0.0, 1.0, 0.2),
    ToneNote::new(2351.97, 0.0, 0.6, 0.1),
];

const SINGING_BOWL: &[ToneNote] = &[
    ToneNote::new(220.0, 0.0, 4.0, 0.45),
    ToneNote::new(440.8, 0.0, 3.5, 0.25),
    ToneNote::new(661.5, 0.05, 3.0, 0.15),
    ToneNote::new(882.4, 0.1, 2.5, 0.08),
];

const WHISTLE: &[ToneNote] = &[
    ToneNote::new(2093.0, 0.0, 0.18, 0.3),
    ToneNote::new(2637.02, 0.22, 0.35, 0.3),
];

const BUZZER: &[ToneNote] = &[
    ToneNote::new(150.0, 0.0, 0.7, 0.5),
    ToneNote::new(155.0, 0.0, 0.7, 0.5),
    ToneNote::new(300.0, 0.0, 0.7, 0.2),
];

const CLICK: &[ToneNote] = &[ToneNote::new(1500.0, 0.0, 0.04, 0.4)];

impl SoundId {
    pub const ALL: [SoundId; 11] = [
        SoundId::None,
        SoundId::Beep,
        SoundId::DoubleBeep,
        SoundId::Triplet,
        SoundId::Chime,
        SoundId::Gong,
        SoundId::Bell,
        SoundId::SingingBowl,
        SoundId::Whistle,
        SoundId::Buzzer,
        SoundId::Click,
    ];

    /// The micro-score rendered for this sound.
    pub fn score(self) -> &'static [ToneNote] {
        match self {
            SoundId::None => &[],
            SoundId::Beep => BEEP,
            SoundId::DoubleBeep => DOUBLE_BEEP,
            SoundId::Triplet => TRIPLET,
            SoundId::Chime => CHIME,
            SoundId::Gong => GONG,
            SoundId::Bell => BELL,
            SoundId::SingingBowl => SINGING_BOWL,
            SoundId::Whistle => WHISTLE,
            SoundId::Buzzer => BUZZER,
            SoundId::Click => CLICK,
        }
    }

    pub fn is_silent(self) -> bool {
        self == SoundId::None
    }

    /// Seconds from the anchor until the last tone has decayed.
    pub fn length_secs(self) -> f32 {
        self.score()
            .iter()
            .map(ToneNote::end_secs)
            .fold(0.0, f32::max)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SoundId::None => "none",
            SoundId::Beep => "beep",
            SoundId::DoubleBeep => "doublebeep",
            SoundId::Triplet => "triplet",
            SoundId::Chime => "chime",
            SoundId::Gong => "gong",
            SoundId::Bell => "bell",
            SoundId::SingingBowl => "singingbowl",
            SoundId::Whistle => "whistle",
            SoundId::Buzzer => "buzzer",
            SoundId::Click => "click",
        }
    }
}

impl std::fmt::Display for SoundId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SoundId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SoundId::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown sound: {s}"))
    }
}
