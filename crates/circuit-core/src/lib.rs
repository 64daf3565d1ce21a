//! # Circuit Core Library
//!
//! This library provides the playback core of the Circuit interval timer.
//! A timer is a named list of intervals run through one or more repeats;
//! the core counts it down, cues sounds at interval boundaries, supports
//! manual skipping in both directions and raises a bounded alert when the
//! last repeat ends.
//!
//! ## Architecture
//!
//! - **Playback Engine**: A synchronous state machine that requires the
//!   caller to invoke `tick()` once per logical second. Transitions are pure
//!   functions on [`Session`].
//! - **Controller**: A tokio-driven wrapper that owns the engine, ticks it
//!   at a steady cadence and dispatches cues and events.
//! - **Audio**: Symbolic sounds rendered as micro-scores through an injected
//!   [`ToneOutput`]; rodio output behind the `audio` feature.
//! - **Storage**: TOML configuration and read-only timer definition files.
//!
//! ## Key Components
//!
//! - [`PlaybackEngine`]: Core playback state machine
//! - [`PlaybackController`]: 1 Hz driver with completion alert
//! - [`ToneScheduler`]: Fire-and-forget sound triggering
//! - [`Config`]: Application configuration management

pub mod audio;
pub mod controller;
pub mod error;
pub mod events;
pub mod storage;
pub mod timer;

pub use audio::{SoundId, ToneOutput, ToneScheduler};
pub use controller::{ControllerOptions, PlaybackController};
pub use error::{AudioError, ConfigError, CoreError, Result, ValidationError};
pub use events::Event;
pub use storage::{Config, DefinitionStore, DirectoryStore};
pub use timer::{
    Interval, PlaybackEngine, PlaybackSnapshot, PlaybackState, Sequence, Session, Settings,
    TimerDefinition,
};
