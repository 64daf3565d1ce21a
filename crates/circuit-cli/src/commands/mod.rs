pub mod config;
pub mod run;
pub mod simulate;
pub mod sounds;
pub mod summary;
pub mod timers;

use std::path::Path;

use circuit_core::storage::definitions::load_file;
use circuit_core::timer::format_clock;
use circuit_core::{Config, DefinitionStore, DirectoryStore, Event, TimerDefinition};

/// `timer` is either a definition file or a name in the timers directory.
pub fn load_timer(
    config: &Config,
    timer: &str,
) -> Result<TimerDefinition, Box<dyn std::error::Error>> {
    let path = Path::new(timer);
    if path.is_file() {
        return Ok(load_file(path)?);
    }
    let store = DirectoryStore::new(config.timers_dir()?);
    Ok(store.load(timer)?)
}

/// One human-readable line per event, `None` for events not worth printing.
pub fn describe(event: &Event) -> Option<String> {
    let line = match event {
        Event::TimerStarted {
            segment_index,
            repeat,
            remaining_secs,
            ..
        } => format!(
            "started at segment {} (repeat {repeat}, {})",
            segment_index + 1,
            format_clock(*remaining_secs)
        ),
        Event::TimerPaused { remaining_secs, .. } => {
            format!("paused with {} left", format_clock(*remaining_secs))
        }
        Event::TimerResumed { remaining_secs, .. } => {
            format!("resumed with {} left", format_clock(*remaining_secs))
        }
        Event::TimerReset { .. } => "reset".to_string(),
        Event::IntervalCompleted {
            segment_index,
            sound,
            ..
        } => match sound {
            Some(sound) => format!("segment {} done ({sound})", segment_index + 1),
            None => format!("segment {} done", segment_index + 1),
        },
        Event::IntervalStarted {
            segment_index,
            name,
            duration_secs,
            ..
        } => format!(
            "-> {} {name} {}",
            segment_index + 1,
            format_clock(*duration_secs)
        ),
        Event::RepeatStarted {
            repeat,
            repeat_count,
            ..
        } => format!("repeat {repeat}/{repeat_count}"),
        Event::SessionCompleted { alert_sound, .. } => match alert_sound {
            Some(sound) => format!("complete ({sound})"),
            None => "complete".to_string(),
        },
        Event::Navigated {
            from_index,
            to_index,
            repeat,
            ..
        } => format!(
            "skipped {} -> {} (repeat {repeat})",
            from_index + 1,
            to_index + 1
        ),
        Event::StoppedAtEnd { .. } => "stopped at end".to_string(),
        Event::SequenceSelected { .. } => return None,
    };
    Some(line)
}
