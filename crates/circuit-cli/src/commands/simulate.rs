use clap::Args;

use circuit_core::timer::format_clock;
use circuit_core::{Config, Event, PlaybackEngine, Sequence};

use super::{describe, load_timer};

#[derive(Args)]
pub struct SimulateArgs {
    /// Timer file path or stored timer name
    pub timer: String,
    /// Print events as JSON lines
    #[arg(long)]
    pub json: bool,
}

/// Drive the engine to the end without waiting. Hold segments are skipped
/// as if the user pressed next.
pub fn run(args: SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let def = load_timer(&config, &args.timer)?;
    let mut engine = PlaybackEngine::new(Sequence::from(&def));

    let started = engine
        .start()
        .ok_or_else(|| format!("timer '{}' has nothing to play", def.name))?;
    emit(&started, 0, args.json)?;

    let mut elapsed = 0u64;
    while engine.is_running() {
        let index = engine.session().current_interval_index;
        let holding = engine
            .sequence()
            .segment(index)
            .is_some_and(|s| s.is_hold());
        let events = if holding {
            engine.next()
        } else {
            elapsed += 1;
            engine.tick()
        };
        for event in &events {
            emit(event, elapsed, args.json)?;
        }
    }
    Ok(())
}

fn emit(event: &Event, elapsed: u64, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string(event)?);
    } else if let Some(line) = describe(event) {
        println!("[{}] {line}", format_clock(elapsed));
    }
    Ok(())
}
