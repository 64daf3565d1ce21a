use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tokio::time::{self, MissedTickBehavior};
use tracing::{info, warn};

use circuit_core::audio::{LogOutput, NullOutput};
use circuit_core::timer::format_clock;
use circuit_core::{
    Config, ControllerOptions, Event, PlaybackController, PlaybackSnapshot, Sequence, ToneOutput,
};

use super::{describe, load_timer};

#[derive(Args)]
pub struct RunArgs {
    /// Timer file path or stored timer name
    pub timer: String,
    /// Play faster than real time (2 = twice as fast)
    #[arg(long, default_value_t = 1.0)]
    pub speed: f64,
    /// No sound output
    #[arg(long)]
    pub silent: bool,
}

const HELP: &str = "commands: p pause, r resume, n next, b previous, x reset, q quit";

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    if !(args.speed.is_finite() && args.speed > 0.0) {
        return Err(format!("invalid speed: {}", args.speed).into());
    }
    let config = Config::load()?;
    let def = load_timer(&config, &args.timer)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(play(config, Sequence::from(&def), args))
}

async fn play(
    config: Config,
    sequence: Sequence,
    args: RunArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut options = ControllerOptions::from(&config);
    options.tick_interval = scaled(options.tick_interval, args.speed);
    options.alert.period = scaled(options.alert.period, args.speed);

    let output = if args.silent {
        Arc::new(NullOutput) as Arc<dyn ToneOutput>
    } else {
        device_output()
    };
    let name = sequence.name.clone();
    let controller = PlaybackController::new(sequence, config.tone_scheduler(output), options);
    let mut events = controller.subscribe();

    if controller.start().await.is_none() {
        return Err(format!("timer '{name}' has nothing to play").into());
    }
    info!(timer = %name, speed = args.speed, "playback started");
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut status = time::interval(controller.options().tick_interval);
    status.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut completed = false;

    loop {
        tokio::select! {
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => {
                    if !handle_command(&controller, line.trim(), &mut completed).await {
                        break;
                    }
                }
                Ok(None) => stdin_open = false,
                Err(e) => {
                    warn!(error = %e, "stdin read failed");
                    stdin_open = false;
                }
            },
            event = events.recv() => match event {
                Ok(event) => {
                    if let Some(line) = describe(&event) {
                        println!("{line}");
                    }
                    match event {
                        Event::SessionCompleted { .. } => completed = true,
                        Event::StoppedAtEnd { .. } => break,
                        _ => {}
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "event stream lagged"),
                Err(RecvError::Closed) => break,
            },
            _ = status.tick() => {
                let snapshot = controller.snapshot().await;
                if snapshot.is_running {
                    println!("{}", status_line(&snapshot));
                }
                if completed && !controller.alert_active().await {
                    break;
                }
            }
        }
    }

    controller.shutdown().await;
    Ok(())
}

/// Returns false when the user asked to quit.
async fn handle_command(
    controller: &PlaybackController,
    command: &str,
    completed: &mut bool,
) -> bool {
    match command {
        "p" => {
            controller.pause().await;
        }
        "r" => {
            controller.resume().await;
        }
        "n" => {
            controller.next().await;
        }
        "b" => {
            controller.previous().await;
        }
        "x" => {
            controller.reset().await;
            *completed = false;
        }
        "q" => return false,
        "" => {}
        _ => println!("{HELP}"),
    }
    true
}

fn status_line(s: &PlaybackSnapshot) -> String {
    format!(
        "{}. {} {}  repeat {}/{}  total {}",
        s.current_interval_index + 1,
        s.segment_name,
        format_clock(s.remaining_seconds),
        s.current_repeat,
        s.repeat_count,
        s.total_remaining
    )
}

fn scaled(duration: Duration, speed: f64) -> Duration {
    Duration::try_from_secs_f64(duration.as_secs_f64() / speed).unwrap_or(Duration::MAX)
}

#[cfg(feature = "audio")]
fn device_output() -> Arc<dyn ToneOutput> {
    match circuit_core::audio::AudioEngine::open() {
        Ok(engine) => Arc::new(engine),
        Err(e) => {
            warn!(error = %e, "audio device unavailable, logging cues instead");
            Arc::new(LogOutput)
        }
    }
}

#[cfg(not(feature = "audio"))]
fn device_output() -> Arc<dyn ToneOutput> {
    Arc::new(LogOutput)
}
