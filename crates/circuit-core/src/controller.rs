//! Async playback controller.
//!
//! Owns the [`PlaybackEngine`] behind a mutex (single writer), drives it at a
//! fixed cadence from one ticker task, plays cues through the
//! [`ToneScheduler`], runs the completion alert and broadcasts every
//! [`Event`] to subscribers.
//!
//! Lock order is engine, then ticker or alert. The ticker mutates the engine
//! and dispatches the resulting events while holding the engine lock, so a
//! pause or reset can never interleave with half a tick.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::audio::{SoundId, ToneScheduler};
use crate::events::Event;
use crate::storage::Config;
use crate::timer::{
    AlertPolicy, CompletionSequencer, PlaybackEngine, PlaybackSnapshot, Sequence,
};

const EVENT_CAPACITY: usize = 256;
const MIN_TICK: Duration = Duration::from_millis(1);
/// Keeps `Instant + period` from overflowing.
const MAX_TICK: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerOptions {
    /// Length of one logical second.
    pub tick_interval: Duration,
    /// Derive elapsed ticks from the monotonic clock after late wake-ups.
    pub catch_up: bool,
    pub alert: AlertPolicy,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            catch_up: true,
            alert: AlertPolicy::default(),
        }
    }
}

impl From<&Config> for ControllerOptions {
    fn from(config: &Config) -> Self {
        Self {
            tick_interval: Duration::from_millis(config.playback.tick_interval_ms),
            catch_up: config.playback.catch_up,
            alert: AlertPolicy {
                max_plays: config.alert.max_plays,
                period: Duration::from_millis(config.alert.interval_ms),
            },
        }
    }
}

/// Side effects of a transition: cues, alert, broadcast.
#[derive(Clone)]
struct Outputs {
    scheduler: ToneScheduler,
    alert: Arc<Mutex<CompletionSequencer>>,
    events: broadcast::Sender<Event>,
}

impl Outputs {
    async fn dispatch(&self, events: Vec<Event>) {
        let cues: Vec<SoundId> = events.iter().filter_map(Event::cue).collect();
        if let Some(&last) = cues.last() {
            if cues.len() > 1 {
                warn!(
                    coalesced = cues.len() - 1,
                    played = %last,
                    "several interval cues fell into one wake-up; playing the last"
                );
            }
            self.scheduler.play_sound(last);
        }

        for event in events {
            if let Event::SessionCompleted {
                alert_sound: Some(sound),
                ..
            } = &event
            {
                self.alert.lock().await.start(self.scheduler.clone(), *sound);
            }
            // No subscribers is fine.
            let _ = self.events.send(event);
        }
    }

    fn publish(&self, event: Event) {
        let _ = self.events.send(event);
    }
}

#[derive(Clone)]
pub struct PlaybackController {
    engine: Arc<Mutex<PlaybackEngine>>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    outputs: Outputs,
    options: ControllerOptions,
}

impl PlaybackController {
    pub fn new(sequence: Sequence, scheduler: ToneScheduler, options: ControllerOptions) -> Self {
        let options = ControllerOptions {
            tick_interval: options.tick_interval.clamp(MIN_TICK, MAX_TICK),
            alert: AlertPolicy {
                period: options.alert.period.clamp(MIN_TICK, MAX_TICK),
                ..options.alert
            },
            ..options
        };
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            engine: Arc::new(Mutex::new(PlaybackEngine::new(sequence))),
            ticker: Arc::new(Mutex::new(None)),
            outputs: Outputs {
                scheduler,
                alert: Arc::new(Mutex::new(CompletionSequencer::new(options.alert))),
                events,
            },
            options,
        }
    }

    pub fn options(&self) -> ControllerOptions {
        self.options
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.outputs.events.subscribe()
    }

    pub async fn snapshot(&self) -> PlaybackSnapshot {
        self.engine.lock().await.snapshot()
    }

    pub async fn alert_active(&self) -> bool {
        self.outputs.alert.lock().await.is_active()
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub async fn start(&self) -> Option<Event> {
        let mut engine = self.engine.lock().await;
        let event = engine.start()?;
        self.spawn_ticker().await;
        self.outputs.publish(event.clone());
        Some(event)
    }

    pub async fn resume(&self) -> Option<Event> {
        let mut engine = self.engine.lock().await;
        let event = engine.resume()?;
        self.spawn_ticker().await;
        self.outputs.publish(event.clone());
        Some(event)
    }

    pub async fn pause(&self) -> Option<Event> {
        let mut engine = self.engine.lock().await;
        let event = engine.pause()?;
        self.cancel_ticker().await;
        self.outputs.publish(event.clone());
        Some(event)
    }

    pub async fn reset(&self) -> Event {
        let mut engine = self.engine.lock().await;
        self.cancel_ticker().await;
        self.outputs.alert.lock().await.cancel();
        let event = engine.reset();
        self.outputs.publish(event.clone());
        event
    }

    pub async fn select_sequence(&self, sequence: Sequence) -> Event {
        let mut engine = self.engine.lock().await;
        self.cancel_ticker().await;
        self.outputs.alert.lock().await.cancel();
        let event = engine.select_sequence(sequence);
        self.outputs.publish(event.clone());
        event
    }

    pub async fn previous(&self) -> Vec<Event> {
        let mut engine = self.engine.lock().await;
        let events = engine.previous();
        self.after_navigation(&engine).await;
        self.outputs.dispatch(events.clone()).await;
        events
    }

    pub async fn next(&self) -> Vec<Event> {
        let mut engine = self.engine.lock().await;
        let events = engine.next();
        self.after_navigation(&engine).await;
        self.outputs.dispatch(events.clone()).await;
        events
    }

    /// Stop the ticker and any alert.
    pub async fn shutdown(&self) {
        let _engine = self.engine.lock().await;
        self.cancel_ticker().await;
        self.outputs.alert.lock().await.cancel();
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// A skipped-to segment gets a full first second.
    async fn after_navigation(&self, engine: &PlaybackEngine) {
        if engine.is_running() {
            self.spawn_ticker().await;
        } else {
            self.cancel_ticker().await;
        }
    }

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(handle) = ticker_guard.take() {
            handle.abort();
        }

        let engine = self.engine.clone();
        let outputs = self.outputs.clone();
        let period = self.options.tick_interval;
        let catch_up = self.options.catch_up;

        let handle = tokio::spawn(async move {
            let mut anchor = Instant::now();
            let mut interval = time::interval_at(anchor + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;

                let steps = if catch_up {
                    whole_periods(anchor.elapsed(), period)
                } else {
                    1
                };
                if steps == 0 {
                    continue;
                }
                anchor += period.saturating_mul(u32::try_from(steps).unwrap_or(u32::MAX));
                if steps > 1 {
                    debug!(steps, "catching up after late wake-up");
                }

                let mut guard = engine.lock().await;
                if !guard.is_running() {
                    break;
                }
                let events = guard.advance_by(steps);
                outputs.dispatch(events).await;
                if !guard.is_running() {
                    break;
                }
            }
        });

        *ticker_guard = Some(handle);
    }

    async fn cancel_ticker(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
    }
}

fn whole_periods(elapsed: Duration, period: Duration) -> u64 {
    (elapsed.as_nanos() / period.as_nanos().max(1)) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_periods_floors() {
        let second = Duration::from_secs(1);
        assert_eq!(whole_periods(Duration::from_millis(999), second), 0);
        assert_eq!(whole_periods(Duration::from_millis(1_000), second), 1);
        assert_eq!(whole_periods(Duration::from_millis(3_700), second), 3);
    }

    #[test]
    fn periods_are_clamped() {
        let options = ControllerOptions {
            tick_interval: Duration::MAX,
            catch_up: true,
            alert: AlertPolicy {
                max_plays: 3,
                period: Duration::ZERO,
            },
        };
        let sequence = Sequence::from_definition(&crate::timer::TimerDefinition::new(
            "clamp",
            vec![crate::timer::Interval::new("a", 5)],
            1,
        ));
        let controller = PlaybackController::new(sequence, ToneScheduler::silent(), options);
        assert_eq!(controller.options().tick_interval, MAX_TICK);
        assert_eq!(controller.options().alert.period, MIN_TICK);
    }

    #[test]
    fn options_from_config() {
        let mut config = Config::default();
        config.playback.tick_interval_ms = 250;
        config.alert.max_plays = 4;
        let options = ControllerOptions::from(&config);
        assert_eq!(options.tick_interval, Duration::from_millis(250));
        assert_eq!(options.alert.max_plays, 4);
        assert!(options.catch_up);
    }
}
