//! Completion alert: a bounded repeating sound after the session ends.
//!
//! The alert plays once immediately, then once per period until `max_plays`
//! is reached. It runs as its own task with a cancellation token; leaving
//! Complete (reset, new sequence) cancels it.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::audio::{SoundId, ToneScheduler};

pub const DEFAULT_MAX_PLAYS: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertPolicy {
    pub max_plays: u32,
    pub period: Duration,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self {
            max_plays: DEFAULT_MAX_PLAYS,
            period: Duration::from_secs(1),
        }
    }
}

#[derive(Debug)]
pub struct CompletionSequencer {
    policy: AlertPolicy,
    handle: Option<JoinHandle<u32>>,
    cancel_token: Option<CancellationToken>,
}

impl CompletionSequencer {
    pub fn new(policy: AlertPolicy) -> Self {
        Self {
            policy,
            handle: None,
            cancel_token: None,
        }
    }

    pub fn policy(&self) -> AlertPolicy {
        self.policy
    }

    /// Spawn the alert loop. Any alert already running is cancelled first.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, scheduler: ToneScheduler, sound: SoundId) {
        self.cancel();
        if self.policy.max_plays == 0 || sound.is_silent() {
            return;
        }
        info!(%sound, max_plays = self.policy.max_plays, "completion alert started");

        let token = CancellationToken::new();
        let handle = tokio::spawn(alert_loop(scheduler, sound, self.policy, token.clone()));
        self.cancel_token = Some(token);
        self.handle = Some(handle);
    }

    /// Stop the alert now. Safe to call when nothing is running.
    pub fn cancel(&mut self) {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
            debug!("completion alert cancelled");
        }
        self.handle = None;
    }

    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Wait for the current alert to run out or be cancelled.
    /// Returns how many times it played.
    pub async fn finished(&mut self) -> u32 {
        match self.handle.take() {
            Some(handle) => handle.await.unwrap_or(0),
            None => 0,
        }
    }
}

impl Drop for CompletionSequencer {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn alert_loop(
    scheduler: ToneScheduler,
    sound: SoundId,
    policy: AlertPolicy,
    cancel_token: CancellationToken,
) -> u32 {
    let mut ticker = time::interval(policy.period.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut plays = 0;
    while plays < policy.max_plays {
        // Cancellation wins over a tick that is already due.
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => break,
            _ = ticker.tick() => {
                scheduler.play_sound(sound);
                plays += 1;
            }
        }
    }
    debug!(plays, "completion alert finished");
    plays
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::RecordingOutput;
    use std::sync::Arc;

    fn recorder() -> (Arc<RecordingOutput>, ToneScheduler) {
        let out = Arc::new(RecordingOutput::new());
        let scheduler = ToneScheduler::new(out.clone());
        (out, scheduler)
    }

    #[tokio::test(start_paused = true)]
    async fn stops_after_max_plays() {
        let (out, scheduler) = recorder();
        let mut alert = CompletionSequencer::new(AlertPolicy::default());
        alert.start(scheduler, SoundId::Bell);
        time::sleep(Duration::from_secs(60)).await;
        assert_eq!(out.count(SoundId::Bell), 15);
        assert!(!alert.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn first_play_is_immediate() {
        let (out, scheduler) = recorder();
        let mut alert = CompletionSequencer::new(AlertPolicy::default());
        alert.start(scheduler, SoundId::Gong);
        time::sleep(Duration::from_millis(10)).await;
        assert_eq!(out.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_further_plays() {
        let (out, scheduler) = recorder();
        let mut alert = CompletionSequencer::new(AlertPolicy::default());
        alert.start(scheduler, SoundId::Chime);
        time::sleep(Duration::from_millis(3_500)).await;
        alert.cancel();
        time::sleep(Duration::from_secs(30)).await;
        assert_eq!(out.len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_wins_over_a_due_tick() {
        let (out, scheduler) = recorder();
        let token = CancellationToken::new();
        token.cancel();
        // The interval's first tick is ready immediately, like a tick that
        // came due while reset was cancelling.
        let plays = alert_loop(scheduler, SoundId::Bell, AlertPolicy::default(), token).await;
        assert_eq!(plays, 0);
        assert!(out.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn restart_replaces_running_alert() {
        let (out, scheduler) = recorder();
        let mut alert = CompletionSequencer::new(AlertPolicy {
            max_plays: 3,
            period: Duration::from_secs(1),
        });
        alert.start(scheduler.clone(), SoundId::Beep);
        time::sleep(Duration::from_millis(1_500)).await;
        alert.start(scheduler, SoundId::Bell);
        assert_eq!(alert.finished().await, 3);
        assert_eq!(out.count(SoundId::Beep), 2);
        assert_eq!(out.count(SoundId::Bell), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn silent_sound_spawns_nothing() {
        let (out, scheduler) = recorder();
        let mut alert = CompletionSequencer::new(AlertPolicy::default());
        alert.start(scheduler, SoundId::None);
        assert!(!alert.is_active());
        time::sleep(Duration::from_secs(5)).await;
        assert!(out.is_empty());
    }
}
