//! Speaker output through rodio.
//!
//! rodio's `OutputStream` is not `Send`, so a dedicated thread owns it and
//! receives scores over a channel. Create one [`AudioEngine`] at startup and
//! share it with the [`ToneScheduler`](super::ToneScheduler).

use std::sync::mpsc::{self, Sender};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use rodio::OutputStream;
use tracing::{debug, info, warn};

use super::render::ScoreSource;
use super::scheduler::{ScheduledScore, ToneOutput};
use crate::error::AudioError;

const LATE_WARN_AFTER: Duration = Duration::from_millis(150);

enum AudioCommand {
    Play(ScheduledScore),
    Shutdown,
}

pub struct AudioEngine {
    tx: Mutex<Sender<AudioCommand>>,
}

impl AudioEngine {
    /// Open the default output device on a new audio thread.
    pub fn open() -> Result<Self, AudioError> {
        let (tx, rx) = mpsc::channel::<AudioCommand>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), AudioError>>();

        thread::Builder::new()
            .name("audio-engine".to_string())
            .spawn(move || {
                let (_stream, handle) = match OutputStream::try_default() {
                    Ok(pair) => {
                        let _ = ready_tx.send(Ok(()));
                        pair
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(AudioError::DeviceUnavailable(e.to_string())));
                        return;
                    }
                };

                while let Ok(cmd) = rx.recv() {
                    match cmd {
                        AudioCommand::Play(score) => {
                            let late = score.anchor.elapsed();
                            if late > LATE_WARN_AFTER {
                                warn!(sound = %score.sound, late_ms = late.as_millis() as u64, "tone started late");
                            }
                            let source = ScoreSource::new(score.notes, score.volume);
                            // play_raw mixes, so overlapping sounds don't queue behind each other.
                            if let Err(e) = handle.play_raw(source) {
                                warn!(sound = %score.sound, error = %e, "tone playback failed");
                            }
                        }
                        AudioCommand::Shutdown => break,
                    }
                }
                debug!("audio thread exiting");
            })
            .map_err(|e| AudioError::DeviceUnavailable(e.to_string()))?;

        ready_rx
            .recv()
            .map_err(|_| AudioError::Disconnected)??;
        info!("audio output opened");

        Ok(Self { tx: Mutex::new(tx) })
    }
}

impl ToneOutput for AudioEngine {
    fn render(&self, score: ScheduledScore) -> Result<(), AudioError> {
        self.tx
            .lock()
            .map_err(|e| AudioError::PlaybackFailed(e.to_string()))?
            .send(AudioCommand::Play(score))
            .map_err(|_| AudioError::Disconnected)
    }
}

impl Drop for AudioEngine {
    fn drop(&mut self) {
        if let Ok(tx) = self.tx.lock() {
            let _ = tx.send(AudioCommand::Shutdown);
        }
    }
}
