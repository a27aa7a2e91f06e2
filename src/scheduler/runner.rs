use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, error, info};

use super::{FixedTimestep, FrameHandler};
use crate::config::SimConfig;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("failed to spawn loop thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("loop thread panicked")]
    Panicked,
    #[error("loop already stopped")]
    Stopped,
}

/// A `FixedTimestep` driven by wall-clock frame arrivals on its own thread.
/// The handler is moved onto the thread and handed back when the loop ends.
pub struct GameLoop<H: FrameHandler + Send + 'static> {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<H>>,
}

impl<H: FrameHandler + Send + 'static> GameLoop<H> {
    pub fn spawn(handler: H, config: &SimConfig) -> Result<Self, SchedulerError> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let interval = config.frame_interval();
        let mut step = FixedTimestep::from_config(config);

        let handle = thread::Builder::new()
            .name("runner-sim-loop".to_string())
            .spawn(move || {
                let mut handler = handler;
                step.start(Instant::now());
                info!(tick = ?step.tick_duration(), interval = ?interval, "loop started");
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                        Err(RecvTimeoutError::Timeout) => {}
                    }
                    step.frame(Instant::now(), &mut handler);
                    if handler.is_finished() {
                        debug!("handler finished, leaving loop");
                        break;
                    }
                }
                step.stop();
                info!(ticks = step.total_ticks(), "loop stopped");
                handler
            })?;

        Ok(Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Ask the loop to stop and wait for it. Returns the handler the first
    /// time; later calls are no-ops returning `None`.
    pub fn stop(&mut self) -> Option<H> {
        if let Some(tx) = self.stop_tx.take() {
            // the thread may already have exited on its own
            let _ = tx.send(());
        }
        let handle = self.handle.take()?;
        match handle.join() {
            Ok(handler) => Some(handler),
            Err(_) => {
                error!("loop thread panicked");
                None
            }
        }
    }

    /// Wait for the handler to report itself finished, without asking the
    /// loop to stop.
    pub fn join(mut self) -> Result<H, SchedulerError> {
        let handle = self.handle.take().ok_or(SchedulerError::Stopped)?;
        let result = handle.join().map_err(|_| SchedulerError::Panicked);
        self.stop_tx.take();
        result
    }
}

impl<H: FrameHandler + Send + 'static> Drop for GameLoop<H> {
    fn drop(&mut self) {
        self.stop();
    }
}
