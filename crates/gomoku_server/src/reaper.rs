//! Background eviction of idle sessions.

use crate::registry::SessionRegistry;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

/// Periodically evicts sessions idle past the registry's timeout.
///
/// The registry lock is taken only for each scan, never across the wait.
#[derive(Debug)]
pub struct Reaper;

impl Reaper {
    /// Starts the reaper on the current tokio runtime.
    #[instrument(skip(registry))]
    pub fn spawn(registry: SessionRegistry, interval: Duration) -> ReaperHandle {
        let token = CancellationToken::new();
        let idle_timeout = registry.idle_timeout();
        info!(?idle_timeout, "Starting session reaper");

        let task = tokio::spawn({
            let token = token.clone();
            async move {
                let mut ticker = tokio::time::interval(interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    tokio::select! {
                        _ = token.cancelled() => break,
                        _ = ticker.tick() => {
                            let removed = registry.evict_expired(Instant::now(), idle_timeout);
                            debug!(removed, active = registry.len(), "Reaper pass");
                        }
                    }
                }
                info!("Session reaper stopped");
            }
        });

        ReaperHandle {
            token,
            task: Some(task),
        }
    }
}

/// Owns a running reaper. Dropping the handle stops the task.
#[derive(Debug)]
pub struct ReaperHandle {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl ReaperHandle {
    /// Whether the reaper task is still running.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stops the reaper and waits for it to exit.
    #[instrument(skip(self))]
    pub async fn shutdown(mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            tracing::warn!(error = %e, "Reaper task ended abnormally");
        }
    }
}

impl Drop for ReaperHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
