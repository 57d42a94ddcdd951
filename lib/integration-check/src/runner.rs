use std::{sync::Arc, time::Duration};

use tokio::{
    select,
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace};

use super::check::Check;

/// Runs a check on a fixed interval until cancelled.
///
/// A failed run is logged and the check is tried again on the next interval. Runs never overlap: if a run takes
/// longer than the interval, the next one starts as soon as it completes.
pub struct CheckRunner<C> {
    check_id: String,
    check: Arc<C>,
    interval: Duration,
}

impl<C> CheckRunner<C>
where
    C: Check + 'static,
{
    pub fn new(check_id: impl Into<String>, check: C, interval: Duration) -> Self {
        Self {
            check_id: check_id.into(),
            check: Arc::new(check),
            interval,
        }
    }

    pub fn check(&self) -> &Arc<C> {
        &self.check
    }

    pub fn check_id(&self) -> &str {
        &self.check_id
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs the check until `cancel` fires, returning how many runs were attempted.
    pub async fn run(self, cancel: CancellationToken) -> u64 {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut runs = 0;

        debug!(check.id = %self.check_id, interval_secs = self.interval.as_secs(), "Starting check runner.");

        loop {
            select! {
                biased;

                _ = cancel.cancelled() => {
                    debug!(check.id = %self.check_id, runs, "Check runner cancelled.");
                    break;
                }

                _ = ticker.tick() => {
                    trace!(check.id = %self.check_id, "Running check.");
                    runs += 1;
                    if let Err(e) = self.check.run().await {
                        error!(check.id = %self.check_id, error = %e, "Check run failed.");
                    }
                }
            }
        }

        runs
    }

    /// Spawns the runner on the current runtime.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<u64> {
        tokio::spawn(self.run(cancel))
    }
}
