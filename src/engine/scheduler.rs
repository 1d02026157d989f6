//! Fixed-interval driver for the poll engine.

use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use super::PollEngine;
use crate::types::{CycleReport, TrackerError};

/// Fires one poll cycle per interval.
///
/// Cycles run inline, so they never overlap. If a cycle outlasts the
/// interval, the ticks it missed are dropped rather than replayed.
#[derive(Debug, Clone)]
pub struct Scheduler {
    interval: Duration,
}

impl Scheduler {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn from_secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs.max(1)))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Poll until `shutdown` resolves or a cycle fails.
    ///
    /// The first cycle runs immediately. Returns the number of completed
    /// cycles on shutdown, or the first cycle error.
    pub async fn run<F>(&self, engine: &mut PollEngine, shutdown: F) -> Result<u64, TrackerError>
    where
        F: Future<Output = ()>,
    {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        info!(
            stream_id = engine.stream_id(),
            interval_secs = self.interval.as_secs_f64(),
            "Tracker started"
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    // A stalled fetch must not block shutdown.
                    let outcome = tokio::select! {
                        result = engine.run_cycle() => Some(result),
                        _ = &mut shutdown => None,
                    };
                    match outcome {
                        Some(Ok(report)) => log_cycle_report(&report),
                        Some(Err(e)) => {
                            error!(error = %e, kind = ?e.kind(), "Cycle failed, stopping tracker");
                            return Err(e);
                        }
                        None => {
                            info!("Shutdown signal received mid-cycle.");
                            return Ok(engine.cycle_count());
                        }
                    }
                }
                _ = &mut shutdown => {
                    info!("Shutdown signal received.");
                    return Ok(engine.cycle_count());
                }
            }
        }
    }
}

fn log_cycle_report(report: &CycleReport) {
    info!(
        cycle = report.cycle_number,
        total = %report.total_raised,
        donations = report.donations_seen,
        latest = %report.latest.name,
        latest_amount = %report.latest.amount,
        top = %report.top.name,
        top_amount = %report.top.amount,
        "Cycle complete"
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
