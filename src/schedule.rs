//! Recurring runs.
//!
//! The cron job itself does no scraping. It only drops a tick into a
//! one-slot channel; [`run_scheduled`] receives ticks and runs the pipeline
//! on the caller's task. Runs never overlap: the channel holds at most one
//! pending tick, and whatever is pending when a run finishes is discarded
//! before waiting again, so a long run is never followed by a catch-up run.
//!
//! Cron expressions have six fields (seconds first) and are evaluated in UTC:
//!
//! ```text
//! 0 0 8 * * *     every day at 08:00:00 UTC
//! ```

use std::error::Error;
use std::future::Future;
use tokio::signal;
use tokio::sync::mpsc::{
    self,
    error::{TryRecvError, TrySendError},
};
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use tracing::{debug, error, info, instrument, warn};

/// A running cron schedule that yields ticks.
pub struct Ticker {
    scheduler: JobScheduler,
    ticks: mpsc::Receiver<()>,
}

impl Ticker {
    /// Validate `cron`, register it and start the scheduler.
    pub async fn start(cron: &str) -> Result<Self, JobSchedulerError> {
        let (tx, ticks) = mpsc::channel(1);
        let job = Job::new_async(cron, move |_id, _scheduler| {
            let tx = tx.clone();
            Box::pin(async move {
                match tx.try_send(()) {
                    Ok(()) => debug!("Schedule tick"),
                    Err(TrySendError::Full(())) => {
                        warn!("Previous run still in progress; skipping this tick")
                    }
                    Err(TrySendError::Closed(())) => debug!("Tick receiver closed"),
                }
            })
        })?;

        let scheduler = JobScheduler::new().await?;
        scheduler.add(job).await?;
        scheduler.start().await?;
        Ok(Self { scheduler, ticks })
    }

    /// Wait for the next tick. `None` once the scheduler has gone away.
    pub async fn tick(&mut self) -> Option<()> {
        self.ticks.recv().await
    }

    /// Throw away ticks that fired while a run was in progress.
    pub fn discard_missed(&mut self) -> usize {
        drain(&mut self.ticks)
    }

    pub async fn stop(mut self) -> Result<(), JobSchedulerError> {
        self.scheduler.shutdown().await
    }
}

fn drain(ticks: &mut mpsc::Receiver<()>) -> usize {
    let mut missed = 0;
    loop {
        match ticks.try_recv() {
            Ok(()) => missed += 1,
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => return missed,
        }
    }
}

/// Run `job` now, then again on every tick of `cron`, until Ctrl-C.
///
/// An interrupt during a run abandons that run.
#[instrument(level = "info", skip(job))]
pub async fn run_scheduled<F, Fut>(cron: &str, mut job: F) -> Result<(), Box<dyn Error>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut ticker = Ticker::start(cron).await?;
    info!("Scheduler started; running once now");

    let runs = async {
        job().await;
        loop {
            let missed = ticker.discard_missed();
            if missed > 0 {
                warn!(missed, "Skipped ticks that fired during the last run");
            }
            if ticker.tick().await.is_none() {
                break;
            }
            info!("Scheduled run starting");
            job().await;
        }
    };

    tokio::select! {
        _ = runs => warn!("Scheduler stopped producing ticks"),
        res = signal::ctrl_c() => match res {
            Ok(()) => info!("Interrupt received; stopping scheduler"),
            Err(e) => error!(error = %e, "Could not listen for Ctrl-C; stopping scheduler"),
        },
    }

    ticker.stop().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_rejects_bad_cron_expression() {
        assert!(Ticker::start("every morning please").await.is_err());
    }

    #[tokio::test]
    async fn test_drain_discards_pending_tick() {
        let (tx, mut rx) = mpsc::channel(1);
        tx.try_send(()).unwrap();
        assert!(matches!(tx.try_send(()), Err(TrySendError::Full(()))));
        assert_eq!(drain(&mut rx), 1);
        assert_eq!(drain(&mut rx), 0);

        drop(tx);
        assert_eq!(drain(&mut rx), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_tick_during_run_does_not_trigger_catch_up_run() {
        let mut ticker = Ticker::start("* * * * * *").await.unwrap();
        // Stand in for a run that outlasts a tick.
        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(ticker.discard_missed(), 1);
        ticker.stop().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_every_second_schedule_ticks() {
        let mut ticker = Ticker::start("* * * * * *").await.unwrap();
        let tick = timeout(Duration::from_secs(5), ticker.tick()).await;
        assert!(matches!(tick, Ok(Some(()))));
        ticker.stop().await.unwrap();
    }
}
