//! Fixed-interval poll scheduler.
//!
//! Emits one message per period into the session queue. The first message
//! comes one full period after spawning, since the session performs its own
//! initial load.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::{CancellationToken, DropGuard};

/// Running scheduler. Dropping it cancels the timer; [`PollScheduler::stop`]
/// also waits for the task to finish.
pub struct PollScheduler {
    guard: DropGuard,
    handle: JoinHandle<()>,
    period: Duration,
}

impl PollScheduler {
    pub fn spawn<M, F>(period: Duration, tx: mpsc::Sender<M>, make_tick: F) -> Self
    where
        M: Send + 'static,
        F: Fn() -> M + Send + 'static,
    {
        let period = period.max(Duration::from_millis(1));
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let first = Instant::now() + period;

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(first, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    _ = interval.tick() => {
                        if tx.send(make_tick()).await.is_err() {
                            tracing::debug!("Tick receiver dropped");
                            break;
                        }
                    }
                }
            }
            tracing::debug!("Poll scheduler stopped");
        });

        tracing::info!("Polling every {} ms", period.as_millis());
        Self {
            guard: token.drop_guard(),
            handle,
            period,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Cancel the timer and wait for the task to exit.
    pub async fn stop(self) {
        let Self { guard, handle, .. } = self;
        drop(guard);
        if let Err(e) = handle.await {
            tracing::warn!("Poll scheduler task failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERIOD: Duration = Duration::from_millis(4_000);

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_after_one_period() {
        let (tx, mut rx) = mpsc::channel(4);
        let scheduler = PollScheduler::spawn(PERIOD, tx, || ());

        let early = tokio::time::timeout(PERIOD - Duration::from_millis(1), rx.recv()).await;
        assert!(early.is_err());
        assert_eq!(rx.recv().await, Some(()));

        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_follow_period() {
        let (tx, mut rx) = mpsc::channel(4);
        let scheduler = PollScheduler::spawn(PERIOD, tx, Instant::now);

        let start = Instant::now();
        let mut stamps = Vec::new();
        for _ in 0..3 {
            stamps.push(rx.recv().await.unwrap());
        }
        assert_eq!(stamps[0] - start, PERIOD);
        assert_eq!(stamps[1] - stamps[0], PERIOD);
        assert_eq!(stamps[2] - stamps[1], PERIOD);

        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_consumer_skips_missed_ticks() {
        let (tx, mut rx) = mpsc::channel(1);
        let scheduler = PollScheduler::spawn(PERIOD, tx, Instant::now);

        let start = Instant::now();
        // The second tick blocks on the full channel past the third deadline.
        tokio::time::sleep(PERIOD * 3 + PERIOD / 2).await;
        let mut stamps = Vec::new();
        for _ in 0..4 {
            stamps.push(rx.recv().await.unwrap());
        }
        assert_eq!(stamps[0] - start, PERIOD);
        assert_eq!(stamps[1] - start, PERIOD * 2);
        // the late tick fires once, then the cadence realigns to the grid
        assert_eq!(stamps[2] - start, PERIOD * 3 + PERIOD / 2);
        assert_eq!(stamps[3] - start, PERIOD * 4);

        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_releases_sender() {
        let (tx, mut rx) = mpsc::channel::<u8>(4);
        let scheduler = PollScheduler::spawn(PERIOD, tx, || 1);
        assert!(scheduler.is_running());
        assert_eq!(scheduler.period(), PERIOD);

        scheduler.stop().await;
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let (tx, mut rx) = mpsc::channel::<u8>(4);
        drop(PollScheduler::spawn(PERIOD, tx, || 1));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exits_when_receiver_dropped() {
        let (tx, rx) = mpsc::channel::<u8>(4);
        let scheduler = PollScheduler::spawn(PERIOD, tx, || 1);
        drop(rx);
        tokio::time::sleep(PERIOD * 2).await;
        assert!(!scheduler.is_running());
    }
}
