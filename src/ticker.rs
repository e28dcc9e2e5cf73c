//! Live-tracking ticker: while a session is active, an observer wants
//! elapsed time recomputed once per period, purely for display. The
//! ticker never writes anything, and once cancelled it never fires again.

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant};

pub struct Ticker {
    handle: JoinHandle<()>,
}

impl Ticker {
    /// Spawns a task that invokes `on_tick` once per `period` with the
    /// whole seconds elapsed since the spawn.
    pub fn spawn<F>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut(u64) + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let started = Instant::now();
            let mut ticks = interval(period);
            // The first interval tick completes immediately; skip it so the
            // callback only fires after a full period has passed.
            ticks.tick().await;
            loop {
                ticks.tick().await;
                on_tick(started.elapsed().as_secs());
            }
        });
        Self { handle }
    }

    /// Stops the ticker. Safe to call any number of times.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use tokio::time::sleep;

    #[tokio::test]
    async fn ticks_report_elapsed_time() {
        let count = Arc::new(AtomicU64::new(0));
        let seen = Arc::clone(&count);
        let ticker = Ticker::spawn(Duration::from_millis(20), move |_elapsed| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        sleep(Duration::from_millis(150)).await;
        assert!(count.load(Ordering::SeqCst) >= 2);
        ticker.cancel();
    }

    #[tokio::test]
    async fn cancel_stops_further_ticks() {
        let count = Arc::new(AtomicU64::new(0));
        let seen = Arc::clone(&count);
        let ticker = Ticker::spawn(Duration::from_millis(10), move |_elapsed| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        sleep(Duration::from_millis(60)).await;
        ticker.cancel();
        sleep(Duration::from_millis(30)).await;
        let after_cancel = count.load(Ordering::SeqCst);

        sleep(Duration::from_millis(60)).await;
        assert_eq!(count.load(Ordering::SeqCst), after_cancel);
        assert!(!ticker.is_running());
    }

    #[tokio::test]
    async fn cancel_is_idempotent() {
        let ticker = Ticker::spawn(Duration::from_millis(10), |_elapsed| {});
        ticker.cancel();
        ticker.cancel();
        sleep(Duration::from_millis(20)).await;
        assert!(!ticker.is_running());
    }

    #[tokio::test]
    async fn drop_cancels_before_first_tick() {
        let count = Arc::new(AtomicU64::new(0));
        let seen = Arc::clone(&count);
        let ticker = Ticker::spawn(Duration::from_millis(50), move |_elapsed| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        drop(ticker);

        sleep(Duration::from_millis(120)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
