//! Reconciliation timer abstraction.
//!
//! `WorkflowRepository` never talks to a timer directly: the poll loop
//! is driven through `Scheduler::on_tick`, so a deployment with a
//! server-push transport can replace the interval with a stream-driven
//! implementation without touching repository logic.

use std::time::Duration;

use futures::future::BoxFuture;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub type TickFn = Box<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

pub trait Scheduler: Send + Sync {
    /// Invoke `tick` repeatedly at `interval` until the returned handle
    /// is stopped or dropped. A tick is awaited before the next fires.
    fn on_tick(&self, interval: Duration, tick: TickFn) -> PollHandle;
}

/// Aborts the underlying task when stopped or dropped.
pub struct PollHandle {
    handle: JoinHandle<()>,
}

impl PollHandle {
    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Interval-based scheduler on the tokio runtime. Missed ticks are
/// skipped, never queued, so a slow cycle cannot cause a burst.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn on_tick(&self, interval: Duration, tick: TickFn) -> PollHandle {
        let handle = tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                timer.tick().await;
                tick().await;
            }
        });
        PollHandle { handle }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_ticks_repeat_at_interval() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let _handle = TokioScheduler.on_tick(
            Duration::from_secs(10),
            Box::new(move || {
                let c = c.clone();
                Box::pin(async move {
                    c.fetch_add(1, Ordering::SeqCst);
                })
            }),
        );

        tokio::time::sleep(Duration::from_secs(35)).await;
        assert!(count.load(Ordering::SeqCst) >= 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_stops_the_loop() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let handle = TokioScheduler.on_tick(
            Duration::from_secs(10),
            Box::new(move || {
                let c = c.clone();
                Box::pin(async move {
                    c.fetch_add(1, Ordering::SeqCst);
                })
            }),
        );

        tokio::time::sleep(Duration::from_secs(15)).await;
        drop(handle);
        let frozen = count.load(Ordering::SeqCst);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(count.load(Ordering::SeqCst), frozen);
    }
}
