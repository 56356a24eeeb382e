//! Ready-gated periodic task.
//!
//! The [`ScheduledTask`] runs one recurring action: it waits for the
//! readiness gate once, then executes the action every interval until the
//! cancellation token fires. Each invocation is bounded by a timeout; an
//! invocation that overruns is abandoned for that cycle and the cycle is
//! skipped rather than queued, so slow actions never compound into a
//! backlog.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::framework::readiness::ReadyGate;

/// A single recurring background task.
#[derive(Debug, Clone, Copy)]
pub struct ScheduledTask {
    interval: Duration,
    timeout: Duration,
}

impl ScheduledTask {
    /// Creates a task firing every `interval`, with the invocation bound
    /// defaulting to the interval itself.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            timeout: interval,
        }
    }

    /// Bounds each invocation to `timeout`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Spawns the task loop.
    ///
    /// The loop:
    /// 1. Waits on `gate` once (resolving immediately when readiness already
    ///    fired); exits if readiness can never be reached
    /// 2. Runs `action` immediately, then once per interval
    /// 3. Exits promptly when `cancel` fires, leaving no orphaned timer
    ///
    /// The returned handle resolves when the loop has fully stopped.
    pub fn spawn<F, Fut>(
        self,
        mut gate: ReadyGate,
        cancel: CancellationToken,
        mut action: F,
    ) -> JoinHandle<()>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        tokio::spawn(async move {
            tokio::select! {
                ready = gate.wait() => {
                    if !ready {
                        debug!("Readiness signal dropped before firing, periodic task never starts");
                        return;
                    }
                }
                _ = cancel.cancelled() => return,
            }

            debug!(interval = ?self.interval, "Periodic task gate open, entering loop");

            let mut tick = tokio::time::interval(self.interval);
            tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!("Periodic task stopped");
                        break;
                    }
                    _ = tick.tick() => {
                        if tokio::time::timeout(self.timeout, action()).await.is_err() {
                            warn!(
                                timeout = ?self.timeout,
                                "Periodic task overran its bound, skipping this cycle"
                            );
                        }
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::readiness::ReadySignal;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_action(counter: &Arc<AtomicUsize>) -> impl FnMut() -> futures::future::Ready<()> + use<> {
        let counter = Arc::clone(counter);
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            futures::future::ready(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_action_never_fires_before_ready() {
        let signal = ReadySignal::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();

        let handle = ScheduledTask::new(Duration::from_secs(60)).spawn(
            signal.gate(),
            cancel.clone(),
            counting_action(&counter),
        );

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_immediately_then_every_interval_after_ready() {
        let signal = ReadySignal::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();

        let handle = ScheduledTask::new(Duration::from_secs(60)).spawn(
            signal.gate(),
            cancel.clone(),
            counting_action(&counter),
        );

        signal.notify();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(181)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 4);

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_gate_fired_before_spawn_starts_the_loop() {
        let signal = ReadySignal::new();
        signal.notify();

        let counter = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();
        let handle = ScheduledTask::new(Duration::from_secs(60)).spawn(
            signal.gate(),
            cancel.clone(),
            counting_action(&counter),
        );

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(counter.load(Ordering::SeqCst) >= 1);

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_overrun_is_skipped_without_backlog() {
        let signal = ReadySignal::new();
        signal.notify();

        let started = Arc::new(AtomicUsize::new(0));
        let started_clone = Arc::clone(&started);
        let cancel = CancellationToken::new();

        // Every invocation overruns its 10s bound by a wide margin.
        let handle = ScheduledTask::new(Duration::from_secs(60))
            .timeout(Duration::from_secs(10))
            .spawn(signal.gate(), cancel.clone(), move || {
                started_clone.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_secs(600))
            });

        tokio::time::sleep(Duration::from_secs(181)).await;

        // One start per elapsed interval plus the immediate first tick: the
        // loop resumed after each overrun instead of piling up invocations.
        assert_eq!(started.load(Ordering::SeqCst), 4);

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_stops_the_loop() {
        let signal = ReadySignal::new();
        signal.notify();

        let counter = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();
        let handle = ScheduledTask::new(Duration::from_secs(60)).spawn(
            signal.gate(),
            cancel.clone(),
            counting_action(&counter),
        );

        tokio::time::sleep(Duration::from_secs(61)).await;
        cancel.cancel();
        handle.await.unwrap();

        let after_stop = counter.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(counter.load(Ordering::SeqCst), after_stop);
    }
}
