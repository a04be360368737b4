//! Trailing debounce with generation fencing.
//!
//! Each [`Debouncer::trigger`] bumps a generation counter and restarts a
//! timer. When the quiet period passes with no newer trigger, the timer calls
//! back with its generation. Callers check [`Debouncer::is_current`] both when
//! the timer fires and when any response started from that firing arrives, so
//! neither a superseded timer nor a late response can take effect.

use std::time::Duration;

use tokio::task::JoinHandle;

/// Quiet period used for completion requests unless configured otherwise.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(1500);

#[derive(Debug)]
pub struct Debouncer {
    quiet: Duration,
    generation: u64,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self { quiet, generation: 0, pending: None }
    }

    /// Starts a new quiet period, discarding any pending one.
    ///
    /// `on_fire` runs on a spawned task once the period elapses, receiving the
    /// generation returned here. Must be called inside a tokio runtime.
    pub fn trigger<F>(&mut self, on_fire: F) -> u64
    where
        F: FnOnce(u64) + Send + 'static,
    {
        self.generation += 1;
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
        let generation = self.generation;
        let quiet = self.quiet;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            on_fire(generation);
        }));
        generation
    }

    /// Drops the pending timer and invalidates every outstanding generation.
    pub fn cancel(&mut self) {
        self.generation += 1;
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }

    /// `true` when no trigger or cancel has happened since `generation` was issued.
    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn burst_fires_once_with_last_generation() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = Debouncer::new(Duration::from_millis(1500));

        let mut last = 0;
        for _ in 0..5 {
            let tx = tx.clone();
            last = debouncer.trigger(move |generation| {
                let _ = tx.send(generation);
            });
            tokio::time::advance(Duration::from_millis(400)).await;
        }

        let fired = rx.recv().await.unwrap();
        assert_eq!(fired, last);
        assert!(debouncer.is_current(fired));

        tokio::time::advance(Duration::from_secs(10)).await;
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err(), "superseded timers must not fire");
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_suppresses_pending_fire() {
        let (tx, mut rx) = mpsc::unbounded_channel::<u64>();
        let mut debouncer = Debouncer::new(Duration::from_millis(100));
        let generation = debouncer.trigger(move |g| {
            let _ = tx.send(g);
        });
        debouncer.cancel();
        assert!(!debouncer.is_current(generation));
        // The only sender lived in the aborted task, so the channel closes.
        assert_eq!(rx.recv().await, None);
    }
}
