use std::pin::Pin;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Sleep;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Collapses bursts of values into a single trailing-edge invocation.
///
/// Every [`Debouncer::push`] restarts the timer and replaces the pending value. Only when `delay`
/// elapses without a newer value does the callback run, with the most recent value. Superseded
/// values are dropped, never queued.
///
/// Must be created from within a tokio runtime.
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<T>,
    shutdown: CancellationToken,
}

impl<T> Debouncer<T>
where
    T: Send + 'static,
{
    pub fn spawn<F>(delay: Duration, mut on_fire: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<T>();
        let shutdown = CancellationToken::new();
        let task_shutdown = shutdown.clone();
        tokio::spawn(async move {
            let mut pending: Option<T> = None;
            let mut timer: Option<Pin<Box<Sleep>>> = None;
            loop {
                tokio::select! {
                    _ = task_shutdown.cancelled() => break,
                    maybe = rx.recv() => {
                        let Some(value) = maybe else { break; };
                        if pending.replace(value).is_some() {
                            trace!("debouncer discarded a superseded value");
                        }
                        timer = Some(Box::pin(sleep(delay)));
                    }
                    _ = async {
                        if let Some(timer) = &mut timer {
                            timer.await;
                        }
                    }, if timer.is_some() => {
                        timer = None;
                        if let Some(value) = pending.take() {
                            on_fire(value);
                        }
                    }
                }
            }
        });
        Self { tx, shutdown }
    }

    /// Schedules `value`, replacing anything still pending. Returns `false` once the debouncer
    /// has shut down.
    pub fn push(&self, value: T) -> bool {
        !self.shutdown.is_cancelled() && self.tx.send(value).is_ok()
    }

    /// Stops the background task; a pending value is discarded.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled() || self.tx.is_closed()
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DELAY: Duration = Duration::from_millis(500);

    fn collecting() -> (Debouncer<&'static str>, mpsc::UnboundedReceiver<&'static str>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let debouncer = Debouncer::spawn(DELAY, move |value| {
            let _ = tx.send(value);
        });
        (debouncer, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn burst_collapses_to_latest_value() {
        let (debouncer, mut rx) = collecting();
        assert!(debouncer.push("is"));
        sleep(Duration::from_millis(100)).await;
        assert!(debouncer.push("is:op"));
        sleep(Duration::from_millis(100)).await;
        assert!(debouncer.push("is:open"));

        assert_eq!(rx.recv().await, Some("is:open"));
        sleep(Duration::from_secs(2)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn each_push_restarts_the_timer() {
        let (debouncer, mut rx) = collecting();
        debouncer.push("first");
        sleep(Duration::from_millis(400)).await;
        debouncer.push("second");
        sleep(Duration::from_millis(400)).await;
        assert!(rx.try_recv().is_err());

        assert_eq!(rx.recv().await, Some("second"));
    }

    #[tokio::test(start_paused = true)]
    async fn separated_values_each_fire() {
        let (debouncer, mut rx) = collecting();
        debouncer.push("one");
        assert_eq!(rx.recv().await, Some("one"));
        debouncer.push("two");
        assert_eq!(rx.recv().await, Some("two"));
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_discards_pending_value() {
        let (debouncer, mut rx) = collecting();
        debouncer.push("never");
        sleep(Duration::from_millis(100)).await;
        debouncer.shutdown();
        assert!(debouncer.is_shut_down());
        assert!(!debouncer.push("after"));

        sleep(Duration::from_secs(2)).await;
        assert!(rx.try_recv().is_err());
    }
}
