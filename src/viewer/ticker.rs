//! Repeating background tick, used to show progress while a request is in flight

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::oneshot;

/// Calls a closure on a runtime worker at a fixed interval until stopped
pub struct Ticker {
    cancel_tx: Option<oneshot::Sender<()>>,
}

impl Ticker {
    /// The first tick fires one `period` after starting
    pub fn start<F>(runtime: &Handle, period: Duration, mut tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();
        runtime.spawn(async move {
            let mut interval =
                tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            loop {
                tokio::select! {
                    biased;
                    _ = &mut cancel_rx => break,
                    _ = interval.tick() => tick(),
                }
            }
        });

        Ticker {
            cancel_tx: Some(cancel_tx),
        }
    }

    /// Best effort: a tick already running still completes
    pub fn stop(mut self) {
        self.cancel();
    }

    fn cancel(&mut self) {
        if let Some(tx) = self.cancel_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_ticks_until_stopped() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();

        let ticker = Ticker::start(runtime.handle(), Duration::from_millis(10), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        std::thread::sleep(Duration::from_millis(100));
        ticker.stop();
        std::thread::sleep(Duration::from_millis(30));

        let after_stop = count.load(Ordering::SeqCst);
        assert!(after_stop >= 2);
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(count.load(Ordering::SeqCst), after_stop);
    }
}
