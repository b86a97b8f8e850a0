use std::{future::Future, sync::Mutex, time::Duration};
use tokio::task::JoinHandle;

/// Quiet interval applied to search-box input.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(1200);

/// Delayed task with replacement: each [`Debouncer::call`] drops the pending
/// timer and schedules a new one, so only the last call in a quiet window runs.
///
/// Only the timer is cancelled. Once a scheduled future starts it runs on its
/// own task and a later call cannot interrupt it.
#[derive(Debug)]
pub struct Debouncer {
    quiet: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self { quiet, pending: Mutex::new(None) }
    }

    /// Must be called from within a tokio runtime.
    pub fn call<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let quiet = self.quiet;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            tokio::spawn(fut);
        });

        let mut pending = self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(previous) = pending.replace(timer) {
            previous.abort();
        }
    }

    /// Drop the pending call, if any.
    pub fn cancel(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(previous) = pending.take() {
            previous.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn recorder() -> Arc<Mutex<Vec<String>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    fn push(sink: Arc<Mutex<Vec<String>>>, value: &'static str) -> impl Future<Output = ()> {
        async move {
            sink.lock().unwrap().push(value.to_string());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn only_last_call_in_window_fires() {
        let debouncer = Debouncer::new(SEARCH_DEBOUNCE);
        let fired = recorder();

        debouncer.call(push(fired.clone(), "Lo"));
        tokio::time::sleep(Duration::from_millis(500)).await;
        debouncer.call(push(fired.clone(), "Lon"));
        tokio::time::sleep(Duration::from_millis(1100)).await;
        debouncer.call(push(fired.clone(), "Lond"));

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert!(fired.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(*fired.lock().unwrap(), vec!["Lond".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn calls_separated_by_quiet_interval_each_fire() {
        let debouncer = Debouncer::new(Duration::from_millis(100));
        let fired = recorder();

        debouncer.call(push(fired.clone(), "first"));
        tokio::time::sleep(Duration::from_millis(150)).await;
        debouncer.call(push(fired.clone(), "second"));
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(*fired.lock().unwrap(), vec!["first".to_string(), "second".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn started_work_is_not_cancelled_by_later_call() {
        let debouncer = Debouncer::new(Duration::from_millis(100));
        let fired = Arc::new(Mutex::new(Vec::new()));

        let sink = fired.clone();
        debouncer.call(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            sink.lock().unwrap().push("slow");
        });
        tokio::time::sleep(Duration::from_millis(150)).await;

        let sink = fired.clone();
        debouncer.call(async move {
            sink.lock().unwrap().push("fast");
        });
        tokio::time::sleep(Duration::from_millis(1000)).await;

        assert_eq!(*fired.lock().unwrap(), vec!["fast", "slow"]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_pending_call() {
        let debouncer = Debouncer::new(Duration::from_millis(100));
        let fired = recorder();

        debouncer.call(push(fired.clone(), "dropped"));
        debouncer.cancel();
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(fired.lock().unwrap().is_empty());
    }
}
