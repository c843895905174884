use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

/// Rolling-window call budget shared by every outbound request
///
/// Guarantees that no more than `max_calls` acquisitions happen within any
/// window of length `window`. Callers over budget wait instead of failing.
///
/// # Algorithm
/// - Remember the instants of the last `max_calls` acquisitions
/// - On acquire: forget instants older than one window
/// - If fewer than `max_calls` remain, record now and proceed
/// - Otherwise sleep until the oldest one leaves the window, then re-check
#[derive(Clone, Debug)]
pub struct CallBudget {
    /// Instants of recent acquisitions, oldest first
    recent: Arc<Mutex<VecDeque<Instant>>>,
    /// Calls allowed per window
    max_calls: usize,
    /// Length of the rolling window
    window: Duration,
}

impl CallBudget {
    /// Create a new call budget
    ///
    /// # Arguments
    /// * `max_calls` - Calls allowed within any window (at least 1)
    /// * `window` - Length of the rolling window
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use requester::infrastructure::rate_limiter::CallBudget;
    ///
    /// let budget = CallBudget::new(5, Duration::from_secs(2));
    /// assert_eq!(budget.max_calls(), 5);
    /// ```
    pub fn new(max_calls: usize, window: Duration) -> Self {
        let max_calls = max_calls.max(1);
        Self {
            recent: Arc::new(Mutex::new(VecDeque::with_capacity(max_calls))),
            max_calls,
            window,
        }
    }

    /// `calls` per second.
    pub fn per_second(calls: usize) -> Self {
        Self::new(calls, Duration::from_secs(1))
    }

    pub const fn max_calls(&self) -> usize {
        self.max_calls
    }

    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Acquire one call from the budget, waiting if necessary
    ///
    /// # Example
    /// ```no_run
    /// # use requester::infrastructure::rate_limiter::CallBudget;
    /// # async fn example() {
    /// let budget = CallBudget::per_second(1);
    /// budget.acquire().await;
    /// // Make API request here
    /// # }
    /// ```
    pub async fn acquire(&self) {
        loop {
            let mut recent = self.recent.lock().await;
            let now = Instant::now();

            while recent
                .front()
                .is_some_and(|&oldest| now.duration_since(oldest) >= self.window)
            {
                recent.pop_front();
            }

            if recent.len() < self.max_calls {
                recent.push_back(now);
                return;
            }

            // Budget spent - wait for the oldest call to leave the window
            let wake_at = recent
                .front()
                .map_or(now, |&oldest| oldest + self.window);

            // Release lock before sleeping
            drop(recent);

            sleep_until(wake_at).await;
        }
    }

    /// Calls that could be made right now without waiting (for testing/monitoring)
    pub async fn available(&self) -> usize {
        let recent = self.recent.lock().await;
        let now = Instant::now();
        let in_window = recent
            .iter()
            .filter(|&&at| now.duration_since(at) < self.window)
            .count();
        self.max_calls.saturating_sub(in_window)
    }
}

impl Default for CallBudget {
    fn default() -> Self {
        Self::per_second(1)
    }
}
