//! Global request rate limiter
//!
//! Every outbound request, the robots.txt fetch included, passes through
//! [`RateLimiter::acquire`]. The limiter is shareable behind an `Arc`; the
//! interval is enforced across all holders.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Longest interval a limiter will enforce (one day)
pub const MAX_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Enforces a minimum interval between consecutive grants
///
/// Waiters are admitted in call order: the lock is a fair FIFO queue and is
/// held while sleeping, so a later caller can never overtake an earlier one.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    last_grant: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Creates a limiter with a fixed minimum interval between grants
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            last_grant: Mutex::new(None),
        }
    }

    /// Creates a limiter allowing `rate` grants per second
    ///
    /// Non-positive or non-finite rates yield an unlimited limiter. Rates so
    /// small that the interval would exceed [`MAX_INTERVAL`] are clamped to it.
    ///
    /// # Examples
    ///
    /// ```
    /// use sitewalk::crawler::RateLimiter;
    /// use std::time::Duration;
    ///
    /// let limiter = RateLimiter::per_second(2.0);
    /// assert_eq!(limiter.interval(), Duration::from_millis(500));
    /// ```
    pub fn per_second(rate: f64) -> Self {
        if !(rate.is_finite() && rate > 0.0) {
            return Self::unlimited();
        }

        match Duration::try_from_secs_f64(1.0 / rate) {
            Ok(interval) => Self::with_interval(interval.min(MAX_INTERVAL)),
            Err(_) => {
                tracing::warn!("Rate {} is too small, using one request per day", rate);
                Self::with_interval(MAX_INTERVAL)
            }
        }
    }

    /// Lengthens the interval to at least `min_interval`
    ///
    /// Used to honour a robots.txt Crawl-delay. The interval never shrinks,
    /// never grows past [`MAX_INTERVAL`], and the time of the last grant is kept.
    pub fn at_least(mut self, min_interval: Duration) -> Self {
        self.interval = self.interval.max(min_interval.min(MAX_INTERVAL));
        self
    }

    /// A limiter that never waits
    pub fn unlimited() -> Self {
        Self::with_interval(Duration::ZERO)
    }

    /// The minimum interval between grants
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Waits until a request may be sent
    ///
    /// Returns once at least `interval` has passed since the previous call
    /// returned. The first call returns immediately.
    pub async fn acquire(&self) {
        if self.interval.is_zero() {
            return;
        }

        let mut last = self.last_grant.lock().await;

        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.interval {
                tokio::time::sleep(self.interval - elapsed).await;
            }
        }

        *last = Some(Instant::now());
    }
}
