//! Token-bucket admission control for outbound requests
//!
//! The bucket starts full (`burst_size` tokens) and refills continuously at
//! `requests_per_second`. Acquisition is a single critical section: while one
//! task waits for a token, other callers queue behind it on the lock, so
//! permits are issued one at a time even though the fetches that follow run
//! concurrently.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

/// Default refill rate (tokens per second)
pub const DEFAULT_REQUESTS_PER_SECOND: f64 = 2.0;

/// Default bucket capacity
pub const DEFAULT_BURST_SIZE: u32 = 5;

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Token bucket shared by every task of one crawl session
#[derive(Debug)]
pub struct RateLimiter {
    rate: f64,
    burst_size: f64,
    bucket: Mutex<Bucket>,
}

impl RateLimiter {
    /// Creates a full bucket
    ///
    /// `requests_per_second` must be positive and `burst_size` at least 1;
    /// both are enforced by config validation.
    pub fn new(requests_per_second: f64, burst_size: u32) -> Self {
        let burst_size = f64::from(burst_size.max(1));
        Self {
            rate: requests_per_second,
            burst_size,
            bucket: Mutex::new(Bucket {
                tokens: burst_size,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Waits until a token is available, then consumes it
    ///
    /// Only the calling task is suspended; the tokio runtime keeps driving
    /// other tasks while this one sleeps.
    pub async fn acquire(&self) {
        let mut bucket = self.bucket.lock().await;

        loop {
            self.refill(&mut bucket);

            if bucket.tokens >= 1.0 {
                bucket.tokens -= 1.0;
                return;
            }

            sleep(self.retry_interval()).await;
        }
    }

    fn refill(&self, bucket: &mut Bucket) {
        let now = Instant::now();
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.rate).min(self.burst_size);
        bucket.last_refill = now;
    }

    fn retry_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.rate)
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_REQUESTS_PER_SECOND, DEFAULT_BURST_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_burst_is_immediate() {
        let limiter = RateLimiter::new(1.0, 3);
        let start = Instant::now();

        for _ in 0..3 {
            limiter.acquire().await;
        }

        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquisitions_beyond_burst_are_paced() {
        // N = 6, B = 2, R = 4 → at least (6 - 2) / 4 = 1s
        let limiter = RateLimiter::new(4.0, 2);
        let start = Instant::now();

        for _ in 0..6 {
            limiter.acquire().await;
        }

        assert!(start.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fractional_rate() {
        let limiter = RateLimiter::new(0.5, 1);
        let start = Instant::now();

        limiter.acquire().await;
        limiter.acquire().await;

        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_share_the_bucket() {
        let limiter = Arc::new(RateLimiter::new(2.0, 2));
        let start = Instant::now();

        let handles: Vec<_> = (0..6)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                tokio::spawn(async move { limiter.acquire().await })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }

        // (6 - 2) / 2 = 2s
        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refill_capped_at_burst() {
        let limiter = RateLimiter::new(10.0, 3);
        limiter.acquire().await;

        sleep(Duration::from_secs(60)).await;

        // A full bucket serves the burst at once, then the fourth call waits
        let start = Instant::now();
        for _ in 0..3 {
            limiter.acquire().await;
        }
        assert_eq!(start.elapsed(), Duration::ZERO);

        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(100));
    }
}
