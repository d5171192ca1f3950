//! Rate Limiter (Token Bucket Algorithm)
//!
//! Every backend call starts a process, so callers are throttled before they
//! ever reach the admission queue.

use std::sync::Mutex;
use std::time::Instant;

/// Token bucket: `burst` tokens max, refilled continuously at `rate_per_sec`
pub struct RateLimiter {
    bucket: Mutex<Bucket>,
    burst: f64,
    rate_per_sec: f64,
}

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

impl RateLimiter {
    /// Allow 100 requests/sec with a burst of 200: `RateLimiter::new(200, 100)`
    pub fn new(burst: u32, rate_per_sec: u32) -> Self {
        Self {
            bucket: Mutex::new(Bucket {
                tokens: burst as f64,
                last_refill: Instant::now(),
            }),
            burst: burst as f64,
            rate_per_sec: rate_per_sec as f64,
        }
    }

    /// Consume one token. Returns false when the caller must be throttled.
    pub fn check(&self) -> bool {
        let mut bucket = match self.bucket.lock() {
            Ok(guard) => guard,
            // A panicked holder cannot leave the bucket half-updated
            Err(poisoned) => poisoned.into_inner(),
        };

        let now = Instant::now();
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.rate_per_sec).min(self.burst);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_burst_then_throttle() {
        let limiter = RateLimiter::new(3, 1);

        assert!(limiter.check());
        assert!(limiter.check());
        assert!(limiter.check());
        assert!(!limiter.check());
    }

    #[test]
    fn test_zero_burst_always_throttles() {
        let limiter = RateLimiter::new(0, 1000);

        assert!(!limiter.check());
    }

    #[tokio::test]
    async fn test_refill_over_time() {
        let limiter = RateLimiter::new(2, 20); // one token every 50ms
        assert!(limiter.check());
        assert!(limiter.check());
        assert!(!limiter.check());

        tokio::time::sleep(Duration::from_millis(120)).await;

        assert!(limiter.check());
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_the_bucket() {
        let limiter = Arc::new(RateLimiter::new(50, 1));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let limiter = limiter.clone();
            handles.push(tokio::spawn(async move {
                (0..20).filter(|_| limiter.check()).count()
            }));
        }

        let mut allowed = 0;
        for handle in handles {
            allowed += handle.await.unwrap();
        }

        // 160 attempts against a burst of 50 (refill adds at most a token or two)
        assert!((50..=52).contains(&allowed), "allowed = {}", allowed);
    }
}
