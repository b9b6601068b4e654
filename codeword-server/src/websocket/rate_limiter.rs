use std::time::{Duration, Instant};

const DEFAULT_REFILL: Duration = Duration::from_millis(500);

/// Token bucket, one per connection.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    tokens: u32,
    capacity: u32,
    refill_every: Duration,
    last_refill: Instant,
}

impl RateLimiter {
    pub fn new(capacity: u32) -> Self {
        Self::with_refill(capacity, DEFAULT_REFILL)
    }

    pub fn with_refill(capacity: u32, refill_every: Duration) -> Self {
        Self {
            tokens: capacity,
            capacity,
            refill_every,
            last_refill: Instant::now(),
        }
    }

    pub fn try_acquire(&mut self) -> bool {
        self.refill();
        if self.tokens > 0 {
            self.tokens -= 1;
            true
        } else {
            false
        }
    }

    pub fn remaining(&mut self) -> u32 {
        self.refill();
        self.tokens
    }

    fn refill(&mut self) {
        let step = self.refill_every.as_millis().max(1);
        let earned = self.last_refill.elapsed().as_millis() / step;
        if earned == 0 {
            return;
        }
        let earned = u32::try_from(earned).unwrap_or(u32::MAX);
        self.tokens = self.tokens.saturating_add(earned).min(self.capacity);
        self.last_refill += self.refill_every * earned;
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(30)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_drains() {
        let mut limiter = RateLimiter::with_refill(3, Duration::from_secs(60));
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
        assert_eq!(limiter.remaining(), 0);
    }

    #[tokio::test]
    async fn test_bucket_refills_over_time() {
        let mut limiter = RateLimiter::with_refill(2, Duration::from_millis(10));
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());

        tokio::time::sleep(Duration::from_millis(25)).await;
        assert_eq!(limiter.remaining(), 2);
    }
}
