//! Outbound request pacing
//!
//! A token bucket with capacity 1 refilled once per interval gives "at
//! most one request per interval" across every caller sharing the limiter.
//! The limiter is an explicit object owned by the client; clones of the
//! client share it.

use log::trace;
use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::Instant;

struct TokenBucket {
    tokens: f64,
    capacity: f64,
    refill_rate: f64, // tokens per second
    last_update: Instant,
}

impl TokenBucket {
    fn new(capacity: u32, refill_interval: Duration) -> Self {
        let refill_rate = capacity as f64 / refill_interval.as_secs_f64().max(f64::EPSILON);
        TokenBucket {
            tokens: capacity as f64,
            capacity: capacity as f64,
            refill_rate,
            last_update: Instant::now(),
        }
    }

    fn try_consume(&mut self, amount: u32) -> (bool, Duration) {
        self.refill();

        let amount_f64 = amount as f64;
        if self.tokens >= amount_f64 {
            self.tokens -= amount_f64;
            (true, Duration::ZERO)
        } else {
            // Calculate wait time
            let deficit = amount_f64 - self.tokens;
            let wait_seconds = deficit / self.refill_rate;
            (false, Duration::from_secs_f64(wait_seconds))
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update);
        let new_tokens = elapsed.as_secs_f64() * self.refill_rate;
        self.tokens = (self.tokens + new_tokens).min(self.capacity);
        self.last_update = now;
    }
}

/// Process-wide request pacer
pub struct RateLimiter {
    bucket: Mutex<TokenBucket>,
}

impl RateLimiter {
    /// One request per `interval`, first request immediate
    pub fn per_interval(interval: Duration) -> Self {
        Self {
            bucket: Mutex::new(TokenBucket::new(1, interval)),
        }
    }

    /// Take a slot without waiting; on refusal, how long until one frees up
    pub fn try_acquire(&self) -> Result<(), Duration> {
        match self.bucket.lock().try_consume(1) {
            (true, _) => Ok(()),
            (false, wait) => Err(wait),
        }
    }

    /// Wait until a request may go out
    pub async fn acquire(&self) {
        // The lock is never held across the sleep
        while let Err(wait) = self.try_acquire() {
            trace!("[Gateway] Rate limited, waiting {:?}", wait);
            tokio::time::sleep(wait).await;
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::per_interval(Duration::from_secs(1))
    }
}
