//! Rate Limiter (Token Bucket Algorithm, one bucket per actor)
//!
//! A noisy caller exhausts only its own bucket. Buckets that have refilled to
//! capacity carry no state worth keeping and are evicted once the table grows
//! past `MAX_TRACKED_ACTORS`.

use std::collections::HashMap;
use std::time::Instant;
use tokio::sync::Mutex;

const MAX_TRACKED_ACTORS: usize = 10_000;

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Per-actor token bucket rate limiter
pub struct RateLimiter {
    buckets: Mutex<HashMap<String, Bucket>>,
    max_tokens: u32,
    refill_rate: u32, // tokens per second
}

impl RateLimiter {
    /// Create a new rate limiter
    ///
    /// # Arguments
    /// * `max_tokens` - Maximum burst size per actor
    /// * `refill_rate` - Tokens added per second per actor
    ///
    /// # Example
    /// Allow 20 requests/sec per actor with a burst of 40:
    /// `RateLimiter::new(40, 20)`
    pub fn new(max_tokens: u32, refill_rate: u32) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            max_tokens,
            refill_rate,
        }
    }

    fn refill(&self, bucket: &mut Bucket, now: Instant) {
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens =
            (bucket.tokens + elapsed * self.refill_rate as f64).min(self.max_tokens as f64);
        bucket.last_refill = now;
    }

    /// Check if a request from `actor` is allowed (consumes 1 token)
    ///
    /// Returns true if allowed, false if rate limited
    pub async fn check(&self, actor: &str) -> bool {
        let now = Instant::now();
        let mut buckets = self.buckets.lock().await;

        if buckets.len() >= MAX_TRACKED_ACTORS && !buckets.contains_key(actor) {
            buckets.retain(|_, bucket| {
                let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
                bucket.tokens + elapsed * (self.refill_rate as f64) < (self.max_tokens as f64)
            });
        }

        let bucket = buckets.entry(actor.to_string()).or_insert(Bucket {
            tokens: self.max_tokens as f64,
            last_refill: now,
        });
        self.refill(bucket, now);

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Remaining whole tokens for an actor (full bucket if never seen)
    pub async fn remaining(&self, actor: &str) -> u32 {
        let now = Instant::now();
        let mut buckets = self.buckets.lock().await;
        match buckets.get_mut(actor) {
            Some(bucket) => {
                self.refill(bucket, now);
                bucket.tokens.floor() as u32
            }
            None => self.max_tokens,
        }
    }
}
