// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Admission control for the reservation entry point.
//!
//! A token bucket per requester identity: each bucket holds up to `limit`
//! tokens and regains one every `window / limit`. A request consumes one
//! token or is turned away with a retry-after hint. Buckets live in a
//! sharded concurrent map, so checks for different identities never
//! contend on a shared lock.

use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

/// Source of monotonic time in milliseconds.
pub trait Clock: Send + Sync {
    /// Returns milliseconds elapsed since an arbitrary fixed origin.
    fn now_millis(&self) -> u64;
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Creates a clock whose origin is now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    /// Creates a clock at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        let millis: u64 = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The request may proceed.
    Admitted {
        /// Tokens left after this request.
        remaining: u32,
    },
    /// The request must be turned away.
    Rejected {
        /// Time until the next token becomes available.
        retry_after: Duration,
    },
}

impl Admission {
    /// Returns true if the request was admitted.
    #[must_use]
    pub const fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted { .. })
    }
}

/// Per-identity request throttle.
pub trait AdmissionControl: Send + Sync {
    /// Checks and records one request from `identity`.
    fn admit(&self, identity: &str) -> Admission;

    /// Forgets identities whose state no longer affects any decision.
    ///
    /// Returns the number of identities removed.
    fn evict_idle(&self) -> usize;
}

/// Token bucket parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Bucket capacity and number of tokens regained per window.
    pub limit: u32,
    /// Refill window.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            limit: 5,
            window: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Bucket {
    tokens: u32,
    last_refill_ms: u64,
}

/// In-process token bucket limiter.
pub struct TokenBucketLimiter {
    limit: u32,
    window_ms: u64,
    buckets: DashMap<String, Bucket>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for TokenBucketLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenBucketLimiter")
            .field("limit", &self.limit)
            .field("window_ms", &self.window_ms)
            .field("identities", &self.buckets.len())
            .finish_non_exhaustive()
    }
}

impl TokenBucketLimiter {
    /// Creates a limiter on the system clock.
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock::new()))
    }

    /// Creates a limiter on the given clock.
    ///
    /// A zero limit is treated as one token and a zero window as one
    /// millisecond.
    #[must_use]
    pub fn with_clock(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        let window_ms: u64 = u64::try_from(config.window.as_millis())
            .unwrap_or(u64::MAX)
            .max(1);
        Self {
            limit: config.limit.max(1),
            window_ms,
            buckets: DashMap::new(),
            clock,
        }
    }

    /// Returns the number of identities currently tracked.
    #[must_use]
    pub fn tracked_identities(&self) -> usize {
        self.buckets.len()
    }

    /// Milliseconds between two refilled tokens, rounded up.
    fn refill_interval_ms(&self) -> u64 {
        self.window_ms.div_ceil(u64::from(self.limit))
    }
}

impl AdmissionControl for TokenBucketLimiter {
    fn admit(&self, identity: &str) -> Admission {
        let now: u64 = self.clock.now_millis();
        let limit: u64 = u64::from(self.limit);

        let mut bucket = self
            .buckets
            .entry(identity.to_string())
            .or_insert(Bucket {
                tokens: self.limit,
                last_refill_ms: now,
            });

        let elapsed: u64 = now.saturating_sub(bucket.last_refill_ms);
        let tokens_to_add: u64 = elapsed.saturating_mul(limit) / self.window_ms;

        if tokens_to_add > 0 {
            let refilled: u64 = u64::from(bucket.tokens)
                .saturating_add(tokens_to_add)
                .min(limit);
            bucket.tokens = u32::try_from(refilled).unwrap_or(self.limit);
            bucket.last_refill_ms = now;
        }

        if bucket.tokens > 0 {
            bucket.tokens -= 1;
            return Admission::Admitted {
                remaining: bucket.tokens,
            };
        }

        let since_refill: u64 = now.saturating_sub(bucket.last_refill_ms);
        let wait_ms: u64 = self
            .refill_interval_ms()
            .saturating_sub(since_refill)
            .max(1);

        debug!(identity, wait_ms, "Admission rejected");
        Admission::Rejected {
            retry_after: Duration::from_millis(wait_ms),
        }
    }

    fn evict_idle(&self) -> usize {
        let now: u64 = self.clock.now_millis();
        let mut removed: usize = 0;

        // A bucket untouched for a full window would refill to capacity on
        // its next check, which is exactly what a fresh bucket holds.
        self.buckets.retain(|_, bucket| {
            let keep: bool = now.saturating_sub(bucket.last_refill_ms) < self.window_ms;
            if !keep {
                removed += 1;
            }
            keep
        });

        if removed > 0 {
            debug!(removed, "Evicted idle admission buckets");
        }
        removed
    }
}
