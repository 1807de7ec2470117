use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use reqwest::header::HeaderMap;
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration};

/// Below this many remaining calls a warning is logged.
pub const LOW_WATER_MARK: u32 = 10;
/// Below this many remaining calls the governor blocks until the reset.
pub const CRITICAL_MARK: u32 = 5;

const SAFETY_MARGIN: Duration = Duration::from_secs(1);

/// Quota signals carried on a listing response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitSnapshot {
    pub remaining: u32,
    pub reset: DateTime<Utc>,
}

impl RateLimitSnapshot {
    pub fn new(remaining: u32, reset: DateTime<Utc>) -> Self {
        Self { remaining, reset }
    }

    /// Reads `x-ratelimit-remaining` and `x-ratelimit-reset` (epoch seconds).
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let remaining = headers
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u32>().ok())?;

        let reset = headers
            .get("x-ratelimit-reset")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<i64>().ok())
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())?;

        Some(Self { remaining, reset })
    }
}

/// Paces primary listing requests against the remote quota.
///
/// The governor never retries anything. It only delays the caller so that
/// the next request is not rejected. Clones share state, so one governor can
/// gate several workers.
#[derive(Clone)]
pub struct RateLimitGovernor {
    state: Arc<Mutex<GovernorState>>,
    safety_margin: Duration,
    clock: fn() -> DateTime<Utc>,
}

struct GovernorState {
    last: Option<RateLimitSnapshot>,
}

impl RateLimitGovernor {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(GovernorState { last: None })),
            safety_margin: SAFETY_MARGIN,
            clock: Utc::now,
        }
    }

    /// Replaces the wall clock used to measure time left until a reset.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Records a snapshot from a listing response, warning when quota runs
    /// low and blocking when it is nearly exhausted.
    pub async fn observe(&self, snapshot: RateLimitSnapshot) {
        self.state.lock().await.last = Some(snapshot);

        if snapshot.remaining < LOW_WATER_MARK {
            tracing::warn!(
                "Rate limit low: {} requests remaining, resets at {}",
                snapshot.remaining,
                snapshot.reset
            );
        }

        self.wait().await;
    }

    /// Gate for primary-endpoint requests. Returns immediately unless the
    /// last observed quota is below the critical mark and has not reset yet.
    pub async fn wait(&self) {
        let last = self.state.lock().await.last;
        let Some(snapshot) = last else {
            return;
        };

        if let Some(wait) = required_wait(&snapshot, (self.clock)(), self.safety_margin) {
            tracing::info!(
                "Rate limit nearly exhausted ({} remaining), waiting {:?} for reset",
                snapshot.remaining,
                wait
            );
            sleep(wait).await;

            // Quota has been replenished; a fresh response will update it.
            let mut state = self.state.lock().await;
            if state.last == Some(snapshot) {
                state.last = None;
            }
        }
    }

    pub async fn last_snapshot(&self) -> Option<RateLimitSnapshot> {
        self.state.lock().await.last
    }
}

impl Default for RateLimitGovernor {
    fn default() -> Self {
        Self::new()
    }
}

/// How long to block for `snapshot` at `now`, if at all. Never negative.
pub fn required_wait(
    snapshot: &RateLimitSnapshot,
    now: DateTime<Utc>,
    safety_margin: Duration,
) -> Option<Duration> {
    if snapshot.remaining >= CRITICAL_MARK {
        return None;
    }

    let until_reset = (snapshot.reset - now).to_std().ok()?;
    if until_reset.is_zero() {
        return None;
    }

    Some(until_reset + safety_margin)
}
