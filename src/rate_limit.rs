//! In-memory rate limiting for compliance scan requests.
//!
//! DESIGN
//! ======
//! Sliding-window counters backed by `HashMap<Uuid, VecDeque<Instant>>`.
//! Three limits enforced:
//! - Per-operator: 10 scans/min
//! - Global: 30 provider calls/min
//! - Token budget: 100k provider tokens/operator/hour, settled after each
//!   response (scans are single short calls, so in-flight reservations are
//!   not tracked).

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use uuid::Uuid;

const DEFAULT_PER_OPERATOR_LIMIT: usize = 10;
const DEFAULT_PER_OPERATOR_WINDOW_SECS: u64 = 60;

const DEFAULT_GLOBAL_LIMIT: usize = 30;
const DEFAULT_GLOBAL_WINDOW_SECS: u64 = 60;

const DEFAULT_TOKEN_BUDGET: u64 = 100_000;
const DEFAULT_TOKEN_WINDOW_SECS: u64 = 3600;

#[derive(Clone, Copy)]
struct ScanLimitConfig {
    per_operator_limit: usize,
    per_operator_window: Duration,
    global_limit: usize,
    global_window: Duration,
    token_budget: u64,
    token_window: Duration,
}

impl ScanLimitConfig {
    fn from_env() -> Self {
        Self {
            per_operator_limit: env_parse("SCAN_LIMIT_PER_OPERATOR", DEFAULT_PER_OPERATOR_LIMIT),
            per_operator_window: Duration::from_secs(env_parse(
                "SCAN_LIMIT_PER_OPERATOR_WINDOW_SECS",
                DEFAULT_PER_OPERATOR_WINDOW_SECS,
            )),
            global_limit: env_parse("SCAN_LIMIT_GLOBAL", DEFAULT_GLOBAL_LIMIT),
            global_window: Duration::from_secs(env_parse("SCAN_LIMIT_GLOBAL_WINDOW_SECS", DEFAULT_GLOBAL_WINDOW_SECS)),
            token_budget: env_parse("SCAN_LIMIT_TOKEN_BUDGET", DEFAULT_TOKEN_BUDGET),
            token_window: Duration::from_secs(env_parse("SCAN_LIMIT_TOKEN_WINDOW_SECS", DEFAULT_TOKEN_WINDOW_SECS)),
        }
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ScanLimitError {
    #[error("operator scan limit exceeded (max {limit} scans/{window_secs}s)")]
    OperatorExceeded { limit: usize, window_secs: u64 },
    #[error("global scan limit exceeded (max {limit} scans/{window_secs}s)")]
    GlobalExceeded { limit: usize, window_secs: u64 },
    #[error("scan token budget exceeded (max {budget} tokens/{window_secs}s)")]
    TokenBudgetExceeded { budget: u64, window_secs: u64 },
}

// =============================================================================
// SCAN LIMITER
// =============================================================================

#[derive(Clone)]
pub struct ScanLimiter {
    inner: std::sync::Arc<Mutex<ScanLimiterInner>>,
    config: ScanLimitConfig,
}

struct ScanLimiterInner {
    /// Per-operator request timestamps.
    operator_requests: HashMap<Uuid, VecDeque<Instant>>,
    /// Global request timestamps.
    global_requests: VecDeque<Instant>,
    /// Per-operator token usage: (timestamp, token count).
    operator_tokens: HashMap<Uuid, VecDeque<(Instant, u64)>>,
}

impl ScanLimiter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: std::sync::Arc::new(Mutex::new(ScanLimiterInner {
                operator_requests: HashMap::new(),
                global_requests: VecDeque::new(),
                operator_tokens: HashMap::new(),
            })),
            config: ScanLimitConfig::from_env(),
        }
    }

    /// Check request limits and the token budget, then record the request.
    ///
    /// # Errors
    ///
    /// Returns a [`ScanLimitError`] naming the first exhausted limit.
    pub fn check_and_record(&self, operator_id: Uuid) -> Result<(), ScanLimitError> {
        self.check_and_record_at(operator_id, Instant::now())
    }

    /// Internal: check + record with explicit timestamp (for testing).
    fn check_and_record_at(&self, operator_id: Uuid, now: Instant) -> Result<(), ScanLimitError> {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let cfg = self.config;

        prune_window(&mut inner.global_requests, now, cfg.global_window);
        if inner.global_requests.len() >= cfg.global_limit {
            return Err(ScanLimitError::GlobalExceeded {
                limit: cfg.global_limit,
                window_secs: cfg.global_window.as_secs(),
            });
        }

        let operator_deque = inner.operator_requests.entry(operator_id).or_default();
        prune_window(operator_deque, now, cfg.per_operator_window);
        if operator_deque.len() >= cfg.per_operator_limit {
            return Err(ScanLimitError::OperatorExceeded {
                limit: cfg.per_operator_limit,
                window_secs: cfg.per_operator_window.as_secs(),
            });
        }

        let token_deque = inner.operator_tokens.entry(operator_id).or_default();
        prune_token_window(token_deque, now, cfg.token_window);
        let used_tokens: u64 = token_deque.iter().map(|(_, t)| t).sum();
        if used_tokens >= cfg.token_budget {
            return Err(ScanLimitError::TokenBudgetExceeded {
                budget: cfg.token_budget,
                window_secs: cfg.token_window.as_secs(),
            });
        }

        inner
            .operator_requests
            .entry(operator_id)
            .or_default()
            .push_back(now);
        inner.global_requests.push_back(now);
        Ok(())
    }

    /// Record provider token usage after a scan response.
    pub fn record_tokens(&self, operator_id: Uuid, tokens: u64) {
        self.record_tokens_at(operator_id, tokens, Instant::now());
    }

    fn record_tokens_at(&self, operator_id: Uuid, tokens: u64, now: Instant) {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let window = self.config.token_window;
        let token_deque = inner.operator_tokens.entry(operator_id).or_default();
        prune_token_window(token_deque, now, window);
        token_deque.push_back((now, tokens));
    }
}

impl Default for ScanLimiter {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn prune_window(deque: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&front) = deque.front() {
        if now.duration_since(front) > window {
            deque.pop_front();
        } else {
            break;
        }
    }
}

fn prune_token_window(deque: &mut VecDeque<(Instant, u64)>, now: Instant, window: Duration) {
    while let Some(&(front, _)) = deque.front() {
        if now.duration_since(front) > window {
            deque.pop_front();
        } else {
            break;
        }
    }
}

#[cfg(test)]
#[path = "rate_limit_test.rs"]
mod tests;
