use super::*;

fn limiter_with(config: ScanLimitConfig) -> ScanLimiter {
    ScanLimiter {
        inner: std::sync::Arc::new(Mutex::new(ScanLimiterInner {
            operator_requests: HashMap::new(),
            global_requests: VecDeque::new(),
            operator_tokens: HashMap::new(),
        })),
        config,
    }
}

fn tiny_config() -> ScanLimitConfig {
    ScanLimitConfig {
        per_operator_limit: 2,
        per_operator_window: Duration::from_secs(60),
        global_limit: 3,
        global_window: Duration::from_secs(60),
        token_budget: 100,
        token_window: Duration::from_secs(60),
    }
}

#[test]
fn operator_limit_trips_after_configured_requests() {
    let limiter = limiter_with(tiny_config());
    let op = Uuid::new_v4();
    let now = Instant::now();

    assert!(limiter.check_and_record_at(op, now).is_ok());
    assert!(limiter.check_and_record_at(op, now).is_ok());
    let err = limiter.check_and_record_at(op, now).unwrap_err();
    assert!(matches!(err, ScanLimitError::OperatorExceeded { limit: 2, .. }));
}

#[test]
fn global_limit_trips_across_operators() {
    let limiter = limiter_with(tiny_config());
    let now = Instant::now();

    assert!(limiter.check_and_record_at(Uuid::new_v4(), now).is_ok());
    assert!(limiter.check_and_record_at(Uuid::new_v4(), now).is_ok());
    assert!(limiter.check_and_record_at(Uuid::new_v4(), now).is_ok());
    let err = limiter.check_and_record_at(Uuid::new_v4(), now).unwrap_err();
    assert!(matches!(err, ScanLimitError::GlobalExceeded { limit: 3, .. }));
}

#[test]
fn requests_outside_window_are_pruned() {
    let limiter = limiter_with(tiny_config());
    let op = Uuid::new_v4();
    let start = Instant::now();

    assert!(limiter.check_and_record_at(op, start).is_ok());
    assert!(limiter.check_and_record_at(op, start).is_ok());
    assert!(limiter.check_and_record_at(op, start).is_err());

    // A request 61 seconds later sees an empty window again.
    let later = start + Duration::from_secs(61);
    assert!(limiter.check_and_record_at(op, later).is_ok());
}

#[test]
fn token_budget_blocks_further_scans() {
    let limiter = limiter_with(ScanLimitConfig { per_operator_limit: 100, global_limit: 100, ..tiny_config() });
    let op = Uuid::new_v4();
    let now = Instant::now();

    assert!(limiter.check_and_record_at(op, now).is_ok());
    limiter.record_tokens_at(op, 100, now);

    let err = limiter.check_and_record_at(op, now).unwrap_err();
    assert!(matches!(err, ScanLimitError::TokenBudgetExceeded { budget: 100, .. }));
}

#[test]
fn token_usage_expires_with_window() {
    let limiter = limiter_with(ScanLimitConfig { per_operator_limit: 100, global_limit: 100, ..tiny_config() });
    let op = Uuid::new_v4();
    let start = Instant::now();

    limiter.record_tokens_at(op, 100, start);
    assert!(limiter.check_and_record_at(op, start).is_err());

    let later = start + Duration::from_secs(61);
    assert!(limiter.check_and_record_at(op, later).is_ok());
}

#[test]
fn limits_are_independent_per_operator() {
    let limiter = limiter_with(ScanLimitConfig { global_limit: 100, ..tiny_config() });
    let op_a = Uuid::new_v4();
    let op_b = Uuid::new_v4();
    let now = Instant::now();

    assert!(limiter.check_and_record_at(op_a, now).is_ok());
    assert!(limiter.check_and_record_at(op_a, now).is_ok());
    assert!(limiter.check_and_record_at(op_a, now).is_err());

    assert!(limiter.check_and_record_at(op_b, now).is_ok());
}
