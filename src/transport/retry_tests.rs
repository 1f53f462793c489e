//! Tests for `RetryPolicy`.

use super::RetryPolicy;
use std::time::Duration;

mod retry_policy_defaults {
    use super::*;

    #[test]
    fn new_creates_policy_with_defaults() {
        let policy = RetryPolicy::new();

        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.initial_delay, Duration::from_millis(200));
        assert_eq!(policy.max_delay, Duration::from_secs(5));
        assert!((policy.multiplier - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn default_trait_matches_new() {
        assert_eq!(RetryPolicy::new(), RetryPolicy::default());
    }

    #[test]
    fn no_retry_allows_a_single_attempt() {
        let policy = RetryPolicy::no_retry();

        assert_eq!(policy.max_attempts, 1);
        assert!(!policy.should_retry(1));
    }
}

mod retry_policy_builder {
    use super::*;

    #[test]
    fn with_max_attempts_sets_value() {
        assert_eq!(RetryPolicy::new().with_max_attempts(5).max_attempts, 5);
    }

    #[test]
    #[should_panic(expected = "max_attempts must be at least 1")]
    fn with_max_attempts_zero_panics() {
        let _ = RetryPolicy::new().with_max_attempts(0);
    }

    #[test]
    #[should_panic(expected = "multiplier must be positive")]
    fn with_multiplier_zero_panics() {
        let _ = RetryPolicy::new().with_multiplier(0.0);
    }

    #[test]
    fn builder_chain_sets_all_values() {
        let policy = RetryPolicy::new()
            .with_max_attempts(4)
            .with_initial_delay(Duration::from_millis(10))
            .with_max_delay(Duration::from_millis(50))
            .with_multiplier(3.0);

        assert_eq!(policy.max_attempts, 4);
        assert_eq!(policy.initial_delay, Duration::from_millis(10));
        assert_eq!(policy.max_delay, Duration::from_millis(50));
        assert!((policy.multiplier - 3.0).abs() < f64::EPSILON);
    }
}

mod delay_calculation {
    use super::*;

    #[test]
    fn delays_grow_exponentially() {
        let policy = RetryPolicy::new()
            .with_initial_delay(Duration::from_millis(100))
            .with_max_delay(Duration::from_secs(10));

        assert_eq!(policy.delay_for_retry(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for_retry(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for_retry(2), Duration::from_millis(400));
    }

    #[test]
    fn delays_are_capped() {
        let policy = RetryPolicy::new()
            .with_initial_delay(Duration::from_secs(1))
            .with_max_delay(Duration::from_secs(2))
            .with_multiplier(10.0);

        assert_eq!(policy.delay_for_retry(3), Duration::from_secs(2));
    }

    #[test]
    fn overflowing_delay_saturates_at_cap() {
        let policy = RetryPolicy::new().with_max_delay(Duration::from_secs(30));

        assert_eq!(policy.delay_for_retry(u32::MAX), Duration::from_secs(30));
    }

    #[test]
    fn zero_initial_delay_stays_zero() {
        let policy = RetryPolicy::new().with_initial_delay(Duration::ZERO);

        assert_eq!(policy.delay_for_retry(2), Duration::ZERO);
        assert_eq!(policy.delay_for_retry(u32::MAX), Duration::ZERO);
    }
}

mod should_retry {
    use super::*;

    #[test]
    fn retries_until_last_attempt() {
        let policy = RetryPolicy::new().with_max_attempts(3);

        assert!(policy.should_retry(1));
        assert!(policy.should_retry(2));
        assert!(!policy.should_retry(3));
        assert!(!policy.should_retry(4));
    }
}
