//! Property-based tests for error messages and classification.

use openracing_errors::prelude::*;
use proptest::prelude::*;

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(256))]

    #[test]
    fn test_error_severity_ordering(a in 0u8..=3, b in 0u8..=3) {
        let to_severity = |v: u8| match v {
            0 => ErrorSeverity::Info,
            1 => ErrorSeverity::Warning,
            2 => ErrorSeverity::Error,
            _ => ErrorSeverity::Critical,
        };
        prop_assert_eq!(a.cmp(&b), to_severity(a).cmp(&to_severity(b)));
    }

    #[test]
    fn test_unknown_action_mentions_action(action in "[A-Z_]{1,24}") {
        let err = ConfigurationError::unknown_action(action.clone());
        prop_assert!(err.to_string().contains(&action));
    }

    #[test]
    fn test_bad_index_mentions_value(value in any::<i64>()) {
        let err = ConfigurationError::bad_index("button", value);
        prop_assert!(err.to_string().contains(&value.to_string()));
    }

    #[test]
    fn test_session_conflict_is_never_critical(action in "[A-Z_0-9]{1,16}") {
        let err: BinderError = ConflictError::session_active(action).into();
        prop_assert!(err.severity() < ErrorSeverity::Critical);
        prop_assert!(err.is_retryable());
    }
}
