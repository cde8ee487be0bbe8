//! Efficiency gate: only accept a re-encode that saves space.
//!
//! A tie is a rejection; replacing a file has operational cost and an
//! equal-size candidate is not worth it.

/// Pass iff the candidate is strictly smaller than the original.
pub fn is_efficient(original_bytes: u64, candidate_bytes: u64) -> bool {
    candidate_bytes < original_bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_equal_size_is_rejected() {
        assert!(!is_efficient(1_000_000, 1_000_000));
    }

    #[test]
    fn test_one_byte_smaller_is_accepted() {
        assert!(is_efficient(1_000_000, 999_999));
    }

    #[test]
    fn test_larger_candidate_is_rejected() {
        assert!(!is_efficient(1_000_000, 1_000_001));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_efficiency_is_strict_less_than(
            original in 0u64..=u64::MAX / 2,
            candidate in 0u64..=u64::MAX / 2,
        ) {
            prop_assert_eq!(is_efficient(original, candidate), candidate < original);
        }
    }
}
