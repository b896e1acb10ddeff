// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Match statistics for candidate scoring and reporting.

use statrs::distribution::{Binomial, DiscreteCDF};

/// Share of observations matched, as a percentage.
pub fn confidence(matches: usize, total: usize) -> f64 {
    (matches as f64 / total as f64) * 100.0
}

/// Probability that a uniformly random 32-bit stream of `depth` outputs
/// matches at least `matches` observations by chance. Each output hits
/// the currently awaited observation with probability 2^-32, so the
/// chance match count is binomial over the depth.
pub fn chance_of_matches(depth: u32, matches: usize) -> f64 {
    if matches == 0 {
        return 1.0;
    }
    let per_output = 1.0 / (u32::MAX as f64 + 1.0);
    let trials = Binomial::new(per_output, depth as u64).unwrap();
    trials.sf(matches as u64 - 1)
}

/// Expected number of seeds in a searched range that would reach the same
/// match count purely by chance.
pub fn expected_false_positives(range: u64, depth: u32, matches: usize) -> f64 {
    range as f64 * chance_of_matches(depth, matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_is_a_percentage_of_matches() {
        assert_eq!(confidence(5, 10), 50.0);
        assert_eq!(confidence(10, 10), 100.0);
        assert_eq!(confidence(0, 3), 0.0);
    }

    #[test]
    fn chance_shrinks_as_matches_accumulate() {
        let one = chance_of_matches(1000, 1);
        let two = chance_of_matches(1000, 2);
        assert!(one > 0.0 && one < 1.0);
        assert!(two < one);
        assert_eq!(chance_of_matches(1000, 0), 1.0);
    }

    #[test]
    fn expected_false_positives_scale_with_the_range() {
        let narrow = expected_false_positives(1_000, 500, 1);
        let wide = expected_false_positives(2_000, 500, 1);
        assert!((wide - 2.0 * narrow).abs() < 1e-15);
    }
}
