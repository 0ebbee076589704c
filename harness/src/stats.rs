//! Sample reduction: turns one phase's raw timings into percentile statistics.

use crate::error::{HarnessError, Result};
use serde::Serialize;
use std::time::Duration;

/// Summary of one phase's latency distribution, in nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatencyStats {
    pub median: f64,
    pub p10: f64,
    pub p25: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
    pub count: usize,
}

/// Reduce raw samples (nanoseconds) to percentile statistics.
///
/// The input order does not matter; samples are sorted before ranking.
pub fn reduce(samples: &[f64]) -> Result<LatencyStats> {
    if samples.is_empty() {
        return Err(HarnessError::EmptyInput);
    }

    if let Some(bad) = samples.iter().find(|s| !s.is_finite() || **s < 0.0) {
        return Err(HarnessError::Numeric(format!(
            "sample {bad} is not a finite non-negative duration"
        )));
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);

    Ok(LatencyStats {
        median: percentile(&sorted, 50.0),
        p10: percentile(&sorted, 10.0),
        p25: percentile(&sorted, 25.0),
        p75: percentile(&sorted, 75.0),
        p90: percentile(&sorted, 90.0),
        p95: percentile(&sorted, 95.0),
        count: sorted.len(),
    })
}

/// Reduce a phase's measured durations, converting them to nanoseconds first.
pub fn reduce_durations(durations: &[Duration]) -> Result<LatencyStats> {
    let nanos: Vec<f64> = durations.iter().map(|d| d.as_nanos() as f64).collect();
    reduce(&nanos)
}

/// Linear-interpolation percentile over an already sorted, non-empty slice.
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    let rank = pct * (sorted.len() - 1) as f64 / 100.0;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    fn assert_ordered(stats: &LatencyStats) {
        assert!(stats.p10 <= stats.p25, "{stats:?}");
        assert!(stats.p25 <= stats.median, "{stats:?}");
        assert!(stats.median <= stats.p75, "{stats:?}");
        assert!(stats.p75 <= stats.p90, "{stats:?}");
        assert!(stats.p90 <= stats.p95, "{stats:?}");
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(reduce(&[]), Err(HarnessError::EmptyInput)));
        assert!(matches!(
            reduce_durations(&[]),
            Err(HarnessError::EmptyInput)
        ));
    }

    #[test]
    fn non_finite_and_negative_samples_are_rejected() {
        assert!(matches!(
            reduce(&[1.0, f64::NAN]),
            Err(HarnessError::Numeric(_))
        ));
        assert!(matches!(
            reduce(&[f64::INFINITY]),
            Err(HarnessError::Numeric(_))
        ));
        assert!(matches!(reduce(&[-1.0, 2.0]), Err(HarnessError::Numeric(_))));
    }

    #[test]
    fn single_sample_collapses_every_percentile() {
        let stats = reduce(&[42.0]).unwrap();
        assert_eq!(stats.median, 42.0);
        assert_eq!(stats.p10, 42.0);
        assert_eq!(stats.p95, 42.0);
        assert_eq!(stats.count, 1);
    }

    #[test]
    fn interpolates_between_ranks() {
        // 1..=11: rank = p/100 * 10, so p10 = 2, p25 = 3.5, p95 = 10.5
        let samples: Vec<f64> = (1..=11).map(|v| v as f64).collect();
        let stats = reduce(&samples).unwrap();
        assert_eq!(stats.median, 6.0);
        assert_eq!(stats.p10, 2.0);
        assert_eq!(stats.p25, 3.5);
        assert_eq!(stats.p75, 8.5);
        assert_eq!(stats.p90, 10.0);
        assert_eq!(stats.p95, 10.5);
        assert_eq!(stats.count, 11);
    }

    #[test]
    fn even_length_median_averages_middle_pair() {
        let stats = reduce(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(stats.median, 2.5);
    }

    #[test]
    fn percentiles_are_ordered_for_random_inputs() {
        let mut rng = StdRng::seed_from_u64(7);
        for len in [1usize, 2, 3, 10, 99, 100, 1_000] {
            let samples: Vec<f64> = (0..len).map(|_| rng.gen_range(0.0..1e7)).collect();
            let stats = reduce(&samples).unwrap();
            assert_ordered(&stats);
            assert_eq!(stats.count, len);
        }
    }

    #[test]
    fn permutation_does_not_change_result() {
        let mut rng = StdRng::seed_from_u64(99);
        let samples: Vec<f64> = (0..100).map(|_| rng.gen_range(0.0..5e6)).collect();
        let expected = reduce(&samples).unwrap();

        for _ in 0..5 {
            let mut shuffled = samples.clone();
            shuffled.shuffle(&mut rng);
            assert_eq!(reduce(&shuffled).unwrap(), expected);
        }
    }

    #[test]
    fn durations_are_reduced_in_nanoseconds() {
        let durations = [
            Duration::from_micros(3),
            Duration::from_micros(1),
            Duration::from_micros(2),
        ];
        let stats = reduce_durations(&durations).unwrap();
        assert_eq!(stats.median, 2_000.0);
        assert_eq!(stats.count, 3);
    }
}
