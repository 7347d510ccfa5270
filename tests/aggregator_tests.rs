// Trimmed mean tests: trimming counts, insufficient data, empty remainder

use nodecount::aggregator::{AggregateError, TrimmedMean};
use nodecount::models::NodeEstimate;
use proptest::prelude::*;

fn estimates(values: &[u64]) -> Vec<NodeEstimate> {
    values.iter().map(|&v| NodeEstimate::new(v)).collect()
}

#[test]
fn twenty_evenly_spaced_drops_one_from_each_end() {
    let values: Vec<u64> = (1..=20).map(|i| i * 100).collect();
    let agg = TrimmedMean::default();
    assert_eq!(agg.trim_count(20), 1);
    // 200..=1900 step 100
    let expected = (2..=19).map(|i| (i * 100) as f64).sum::<f64>() / 18.0;
    assert_eq!(agg.aggregate(&estimates(&values)).unwrap(), expected);
    assert_eq!(expected, 1050.0);
}

#[test]
fn input_order_does_not_matter() {
    let mut values: Vec<u64> = (1..=20).collect();
    values.reverse();
    values.swap(3, 11);
    let out = TrimmedMean::default().aggregate(&estimates(&values)).unwrap();
    assert_eq!(out, 10.5);
}

#[test]
fn empty_input_reports_no_samples() {
    assert_eq!(
        TrimmedMean::default().aggregate(&[]),
        Err(AggregateError::NoSamples)
    );
}

#[test]
fn trim_count_scales_with_population() {
    let agg = TrimmedMean::default();
    assert_eq!(agg.trim_count(25), 1);
    assert_eq!(agg.trim_count(39), 1);
    assert_eq!(agg.trim_count(40), 2);
    assert_eq!(agg.trim_count(100), 5);
}

#[test]
fn outlier_is_trimmed_away() {
    let mut values: Vec<u64> = (0..24).map(|i| 1000 + i * 40).collect();
    values.push(1_000_000);
    let out = TrimmedMean::default().aggregate(&estimates(&values)).unwrap();
    assert!((1000.0..=1920.0).contains(&out), "average {out} pulled by outlier");
}

#[test]
fn zero_trim_is_plain_mean() {
    let values: Vec<u64> = (1..=4).collect();
    let out = TrimmedMean::new(0.0, 1).aggregate(&estimates(&values)).unwrap();
    assert_eq!(out, 2.5);
}

#[test]
fn trimming_everything_reports_empty_after_trim() {
    let values: Vec<u64> = (1..=20).collect();
    let err = TrimmedMean::new(0.5, 20)
        .aggregate(&estimates(&values))
        .unwrap_err();
    assert_eq!(
        err,
        AggregateError::EmptyAfterTrim {
            count: 20,
            trimmed: 10
        }
    );
}

#[test]
fn large_values_do_not_overflow_sum() {
    let values = vec![u64::MAX; 20];
    let out = TrimmedMean::default().aggregate(&estimates(&values)).unwrap();
    assert_eq!(out, u64::MAX as f64);
}

proptest! {
    #[test]
    fn fewer_than_twenty_is_always_insufficient(
        values in prop::collection::vec(1u64..1_000_000, 1..20)
    ) {
        let count = values.len();
        let result = TrimmedMean::default().aggregate(&estimates(&values));
        prop_assert_eq!(
            result,
            Err(AggregateError::InsufficientData { count, required: 20 })
        );
    }

    #[test]
    fn trimmed_mean_stays_within_kept_range(
        values in prop::collection::vec(1u64..1_000_000, 20..200)
    ) {
        let mut sorted = values.clone();
        sorted.sort_unstable();
        let k = (0.05 * sorted.len() as f64).floor() as usize;
        let lo = sorted[k] as f64;
        let hi = sorted[sorted.len() - 1 - k] as f64;
        let out = TrimmedMean::default().aggregate(&estimates(&values)).unwrap();
        prop_assert!(out >= lo && out <= hi, "{} outside [{}, {}]", out, lo, hi);
    }
}
