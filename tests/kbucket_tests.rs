// k-bucket parsing and estimation: grammar, edge cases, estimate formula properties

use nodecount::kbucket::{KBucketEstimator, parse_buckets};
use nodecount::models::{NodeEstimate, RoutingBucketSample};
use proptest::prelude::*;

fn line_of(triples: &[(u32, u32, u32)]) -> String {
    let body: Vec<String> = triples
        .iter()
        .map(|(d, o, c)| format!("({d}, {o}, {c})"))
        .collect();
    format!("kBucketTable: [{}]", body.join(", "))
}

#[test]
fn parse_buckets_extracts_triples_in_order() {
    let line = "INFO kBucketTable for self: [(1, 5, 20), (2, 20, 20), (3, 0, 20)]";
    let buckets = parse_buckets(line);
    assert_eq!(
        buckets,
        vec![
            RoutingBucketSample::new(1, 5, 20).unwrap(),
            RoutingBucketSample::new(2, 20, 20).unwrap(),
            RoutingBucketSample::new(3, 0, 20).unwrap(),
        ]
    );
}

#[test]
fn parse_buckets_requires_comma_space_separator() {
    assert!(parse_buckets("kBucketTable [(1,5,20)]").is_empty());
    assert!(parse_buckets("kBucketTable [(1, 5,20)]").is_empty());
    assert!(parse_buckets("kBucketTable [(1,  5, 20)]").is_empty());
}

#[test]
fn parse_buckets_ignores_non_triples() {
    assert!(parse_buckets("kBucketTable [(1, 5)]").is_empty());
    assert!(parse_buckets("kBucketTable [(-1, 5, 20)]").is_empty());
    assert!(parse_buckets("kBucketTable [(1.5, 5, 20)]").is_empty());
    assert!(parse_buckets("").is_empty());
}

#[test]
fn parse_buckets_accepts_ascii_digits_only() {
    let line = "kBucketTable [(1, \u{0663}, 20), (2, 4, 20), (\u{FF13}, 1, 20)]";
    assert_eq!(
        parse_buckets(line),
        vec![RoutingBucketSample::new(2, 4, 20).unwrap()]
    );
}

#[test]
fn parse_buckets_drops_triples_over_capacity() {
    let buckets = parse_buckets("(1, 21, 20) (2, 3, 20) (3, 1, 0)");
    assert_eq!(buckets, vec![RoutingBucketSample::new(2, 3, 20).unwrap()]);
}

#[test]
fn parse_buckets_drops_overflowing_numbers() {
    let buckets = parse_buckets("(99999999999, 3, 20) (1, 4, 20)");
    assert_eq!(buckets, vec![RoutingBucketSample::new(1, 4, 20).unwrap()]);
}

#[test]
fn estimate_line_without_triples_is_self_only() {
    let estimator = KBucketEstimator::default();
    assert_eq!(estimator.estimate_line("kBucketTable: []"), NodeEstimate::SELF_ONLY);
    assert_eq!(estimator.estimate_line("garbage"), NodeEstimate::new(1));
}

#[test]
fn estimate_mixes_partial_and_full_buckets() {
    let estimator = KBucketEstimator::default();
    // partial = 5 + 7 = 12, two full buckets: (12 + 1) * 4
    let line = line_of(&[(0, 5, 20), (1, 20, 20), (2, 7, 20), (3, 20, 20)]);
    assert_eq!(estimator.estimate_line(&line).get(), 52);
}

#[test]
fn estimate_honours_configured_full_bucket_size() {
    let estimator = KBucketEstimator::new(8);
    let line = line_of(&[(0, 8, 8), (1, 3, 8)]);
    assert_eq!(estimator.estimate_line(&line).get(), 8);
}

#[test]
fn estimate_saturates_instead_of_overflowing() {
    let estimator = KBucketEstimator::default();
    let triples: Vec<(u32, u32, u32)> = (0..70).map(|d| (d, 20, 20)).collect();
    assert_eq!(estimator.estimate_line(&line_of(&triples)).get(), u64::MAX);
}

#[test]
fn node_estimate_never_below_one() {
    assert_eq!(NodeEstimate::new(0).get(), 1);
    assert_eq!(u64::from(NodeEstimate::new(42)), 42);
    assert_eq!(NodeEstimate::new(42).to_string(), "42");
}

proptest! {
    #[test]
    fn no_full_buckets_estimate_is_one_plus_sum(
        occupants in prop::collection::vec(0u32..20, 0..40)
    ) {
        let triples: Vec<(u32, u32, u32)> = occupants
            .iter()
            .enumerate()
            .map(|(d, &o)| (d as u32, o, 20))
            .collect();
        let expected = 1 + occupants.iter().map(|&o| u64::from(o)).sum::<u64>();
        let estimate = KBucketEstimator::default().estimate_line(&line_of(&triples));
        prop_assert_eq!(estimate.get(), expected);
    }

    #[test]
    fn single_full_bucket_alone_estimates_two(depth in 0u32..256) {
        let estimate = KBucketEstimator::default().estimate_line(&line_of(&[(depth, 20, 20)]));
        prop_assert_eq!(estimate.get(), 2);
    }

    #[test]
    fn estimate_is_partial_plus_self_times_power_of_two(
        full in 0u32..=3,
        occupants in prop::collection::vec(0u32..20, 0..30),
        seed in any::<u64>(),
    ) {
        let mut triples: Vec<(u32, u32, u32)> = occupants
            .iter()
            .enumerate()
            .map(|(d, &o)| (d as u32, o, 20))
            .collect();
        // Full buckets land at arbitrary positions; order must not matter.
        for i in 0..full {
            let at = (seed.rotate_left(i * 7) as usize) % (triples.len() + 1);
            triples.insert(at, (100 + i, 20, 20));
        }
        let p: u64 = occupants.iter().map(|&o| u64::from(o)).sum();
        let estimate = KBucketEstimator::default().estimate_line(&line_of(&triples));
        prop_assert_eq!(estimate.get(), (p + 1) * 2u64.pow(full));
    }
}
