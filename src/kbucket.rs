// k-bucket table parsing and network size estimation.
//
// Grammar of one bucket entry, as nodes print it inside a `kBucketTable` line:
//   bucket := "(" depth ", " occupants ", " capacity ")"
// where each field is a run of ASCII digits. Everything else on the line is ignored.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{NodeEstimate, RoutingBucketSample};

/// Occupant count of a saturated bucket.
pub const DEFAULT_FULL_BUCKET_SIZE: u32 = 20;

static BUCKET_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(([0-9]+), ([0-9]+), ([0-9]+)\)").expect("bucket pattern is a valid regex")
});

/// Extract every bucket triple from `line`, in order of appearance.
/// Triples that overflow `u32` or have more occupants than capacity are dropped.
pub fn parse_buckets(line: &str) -> Vec<RoutingBucketSample> {
    BUCKET_PATTERN
        .captures_iter(line)
        .filter_map(|caps| {
            let depth = caps[1].parse().ok()?;
            let occupants = caps[2].parse().ok()?;
            let capacity = caps[3].parse().ok()?;
            RoutingBucketSample::new(depth, occupants, capacity)
        })
        .collect()
}

/// Turns a routing-table snapshot into a network size estimate.
///
/// Non-full buckets contribute their occupants directly. Each full bucket is taken
/// to hide an unexplored subtree as large as everything counted so far, so it
/// doubles the estimate: `(partial_occupants + 1) * 2^full_buckets`.
#[derive(Debug, Clone, Copy)]
pub struct KBucketEstimator {
    full_bucket_size: u32,
}

impl Default for KBucketEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_FULL_BUCKET_SIZE)
    }
}

impl KBucketEstimator {
    pub fn new(full_bucket_size: u32) -> Self {
        Self { full_bucket_size }
    }

    pub fn estimate(&self, samples: &[RoutingBucketSample]) -> NodeEstimate {
        let mut partial_occupants: u64 = 0;
        let mut full_buckets: u32 = 0;
        for sample in samples {
            if sample.occupant_count == self.full_bucket_size {
                full_buckets += 1;
            } else {
                partial_occupants =
                    partial_occupants.saturating_add(u64::from(sample.occupant_count));
            }
        }
        let including_self = partial_occupants.saturating_add(1);
        let multiplier = 2u64.checked_pow(full_buckets).unwrap_or(u64::MAX);
        NodeEstimate::new(including_self.saturating_mul(multiplier))
    }

    /// Parse and estimate in one step. A line without triples estimates to 1.
    pub fn estimate_line(&self, line: &str) -> NodeEstimate {
        self.estimate(&parse_buckets(line))
    }
}
