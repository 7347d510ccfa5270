// Outlier-trimmed mean over per-node estimates.

use crate::models::NodeEstimate;

pub const DEFAULT_TRIM_FRACTION: f64 = 0.05;
pub const DEFAULT_MIN_SAMPLES: usize = 20;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AggregateError {
    #[error("no node estimates to aggregate")]
    NoSamples,
    #[error("insufficient data: {count} estimates, at least {required} needed to trim both ends")]
    InsufficientData { count: usize, required: usize },
    #[error("no data left after excluding {trimmed} estimates from each end of {count}")]
    EmptyAfterTrim { count: usize, trimmed: usize },
}

#[derive(Debug, Clone, Copy)]
pub struct TrimmedMean {
    trim_fraction: f64,
    min_samples: usize,
}

impl Default for TrimmedMean {
    fn default() -> Self {
        Self::new(DEFAULT_TRIM_FRACTION, DEFAULT_MIN_SAMPLES)
    }
}

impl TrimmedMean {
    pub fn new(trim_fraction: f64, min_samples: usize) -> Self {
        Self {
            trim_fraction,
            min_samples,
        }
    }

    pub fn trim_fraction(&self) -> f64 {
        self.trim_fraction
    }

    /// Number of values dropped from each end for a population of `n`.
    pub fn trim_count(&self, n: usize) -> usize {
        (self.trim_fraction * n as f64).floor() as usize
    }

    /// Sort, drop `floor(trim_fraction * n)` from each end, average the rest.
    /// Below `min_samples` this refuses rather than falling back to a plain mean.
    pub fn aggregate(&self, estimates: &[NodeEstimate]) -> Result<f64, AggregateError> {
        let count = estimates.len();
        if count == 0 {
            return Err(AggregateError::NoSamples);
        }
        if count < self.min_samples {
            return Err(AggregateError::InsufficientData {
                count,
                required: self.min_samples,
            });
        }

        let mut sorted: Vec<u64> = estimates.iter().map(|e| e.get()).collect();
        sorted.sort_unstable();

        let trimmed = self.trim_count(count);
        if trimmed * 2 >= count {
            return Err(AggregateError::EmptyAfterTrim { count, trimmed });
        }
        let kept = &sorted[trimmed..count - trimmed];
        let sum: u128 = kept.iter().map(|&v| u128::from(v)).sum();
        Ok(sum as f64 / kept.len() as f64)
    }
}
