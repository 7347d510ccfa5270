// Persisted time-series models

use chrono::{DateTime, Utc};

/// One row of the node-count history: when it was sampled and the trimmed average.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateRecord {
    pub timestamp: DateTime<Utc>,
    pub average_nodes: f64,
}

impl AggregateRecord {
    pub fn new(timestamp: DateTime<Utc>, average_nodes: f64) -> Self {
        Self {
            timestamp,
            average_nodes,
        }
    }
}

/// Full history read back from disk, as parallel sequences in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistorySeries {
    pub timestamps: Vec<DateTime<Utc>>,
    pub values: Vec<f64>,
    /// Rows that could not be parsed and were left out.
    pub skipped_rows: usize,
}

impl HistorySeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = AggregateRecord> + '_ {
        self.timestamps
            .iter()
            .zip(&self.values)
            .map(|(ts, v)| AggregateRecord::new(*ts, *v))
    }

    /// Min, max and most recent value; `None` for an empty series.
    pub fn summary(&self) -> Option<SeriesSummary> {
        let latest = *self.values.last()?;
        let min = self.values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(SeriesSummary { min, max, latest })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesSummary {
    pub min: f64,
    pub max: f64,
    pub latest: f64,
}
