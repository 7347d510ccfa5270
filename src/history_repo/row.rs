// CSV row codec: `timestamp,average_nodes`.
// Timestamps are RFC 3339 with microseconds and a `+00:00` offset; older files written
// with other offsets or precisions still parse and are normalised to UTC.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::models::AggregateRecord;

pub(super) const HEADER: &str = "timestamp,average_nodes";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RowError {
    #[error("expected 2 fields, got {0}")]
    FieldCount(usize),
    #[error("bad timestamp {value:?}: {reason}")]
    Timestamp { value: String, reason: String },
    #[error("bad average_nodes {0:?}")]
    Value(String),
}

pub(super) fn encode(record: &AggregateRecord) -> String {
    format!(
        "{},{}",
        record
            .timestamp
            .to_rfc3339_opts(SecondsFormat::Micros, false),
        record.average_nodes
    )
}

pub(super) fn is_header(line: &str) -> bool {
    line.trim() == HEADER
}

pub(super) fn decode(line: &str) -> Result<AggregateRecord, RowError> {
    let fields: Vec<&str> = line.trim().split(',').collect();
    let [ts, value] = fields.as_slice() else {
        return Err(RowError::FieldCount(fields.len()));
    };
    let timestamp = DateTime::parse_from_rfc3339(ts.trim())
        .map_err(|e| RowError::Timestamp {
            value: ts.to_string(),
            reason: e.to_string(),
        })?
        .with_timezone(&Utc);
    let average_nodes: f64 = value
        .trim()
        .parse()
        .map_err(|_| RowError::Value(value.to_string()))?;
    if !average_nodes.is_finite() {
        return Err(RowError::Value(value.to_string()));
    }
    Ok(AggregateRecord::new(timestamp, average_nodes))
}
