// Domain models: routing-table samples, per-node estimates, persisted records

mod bucket;
mod record;

pub use bucket::{NodeEstimate, RoutingBucketSample};
pub use record::{AggregateRecord, HistorySeries, SeriesSummary};
