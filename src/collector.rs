// One collection run: scan node logs, estimate per node, aggregate, record, render.
// Runs once per invocation; scheduling is left to the caller (cron, systemd timer).

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, instrument, warn};

use crate::aggregator::{AggregateError, TrimmedMean};
use crate::config::{AppConfig, GaugeBounds, GaugeConfig};
use crate::gauge::{GaugeReading, GaugeRenderer, RenderError};
use crate::history_repo::HistoryRepo;
use crate::kbucket::KBucketEstimator;
use crate::log_scanner::LogScanner;
use crate::models::{AggregateRecord, NodeEstimate};

#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("node base path does not exist: {}", .0.display())]
    BasePathMissing(PathBuf),
    #[error("listing node directories in {path}: {source}")]
    ListNodes {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no node data found to calculate ({nodes_scanned} node directories scanned)")]
    NoNodeData { nodes_scanned: usize },
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}

/// What happened to one node directory during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeOutcome {
    Estimated(NodeEstimate),
    MissingLog,
    Unreadable(String),
    NoRoutingTable,
}

impl NodeOutcome {
    pub fn estimate(&self) -> Option<NodeEstimate> {
        match self {
            NodeOutcome::Estimated(e) => Some(*e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeReport {
    pub node: String,
    pub outcome: NodeOutcome,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub nodes: Vec<NodeReport>,
    pub record: AggregateRecord,
    /// Percentage dropped from each end before averaging.
    pub trim_percent: f64,
    pub recorded: bool,
    pub rendered: bool,
}

impl RunReport {
    pub fn estimates(&self) -> Vec<NodeEstimate> {
        self.nodes.iter().filter_map(|n| n.outcome.estimate()).collect()
    }
}

pub struct Collector {
    base_path: PathBuf,
    log_file_name: String,
    scanner: LogScanner,
    estimator: KBucketEstimator,
    aggregator: TrimmedMean,
    history: HistoryRepo,
    renderer: GaugeRenderer,
    gauge: GaugeConfig,
    gauge_path: PathBuf,
}

impl Collector {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            base_path: config.base_path(),
            log_file_name: config.nodes.log_file_name.clone(),
            scanner: LogScanner::new(config.nodes.marker.clone(), config.nodes.lookback_lines),
            estimator: KBucketEstimator::new(config.estimator.full_bucket_size),
            aggregator: TrimmedMean::new(
                config.estimator.trim_fraction,
                config.estimator.min_samples,
            ),
            history: HistoryRepo::new(config.history_path()),
            renderer: GaugeRenderer::new(config.gauge.width, config.gauge.height),
            gauge: config.gauge.clone(),
            gauge_path: config.gauge_path(),
        }
    }

    pub fn history(&self) -> &HistoryRepo {
        &self.history
    }

    pub fn run(&self) -> Result<RunReport, CollectError> {
        self.run_at(Utc::now())
    }

    /// Full run stamped with `now`. Nothing is written unless aggregation succeeds.
    #[instrument(skip(self), fields(base_path = %self.base_path.display()))]
    pub fn run_at(&self, now: DateTime<Utc>) -> Result<RunReport, CollectError> {
        if !self.base_path.is_dir() {
            return Err(CollectError::BasePathMissing(self.base_path.clone()));
        }

        let nodes = self.scan_nodes()?;
        let estimates: Vec<NodeEstimate> =
            nodes.iter().filter_map(|n| n.outcome.estimate()).collect();
        if estimates.is_empty() {
            return Err(CollectError::NoNodeData {
                nodes_scanned: nodes.len(),
            });
        }
        info!(
            nodes_scanned = nodes.len(),
            estimates = estimates.len(),
            "node estimates collected"
        );

        let average = self.aggregator.aggregate(&estimates)?;
        let record = AggregateRecord::new(now, average);

        let recorded = match self.history.append(&record) {
            Ok(()) => {
                info!(path = %self.history.path().display(), "Data logged");
                true
            }
            Err(e) => {
                error!(error = %e, operation = "append_history", "Error writing history");
                false
            }
        };

        let rendered = self.gauge.enabled && self.render_gauge(average);

        Ok(RunReport {
            nodes,
            record,
            trim_percent: (self.aggregator.trim_fraction() * 10_000.0).round() / 100.0,
            recorded,
            rendered,
        })
    }

    fn scan_nodes(&self) -> Result<Vec<NodeReport>, CollectError> {
        let list_err = |source| CollectError::ListNodes {
            path: self.base_path.clone(),
            source,
        };
        let mut dirs = Vec::new();
        for entry in std::fs::read_dir(&self.base_path).map_err(list_err)? {
            let path = entry.map_err(list_err)?.path();
            if path.is_dir() {
                dirs.push(path);
            }
        }
        dirs.sort();

        Ok(dirs
            .iter()
            .map(|dir| NodeReport {
                node: dir
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                outcome: self.scan_node(dir),
            })
            .collect())
    }

    fn scan_node(&self, dir: &Path) -> NodeOutcome {
        let log_path = dir.join(&self.log_file_name);
        if !log_path.is_file() {
            warn!(node = %dir.display(), "Log file not found for node");
            return NodeOutcome::MissingLog;
        }
        match self.scanner.latest_marker_line(&log_path) {
            Ok(Some(line)) => {
                let estimate = self.estimator.estimate_line(&line);
                debug!(node = %dir.display(), %estimate, "node estimate");
                NodeOutcome::Estimated(estimate)
            }
            Ok(None) => {
                warn!(
                    node = %dir.display(),
                    marker = self.scanner.marker(),
                    lookback_lines = self.scanner.lookback_lines(),
                    "No routing table data in recent log lines"
                );
                NodeOutcome::NoRoutingTable
            }
            Err(e) => {
                warn!(node = %dir.display(), error = %e, "Error reading log file");
                NodeOutcome::Unreadable(e.to_string())
            }
        }
    }

    fn render_gauge(&self, average: f64) -> bool {
        let reading = match self.gauge_reading(average) {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, operation = "render_gauge", "Gauge skipped");
                return false;
            }
        };
        match self.renderer.render(&reading, &self.gauge_path) {
            Ok(()) => {
                info!(path = %self.gauge_path.display(), "Gauge written");
                true
            }
            Err(e) => {
                warn!(error = %e, operation = "render_gauge", "Gauge rendering failed");
                false
            }
        }
    }

    fn gauge_reading(&self, average: f64) -> Result<GaugeReading, RenderError> {
        let fixed = || GaugeReading::new(average, self.gauge.scale_min, self.gauge.scale_max);
        match self.gauge.bounds {
            GaugeBounds::Fixed => fixed(),
            GaugeBounds::History => match self.history.summary() {
                Ok(Some(summary)) => {
                    let min = summary.min.min(average).max(0.0);
                    let max = summary.max.max(average);
                    GaugeReading::new(average, min, max)
                }
                Ok(None) => fixed(),
                Err(e) => {
                    warn!(error = %e, "history unavailable for gauge bounds; using fixed scale");
                    fixed()
                }
            },
        }
    }
}
