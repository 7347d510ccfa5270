use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::aggregator::{DEFAULT_MIN_SAMPLES, DEFAULT_TRIM_FRACTION};
use crate::gauge::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::kbucket::DEFAULT_FULL_BUCKET_SIZE;
use crate::log_scanner::{DEFAULT_LOOKBACK_LINES, DEFAULT_MARKER};

/// Every field has a default, so an empty file (or no file at all) is a valid config.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub nodes: NodesConfig,
    pub estimator: EstimatorConfig,
    pub history: HistoryConfig,
    pub gauge: GaugeConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NodesConfig {
    /// Directory holding one subdirectory per node instance.
    pub base_path: String,
    pub log_file_name: String,
    /// Substring that marks a routing-table line.
    pub marker: String,
    /// How many trailing log lines to search.
    pub lookback_lines: usize,
}

impl Default for NodesConfig {
    fn default() -> Self {
        Self {
            base_path: "/var/log/safenode/".into(),
            log_file_name: "safenode.log".into(),
            marker: DEFAULT_MARKER.into(),
            lookback_lines: DEFAULT_LOOKBACK_LINES,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    pub full_bucket_size: u32,
    /// Fraction dropped from each end before averaging.
    pub trim_fraction: f64,
    pub min_samples: usize,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            full_bucket_size: DEFAULT_FULL_BUCKET_SIZE,
            trim_fraction: DEFAULT_TRIM_FRACTION,
            min_samples: DEFAULT_MIN_SAMPLES,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub path: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: "~/node_data.csv".into(),
        }
    }
}

/// Where the gauge takes its lower mark and ceiling from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GaugeBounds {
    /// `scale_min` / `scale_max` from this config.
    #[default]
    Fixed,
    /// Historical min/max of the recorded series.
    History,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GaugeConfig {
    pub enabled: bool,
    /// `.svg` renders SVG, anything else PNG. Relative paths resolve against the working directory.
    pub output_path: String,
    pub width: u32,
    pub height: u32,
    pub bounds: GaugeBounds,
    pub scale_min: f64,
    pub scale_max: f64,
}

impl Default for GaugeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            output_path: "average_nodes_over_time.png".into(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            bounds: GaugeBounds::Fixed,
            scale_min: 0.0,
            scale_max: 20_000.0,
        }
    }
}

impl AppConfig {
    /// `CONFIG_FILE` if set (must exist), else `config.toml` if present, else defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = match std::env::var("CONFIG_FILE") {
            Ok(p) => p,
            Err(_) if Path::new("config.toml").exists() => "config.toml".into(),
            Err(_) => {
                let config = Self::default();
                config.validate()?;
                return Ok(config);
            }
        };
        let s = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("reading config {}: {}", path, e))?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.nodes.base_path.is_empty(),
            "nodes.base_path must be non-empty"
        );
        anyhow::ensure!(
            !self.nodes.log_file_name.is_empty(),
            "nodes.log_file_name must be non-empty"
        );
        anyhow::ensure!(
            !self.nodes.marker.is_empty(),
            "nodes.marker must be non-empty"
        );
        anyhow::ensure!(
            self.nodes.lookback_lines > 0,
            "nodes.lookback_lines must be > 0, got {}",
            self.nodes.lookback_lines
        );
        anyhow::ensure!(
            self.estimator.full_bucket_size > 0,
            "estimator.full_bucket_size must be > 0, got {}",
            self.estimator.full_bucket_size
        );
        anyhow::ensure!(
            (0.0..=0.5).contains(&self.estimator.trim_fraction),
            "estimator.trim_fraction must be between 0 and 0.5, got {}",
            self.estimator.trim_fraction
        );
        anyhow::ensure!(
            self.estimator.min_samples > 0,
            "estimator.min_samples must be > 0, got {}",
            self.estimator.min_samples
        );
        anyhow::ensure!(
            !self.history.path.is_empty(),
            "history.path must be non-empty"
        );
        anyhow::ensure!(
            !self.gauge.output_path.is_empty(),
            "gauge.output_path must be non-empty"
        );
        anyhow::ensure!(
            self.gauge.width > 0 && self.gauge.height > 0,
            "gauge.width and gauge.height must be > 0, got {}x{}",
            self.gauge.width,
            self.gauge.height
        );
        anyhow::ensure!(
            self.gauge.scale_min >= 0.0 && self.gauge.scale_min < self.gauge.scale_max,
            "gauge.scale_min must be >= 0 and below gauge.scale_max, got [{}, {}]",
            self.gauge.scale_min,
            self.gauge.scale_max
        );
        Ok(())
    }

    pub fn base_path(&self) -> PathBuf {
        expand_home(&self.nodes.base_path)
    }

    pub fn history_path(&self) -> PathBuf {
        expand_home(&self.history.path)
    }

    pub fn gauge_path(&self) -> PathBuf {
        expand_home(&self.gauge.output_path)
    }
}

/// Replace a leading `~` with the user's home directory. Left as-is when there is no home.
pub fn expand_home(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some("") => "",
        Some(rest) if rest.starts_with('/') => &rest[1..],
        _ => return PathBuf::from(path),
    };
    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(path),
    }
}
