// Bounded reverse search for the latest routing-table line in a node log.
//
// Only the last `lookback_lines` lines are kept while reading, so memory stays bounded
// on large logs. A marker line older than that window is not found.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::instrument;

pub const DEFAULT_MARKER: &str = "kBucketTable";
pub const DEFAULT_LOOKBACK_LINES: usize = 2000;

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("reading log {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct LogScanner {
    marker: String,
    lookback_lines: usize,
}

impl Default for LogScanner {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER, DEFAULT_LOOKBACK_LINES)
    }
}

impl LogScanner {
    pub fn new(marker: impl Into<String>, lookback_lines: usize) -> Self {
        Self {
            marker: marker.into(),
            lookback_lines,
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn lookback_lines(&self) -> usize {
        self.lookback_lines
    }

    /// Most recent line containing the marker within the lookback window, trimmed.
    /// `Ok(None)` when the window holds no such line.
    #[instrument(skip(self), fields(operation = "latest_marker_line"))]
    pub fn latest_marker_line(&self, path: &Path) -> Result<Option<String>, ScanError> {
        let io_err = |source| ScanError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(io_err)?;
        let tail = self.read_tail(BufReader::new(file)).map_err(io_err)?;
        Ok(tail
            .iter()
            .rev()
            .find(|line| line.contains(&self.marker))
            .map(|line| line.trim().to_string()))
    }

    fn read_tail<R: BufRead>(&self, mut reader: R) -> std::io::Result<VecDeque<String>> {
        let mut tail = VecDeque::with_capacity(self.lookback_lines.min(4096));
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            if self.lookback_lines == 0 {
                continue;
            }
            if tail.len() == self.lookback_lines {
                tail.pop_front();
            }
            tail.push_back(String::from_utf8_lossy(&buf).into_owned());
        }
        Ok(tail)
    }
}
