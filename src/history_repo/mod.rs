// Append-only CSV history of trimmed averages.
// The header is written when the file is created (or found empty); rows are only ever appended.
// No inter-process locking: two concurrent runs can interleave their appends.

mod row;

pub use row::RowError;

use crate::models::{AggregateRecord, HistorySeries, SeriesSummary};
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{instrument, warn};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("creating history directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("writing history {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("reading history {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub struct HistoryRepo {
    path: PathBuf,
}

impl HistoryRepo {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[instrument(skip(self, record), fields(repo = "history", operation = "append", path = %self.path.display()))]
    pub fn append(&self, record: &AggregateRecord) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(write_err)?;
        let len = file.metadata().map_err(write_err)?.len();

        let mut out = String::new();
        if len == 0 {
            out.push_str(row::HEADER);
            out.push('\n');
        } else if !ends_with_newline(&mut file).map_err(write_err)? {
            // A previous write was cut short; keep its fragment on its own line.
            out.push('\n');
        }
        out.push_str(&row::encode(record));
        out.push('\n');
        file.write_all(out.as_bytes()).map_err(write_err)?;
        Ok(())
    }

    /// Whole series in file order. A missing file is an empty series; malformed rows are
    /// logged and skipped.
    #[instrument(skip(self), fields(repo = "history", operation = "read_all", path = %self.path.display()))]
    pub fn read_all(&self) -> Result<HistorySeries, StoreError> {
        let read_err = |source| StoreError::Read {
            path: self.path.clone(),
            source,
        };
        let file = match std::fs::File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(HistorySeries::default());
            }
            Err(e) => return Err(read_err(e)),
        };

        let mut series = HistorySeries::default();
        let mut reader = BufReader::new(file);
        let mut buf = Vec::new();
        let mut line_no = 0usize;
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).map_err(read_err)? == 0 {
                break;
            }
            line_no += 1;
            let line = match std::str::from_utf8(&buf) {
                Ok(line) => line,
                Err(e) => {
                    warn!(line = line_no, error = %e, "skipping history row with invalid UTF-8");
                    series.skipped_rows += 1;
                    continue;
                }
            };
            if line.trim().is_empty() || (line_no == 1 && row::is_header(line)) {
                continue;
            }
            match row::decode(line) {
                Ok(record) => {
                    series.timestamps.push(record.timestamp);
                    series.values.push(record.average_nodes);
                }
                Err(e) => {
                    warn!(line = line_no, error = %e, "skipping malformed history row");
                    series.skipped_rows += 1;
                }
            }
        }
        Ok(series)
    }

    /// Min, max and latest recorded average; `None` when nothing has been recorded.
    pub fn summary(&self) -> Result<Option<SeriesSummary>, StoreError> {
        Ok(self.read_all()?.summary())
    }
}

fn ends_with_newline(file: &mut std::fs::File) -> std::io::Result<bool> {
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}
