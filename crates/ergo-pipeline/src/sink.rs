//! Append-only persistence of per-frame results.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use ergo_core::{Error, Result};
use ergo_rula::{ActionLevel, RiskAssessment};
use serde::{Deserialize, Serialize};

pub const FRAME_COLUMN: &str = "Frame";
pub const SCORE_COLUMN: &str = "Ergonomic Risk Score";
pub const ACTION_COLUMN: &str = "Action Level";

/// Output settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Write the `Frame` column
    pub include_frame_index: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            include_frame_index: true,
        }
    }
}

/// One persisted result row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub frame: u64,
    pub score: u32,
    pub action: ActionLevel,
}

impl From<&RiskAssessment> for ResultRecord {
    fn from(a: &RiskAssessment) -> Self {
        Self {
            frame: a.frame_index,
            score: a.score,
            action: a.action,
        }
    }
}

/// Destination for result records. Appends only; records arrive in frame order.
pub trait RecordSink {
    fn append(&mut self, record: &ResultRecord) -> Result<()>;

    /// Flush buffered records
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

impl RecordSink for Vec<ResultRecord> {
    fn append(&mut self, record: &ResultRecord) -> Result<()> {
        self.push(record.clone());
        Ok(())
    }
}

fn persistence(e: impl std::fmt::Display) -> Error {
    Error::Persistence(e.to_string())
}

/// CSV record store
pub struct CsvRecordSink<W: Write> {
    writer: csv::Writer<W>,
    config: OutputConfig,
}

fn column_names(config: OutputConfig) -> &'static [&'static str] {
    if config.include_frame_index {
        &[FRAME_COLUMN, SCORE_COLUMN, ACTION_COLUMN]
    } else {
        &[SCORE_COLUMN, ACTION_COLUMN]
    }
}

/// Header of an existing store must match the columns about to be written
fn check_columns(path: &Path, expected: &[&str]) -> Result<()> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(persistence)?;

    let mut header = csv::StringRecord::new();
    let found = reader.read_record(&mut header).map_err(persistence)?;
    if found && header.iter().map(str::trim).eq(expected.iter().copied()) {
        return Ok(());
    }

    Err(Error::Persistence(format!(
        "{} has columns [{}], expected [{}]",
        path.display(),
        header.iter().collect::<Vec<_>>().join(", "),
        expected.join(", ")
    )))
}

fn ends_with_newline(file: &mut File) -> std::io::Result<bool> {
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

impl CsvRecordSink<File> {
    /// Open `path` for appending, creating it if needed.
    ///
    /// The header row is written only when the file is new or empty. An
    /// existing store must carry the same columns, and a missing final line
    /// terminator is restored before the first new record.
    pub fn append_to(path: &Path, config: OutputConfig) -> Result<Self> {
        let mut file = OpenOptions::new()
            .read(true)
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| persistence(format!("cannot open {}: {e}", path.display())))?;

        let is_empty = file.metadata().map_err(persistence)?.len() == 0;
        if !is_empty {
            check_columns(path, column_names(config))?;
            tracing::info!(path = %path.display(), "appending to existing result store");

            if !ends_with_newline(&mut file).map_err(persistence)? {
                file.write_all(b"\n").map_err(persistence)?;
            }
        }
        Self::new(file, config, is_empty)
    }
}

impl<W: Write> CsvRecordSink<W> {
    pub fn new(inner: W, config: OutputConfig, write_header: bool) -> Result<Self> {
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(inner);
        let mut sink = Self { writer, config };

        if write_header {
            sink.writer
                .write_record(column_names(config))
                .map_err(persistence)?;
        }

        Ok(sink)
    }

    /// Flush and return the underlying writer
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| persistence(e.error()))
    }
}

impl<W: Write> RecordSink for CsvRecordSink<W> {
    fn append(&mut self, record: &ResultRecord) -> Result<()> {
        let score = record.score.to_string();
        let action = record.action.label();

        let result = if self.config.include_frame_index {
            let frame = record.frame.to_string();
            self.writer.write_record([frame.as_str(), score.as_str(), action])
        } else {
            self.writer.write_record([score.as_str(), action])
        };
        result.map_err(persistence)
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush().map_err(persistence)
    }
}
