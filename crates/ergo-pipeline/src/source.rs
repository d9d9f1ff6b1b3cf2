//! Frame sources.
//!
//! A source is a lazy, single-pass iterator of raw frames. Errors confined to
//! one input unit are reported as [`Error::MalformedFrame`]; anything else
//! ends the source.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use csv::{ReaderBuilder, StringRecord, Trim};
use ergo_core::{Error, PoseFrame, Result};

use crate::adapter::{DetectorFrame, TabularLayout, TabularRow};

/// Raw input unit before adaptation
#[derive(Debug, Clone)]
pub enum RawFrame {
    /// Already canonical
    Canonical(PoseFrame),
    Detector(DetectorFrame),
    Tabular(TabularRow),
}

/// Input formats recognized by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Tabular,
    DetectorJsonLines,
    Video,
}

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "webm", "m4v"];

impl InputKind {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "csv" => Ok(InputKind::Tabular),
            "jsonl" | "ndjson" | "json" => Ok(InputKind::DetectorJsonLines),
            e if VIDEO_EXTENSIONS.contains(&e) => Ok(InputKind::Video),
            _ => Err(Error::UnsupportedInput(format!(
                "cannot infer input format of {}",
                path.display()
            ))),
        }
    }
}

pub type BoxedSource = Box<dyn Iterator<Item = Result<RawFrame>>>;

/// Open `path` as a frame source chosen by its extension
pub fn open_source(path: &Path) -> Result<BoxedSource> {
    match InputKind::from_path(path)? {
        InputKind::Tabular => Ok(Box::new(CsvFrameSource::new(File::open(path)?)?)),
        InputKind::DetectorJsonLines => {
            Ok(Box::new(JsonLinesSource::new(BufReader::new(File::open(path)?))))
        }
        InputKind::Video => Err(Error::UnsupportedInput(format!(
            "{} is a video; run a pose detector first and pass its landmark export (.jsonl)",
            path.display()
        ))),
    }
}

/// Tabular motion-capture export with `<JointName>.x/.y/.z` columns
pub struct CsvFrameSource<R: Read> {
    reader: csv::Reader<R>,
    layout: Arc<TabularLayout>,
    position: u64,
    done: bool,
}

impl<R: Read> CsvFrameSource<R> {
    pub fn new(input: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .trim(Trim::Headers)
            .from_reader(input);

        let layout = TabularLayout::from_headers(reader.headers()?.iter());
        if layout.mapped_joints().next().is_none() {
            tracing::warn!("no landmark columns recognized; every frame will be empty");
        }

        Ok(Self {
            reader,
            layout: Arc::new(layout),
            position: 0,
            done: false,
        })
    }

    pub fn layout(&self) -> &TabularLayout {
        &self.layout
    }
}

impl<R: Read> Iterator for CsvFrameSource<R> {
    type Item = Result<RawFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut record = StringRecord::new();
        let index = self.position;
        match self.reader.read_record(&mut record) {
            Ok(true) => {
                self.position += 1;
                Some(Ok(RawFrame::Tabular(TabularRow {
                    layout: Arc::clone(&self.layout),
                    record,
                })))
            }
            Ok(false) => {
                self.done = true;
                None
            }
            Err(e) if e.is_io_error() => {
                self.done = true;
                Some(Err(e.into()))
            }
            Err(e) => {
                self.position += 1;
                Some(Err(Error::MalformedFrame {
                    index,
                    reason: e.to_string(),
                }))
            }
        }
    }
}

/// Detector export: one JSON object per line, blank lines ignored
pub struct JsonLinesSource<R: BufRead> {
    lines: std::io::Lines<R>,
    position: u64,
    done: bool,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(input: R) -> Self {
        Self {
            lines: input.lines(),
            position: 0,
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for JsonLinesSource<R> {
    type Item = Result<RawFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
            };
            if line.trim().is_empty() {
                continue;
            }

            let index = self.position;
            self.position += 1;
            return Some(
                serde_json::from_str::<DetectorFrame>(&null_non_finite(&line))
                    .map(RawFrame::Detector)
                    .map_err(|e| Error::MalformedFrame {
                        index,
                        reason: e.to_string(),
                    }),
            );
        }
        None
    }
}

const NON_FINITE_TOKENS: [&str; 3] = ["-Infinity", "Infinity", "NaN"];

/// Python's `json` module writes non-finite floats as bare `NaN` and
/// `Infinity` tokens. Replace them with `null` outside string literals so
/// the affected landmark reads as absent instead of failing the line.
fn null_non_finite(line: &str) -> Cow<'_, str> {
    if !NON_FINITE_TOKENS[1..].iter().any(|t| line.contains(t)) {
        return Cow::Borrowed(line);
    }

    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = rest.chars().next() {
        if !in_string {
            if let Some(token) = NON_FINITE_TOKENS.iter().find(|t| rest.starts_with(**t)) {
                out.push_str("null");
                rest = &rest[token.len()..];
                continue;
            }
        }

        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
        }

        out.push(c);
        rest = &rest[c.len_utf8()..];
    }

    Cow::Owned(out)
}
