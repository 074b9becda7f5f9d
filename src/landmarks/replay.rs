//! Recorded tracker stream replay
//!
//! Reads one JSON observation per line, e.g.
//! `{"hand": {"handedness": "Right", "confidence": 0.93, "landmarks": [[x, y, z], ...]}}`
//! or `{"hand": null}` for a frame without a hand. Blank lines and lines
//! starting with `#` are skipped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::{LandmarkSource, Observation, SourceError};

/// Landmark source backed by a JSON-lines reader (file, pipe or stdin)
pub struct JsonLinesSource<R: BufRead> {
    reader: R,
    label: String,
    line_number: usize,
    buffer: String,
}

/// Name that selects stdin instead of a file
pub const STDIN_INPUT: &str = "-";

impl JsonLinesSource<Box<dyn BufRead>> {
    /// Open a recording on disk
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path).map_err(SourceError::Open)?;
        Ok(Self::new(Box::new(BufReader::new(file)), path.display().to_string()))
    }

    /// [`STDIN_INPUT`] reads a live stream from stdin; anything else is a recording path
    pub fn from_input(input: &str) -> Result<Self, SourceError> {
        if input == STDIN_INPUT {
            return Ok(Self::new(Box::new(std::io::stdin().lock()), "stdin"));
        }
        Self::open(Path::new(input))
    }
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R, label: impl Into<String>) -> Self {
        Self {
            reader,
            label: label.into(),
            line_number: 0,
            buffer: String::new(),
        }
    }

    /// Number of lines consumed so far
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}

impl<R: BufRead> LandmarkSource for JsonLinesSource<R> {
    fn next_frame(&mut self) -> Result<Option<Observation>, SourceError> {
        loop {
            self.buffer.clear();
            if self.reader.read_line(&mut self.buffer)? == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let line = self.buffer.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let observation = serde_json::from_str::<Observation>(line).map_err(|source| {
                SourceError::Parse {
                    line: self.line_number,
                    source,
                }
            })?;
            return Ok(Some(observation));
        }
    }

    fn describe(&self) -> String {
        format!("replay:{}", self.label)
    }
}
