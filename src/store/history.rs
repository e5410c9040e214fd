use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::HistoryError;

pub const HISTORY_HEADER: [&str; 3] = ["word", "correct", "timestamp"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryEvent {
    pub word: String,
    pub correct: bool,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEvent {
    pub fn now(word: &str, correct: bool) -> Self {
        Self {
            word: word.to_string(),
            correct,
            timestamp: Utc::now(),
        }
    }
}

/// One row of the history file. `correct` is stored as 0/1.
#[derive(Debug, Serialize, Deserialize)]
struct HistoryRecord {
    word: String,
    correct: u8,
    timestamp: DateTime<Utc>,
}

impl From<&HistoryEvent> for HistoryRecord {
    fn from(event: &HistoryEvent) -> Self {
        Self {
            word: event.word.clone(),
            correct: u8::from(event.correct),
            timestamp: event.timestamp,
        }
    }
}

impl From<HistoryRecord> for HistoryEvent {
    fn from(record: HistoryRecord) -> Self {
        Self {
            word: record.word,
            correct: record.correct != 0,
            timestamp: record.timestamp,
        }
    }
}

/// Append-only answer log. Implementations only need to support one writer.
pub trait HistoryLog {
    fn append(&mut self, event: &HistoryEvent) -> Result<(), HistoryError>;
    fn read_all(&self) -> Result<Vec<HistoryEvent>, HistoryError>;
    /// Remove every recorded event.
    fn clear(&mut self) -> Result<(), HistoryError>;
}

/// History stored as a delimited text file with a `word,correct,timestamp`
/// header line.
pub struct CsvHistoryLog {
    path: PathBuf,
}

impl CsvHistoryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_error(&self, source: std::io::Error) -> HistoryError {
        HistoryError::Write {
            path: self.path.clone(),
            source,
        }
    }

    /// Check what is already on disk before appending. A file with some
    /// other header is refused so it is not mixed with history rows.
    fn file_state(&self) -> Result<FileState, HistoryError> {
        let mut file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(FileState::Empty),
            Err(err) => return Err(self.write_error(err)),
        };
        let len = file.metadata().map_err(|e| self.write_error(e))?.len();
        if len == 0 {
            return Ok(FileState::Empty);
        }

        let mut first_line = String::new();
        BufReader::new(&file)
            .read_line(&mut first_line)
            .map_err(|e| HistoryError::read(&self.path, e))?;
        let header = first_line.trim_end_matches(['\r', '\n']);
        if header.split(',').ne(HISTORY_HEADER) {
            return Err(HistoryError::read(
                &self.path,
                format!("unexpected header {header:?}, refusing to append"),
            ));
        }

        let mut last = [0u8; 1];
        file.seek(SeekFrom::End(-1)).map_err(|e| self.write_error(e))?;
        file.read_exact(&mut last).map_err(|e| self.write_error(e))?;
        Ok(if last[0] == b'\n' {
            FileState::Terminated
        } else {
            FileState::Unterminated
        })
    }
}

enum FileState {
    Empty,
    Terminated,
    /// Last row was cut off mid-line.
    Unterminated,
}

impl HistoryLog for CsvHistoryLog {
    fn append(&mut self, event: &HistoryEvent) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.write_error(e))?;
        }
        let state = self.file_state()?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.write_error(e))?;
        if matches!(state, FileState::Unterminated) {
            file.write_all(b"\n").map_err(|e| self.write_error(e))?;
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(matches!(state, FileState::Empty))
            .from_writer(file);
        writer
            .serialize(HistoryRecord::from(event))
            .map_err(|e| self.write_error(e.into()))?;
        writer.flush().map_err(|e| self.write_error(e))?;
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<HistoryEvent>, HistoryError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader =
            csv::Reader::from_path(&self.path).map_err(|e| HistoryError::read(&self.path, e))?;
        let headers = reader
            .headers()
            .map_err(|e| HistoryError::read(&self.path, e))?
            .clone();
        if headers.iter().ne(HISTORY_HEADER) {
            return Err(HistoryError::read(
                &self.path,
                format!("unexpected header {:?}", headers.iter().collect::<Vec<_>>()),
            ));
        }

        let mut events = Vec::new();
        for (line, row) in reader.deserialize::<HistoryRecord>().enumerate() {
            match row {
                Ok(record) => events.push(record.into()),
                // Row 1 is the header.
                Err(err) => tracing::warn!(line = line + 2, error = %err, "skipping bad history row"),
            }
        }
        Ok(events)
    }

    /// Rewrite the file with just the header, via a temp file and rename.
    fn clear(&mut self) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.write_error(e))?;
        }
        let tmp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&tmp_path).map_err(|e| self.write_error(e))?;
        writeln!(file, "{}", HISTORY_HEADER.join(",")).map_err(|e| self.write_error(e))?;
        file.sync_all().map_err(|e| self.write_error(e))?;
        fs::rename(&tmp_path, &self.path).map_err(|e| self.write_error(e))?;
        Ok(())
    }
}

/// In-memory log for tests and for running without a writable data dir.
#[derive(Debug, Default)]
pub struct MemoryHistoryLog {
    events: Vec<HistoryEvent>,
    unavailable: bool,
}

impl MemoryHistoryLog {
    pub fn with_events(events: Vec<HistoryEvent>) -> Self {
        Self {
            events,
            unavailable: false,
        }
    }

    /// A log whose every operation fails.
    pub fn failing() -> Self {
        Self {
            events: Vec::new(),
            unavailable: true,
        }
    }

    pub fn events(&self) -> &[HistoryEvent] {
        &self.events
    }
}

impl HistoryLog for MemoryHistoryLog {
    fn append(&mut self, event: &HistoryEvent) -> Result<(), HistoryError> {
        if self.unavailable {
            return Err(HistoryError::Unavailable);
        }
        self.events.push(event.clone());
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<HistoryEvent>, HistoryError> {
        if self.unavailable {
            return Err(HistoryError::Unavailable);
        }
        Ok(self.events.clone())
    }

    fn clear(&mut self) -> Result<(), HistoryError> {
        if self.unavailable {
            return Err(HistoryError::Unavailable);
        }
        self.events.clear();
        Ok(())
    }
}
