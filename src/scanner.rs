//! Sequential reader for the line-delimited message log.
//!
//! The log holds one JSON message per line, oldest first. [`LogScanner`]
//! yields them lazily and keeps only the current line in memory, so archive
//! size never changes the memory cost of a query.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{MementoError, Result};
use crate::models::Message;

/// Forward-only iterator over the messages of a log file.
///
/// Decode or read failures are yielded once as `Err` and end the scan.
/// Blank lines are skipped but still counted, so reported line numbers
/// match the file.
#[derive(Debug)]
pub struct LogScanner<R = BufReader<File>> {
    path: PathBuf,
    reader: R,
    buf: Vec<u8>,
    line: usize,
    done: bool,
}

impl LogScanner {
    /// Open `path` for scanning.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| MementoError::io(path, e))?;
        debug!(path = %path.display(), "opened message log");
        Ok(Self::from_reader(path, BufReader::new(file)))
    }
}

impl<R: BufRead> LogScanner<R> {
    /// Scan an already open reader. `path` is only used in error messages.
    pub fn from_reader(path: impl Into<PathBuf>, reader: R) -> Self {
        Self {
            path: path.into(),
            reader,
            buf: Vec::new(),
            line: 0,
            done: false,
        }
    }

    /// Number of lines consumed so far, blank ones included
    #[must_use]
    pub const fn lines_read(&self) -> usize {
        self.line
    }

    /// Path of the log being scanned
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn next_line(&mut self) -> Option<Result<(usize, Message)>> {
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(MementoError::io(&self.path, e))),
            }
            let index = self.line;
            self.line += 1;

            let record = self.buf.trim_ascii();
            if record.is_empty() {
                continue;
            }
            return Some(
                serde_json::from_slice(record)
                    .map(|message| (index, message))
                    .map_err(|source| MementoError::Decode {
                        file: self.path.clone(),
                        line: index,
                        source,
                    }),
            );
        }
    }
}

impl<R: BufRead> Iterator for LogScanner<R> {
    type Item = Result<Message>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.next_line();
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item.map(|res| res.map(|(_, message)| message))
    }
}

impl<R: BufRead> std::iter::FusedIterator for LogScanner<R> {}
