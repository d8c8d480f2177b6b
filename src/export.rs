//! Exporting archive messages to files.
//!
//! Messages accepted by a [`FilterPipeline`] are streamed from the log and
//! written in chunks of at most `lines_per_chunk` messages, one file per
//! chunk: `chunk_1.txt`, `chunk_2.txt`, ...

use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use csv::Writer;
use tracing::{debug, info};

use crate::error::{MementoError, Result};
use crate::filter::FilterPipeline;
use crate::logging::OperationTimer;
use crate::models::Message;
use crate::scanner::LogScanner;

const TIMESTAMP_FORMAT: &str = "%b %d, %Y %r";

/// Output format for exported messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Comma-separated values format
    Csv,
    /// Plain text format
    Txt,
    /// JSON format
    Json,
}

impl OutputFormat {
    /// Get the file extension for this format
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Txt => "txt",
            Self::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = MementoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "txt" => Ok(Self::Txt),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(MementoError::Other(format!(
                "Unknown export format: {other}. Use txt, csv or json"
            ))),
        }
    }
}

/// Stream every message of `log` accepted by `pipeline` into chunk files
/// under `output_dir`.
///
/// Returns the files written, in order. Nothing is created when no
/// message matches.
pub fn export_messages(
    log: &Path,
    pipeline: &FilterPipeline,
    format: OutputFormat,
    lines_per_chunk: usize,
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let timer = OperationTimer::new("export");
    let lines_per_chunk = lines_per_chunk.max(1);
    let mut files = Vec::new();
    let mut chunk = Vec::with_capacity(lines_per_chunk.min(1024));
    let mut exported = 0;

    for message in LogScanner::open(log)? {
        let message = message?;
        if !pipeline.accepts(&message) {
            continue;
        }
        chunk.push(message);
        if chunk.len() == lines_per_chunk {
            exported += chunk.len();
            files.push(flush_chunk(&chunk, format, output_dir, files.len() + 1)?);
            chunk.clear();
        }
    }
    if !chunk.is_empty() {
        exported += chunk.len();
        files.push(flush_chunk(&chunk, format, output_dir, files.len() + 1)?);
    }

    info!(files = files.len(), messages = exported, "export finished");
    crate::metrics::record_export(files.len(), exported);
    timer.finish();
    Ok(files)
}

fn flush_chunk(messages: &[Message], format: OutputFormat, output_dir: &Path, number: usize) -> Result<PathBuf> {
    create_dir_all(output_dir).map_err(|e| MementoError::io(output_dir, e))?;
    let file_path = output_dir.join(format!("chunk_{number}.{}", format.extension()));
    write_messages_to_file(messages, format, &file_path)?;
    debug!(path = %file_path.display(), messages = messages.len(), "wrote chunk");
    Ok(file_path)
}

/// Write messages to a file in the specified format.
pub fn write_messages_to_file(messages: &[Message], format: OutputFormat, file_path: &Path) -> Result<()> {
    let file = File::create(file_path).map_err(|e| MementoError::io(file_path, e))?;
    let result = match format {
        OutputFormat::Txt => write_txt(messages, BufWriter::new(file)),
        OutputFormat::Csv => write_csv(messages, BufWriter::new(file)),
        OutputFormat::Json => write_json(messages, BufWriter::new(file)),
    };
    result.map_err(|err| match err {
        MementoError::Io { source, .. } => MementoError::io(file_path, source),
        other => other,
    })
}

/// Format: `sender, timestamp, text` followed by a blank line
fn write_txt<W: Write>(messages: &[Message], mut writer: W) -> Result<()> {
    let io = |e| MementoError::io("<txt export>", e);
    for message in messages {
        writeln!(
            writer,
            "{}, {}, {}",
            message.from,
            message.timestamp.format(TIMESTAMP_FORMAT),
            message.text
        )
        .map_err(io)?;
        writeln!(writer).map_err(io)?;
    }
    writer.flush().map_err(io)
}

/// Includes header row: `ID, Platform, Sender, Target, Datetime, Message`
fn write_csv<W: Write>(messages: &[Message], writer: W) -> Result<()> {
    let mut writer = Writer::from_writer(writer);
    writer.write_record(["ID", "Platform", "Sender", "Target", "Datetime", "Message"])?;

    for (i, message) in messages.iter().enumerate() {
        let id = (i + 1).to_string();
        let target = message.to.to_string();
        let sent = message.timestamp.format(TIMESTAMP_FORMAT).to_string();
        writer.write_record([
            id.as_str(),
            message.platform.as_str(),
            message.from.as_str(),
            target.as_str(),
            sent.as_str(),
            message.text.as_str(),
        ])?;
    }

    writer.flush().map_err(|e| MementoError::io("<csv export>", e))
}

/// Outputs a pretty JSON array of the full message records
fn write_json<W: Write>(messages: &[Message], mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, messages)?;
    writer.flush().map_err(|e| MementoError::io("<json export>", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MessageTarget, Platform};
    use chrono::{TimeZone, Utc};

    fn message(text: &str) -> Message {
        Message {
            platform: Platform::Msn,
            timestamp: Utc.with_ymd_and_hms(2005, 3, 4, 20, 15, 0).unwrap().fixed_offset(),
            from: "ann".to_string(),
            to: MessageTarget::user("ben"),
            text: text.to_string(),
            raw: None,
            attachments: None,
            meta: None,
        }
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_txt_layout() {
        let mut out = Vec::new();
        write_txt(&[message("hello")], &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "ann, Mar 04, 2005 08:15:00 PM, hello\n\n");
    }

    #[test]
    fn test_csv_has_header_and_ids() {
        let mut out = Vec::new();
        write_csv(&[message("a, b"), message("c")], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "ID,Platform,Sender,Target,Datetime,Message");
        assert!(lines[1].starts_with("1,msn,ann,user:ben,"));
        assert!(lines[1].ends_with("\"a, b\""));
        assert!(lines[2].starts_with("2,"));
    }
}
