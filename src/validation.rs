use std::path::Path;

use anyhow::{anyhow, Result};

use crate::error::MementoError;
use crate::paginate::Cursor;

/// Validation utilities for raw query input and command-line arguments
#[derive(Debug, Copy, Clone)]
pub struct InputValidator;

impl InputValidator {
    /// Parse a raw `limit` parameter.
    ///
    /// Only the number format is checked here; range is handled by
    /// [`clamp_limit`](crate::paginate::clamp_limit).
    pub fn parse_limit(raw: &str) -> std::result::Result<i64, MementoError> {
        raw.parse::<i64>()
            .map_err(|_| MementoError::InvalidLimit(raw.to_string()))
    }

    /// Parse a raw `cursor` parameter. Empty or unparseable text yields `None`.
    #[must_use]
    pub fn parse_cursor(raw: &str) -> Option<Cursor> {
        if raw.trim().is_empty() {
            return None;
        }
        let cursor = Cursor::parse(raw);
        if cursor.is_none() {
            tracing::warn!(cursor = raw, "ignoring unparseable cursor");
        }
        cursor
    }

    /// Validate an archive file path supplied on the command line
    pub fn validate_archive_file(path: &Path) -> Result<()> {
        if path.as_os_str().is_empty() {
            return Err(anyhow!("File path cannot be empty"));
        }

        if !path.exists() {
            return Err(anyhow!("File does not exist: {}", path.display()));
        }

        if !path.is_file() {
            return Err(anyhow!("Path is not a file: {}", path.display()));
        }

        Ok(())
    }

    /// Validate lines per export chunk
    pub fn validate_lines_per_chunk(lines: usize) -> Result<()> {
        if lines == 0 {
            return Err(anyhow!("Lines per chunk must be greater than 0"));
        }

        if lines > 1_000_000 {
            return Err(anyhow!("Lines per chunk too large (max 1,000,000)"));
        }

        Ok(())
    }

    /// Validate the list of contact files handed to a merge
    pub fn validate_contact_sources<P: AsRef<Path>>(files: &[P]) -> Result<()> {
        if files.is_empty() {
            return Err(anyhow!("At least one contacts file is required"));
        }
        for file in files {
            if file.as_ref().as_os_str().is_empty() {
                return Err(anyhow!("Contacts file path cannot be empty"));
            }
        }
        Ok(())
    }
}
