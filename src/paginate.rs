//! Cursor pagination over a filtered log scan.
//!
//! A page holds at most `limit` accepted messages. When it is full, the
//! timestamp of its last message becomes the cursor for the next page,
//! which resumes the scan with an exclusive-after [`CursorFilter`].
//! All pagination state travels in the locator; nothing is kept server side.
//!
//! Messages sharing the boundary timestamp of a full page are skipped by
//! the next page, since the cursor is exclusive.
//!
//! [`CursorFilter`]: crate::filter::CursorFilter

use std::fmt;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::error::{MementoError, PartialScan};
use crate::filter::FilterPipeline;
use crate::models::Message;
use crate::scanner::LogScanner;

/// Largest page a query may ask for; also the default page size.
pub const MAX_PAGE: usize = 30;

/// Query parameter carrying the cursor
pub const CURSOR_PARAM: &str = "cursor";

/// Bring a caller-supplied limit into `[1, MAX_PAGE]`.
///
/// Anything outside the range falls back to [`MAX_PAGE`] rather than
/// being rejected.
#[must_use]
pub fn clamp_limit(requested: Option<i64>) -> usize {
    match requested {
        Some(limit) if (1..=MAX_PAGE as i64).contains(&limit) => {
            usize::try_from(limit).unwrap_or(MAX_PAGE)
        }
        _ => MAX_PAGE,
    }
}

/// Continuation token: the instant after which the next page starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cursor(DateTime<Utc>);

impl Cursor {
    /// Parse cursor text. Returns `None` for anything that is not RFC 3339.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(text.trim())
            .ok()
            .map(|ts| Self(ts.with_timezone(&Utc)))
    }

    /// Cursor positioned at `message`
    #[must_use]
    pub fn after(message: &Message) -> Self {
        Self(message.timestamp.with_timezone(&Utc))
    }

    /// The instant this cursor points at
    #[must_use]
    pub const fn instant(&self) -> DateTime<Utc> {
        self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

impl Serialize for Cursor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One bounded result set
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Accepted messages in file order
    pub messages: Vec<Message>,
    /// The limit the page was filled against
    pub limit: usize,
}

impl Page {
    /// Whether the page reached its limit
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.messages.len() == self.limit
    }

    /// Cursor for the next page, present only when the page is complete
    #[must_use]
    pub fn next_cursor(&self) -> Option<Cursor> {
        if !self.is_complete() {
            return None;
        }
        self.messages.last().map(Cursor::after)
    }
}

/// Drive a scan through `pipeline` until `limit` messages are accepted or
/// the log ends.
///
/// On failure the messages accepted so far are returned inside the error.
pub fn collect_page<I>(
    messages: I,
    pipeline: &FilterPipeline,
    limit: usize,
) -> Result<Page, PartialScan>
where
    I: IntoIterator<Item = crate::error::Result<Message>>,
{
    let mut gathered = Vec::with_capacity(limit);
    if limit == 0 {
        return Ok(Page { messages: gathered, limit });
    }
    for item in messages {
        match item {
            Ok(message) => {
                if pipeline.accepts(&message) {
                    gathered.push(message);
                    if gathered.len() >= limit {
                        break;
                    }
                }
            }
            Err(source) => return Err(PartialScan { gathered, source }),
        }
    }
    Ok(Page {
        messages: gathered,
        limit,
    })
}

/// Open the log at `path` and fill one page from it.
pub fn fetch_page(
    path: &Path,
    pipeline: &FilterPipeline,
    limit: usize,
) -> Result<Page, PartialScan> {
    let mut scanner = LogScanner::open(path).map_err(|source| PartialScan {
        gathered: Vec::new(),
        source,
    })?;
    let page = collect_page(scanner.by_ref(), pipeline, limit)?;
    crate::metrics::record_scan(scanner.lines_read(), page.messages.len());
    debug!(
        path = %path.display(),
        lines = scanner.lines_read(),
        matched = page.messages.len(),
        "page scan finished"
    );
    Ok(page)
}

/// Query parameters of a request, kept verbatim so the next-page locator
/// can reproduce every filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    /// Wrap decoded `key=value` pairs
    #[must_use]
    pub const fn new(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }

    /// Decode a raw query string such as `contact_id=a&limit=5`
    pub fn parse(raw: &str) -> Result<Self, MementoError> {
        serde_urlencoded::from_str(raw)
            .map(Self)
            .map_err(|e| MementoError::Other(format!("malformed query string: {e}")))
    }

    /// True when `key` was supplied, even with an empty value
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    /// First value of `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Copy with every `key` entry replaced by a single `value`
    #[must_use]
    pub fn with(&self, key: &str, value: &str) -> Self {
        let mut pairs: Vec<(String, String)> =
            self.0.iter().filter(|(k, _)| k != key).cloned().collect();
        pairs.push((key.to_string(), value.to_string()));
        Self(pairs)
    }

    /// Encode with keys sorted; values of one key keep their order
    #[must_use]
    pub fn encode(&self) -> String {
        let mut pairs: Vec<&(String, String)> = self.0.iter().collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        serde_urlencoded::to_string(pairs).unwrap_or_default()
    }

    /// Locator for the page after `cursor`: `path` plus these parameters
    /// with only the cursor replaced
    #[must_use]
    pub fn next_page(&self, path: &str, cursor: &Cursor) -> String {
        let query = self.with(CURSOR_PARAM, &cursor.to_string()).encode();
        format!("{path}?{query}")
    }
}
