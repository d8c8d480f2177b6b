//! Message queries: raw request parameters in, one page of results out.

use std::path::Path;

use serde::Serialize;
use tracing::{error, info};

use crate::error::Result;
use crate::filter::{CursorFilter, FilterPipeline, ParticipantFilter};
use crate::logging::OperationTimer;
use crate::models::Message;
use crate::paginate::{clamp_limit, fetch_page, Cursor, Page, QueryParams};
use crate::validation::InputValidator;

/// Query parameter selecting a participant
pub const CONTACT_PARAM: &str = "contact_id";
/// Query parameter bounding the page size
pub const LIMIT_PARAM: &str = "limit";

/// A validated message query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageQuery {
    /// Only messages involving this user id
    pub participant: Option<String>,
    /// Only messages strictly after this instant
    pub cursor: Option<Cursor>,
    /// Page size, already clamped
    pub limit: usize,
}

impl MessageQuery {
    /// Build a query from request parameters.
    ///
    /// A non-numeric `limit` is a client error and no scan should follow.
    /// Out-of-range limits are clamped and unparseable cursors dropped.
    pub fn from_params(params: &QueryParams) -> Result<Self> {
        let participant = params
            .has(CONTACT_PARAM)
            .then(|| params.get(CONTACT_PARAM).unwrap_or_default().to_string());

        let cursor = params
            .get(crate::paginate::CURSOR_PARAM)
            .and_then(InputValidator::parse_cursor);

        let limit = if params.has(LIMIT_PARAM) {
            let raw = params.get(LIMIT_PARAM).unwrap_or_default();
            clamp_limit(Some(InputValidator::parse_limit(raw)?))
        } else {
            clamp_limit(None)
        };

        Ok(Self {
            participant,
            cursor,
            limit,
        })
    }

    /// The filter pipeline this query scans with
    #[must_use]
    pub fn pipeline(&self) -> FilterPipeline {
        let mut pipeline = FilterPipeline::new();
        if let Some(participant) = &self.participant {
            pipeline.push(ParticipantFilter::new(participant.clone()));
        }
        if let Some(cursor) = self.cursor {
            pipeline.push(CursorFilter::new(cursor.instant()));
        }
        pipeline
    }

    /// Run the query against the log at `log`.
    ///
    /// Matches gathered before a scan failure are logged and dropped.
    pub fn execute(&self, log: &Path) -> Result<Page> {
        let timer = OperationTimer::new("message_query");
        let result = fetch_page(log, &self.pipeline(), self.limit);
        timer.finish();
        match result {
            Ok(page) => Ok(page),
            Err(partial) => {
                error!(
                    error = %partial.source,
                    gathered = partial.gathered.len(),
                    "message scan failed"
                );
                Err(partial.into())
            }
        }
    }
}

/// Body returned for one page of messages
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    /// Matching messages, oldest first
    pub messages: Vec<Message>,
    /// Locator of the next page, when the page is full
    pub next_page: Option<String>,
    /// Cursor of the next page, when the page is full
    pub next_cursor: Option<Cursor>,
    /// Number of messages in this page
    pub count: usize,
}

impl QueryResponse {
    /// Assemble a response; `path` and `params` rebuild the next-page locator.
    #[must_use]
    pub fn new(page: Page, path: &str, params: &QueryParams) -> Self {
        let next_cursor = page.next_cursor();
        let next_page = next_cursor
            .as_ref()
            .map(|cursor| params.next_page(path, cursor));
        Self {
            count: page.messages.len(),
            messages: page.messages,
            next_page,
            next_cursor,
        }
    }
}

/// Parse, execute and package one request.
pub fn answer(log: &Path, path: &str, params: &QueryParams) -> Result<QueryResponse> {
    let query = match MessageQuery::from_params(params) {
        Ok(query) => query,
        Err(err) => {
            crate::metrics::record_query("rejected");
            return Err(err);
        }
    };
    match query.execute(log) {
        Ok(page) => {
            crate::metrics::record_query("ok");
            info!(count = page.messages.len(), limit = query.limit, "answered message query");
            Ok(QueryResponse::new(page, path, params))
        }
        Err(err) => {
            crate::metrics::record_query("failed");
            Err(err)
        }
    }
}
