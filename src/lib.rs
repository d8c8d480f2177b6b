//! Memento - Personal Message Archive
//!
//! A Rust library for querying a personal message archive: an append-only
//! log with one JSON message per line, plus a JSON list of contacts.
//!
//! # Features
//!
//! - Streaming scans with constant memory, whatever the archive size
//! - Composable message filters with AND semantics
//! - Cursor pagination with the full state carried in the next-page locator
//! - Merging contact lists from several services by display name
//! - Read-only HTTP API and export to TXT, CSV and JSON

/// Configuration management
pub mod config;
/// Contact merging
pub mod contacts;
/// Error types
pub mod error;
/// Message export
pub mod export;
/// Message filters
pub mod filter;
/// Logging setup and utilities
pub mod logging;
/// Metrics collection
pub mod metrics;
/// Data models and structures
pub mod models;
/// Cursor pagination
pub mod paginate;
/// Message queries
pub mod query;
/// Message log scanning
pub mod scanner;
/// HTTP server
pub mod server;
/// Input validation
pub mod validation;

// Re-export key components for easier access
pub use contacts::ContactMerger;
pub use error::{MementoError, Result};
pub use filter::{FilterPipeline, MessageFilter};
pub use models::{Attachment, Contact, Message, MessageTarget, Platform, PlatformIdentity};
pub use paginate::{Cursor, Page, QueryParams, MAX_PAGE};
pub use query::{MessageQuery, QueryResponse};
pub use scanner::LogScanner;
