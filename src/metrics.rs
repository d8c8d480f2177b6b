//! Metric names and recording helpers.
//!
//! Values go through the `metrics` facade. Nothing is exported unless the
//! embedding process installs a recorder; without one every call is a no-op.

use std::time::Duration;

use metrics::{counter, histogram};

/// Queries answered, labelled by `status` (`ok`, `rejected`, `failed`)
pub const QUERIES_TOTAL: &str = "memento_queries_total";
/// Wall time of timed operations, labelled by `operation`
pub const OPERATION_DURATION: &str = "memento_operation_duration_seconds";
/// Log lines read by page scans
pub const LINES_SCANNED_TOTAL: &str = "memento_lines_scanned_total";
/// Messages accepted by page scans
pub const MESSAGES_MATCHED_TOTAL: &str = "memento_messages_matched_total";
/// Distinct contacts produced by merges
pub const CONTACTS_MERGED_TOTAL: &str = "memento_contacts_merged_total";
/// Files written by exports
pub const EXPORT_FILES_TOTAL: &str = "memento_export_files_total";
/// Messages written by exports
pub const MESSAGES_EXPORTED_TOTAL: &str = "memento_messages_exported_total";

/// Count one query outcome
pub fn record_query(status: &'static str) {
    counter!(QUERIES_TOTAL, "status" => status).increment(1);
}

/// Record the duration of a timed operation
pub fn record_duration(operation: &str, duration: Duration) {
    histogram!(OPERATION_DURATION, "operation" => operation.to_string()).record(duration.as_secs_f64());
}

/// Record the work done by one page scan
pub fn record_scan(lines: usize, matched: usize) {
    counter!(LINES_SCANNED_TOTAL).increment(lines as u64);
    counter!(MESSAGES_MATCHED_TOTAL).increment(matched as u64);
}

/// Record the size of a merge result
pub fn record_contacts_merged(contacts: usize) {
    counter!(CONTACTS_MERGED_TOTAL).increment(contacts as u64);
}

/// Record an export run
pub fn record_export(files: usize, messages: usize) {
    counter!(EXPORT_FILES_TOTAL).increment(files as u64);
    counter!(MESSAGES_EXPORTED_TOTAL).increment(messages as u64);
}
