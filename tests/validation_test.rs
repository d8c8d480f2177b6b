//! Unit tests for validation.rs module

use std::fs;
use std::path::Path;

use memento::error::MementoError;
use memento::validation::InputValidator;
use tempfile::tempdir;

#[test]
fn test_parse_limit_valid() {
    assert_eq!(InputValidator::parse_limit("15").unwrap(), 15);
}

#[test]
fn test_parse_limit_out_of_range_still_parses() {
    assert_eq!(InputValidator::parse_limit("0").unwrap(), 0);
    assert_eq!(InputValidator::parse_limit("-4").unwrap(), -4);
    assert_eq!(InputValidator::parse_limit("1000").unwrap(), 1000);
}

#[test]
fn test_parse_limit_non_numeric() {
    let err = InputValidator::parse_limit("abc").unwrap_err();
    assert!(matches!(err, MementoError::InvalidLimit(ref raw) if raw == "abc"));
}

#[test]
fn test_parse_limit_empty() {
    assert!(InputValidator::parse_limit("").is_err());
}

#[test]
fn test_parse_limit_decimal() {
    assert!(InputValidator::parse_limit("2.5").is_err());
}

#[test]
fn test_parse_cursor_valid() {
    let cursor = InputValidator::parse_cursor("2015-08-01T10:11:12Z").unwrap();
    assert_eq!(cursor.to_string(), "2015-08-01T10:11:12Z");
}

#[test]
fn test_parse_cursor_with_offset() {
    let cursor = InputValidator::parse_cursor("2015-08-01T10:11:12-05:00").unwrap();
    assert_eq!(cursor.to_string(), "2015-08-01T15:11:12Z");
}

#[test]
fn test_parse_cursor_empty() {
    assert!(InputValidator::parse_cursor("").is_none());
    assert!(InputValidator::parse_cursor("   ").is_none());
}

#[test]
fn test_parse_cursor_garbage() {
    assert!(InputValidator::parse_cursor("2015-08-01").is_none());
    assert!(InputValidator::parse_cursor("tomorrow").is_none());
}

#[test]
fn test_validate_archive_file_exists() {
    let dir = tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("messages.jsonl");
    fs::write(&path, "").unwrap();
    assert!(InputValidator::validate_archive_file(&path).is_ok());
}

#[test]
fn test_validate_archive_file_missing() {
    assert!(InputValidator::validate_archive_file(Path::new("/no/such/file.jsonl")).is_err());
}

#[test]
fn test_validate_archive_file_directory() {
    let dir = tempdir().expect("Failed to create temp directory");
    assert!(InputValidator::validate_archive_file(dir.path()).is_err());
}

#[test]
fn test_validate_archive_file_empty_path() {
    assert!(InputValidator::validate_archive_file(Path::new("")).is_err());
}

#[test]
fn test_validate_lines_per_chunk() {
    assert!(InputValidator::validate_lines_per_chunk(1).is_ok());
    assert!(InputValidator::validate_lines_per_chunk(1_000_000).is_ok());
    assert!(InputValidator::validate_lines_per_chunk(0).is_err());
    assert!(InputValidator::validate_lines_per_chunk(1_000_001).is_err());
}

#[test]
fn test_validate_contact_sources() {
    assert!(InputValidator::validate_contact_sources(&["a.json", "b.json"]).is_ok());
    assert!(InputValidator::validate_contact_sources::<&str>(&[]).is_err());
    assert!(InputValidator::validate_contact_sources(&["a.json", ""]).is_err());
}
