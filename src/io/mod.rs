//! File ingestion and report export.

/// Report writers for JSON and CSV sinks.
pub mod export;
/// CSV readers for entity and metering-event rows.
pub mod import;
