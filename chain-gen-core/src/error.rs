use thiserror::Error;

/// Errors surfaced by the chain generation core.
///
/// Anomalies found while walking a loaded table (dangling successors,
/// malformed ranges) are never reported here; they end the walk early.
#[derive(Debug, Error)]
pub enum Error {
	#[error("No transition table loaded")]
	EmptyTable,

	#[error("Invalid snapshot: {0}")]
	Deserialization(#[from] DeserializationError),

	#[error("Inconsistent snapshot: {0}")]
	Validation(#[from] ValidationError),

	#[error("Invalid parameter: {0}")]
	InvalidParameter(String),

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}

/// A snapshot could not be decoded into a transition table.
#[derive(Debug, Error)]
pub enum DeserializationError {
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	#[error("Binary error: {0}")]
	Postcard(#[from] postcard::Error),

	#[error("Snapshot contains no entries")]
	NoEntries,

	#[error("Entry '{key}' has a condition with min {min} > max {max}")]
	InvertedRange { key: String, min: u64, max: u64 },
}

/// A decoded table breaks the partition invariant.
///
/// Only reported when strict validation is requested.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
	#[error("Entry '{key}': ranges cover {covered} but total is {total}")]
	TotalMismatch { key: String, covered: u64, total: u64 },

	#[error("Entry '{key}': gap before {at}")]
	Gap { key: String, at: u64 },

	#[error("Entry '{key}': overlap at {at}")]
	Overlap { key: String, at: u64 },

	#[error("Entry '{key}': successor '{successor}' is not in the table")]
	DanglingSuccessor { key: String, successor: String },
}
