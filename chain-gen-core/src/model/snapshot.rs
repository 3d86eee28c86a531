use std::collections::{BTreeMap, HashMap};
use std::hash::{DefaultHasher, Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::entry::{Entry, Range};
use super::table::TransitionTable;
use crate::error::DeserializationError;

/// Encoding of a dataset snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SnapshotFormat {
	/// The dataset file format produced by the external builder.
	#[default]
	Json,
	/// Compact binary encoding, used as a load cache.
	Postcard,
}

/// One successor range as stored in a dataset: `[min, max)` -> `token`.
#[derive(Serialize, Deserialize, Clone, Debug)]
struct Condition {
	min: u64,
	max: u64,
	token: String,
}

/// One table entry as stored in a dataset.
#[derive(Serialize, Deserialize, Clone, Debug)]
struct SnapshotEntry {
	token: String,
	conditions: Vec<Condition>,
	/// Raw transition counts, absent from some datasets.
	#[serde(default)]
	next: HashMap<String, u64>,
	total: u64,
}

type Snapshot = BTreeMap<String, SnapshotEntry>;

/// Binary cache of a JSON dataset, tagged with the dataset it was built from.
#[derive(Serialize, Deserialize)]
struct CacheFile {
	source_len: u64,
	source_hash: u64,
	snapshot: Snapshot,
}

/// Decodes a snapshot into a transition table.
///
/// Only the structure is checked: the snapshot must hold at least one entry
/// and every condition must have `min <= max`. Partition coverage and
/// dangling successors are left to [`TransitionTable::validate`].
///
/// # Errors
/// Returns an error if the bytes are not a well-formed snapshot.
pub fn decode(bytes: &[u8], format: SnapshotFormat) -> Result<TransitionTable, DeserializationError> {
	let snapshot: Snapshot = match format {
		SnapshotFormat::Json => serde_json::from_slice(bytes)?,
		SnapshotFormat::Postcard => postcard::from_bytes(bytes)?,
	};
	from_snapshot(snapshot)
}

/// Encodes a transition table into a snapshot.
///
/// Keys are written in sorted order so the output is stable.
///
/// # Errors
/// Returns an error if the encoder fails.
pub fn encode(table: &TransitionTable, format: SnapshotFormat) -> Result<Vec<u8>, DeserializationError> {
	let snapshot = to_snapshot(table);
	Ok(match format {
		SnapshotFormat::Json => serde_json::to_vec(&snapshot)?,
		SnapshotFormat::Postcard => postcard::to_stdvec(&snapshot)?,
	})
}

/// Encodes `table` as a binary cache of the dataset bytes `source`.
///
/// # Errors
/// Returns an error if the encoder fails.
pub fn encode_cache(table: &TransitionTable, source: &[u8]) -> Result<Vec<u8>, DeserializationError> {
	let (source_len, source_hash) = fingerprint(source);
	let cache = CacheFile { source_len, source_hash, snapshot: to_snapshot(table) };
	Ok(postcard::to_stdvec(&cache)?)
}

/// Decodes a binary cache built from the dataset bytes `source`.
///
/// Returns `Ok(None)` when the cache was built from different bytes,
/// whatever the file timestamps say.
///
/// # Errors
/// Returns an error if the cache is not well-formed.
pub fn decode_cache(bytes: &[u8], source: &[u8]) -> Result<Option<TransitionTable>, DeserializationError> {
	let cache: CacheFile = postcard::from_bytes(bytes)?;
	if (cache.source_len, cache.source_hash) != fingerprint(source) {
		return Ok(None);
	}
	from_snapshot(cache.snapshot).map(Some)
}

/// Length and hash of a dataset.
///
/// `DefaultHasher::new` is stable within a build; a toolchain change only
/// turns existing caches stale.
fn fingerprint(source: &[u8]) -> (u64, u64) {
	let mut hasher = DefaultHasher::new();
	source.hash(&mut hasher);
	(source.len() as u64, hasher.finish())
}

fn from_snapshot(snapshot: Snapshot) -> Result<TransitionTable, DeserializationError> {
	if snapshot.is_empty() {
		return Err(DeserializationError::NoEntries);
	}

	let mut entries = Vec::with_capacity(snapshot.len());
	for (key, raw) in snapshot {
		let mut ranges = Vec::with_capacity(raw.conditions.len());
		for condition in raw.conditions {
			if condition.min > condition.max {
				return Err(DeserializationError::InvertedRange {
					key,
					min: condition.min,
					max: condition.max,
				});
			}
			ranges.push(Range {
				low: condition.min,
				high: condition.max,
				successor: condition.token,
			});
		}
		let entry = Entry::new(&raw.token, ranges, raw.total).with_counts(raw.next);
		entries.push((key, entry));
	}

	Ok(TransitionTable::new(entries))
}

fn to_snapshot(table: &TransitionTable) -> Snapshot {
	table
		.iter()
		.map(|(key, entry)| {
			let raw = SnapshotEntry {
				token: entry.token().to_owned(),
				conditions: entry
					.ranges()
					.iter()
					.map(|r| Condition { min: r.low, max: r.high, token: r.successor.clone() })
					.collect(),
				next: entry.counts().clone(),
				total: entry.total(),
			};
			(key.to_owned(), raw)
		})
		.collect()
}
