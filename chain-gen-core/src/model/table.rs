use std::collections::HashMap;

use rand::Rng;

use super::entry::Entry;
use crate::error::ValidationError;

/// Represents a complete, immutable transition table (one snapshot of the chain).
///
/// The `TransitionTable` maps every token key to its `Entry`. Entries are
/// stored densely next to a key index so that a uniform start pick does not
/// scan the whole table.
///
/// # Responsibilities
/// - Look up entries by key
/// - Pick a uniformly random start entry
/// - Check the partition invariant on request (`validate`)
///
/// # Invariants
/// - Keys are unique
/// - The table is never mutated once built; a reload builds a new one
#[derive(Clone, Debug, Default)]
pub struct TransitionTable {
	/// Entries in insertion order.
	entries: Vec<Entry>,
	/// Key -> position in `entries`.
	index: HashMap<String, usize>,
}

impl TransitionTable {
	/// Builds a table from `(key, entry)` pairs.
	///
	/// When a key appears twice, the last entry wins.
	pub fn new<K, I>(entries: I) -> Self
	where
		K: Into<String>,
		I: IntoIterator<Item = (K, Entry)>,
	{
		let mut table = Self::default();
		for (key, entry) in entries {
			let key = key.into();
			match table.index.get(&key) {
				Some(&i) => table.entries[i] = entry,
				None => {
					table.index.insert(key, table.entries.len());
					table.entries.push(entry);
				}
			}
		}
		table
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn get(&self, key: &str) -> Option<&Entry> {
		self.entries.get(*self.index.get(key)?)
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.index.contains_key(key)
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.index.keys().map(String::as_str)
	}

	/// Iterates over `(key, entry)` pairs in no particular order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
		self.index.iter().map(|(key, &i)| (key.as_str(), &self.entries[i]))
	}

	/// Returns a uniformly chosen entry, or `None` if the table is empty.
	pub fn random_entry<R: Rng>(&self, rng: &mut R) -> Option<&Entry> {
		if self.entries.is_empty() {
			return None;
		}
		self.entries.get(rng.random_range(0..self.entries.len()))
	}

	/// Checks every entry against the partition invariant.
	///
	/// - ranges are contiguous from 0 (no gap, no overlap)
	/// - the covered width equals `total`
	/// - every successor is a key of the table
	///
	/// Walks tolerate all of these, so this is only run in strict loading.
	///
	/// # Errors
	/// Returns the first violation found.
	pub fn validate(&self) -> Result<(), ValidationError> {
		for (key, entry) in self.iter() {
			let mut expected = 0;
			for range in entry.ranges() {
				if range.low > expected {
					return Err(ValidationError::Gap { key: key.to_owned(), at: expected });
				}
				if range.low < expected {
					return Err(ValidationError::Overlap { key: key.to_owned(), at: range.low });
				}
				if !self.contains_key(&range.successor) {
					return Err(ValidationError::DanglingSuccessor {
						key: key.to_owned(),
						successor: range.successor.clone(),
					});
				}
				expected = range.high;
			}
			if expected != entry.total() {
				return Err(ValidationError::TotalMismatch {
					key: key.to_owned(),
					covered: expected,
					total: entry.total(),
				});
			}
		}
		Ok(())
	}
}

/// Two tables are equal when they hold the same keys mapped to equal entries,
/// whatever their insertion order.
impl PartialEq for TransitionTable {
	fn eq(&self, other: &Self) -> bool {
		self.len() == other.len() && self.iter().all(|(key, entry)| other.get(key) == Some(entry))
	}
}

impl Eq for TransitionTable {}
