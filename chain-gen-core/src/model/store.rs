use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use arc_swap::ArcSwapOption;

use super::snapshot::{self, SnapshotFormat};
use super::table::TransitionTable;
use super::walk_input::WalkInput;
use super::walker::Walker;
use crate::error::Error;
use crate::io;

/// How much of the partition invariant is checked when loading.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Validation {
	/// Structure only; inconsistencies end walks early instead.
	#[default]
	Lenient,
	/// Full partition and successor check (`TransitionTable::validate`).
	Strict,
}

/// Owns the active transition table and swaps it atomically on reload.
///
/// # Responsibilities
/// - Decode snapshots into tables (`load`, `load_with`)
/// - Hand out the active snapshot to readers (`current`)
/// - Replace the active snapshot in one pointer store (`replace`)
///
/// # Concurrency
/// Reads are wait-free. A reader keeps the `Arc` it obtained and finishes
/// on that snapshot even if a `replace` happens meanwhile; no reader can
/// observe a partially built table because tables are never mutated.
/// File-backed loads (`load_file`, `persist_and_reload`) are serialized by a
/// writer-only lock that readers never take.
///
/// # States
/// `Unloaded -> Loaded -> Loaded`. There is no unload; a failed load leaves
/// the store as it was.
#[derive(Debug, Default)]
pub struct ChainStore {
	active: ArcSwapOption<TransitionTable>,
	/// Held by file-backed loads so the dataset file and the active table
	/// change together.
	writer: Mutex<()>,
}

impl ChainStore {
	/// Creates an empty (unloaded) store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a store already holding `table`.
	pub fn with_table(table: TransitionTable) -> Self {
		Self { active: ArcSwapOption::from_pointee(table), writer: Mutex::new(()) }
	}

	/// Decodes a JSON snapshot with lenient validation.
	///
	/// Does not touch any store; pair with [`ChainStore::replace`].
	///
	/// # Errors
	/// Returns `Error::Deserialization` if the bytes are not a snapshot.
	pub fn load(bytes: &[u8]) -> Result<TransitionTable, Error> {
		Self::load_with(bytes, SnapshotFormat::Json, Validation::Lenient)
	}

	/// Decodes a snapshot in the given format and validation mode.
	///
	/// # Errors
	/// - `Error::Deserialization` if the bytes are not a snapshot.
	/// - `Error::Validation` if `validation` is strict and the table is inconsistent.
	pub fn load_with(bytes: &[u8], format: SnapshotFormat, validation: Validation) -> Result<TransitionTable, Error> {
		let table = snapshot::decode(bytes, format)?;
		if validation == Validation::Strict {
			table.validate()?;
		}
		Ok(table)
	}

	/// Returns the active snapshot, if any.
	pub fn current(&self) -> Option<Arc<TransitionTable>> {
		self.active.load_full()
	}

	/// Makes `table` the active snapshot.
	pub fn replace(&self, table: TransitionTable) -> Arc<TransitionTable> {
		let table = Arc::new(table);
		log::debug!("Swapping active transition table ({} entries)", table.len());
		self.active.store(Some(Arc::clone(&table)));
		table
	}

	pub fn is_loaded(&self) -> bool {
		self.active.load().is_some()
	}

	/// Decodes a JSON snapshot and makes it active.
	///
	/// # Errors
	/// Returns the decoding error; the active snapshot is left unchanged.
	pub fn reload(&self, bytes: &[u8]) -> Result<Arc<TransitionTable>, Error> {
		let table = Self::load(bytes)?;
		Ok(self.replace(table))
	}

	/// Generates a sequence from the active snapshot.
	///
	/// # Errors
	/// Returns `Error::EmptyTable` if nothing is loaded.
	pub fn generate(&self, input: &WalkInput) -> Result<String, Error> {
		let table = self.current().ok_or(Error::EmptyTable)?;
		Walker::generate(&table, input)
	}

	/// Loads the dataset file at `path` and makes it active.
	///
	/// - The binary cache next to the file (`.bin`) is used when it was built
	///   from the exact bytes of the dataset (length and hash match).
	/// - Otherwise the JSON dataset is parsed and the cache rebuilt; a cache
	///   write failure is only logged.
	///
	/// Returns `Ok(None)` and leaves the store untouched if the file does not exist.
	///
	/// # Errors
	/// Returns an error if the file cannot be read or decoded.
	pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<Option<Arc<TransitionTable>>, Error> {
		let path = path.as_ref();
		let cache_path = io::binary_cache_path(path)?;
		let _writer = self.lock_writer();

		let Some(source) = io::read_snapshot_file(path)? else {
			log::info!("No dataset at {}", path.display());
			return Ok(None);
		};

		if let Some(cache) = io::read_snapshot_file(&cache_path)? {
			match snapshot::decode_cache(&cache, &source) {
				Ok(Some(table)) => return Ok(Some(self.replace(table))),
				Ok(None) => log::info!("Cache {} is stale, rebuilding", cache_path.display()),
				Err(e) => log::warn!("Ignoring unreadable cache {}: {}", cache_path.display(), e),
			}
		}

		let table = Self::load(&source)?;
		Self::write_cache(&table, &source, &cache_path);
		Ok(Some(self.replace(table)))
	}

	/// Decodes `bytes`, writes them to `path`, then makes them active.
	///
	/// Nothing is written and the store is unchanged if decoding fails.
	/// Concurrent calls are serialized, so the file on disk always holds the
	/// active snapshot once they return; readers are never blocked.
	///
	/// # Errors
	/// Returns the decoding, validation or I/O error.
	pub fn persist_and_reload<P: AsRef<Path>>(
		&self,
		path: P,
		bytes: &[u8],
		validation: Validation,
	) -> Result<Arc<TransitionTable>, Error> {
		let path = path.as_ref();
		let table = Self::load_with(bytes, SnapshotFormat::Json, validation)?;

		let _writer = self.lock_writer();
		io::write_snapshot_file(path, bytes)?;
		Self::write_cache(&table, bytes, &io::binary_cache_path(path)?);
		Ok(self.replace(table))
	}

	/// Serializes file writers. The guarded data is empty, so a poisoned lock is reused.
	fn lock_writer(&self) -> MutexGuard<'_, ()> {
		self.writer.lock().unwrap_or_else(PoisonError::into_inner)
	}

	fn write_cache(table: &TransitionTable, source: &[u8], cache_path: &Path) {
		let result = snapshot::encode_cache(table, source)
			.map_err(Error::from)
			.and_then(|bytes| Ok(io::write_snapshot_file(cache_path, &bytes)?));
		if let Err(e) = result {
			log::warn!("Failed to write cache {}: {}", cache_path.display(), e);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::DeserializationError;
	use crate::model::entry::Entry;

	const AB: &[u8] = br#"{
		"A": {"token": "A", "conditions": [{"min": 0, "max": 1, "token": "B"}], "total": 1},
		"B": {"token": "B", "conditions": [], "total": 0}
	}"#;

	#[test]
	fn test_starts_unloaded() {
		let store = ChainStore::new();
		assert!(!store.is_loaded());
		assert!(store.current().is_none());
		assert!(matches!(store.generate(&WalkInput::default()), Err(Error::EmptyTable)));
	}

	#[test]
	fn test_reload() {
		let store = ChainStore::new();
		store.reload(AB).unwrap();
		assert!(store.is_loaded());
		assert_eq!(store.current().unwrap().len(), 2);
		let text = store.generate(&WalkInput::new(0.0, 100).unwrap()).unwrap();
		assert!(["A", "A B", "B"].contains(&text.as_str()), "{text}");
	}

	#[test]
	fn test_failed_reload_keeps_previous() {
		let store = ChainStore::new();
		assert!(matches!(
			store.reload(b"{ broken"),
			Err(Error::Deserialization(DeserializationError::Json(_)))
		));
		assert!(!store.is_loaded());

		let first = store.reload(AB).unwrap();
		assert!(store.reload(b"{}").is_err());
		assert!(Arc::ptr_eq(&first, &store.current().unwrap()));
	}

	#[test]
	fn test_reader_keeps_detached_snapshot() {
		let store = ChainStore::with_table(TransitionTable::new([("old", Entry::terminal("old"))]));
		let held = store.current().unwrap();
		store.replace(TransitionTable::new([("new", Entry::terminal("new"))]));

		assert!(held.contains_key("old"));
		assert_eq!(Walker::generate(&held, &WalkInput::default()).unwrap(), "old");
		assert_eq!(store.generate(&WalkInput::default()).unwrap(), "new");
	}

	#[test]
	fn test_strict_validation() {
		let dangling = br#"{"A": {"token": "A", "conditions": [{"min": 0, "max": 1, "token": "Z"}], "total": 1}}"#;
		assert!(ChainStore::load(dangling).is_ok());
		assert!(matches!(
			ChainStore::load_with(dangling, SnapshotFormat::Json, Validation::Strict),
			Err(Error::Validation(_))
		));
		assert!(ChainStore::load_with(AB, SnapshotFormat::Json, Validation::Strict).is_ok());
	}
}
