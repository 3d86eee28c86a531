//! Markov-chain text generation library.
//!
//! This crate provides a weighted transition-table generation system including:
//! - Immutable transition tables built from dataset snapshots
//! - Range-partitioned weighted sampling of successor tokens
//! - Random walks with a stochastic early stop and a safety cap
//! - A shared store whose active table can be swapped while readers generate
//!
//! Only the high-level API is exposed publicly. Snapshot decoding is the
//! single way to build a table from external data.

/// Transition tables, sampling, walking and the shared store.
///
/// This module exposes the store and walker interfaces together with
/// the read-only table types they operate on.
pub mod model;

/// Error types returned by the public API.
pub mod error;

/// Dataset file helpers (read, atomic write, binary cache path).
pub mod io;

pub use error::{DeserializationError, Error, ValidationError};
pub use model::entry::{Entry, Range};
pub use model::snapshot::SnapshotFormat;
pub use model::store::{ChainStore, Validation};
pub use model::table::TransitionTable;
pub use model::walk_input::WalkInput;
pub use model::walker::Walker;
