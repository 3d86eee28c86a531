//! Top-level module for the chain generation system.
//!
//! This module provides a first-order Markov-chain generator, including:
//! - Per-token entries with range-partitioned successors (`Entry`)
//! - Immutable snapshots of the whole chain (`TransitionTable`)
//! - Weighted successor sampling (`sampler`)
//! - Random-walk generation (`Walker`, `WalkInput`)
//! - The shared, atomically swappable active table (`ChainStore`)

/// Per-token record and its successor ranges.
pub mod entry;

/// Snapshot of the whole chain, keyed by token.
pub mod table;

/// Weighted successor selection over an entry's ranges.
pub mod sampler;

/// Walk parameters (stopping chance, step cap).
pub mod walk_input;

/// Random-walk text generation over a table.
pub mod walker;

/// Dataset snapshot codec (JSON and binary).
pub mod snapshot;

/// Owner of the active table; load, read and swap.
pub mod store;
