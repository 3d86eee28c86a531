use std::sync::{Arc, Barrier};
use std::thread;

use chain_gen_core::{ChainStore, Entry, TransitionTable, WalkInput};

/// Builds a cyclic table whose tokens all start with `prefix`.
fn tagged_table(prefix: &str, size: usize) -> TransitionTable {
	let keys: Vec<String> = (0..size).map(|i| format!("{prefix}{i}")).collect();
	TransitionTable::new(keys.iter().enumerate().map(|(i, key)| {
		let next = &keys[(i + 1) % size];
		let other = &keys[(i + 2) % size];
		(key.clone(), Entry::from_weights(key, &[(next.as_str(), 3), (other.as_str(), 1)]))
	}))
}

#[test]
fn generations_never_mix_snapshots() {
	let store = Arc::new(ChainStore::with_table(tagged_table("old-", 16)));
	let input = WalkInput::new(0.02, 500).unwrap();
	let barrier = Arc::new(Barrier::new(101));

	let readers: Vec<_> = (0..100)
		.map(|_| {
			let store = Arc::clone(&store);
			let barrier = Arc::clone(&barrier);
			thread::spawn(move || {
				barrier.wait();
				(0..20).map(|_| store.generate(&input).unwrap()).collect::<Vec<_>>()
			})
		})
		.collect();

	barrier.wait();
	store.replace(tagged_table("new-", 16));

	for reader in readers {
		for text in reader.join().unwrap() {
			let tokens: Vec<&str> = text.split(' ').collect();
			let all_old = tokens.iter().all(|t| t.starts_with("old-"));
			let all_new = tokens.iter().all(|t| t.starts_with("new-"));
			assert!(all_old || all_new, "mixed output: {text}");
		}
	}

	assert!(store.generate(&input).unwrap().starts_with("new-"));
}

#[test]
fn repeated_replace_under_load() {
	let store = Arc::new(ChainStore::with_table(tagged_table("gen0-", 4)));
	let input = WalkInput::default();

	let readers: Vec<_> = (0..8)
		.map(|_| {
			let store = Arc::clone(&store);
			thread::spawn(move || {
				for _ in 0..500 {
					let table = store.current().unwrap();
					let text = chain_gen_core::Walker::generate(&table, &input).unwrap();
					let prefix = format!("{}-", text.split('-').next().unwrap());
					assert!(text.split(' ').all(|t| t.starts_with(&prefix)), "mixed output: {text}");
					assert!(table.keys().all(|k| k.starts_with(&prefix)));
				}
			})
		})
		.collect();

	for generation in 1..50 {
		store.replace(tagged_table(&format!("gen{generation}-"), 4));
	}

	for reader in readers {
		reader.join().unwrap();
	}
}
