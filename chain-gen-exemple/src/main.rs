use chain_gen_core::{ChainStore, Entry, SnapshotFormat, TransitionTable, Validation, WalkInput, Walker};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Load the dataset from "resources" (the .bin cache is used if it matches the dataset)
    let store = ChainStore::new();
    if store.load_file("./resources/data.json")?.is_none() {
        println!("No dataset found, using a built-in table");
        store.replace(TransitionTable::new([
            ("the", Entry::from_weights("the", &[("cat", 3), ("dog", 1)])),
            ("cat", Entry::from_weights("cat", &[("sleeps", 2), ("the", 1)])),
            ("dog", Entry::from_weights("dog", &[("barks", 1)])),
            ("sleeps", Entry::terminal("sleeps.")),
            ("barks", Entry::terminal("barks!")),
        ]));
    }

    // Every table can be checked against the partition invariant
    let table = store.current().ok_or("store should be loaded")?;
    match table.validate() {
        Ok(()) => println!("Table is consistent ({} entries)", table.len()),
        Err(e) => println!("Table is inconsistent, walks may stop early: {}", e),
    }

    // Stopping chance must be between 0.0 and 1.0
    let mut input = WalkInput::default();
    match input.set_stopping_chance(2.0) {
        Ok(_) => println!("Should not happen"),
        Err(_) => println!("Stopping chance 2.0 is invalid, must be between 0.0 and 1.0"),
    }
    input.set_stopping_chance(0.1)?;

    // Safety cap on the number of tokens
    input.set_max_steps(50)?;

    // Generate 10 sentences from the active table
    for i in 0..10 {
        println!("Generated text {}: {}", i + 1, store.generate(&input)?);
    }

    // A detached snapshot keeps working after the store swaps tables
    let reloaded = ChainStore::load_with(
        br#"{"end": {"token": "The end.", "conditions": [], "total": 0}}"#,
        SnapshotFormat::Json,
        Validation::Strict,
    )?;
    store.replace(reloaded);
    println!("Old snapshot: {}", Walker::generate(&table, &input)?);
    println!("New snapshot: {}", store.generate(&input)?);

    Ok(())
}
