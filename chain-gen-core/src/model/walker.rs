use rand::Rng;

use super::sampler;
use super::table::TransitionTable;
use super::walk_input::WalkInput;
use crate::error::Error;

/// Generates text by randomly walking a transition table.
///
/// # Behavior
/// - Starts at a uniformly chosen entry.
/// - Emits each visited entry's token, separated by a single space.
/// - Stops on a terminal entry, on a successor missing from the table,
///   with probability `stopping_chance` after each move, or once
///   `max_steps` tokens were emitted.
///
/// The walker holds no state; one generator is used for the whole walk.
pub struct Walker;

impl Walker {
	/// Generates a sequence using the thread-local generator.
	///
	/// # Errors
	/// Returns `Error::EmptyTable` if the table has no entries.
	pub fn generate(table: &TransitionTable, input: &WalkInput) -> Result<String, Error> {
		Self::generate_with_rng(table, input, &mut rand::rng())
	}

	/// Generates a sequence drawing every random value from `rng`.
	///
	/// # Errors
	/// Returns `Error::EmptyTable` if the table has no entries.
	pub fn generate_with_rng<R: Rng>(
		table: &TransitionTable,
		input: &WalkInput,
		rng: &mut R,
	) -> Result<String, Error> {
		let mut current = table.random_entry(rng).ok_or(Error::EmptyTable)?;

		let mut output = String::new();
		let mut steps = 0;
		loop {
			output.push(' ');
			output.push_str(current.token());
			steps += 1;

			if steps >= input.max_steps() {
				log::debug!("Walk reached the step cap ({})", input.max_steps());
				break;
			}

			let Some(successor) = sampler::pick(current, rng) else {
				break;
			};

			current = match table.get(successor) {
				Some(entry) => entry,
				None => {
					log::debug!("Successor '{}' is not in the table, walk stops", successor);
					break;
				}
			};

			if rng.random::<f64>() < input.stopping_chance() {
				break;
			}
		}

		Ok(output.trim().to_owned())
	}
}
