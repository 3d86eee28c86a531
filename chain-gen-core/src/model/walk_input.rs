use crate::error::Error;

/// Default probability of stopping after each transition.
pub const DEFAULT_STOPPING_CHANCE: f64 = 0.05;

/// Default maximum number of tokens emitted by a single walk.
pub const DEFAULT_MAX_STEPS: usize = 10_000;

/// Input parameters for a random walk.
///
/// # Invariants
/// - `stopping_chance` is within `[0.0, 1.0]`
/// - `max_steps` is at least 1
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WalkInput {
	/// Probability of stopping after each move (0.0 = only table-driven stops).
	stopping_chance: f64,

	/// Safety cap on the number of emitted tokens.
	max_steps: usize,
}

impl Default for WalkInput {
	fn default() -> Self {
		Self {
			stopping_chance: DEFAULT_STOPPING_CHANCE,
			max_steps: DEFAULT_MAX_STEPS,
		}
	}
}

impl WalkInput {
	/// Creates a validated walk input.
	///
	/// # Errors
	/// Returns an error if any parameter is out of range.
	pub fn new(stopping_chance: f64, max_steps: usize) -> Result<Self, Error> {
		let mut input = Self::default();
		input.set_stopping_chance(stopping_chance)?;
		input.set_max_steps(max_steps)?;
		Ok(input)
	}

	pub fn stopping_chance(&self) -> f64 {
		self.stopping_chance
	}

	pub fn max_steps(&self) -> usize {
		self.max_steps
	}

	/// Sets the stopping chance (0.0..=1.0).
	///
	/// # Errors
	/// Returns an error if the value is outside the valid range (NaN included).
	pub fn set_stopping_chance(&mut self, stopping_chance: f64) -> Result<(), Error> {
		if !(0.0..=1.0).contains(&stopping_chance) {
			return Err(Error::InvalidParameter(format!(
				"stopping chance must be between 0.0 and 1.0, got {}",
				stopping_chance
			)));
		}
		self.stopping_chance = stopping_chance;
		Ok(())
	}

	/// Sets the maximum number of emitted tokens.
	///
	/// # Errors
	/// Returns an error if `max_steps` is 0.
	pub fn set_max_steps(&mut self, max_steps: usize) -> Result<(), Error> {
		if max_steps == 0 {
			return Err(Error::InvalidParameter("max steps must be at least 1".to_owned()));
		}
		self.max_steps = max_steps;
		Ok(())
	}
}
