use rand::Rng;

use super::entry::Entry;

/// Picks the successor of `entry` using weighted random sampling.
///
/// The probability of selecting a successor is proportional to the width of
/// its range. Returns `None` for a terminal entry, or when the drawn value
/// falls outside every range of a malformed entry.
///
/// The generator is borrowed from the caller so a single instance serves a
/// whole walk; see [`pick_default`] for the thread-local one.
pub fn pick<'a, R: Rng>(entry: &'a Entry, rng: &mut R) -> Option<&'a str> {
	if entry.is_terminal() {
		return None;
	}

	let i = rng.random_range(0..entry.total());
	match entry.range_at(i) {
		Some(range) => Some(range.successor.as_str()),
		None => {
			log::trace!("No range of '{}' contains {}, treated as terminal", entry.token(), i);
			None
		}
	}
}

/// Same as [`pick`], drawing from the thread-local generator.
pub fn pick_default(entry: &Entry) -> Option<&str> {
	pick(entry, &mut rand::rng())
}
