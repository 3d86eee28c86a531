use std::collections::HashMap;

/// A half-open interval `[low, high)` of an entry's draw space mapped to a successor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Range {
	pub low: u64,
	pub high: u64,
	pub successor: String,
}

impl Range {
	pub fn new(low: u64, high: u64, successor: &str) -> Self {
		Self { low, high, successor: successor.to_owned() }
	}

	/// Number of draws that land in this range.
	pub fn width(&self) -> u64 {
		self.high.saturating_sub(self.low)
	}

	pub fn contains(&self, i: u64) -> bool {
		self.low <= i && i < self.high
	}
}

/// Represents one token of the chain and its outgoing transitions.
///
/// An `Entry` is a node in a first-order Markov chain. Its outgoing edges are
/// stored as a partition of `[0, total)` into ranges, each range width being
/// the number of times the transition was observed.
///
/// ## Invariants
/// - Ranges are sorted by `low`
/// - `total == 0` marks a terminal entry
/// - Well-formed entries cover `[0, total)` with no gap and no overlap; this is
///   not enforced on construction (see [`crate::TransitionTable::validate`])
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
	/// Text emitted when a walk visits this entry.
	token: String,
	/// Successor ranges, ascending by `low`.
	ranges: Vec<Range>,
	/// Sum of range widths.
	total: u64,
	/// Raw observed transition counts.
	/// Informational only, the sampler never reads them.
	counts: HashMap<String, u64>,
}

impl Entry {
	/// Creates an entry from raw ranges.
	///
	/// Ranges are sorted by `low`; no other check is performed.
	pub fn new(token: &str, mut ranges: Vec<Range>, total: u64) -> Self {
		ranges.sort_by_key(|r| r.low);
		Self {
			token: token.to_owned(),
			ranges,
			total,
			counts: HashMap::new(),
		}
	}

	/// Creates an entry without outgoing transitions.
	pub fn terminal(token: &str) -> Self {
		Self::new(token, Vec::new(), 0)
	}

	/// Creates an entry whose ranges are laid out contiguously from `weights`.
	///
	/// Zero weights are skipped. Weights for the same successor are summed
	/// into `counts` but keep their own range.
	///
	/// The total is capped at `u64::MAX`: the weight that crosses it is
	/// clamped and later weights are dropped, so the ranges stay a partition.
	pub fn from_weights(token: &str, weights: &[(&str, u64)]) -> Self {
		let mut ranges = Vec::with_capacity(weights.len());
		let mut counts = HashMap::new();
		let mut low: u64 = 0;
		for (successor, weight) in weights.iter().filter(|(_, w)| *w > 0) {
			let high = low.saturating_add(*weight);
			if high == low {
				break;
			}
			ranges.push(Range::new(low, high, successor));
			let count = counts.entry((*successor).to_owned()).or_insert(0u64);
			*count = count.saturating_add(high - low);
			low = high;
		}
		Self { token: token.to_owned(), ranges, total: low, counts }
	}

	/// Attaches raw observed counts.
	pub fn with_counts(mut self, counts: HashMap<String, u64>) -> Self {
		self.counts = counts;
		self
	}

	pub fn token(&self) -> &str {
		&self.token
	}

	pub fn ranges(&self) -> &[Range] {
		&self.ranges
	}

	pub fn total(&self) -> u64 {
		self.total
	}

	pub fn counts(&self) -> &HashMap<String, u64> {
		&self.counts
	}

	pub fn is_terminal(&self) -> bool {
		self.total == 0
	}

	/// Returns the range containing `i`, if any.
	///
	/// Binary search on `low`; with gaps or overlaps the candidate may not
	/// contain `i`, in which case `None` is returned.
	pub fn range_at(&self, i: u64) -> Option<&Range> {
		let idx = self.ranges.partition_point(|r| r.low <= i);
		let range = self.ranges.get(idx.checked_sub(1)?)?;
		range.contains(i).then_some(range)
	}
}
