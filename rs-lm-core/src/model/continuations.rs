use std::collections::HashMap;

/// Observed continuations of one history.
///
/// A `Continuations` holds, for a fixed history (one token for bigrams, a
/// token pair for trigrams), every token that followed it in training data
/// together with how many times it did.
///
/// Conceptually, this is a node of the n-gram graph whose outgoing edges are
/// weighted by their number of observations.
///
/// ## Responsibilities:
/// - Accumulate continuation occurrences during training
/// - Answer count lookups, returning 0 for unseen continuations
/// - Merge with the continuations of the same history (parallel training)
///
/// ## Invariants
/// - Each stored count is strictly positive
/// - `total` is the sum of all stored counts
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Continuations {
	/// Following token → occurrences.
	/// Example: { "sat" => 2, "</s>" => 1 }
	counts: HashMap<String, usize>,
	/// Sum of `counts` values.
	total: usize,
}

impl Continuations {
	/// Creates an empty set of continuations.
	pub fn new() -> Self {
		Self::default()
	}

	/// Records one occurrence of `word` after this history.
	pub fn add(&mut self, word: &str) {
		self.add_count(word, 1);
	}

	/// Records `count` occurrences of `word` after this history.
	pub(crate) fn add_count(&mut self, word: &str, count: usize) {
		if count == 0 {
			return;
		}
		match self.counts.get_mut(word) {
			Some(existing) => *existing += count,
			None => {
				self.counts.insert(word.to_owned(), count);
			}
		}
		self.total += count;
	}

	/// Number of times `word` followed this history, 0 if never.
	pub fn count(&self, word: &str) -> usize {
		self.counts.get(word).copied().unwrap_or(0)
	}

	/// Returns `true` if `word` followed this history at least once.
	pub fn contains(&self, word: &str) -> bool {
		self.counts.contains_key(word)
	}

	/// Sum of all continuation counts.
	pub fn total(&self) -> usize {
		self.total
	}

	/// Number of distinct continuations.
	pub fn len(&self) -> usize {
		self.counts.len()
	}

	pub fn is_empty(&self) -> bool {
		self.counts.is_empty()
	}

	/// Iterates over `(word, count)` pairs in arbitrary order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
		self.counts.iter().map(|(word, count)| (word.as_str(), *count))
	}

	/// Merges another set of continuations of the same history into this one.
	///
	/// Occurrence counts are summed.
	pub fn merge(&mut self, other: &Self) {
		for (word, count) in other.iter() {
			self.add_count(word, count);
		}
	}
}
