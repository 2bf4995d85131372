use super::config::{validate_discount, validate_smoothing};
use super::estimator::Estimator;
use super::tables::{FrequencyTables, History};
use crate::error::Result;

/// Discounted back-off estimator (trigram → bigram → unigram).
///
/// Observed counts are discounted by `D`; the mass left over at one order is
/// redistributed over the continuations the higher order did not claim.
///
/// # Algorithm
/// 1. Trigram hit: `D · c(w2 w1 w) / (c(w2 w1) + K)`
/// 2. Bigram hit: `D · α(w2 w1) · c(w1 w) / (Σ unclaimed c(w1 ·) + K)`
/// 3. Otherwise: `D · α(w1) · c(w) / (Σ unclaimed c(·) + K)`, with `K` in
///    place of `c(w)` for out-of-vocabulary words
#[derive(Clone, Copy, Debug)]
pub struct BackoffEstimator<'a> {
	tables: &'a FrequencyTables,
	discount: f64,
	smoothing: f64,
}

impl<'a> BackoffEstimator<'a> {
	/// Creates a back-off estimator over `tables`.
	///
	/// # Errors
	/// Returns `LmError::Configuration` if `discount` is not in `(0, 1)` or
	/// `smoothing` is not strictly positive.
	pub fn new(tables: &'a FrequencyTables, discount: f64, smoothing: f64) -> Result<Self> {
		validate_discount(discount)?;
		validate_smoothing(smoothing)?;
		Ok(Self { tables, discount, smoothing })
	}

	pub fn discount(&self) -> f64 {
		self.discount
	}

	/// Mass left for bigram estimates once the trigram continuations of
	/// `history` have taken their discounted share. In `[0, 1]`.
	///
	/// Equals 1 when the history has no trigram continuations.
	pub fn trigram_alpha(&self, history: &History) -> f64 {
		let claimed = match self.tables.trigram_continuations(history) {
			Some(continuations) => {
				let normalizer = self.tables.bigram_count(&history.older, &history.newer) as f64 + self.smoothing;
				self.discount * continuations.total() as f64 / normalizer
			}
			None => 0.0,
		};
		(1.0 - claimed).clamp(0.0, 1.0)
	}

	/// Mass left for unigram estimates once the bigram continuations of
	/// `token` have taken their discounted share. In `[0, 1]`.
	///
	/// Equals 1 when the token has no bigram continuations.
	pub fn bigram_alpha(&self, token: &str) -> f64 {
		let claimed = match self.tables.bigram_continuations(token) {
			Some(continuations) => {
				let normalizer = self.tables.unigram_count(token) as f64 + self.smoothing;
				self.discount * continuations.total() as f64 / normalizer
			}
			None => 0.0,
		};
		(1.0 - claimed).clamp(0.0, 1.0)
	}

	/// Sum of the bigram counts of `history.newer` whose continuation is not
	/// a trigram continuation of `history`.
	fn unclaimed_bigram_mass(&self, history: &History) -> usize {
		let Some(bigrams) = self.tables.bigram_continuations(&history.newer) else {
			return 0;
		};
		match self.tables.trigram_continuations(history) {
			Some(trigrams) => bigrams
				.iter()
				.filter(|(word, _)| !trigrams.contains(word))
				.map(|(_, count)| count)
				.sum(),
			None => bigrams.total(),
		}
	}

	/// Sum of the unigram counts of every known token that is not a bigram
	/// continuation of `token`.
	fn unclaimed_unigram_mass(&self, token: &str) -> usize {
		let claimed: usize = self
			.tables
			.bigram_continuations(token)
			.map_or(0, |bigrams| bigrams.iter().map(|(word, _)| self.tables.unigram_count(word)).sum());
		self.tables.total_token_count().saturating_sub(claimed)
	}

	/// Last resort when a branch degenerates to a non-positive value.
	fn floor(&self) -> f64 {
		self.discount * self.smoothing / (self.tables.total_token_count() as f64 + self.smoothing)
	}

	fn guard(&self, probability: f64) -> f64 {
		if probability.is_finite() && probability > 0.0 {
			probability.min(1.0)
		} else {
			self.floor()
		}
	}
}

impl Estimator for BackoffEstimator<'_> {
	fn estimate(&self, history: &History, word: &str) -> f64 {
		let (d, k) = (self.discount, self.smoothing);

		let trigram = self.tables.trigram_count(history, word);
		if trigram > 0 {
			let normalizer = self.tables.bigram_count(&history.older, &history.newer) as f64 + k;
			return self.guard(d * trigram as f64 / normalizer);
		}

		let bigram = self.tables.bigram_count(&history.newer, word);
		if bigram > 0 {
			let alpha = self.trigram_alpha(history);
			let denominator = self.unclaimed_bigram_mass(history) as f64 + k;
			return self.guard(d * alpha * bigram as f64 / denominator);
		}

		let alpha = self.bigram_alpha(&history.newer);
		let denominator = self.unclaimed_unigram_mass(&history.newer) as f64 + k;
		let numerator = if self.tables.is_known(word) { self.tables.unigram_count(word) as f64 } else { k };
		self.guard(d * alpha * numerator / denominator)
	}

	fn skips_zero_sentences(&self) -> bool {
		true
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::corpus::{Sentence, tokenize_line};
	use crate::error::LmError;
	use approx::assert_relative_eq;

	fn tables() -> FrequencyTables {
		let sentences: Vec<Sentence> = ["the cat sat", "the dog sat", "a cat ran"]
			.iter()
			.map(|line| tokenize_line(line))
			.collect();
		FrequencyTables::train(&sentences)
	}

	#[test]
	fn test_trigram_hit() {
		let tables = tables();
		let estimator = BackoffEstimator::new(&tables, 0.7, 1.0).unwrap();
		// c(the cat sat) = 1, c(the cat) = 1
		assert_relative_eq!(estimator.estimate(&History::new("the", "cat"), "sat"), 0.7 * 1.0 / 2.0);
		// c(<s> <s> the) = 2, c(<s> <s>) = 3
		assert_relative_eq!(estimator.estimate(&History::new("<s>", "<s>"), "the"), 0.7 * 2.0 / 4.0);
	}

	#[test]
	fn test_bigram_hit_redistributes_trigram_mass() {
		let tables = tables();
		let estimator = BackoffEstimator::new(&tables, 0.7, 1.0).unwrap();
		let history = History::new("the", "cat");
		// trigram (the cat) claims 0.7 * 1 / (1 + 1) = 0.35
		let alpha = 1.0 - 0.35;
		assert_relative_eq!(estimator.trigram_alpha(&history), alpha);
		// cat → {sat, ran}; sat is claimed by the trigram, only ran remains
		assert_relative_eq!(estimator.estimate(&history, "ran"), 0.7 * alpha * 1.0 / (1.0 + 1.0));
	}

	#[test]
	fn test_bigram_hit_without_trigram_history() {
		let tables = tables();
		let estimator = BackoffEstimator::new(&tables, 0.7, 1.0).unwrap();
		let history = History::new("dog", "cat");
		assert_relative_eq!(estimator.trigram_alpha(&history), 1.0);
		// every continuation of cat is unclaimed: c(cat ·) = 2
		assert_relative_eq!(estimator.estimate(&history, "sat"), 0.7 * 1.0 / 3.0);
	}

	#[test]
	fn test_unigram_fallback() {
		let tables = tables();
		let estimator = BackoffEstimator::new(&tables, 0.7, 1.0).unwrap();
		let history = History::new("cat", "sat");
		// sat → {</s>: 2}, c(sat) = 2
		let alpha = 1.0 - 0.7 * 2.0 / 3.0;
		assert_relative_eq!(estimator.bigram_alpha("sat"), alpha);
		// 18 tokens minus c(</s>) = 3
		let denominator = 15.0 + 1.0;
		assert_relative_eq!(estimator.estimate(&history, "<s>"), 0.7 * alpha * 6.0 / denominator);
		assert_relative_eq!(estimator.estimate(&history, "dog"), 0.7 * alpha * 1.0 / denominator);
	}

	#[test]
	fn test_out_of_vocabulary_floor() {
		let tables = tables();
		let estimator = BackoffEstimator::new(&tables, 0.7, 1.0).unwrap();
		let alpha = 1.0 - 0.7 * 2.0 / 3.0;
		assert_relative_eq!(estimator.estimate(&History::new("cat", "sat"), "zebra"), 0.7 * alpha / 16.0);
		// unknown history: nothing claimed, the whole vocabulary is the base
		assert_relative_eq!(estimator.estimate(&History::new("x", "y"), "zebra"), 0.7 / 19.0);
		assert_relative_eq!(estimator.estimate(&History::new("x", "y"), "the"), 0.7 * 2.0 / 19.0);
	}

	#[test]
	fn test_probabilities_in_unit_interval() {
		let tables = tables();
		let estimator = BackoffEstimator::new(&tables, 0.9, 0.5).unwrap();
		let mut words: Vec<&str> = tables.unigrams().map(|(word, _)| word).collect();
		words.push("zebra");

		for older in &words {
			for newer in &words {
				let history = History::new(older, newer);
				let alpha = estimator.trigram_alpha(&history);
				assert!((0.0..=1.0).contains(&alpha));
				assert!((0.0..=1.0).contains(&estimator.bigram_alpha(newer)));
				for word in &words {
					let p = estimator.estimate(&history, word);
					assert!(p > 0.0 && p <= 1.0, "p({} | {} {}) = {}", word, older, newer, p);
				}
			}
		}
	}

	#[test]
	fn test_missing_trigram_normalizer_counts_zero() {
		let mut tables = tables();
		tables.insert_trigram_unchecked(History::new("ghost", "pair"), "word", 3);
		let estimator = BackoffEstimator::new(&tables, 0.7, 1.0).unwrap();
		let history = History::new("ghost", "pair");
		// c(ghost pair) is absent: 0.7 * 3 / (0 + 1) is capped at 1
		assert_relative_eq!(estimator.estimate(&history, "word"), 1.0);
		assert_eq!(estimator.trigram_alpha(&history), 0.0);
	}

	#[test]
	fn test_empty_tables() {
		let tables = FrequencyTables::new();
		let estimator = BackoffEstimator::new(&tables, 0.7, 1.0).unwrap();
		assert_relative_eq!(estimator.estimate(&History::new("<s>", "<s>"), "the"), 0.7);
	}

	#[test]
	fn test_invalid_parameters() {
		let tables = tables();
		assert!(matches!(BackoffEstimator::new(&tables, 1.5, 1.0), Err(LmError::Configuration(_))));
		assert!(matches!(BackoffEstimator::new(&tables, 0.5, 0.0), Err(LmError::Configuration(_))));
	}
}
