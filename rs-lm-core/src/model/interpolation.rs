use super::config::{InterpolationWeights, validate_smoothing};
use super::estimator::Estimator;
use super::tables::{FrequencyTables, History};
use crate::error::Result;

/// Linear interpolation of trigram, bigram and unigram estimates with fixed weights.
///
/// `p = λ1 · c(w2 w1 w) / c(w2 w1) + λ2 · c(w1 w) / (c(w1) + K) + λ3 · c(w) / (N + K)`
///
/// A term only contributes when its counts exist. When all three vanish the
/// estimate is the unweighted floor `K / (N + K)`.
#[derive(Clone, Copy, Debug)]
pub struct InterpolationEstimator<'a> {
	tables: &'a FrequencyTables,
	weights: InterpolationWeights,
	smoothing: f64,
	/// N, the number of training tokens.
	total_token_count: f64,
}

impl<'a> InterpolationEstimator<'a> {
	/// Creates an interpolation estimator with an explicit training token count.
	///
	/// # Errors
	/// Returns `LmError::Configuration` if a weight is negative or if
	/// `smoothing` is not strictly positive.
	pub fn new(
		tables: &'a FrequencyTables,
		weights: InterpolationWeights,
		smoothing: f64,
		total_token_count: usize,
	) -> Result<Self> {
		weights.validate()?;
		validate_smoothing(smoothing)?;
		Ok(Self { tables, weights, smoothing, total_token_count: total_token_count as f64 })
	}

	/// Creates an interpolation estimator using the token count of `tables`.
	pub fn from_tables(tables: &'a FrequencyTables, weights: InterpolationWeights, smoothing: f64) -> Result<Self> {
		Self::new(tables, weights, smoothing, tables.total_token_count())
	}

	pub fn weights(&self) -> InterpolationWeights {
		self.weights
	}

	/// Probability given to a word no order has seen.
	pub fn floor(&self) -> f64 {
		self.smoothing / (self.total_token_count + self.smoothing)
	}
}

impl Estimator for InterpolationEstimator<'_> {
	fn estimate(&self, history: &History, word: &str) -> f64 {
		let k = self.smoothing;

		let trigram = self.tables.trigram_count(history, word);
		let normalizer = self.tables.bigram_count(&history.older, &history.newer);
		let p1 = if trigram > 0 && normalizer > 0 {
			self.weights.trigram * trigram as f64 / normalizer as f64
		} else {
			0.0
		};

		let bigram = self.tables.bigram_count(&history.newer, word);
		let p2 = if bigram > 0 {
			self.weights.bigram * bigram as f64 / (self.tables.unigram_count(&history.newer) as f64 + k)
		} else {
			0.0
		};

		let p3 = if self.tables.is_known(word) {
			self.weights.unigram * self.tables.unigram_count(word) as f64 / (self.total_token_count + k)
		} else {
			0.0
		};

		let p = p1 + p2 + p3;
		if p > 0.0 { p } else { self.floor() }
	}
}
