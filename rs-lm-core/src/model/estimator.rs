use super::tables::History;

/// A smoothed conditional probability model over trained frequency tables.
///
/// Implementations only read the tables, so one estimator can be shared
/// across evaluation threads.
pub trait Estimator: Sync {
	/// Probability of `word` following `history`, always in `(0, 1]`.
	fn estimate(&self, history: &History, word: &str) -> f64;

	/// Whether the perplexity evaluator drops sentences whose total log
	/// probability is exactly 0.
	fn skips_zero_sentences(&self) -> bool {
		false
	}
}

/// Smoothing strategy selected by the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Smoothing {
	/// Discounted back-off with mass redistribution.
	Backoff,
	/// Fixed-weight linear interpolation.
	Interpolation,
}
