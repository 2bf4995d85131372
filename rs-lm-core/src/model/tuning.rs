use super::backoff::BackoffEstimator;
use super::config::InterpolationWeights;
use super::interpolation::InterpolationEstimator;
use super::perplexity::evaluate_parallel;
use super::tables::FrequencyTables;
use crate::corpus::Sentence;
use crate::error::{LmError, Result};

/// Keeps the candidate with the lowest perplexity; ties keep the earliest one.
fn select_best<T: Copy>(best: &mut Option<(T, f64)>, candidate: T, perplexity: f64) {
	match best {
		Some((_, best_perplexity)) if *best_perplexity <= perplexity => (),
		_ => *best = Some((candidate, perplexity)),
	}
}

/// Picks the back-off discount with the lowest perplexity on `development`.
///
/// # Returns
/// The best `(discount, perplexity)` pair.
///
/// # Errors
/// - `LmError::Configuration` if `candidates` is empty or holds an invalid discount.
/// - Any evaluation error (empty or malformed development set).
pub fn tune_discount(
	tables: &FrequencyTables,
	development: &[Sentence],
	candidates: &[f64],
	smoothing: f64,
) -> Result<(f64, f64)> {
	let mut best = None;
	for &discount in candidates {
		let estimator = BackoffEstimator::new(tables, discount, smoothing)?;
		let perplexity = evaluate_parallel(development, &estimator, None)?.perplexity;
		log::debug!("Back-off discount {}: perplexity {}", discount, perplexity);
		select_best(&mut best, discount, perplexity);
	}
	best.ok_or_else(|| LmError::Configuration("no discount candidate to tune".to_owned()))
}

/// Picks the interpolation weights with the lowest perplexity on `development`.
///
/// # Returns
/// The best `(weights, perplexity)` pair.
///
/// # Errors
/// - `LmError::Configuration` if `candidates` is empty or holds negative weights.
/// - Any evaluation error (empty or malformed development set).
pub fn tune_weights(
	tables: &FrequencyTables,
	development: &[Sentence],
	candidates: &[InterpolationWeights],
	smoothing: f64,
) -> Result<(InterpolationWeights, f64)> {
	let mut best = None;
	for &weights in candidates {
		let estimator = InterpolationEstimator::from_tables(tables, weights, smoothing)?;
		let perplexity = evaluate_parallel(development, &estimator, None)?.perplexity;
		log::debug!(
			"Interpolation weights ({}, {}, {}): perplexity {}",
			weights.trigram,
			weights.bigram,
			weights.unigram,
			perplexity
		);
		select_best(&mut best, weights, perplexity);
	}
	best.ok_or_else(|| LmError::Configuration("no weight candidate to tune".to_owned()))
}
