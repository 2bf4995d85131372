use std::sync::mpsc;
use std::thread;

use super::backoff::BackoffEstimator;
use super::config::InterpolationWeights;
use super::estimator::Estimator;
use super::interpolation::InterpolationEstimator;
use super::tables::{FrequencyTables, History};
use crate::corpus::{END_TOKEN, START_TOKEN, Sentence};
use crate::error::{LmError, Result};

/// Outcome of a perplexity evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PerplexityReport {
	/// Number of evaluated sentences.
	pub sentences: usize,
	/// N: every token of every sentence, sentinels included.
	pub tokens: usize,
	/// Sentences left out of `log2_sum` because their log probability was exactly 0.
	pub skipped_sentences: usize,
	/// L: sum of the log2 probabilities of the kept sentences.
	pub log2_sum: f64,
	/// `2^(-L / N)`.
	pub perplexity: f64,
}

/// Partial sums over a run of sentences.
#[derive(Clone, Copy, Debug, Default)]
struct Accumulator {
	sentences: usize,
	tokens: usize,
	skipped_sentences: usize,
	log2_sum: f64,
}

impl Accumulator {
	fn absorb(&mut self, other: &Self) {
		self.sentences += other.sentences;
		self.tokens += other.tokens;
		self.skipped_sentences += other.skipped_sentences;
		self.log2_sum += other.log2_sum;
	}

	fn finish(self, log_average_decimals: Option<u32>) -> Result<PerplexityReport> {
		if self.tokens == 0 {
			return Err(LmError::EmptyCorpus);
		}

		let mut average = self.log2_sum / self.tokens as f64;
		if let Some(decimals) = log_average_decimals {
			let scale = 10f64.powi(decimals as i32);
			average = (average * scale).round() / scale;
		}

		Ok(PerplexityReport {
			sentences: self.sentences,
			tokens: self.tokens,
			skipped_sentences: self.skipped_sentences,
			log2_sum: self.log2_sum,
			perplexity: 2f64.powf(-average),
		})
	}
}

fn check_sentence(index: usize, sentence: &[String]) -> Result<()> {
	if sentence.len() < 3 {
		return Err(LmError::MalformedSentence {
			index,
			reason: format!("expected at least 3 tokens, got {}", sentence.len()),
		});
	}
	if sentence[0] != START_TOKEN || sentence[1] != START_TOKEN {
		return Err(LmError::MalformedSentence {
			index,
			reason: format!("expected to start with \"{START_TOKEN} {START_TOKEN}\""),
		});
	}
	if sentence.last().map(String::as_str) != Some(END_TOKEN) {
		return Err(LmError::MalformedSentence { index, reason: format!("expected to end with \"{END_TOKEN}\"") });
	}
	Ok(())
}

/// Sum of `log2 p(w_i | w_{i-2} w_{i-1})` for every position from the third token on.
pub fn sentence_log2_probability<E: Estimator + ?Sized>(sentence: &[String], estimator: &E) -> f64 {
	sentence
		.windows(3)
		.map(|window| estimator.estimate(&History::new(&window[0], &window[1]), &window[2]).log2())
		.sum()
}

/// Accumulates `sentences`, numbered from `offset` in error messages.
fn accumulate<E: Estimator + ?Sized>(sentences: &[Sentence], offset: usize, estimator: &E) -> Result<Accumulator> {
	let mut accumulator = Accumulator::default();
	for (i, sentence) in sentences.iter().enumerate() {
		check_sentence(offset + i, sentence)?;

		let log2_probability = sentence_log2_probability(sentence, estimator);
		if estimator.skips_zero_sentences() && log2_probability == 0.0 {
			accumulator.skipped_sentences += 1;
		} else {
			accumulator.log2_sum += log2_probability;
		}
		accumulator.sentences += 1;
		accumulator.tokens += sentence.len();
	}
	Ok(accumulator)
}

/// Evaluates `sentences` on the current thread.
///
/// # Errors
/// - `LmError::MalformedSentence` if a sentence breaks the sentinel layout.
/// - `LmError::EmptyCorpus` if there is no token to average over.
pub fn evaluate<E: Estimator + ?Sized>(
	sentences: &[Sentence],
	estimator: &E,
	log_average_decimals: Option<u32>,
) -> Result<PerplexityReport> {
	accumulate(sentences, 0, estimator)?.finish(log_average_decimals)
}

/// Evaluates `sentences` across worker threads.
///
/// # Behavior
/// - Splits input into chunks (CPU cores * factor).
/// - Each scoped thread accumulates one chunk and sends `(chunk index, sums)`.
/// - Partial sums are reduced in chunk order, so repeated runs give the same result.
///
/// # Errors
/// Same as `evaluate`; the error of the lowest failing chunk is returned.
pub fn evaluate_parallel<E: Estimator + ?Sized>(
	sentences: &[Sentence],
	estimator: &E,
	log_average_decimals: Option<u32>,
) -> Result<PerplexityReport> {
	if sentences.is_empty() {
		return Err(LmError::EmptyCorpus);
	}

	let cpus = num_cpus::get();
	let factor = 8;
	let chunks = cpus * factor;
	let chunk_size = sentences.len().div_ceil(chunks);

	let (tx, rx) = mpsc::channel();
	thread::scope(|scope| {
		for (index, chunk) in sentences.chunks(chunk_size).enumerate() {
			let tx = tx.clone();
			scope.spawn(move || {
				let partial = accumulate(chunk, index * chunk_size, estimator);
				// The receiver outlives the scope, sending cannot fail
				let _ = tx.send((index, partial));
			});
		}
	});
	drop(tx);

	let mut partials: Vec<(usize, Result<Accumulator>)> = rx.iter().collect();
	partials.sort_by_key(|(index, _)| *index);
	log::debug!("Reducing {} partial sums of up to {} sentences", partials.len(), chunk_size);

	let mut total = Accumulator::default();
	for (_, partial) in partials {
		total.absorb(&partial?);
	}
	total.finish(log_average_decimals)
}

/// Perplexity of `sentences` under `estimator`: `2^(-L / N)`.
pub fn perplexity<E: Estimator + ?Sized>(sentences: &[Sentence], estimator: &E) -> Result<f64> {
	Ok(evaluate(sentences, estimator, None)?.perplexity)
}

/// Perplexity of `sentences` under discounted back-off.
pub fn perplexity_backoff(sentences: &[Sentence], tables: &FrequencyTables, discount: f64, smoothing: f64) -> Result<f64> {
	let estimator = BackoffEstimator::new(tables, discount, smoothing)?;
	perplexity(sentences, &estimator)
}

/// Perplexity of `sentences` under linear interpolation.
pub fn perplexity_interpolation(
	sentences: &[Sentence],
	tables: &FrequencyTables,
	lambda1: f64,
	lambda2: f64,
	lambda3: f64,
	smoothing: f64,
	total_token_count: usize,
) -> Result<f64> {
	let weights = InterpolationWeights::new(lambda1, lambda2, lambda3);
	let estimator = InterpolationEstimator::new(tables, weights, smoothing, total_token_count)?;
	perplexity(sentences, &estimator)
}
