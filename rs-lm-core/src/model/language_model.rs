use std::path::Path;

use crate::corpus::{CorpusSplit, Sentence, load_corpus};
use crate::error::Result;
use super::backoff::BackoffEstimator;
use super::config::{InterpolationWeights, ModelConfig};
use super::estimator::Smoothing;
use super::interpolation::InterpolationEstimator;
use super::perplexity::{PerplexityReport, evaluate_parallel};
use super::tables::FrequencyTables;
use super::tuning::{tune_discount, tune_weights};

/// High-level trigram language model.
///
/// # Responsibilities
/// - Train frequency tables from sentences or from a corpus file
/// - Build back-off and interpolation estimators from its configuration
/// - Evaluate perplexity with the selected smoothing strategy
/// - Tune smoothing parameters on a development set
#[derive(Debug)]
pub struct LanguageModel {
	tables: FrequencyTables,
	config: ModelConfig,
}

impl LanguageModel {
	/// Trains a model on `sentences`.
	///
	/// # Errors
	/// Returns `LmError::Configuration` if `config` is invalid.
	pub fn train(sentences: &[Sentence], config: ModelConfig) -> Result<Self> {
		config.validate()?;
		let tables = FrequencyTables::train_parallel(sentences);
		log::info!(
			"Trained on {} sentences: {} tokens, vocabulary of {}",
			sentences.len(),
			tables.total_token_count(),
			tables.vocabulary_size()
		);
		Ok(Self { tables, config })
	}

	/// Loads the corpus at `filepath`, splits it with `config.split` and
	/// trains on the training partition.
	///
	/// # Returns
	/// The trained model and the full split, so the caller can evaluate the
	/// development and test partitions.
	///
	/// # Errors
	/// - `LmError::Configuration` if `config` is invalid.
	/// - `LmError::CorpusIo` if the file cannot be read.
	pub fn from_corpus<P: AsRef<Path>>(filepath: P, config: ModelConfig) -> Result<(Self, CorpusSplit)> {
		config.validate()?;
		let split = load_corpus(filepath, &config.split)?;
		let model = Self::train(&split.training, config)?;
		Ok((model, split))
	}

	/// Read-only access to the trained tables.
	pub fn tables(&self) -> &FrequencyTables {
		&self.tables
	}

	/// Read-only access to the configuration.
	pub fn config(&self) -> &ModelConfig {
		&self.config
	}

	/// Back-off estimator using the configured discount and smoothing constant.
	pub fn backoff(&self) -> Result<BackoffEstimator<'_>> {
		BackoffEstimator::new(&self.tables, self.config.discount, self.config.smoothing)
	}

	/// Interpolation estimator using the configured weights and the training token count.
	pub fn interpolation(&self) -> Result<InterpolationEstimator<'_>> {
		InterpolationEstimator::from_tables(&self.tables, self.config.weights, self.config.smoothing)
	}

	/// Computes the perplexity of `sentences` with the given smoothing strategy.
	///
	/// # Errors
	/// - `LmError::EmptyCorpus` if `sentences` holds no token.
	/// - `LmError::MalformedSentence` if a sentence breaks the sentinel layout.
	pub fn evaluate(&self, sentences: &[Sentence], smoothing: Smoothing) -> Result<PerplexityReport> {
		let decimals = self.config.log_average_decimals;
		let report = match smoothing {
			Smoothing::Backoff => evaluate_parallel(sentences, &self.backoff()?, decimals)?,
			Smoothing::Interpolation => evaluate_parallel(sentences, &self.interpolation()?, decimals)?,
		};
		log::info!(
			"{:?} perplexity over {} sentences ({} tokens, {} skipped): {}",
			smoothing,
			report.sentences,
			report.tokens,
			report.skipped_sentences,
			report.perplexity
		);
		Ok(report)
	}

	/// Replaces the discount with the candidate giving the lowest perplexity on `development`.
	///
	/// Returns the selected discount.
	pub fn tune_discount(&mut self, development: &[Sentence], candidates: &[f64]) -> Result<f64> {
		let (discount, perplexity) = tune_discount(&self.tables, development, candidates, self.config.smoothing)?;
		log::info!("Selected discount {} (development perplexity {})", discount, perplexity);
		self.config.set_discount(discount)?;
		Ok(discount)
	}

	/// Replaces the interpolation weights with the candidate giving the lowest
	/// perplexity on `development`.
	///
	/// Returns the selected weights.
	pub fn tune_weights(
		&mut self,
		development: &[Sentence],
		candidates: &[InterpolationWeights],
	) -> Result<InterpolationWeights> {
		let (weights, perplexity) = tune_weights(&self.tables, development, candidates, self.config.smoothing)?;
		log::info!(
			"Selected weights ({}, {}, {}) (development perplexity {})",
			weights.trigram,
			weights.bigram,
			weights.unigram,
			perplexity
		);
		self.config.set_weights(weights)?;
		Ok(weights)
	}
}
