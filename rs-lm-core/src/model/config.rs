use serde::{Deserialize, Serialize};

use crate::corpus::SplitProportions;
use crate::error::{LmError, Result};

/// Tolerance used when checking that the interpolation weights sum to one.
const WEIGHT_EPSILON: f64 = 1e-6;

/// Fixed weights of the interpolation estimator.
///
/// `trigram`, `bigram` and `unigram` are respectively λ1, λ2 and λ3.
/// They are meant to sum to 1; this is reported but not enforced.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct InterpolationWeights {
	pub trigram: f64,
	pub bigram: f64,
	pub unigram: f64,
}

impl Default for InterpolationWeights {
	fn default() -> Self {
		Self { trigram: 0.1, bigram: 0.5, unigram: 0.4 }
	}
}

impl InterpolationWeights {
	pub fn new(trigram: f64, bigram: f64, unigram: f64) -> Self {
		Self { trigram, bigram, unigram }
	}

	/// λ1 + λ2 + λ3.
	pub fn sum(&self) -> f64 {
		self.trigram + self.bigram + self.unigram
	}

	/// Checks that every weight is finite and non-negative.
	///
	/// A sum different from 1 only logs a warning.
	///
	/// # Errors
	/// Returns `LmError::Configuration` on a negative or non-finite weight.
	pub fn validate(&self) -> Result<()> {
		for (name, value) in [("trigram", self.trigram), ("bigram", self.bigram), ("unigram", self.unigram)] {
			if !value.is_finite() || value < 0.0 {
				return Err(LmError::Configuration(format!(
					"{} weight must be a non-negative number, got {}",
					name, value
				)));
			}
		}
		if (self.sum() - 1.0).abs() > WEIGHT_EPSILON {
			log::warn!("Interpolation weights sum to {} instead of 1.0", self.sum());
		}
		Ok(())
	}
}

/// Tunable parameters of the language model.
///
/// # Invariants
/// - `discount` lies in `(0, 1)`
/// - `smoothing` is strictly positive
/// - `weights` are non-negative
/// - `split` proportions lie in `[0, 1]` and sum to 1
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
	/// Back-off discount factor D.
	pub discount: f64,

	/// Additive smoothing constant K.
	pub smoothing: f64,

	/// Interpolation weights λ1, λ2, λ3.
	pub weights: InterpolationWeights,

	/// Training / development / test shares used by the corpus loader.
	pub split: SplitProportions,

	/// Rounds the average log2 probability to this many decimals before
	/// exponentiation, half away from zero. `Some(2)` follows the historical
	/// two-decimal convention; the rounding is applied to the `f64` average, so a
	/// value lying on a `.xx5` boundary may round differently than an exact
	/// decimal quotient would.
	pub log_average_decimals: Option<u32>,
}

impl Default for ModelConfig {
	fn default() -> Self {
		Self {
			discount: 0.7,
			smoothing: 1.0,
			weights: InterpolationWeights::default(),
			split: SplitProportions::default(),
			log_average_decimals: None,
		}
	}
}

impl ModelConfig {
	/// Checks every invariant of the configuration.
	///
	/// # Errors
	/// Returns `LmError::Configuration` naming the first invalid parameter.
	pub fn validate(&self) -> Result<()> {
		validate_discount(self.discount)?;
		validate_smoothing(self.smoothing)?;
		self.weights.validate()?;
		self.split.validate()
	}

	/// Sets the discount factor (0.0..1.0, both excluded).
	///
	/// # Errors
	/// Returns an error if the value is outside the valid range.
	pub fn set_discount(&mut self, discount: f64) -> Result<()> {
		validate_discount(discount)?;
		self.discount = discount;
		Ok(())
	}

	/// Sets the smoothing constant (strictly positive).
	///
	/// # Errors
	/// Returns an error if the value is not strictly positive.
	pub fn set_smoothing(&mut self, smoothing: f64) -> Result<()> {
		validate_smoothing(smoothing)?;
		self.smoothing = smoothing;
		Ok(())
	}

	/// Sets the interpolation weights.
	///
	/// # Errors
	/// Returns an error if a weight is negative or not finite.
	pub fn set_weights(&mut self, weights: InterpolationWeights) -> Result<()> {
		weights.validate()?;
		self.weights = weights;
		Ok(())
	}
}

pub(crate) fn validate_discount(discount: f64) -> Result<()> {
	if !(discount > 0.0 && discount < 1.0) {
		return Err(LmError::Configuration(format!(
			"discount must be strictly between 0.0 and 1.0, got {}",
			discount
		)));
	}
	Ok(())
}

pub(crate) fn validate_smoothing(smoothing: f64) -> Result<()> {
	if !(smoothing.is_finite() && smoothing > 0.0) {
		return Err(LmError::Configuration(format!("smoothing constant must be > 0.0, got {}", smoothing)));
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_is_valid() {
		let config = ModelConfig::default();
		assert!(config.validate().is_ok());
		assert_eq!(config.discount, 0.7);
		assert_eq!(config.smoothing, 1.0);
		assert_eq!(config.weights, InterpolationWeights::new(0.1, 0.5, 0.4));
	}

	#[test]
	fn test_discount_range() {
		let mut config = ModelConfig::default();
		assert!(config.set_discount(0.0).is_err());
		assert!(config.set_discount(1.0).is_err());
		assert!(config.set_discount(f64::NAN).is_err());
		assert!(config.set_discount(0.5).is_ok());
		assert_eq!(config.discount, 0.5);
	}

	#[test]
	fn test_smoothing_must_be_positive() {
		let mut config = ModelConfig::default();
		assert!(config.set_smoothing(0.0).is_err());
		assert!(config.set_smoothing(-1.0).is_err());
		assert!(config.set_smoothing(f64::INFINITY).is_err());
		assert!(config.set_smoothing(0.5).is_ok());
	}

	#[test]
	fn test_weights_are_not_forced_to_sum_to_one() {
		let mut config = ModelConfig::default();
		assert!(config.set_weights(InterpolationWeights::new(0.5, 0.5, 0.5)).is_ok());
		assert!(config.set_weights(InterpolationWeights::new(-0.1, 0.6, 0.5)).is_err());
	}

	#[test]
	fn test_invalid_split_is_rejected() {
		let mut config = ModelConfig::default();
		config.split.test = 0.5;
		assert!(matches!(config.validate(), Err(LmError::Configuration(_))));
	}
}
