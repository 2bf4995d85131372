//! Top-level module for the trigram language model.
//!
//! This module provides:
//! - Unigram, bigram and trigram count tables (`FrequencyTables`)
//! - Discounted back-off and linear interpolation estimators
//! - Perplexity evaluation, sequential or across threads
//! - Development-set tuning of the smoothing parameters
//! - A high-level facade (`LanguageModel`)

/// Discounted back-off estimator.
///
/// Trigram, then bigram, then unigram estimates, with the mass left by
/// discounting redistributed to the lower order.
pub mod backoff;

/// Tunable parameters (discount, smoothing constant, interpolation weights,
/// split proportions) and their validation.
pub mod config;

/// Continuation counts of a single history.
pub mod continuations;

/// The `Estimator` trait shared by both smoothing strategies.
pub mod estimator;

/// Fixed-weight linear interpolation estimator.
pub mod interpolation;

/// High-level model owning the tables and the configuration.
pub mod language_model;

/// Perplexity evaluation over sentinel-wrapped sentences.
pub mod perplexity;

/// Unigram, bigram and trigram frequency tables.
pub mod tables;

/// Grid search of smoothing parameters on a development set.
pub mod tuning;
