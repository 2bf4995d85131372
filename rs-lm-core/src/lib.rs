//! Trigram language modelling library.
//!
//! This crate provides:
//! - Corpus loading into sentinel-wrapped sentences and positional splitting
//! - Unigram, bigram and trigram frequency tables
//! - Discounted back-off and fixed-weight interpolation estimators
//! - Perplexity evaluation and development-set tuning
//!
//! The free functions `train`, `perplexity_backoff` and
//! `perplexity_interpolation` cover the common pipeline; `LanguageModel`
//! bundles the same steps behind a configuration.

/// Corpus loading, cleaning and train/dev/test splitting.
pub mod corpus;

/// Error type shared by every fallible operation.
pub mod error;

/// Frequency tables, estimators and perplexity evaluation.
pub mod model;

/// I/O utilities (file loading).
///
/// Not exposed
pub(crate) mod io;

pub use corpus::{CorpusSplit, END_TOKEN, START_TOKEN, Sentence, SplitProportions, load_corpus, split_text};
pub use error::{LmError, Result};
pub use model::config::{InterpolationWeights, ModelConfig};
pub use model::estimator::{Estimator, Smoothing};
pub use model::language_model::LanguageModel;
pub use model::perplexity::{PerplexityReport, perplexity, perplexity_backoff, perplexity_interpolation};
pub use model::tables::{FrequencyTables, History, train};
