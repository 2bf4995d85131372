use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced to the caller by corpus loading, training, and evaluation.
///
/// Missing table entries and zero probabilities are not errors: the estimators
/// resolve them locally through their fallback paths.
#[derive(Debug, Error)]
pub enum LmError {
	/// A tunable is outside its valid range (split proportions, discount,
	/// smoothing constant, lambdas, tuning grid).
	#[error("invalid configuration: {0}")]
	Configuration(String),

	/// The corpus path is missing or unreadable.
	#[error("cannot read corpus {}: {source}", .path.display())]
	CorpusIo {
		path: PathBuf,
		#[source]
		source: io::Error,
	},

	/// The evaluated sentences contain no tokens, so perplexity is undefined.
	#[error("cannot compute perplexity over an empty set of sentences")]
	EmptyCorpus,

	/// A sentence does not satisfy the sentinel layout `<s> <s> ... </s>`.
	#[error("malformed sentence #{index}: {reason}")]
	MalformedSentence { index: usize, reason: String },
}

pub type Result<T> = std::result::Result<T, LmError>;
