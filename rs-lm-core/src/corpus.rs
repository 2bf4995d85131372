//! Corpus loading: raw lines to cleaned, sentinel-wrapped token sentences,
//! split positionally into training, development and test partitions.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LmError, Result};
use crate::io::read_lines;

/// Start-of-sentence marker. Every sentence begins with two of them.
pub const START_TOKEN: &str = "<s>";

/// End-of-sentence marker. Every sentence ends with exactly one.
pub const END_TOKEN: &str = "</s>";

/// Characters removed from every line before tokenization.
const STRIPPED_CHARS: &[char] = &['(', ')', '%', '#', '@', '*', '&', ',', '.', '!', '?', '`', '"'];

/// Tolerance used when checking that the split proportions sum to one.
const PROPORTION_EPSILON: f64 = 1e-6;

/// An ordered sequence of tokens, `<s> <s> ... </s>`.
pub type Sentence = Vec<String>;

/// Share of the corpus assigned to each partition.
///
/// # Invariants
/// - each share lies in `[0, 1]`
/// - the three shares sum to 1
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct SplitProportions {
	pub training: f64,
	pub development: f64,
	pub test: f64,
}

impl Default for SplitProportions {
	fn default() -> Self {
		Self { training: 0.90, development: 0.05, test: 0.05 }
	}
}

impl SplitProportions {
	/// Checks the proportions invariants.
	///
	/// # Errors
	/// Returns `LmError::Configuration` if a share is outside `[0, 1]` or
	/// if the shares do not sum to 1.
	pub fn validate(&self) -> Result<()> {
		for (name, value) in [("training", self.training), ("development", self.development), ("test", self.test)] {
			if !(0.0..=1.0).contains(&value) {
				return Err(LmError::Configuration(format!(
					"{} proportion must be between 0.0 and 1.0, got {}",
					name, value
				)));
			}
		}
		let sum = self.training + self.development + self.test;
		if (sum - 1.0).abs() > PROPORTION_EPSILON {
			return Err(LmError::Configuration(format!("split proportions must sum to 1.0, got {}", sum)));
		}
		Ok(())
	}
}

/// The three partitions of a corpus, in file order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CorpusSplit {
	pub training: Vec<Sentence>,
	pub development: Vec<Sentence>,
	pub test: Vec<Sentence>,
}

impl CorpusSplit {
	/// Total number of sentences across the three partitions.
	pub fn len(&self) -> usize {
		self.training.len() + self.development.len() + self.test.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

/// Cleans one raw line into a sentinel-wrapped sentence.
///
/// The line is wrapped with `<s> <s>` / `</s>`, lowercased, stripped of
/// punctuation and split on whitespace. An empty line yields `<s> <s> </s>`.
pub fn tokenize_line(line: &str) -> Sentence {
	let wrapped = format!("{START_TOKEN} {START_TOKEN} {line} {END_TOKEN}").to_lowercase();
	let cleaned: String = wrapped.chars().filter(|c| !STRIPPED_CHARS.contains(c)).collect();
	cleaned.split_whitespace().map(str::to_owned).collect()
}

/// Tokenizes every line of `text` and splits the sentences positionally.
///
/// # Errors
/// Returns `LmError::Configuration` if the proportions are invalid.
pub fn split_text(text: &str, proportions: &SplitProportions) -> Result<CorpusSplit> {
	let sentences: Vec<Sentence> = text.lines().map(tokenize_line).collect();
	split_sentences(sentences, proportions)
}

/// Reads the corpus at `path` (one sentence per line) and splits it.
///
/// # Errors
/// - `LmError::Configuration` if the proportions are invalid.
/// - `LmError::CorpusIo` if the file cannot be read.
pub fn load_corpus<P: AsRef<Path>>(path: P, proportions: &SplitProportions) -> Result<CorpusSplit> {
	proportions.validate()?;
	let lines = read_lines(&path)?;
	log::info!("Read {} lines from {}", lines.len(), path.as_ref().display());
	let sentences: Vec<Sentence> = lines.iter().map(|line| tokenize_line(line)).collect();
	split_sentences(sentences, proportions)
}

/// Splits already tokenized sentences into the three partitions.
///
/// `training_end = floor(training * n)` and
/// `development_end = floor(development * n + training_end)`;
/// the test partition takes the remaining suffix.
pub fn split_sentences(mut sentences: Vec<Sentence>, proportions: &SplitProportions) -> Result<CorpusSplit> {
	proportions.validate()?;

	let n = sentences.len();
	let training_end = ((proportions.training * n as f64) as usize).min(n);
	let development_end = ((proportions.development * n as f64 + training_end as f64) as usize).clamp(training_end, n);

	let test = sentences.split_off(development_end);
	let development = sentences.split_off(training_end);
	let split = CorpusSplit { training: sentences, development, test };

	log::info!(
		"Corpus split: {} training, {} development, {} test sentences",
		split.training.len(),
		split.development.len(),
		split.test.len()
	);
	Ok(split)
}
