use std::collections::HashMap;
use std::sync::mpsc;
use std::thread;

use super::continuations::Continuations;
use crate::corpus::Sentence;

/// Two-token history of a trigram, older token first.
///
/// Compared and hashed by value on both positions.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct History {
	pub older: String,
	pub newer: String,
}

impl History {
	pub fn new(older: &str, newer: &str) -> Self {
		Self { older: older.to_owned(), newer: newer.to_owned() }
	}
}

/// Unigram, bigram and trigram count tables built from training sentences.
///
/// # Responsibilities
/// - Count every n-gram (n = 1..=3) of every sentence, sentinels included
/// - Answer count lookups, treating absent histories and words as 0
/// - Merge with tables built from another part of the corpus
///
/// # Invariants
/// - Every stored count is strictly positive
/// - `total_tokens` is the sum of all unigram counts
/// - Tables are not modified once training is over
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrequencyTables {
	unigrams: HashMap<String, usize>,
	bigrams: HashMap<String, Continuations>,
	trigrams: HashMap<History, Continuations>,
	total_tokens: usize,
}

impl FrequencyTables {
	/// Creates empty tables.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds the tables by folding over `sentences` on the current thread.
	pub fn train(sentences: &[Sentence]) -> Self {
		let mut tables = Self::new();
		for sentence in sentences {
			tables.add_sentence(sentence);
		}
		tables
	}

	/// Builds the tables by splitting `sentences` into chunks, counting each
	/// chunk on its own thread and merging the partial tables.
	///
	/// # Behavior
	/// - Splits input into chunks (CPU cores * factor).
	/// - Spawns one thread per chunk to build partial tables.
	/// - Merges partial tables as they arrive; the result equals `train`.
	pub fn train_parallel(sentences: &[Sentence]) -> Self {
		if sentences.is_empty() {
			return Self::new();
		}

		let cpus = num_cpus::get();
		let factor = 8;
		let chunks = cpus * factor;
		let chunk_size = sentences.len().div_ceil(chunks);

		let (tx, rx) = mpsc::channel();
		thread::scope(|scope| {
			for chunk in sentences.chunks(chunk_size) {
				let tx = tx.clone();
				scope.spawn(move || {
					// The receiver outlives the scope, sending cannot fail
					let _ = tx.send(Self::train(chunk));
				});
			}
		});
		drop(tx);

		let mut tables = Self::new();
		for partial in rx.iter() {
			tables.merge(&partial);
		}
		log::debug!("Merged tables from {} chunks of up to {} sentences", sentences.len().div_ceil(chunk_size), chunk_size);
		tables
	}

	/// Adds every unigram, bigram and trigram of `sentence` to the tables.
	pub fn add_sentence(&mut self, sentence: &[String]) {
		for token in sentence {
			*self.unigrams.entry(token.clone()).or_insert(0) += 1;
		}
		self.total_tokens += sentence.len();

		for window in sentence.windows(2) {
			self.bigrams.entry(window[0].clone()).or_default().add(&window[1]);
		}

		for window in sentence.windows(3) {
			self.trigrams
				.entry(History::new(&window[0], &window[1]))
				.or_default()
				.add(&window[2]);
		}
	}

	/// Merges another set of tables into this one.
	///
	/// Occurrence counts are summed; merging is order-independent.
	pub fn merge(&mut self, other: &Self) {
		for (token, count) in &other.unigrams {
			*self.unigrams.entry(token.clone()).or_insert(0) += count;
		}
		for (history, continuations) in &other.bigrams {
			self.bigrams.entry(history.clone()).or_default().merge(continuations);
		}
		for (history, continuations) in &other.trigrams {
			self.trigrams.entry(history.clone()).or_default().merge(continuations);
		}
		self.total_tokens += other.total_tokens;
	}

	/// Occurrences of `token`, 0 if never seen.
	pub fn unigram_count(&self, token: &str) -> usize {
		self.unigrams.get(token).copied().unwrap_or(0)
	}

	/// Returns `true` if `token` was seen during training.
	pub fn is_known(&self, token: &str) -> bool {
		self.unigrams.contains_key(token)
	}

	/// Occurrences of `word` right after `history`, 0 if never.
	pub fn bigram_count(&self, history: &str, word: &str) -> usize {
		self.bigrams.get(history).map_or(0, |continuations| continuations.count(word))
	}

	/// Occurrences of `word` right after `history`, 0 if never.
	pub fn trigram_count(&self, history: &History, word: &str) -> usize {
		self.trigrams.get(history).map_or(0, |continuations| continuations.count(word))
	}

	/// Continuations of the one-token `history`, if it was ever followed by a token.
	pub fn bigram_continuations(&self, history: &str) -> Option<&Continuations> {
		self.bigrams.get(history)
	}

	/// Continuations of the two-token `history`, if it was ever followed by a token.
	pub fn trigram_continuations(&self, history: &History) -> Option<&Continuations> {
		self.trigrams.get(history)
	}

	/// Iterates over `(token, count)` pairs of the unigram table.
	pub fn unigrams(&self) -> impl Iterator<Item = (&str, usize)> {
		self.unigrams.iter().map(|(token, count)| (token.as_str(), *count))
	}

	/// Number of distinct tokens seen during training.
	pub fn vocabulary_size(&self) -> usize {
		self.unigrams.len()
	}

	/// Sum of all unigram counts, i.e. the number of training tokens.
	pub fn total_token_count(&self) -> usize {
		self.total_tokens
	}

	/// Returns `true` if nothing was counted.
	pub fn is_empty(&self) -> bool {
		self.total_tokens == 0
	}

	/// Inserts a trigram without its lower-order counts, breaking the
	/// cross-table invariant on purpose.
	#[cfg(test)]
	pub(crate) fn insert_trigram_unchecked(&mut self, history: History, word: &str, count: usize) {
		self.trigrams.entry(history).or_default().add_count(word, count);
	}
}

/// Builds the unigram, bigram and trigram tables of `sentences`.
pub fn train(sentences: &[Sentence]) -> FrequencyTables {
	FrequencyTables::train(sentences)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::corpus::tokenize_line;
	use pretty_assertions::assert_eq;

	fn corpus(lines: &[&str]) -> Vec<Sentence> {
		lines.iter().map(|line| tokenize_line(line)).collect()
	}

	#[test]
	fn test_counts_on_small_corpus() {
		let tables = train(&corpus(&["the cat sat", "the dog sat"]));

		assert_eq!(tables.unigram_count("the"), 2);
		assert_eq!(tables.unigram_count("cat"), 1);
		assert_eq!(tables.unigram_count("sat"), 2);
		assert_eq!(tables.unigram_count("dog"), 1);
		assert_eq!(tables.unigram_count("<s>"), 4);
		assert_eq!(tables.unigram_count("</s>"), 2);
		assert_eq!(tables.vocabulary_size(), 6);

		assert_eq!(tables.bigram_count("sat", "</s>"), 2);
		assert_eq!(tables.bigram_count("<s>", "<s>"), 2);
		assert_eq!(tables.bigram_count("<s>", "the"), 2);
		assert_eq!(tables.bigram_count("the", "cat"), 1);

		assert_eq!(tables.trigram_count(&History::new("the", "cat"), "sat"), 1);
		assert_eq!(tables.trigram_count(&History::new("the", "dog"), "sat"), 1);
		assert_eq!(tables.trigram_count(&History::new("<s>", "<s>"), "the"), 2);
	}

	#[test]
	fn test_absent_entries_count_zero() {
		let tables = train(&corpus(&["the cat sat"]));
		assert_eq!(tables.unigram_count("zebra"), 0);
		assert!(!tables.is_known("zebra"));
		assert!(tables.is_known("</s>"));
		assert_eq!(tables.bigram_count("zebra", "cat"), 0);
		assert_eq!(tables.bigram_count("the", "zebra"), 0);
		assert_eq!(tables.trigram_count(&History::new("cat", "the"), "sat"), 0);
		assert!(tables.bigram_continuations("</s>").is_none());
		assert!(tables.trigram_continuations(&History::new("x", "y")).is_none());
	}

	#[test]
	fn test_history_compares_by_value() {
		let tables = train(&corpus(&["a b c"]));
		let built = History { older: String::from("a"), newer: String::from("b") };
		assert_eq!(tables.trigram_count(&built, "c"), 1);
		assert_eq!(tables.trigram_count(&History::new("b", "a"), "c"), 0);
	}

	#[test]
	fn test_total_matches_sentence_lengths() {
		let sentences = corpus(&["the cat sat", "a dog barked loudly", ""]);
		let tables = train(&sentences);
		let expected: usize = sentences.iter().map(Vec::len).sum();
		let unigram_sum: usize = tables.unigrams().map(|(_, count)| count).sum();
		assert_eq!(tables.total_token_count(), expected);
		assert_eq!(unigram_sum, expected);
	}

	#[test]
	fn test_training_is_idempotent_and_order_independent() {
		let sentences = corpus(&["the cat sat", "the dog sat", "a cat ran"]);
		let mut reversed = sentences.clone();
		reversed.reverse();

		assert_eq!(train(&sentences), train(&sentences));
		assert_eq!(train(&sentences), train(&reversed));
	}

	#[test]
	fn test_parallel_training_matches_sequential() {
		let lines: Vec<String> = (0..500).map(|i| format!("word{} common word{} end", i % 17, i % 5)).collect();
		let sentences: Vec<Sentence> = lines.iter().map(|line| tokenize_line(line)).collect();
		assert_eq!(FrequencyTables::train_parallel(&sentences), FrequencyTables::train(&sentences));
		assert!(FrequencyTables::train_parallel(&[]).is_empty());
	}

	#[test]
	fn test_merge_sums_tables() {
		let left = corpus(&["the cat sat"]);
		let right = corpus(&["the dog sat"]);
		let mut merged = train(&left);
		merged.merge(&train(&right));
		assert_eq!(merged, train(&corpus(&["the cat sat", "the dog sat"])));
	}
}
