use std::path::PathBuf;

use clap::Parser;
use rs_lm_core::{InterpolationWeights, LanguageModel, ModelConfig, Smoothing, load_corpus};
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug)]
#[command(name = "rs-lm-exemple")]
#[command(about = "Trains trigram language models and reports their perplexity")]
#[command(version)]
struct Args {
    /// Configuration file, created with defaults when missing
    #[arg(default_value = "rs-lm.toml")]
    config: PathBuf,

    /// Tune discount and weights before testing, whatever the configuration says
    #[arg(long)]
    tune: bool,
}

/// Driver settings, read from a TOML file (created with defaults when missing).
#[derive(Serialize, Deserialize, Debug)]
#[serde(default)]
struct DriverConfig {
    /// Corpus whose training partition builds the model
    training_corpus: PathBuf,
    /// Corpus whose test partition is evaluated
    test_corpus: PathBuf,
    /// Tune discount and weights on the training corpus development partition first
    tune: bool,
    model: ModelConfig,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            training_corpus: PathBuf::from("corpus/gutenberg.txt"),
            test_corpus: PathBuf::from("corpus/brown.txt"),
            tune: false,
            model: ModelConfig::default(),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG=info (or debug) shows training and evaluation details
    env_logger::init();

    let args = Args::parse();
    let config: DriverConfig = confy::load_path(&args.config)?;
    log::info!("Using configuration {}", args.config.display());

    println!("Building the language models on {}...", config.training_corpus.display());
    let (mut model, training_split) = LanguageModel::from_corpus(&config.training_corpus, config.model)?;

    if (config.tune || args.tune) && !training_split.development.is_empty() {
        let discount = model.tune_discount(&training_split.development, &[0.3, 0.5, 0.7, 0.9])?;
        let weights = model.tune_weights(
            &training_split.development,
            &[
                InterpolationWeights::new(0.1, 0.5, 0.4),
                InterpolationWeights::new(0.2, 0.5, 0.3),
                InterpolationWeights::new(0.3, 0.4, 0.3),
                InterpolationWeights::new(0.6, 0.3, 0.1),
            ],
        )?;
        println!("Tuned discount: {}", discount);
        println!("Tuned weights: {} / {} / {}", weights.trigram, weights.bigram, weights.unigram);
    }

    // Only the test partition of the test corpus is evaluated
    let test_split = load_corpus(&config.test_corpus, &model.config().split)?;
    println!(
        "Total No. of {} test sentences: {}",
        config.test_corpus.display(),
        test_split.test.len()
    );

    for smoothing in [Smoothing::Backoff, Smoothing::Interpolation] {
        println!("\nRunning {:?} perplexity test using {}...", smoothing, config.test_corpus.display());
        let report = model.evaluate(&test_split.test, smoothing)?;
        println!("Testing {} in {:?}:\n Perplexity: {}", config.test_corpus.display(), smoothing, report.perplexity);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_arguments() {
        let args = Args::parse_from(["rs-lm-exemple"]);
        assert_eq!(args.config, PathBuf::from("rs-lm.toml"));
        assert!(!args.tune);
    }

    #[test]
    fn test_config_path_and_tune_flag() {
        let args = Args::parse_from(["rs-lm-exemple", "custom.toml", "--tune"]);
        assert_eq!(args.config, PathBuf::from("custom.toml"));
        assert!(args.tune);
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        assert!(Args::try_parse_from(["rs-lm-exemple", "--verbose"]).is_err());
    }
}
