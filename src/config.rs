//! Configuration structures for the augmentation job and the ensembles.
//!
//! Settings are loaded from a TOML file. Every section falls back to its
//! defaults, so a `config.toml` only needs the keys it changes:
//!
//! ```toml
//! [runtime]
//! tokenizers_parallelism = false
//!
//! [augment]
//! save_dir = "data/augmented_train_ds"
//! device = "cuda:0"
//! dataset = "sst2"
//! limit = -1
//! language = "fr"
//! batch_size = 1024
//! data_dir = "data/glue"
//!
//! [tokenizer]
//! vocab_dir = "models/bert-base-uncased"
//! vocab_repo = "bert-base-uncased"
//! lowercase = true
//! max_length = 128
//! auto_download = false
//!
//! [ensemble]
//! learning_rate = 1.0
//! print_freq = 25
//! batch_size = 32
//! ```

use crate::dataloader::DataLoader;
use crate::error::Result;
use crate::tensor_dataset::TensorDataset;
use serde::Deserialize;
use tracing::debug;

/// Environment variable honoured for tokenizer parallelism.
pub const TOKENIZERS_PARALLELISM_ENV: &str = "TOKENIZERS_PARALLELISM";

/// Main configuration structure loaded from `config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Process-level switches
    pub runtime: RuntimeConfig,
    /// Back-translation job settings
    pub augment: AugmentConfig,
    /// WordPiece tokenizer settings
    pub tokenizer: TokenizerConfig,
    /// Weighted-vote training settings
    pub ensemble: FitConfig,
}

/// Process-level switches, fixed once at startup.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Encode batches on the rayon pool inside the tokenizer
    pub tokenizers_parallelism: bool,
}

/// Back-translation job settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AugmentConfig {
    /// Directory the tensor dataset is written to
    pub save_dir: String,
    /// Device spec: "cuda:N", "cuda", "cpu", or empty for CPU
    pub device: String,
    /// GLUE task name (e.g. "sst2")
    pub dataset: String,
    /// Python-style slice bound applied to the training split
    pub limit: i64,
    /// Pivot language code (e.g. "fr", "de", "es", "it")
    pub language: String,
    /// Maximum number of sentences per translation call
    pub batch_size: usize,
    /// Root directory holding the extracted GLUE tasks
    pub data_dir: String,
}

/// WordPiece tokenizer settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    /// Directory holding `vocab.txt`
    pub vocab_dir: String,
    /// Hugging Face repository the vocabulary is fetched from
    pub vocab_repo: String,
    pub lowercase: bool,
    /// Longest encoded sequence, special tokens included
    pub max_length: usize,
    /// Download the vocabulary when it is missing locally
    pub auto_download: bool,
}

/// Weighted-vote training settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    /// SGD learning rate for the per-model weights
    pub learning_rate: f64,
    /// Log progress every this many batches
    pub print_freq: usize,
    /// Dataloader batch size
    pub batch_size: usize,
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed; callers that
    /// want the defaults on failure use `unwrap_or_default`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        debug!(path, "loaded config");
        Ok(config)
    }
}

impl RuntimeConfig {
    /// Resolve the effective runtime settings.
    ///
    /// A `TOKENIZERS_PARALLELISM` value present in the environment wins over
    /// the configured one. The environment is only read, never written.
    pub fn resolve(self) -> Self {
        self.resolve_with(std::env::var(TOKENIZERS_PARALLELISM_ENV).ok().as_deref())
    }

    fn resolve_with(self, env_value: Option<&str>) -> Self {
        match env_value {
            Some(value) => RuntimeConfig {
                tokenizers_parallelism: matches!(
                    value.trim().to_ascii_lowercase().as_str(),
                    "1" | "true" | "yes" | "on"
                ),
            },
            None => self,
        }
    }
}

impl FitConfig {
    /// In-order loader over `dataset` with the configured batch size.
    pub fn loader<'a>(&self, dataset: &'a TensorDataset) -> DataLoader<'a> {
        DataLoader::new(dataset, self.batch_size)
    }
}

impl Default for AugmentConfig {
    fn default() -> Self {
        AugmentConfig {
            save_dir: "data/augmented_train_ds".to_string(),
            device: "cuda:0".to_string(),
            dataset: "sst2".to_string(),
            limit: -1,
            language: "fr".to_string(),
            batch_size: 1024,
            data_dir: "data/glue".to_string(),
        }
    }
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        TokenizerConfig {
            vocab_dir: "models/bert-base-uncased".to_string(),
            vocab_repo: "bert-base-uncased".to_string(),
            lowercase: true,
            max_length: 128,
            auto_download: cfg!(feature = "auto-download"),
        }
    }
}

impl Default for FitConfig {
    fn default() -> Self {
        FitConfig {
            learning_rate: 1.0,
            print_freq: 25,
            batch_size: 32,
        }
    }
}
