//! Command-line interface for the augmentation job.
//!
//! ```bash
//! augment --limit 10
//! augment --language fr --gpu cuda:1
//! augment --language de --gpu cuda:3 --save-dir data/augmented_train_ds
//! ```
//!
//! Flags override the values loaded from `--config` (default `config.toml`);
//! when that file is absent the built-in defaults apply.

use crate::config::Config;
use crate::error::Result;
use crate::job::run_augmentation;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "augment",
    about = "Back-translate a GLUE training split and save it as a tensor dataset",
    version
)]
pub struct Args {
    /// TOML configuration file
    #[arg(long, default_value = "config.toml")]
    pub config: PathBuf,
    /// Directory the tensor dataset is written to
    #[arg(long)]
    pub save_dir: Option<String>,
    /// Device for the translation models ("cuda:N", "cpu", or "" for CPU)
    #[arg(long)]
    pub gpu: Option<String>,
    /// GLUE task (sst2, cola)
    #[arg(long)]
    pub dataset: Option<String>,
    /// Python-style slice bound on the training split (-1 drops the last row)
    #[arg(long, allow_hyphen_values = true)]
    pub limit: Option<i64>,
    /// Pivot language code (fr, de, es, it, ...)
    #[arg(long)]
    pub language: Option<String>,
    /// Root directory of the extracted GLUE data
    #[arg(long)]
    pub data_dir: Option<String>,
    /// Directory holding the tokenizer's vocab.txt
    #[arg(long)]
    pub vocab_dir: Option<String>,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Overlay the command-line flags on `config`.
    pub fn apply(&self, mut config: Config) -> Config {
        let aug = &mut config.augment;
        if let Some(save_dir) = &self.save_dir {
            aug.save_dir = save_dir.clone();
        }
        if let Some(gpu) = &self.gpu {
            aug.device = gpu.clone();
        }
        if let Some(dataset) = &self.dataset {
            aug.dataset = dataset.clone();
        }
        if let Some(limit) = self.limit {
            aug.limit = limit;
        }
        if let Some(language) = &self.language {
            aug.language = language.clone();
        }
        if let Some(data_dir) = &self.data_dir {
            aug.data_dir = data_dir.clone();
        }
        if let Some(vocab_dir) = &self.vocab_dir {
            config.tokenizer.vocab_dir = vocab_dir.clone();
        }
        config
    }
}

pub fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(level)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Resolve the configuration and run the job.
pub fn run(args: Args) -> Result<()> {
    let config_path = args.config.display().to_string();
    let base = if args.config.exists() {
        Config::load(&config_path).unwrap_or_else(|e| {
            warn!(path = %config_path, error = %e, "could not load config, using defaults");
            Config::default()
        })
    } else {
        Config::default()
    };
    let config = args.apply(base);

    let path = run_augmentation(&config)?;
    info!(path = %path.display(), "done");
    Ok(())
}
