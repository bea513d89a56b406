//! Model file management with optional auto-download from Hugging Face.
//!
//! A model directory follows the rust-bert layout:
//!
//! ```text
//! models/bert-base-uncased/
//!   config.json
//!   vocab.txt
//!   rust_model.ot
//! ```
//!
//! # Examples
//!
//! ```no_run
//! use glue_ensemble::model_loader::{ensure_model_files, ModelFiles};
//!
//! let files = ModelFiles::in_dir("models/bert-sst2-a");
//! ensure_model_files(&files, "textattack/bert-base-uncased-SST-2", false)?;
//! # Ok::<(), glue_ensemble::Error>(())
//! ```

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::info;

const CONFIG_FILE: &str = "config.json";
const VOCAB_FILE: &str = "vocab.txt";
const WEIGHTS_FILE: &str = "rust_model.ot";

/// Files making up one pretrained BERT model.
#[derive(Debug, Clone)]
pub struct ModelFiles {
    pub config: PathBuf,
    pub vocab: PathBuf,
    pub weights: PathBuf,
}

impl ModelFiles {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            config: dir.join(CONFIG_FILE),
            vocab: dir.join(VOCAB_FILE),
            weights: dir.join(WEIGHTS_FILE),
        }
    }

    /// Check if all required files exist
    pub fn exists(&self) -> bool {
        self.config.exists() && self.vocab.exists() && self.weights.exists()
    }

    fn all(&self) -> [&Path; 3] {
        [&self.config, &self.vocab, &self.weights]
    }
}

/// Make sure every file of a model is present, downloading the missing ones
/// from `repo_id` when `auto_download` is set.
pub fn ensure_model_files(files: &ModelFiles, repo_id: &str, auto_download: bool) -> Result<()> {
    ensure_files(&files.all(), repo_id, auto_download)
}

/// Like [`ensure_model_files`], but only for the vocabulary. The tokenizer
/// needs nothing else.
pub fn ensure_vocab(files: &ModelFiles, repo_id: &str, auto_download: bool) -> Result<()> {
    ensure_files(&[files.vocab.as_path()], repo_id, auto_download)
}

fn ensure_files(paths: &[&Path], repo_id: &str, auto_download: bool) -> Result<()> {
    let missing: Vec<&Path> = paths.iter().copied().filter(|p| !p.exists()).collect();
    if missing.is_empty() {
        return Ok(());
    }

    if !auto_download {
        let listing = missing
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(Error::ModelFilesMissing(listing));
    }

    #[cfg(feature = "auto-download")]
    {
        info!(repo_id, count = missing.len(), "downloading model files from Hugging Face");
        download_from_hf(&missing, repo_id)?;
        info!("model files downloaded");
        Ok(())
    }

    #[cfg(not(feature = "auto-download"))]
    {
        info!(repo_id, "auto-download requested but the feature is disabled");
        Err(Error::ModelFilesMissing(
            "auto-download feature not enabled; rebuild with --features auto-download".to_string(),
        ))
    }
}

#[cfg(feature = "auto-download")]
fn download_from_hf(missing: &[&Path], repo_id: &str) -> Result<()> {
    use hf_hub::api::sync::Api;

    let api = Api::new()?;
    let repo = api.model(repo_id.to_string());

    for path in missing {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| Error::ModelFilesMissing(path.display().to_string()))?;
        info!(file_name, "downloading");
        let downloaded = repo.get(file_name)?;
        std::fs::copy(&downloaded, path)?;
    }

    Ok(())
}
