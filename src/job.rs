//! The back-translation augmentation job.
//!
//! Loads a GLUE training split, back-translates every sentence through the
//! configured pivot language, then encodes the split and writes it to
//! `{save_dir}/{dataset}_{language}.pt`.
//!
//! The tensor dataset is built from the original split. The augmented
//! sentences are produced and counted but not encoded.

use crate::augment::augment_sentences;
use crate::config::Config;
use crate::data::{apply_limit, load_split, GlueTask, Split};
use crate::device::parse_device;
use crate::encoding::{create_encodings, load_tokenizer};
use crate::error::Result;
use crate::model_loader::{ensure_vocab, ModelFiles};
use crate::tensor_dataset::create_tensor_dataset;
use crate::translation::{language_from_code, BackTranslator};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Where the tensor dataset for `dataset` and `language` is written.
pub fn output_path(save_dir: impl AsRef<Path>, dataset: &str, language: &str) -> PathBuf {
    save_dir
        .as_ref()
        .join(format!("{}_{}.pt", dataset, language))
}

/// Run the job with Marian translators on the configured device.
pub fn run_augmentation(config: &Config) -> Result<PathBuf> {
    let aug = &config.augment;
    language_from_code(&aug.language)?;
    let device = parse_device(&aug.device)?;

    info!(
        dataset = %aug.dataset,
        "augmenting the training split using back translation with Helsinki-NLP/opus-mt-en-{}",
        aug.language
    );
    let translator = BackTranslator::marian(&aug.language, device, aug.batch_size)?;
    run_with_translator(config, &translator)
}

/// Run the job with an already constructed back-translator.
pub fn run_with_translator(config: &Config, translator: &BackTranslator) -> Result<PathBuf> {
    let start = Instant::now();
    let aug = &config.augment;
    let runtime = config.runtime.clone().resolve();
    let task: GlueTask = aug.dataset.parse()?;
    info!(save_dir = %aug.save_dir, "save dir");

    let vocab_files = ModelFiles::in_dir(&config.tokenizer.vocab_dir);
    ensure_vocab(
        &vocab_files,
        &config.tokenizer.vocab_repo,
        config.tokenizer.auto_download,
    )?;
    let tokenizer = load_tokenizer(&vocab_files.vocab, config.tokenizer.lowercase)?;

    let train = apply_limit(load_split(&aug.data_dir, task, Split::Train)?, aug.limit);
    info!("augmenting {} sentences using {}", train.len(), aug.language);

    let augmented = augment_sentences(&train, translator)?;
    info!(
        augmented = augmented.len(),
        "augmentation complete, saving tensor dataset to disk"
    );

    let encodings = create_encodings(
        &train,
        &tokenizer,
        config.tokenizer.max_length,
        runtime.tokenizers_parallelism,
    );
    let tensors = create_tensor_dataset(&train, &encodings);

    std::fs::create_dir_all(&aug.save_dir)?;
    let path = output_path(&aug.save_dir, &aug.dataset, &aug.language);
    tensors.save(&path)?;
    info!(
        path = %path.display(),
        elapsed_secs = start.elapsed().as_secs_f64(),
        "saved tensor dataset"
    );
    Ok(path)
}
