//! Error types shared by the augmentation job and the ensemble library.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Tensor error: {0}")]
    Tch(#[from] tch::TchError),

    #[error("Model error: {0}")]
    Model(#[from] rust_bert::RustBertError),

    #[error("Tokenizer error: {0}")]
    Tokenizer(#[from] rust_tokenizers::error::TokenizerError),

    #[cfg(feature = "auto-download")]
    #[error("Download error: {0}")]
    Download(#[from] hf_hub::api::sync::ApiError),

    #[error("Unsupported language code: {0}")]
    UnsupportedLanguage(String),

    #[error("Unsupported dataset: {0}")]
    UnsupportedDataset(String),

    #[error("Unsupported voting strategy: {0}")]
    UnsupportedStrategy(String),

    #[error("Translation returned no output for: {0}")]
    MissingTranslation(String),

    #[error("Invalid device: {0}")]
    InvalidDevice(String),

    #[error("Ensemble requires at least one model")]
    EmptyEnsemble,

    #[error("Tensor dataset is missing `{0}`")]
    MissingTensor(String),

    #[error("Model files not found: {0}")]
    ModelFilesMissing(String),
}

pub type Result<T> = std::result::Result<T, Error>;
