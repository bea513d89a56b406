//! Marian translation models and round-trip (back) translation.
//!
//! Based on the rust-bert translation pipeline:
//! <https://github.com/guillaume-be/rust-bert>

use crate::error::{Error, Result};
use rust_bert::pipelines::common::ModelType;
use rust_bert::pipelines::translation::{Language, TranslationModel, TranslationModelBuilder};
use tch::Device;
use tracing::info;

/// Anything that maps a batch of sentences to their translations, one output
/// per input, in order.
pub trait Translator {
    fn translate(&self, texts: &[String]) -> Result<Vec<String>>;
}

/// Map an ISO 639-1 code to a pivot language with Marian models in both
/// directions.
pub fn language_from_code(code: &str) -> Result<Language> {
    match code.to_ascii_lowercase().as_str() {
        "fr" => Ok(Language::French),
        "de" => Ok(Language::German),
        "es" => Ok(Language::Spanish),
        "it" => Ok(Language::Italian),
        "pt" => Ok(Language::Portuguese),
        "ro" => Ok(Language::Romanian),
        "ru" => Ok(Language::Russian),
        "nl" => Ok(Language::Dutch),
        "sv" => Ok(Language::Swedish),
        _ => Err(Error::UnsupportedLanguage(code.to_string())),
    }
}

/// One direction of a Marian (opus-mt) translation model.
pub struct MarianTranslator {
    model: TranslationModel,
    source: Language,
    target: Language,
}

impl MarianTranslator {
    /// Load the pretrained model for `source -> target`, downloading it on
    /// first use.
    pub fn new(source: Language, target: Language, device: Device) -> Result<Self> {
        info!(?source, ?target, ?device, "loading Marian translation model");
        let model = TranslationModelBuilder::new()
            .with_device(device)
            .with_model_type(ModelType::Marian)
            .with_source_languages(vec![source])
            .with_target_languages(vec![target])
            .create_model()?;
        Ok(MarianTranslator {
            model,
            source,
            target,
        })
    }
}

impl Translator for MarianTranslator {
    fn translate(&self, texts: &[String]) -> Result<Vec<String>> {
        Ok(self.model.translate(texts, self.source, self.target)?)
    }
}

/// English -> pivot -> English paraphrasing.
pub struct BackTranslator {
    forward: Box<dyn Translator>,
    backward: Box<dyn Translator>,
    batch_size: usize,
}

impl BackTranslator {
    pub fn new(forward: Box<dyn Translator>, backward: Box<dyn Translator>, batch_size: usize) -> Self {
        BackTranslator {
            forward,
            backward,
            batch_size: batch_size.max(1),
        }
    }

    /// Load both Marian directions for the pivot language `code` on `device`.
    pub fn marian(code: &str, device: Device, batch_size: usize) -> Result<Self> {
        let pivot = language_from_code(code)?;
        let forward = MarianTranslator::new(Language::English, pivot, device)?;
        let backward = MarianTranslator::new(pivot, Language::English, device)?;
        Ok(Self::new(Box::new(forward), Box::new(backward), batch_size))
    }

    /// Paraphrase `texts`, at most `batch_size` sentences per model call.
    pub fn augment(&self, texts: &[String]) -> Result<Vec<String>> {
        let mut out = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.batch_size) {
            let pivot = self.forward.translate(chunk)?;
            out.extend(self.backward.translate(&pivot)?);
        }
        Ok(out)
    }
}
