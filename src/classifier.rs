//! Pretrained sequence classifiers used as ensemble members.

use crate::error::Result;
use crate::model_loader::{ensure_model_files, ModelFiles};
use rust_bert::bert::{BertConfig, BertForSequenceClassification};
use rust_bert::Config;
use std::path::Path;
use tch::{nn, Device, Tensor};
use tracing::info;

/// A model producing `(batch, num_labels)` logits for a batch of encoded
/// sentences.
pub trait SequenceClassifier {
    fn logits(&self, input_ids: &Tensor, attention_mask: &Tensor) -> Result<Tensor>;

    /// Move the model parameters to `device`.
    fn to_device(&mut self, device: Device);
}

/// A fine-tuned BERT with a classification head, loaded from a rust-bert
/// model directory.
pub struct BertClassifier {
    device: Device,
    vs: nn::VarStore,
    model: BertForSequenceClassification,
}

impl BertClassifier {
    /// Load from a local model directory; every model file must be present.
    pub fn load(model_dir: impl AsRef<Path>, device: Device) -> Result<Self> {
        Self::load_or_fetch(model_dir, None, device)
    }

    /// Load from `model_dir`, first fetching missing files from the Hugging
    /// Face repository `repo_id` when one is given.
    pub fn load_or_fetch(
        model_dir: impl AsRef<Path>,
        repo_id: Option<&str>,
        device: Device,
    ) -> Result<Self> {
        let model_dir = model_dir.as_ref();
        let files = ModelFiles::in_dir(model_dir);
        ensure_model_files(&files, repo_id.unwrap_or_default(), repo_id.is_some())?;

        info!(path = %model_dir.display(), ?device, "loading BERT classifier");
        let config = BertConfig::from_file(&files.config);
        let mut vs = nn::VarStore::new(device);
        let model = BertForSequenceClassification::new(vs.root(), &config)?;
        vs.load(&files.weights)?;
        vs.freeze();

        Ok(BertClassifier { device, vs, model })
    }
}

impl SequenceClassifier for BertClassifier {
    fn logits(&self, input_ids: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
        let input_ids = input_ids.to_device(self.device);
        let attention_mask = attention_mask.to_device(self.device);
        let output = self.model.forward_t(
            Some(&input_ids),
            Some(&attention_mask),
            None,
            None,
            None,
            false,
        );
        Ok(output.logits)
    }

    fn to_device(&mut self, device: Device) {
        self.vs.set_device(device);
        self.device = device;
    }
}
