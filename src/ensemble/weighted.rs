use super::{accuracy, majority_vote, model_logits, place_models, BatchPrediction, Ensemble, Models};
use crate::config::FitConfig;
use crate::dataloader::DataLoader;
use crate::error::Result;
use crate::tensor_dataset::Batch;
use tch::nn::{self, OptimizerConfig};
use tch::{Device, Kind, Tensor};
use tracing::info;

/// Voting with one learned weight per model.
///
/// Logits are stacked to `(batch, model, label)`, scaled by a `(1, model, 1)`
/// weight tensor, summed over models and softmaxed. The weights start at
/// `1 / model_count` and are left unconstrained during training. They are the
/// only trainable parameters; model outputs never carry gradients.
pub struct WeightedVote {
    models: Models,
    device: Device,
    vs: nn::VarStore,
    weights: Tensor,
    fit_config: FitConfig,
}

impl WeightedVote {
    pub fn new(models: Models, device: Device) -> Result<Self> {
        let models = place_models(models, device)?;
        let n = models.len() as i64;

        let vs = nn::VarStore::new(device);
        let weights = vs
            .root()
            .var("weights", &[1, n, 1], nn::Init::Const(1.0 / n as f64));

        Ok(WeightedVote {
            models,
            device,
            vs,
            weights,
            fit_config: FitConfig::default(),
        })
    }

    pub fn with_fit_config(mut self, fit_config: FitConfig) -> Self {
        self.fit_config = fit_config;
        self
    }

    pub fn fit_config(&self) -> &FitConfig {
        &self.fit_config
    }

    pub fn num_models(&self) -> usize {
        self.models.len()
    }

    /// Current weight of each model, in model order.
    pub fn weights(&self) -> Result<Vec<f64>> {
        let flat = self.weights.detach().to_kind(Kind::Double).view([-1]);
        Ok(Vec::<f64>::try_from(&flat)?)
    }

    /// Ensemble probabilities `(batch, label)` and accuracy, with gradients
    /// flowing into the weights.
    fn forward(&self, batch: &Batch) -> Result<(Tensor, f64)> {
        let logits = Tensor::f_stack(&model_logits(&self.models, batch)?, 1)?;
        let probs = logits
            .f_mul(&self.weights)?
            .sum_dim_intlist(&[1i64][..], false, Kind::Float)
            .softmax(-1, Kind::Float);
        let acc = accuracy(&probs.argmax(-1, false), &batch.labels)?;
        Ok((probs, acc))
    }
}

impl Ensemble for WeightedVote {
    fn predict_batch(&self, batch: &Batch) -> Result<BatchPrediction> {
        let batch = batch.to_device(self.device);
        let (output, accuracy) = tch::no_grad(|| self.forward(&batch))?;
        Ok(BatchPrediction { output, accuracy })
    }

    /// One pass of SGD over `loader`.
    ///
    /// The loss is the cross-entropy of the ensemble probabilities, taken as
    /// logits, against the labels.
    fn fit(&mut self, loader: &DataLoader<'_>) -> Result<()> {
        let print_freq = self.fit_config.print_freq.max(1);
        let mut opt = nn::Sgd::default().build(&self.vs, self.fit_config.learning_rate)?;
        let total = loader.len();
        let mut accs: Vec<f64> = Vec::new();

        for (i, batch) in loader.iter().enumerate() {
            let batch = batch.to_device(self.device);
            let (probs, acc) = self.forward(&batch)?;
            let loss = probs.cross_entropy_for_logits(&batch.labels);
            accs.push(acc);

            opt.backward_step(&loss);

            if i % print_freq == 0 {
                let running = accs.iter().sum::<f64>() / accs.len() as f64;
                accs.clear();
                let (_, voting_acc) = majority_vote(&self.models, &batch)?;
                info!(
                    "[{}/{}] Average accuracy so far: {:.4} (baseline voting accuracy: {:.4}, loss = {:.4})",
                    i,
                    total,
                    running,
                    voting_acc,
                    f64::try_from(&loss)?
                );
            }
        }

        info!(weights = ?self.weights()?, "weighted vote fit done");
        Ok(())
    }
}
