//! Voting ensembles over pretrained sequence classifiers.
//!
//! Two strategies share the [`Ensemble`] contract:
//!
//! - [`AverageVote`]: every model gets one vote, the per-example mode wins
//! - [`WeightedVote`]: logits are combined with one learned weight per model
//!
//! [`VotingEnsemble`] picks one of them at construction time:
//!
//! ```no_run
//! use glue_ensemble::classifier::{BertClassifier, SequenceClassifier};
//! use glue_ensemble::config::Config;
//! use glue_ensemble::ensemble::{Ensemble, VotingEnsemble, VotingStrategy};
//! use glue_ensemble::tensor_dataset::TensorDataset;
//! use tch::Device;
//!
//! let models: Vec<Box<dyn SequenceClassifier>> = vec![
//!     Box::new(BertClassifier::load("models/bert-sst2-a", Device::Cpu)?),
//!     Box::new(BertClassifier::load("models/bert-sst2-b", Device::Cpu)?),
//! ];
//! let device = Device::cuda_if_available();
//! let fit = Config::load("config.toml")?.ensemble;
//! let mut ensemble = VotingEnsemble::from_config(VotingStrategy::Weighted, models, device, &fit)?;
//!
//! let train = TensorDataset::load("data/augmented_train_ds/sst2_fr.pt")?;
//! ensemble.fit(&fit.loader(&train))?;
//!
//! let dev = TensorDataset::load("data/sst2_dev.pt")?;
//! let accuracies = ensemble.predict(&fit.loader(&dev))?;
//! # Ok::<(), glue_ensemble::Error>(())
//! ```

mod average;
mod weighted;

pub use average::{majority_vote, AverageVote};
pub use weighted::WeightedVote;

use crate::classifier::SequenceClassifier;
use crate::config::FitConfig;
use crate::dataloader::DataLoader;
use crate::error::{Error, Result};
use crate::tensor_dataset::Batch;
use std::str::FromStr;
use tch::{Device, Kind, Tensor};

/// Ordered ensemble members.
pub type Models = Vec<Box<dyn SequenceClassifier>>;

/// Output of one ensemble step.
#[derive(Debug)]
pub struct BatchPrediction {
    /// Class ids `(batch,)` for voting, probabilities `(batch, labels)` for
    /// weighted combination
    pub output: Tensor,
    /// Fraction of the batch predicted correctly
    pub accuracy: f64,
}

pub trait Ensemble {
    fn predict_batch(&self, batch: &Batch) -> Result<BatchPrediction>;

    /// Learn ensemble parameters from `loader`. Strategies without
    /// parameters keep this no-op.
    fn fit(&mut self, _loader: &DataLoader<'_>) -> Result<()> {
        Ok(())
    }

    /// Accuracy of every batch in `loader`, in order.
    fn predict(&self, loader: &DataLoader<'_>) -> Result<Vec<f64>> {
        loader
            .iter()
            .map(|batch| Ok(self.predict_batch(&batch)?.accuracy))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VotingStrategy {
    Average,
    Weighted,
}

/// Parsed case-insensitively from `"average"` or `"weighted"`.
impl FromStr for VotingStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "average" => Ok(VotingStrategy::Average),
            "weighted" => Ok(VotingStrategy::Weighted),
            _ => Err(Error::UnsupportedStrategy(s.to_string())),
        }
    }
}

/// An ensemble whose strategy was chosen at construction time.
pub enum VotingEnsemble {
    Average(AverageVote),
    Weighted(WeightedVote),
}

impl VotingEnsemble {
    pub fn new(strategy: VotingStrategy, models: Models, device: Device) -> Result<Self> {
        Self::from_config(strategy, models, device, &FitConfig::default())
    }

    /// Like [`VotingEnsemble::new`], training a weighted vote with `fit`.
    /// The average vote has nothing to train and ignores it.
    pub fn from_config(
        strategy: VotingStrategy,
        models: Models,
        device: Device,
        fit: &FitConfig,
    ) -> Result<Self> {
        Ok(match strategy {
            VotingStrategy::Average => VotingEnsemble::Average(AverageVote::new(models, device)?),
            VotingStrategy::Weighted => VotingEnsemble::Weighted(
                WeightedVote::new(models, device)?.with_fit_config(fit.clone()),
            ),
        })
    }

    pub fn strategy(&self) -> VotingStrategy {
        match self {
            VotingEnsemble::Average(_) => VotingStrategy::Average,
            VotingEnsemble::Weighted(_) => VotingStrategy::Weighted,
        }
    }
}

impl Ensemble for VotingEnsemble {
    fn predict_batch(&self, batch: &Batch) -> Result<BatchPrediction> {
        match self {
            VotingEnsemble::Average(e) => e.predict_batch(batch),
            VotingEnsemble::Weighted(e) => e.predict_batch(batch),
        }
    }

    fn fit(&mut self, loader: &DataLoader<'_>) -> Result<()> {
        match self {
            VotingEnsemble::Average(e) => e.fit(loader),
            VotingEnsemble::Weighted(e) => e.fit(loader),
        }
    }
}

/// Move every model to `device`. An ensemble needs at least one model.
fn place_models(mut models: Models, device: Device) -> Result<Models> {
    if models.is_empty() {
        return Err(Error::EmptyEnsemble);
    }
    for model in models.iter_mut() {
        model.to_device(device);
    }
    Ok(models)
}

/// Logits of every model on `batch`, computed without gradient tracking.
fn model_logits(models: &[Box<dyn SequenceClassifier>], batch: &Batch) -> Result<Vec<Tensor>> {
    tch::no_grad(|| {
        models
            .iter()
            .map(|model| model.logits(&batch.input_ids, &batch.attention_mask))
            .collect()
    })
}

fn accuracy(predictions: &Tensor, labels: &Tensor) -> Result<f64> {
    let correct = predictions
        .f_eq_tensor(labels)?
        .to_kind(Kind::Float)
        .mean(Kind::Float);
    Ok(f64::try_from(&correct)?)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::classifier::tests::LookupClassifier;

    /// Batch whose example `i` looks up row `i` of every model's table.
    pub(crate) fn lookup_batch(labels: &[i64]) -> Batch {
        let n = labels.len() as i64;
        Batch {
            input_ids: Tensor::arange(n, (Kind::Int64, Device::Cpu)).view([n, 1]),
            attention_mask: Tensor::ones([n, 1], (Kind::Int64, Device::Cpu)),
            labels: Tensor::from_slice(labels),
        }
    }

    pub(crate) fn lookup_models(tables: &[&[&[f32]]]) -> Models {
        tables
            .iter()
            .map(|rows| Box::new(LookupClassifier::new(rows)) as Box<dyn SequenceClassifier>)
            .collect()
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!(
            "average".parse::<VotingStrategy>().unwrap(),
            VotingStrategy::Average
        );
        assert_eq!(
            "Weighted".parse::<VotingStrategy>().unwrap(),
            VotingStrategy::Weighted
        );
        assert!(matches!(
            "stacking".parse::<VotingStrategy>(),
            Err(Error::UnsupportedStrategy(_))
        ));
        assert!("majority".parse::<VotingStrategy>().is_err());
    }

    #[test]
    fn test_tagged_construction() {
        let models = lookup_models(&[&[&[2.0, 0.0]], &[&[0.0, 2.0]], &[&[2.0, 0.0]]]);
        let ensemble = VotingEnsemble::new(VotingStrategy::Average, models, Device::Cpu).unwrap();
        assert_eq!(ensemble.strategy(), VotingStrategy::Average);

        let prediction = ensemble.predict_batch(&lookup_batch(&[0])).unwrap();
        assert_eq!(Vec::<i64>::try_from(&prediction.output).unwrap(), vec![0]);

        let models = lookup_models(&[&[&[2.0, 0.0]], &[&[0.0, 2.0]]]);
        let ensemble = VotingEnsemble::new(VotingStrategy::Weighted, models, Device::Cpu).unwrap();
        assert_eq!(ensemble.strategy(), VotingStrategy::Weighted);
    }

    #[test]
    fn test_fit_config_reaches_weighted_vote() {
        use crate::tensor_dataset::TensorDataset;

        let right: &[&[f32]] = &[&[2.0, 0.0], &[0.0, 2.0], &[2.0, 0.0], &[0.0, 2.0]];
        let wrong: &[&[f32]] = &[&[0.0, 2.0], &[2.0, 0.0], &[0.0, 2.0], &[2.0, 0.0]];
        let batch = lookup_batch(&[0, 1, 0, 1]);
        let ds = TensorDataset::new(batch.input_ids, batch.attention_mask, batch.labels);

        // a zero learning rate leaves the initial weights in place
        let frozen = FitConfig {
            learning_rate: 0.0,
            print_freq: 3,
            batch_size: 2,
        };
        let mut ensemble = VotingEnsemble::from_config(
            VotingStrategy::Weighted,
            lookup_models(&[right, wrong]),
            Device::Cpu,
            &frozen,
        )
        .unwrap();
        ensemble.fit(&frozen.loader(&ds)).unwrap();
        match &ensemble {
            VotingEnsemble::Weighted(vote) => {
                assert_eq!(vote.fit_config().print_freq, 3);
                assert_eq!(vote.fit_config().learning_rate, 0.0);
                assert_eq!(vote.weights().unwrap(), vec![0.5, 0.5]);
            }
            VotingEnsemble::Average(_) => panic!("expected a weighted vote"),
        }

        let trained = FitConfig {
            batch_size: 2,
            ..FitConfig::default()
        };
        let mut ensemble = VotingEnsemble::from_config(
            VotingStrategy::Weighted,
            lookup_models(&[right, wrong]),
            Device::Cpu,
            &trained,
        )
        .unwrap();
        ensemble.fit(&trained.loader(&ds)).unwrap();
        if let VotingEnsemble::Weighted(vote) = &ensemble {
            let weights = vote.weights().unwrap();
            assert!(weights[0] > 0.5, "weights: {:?}", weights);
        }
    }

    #[test]
    fn test_empty_ensemble_rejected() {
        for strategy in [VotingStrategy::Average, VotingStrategy::Weighted] {
            assert!(matches!(
                VotingEnsemble::new(strategy, Vec::new(), Device::Cpu),
                Err(Error::EmptyEnsemble)
            ));
        }
    }

    #[test]
    fn test_accuracy() {
        let preds = Tensor::from_slice(&[0i64, 1, 1, 0]);
        let labels = Tensor::from_slice(&[0i64, 1, 0, 0]);
        assert!((accuracy(&preds, &labels).unwrap() - 0.75).abs() < 1e-6);
    }
}
