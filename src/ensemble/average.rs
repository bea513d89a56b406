use super::{accuracy, model_logits, place_models, BatchPrediction, Ensemble, Models};
use crate::classifier::SequenceClassifier;
use crate::error::{Error, Result};
use crate::tensor_dataset::Batch;
use tch::{Device, Kind, Tensor};

/// Voting with all models equally weighted.
pub struct AverageVote {
    models: Models,
    device: Device,
}

impl AverageVote {
    pub fn new(models: Models, device: Device) -> Result<Self> {
        Ok(AverageVote {
            models: place_models(models, device)?,
            device,
        })
    }

    pub fn num_models(&self) -> usize {
        self.models.len()
    }
}

impl Ensemble for AverageVote {
    fn predict_batch(&self, batch: &Batch) -> Result<BatchPrediction> {
        let batch = batch.to_device(self.device);
        let (output, accuracy) = majority_vote(&self.models, &batch)?;
        Ok(BatchPrediction { output, accuracy })
    }
}

/// Per-example mode of the models' arg-max classes, with its accuracy.
///
/// Ties go to the lowest class id.
pub fn majority_vote(models: &[Box<dyn SequenceClassifier>], batch: &Batch) -> Result<(Tensor, f64)> {
    let logits = model_logits(models, batch)?;
    let num_labels = logits
        .first()
        .and_then(|l| l.size().last().copied())
        .ok_or(Error::EmptyEnsemble)?;

    let votes: Vec<Tensor> = logits.iter().map(|l| l.argmax(-1, false)).collect();
    // (model, batch) -> per-class vote counts (batch, label)
    let counts = Tensor::f_stack(&votes, 0)?
        .f_one_hot(num_labels)?
        .sum_dim_intlist(&[0i64][..], false, Kind::Int64);
    let predictions = counts.argmax(-1, false);

    let acc = accuracy(&predictions, &batch.labels)?;
    Ok((predictions, acc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataloader::DataLoader;
    use crate::ensemble::tests::{lookup_batch, lookup_models};
    use crate::tensor_dataset::TensorDataset;

    fn predicted(vote: &AverageVote, labels: &[i64]) -> (Vec<i64>, f64) {
        let prediction = vote.predict_batch(&lookup_batch(labels)).unwrap();
        (
            Vec::<i64>::try_from(&prediction.output).unwrap(),
            prediction.accuracy,
        )
    }

    #[test]
    fn test_two_of_three_wins() {
        let vote = AverageVote::new(
            lookup_models(&[&[&[2.0, 0.0]], &[&[0.0, 2.0]], &[&[2.0, 0.0]]]),
            Device::Cpu,
        )
        .unwrap();
        assert_eq!(vote.num_models(), 3);

        let (preds, acc) = predicted(&vote, &[0]);
        assert_eq!(preds, vec![0]);
        assert_eq!(acc, 1.0);
    }

    #[test]
    fn test_unanimous_class_is_kept() {
        let vote = AverageVote::new(
            lookup_models(&[
                &[&[0.1, 0.9], &[5.0, 1.0]],
                &[&[-1.0, 3.0], &[2.0, 0.0]],
                &[&[0.0, 0.5], &[0.3, 0.2]],
            ]),
            Device::Cpu,
        )
        .unwrap();

        let (preds, acc) = predicted(&vote, &[1, 1]);
        assert_eq!(preds, vec![1, 0]);
        assert_eq!(acc, 0.5);
    }

    #[test]
    fn test_tie_goes_to_lowest_label() {
        let vote = AverageVote::new(
            lookup_models(&[&[&[0.0, 2.0]], &[&[2.0, 0.0]]]),
            Device::Cpu,
        )
        .unwrap();
        let (preds, _) = predicted(&vote, &[1]);
        assert_eq!(preds, vec![0]);
    }

    #[test]
    fn test_label_mismatch_is_an_error() {
        let vote = AverageVote::new(
            lookup_models(&[&[&[0.0, 2.0]], &[&[0.0, 0.0, 4.0]]]),
            Device::Cpu,
        )
        .unwrap();
        assert!(vote.predict_batch(&lookup_batch(&[1])).is_err());
    }

    #[test]
    fn test_predict_per_batch_accuracy() {
        let vote = AverageVote::new(
            lookup_models(&[
                &[&[1.0, 0.0], &[1.0, 0.0], &[0.0, 1.0]],
                &[&[1.0, 0.0], &[0.0, 1.0], &[0.0, 1.0]],
                &[&[1.0, 0.0], &[1.0, 0.0], &[0.0, 1.0]],
            ]),
            Device::Cpu,
        )
        .unwrap();
        let batch = lookup_batch(&[0, 1, 1]);
        let ds = TensorDataset::new(batch.input_ids, batch.attention_mask, batch.labels);

        let accs = vote.predict(&DataLoader::new(&ds, 2)).unwrap();
        assert_eq!(accs, vec![0.5, 1.0]);
    }
}
