//! Tensor-encoded datasets and batches.
//!
//! A [`TensorDataset`] is persisted with libtorch's named-tensor format, so a
//! file written by the augmentation job loads back with [`TensorDataset::load`].

use crate::data::Example;
use crate::encoding::Encodings;
use crate::error::{Error, Result};
use std::path::Path;
use tch::{Device, Tensor};
use tracing::info;

const INPUT_IDS: &str = "input_ids";
const ATTENTION_MASK: &str = "attention_mask";
const LABELS: &str = "labels";

/// Aligned `(n, seq)` token ids, `(n, seq)` attention mask and `(n,)` labels.
#[derive(Debug)]
pub struct TensorDataset {
    pub input_ids: Tensor,
    pub attention_mask: Tensor,
    pub labels: Tensor,
}

/// A slice of a [`TensorDataset`] fed to the models in one step.
#[derive(Debug)]
pub struct Batch {
    pub input_ids: Tensor,
    pub attention_mask: Tensor,
    pub labels: Tensor,
}

impl TensorDataset {
    pub fn new(input_ids: Tensor, attention_mask: Tensor, labels: Tensor) -> Self {
        TensorDataset {
            input_ids,
            attention_mask,
            labels,
        }
    }

    pub fn len(&self) -> usize {
        self.labels.size().first().copied().unwrap_or(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Gather the rows at `indices` into a batch.
    pub fn select(&self, indices: &Tensor) -> Batch {
        Batch {
            input_ids: self.input_ids.index_select(0, indices),
            attention_mask: self.attention_mask.index_select(0, indices),
            labels: self.labels.index_select(0, indices),
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        Tensor::save_multi(
            &[
                (INPUT_IDS, &self.input_ids),
                (ATTENTION_MASK, &self.attention_mask),
                (LABELS, &self.labels),
            ],
            path,
        )?;
        info!(path = %path.display(), rows = self.len(), "saved tensor dataset");
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let mut named = Tensor::load_multi(path)?;
        let mut take = |name: &str| -> Result<Tensor> {
            let pos = named
                .iter()
                .position(|(n, _)| n == name)
                .ok_or_else(|| Error::MissingTensor(name.to_string()))?;
            Ok(named.swap_remove(pos).1)
        };

        Ok(TensorDataset {
            input_ids: take(INPUT_IDS)?,
            attention_mask: take(ATTENTION_MASK)?,
            labels: take(LABELS)?,
        })
    }
}

impl Batch {
    pub fn len(&self) -> usize {
        self.labels.size().first().copied().unwrap_or(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_device(&self, device: Device) -> Batch {
        Batch {
            input_ids: self.input_ids.to_device(device),
            attention_mask: self.attention_mask.to_device(device),
            labels: self.labels.to_device(device),
        }
    }
}

/// Pack examples and their encodings into a [`TensorDataset`].
pub fn create_tensor_dataset(dataset: &[Example], encodings: &Encodings) -> TensorDataset {
    let n = encodings.len() as i64;
    let seq_len = encodings.seq_len() as i64;

    let flat_ids: Vec<i64> = encodings.input_ids.iter().flatten().copied().collect();
    let flat_mask: Vec<i64> = encodings.attention_mask.iter().flatten().copied().collect();
    let labels: Vec<i64> = dataset.iter().map(|e| e.label).collect();

    TensorDataset {
        input_ids: Tensor::from_slice(&flat_ids).view([n, seq_len]),
        attention_mask: Tensor::from_slice(&flat_mask).view([n, seq_len]),
        labels: Tensor::from_slice(&labels),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_dataset() -> (Vec<Example>, Encodings) {
        let examples = vec![
            Example {
                idx: 0,
                label: 1,
                sentence: "a".to_string(),
            },
            Example {
                idx: 1,
                label: 0,
                sentence: "b".to_string(),
            },
        ];
        let encodings = Encodings {
            input_ids: vec![vec![2, 7, 3], vec![2, 3, 0]],
            attention_mask: vec![vec![1, 1, 1], vec![1, 1, 0]],
        };
        (examples, encodings)
    }

    #[test]
    fn test_create_tensor_dataset_shapes() {
        let (examples, encodings) = small_dataset();
        let ds = create_tensor_dataset(&examples, &encodings);

        assert_eq!(ds.len(), 2);
        assert_eq!(ds.input_ids.size(), vec![2, 3]);
        assert_eq!(ds.attention_mask.size(), vec![2, 3]);
        assert_eq!(Vec::<i64>::try_from(&ds.labels).unwrap(), vec![1, 0]);
    }

    #[test]
    fn test_select_rows() {
        let (examples, encodings) = small_dataset();
        let ds = create_tensor_dataset(&examples, &encodings);

        let batch = ds.select(&Tensor::from_slice(&[1i64]));
        assert_eq!(batch.len(), 1);
        assert_eq!(
            Vec::<i64>::try_from(&batch.input_ids.view([-1])).unwrap(),
            vec![2, 3, 0]
        );
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sst2_fr.pt");
        let (examples, encodings) = small_dataset();
        create_tensor_dataset(&examples, &encodings).save(&path).unwrap();

        let loaded = TensorDataset::load(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(
            Vec::<i64>::try_from(&loaded.attention_mask.view([-1])).unwrap(),
            vec![1, 1, 1, 1, 1, 0]
        );
    }

    #[test]
    fn test_load_missing_tensor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.pt");
        let ids = Tensor::from_slice(&[1i64, 2]);
        Tensor::save_multi(&[("input_ids", &ids)], &path).unwrap();

        assert!(matches!(
            TensorDataset::load(&path),
            Err(Error::MissingTensor(_))
        ));
    }
}
