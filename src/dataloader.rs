//! Fixed-size batch iteration over a [`TensorDataset`].

use crate::tensor_dataset::{Batch, TensorDataset};
use rand::seq::SliceRandom;
use rand::thread_rng;
use tch::Tensor;

pub struct DataLoader<'a> {
    dataset: &'a TensorDataset,
    batch_size: usize,
    shuffle: bool,
}

impl<'a> DataLoader<'a> {
    /// A batch size of zero is treated as one.
    pub fn new(dataset: &'a TensorDataset, batch_size: usize) -> Self {
        DataLoader {
            dataset,
            batch_size: batch_size.max(1),
            shuffle: false,
        }
    }

    /// Reshuffle the row order on every call to [`DataLoader::iter`].
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of batches per pass; the last one may be short.
    pub fn len(&self) -> usize {
        self.dataset.len().div_ceil(self.batch_size)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> Batches<'a> {
        let mut order: Vec<i64> = (0..self.dataset.len() as i64).collect();
        if self.shuffle {
            order.shuffle(&mut thread_rng());
        }
        Batches {
            dataset: self.dataset,
            order,
            batch_size: self.batch_size,
            position: 0,
        }
    }
}

impl<'a, 'b> IntoIterator for &'b DataLoader<'a> {
    type Item = Batch;
    type IntoIter = Batches<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct Batches<'a> {
    dataset: &'a TensorDataset,
    order: Vec<i64>,
    batch_size: usize,
    position: usize,
}

impl Iterator for Batches<'_> {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        if self.position >= self.order.len() {
            return None;
        }
        let end = (self.position + self.batch_size).min(self.order.len());
        let indices = Tensor::from_slice(&self.order[self.position..end]);
        self.position = end;
        Some(self.dataset.select(&indices))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(n: i64) -> TensorDataset {
        TensorDataset::new(
            Tensor::arange(n, (tch::Kind::Int64, tch::Device::Cpu)).view([n, 1]),
            Tensor::ones([n, 1], (tch::Kind::Int64, tch::Device::Cpu)),
            Tensor::arange(n, (tch::Kind::Int64, tch::Device::Cpu)),
        )
    }

    #[test]
    fn test_batch_sizes() {
        let ds = dataset(10);
        let loader = DataLoader::new(&ds, 4);
        assert_eq!(loader.len(), 3);

        let sizes: Vec<usize> = loader.iter().map(|b| b.len()).collect();
        assert_eq!(sizes, vec![4, 4, 2]);
    }

    #[test]
    fn test_sequential_order() {
        let ds = dataset(5);
        let loader = DataLoader::new(&ds, 2);
        let labels: Vec<i64> = loader
            .iter()
            .flat_map(|b| Vec::<i64>::try_from(&b.labels).unwrap())
            .collect();
        assert_eq!(labels, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_shuffle_covers_every_row() {
        let ds = dataset(20);
        let loader = DataLoader::new(&ds, 3).with_shuffle(true);
        let mut labels: Vec<i64> = loader
            .iter()
            .flat_map(|b| Vec::<i64>::try_from(&b.labels).unwrap())
            .collect();
        labels.sort_unstable();
        assert_eq!(labels, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_zero_batch_size() {
        let ds = dataset(3);
        let loader = DataLoader::new(&ds, 0);
        assert_eq!(loader.batch_size(), 1);
        assert_eq!(loader.len(), 3);
    }
}
