//! # glue-ensemble - Augmentation and Voting Ensembles for GLUE Classifiers
//!
//! Research utilities for text-classification experiments on GLUE
//! single-sentence tasks, in Rust on top of libtorch.
//!
//! ## Features
//!
//! - **Back-Translation**: paraphrase a training split through a pivot
//!   language with Marian (opus-mt) models
//! - **Tensor Datasets**: BERT WordPiece encodings saved as `.pt` files
//! - **Majority Vote**: combine classifiers by per-example mode
//! - **Weighted Vote**: learn one weight per classifier with SGD
//!
//! ## Quick Start
//!
//! ### Augmentation job
//!
//! ```bash
//! # 10 sentences on the default GPU
//! augment --limit 10
//!
//! # one process per pivot language and GPU
//! augment --language fr --gpu cuda:1
//! augment --language es --gpu cuda:2
//! augment --language de --gpu cuda:3
//! ```
//!
//! The result lands in `{save_dir}/{dataset}_{language}.pt`.
//!
//! ### Ensembles
//!
//! ```no_run
//! use glue_ensemble::classifier::{BertClassifier, SequenceClassifier};
//! use glue_ensemble::dataloader::DataLoader;
//! use glue_ensemble::ensemble::{AverageVote, Ensemble};
//! use glue_ensemble::tensor_dataset::TensorDataset;
//! use tch::Device;
//!
//! let device = Device::cuda_if_available();
//! let models: Vec<Box<dyn SequenceClassifier>> = ["models/a", "models/b", "models/c"]
//!     .iter()
//!     .map(|dir| Ok(Box::new(BertClassifier::load(dir, device)?) as Box<dyn SequenceClassifier>))
//!     .collect::<glue_ensemble::Result<_>>()?;
//!
//! let vote = AverageVote::new(models, device)?;
//! let dev = TensorDataset::load("data/sst2_dev.pt")?;
//! for acc in vote.predict(&DataLoader::new(&dev, 64))? {
//!     println!("batch accuracy: {:.2}%", acc * 100.0);
//! }
//! # Ok::<(), glue_ensemble::Error>(())
//! ```
//!
//! ## Available Cargo Features
//!
//! | Feature | Description | Default |
//! |---------|-------------|---------|
//! | `cli` | Build the `augment` binary | ✓ |
//! | `auto-download` | Fetch missing vocab/model files from Hugging Face | ✗ |
//!
//! ## Requirements
//!
//! - **libtorch**: required by `tch` and `rust-bert`
//!   ```bash
//!   export LIBTORCH_USE_PYTORCH=1
//!   ```
//! - **GLUE data**: the extracted archive under `data/glue/` (`SST-2/`, `CoLA/`)
//! - **Tokenizer vocabulary**: `models/bert-base-uncased/vocab.txt`, or the
//!   `auto-download` feature
//!
//! ## License
//!
//! GNU General Public License v3.0 (GPLv3)

pub mod augment;
pub mod classifier;
pub mod config;
pub mod data;
pub mod dataloader;
pub mod device;
pub mod encoding;
pub mod ensemble;
pub mod error;
pub mod job;
pub mod model_loader;
pub mod tensor_dataset;
pub mod translation;

#[cfg(feature = "cli")]
pub mod cli;

pub use data::Example;
pub use error::{Error, Result};
