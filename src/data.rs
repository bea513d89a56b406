//! GLUE dataset records and split loading.
//!
//! Splits are read from the TSV files of the original GLUE distribution,
//! laid out as `{data_dir}/{TASK_DIR}/{split}.tsv`.

use crate::error::{Error, Result};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

/// A single labelled sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub idx: usize,
    pub label: i64,
    pub sentence: String,
}

/// Single-sentence GLUE tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlueTask {
    Sst2,
    Cola,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    Train,
    Validation,
}

impl GlueTask {
    /// Directory name inside the GLUE archive.
    pub fn dir_name(&self) -> &'static str {
        match self {
            GlueTask::Sst2 => "SST-2",
            GlueTask::Cola => "CoLA",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GlueTask::Sst2 => "sst2",
            GlueTask::Cola => "cola",
        }
    }
}

impl FromStr for GlueTask {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sst2" | "sst-2" => Ok(GlueTask::Sst2),
            "cola" => Ok(GlueTask::Cola),
            _ => Err(Error::UnsupportedDataset(s.to_string())),
        }
    }
}

impl fmt::Display for GlueTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Split {
    fn file_name(&self) -> &'static str {
        match self {
            Split::Train => "train.tsv",
            Split::Validation => "dev.tsv",
        }
    }
}

/// Path of a split file under `data_dir`.
pub fn split_path(data_dir: impl AsRef<Path>, task: GlueTask, split: Split) -> PathBuf {
    data_dir
        .as_ref()
        .join(task.dir_name())
        .join(split.file_name())
}

/// Load one split of a GLUE task. `idx` is the row position in the file.
pub fn load_split(data_dir: impl AsRef<Path>, task: GlueTask, split: Split) -> Result<Vec<Example>> {
    let path = split_path(data_dir, task, split);
    info!(path = %path.display(), %task, "loading split");

    // SST-2 ships a header row; CoLA does not. Neither file quotes fields.
    let mut rdr = ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .has_headers(task == GlueTask::Sst2)
        .from_path(&path)?;

    let mut examples = Vec::new();
    match task {
        GlueTask::Sst2 => {
            for (idx, row) in rdr.deserialize::<(String, i64)>().enumerate() {
                let (sentence, label) = row?;
                examples.push(Example {
                    idx,
                    label,
                    sentence,
                });
            }
        }
        GlueTask::Cola => {
            for (idx, row) in rdr
                .deserialize::<(String, i64, String, String)>()
                .enumerate()
            {
                let (_source, label, _notation, sentence) = row?;
                examples.push(Example {
                    idx,
                    label,
                    sentence,
                });
            }
        }
    }

    info!(count = examples.len(), "split loaded");
    Ok(examples)
}

/// Truncate with the semantics of a Python `[:limit]` slice.
///
/// A non-negative limit keeps at most that many examples; a negative one
/// drops `|limit|` examples from the end, so `-1` keeps all but the last.
pub fn apply_limit(mut examples: Vec<Example>, limit: i64) -> Vec<Example> {
    let len = examples.len() as i64;
    let end = if limit < 0 { (len + limit).max(0) } else { limit.min(len) };
    examples.truncate(end as usize);
    examples
}
