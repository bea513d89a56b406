//! WordPiece encodings for BERT-style classifiers.

use crate::data::Example;
use crate::error::Result;
use rust_tokenizers::tokenizer::{
    BertTokenizer, MultiThreadedTokenizer, Tokenizer, TruncationStrategy,
};
use rust_tokenizers::vocab::Vocab;
use rust_tokenizers::TokenizedInput;
use std::path::Path;
use tracing::debug;

const PAD_TOKEN: &str = "[PAD]";

/// Token ids and attention masks, one row per example, padded to a common
/// length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Encodings {
    pub input_ids: Vec<Vec<i64>>,
    pub attention_mask: Vec<Vec<i64>>,
}

impl Encodings {
    pub fn len(&self) -> usize {
        self.input_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input_ids.is_empty()
    }

    /// Padded sequence length shared by every row.
    pub fn seq_len(&self) -> usize {
        self.input_ids.first().map_or(0, Vec::len)
    }
}

/// Load a BERT WordPiece tokenizer from a `vocab.txt` file.
///
/// Accents are stripped together with lowercasing, as uncased BERT
/// checkpoints expect.
pub fn load_tokenizer(vocab_path: impl AsRef<Path>, lowercase: bool) -> Result<BertTokenizer> {
    Ok(BertTokenizer::from_file(vocab_path, lowercase, lowercase)?)
}

/// Encode the sentences of `dataset`.
///
/// Sequences are truncated to `max_length` (special tokens included) and
/// padded to the longest remaining one. `parallel` runs the tokenizer on the
/// rayon pool.
pub fn create_encodings(
    dataset: &[Example],
    tokenizer: &BertTokenizer,
    max_length: usize,
    parallel: bool,
) -> Encodings {
    let texts: Vec<&str> = dataset.iter().map(|e| e.sentence.as_str()).collect();
    let strategy = TruncationStrategy::LongestFirst;

    let tokenized: Vec<TokenizedInput> = if parallel {
        MultiThreadedTokenizer::encode_list(tokenizer, &texts[..], max_length, &strategy, 0)
    } else {
        Tokenizer::encode_list(tokenizer, &texts[..], max_length, &strategy, 0)
    };

    let pad_id = Tokenizer::vocab(tokenizer).token_to_id(PAD_TOKEN);
    let seq_len = tokenized
        .iter()
        .map(|t| t.token_ids.len())
        .max()
        .unwrap_or(0);
    debug!(count = tokenized.len(), seq_len, "encoded sentences");

    let mut encodings = Encodings::default();
    for input in tokenized {
        let n = input.token_ids.len();
        let mut ids = input.token_ids;
        ids.resize(seq_len, pad_id);

        let mut mask = vec![1i64; n];
        mask.resize(seq_len, 0);

        encodings.input_ids.push(ids);
        encodings.attention_mask.push(mask);
    }
    encodings
}
