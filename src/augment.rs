//! Back-translation augmentation of a dataset split.

use crate::data::Example;
use crate::error::{Error, Result};
use crate::translation::BackTranslator;
use std::time::Instant;
use tracing::info;

const PROGRESS_EVERY: usize = 500;

/// Paraphrase every example of `dataset`.
///
/// The output keeps each label, replaces the sentence with its round-trip
/// translation, and numbers examples from `dataset.len()` onwards so they
/// can be appended after the originals.
pub fn augment_sentences(dataset: &[Example], translator: &BackTranslator) -> Result<Vec<Example>> {
    let start = Instant::now();
    let total = dataset.len();
    let mut augmented = Vec::with_capacity(total);

    for (position, entry) in dataset.iter().enumerate() {
        let sentence = translator
            .augment(std::slice::from_ref(&entry.sentence))?
            .into_iter()
            .next()
            .ok_or_else(|| Error::MissingTranslation(entry.sentence.clone()))?;
        augmented.push(Example {
            idx: total + position,
            label: entry.label,
            sentence,
        });

        if (position + 1) % PROGRESS_EVERY == 0 {
            info!(done = position + 1, total, "augmenting");
        }
    }

    info!(
        total,
        elapsed_secs = start.elapsed().as_secs_f64(),
        "augmentation finished"
    );
    Ok(augmented)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::tests::tag_back_translator;
    use crate::translation::Translator;

    fn dataset() -> Vec<Example> {
        vec![
            Example {
                idx: 0,
                label: 1,
                sentence: "a gorgeous film".to_string(),
            },
            Example {
                idx: 1,
                label: 0,
                sentence: "dull".to_string(),
            },
            Example {
                idx: 2,
                label: 1,
                sentence: "fun".to_string(),
            },
        ]
    }

    #[test]
    fn test_labels_kept_and_indices_renumbered() {
        let (bt, _) = tag_back_translator(1024);
        let ds = dataset();
        let aug = augment_sentences(&ds, &bt).unwrap();

        assert_eq!(aug.len(), ds.len());
        for (position, (orig, new)) in ds.iter().zip(&aug).enumerate() {
            assert_eq!(new.label, orig.label);
            assert_eq!(new.idx, ds.len() + position);
        }
        assert_eq!(aug[1].sentence, "en(fr(dull))");
    }

    #[test]
    fn test_one_call_per_example() {
        let (bt, calls) = tag_back_translator(1024);
        augment_sentences(&dataset(), &bt).unwrap();
        assert_eq!(*calls.borrow(), vec![1; 6]);
    }

    struct SilentTranslator;

    impl Translator for SilentTranslator {
        fn translate(&self, _texts: &[String]) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_missing_translation_is_an_error() {
        let bt = BackTranslator::new(Box::new(SilentTranslator), Box::new(SilentTranslator), 8);
        assert!(matches!(
            augment_sentences(&dataset(), &bt),
            Err(Error::MissingTranslation(s)) if s == "a gorgeous film"
        ));
    }

    #[test]
    fn test_empty_dataset() {
        let (bt, calls) = tag_back_translator(4);
        assert!(augment_sentences(&[], &bt).unwrap().is_empty());
        assert!(calls.borrow().is_empty());
    }
}
