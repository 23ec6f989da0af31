//! Binary tag-presence vectors

use super::Vocabulary;

/// Presence vector over a vocabulary: entry `i` is 1.0 iff tag `i` occurs
pub type FeatureVector = Vec<f64>;

/// Turn a tag list into a presence vector of length `vocab.len()`
///
/// Matching is case-insensitive; tags missing from the vocabulary are
/// dropped.
pub fn vectorize<T: AsRef<str>>(tags: &[T], vocab: &Vocabulary) -> FeatureVector {
    let mut vector = vec![0.0; vocab.len()];
    for tag in tags {
        if let Some(i) = vocab.index_of(tag.as_ref()) {
            vector[i] = 1.0;
        }
    }
    vector
}

/// Vectorize every tag list against the same vocabulary
pub fn vectorize_all<T: AsRef<str>>(tag_lists: &[Vec<T>], vocab: &Vocabulary) -> Vec<FeatureVector> {
    tag_lists
        .iter()
        .map(|tags| vectorize(tags, vocab))
        .collect()
}
