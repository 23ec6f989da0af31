//! Tag vocabulary

use std::collections::{BTreeSet, HashMap};

/// Mapping from lowercase tag to a contiguous index in `[0, len)`
///
/// Indices follow ascending lexicographic order of the distinct tags, so the
/// same multiset of tags always yields the same vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    index: HashMap<String, usize>,
    tags: Vec<String>,
}

impl Vocabulary {
    /// Build a vocabulary from every tag list of an invocation
    pub fn build<L, T>(tag_lists: L) -> Self
    where
        L: IntoIterator,
        L::Item: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let distinct: BTreeSet<String> = tag_lists
            .into_iter()
            .flat_map(|list| {
                list.into_iter()
                    .map(|tag| tag.as_ref().to_lowercase())
                    .collect::<Vec<_>>()
            })
            .collect();

        let tags: Vec<String> = distinct.into_iter().collect();
        let index = tags
            .iter()
            .enumerate()
            .map(|(i, tag)| (tag.clone(), i))
            .collect();

        Self { index, tags }
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// True iff no tag was collected at all
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Index of a tag, matched case-insensitively
    pub fn index_of(&self, tag: &str) -> Option<usize> {
        self.index.get(&tag.to_lowercase()).copied()
    }

    /// Tag stored at an index
    pub fn tag_at(&self, index: usize) -> Option<&str> {
        self.tags.get(index).map(String::as_str)
    }

    /// Tags in index order
    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_follow_lexicographic_order() {
        let vocab = Vocabulary::build(vec![vec!["Rock", "jazz"], vec!["blues", "rock"]]);
        assert_eq!(vocab.tags(), &["blues", "jazz", "rock"]);
        assert_eq!(vocab.index_of("blues"), Some(0));
        assert_eq!(vocab.index_of("JAZZ"), Some(1));
        assert_eq!(vocab.index_of("rock"), Some(2));
        assert_eq!(vocab.tag_at(2), Some("rock"));
    }

    #[test]
    fn test_size_counts_distinct_lowercase_tags() {
        let vocab = Vocabulary::build(vec![
            vec!["Pop", "POP", "pop"],
            vec!["Dance Pop"],
            vec![],
        ]);
        assert_eq!(vocab.len(), 2);
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let a = Vocabulary::build(vec![vec!["b", "a"], vec!["c"]]);
        let b = Vocabulary::build(vec![vec!["c"], vec!["a", "b"]]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_when_no_tags() {
        let lists: Vec<Vec<String>> = vec![vec![], vec![]];
        let vocab = Vocabulary::build(lists);
        assert!(vocab.is_empty());
        assert_eq!(vocab.index_of("anything"), None);
    }
}
