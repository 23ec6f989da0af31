//! Tag list → canonical genre

use super::GenreTable;
use crate::models::UNCLASSIFIED;

/// Maps raw tags to one canonical base genre
///
/// Matching is case-insensitive and exact. The genre with the most matching
/// tags wins; ties go to the genre declared first in the table.
#[derive(Debug, Clone, Default)]
pub struct GenreClassifier {
    table: GenreTable,
}

impl GenreClassifier {
    pub fn new(table: GenreTable) -> Self {
        Self { table }
    }

    /// Match count per table entry, in declaration order
    pub fn scores<T: AsRef<str>>(&self, tags: &[T]) -> Vec<(&str, usize)> {
        let folded: Vec<String> = tags
            .iter()
            .map(|t| t.as_ref().to_lowercase())
            .collect();

        self.table
            .entries()
            .iter()
            .map(|entry| {
                let count = folded.iter().filter(|tag| entry.matches(tag)).count();
                (entry.name(), count)
            })
            .collect()
    }

    /// Classify a tag list; `"unclassified"` when nothing matches
    pub fn classify<T: AsRef<str>>(&self, tags: &[T]) -> String {
        let mut best: Option<(&str, usize)> = None;
        for (name, count) in self.scores(tags) {
            if count == 0 {
                continue;
            }
            if best.map_or(true, |(_, top)| count > top) {
                best = Some((name, count));
            }
        }

        best.map(|(name, _)| name.to_string())
            .unwrap_or_else(|| UNCLASSIFIED.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genre::GenreEntry;

    #[test]
    fn test_classic_rock_is_rock() {
        let classifier = GenreClassifier::default();
        assert_eq!(classifier.classify(&["classic rock", "70s"]), "rock");
    }

    #[test]
    fn test_empty_and_unknown_are_unclassified() {
        let classifier = GenreClassifier::default();
        let empty: [&str; 0] = [];
        assert_eq!(classifier.classify(&empty), UNCLASSIFIED);
        assert_eq!(classifier.classify(&["totally-unknown-tag"]), UNCLASSIFIED);
    }

    #[test]
    fn test_case_folding() {
        let classifier = GenreClassifier::default();
        assert_eq!(classifier.classify(&["BEBOP", "Cool Jazz"]), "jazz");
        assert_eq!(classifier.classify(&["Hip-Hop"]), "hip hop");
    }

    #[test]
    fn test_padded_tag_is_not_an_exact_match() {
        let classifier = GenreClassifier::default();
        assert_eq!(classifier.classify(&[" rock "]), UNCLASSIFIED);
        assert_eq!(classifier.classify(&[" rock ", "Rock"]), "rock");
    }

    #[test]
    fn test_no_substring_matching() {
        let classifier = GenreClassifier::default();
        assert_eq!(classifier.classify(&["rockabilly revival"]), UNCLASSIFIED);
    }

    #[test]
    fn test_majority_wins() {
        let classifier = GenreClassifier::default();
        let tags = ["house", "techno", "pop"];
        assert_eq!(classifier.classify(&tags), "electronic");
    }

    #[test]
    fn test_tie_goes_to_first_declared() {
        let classifier = GenreClassifier::default();
        // One rock tag, one jazz tag: rock is declared first
        assert_eq!(classifier.classify(&["bebop", "grunge"]), "rock");

        let table = GenreTable::new(vec![
            GenreEntry::new("b", ["x"]),
            GenreEntry::new("a", ["y"]),
        ]);
        let custom = GenreClassifier::new(table);
        assert_eq!(custom.classify(&["y", "x"]), "b");
    }
}
