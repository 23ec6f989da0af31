//! Tag-based feature construction
//!
//! Builds the per-invocation vocabulary and the binary presence vectors the
//! clustering engine consumes.

mod vectorizer;
mod vocabulary;

pub use vectorizer::{vectorize, vectorize_all, FeatureVector};
pub use vocabulary::Vocabulary;
