//! Canonical genre classification

mod classifier;
mod table;

pub use classifier::GenreClassifier;
pub use table::{GenreEntry, GenreTable};
