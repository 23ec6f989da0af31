//! Canonical genre table
//!
//! Ordered list of base genres with their known subgenre tags. Declaration
//! order is significant: it breaks ties during classification.

use std::collections::HashSet;

/// One canonical base genre and the tags that map to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreEntry {
    name: String,
    subgenres: HashSet<String>,
}

impl GenreEntry {
    pub fn new<I, S>(name: &str, subgenres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: name.to_lowercase(),
            subgenres: subgenres
                .into_iter()
                .map(|s| s.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Exact match against the canonical name or a subgenre
    ///
    /// `tag` must already be lowercase.
    pub fn matches(&self, tag: &str) -> bool {
        self.name == tag || self.subgenres.contains(tag)
    }

    pub fn subgenre_count(&self) -> usize {
        self.subgenres.len()
    }
}

/// Immutable, ordered genre table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreTable {
    entries: Vec<GenreEntry>,
}

impl Default for GenreTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl GenreTable {
    pub fn new(entries: Vec<GenreEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[GenreEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Built-in table of twelve base genres
    pub fn builtin() -> Self {
        Self::new(vec![
            GenreEntry::new(
                "rock",
                [
                    "classic rock", "hard rock", "alternative rock", "alternative",
                    "indie rock", "indie", "soft rock", "progressive rock", "prog rock",
                    "psychedelic rock", "garage rock", "punk rock", "punk", "post-punk",
                    "grunge", "britpop", "post-rock", "glam rock", "southern rock",
                    "rock and roll", "rock n roll", "blues rock", "art rock", "emo",
                    "pop punk", "shoegaze", "stoner rock",
                ],
            ),
            GenreEntry::new(
                "pop",
                [
                    "dance pop", "electropop", "synthpop", "synth-pop", "indie pop",
                    "pop rock", "teen pop", "k-pop", "j-pop", "power pop", "dream pop",
                    "art pop", "chamber pop", "europop", "bubblegum pop", "80s pop",
                    "latin pop", "pop soul",
                ],
            ),
            GenreEntry::new(
                "hip hop",
                [
                    "hip-hop", "hiphop", "rap", "trap", "gangsta rap", "east coast rap",
                    "west coast rap", "underground hip-hop", "underground hip hop",
                    "conscious hip hop", "boom bap", "drill", "grime", "dirty south",
                    "southern rap", "old school hip hop", "alternative hip-hop",
                ],
            ),
            GenreEntry::new(
                "jazz",
                [
                    "smooth jazz", "bebop", "hard bop", "cool jazz", "free jazz",
                    "jazz fusion", "fusion", "swing", "big band", "vocal jazz",
                    "acid jazz", "latin jazz", "modal jazz", "nu jazz", "bossa nova",
                    "dixieland", "contemporary jazz",
                ],
            ),
            GenreEntry::new(
                "electronic",
                [
                    "electronica", "edm", "house", "deep house", "tech house", "techno",
                    "trance", "dubstep", "drum and bass", "dnb", "ambient", "idm",
                    "electro", "downtempo", "trip-hop", "trip hop", "chillout",
                    "breakbeat", "synthwave", "dance", "electronic dance music",
                    "uk garage", "hardstyle", "industrial",
                ],
            ),
            GenreEntry::new(
                "folk",
                [
                    "folk rock", "indie folk", "contemporary folk", "traditional folk",
                    "folk pop", "americana", "singer-songwriter", "acoustic",
                    "celtic", "freak folk", "neofolk", "anti-folk",
                ],
            ),
            GenreEntry::new(
                "metal",
                [
                    "heavy metal", "death metal", "black metal", "thrash metal",
                    "doom metal", "power metal", "metalcore", "nu metal", "nu-metal",
                    "progressive metal", "speed metal", "symphonic metal", "sludge metal",
                    "groove metal", "deathcore", "alternative metal", "gothic metal",
                    "melodic death metal",
                ],
            ),
            GenreEntry::new(
                "r&b",
                [
                    "rnb", "rhythm and blues", "contemporary r&b", "neo soul",
                    "neo-soul", "soul", "funk", "motown", "new jack swing",
                    "quiet storm", "northern soul", "alternative r&b",
                ],
            ),
            GenreEntry::new(
                "blues",
                [
                    "delta blues", "chicago blues", "electric blues", "acoustic blues",
                    "country blues", "texas blues", "jump blues", "british blues",
                    "modern blues",
                ],
            ),
            GenreEntry::new(
                "classical",
                [
                    "baroque", "romantic", "opera", "orchestral", "symphony",
                    "chamber music", "contemporary classical", "modern classical",
                    "neoclassical", "piano", "choral", "early music", "minimalism",
                    "soundtrack", "score",
                ],
            ),
            GenreEntry::new(
                "country",
                [
                    "alt-country", "alternative country", "country rock", "bluegrass",
                    "outlaw country", "country pop", "honky tonk", "classic country",
                    "red dirt", "nashville sound",
                ],
            ),
            GenreEntry::new(
                "reggae",
                [
                    "roots reggae", "dub", "dancehall", "ska", "rocksteady",
                    "reggaeton", "lovers rock",
                ],
            ),
        ])
    }
}
