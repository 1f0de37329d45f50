use std::fmt;
use std::path::Path;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use tracing::{info, warn};

pub const LANGUAGES: &[(&str, &str)] = &[
    ("tamil", "ta"),
    ("hindi", "hi"),
    ("telugu", "te"),
    ("malayalam", "ml"),
    ("kannada", "kn"),
    ("english", "en"),
    ("japanese", "ja"),
    ("korean", "ko"),
    ("chinese", "zh"),
    ("mandarin", "zh"),
    ("french", "fr"),
    ("spanish", "es"),
    ("german", "de"),
    ("italian", "it"),
];

pub const COUNTRIES: &[(&str, &str)] = &[
    ("india", "IN"),
    ("usa", "US"),
    ("america", "US"),
    ("us", "US"),
    ("uk", "GB"),
    ("japan", "JP"),
    ("korea", "KR"),
    ("south korea", "KR"),
    ("china", "CN"),
    ("france", "FR"),
    ("spain", "ES"),
    ("germany", "DE"),
    ("italy", "IT"),
];

/// Genre name to catalog genre id, in the order the source file lists them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenreTable {
    entries: Vec<(String, u32)>,
}

impl<'de> Deserialize<'de> for GenreTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct GenreVisitor;

        impl<'de> Visitor<'de> for GenreVisitor {
            type Value = GenreTable;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of genre name to genre id")
            }

            fn visit_map<M>(self, mut access: M) -> Result<GenreTable, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut table = GenreTable::default();
                while let Some((name, id)) = access.next_entry::<String, u32>()? {
                    table.insert(&name, id);
                }
                Ok(table)
            }
        }

        deserializer.deserialize_map(GenreVisitor)
    }
}

impl GenreTable {
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, u32)>) -> Self {
        let mut table = Self::default();
        for (name, id) in pairs {
            table.insert(name, id);
        }
        table
    }

    fn insert(&mut self, name: &str, id: u32) {
        let name = name.to_lowercase();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = id,
            None => self.entries.push((name, id)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries.iter().map(|(n, id)| (n.as_str(), *id))
    }
}

/// The fixed lookup tables the query interpreter scans.
///
/// Built once at startup and shared read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    genres: GenreTable,
}

impl Vocabulary {
    pub fn new(genres: GenreTable) -> Self {
        Self { genres }
    }

    /// Load the genre table from a JSON object file. A missing or malformed
    /// file yields an empty genre table.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Cannot read genres file {}: {}", path.display(), e);
                return Self::default();
            }
        };

        match serde_json::from_str::<GenreTable>(&content) {
            Ok(genres) => {
                info!("Loaded {} genres from {}", genres.len(), path.display());
                Self::new(genres)
            }
            Err(e) => {
                warn!("Cannot parse genres file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn genres(&self) -> &GenreTable {
        &self.genres
    }

    pub fn detect_genre(&self, query: &str) -> Option<u32> {
        self.genres
            .iter()
            .find(|(name, _)| query.contains(name))
            .map(|(_, id)| id)
    }

    pub fn detect_language(&self, query: &str) -> Option<&'static str> {
        first_contained(LANGUAGES, query)
    }

    pub fn detect_country(&self, query: &str) -> Option<&'static str> {
        first_contained(COUNTRIES, query)
    }

    pub fn genre_names(&self) -> Vec<&str> {
        self.genres.iter().map(|(name, _)| name).collect()
    }

    pub fn genre_id(&self, name: &str) -> Option<u32> {
        let name = name.trim().to_lowercase();
        self.genres.iter().find(|(n, _)| *n == name).map(|(_, id)| id)
    }

    /// Names of the given genre ids, in table order. Aliases sharing an id
    /// are reported once, under the first name.
    pub fn genre_names_for(&self, ids: &[u32]) -> Vec<String> {
        let mut seen = Vec::new();
        let mut names = Vec::new();
        for (name, id) in self.genres.iter() {
            if ids.contains(&id) && !seen.contains(&id) {
                seen.push(id);
                names.push(name.to_string());
            }
        }
        names
    }

    pub fn language_code(&self, name: &str) -> Option<&'static str> {
        let name = name.trim().to_lowercase();
        LANGUAGES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, code)| *code)
    }
}

fn first_contained(table: &[(&str, &'static str)], query: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(name, _)| query.contains(name))
        .map(|(_, code)| *code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_genre_table_keeps_file_order() {
        let table: GenreTable =
            serde_json::from_str(r#"{"Thriller": 53, "Action": 28, "Drama": 18}"#).unwrap();
        let names: Vec<&str> = table.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["thriller", "action", "drama"]);
    }

    #[test]
    fn test_first_genre_wins_in_table_order() {
        let vocab = Vocabulary::new(GenreTable::from_pairs([("drama", 18), ("action", 28)]));
        assert_eq!(vocab.detect_genre("action drama"), Some(18));
        assert_eq!(vocab.detect_genre("comedy"), None);
    }

    #[test]
    fn test_language_and_country() {
        let vocab = Vocabulary::default();
        assert_eq!(vocab.detect_language("old mandarin classics"), Some("zh"));
        assert_eq!(vocab.detect_country("films from south korea"), Some("KR"));
        assert_eq!(vocab.detect_country("made in india"), Some("IN"));
        assert_eq!(vocab.detect_language("nothing here"), None);
        assert_eq!(vocab.language_code(" Tamil "), Some("ta"));
        assert_eq!(vocab.language_code("klingon"), None);
    }

    #[test]
    fn test_countries_have_no_duplicate_keys() {
        for (i, (name, _)) in COUNTRIES.iter().enumerate() {
            assert!(!COUNTRIES[i + 1..].iter().any(|(n, _)| n == name), "{}", name);
        }
    }

    #[test]
    fn test_genre_lookups() {
        let vocab = Vocabulary::new(GenreTable::from_pairs([
            ("Action", 28),
            ("Comedy", 35),
            ("Drama", 18),
        ]));
        assert_eq!(vocab.genre_id("COMEDY"), Some(35));
        assert_eq!(vocab.genre_id("horror"), None);
        assert_eq!(vocab.genre_names_for(&[18, 28]), vec!["action", "drama"]);
        assert_eq!(vocab.genre_names(), vec!["action", "comedy", "drama"]);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let vocab = Vocabulary::load("/nonexistent/genres.json");
        assert!(vocab.genres().is_empty());
    }

    #[test]
    fn test_load_malformed_file_is_empty() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[1, 2, 3").unwrap();
        let vocab = Vocabulary::load(file.path());
        assert!(vocab.genres().is_empty());
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"Science Fiction": 878, "Horror": 27}}"#).unwrap();
        let vocab = Vocabulary::load(file.path());
        assert_eq!(vocab.genres().len(), 2);
        assert_eq!(vocab.detect_genre("best science fiction"), Some(878));
    }
}
