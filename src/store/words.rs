use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use icu_normalizer::ComposingNormalizerBorrowed;
use rust_embed::Embed;
use serde::Deserialize;

use crate::error::{MIN_WORDS, QuizError};

#[derive(Embed)]
#[folder = "assets/words/"]
struct WordAssets;

const BUILTIN_PREFIX: &str = "builtin:";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct WordEntry {
    #[serde(alias = "Word")]
    pub word: String,
    #[serde(alias = "Meaning")]
    pub meaning: String,
}

/// Where a course's words come from: a bundled list or a file on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WordSource {
    Builtin(String),
    File(PathBuf),
}

impl WordSource {
    /// `builtin:<name>` selects a bundled list, anything else is a path.
    pub fn parse(spec: &str) -> Self {
        match spec.strip_prefix(BUILTIN_PREFIX) {
            Some(name) => WordSource::Builtin(name.to_string()),
            None => WordSource::File(PathBuf::from(spec)),
        }
    }

    pub fn builtin_names() -> Vec<String> {
        WordAssets::iter().map(|f| f.to_string()).collect()
    }

    fn format(&self) -> Format {
        match self {
            WordSource::Builtin(name) => Format::from_path(Path::new(name)),
            WordSource::File(path) => Format::from_path(path),
        }
    }
}

impl fmt::Display for WordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WordSource::Builtin(name) => write!(f, "{BUILTIN_PREFIX}{name}"),
            WordSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Csv,
    Tsv,
    Json,
}

impl Format {
    fn from_path(path: &Path) -> Self {
        match path.extension() {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => Format::Tsv,
            _ => Format::Csv,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonWords {
    Map(BTreeMap<String, String>),
    List(Vec<WordEntry>),
}

/// Immutable word → meaning mapping for one course.
#[derive(Clone, Debug, Default)]
pub struct WordStore {
    entries: BTreeMap<String, String>,
}

impl WordStore {
    pub fn load(source: &WordSource) -> Result<Self, QuizError> {
        let text = match source {
            WordSource::Builtin(name) => {
                let file = WordAssets::get(name)
                    .ok_or_else(|| QuizError::data_load(source.to_string(), "no such bundled list"))?;
                String::from_utf8(file.data.into_owned())
                    .map_err(|e| QuizError::data_load(source.to_string(), e))?
            }
            WordSource::File(path) => fs::read_to_string(path)
                .map_err(|e| QuizError::data_load(source.to_string(), e))?,
        };
        let entries = parse_entries(&source.to_string(), source.format(), &text)?;
        let store = Self::from_entries(entries)?;
        tracing::info!(source = %source, words = store.len(), "loaded word list");
        Ok(store)
    }

    /// Build a store from raw entries: text is trimmed and NFC-normalised,
    /// blank rows are dropped, and a repeated word keeps its last meaning.
    pub fn from_entries(entries: impl IntoIterator<Item = WordEntry>) -> Result<Self, QuizError> {
        let normalizer = ComposingNormalizerBorrowed::new_nfc();
        let mut map = BTreeMap::new();
        for entry in entries {
            let word = normalizer.normalize(entry.word.trim()).trim().to_string();
            let meaning = normalizer.normalize(entry.meaning.trim()).trim().to_string();
            if word.is_empty() || meaning.is_empty() {
                continue;
            }
            map.insert(word, meaning);
        }
        if map.len() < MIN_WORDS {
            return Err(QuizError::InsufficientData {
                found: map.len(),
                required: MIN_WORDS,
            });
        }
        Ok(Self { entries: map })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn meaning(&self, word: &str) -> Option<&str> {
        self.entries.get(word).map(String::as_str)
    }

    /// Words in sorted order, so a seeded draw is reproducible.
    pub fn words(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Every meaning, one per word (shared meanings repeat).
    pub fn meanings(&self) -> Vec<&str> {
        self.entries.values().map(String::as_str).collect()
    }

    pub fn distinct_meanings(&self) -> usize {
        self.entries.values().collect::<BTreeSet<_>>().len()
    }

    pub fn entry(&self, word: &str) -> Option<WordEntry> {
        self.entries.get_key_value(word).map(|(w, m)| WordEntry {
            word: w.clone(),
            meaning: m.clone(),
        })
    }
}

fn parse_entries(name: &str, format: Format, text: &str) -> Result<Vec<WordEntry>, QuizError> {
    match format {
        Format::Json => {
            let words: JsonWords =
                serde_json::from_str(text).map_err(|e| QuizError::data_load(name, e))?;
            Ok(match words {
                JsonWords::Map(map) => map
                    .into_iter()
                    .map(|(word, meaning)| WordEntry { word, meaning })
                    .collect(),
                JsonWords::List(list) => list,
            })
        }
        Format::Csv => parse_delimited(name, b',', text),
        Format::Tsv => parse_delimited(name, b'\t', text),
    }
}

/// Delimited text with a header row naming `word` and `meaning` columns
/// (any case). Other columns are ignored.
fn parse_delimited(name: &str, delimiter: u8, text: &str) -> Result<Vec<WordEntry>, QuizError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());
    let headers = reader
        .headers()
        .map_err(|e| QuizError::data_load(name, e))?
        .clone();
    let column = |field: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(field));
    let (Some(word_col), Some(meaning_col)) = (column("word"), column("meaning")) else {
        return Err(QuizError::data_load(name, "missing Word/Meaning header"));
    };

    let mut entries = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| QuizError::data_load(name, e))?;
        entries.push(WordEntry {
            word: row.get(word_col).unwrap_or_default().to_string(),
            meaning: row.get(meaning_col).unwrap_or_default().to_string(),
        });
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn entry(word: &str, meaning: &str) -> WordEntry {
        WordEntry {
            word: word.to_string(),
            meaning: meaning.to_string(),
        }
    }

    #[test]
    fn blank_rows_are_dropped_and_duplicates_keep_last() {
        let store = WordStore::from_entries(vec![
            entry("apple", "a fruit"),
            entry("apple", "a red fruit"),
            entry("  ", "nothing"),
            entry("ghost", "   "),
            entry("car", "a vehicle"),
            entry("sky", "the atmosphere"),
            entry("banana", "a fruit-like"),
        ])
        .unwrap();
        assert_eq!(store.len(), 4);
        assert_eq!(store.meaning("apple"), Some("a red fruit"));
        assert_eq!(store.meaning("ghost"), None);
    }

    #[test]
    fn fewer_than_four_entries_is_insufficient() {
        let err = WordStore::from_entries(vec![
            entry("a", "1"),
            entry("b", "2"),
            entry("c", "3"),
            entry("c", "4"),
        ])
        .unwrap_err();
        assert!(matches!(err, QuizError::InsufficientData { found: 3, required: 4 }));
    }

    #[test]
    fn text_is_nfc_normalised() {
        // "が" written as "か" + combining dakuten
        let store = WordStore::from_entries(vec![
            entry("gakkou", "\u{304B}\u{3099}っこう"),
            entry("b", "2"),
            entry("c", "3"),
            entry("d", "4"),
        ])
        .unwrap();
        assert_eq!(store.meaning("gakkou"), Some("\u{304C}っこう"));
    }

    #[test]
    fn csv_headers_are_case_insensitive_with_extra_columns() {
        let text = "Id,Word,Meaning\n1,apple,a fruit\n2,car,\"a vehicle, usually\"\n3,sky,the atmosphere\n4,tree,a plant\n";
        let entries = parse_entries("test.csv", Format::Csv, text).unwrap();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[1], entry("car", "a vehicle, usually"));
    }

    #[test]
    fn csv_without_meaning_column_fails() {
        let err = parse_entries("bad.csv", Format::Csv, "word,definition\na,b\n").unwrap_err();
        assert!(matches!(err, QuizError::DataLoad { .. }));
    }

    #[test]
    fn json_accepts_map_and_list() {
        let map = parse_entries("w.json", Format::Json, r#"{"apple": "a fruit", "car": "a vehicle"}"#).unwrap();
        assert_eq!(map.len(), 2);
        let list = parse_entries(
            "w.json",
            Format::Json,
            r#"[{"word": "apple", "meaning": "a fruit"}, {"Word": "sky", "Meaning": "up"}]"#,
        )
        .unwrap();
        assert_eq!(list[1], entry("sky", "up"));
    }

    #[test]
    fn tsv_files_use_tabs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("words.tsv");
        fs::write(&path, "word\tmeaning\na\tone\nb\ttwo\nc\tthree\nd\tfour, really\n").unwrap();
        let store = WordStore::load(&WordSource::File(path)).unwrap();
        assert_eq!(store.meaning("d"), Some("four, really"));
    }

    #[test]
    fn missing_file_is_a_data_load_error() {
        let err = WordStore::load(&WordSource::parse("/nonexistent/words.csv")).unwrap_err();
        assert!(matches!(err, QuizError::DataLoad { .. }));
    }

    #[test]
    fn builtin_lists_load() {
        let names = WordSource::builtin_names();
        assert!(!names.is_empty());
        for name in names {
            let store = WordStore::load(&WordSource::Builtin(name.clone())).unwrap();
            assert!(store.distinct_meanings() >= MIN_WORDS, "{name}");
        }
    }

    #[test]
    fn format_follows_the_extension() {
        assert_eq!(WordSource::parse("words.JSON").format(), Format::Json);
        assert_eq!(WordSource::parse("builtin:list.tsv").format(), Format::Tsv);
        assert_eq!(WordSource::parse("words").format(), Format::Csv);
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_paths_keep_their_format() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let json = WordSource::File(PathBuf::from(OsStr::from_bytes(b"w\xff.json")));
        assert_eq!(json.format(), Format::Json);
        let tsv = WordSource::File(PathBuf::from(OsStr::from_bytes(b"\xfe/words.tsv")));
        assert_eq!(tsv.format(), Format::Tsv);
    }

    #[test]
    fn source_spec_round_trips_through_display() {
        let source = WordSource::parse("builtin:toeic.csv");
        assert_eq!(source, WordSource::Builtin("toeic.csv".to_string()));
        assert_eq!(source.to_string(), "builtin:toeic.csv");
    }
}
