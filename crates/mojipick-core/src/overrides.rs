//! User overrides for the emoji dataset (`emoji_translations.json`)
//!
//! ```json
//! {
//!   "by_shortcode": {
//!     ":red_heart:": { "names": { "it": "cuore" }, "favorite": true }
//!   },
//!   "by_char": {
//!     "❤️": { "keywords": { "it": ["amore", "cuore"] }, "extra": ["love"] }
//!   }
//! }
//! ```
//!
//! Entries keyed by glyph are applied after entries keyed by shortcode, so they
//! win on conflicting scalar fields.

use crate::error::{CoreError, Result};
use crate::lenient;
use crate::record::EmojiRecord;
use crate::store;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// Override data for a single emoji
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverrideEntry {
    /// Replaces the display name per language
    #[serde(
        default,
        deserialize_with = "lenient::optional_string_map",
        skip_serializing_if = "Option::is_none"
    )]
    pub names: Option<BTreeMap<String, String>>,
    /// Merged into the keywords per language
    #[serde(
        default,
        deserialize_with = "lenient::keyword_lists",
        skip_serializing_if = "Option::is_none"
    )]
    pub keywords: Option<BTreeMap<String, Vec<String>>>,
    /// Replaces the category
    #[serde(
        default,
        deserialize_with = "lenient::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<String>,
    /// Replaces the favorite flag
    #[serde(
        default,
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub favorite: Option<bool>,
    /// Merged into the extra keywords
    #[serde(
        default,
        deserialize_with = "lenient::word_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub extra: Option<Vec<String>>,
    /// Fields this version does not know about, kept as-is
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// All overrides, keyed by shortcode and by glyph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverrideStore {
    #[serde(default)]
    pub by_shortcode: BTreeMap<String, OverrideEntry>,
    #[serde(default)]
    pub by_char: BTreeMap<String, OverrideEntry>,
}

impl OverrideStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load overrides, falling back to an empty store
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(Some(store)) => {
                debug!(
                    "Overrides loaded: {} by shortcode, {} by char",
                    store.by_shortcode.len(),
                    store.by_char.len()
                );
                store
            }
            Ok(None) => {
                debug!("No overrides file at {}, continuing without", path.display());
                Self::default()
            }
            Err(e) => {
                warn!("{}", e);
                Self::default()
            }
        }
    }

    /// Load overrides; `None` when the file does not exist
    ///
    /// Entries that are not objects are skipped one by one. Fields of the
    /// wrong shape inside an entry are ignored and the rest of it applies.
    pub fn try_load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let unreadable = |reason: String| CoreError::OverridesUnreadable {
            path: path.to_path_buf(),
            reason,
        };

        let content = std::fs::read_to_string(path).map_err(|e| unreadable(e.to_string()))?;
        let root: Value = serde_json::from_str(&content).map_err(|e| unreadable(e.to_string()))?;
        let Value::Object(root) = root else {
            return Err(unreadable("top level is not an object".to_string()));
        };

        Ok(Some(Self {
            by_shortcode: parse_section(&root, "by_shortcode"),
            by_char: parse_section(&root, "by_char"),
        }))
    }

    pub fn is_empty(&self) -> bool {
        self.by_shortcode.is_empty() && self.by_char.is_empty()
    }

    /// Apply the matching entries to `record`, returning how many applied
    pub fn apply_to(&self, record: &mut EmojiRecord) -> usize {
        let mut applied = 0;
        if let Some(entry) = self.by_shortcode.get(&record.shortcode) {
            record.apply_override(entry);
            applied += 1;
        }
        if let Some(entry) = self.by_char.get(&record.glyph) {
            record.apply_override(entry);
            applied += 1;
        }
        applied
    }

    /// Merge only the glyph-keyed keywords into `record`
    pub fn merge_keywords_into(&self, record: &mut EmojiRecord) -> bool {
        let Some(keywords) = self
            .by_char
            .get(&record.glyph)
            .and_then(|entry| entry.keywords.as_ref())
        else {
            return false;
        };

        for (lang, words) in keywords {
            record.keywords.merge(lang, words.iter().cloned());
        }
        true
    }

    /// Keywords the user added for `glyph` in `language`
    pub fn personal_keywords(&self, glyph: &str, language: &str) -> Vec<String> {
        self.by_char
            .get(glyph)
            .and_then(|entry| entry.keywords.as_ref())
            .and_then(|keywords| keywords.get(language))
            .cloned()
            .unwrap_or_default()
    }

    /// Replace the personal keywords of `glyph` in `language` (in memory)
    pub fn set_personal_keywords(&mut self, glyph: &str, language: &str, words: Vec<String>) {
        self.by_char
            .entry(glyph.to_string())
            .or_default()
            .keywords
            .get_or_insert_with(BTreeMap::new)
            .insert(language.to_string(), words);
    }
}

fn parse_section(root: &Map<String, Value>, key: &str) -> BTreeMap<String, OverrideEntry> {
    let Some(Value::Object(section)) = root.get(key) else {
        return BTreeMap::new();
    };

    section
        .iter()
        .filter_map(|(name, value)| {
            match serde_json::from_value::<OverrideEntry>(value.clone()) {
                Ok(entry) => Some((name.clone(), entry)),
                Err(e) => {
                    warn!("Skipping override {}[{}]: {}", key, name, e);
                    None
                }
            }
        })
        .collect()
}

/// Store `words` as the personal keywords of `glyph` in the overrides file
///
/// The file is edited as raw JSON so that every other key survives. A missing
/// or unparsable file starts from an empty object.
pub fn persist_personal_keywords(
    path: &Path,
    glyph: &str,
    language: &str,
    words: &[String],
) -> Result<()> {
    let mut root = match store::read_json::<Value>(path) {
        Ok(Some(value)) => value,
        Ok(None) => Value::Object(Map::new()),
        Err(e) => {
            warn!("{}, rewriting it", e);
            Value::Object(Map::new())
        }
    };

    let by_char = child_object(coerce_object(&mut root), "by_char");
    let entry = child_object(by_char, glyph);
    let keywords = child_object(entry, "keywords");
    keywords.insert(
        language.to_string(),
        Value::Array(words.iter().cloned().map(Value::String).collect()),
    );

    store::write_json(path, &root)
}

fn coerce_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced by an object"),
    }
}

fn child_object<'a>(parent: &'a mut Map<String, Value>, key: &str) -> &'a mut Map<String, Value> {
    coerce_object(parent.entry(key).or_insert(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("emoji_translations.json");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = OverrideStore::load(&dir.path().join("nope.json"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_invalid_json_degrades_to_empty() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "{ not json");
        assert!(matches!(
            OverrideStore::try_load(&path),
            Err(CoreError::OverridesUnreadable { .. })
        ));
        assert!(OverrideStore::load(&path).is_empty());
    }

    #[test]
    fn test_bad_entries_are_skipped() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            r#"{
                "by_shortcode": {
                    ":grinning_face:": {"favorite": true},
                    ":broken:": ["not", "an", "entry"],
                    ":odd:": {"favorite": "yes please", "category": "Faces"}
                },
                "by_char": "not a map"
            }"#,
        );

        let store = OverrideStore::load(&path);
        assert_eq!(store.by_shortcode.len(), 2);
        assert_eq!(store.by_shortcode[":grinning_face:"].favorite, Some(true));
        assert_eq!(store.by_shortcode[":odd:"].favorite, None);
        assert_eq!(store.by_shortcode[":odd:"].category.as_deref(), Some("Faces"));
        assert!(store.by_char.is_empty());
    }

    #[test]
    fn test_bad_keyword_language_keeps_the_others() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            r#"{"by_char": {"❤️": {"keywords": {"it": ["amore"], "de": "herz", "fr": null}}}}"#,
        );

        let store = OverrideStore::load(&path);
        assert_eq!(store.by_char.len(), 1);
        assert_eq!(store.personal_keywords("❤️", "it"), vec!["amore"]);
        assert!(store.personal_keywords("❤️", "de").is_empty());

        let mut record = EmojiRecord::new("❤️", ":red_heart:");
        assert!(store.merge_keywords_into(&mut record));
        assert_eq!(record.keywords.for_language("it"), vec!["amore"]);
    }

    #[test]
    fn test_null_and_string_fields_in_entry() {
        let entry: OverrideEntry = serde_json::from_str(
            r#"{
                "names": {"it": "cuore", "de": 1},
                "keywords": null,
                "category": null,
                "favorite": null,
                "extra": "love"
            }"#,
        )
        .unwrap();

        assert_eq!(
            entry.names,
            Some(BTreeMap::from([("it".to_string(), "cuore".to_string())]))
        );
        assert_eq!(entry.keywords, None);
        assert_eq!(entry.category, None);
        assert_eq!(entry.favorite, None);
        assert_eq!(entry.extra, Some(vec!["love".to_string()]));
        assert!(entry.other.is_empty());
    }

    #[test]
    fn test_char_override_wins_over_shortcode() {
        let mut store = OverrideStore::new();
        store.by_shortcode.insert(
            ":grinning_face:".into(),
            OverrideEntry {
                category: Some("Happy".into()),
                favorite: Some(true),
                ..Default::default()
            },
        );
        store.by_char.insert(
            "😀".into(),
            OverrideEntry {
                category: Some("Faces".into()),
                ..Default::default()
            },
        );

        let mut record = EmojiRecord::new("😀", ":grinning_face:");
        assert_eq!(store.apply_to(&mut record), 2);
        assert_eq!(record.category, "Faces");
        assert!(record.favorite);
    }

    #[test]
    fn test_merge_keywords_into_only_touches_keywords() {
        let mut store = OverrideStore::new();
        store.by_char.insert(
            "😀".into(),
            OverrideEntry {
                keywords: Some(BTreeMap::from([("it".into(), vec!["sorriso".into()])])),
                category: Some("Ignored".into()),
                ..Default::default()
            },
        );

        let mut record = EmojiRecord::new("😀", ":grinning_face:");
        assert!(store.merge_keywords_into(&mut record));
        assert_eq!(record.keywords.for_language("it"), vec!["sorriso"]);
        assert_eq!(record.category, "Other");
    }

    #[test]
    fn test_persist_personal_keywords_keeps_other_data() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            r#"{
                "by_shortcode": {":red_heart:": {"favorite": true}},
                "by_char": {"❤️": {"extra": ["love"], "keywords": {"en": ["valentine"]}}},
                "note": "hand edited"
            }"#,
        );

        let words = vec!["amore".to_string(), "cuore".to_string()];
        persist_personal_keywords(&path, "❤️", "it", &words).unwrap();

        let store = OverrideStore::load(&path);
        assert_eq!(store.personal_keywords("❤️", "it"), words);
        assert_eq!(store.personal_keywords("❤️", "en"), vec!["valentine"]);
        assert_eq!(store.by_char["❤️"].extra, Some(vec!["love".to_string()]));
        assert_eq!(store.by_shortcode[":red_heart:"].favorite, Some(true));

        let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["note"], "hand edited");
    }

    #[test]
    fn test_persist_personal_keywords_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("emoji_translations.json");

        persist_personal_keywords(&path, "🐕", "de", &["hund".to_string()]).unwrap();

        let store = OverrideStore::load(&path);
        assert_eq!(store.personal_keywords("🐕", "de"), vec!["hund"]);
    }

    #[test]
    fn test_unknown_fields_survive_roundtrip() {
        let entry: OverrideEntry =
            serde_json::from_str(r#"{"favorite": false, "color": "red"}"#).unwrap();
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["color"], "red");
        assert_eq!(json["favorite"], false);
    }
}
