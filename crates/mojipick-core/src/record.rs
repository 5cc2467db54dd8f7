//! Emoji records as stored in the canonical dataset
//!
//! ```json
//! {
//!   "char": "😀",
//!   "codepoints": "1F600",
//!   "shortcode": ":grinning_face:",
//!   "names": { "en": "grinning face" },
//!   "keywords": { "en": ["face", "grinning"] },
//!   "category": "Smileys & Emotion",
//!   "favorite": false
//! }
//! ```

use crate::lenient;
use crate::overrides::OverrideEntry;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

/// Category used when the source declares none
pub const DEFAULT_CATEGORY: &str = "Other";

/// Language every dataset carries names and keywords for
pub const BASE_LANGUAGE: &str = "en";

// Localized name sources prefix names with the emoji version ("e0.6 face")
static VERSION_TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^e\d+(\.\d+)?\s+").expect("Invalid version tag regex")
});

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

/// Search keywords of a record
///
/// Current datasets store keywords per language. Older ones stored a single
/// flat list, which is still accepted. A flat list has no language, so it
/// matches searches in every language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum KeywordSet {
    PerLanguage(BTreeMap<String, BTreeSet<String>>),
    Flat(BTreeSet<String>),
}

impl Default for KeywordSet {
    fn default() -> Self {
        Self::PerLanguage(BTreeMap::new())
    }
}

impl<'de> Deserialize<'de> for KeywordSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from)
    }
}

/// Lists and bare strings become word sets; anything else is dropped
impl From<Value> for KeywordSet {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::PerLanguage(
                map.into_iter()
                    .filter_map(|(lang, words)| {
                        lenient::words(words).map(|w| (lang, w.into_iter().collect()))
                    })
                    .collect(),
            ),
            other => lenient::words(other)
                .map(|w| Self::Flat(w.into_iter().collect()))
                .unwrap_or_default(),
        }
    }
}

impl KeywordSet {
    /// Keywords searched for `language`: its own list plus English
    pub fn effective(&self, language: &str) -> BTreeSet<&str> {
        match self {
            Self::PerLanguage(map) => [language, BASE_LANGUAGE]
                .iter()
                .filter_map(|lang| map.get(*lang))
                .flatten()
                .map(String::as_str)
                .collect(),
            Self::Flat(words) => words.iter().map(String::as_str).collect(),
        }
    }

    /// Keywords shown for `language`, falling back to English
    pub fn for_language(&self, language: &str) -> Vec<String> {
        match self {
            Self::PerLanguage(map) => map
                .get(language)
                .or_else(|| map.get(BASE_LANGUAGE))
                .map(|words| words.iter().cloned().collect())
                .unwrap_or_default(),
            Self::Flat(words) => words.iter().cloned().collect(),
        }
    }

    /// Union `words` into the list for `language`
    ///
    /// A flat set first becomes the English list of a per-language map, so
    /// its words keep matching every language while `words` only match
    /// `language`.
    pub fn merge<I, S>(&mut self, language: &str, words: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Self::Flat(flat) = self {
            let flat = std::mem::take(flat);
            *self = Self::PerLanguage(BTreeMap::from([(BASE_LANGUAGE.to_string(), flat)]));
        }
        if let Self::PerLanguage(map) = self {
            map.entry(language.to_string())
                .or_default()
                .extend(words.into_iter().map(Into::into));
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::PerLanguage(map) => map.values().all(BTreeSet::is_empty),
            Self::Flat(words) => words.is_empty(),
        }
    }
}

/// One emoji of the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmojiRecord {
    /// The glyph sequence itself
    #[serde(rename = "char", default)]
    pub glyph: String,
    /// Source code points, informational only
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub codepoints: String,
    /// `:snake_case_name:` derived from the English name
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub shortcode: String,
    /// Display name per language
    #[serde(default, deserialize_with = "lenient::string_map")]
    pub names: BTreeMap<String, String>,
    #[serde(default)]
    pub keywords: KeywordSet,
    /// Unicode group the emoji was declared under
    #[serde(default = "default_category", deserialize_with = "lenient::category")]
    pub category: String,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub favorite: bool,
    /// Language-independent extra keywords
    #[serde(
        default,
        deserialize_with = "lenient::word_set",
        skip_serializing_if = "Option::is_none"
    )]
    pub extra: Option<BTreeSet<String>>,
}

impl EmojiRecord {
    pub fn new(glyph: impl Into<String>, shortcode: impl Into<String>) -> Self {
        Self {
            glyph: glyph.into(),
            codepoints: String::new(),
            shortcode: shortcode.into(),
            names: BTreeMap::new(),
            keywords: KeywordSet::default(),
            category: default_category(),
            favorite: false,
            extra: None,
        }
    }

    /// Name shown to the user in `language`, without version tags
    pub fn display_name(&self, language: &str) -> String {
        let name = self
            .names
            .get(language)
            .or_else(|| self.names.get(BASE_LANGUAGE))
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.shortcode);
        clean_name(name)
    }

    /// Every lowercased term a search in `language` is matched against
    pub fn search_terms(&self, language: &str) -> Vec<String> {
        let mut terms: Vec<String> = self
            .keywords
            .effective(language)
            .into_iter()
            .map(str::to_lowercase)
            .collect();
        if let Some(extra) = &self.extra {
            terms.extend(extra.iter().map(|w| w.to_lowercase()));
        }
        terms.push(self.display_name(language).to_lowercase());
        terms
    }

    /// Whether the lowercased `query` occurs inside any search term
    pub fn matches_text(&self, query: &str, language: &str) -> bool {
        self.search_terms(language)
            .iter()
            .any(|term| term.contains(query))
    }

    /// Apply an override entry: scalars replace, collections merge
    pub fn apply_override(&mut self, entry: &OverrideEntry) {
        if let Some(names) = &entry.names {
            for (lang, name) in names {
                self.names.insert(lang.clone(), name.clone());
            }
        }

        if let Some(keywords) = &entry.keywords {
            for (lang, words) in keywords {
                self.keywords.merge(lang, words.iter().cloned());
            }
        }

        if let Some(category) = &entry.category {
            self.category = category.clone();
        }

        if let Some(favorite) = entry.favorite {
            self.favorite = favorite;
        }

        if let Some(extra) = &entry.extra {
            self.extra
                .get_or_insert_with(BTreeSet::new)
                .extend(extra.iter().cloned());
        }
    }
}

/// Strip a leading emoji version tag such as `e0.6 ` from a name
pub fn clean_name(name: &str) -> String {
    VERSION_TAG_REGEX.replace(name, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn set(words: &[&str]) -> BTreeSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_keyword_merge_is_order_independent() {
        let mut left = KeywordSet::PerLanguage(BTreeMap::from([("en".into(), set(&["b", "c"]))]));
        left.merge("en", ["a", "b"]);

        let mut right = KeywordSet::PerLanguage(BTreeMap::from([("en".into(), set(&["a", "b"]))]));
        right.merge("en", ["b", "c"]);

        assert_eq!(left, right);
        assert_eq!(left.for_language("en"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_flat_keywords() {
        let json = r#"["smile", "happy"]"#;
        let keywords: KeywordSet = serde_json::from_str(json).unwrap();
        assert!(matches!(keywords, KeywordSet::Flat(_)));

        assert_eq!(keywords.for_language("de"), vec!["happy", "smile"]);
        assert_eq!(keywords.effective("de").len(), 2);
    }

    #[test]
    fn test_merge_into_flat_keywords_stays_in_its_language() {
        let mut keywords: KeywordSet = serde_json::from_str(r#"["dog", "pet"]"#).unwrap();
        keywords.merge("de", ["hund"]);

        assert!(matches!(keywords, KeywordSet::PerLanguage(_)));
        assert!(!keywords.effective("en").contains("hund"));
        assert!(keywords.effective("it").contains("dog"));
        let german: Vec<&str> = keywords.effective("de").into_iter().collect();
        assert_eq!(german, vec!["dog", "hund", "pet"]);

        let mut record = EmojiRecord::new("🐕", ":dog:");
        record.keywords = KeywordSet::Flat(set(&["dog"]));
        let entry: OverrideEntry =
            serde_json::from_str(r#"{"keywords": {"de": ["hund"]}}"#).unwrap();
        record.apply_override(&entry);
        assert!(record.matches_text("hund", "de"));
        assert!(!record.matches_text("hund", "en"));
        assert!(record.matches_text("dog", "de"));
    }

    #[test]
    fn test_odd_keyword_shapes() {
        let keywords: KeywordSet =
            serde_json::from_str(r#"{"en": "dog", "it": ["cane", 7], "de": null}"#).unwrap();
        assert_eq!(keywords.for_language("en"), vec!["dog"]);
        assert_eq!(keywords.for_language("it"), vec!["cane"]);
        assert_eq!(keywords.for_language("de"), vec!["dog"]);

        let keywords: KeywordSet = serde_json::from_str("null").unwrap();
        assert_eq!(keywords, KeywordSet::default());
        let keywords: KeywordSet = serde_json::from_str(r#""smile""#).unwrap();
        assert_eq!(keywords, KeywordSet::Flat(set(&["smile"])));
    }

    #[test]
    fn test_bad_fields_fall_back_to_defaults() {
        let record: EmojiRecord = serde_json::from_str(
            r#"{
                "char": "😀",
                "shortcode": null,
                "names": {"en": "grinning face", "it": 4},
                "keywords": null,
                "category": null,
                "favorite": "yes",
                "extra": "happy"
            }"#,
        )
        .unwrap();

        assert_eq!(record.shortcode, "");
        assert_eq!(record.names, BTreeMap::from([("en".to_string(), "grinning face".to_string())]));
        assert!(record.keywords.is_empty());
        assert_eq!(record.category, DEFAULT_CATEGORY);
        assert!(!record.favorite);
        assert_eq!(record.extra, Some(set(&["happy"])));
    }

    #[test]
    fn test_effective_includes_english() {
        let keywords = KeywordSet::PerLanguage(BTreeMap::from([
            ("en".into(), set(&["heart"])),
            ("it".into(), set(&["cuore"])),
            ("de".into(), set(&["herz"])),
        ]));
        let effective = keywords.effective("it");
        assert!(effective.contains("heart"));
        assert!(effective.contains("cuore"));
        assert!(!effective.contains("herz"));
    }

    #[test]
    fn test_missing_fields_default() {
        let record: EmojiRecord = serde_json::from_str(r#"{"char": "😀"}"#).unwrap();
        assert_eq!(record.category, DEFAULT_CATEGORY);
        assert!(!record.favorite);
        assert!(record.keywords.is_empty());
        assert_eq!(record.extra, None);
    }

    #[test]
    fn test_serializes_glyph_as_char() {
        let record = EmojiRecord::new("😀", ":grinning_face:");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["char"], "😀");
        assert!(json.get("extra").is_none());
    }

    #[test]
    fn test_display_name_fallbacks() {
        let mut record = EmojiRecord::new("❤️", ":red_heart:");
        assert_eq!(record.display_name("it"), ":red_heart:");

        record.names.insert("en".into(), "red heart".into());
        assert_eq!(record.display_name("it"), "red heart");

        record.names.insert("it".into(), "E0.6 cuore rosso".into());
        assert_eq!(record.display_name("it"), "cuore rosso");
    }

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name("e0.6 grinning face"), "grinning face");
        assert_eq!(clean_name("E13 melting face"), "melting face");
        assert_eq!(clean_name("e-mail"), "e-mail");
        assert_eq!(clean_name("e1.0face"), "e1.0face");
    }

    #[test]
    fn test_search_terms_are_lowercased() {
        let mut record = EmojiRecord::new("🐕", ":dog:");
        record.names.insert("en".into(), "Dog".into());
        record.keywords.merge("en", ["Puppy"]);
        record.extra = Some(set(&["Corgi"]));

        let terms = record.search_terms("en");
        assert!(terms.contains(&"puppy".to_string()));
        assert!(terms.contains(&"corgi".to_string()));
        assert!(terms.contains(&"dog".to_string()));
        assert!(record.matches_text("cor", "en"));
        assert!(!record.matches_text("cat", "en"));
    }

    #[test]
    fn test_apply_override() {
        let mut record = EmojiRecord::new("❤️", ":red_heart:");
        record.keywords.merge("en", ["heart", "red"]);

        let entry: OverrideEntry = serde_json::from_str(
            r#"{
                "names": {"it": "cuore"},
                "keywords": {"en": ["love", "heart"], "it": ["amore"]},
                "category": "Love",
                "favorite": true,
                "extra": ["romantic"]
            }"#,
        )
        .unwrap();
        record.apply_override(&entry);
        record.apply_override(&entry);

        assert_eq!(record.names["it"], "cuore");
        assert_eq!(record.keywords.for_language("en"), vec!["heart", "love", "red"]);
        assert_eq!(record.keywords.for_language("it"), vec!["amore"]);
        assert_eq!(record.category, "Love");
        assert!(record.favorite);
        assert_eq!(record.extra, Some(set(&["romantic"])));
    }
}
