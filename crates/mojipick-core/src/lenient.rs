//! Field deserializers that fall back instead of failing
//!
//! The dataset and the overrides file are often edited by hand. A `null`, a
//! bare string where a list belongs, or a number where a name belongs only
//! resets that field (or that language) and the rest of the entry loads.

use crate::record::DEFAULT_CATEGORY;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// The field as `T`, or `T::default()` when it is `null` or has another shape
pub(crate) fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// A category name, `"Other"` when missing, blank or not a string
pub(crate) fn category<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(text(Value::deserialize(deserializer)?).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()))
}

/// Language to name; non-string names are dropped
pub(crate) fn string_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(map) => strings_by_key(map),
        _ => BTreeMap::new(),
    })
}

/// Like [`string_map`], `None` when the field is not an object
pub(crate) fn optional_string_map<'de, D>(
    deserializer: D,
) -> Result<Option<BTreeMap<String, String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(map) => Some(strings_by_key(map)),
        _ => None,
    })
}

/// A non-blank string, `None` otherwise
pub(crate) fn optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(text(Value::deserialize(deserializer)?))
}

/// A word list, accepting a bare string as a single word
pub(crate) fn word_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(words(Value::deserialize(deserializer)?))
}

/// Like [`word_list`], deduplicated
pub(crate) fn word_set<'de, D>(deserializer: D) -> Result<Option<BTreeSet<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(words(Value::deserialize(deserializer)?).map(|w| w.into_iter().collect()))
}

/// Language to word list; languages whose value is not a list are skipped
pub(crate) fn keyword_lists<'de, D>(
    deserializer: D,
) -> Result<Option<BTreeMap<String, Vec<String>>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Object(map) = Value::deserialize(deserializer)? else {
        return Ok(None);
    };

    Ok(Some(
        map.into_iter()
            .filter_map(|(lang, value)| match value {
                Value::Array(items) => Some((lang, items.into_iter().filter_map(text).collect())),
                _ => None,
            })
            .collect(),
    ))
}

/// String items of a list, or a bare string as a one-word list
pub(crate) fn words(value: Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => Some(items.into_iter().filter_map(text).collect()),
        Value::String(_) => Some(text(value).into_iter().collect()),
        _ => None,
    }
}

fn text(value: Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        _ => None,
    }
}

fn strings_by_key(map: Map<String, Value>) -> BTreeMap<String, String> {
    map.into_iter()
        .filter_map(|(key, value)| text(value).map(|s| (key, s)))
        .collect()
}
