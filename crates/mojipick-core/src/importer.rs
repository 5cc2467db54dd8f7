//! Builds the canonical dataset from Unicode's `emoji-test.txt`
//!
//! The feed looks like this:
//!
//! ```text
//! # group: Smileys & Emotion
//! # subgroup: face-smiling
//! 1F600                  ; fully-qualified     # 😀 E1.0 grinning face
//! 263A FE0F              ; fully-qualified     # ☺️ E0.6 smiling face
//! 263A                   ; unqualified         # ☺ E0.6 smiling face
//! ```
//!
//! Only `fully-qualified` lines become records, which already drops the
//! text-presentation duplicates. Skin tone variants are kept here and
//! collapsed later when the catalog loads.

use crate::error::Result;
use crate::overrides::OverrideStore;
use crate::record::{EmojiRecord, KeywordSet, BASE_LANGUAGE, DEFAULT_CATEGORY};
use crate::source::EmojiSource;
use crate::store;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

/// Status of the lines that become records
pub const FULLY_QUALIFIED: &str = "fully-qualified";

const GROUP_PREFIX: &str = "# group:";

static SHORTCODE_SEPARATOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9_]+").expect("Invalid shortcode regex"));

static KEYWORD_SEPARATOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("Invalid keyword regex"));

/// Summary of an import run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Records produced
    pub records: usize,
    /// Data lines that did not have the expected shape
    pub malformed: usize,
    /// Lines skipped because their status was not fully-qualified
    pub not_fully_qualified: usize,
    /// Override entries applied to records
    pub overrides_applied: usize,
    /// Distinct categories seen
    pub categories: usize,
}

/// A fully-qualified data line
#[derive(Debug, Clone, PartialEq, Eq)]
struct SourceEntry<'a> {
    codepoints: &'a str,
    glyph: &'a str,
    name: String,
}

#[derive(Debug, PartialEq, Eq)]
enum SourceLine<'a> {
    Group(&'a str),
    Ignored,
    NotFullyQualified,
    Malformed,
    Emoji(SourceEntry<'a>),
}

fn classify(line: &str) -> SourceLine<'_> {
    let line = line.trim();

    if let Some(group) = line.strip_prefix(GROUP_PREFIX) {
        return SourceLine::Group(group.trim());
    }
    if line.is_empty() || line.starts_with('#') {
        return SourceLine::Ignored;
    }

    let Some((codepoints, rest)) = line.split_once(';') else {
        return SourceLine::Malformed;
    };
    let Some((status, comment)) = rest.split_once('#') else {
        return SourceLine::Malformed;
    };

    if status.trim() != FULLY_QUALIFIED {
        return SourceLine::NotFullyQualified;
    }

    let mut tokens = comment.split_whitespace();
    let Some(glyph) = tokens.next() else {
        return SourceLine::Malformed;
    };
    let name = tokens.collect::<Vec<_>>().join(" ").to_lowercase();
    if name.is_empty() {
        return SourceLine::Malformed;
    }

    SourceLine::Emoji(SourceEntry {
        codepoints: codepoints.trim(),
        glyph,
        name,
    })
}

/// `:snake_case:` identifier for a lowercase English name
///
/// Collisions between different emoji are possible and accepted.
pub fn shortcode_for(name: &str) -> String {
    let lowered = name.to_lowercase();
    let body = SHORTCODE_SEPARATOR_REGEX.replace_all(&lowered, "_");
    format!(":{}:", body.trim_matches('_'))
}

/// The distinct words of a name, used as English keywords
pub fn english_keywords(name: &str) -> BTreeSet<String> {
    KEYWORD_SEPARATOR_REGEX
        .split(&name.to_lowercase())
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}

fn record_for(entry: SourceEntry<'_>, category: &str) -> EmojiRecord {
    let keywords = BTreeMap::from([(BASE_LANGUAGE.to_string(), english_keywords(&entry.name))]);
    let mut record = EmojiRecord::new(entry.glyph, shortcode_for(&entry.name));
    record.codepoints = entry.codepoints.to_string();
    record.keywords = KeywordSet::PerLanguage(keywords);
    record.category = category.to_string();
    record.names.insert(BASE_LANGUAGE.to_string(), entry.name);
    record
}

/// Parse `source_text` into records and apply `overrides`
pub fn build(source_text: &str, overrides: &OverrideStore) -> Vec<EmojiRecord> {
    build_with_report(source_text, overrides).0
}

/// Like [`build`], also reporting what was skipped
pub fn build_with_report(
    source_text: &str,
    overrides: &OverrideStore,
) -> (Vec<EmojiRecord>, ImportReport) {
    let mut report = ImportReport::default();
    let mut records = Vec::new();
    let mut categories = BTreeSet::new();
    let mut current_group = DEFAULT_CATEGORY;

    for (number, line) in source_text.lines().enumerate() {
        match classify(line) {
            SourceLine::Group(group) => current_group = group,
            SourceLine::Ignored => {}
            SourceLine::NotFullyQualified => report.not_fully_qualified += 1,
            SourceLine::Malformed => {
                debug!("Skipping malformed line {}: {}", number + 1, line.trim());
                report.malformed += 1;
            }
            SourceLine::Emoji(entry) => {
                categories.insert(current_group);
                records.push(record_for(entry, current_group));
            }
        }
    }

    for record in &mut records {
        report.overrides_applied += overrides.apply_to(record);
    }

    report.records = records.len();
    report.categories = categories.len();
    (records, report)
}

/// Fetch the feed, build the dataset and write it to `dataset_path`
///
/// Fails without touching `dataset_path` when the source cannot be fetched.
pub fn import(
    source: &dyn EmojiSource,
    overrides_path: &Path,
    dataset_path: &Path,
) -> Result<ImportReport> {
    info!("Importing emoji from {}", source.describe());
    let text = source.fetch()?;

    let overrides = OverrideStore::load(overrides_path);
    let (records, report) = build_with_report(&text, &overrides);
    if records.is_empty() {
        warn!("{} produced no fully-qualified emoji", source.describe());
    }

    store::save_dataset(dataset_path, &records)?;
    info!(
        "Wrote {} emoji in {} categories to {} ({} malformed lines skipped)",
        report.records,
        report.categories,
        dataset_path.display(),
        report.malformed
    );
    Ok(report)
}
