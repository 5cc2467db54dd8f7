//! The in-memory emoji catalog
//!
//! A `Catalog` is built from the canonical dataset plus the user's stores:
//!
//! ```text
//! emoji_data.json ──► skin tone normalization ──► keyword overrides ──┐
//! emoji_translations.json (by_char keywords) ─────────────────────────┤
//! emoji_favorites.json ───────────────────────────────────────────────┼──► Catalog
//! emoji_recent.json ──────────────────────────────────────────────────┘
//! ```
//!
//! Every mutation writes its store straight away. A failed write is logged
//! and the in-memory change is kept for the rest of the session.

use crate::error::{CoreError, Result};
use crate::overrides::{self, OverrideStore};
use crate::record::EmojiRecord;
use crate::skin_tone::strip_skin_tones;
use crate::store::{self, FavoritesStore, RecentStore};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Category selection for [`Catalog::filter`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum CategoryId {
    /// Every emoji
    #[default]
    All,
    /// Recently used emoji
    Recent,
    /// Emoji marked as favorite
    Favorites,
    /// A Unicode group such as "Smileys & Emotion"
    Named(String),
}

impl CategoryId {
    /// Parse a category label; the synthetic labels ignore case
    pub fn parse(label: &str) -> Self {
        let label = label.trim();
        if label.is_empty() || label.eq_ignore_ascii_case("all") {
            Self::All
        } else if label.eq_ignore_ascii_case("recent") {
            Self::Recent
        } else if label.eq_ignore_ascii_case("favorites") {
            Self::Favorites
        } else {
            Self::Named(label.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::All => "All",
            Self::Recent => "Recent",
            Self::Favorites => "Favorites",
            Self::Named(name) => name,
        }
    }
}

impl From<&str> for CategoryId {
    fn from(label: &str) -> Self {
        Self::parse(label)
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Locations of the files a catalog reads and writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    pub dataset: PathBuf,
    pub overrides: PathBuf,
    pub favorites: PathBuf,
    pub recent: PathBuf,
}

/// Whether the catalog reflects the dataset on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogState {
    Loaded,
    /// The dataset was rebuilt; only `reload` is allowed
    Stale,
}

/// Result of a mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied<T> {
    pub value: T,
    /// False when the change could not be written and lives only in memory
    pub durable: bool,
}

impl<T> Applied<T> {
    fn persisted(value: T, written: Result<()>) -> Self {
        match written {
            Ok(()) => Self {
                value,
                durable: true,
            },
            Err(e) => {
                warn!("{}", e);
                Self {
                    value,
                    durable: false,
                }
            }
        }
    }

    fn unchanged(value: T) -> Self {
        Self {
            value,
            durable: true,
        }
    }
}

/// Counts shown in a status line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogStats {
    pub total: usize,
    pub favorites: usize,
    pub recent: usize,
}

/// Emoji dataset plus user state, ready for filtering
#[derive(Debug, Clone)]
pub struct Catalog {
    records: Vec<EmojiRecord>,
    /// Glyph to position in `records`
    index: HashMap<String, usize>,
    overrides: OverrideStore,
    favorites: BTreeSet<String>,
    /// Most recent first, may carry skin tones
    recent: Vec<String>,
    /// Tone-stripped glyphs of `recent`
    recent_set: HashSet<String>,
    max_recent: usize,
    paths: StorePaths,
    state: CatalogState,
}

impl Catalog {
    /// Load everything; each missing or broken file degrades to empty
    pub fn load(paths: StorePaths, max_recent: usize) -> Self {
        let records = normalize_skin_tones(store::load_dataset(&paths.dataset));

        let overrides = OverrideStore::load(&paths.overrides);
        let mut catalog = Self {
            records,
            index: HashMap::new(),
            overrides,
            favorites: BTreeSet::new(),
            recent: Vec::new(),
            recent_set: HashSet::new(),
            max_recent,
            paths,
            state: CatalogState::Loaded,
        };

        catalog.merge_override_keywords();
        catalog.load_favorites();
        catalog.load_recent();
        catalog.rebuild_index();

        info!(
            "Catalog loaded: {} emoji, {} favorites, {} recent",
            catalog.records.len(),
            catalog.favorites.len(),
            catalog.recent.len()
        );
        catalog
    }

    /// Build a catalog from records already in memory
    ///
    /// Nothing is read from `paths`; mutations still write there.
    pub fn from_records(records: Vec<EmojiRecord>, paths: StorePaths, max_recent: usize) -> Self {
        let favorites = records
            .iter()
            .filter(|r| r.favorite && !r.glyph.is_empty())
            .map(|r| strip_skin_tones(&r.glyph))
            .collect();
        let mut catalog = Self {
            records: normalize_skin_tones(records),
            index: HashMap::new(),
            overrides: OverrideStore::default(),
            favorites,
            recent: Vec::new(),
            recent_set: HashSet::new(),
            max_recent,
            paths,
            state: CatalogState::Loaded,
        };
        catalog.apply_favorites();
        catalog.rebuild_index();
        catalog
    }

    fn merge_override_keywords(&mut self) {
        let mut merged = 0;
        for record in &mut self.records {
            if self.overrides.merge_keywords_into(record) {
                merged += 1;
            }
        }
        debug!("Merged override keywords into {} emoji", merged);
    }

    fn load_favorites(&mut self) {
        self.favorites = match FavoritesStore::new(&self.paths.favorites).load() {
            Some(favorites) => favorites,
            None => self
                .records
                .iter()
                .filter(|r| r.favorite)
                .map(|r| r.glyph.clone())
                .collect(),
        };
        self.apply_favorites();
    }

    fn apply_favorites(&mut self) {
        for record in &mut self.records {
            record.favorite = self.favorites.contains(&record.glyph);
        }
    }

    fn load_recent(&mut self) {
        let mut recent = RecentStore::new(&self.paths.recent).load();
        recent.truncate(self.max_recent);
        self.set_recent(recent);
    }

    fn set_recent(&mut self, recent: Vec<String>) {
        self.recent_set = recent.iter().map(|g| strip_skin_tones(g)).collect();
        self.recent = recent;
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .records
            .iter()
            .enumerate()
            .map(|(i, record)| (record.glyph.clone(), i))
            .collect();
    }

    fn ensure_loaded(&self) -> Result<()> {
        match self.state {
            CatalogState::Loaded => Ok(()),
            CatalogState::Stale => Err(CoreError::CatalogStale),
        }
    }

    fn position(&self, glyph: &str) -> Option<usize> {
        self.index
            .get(glyph)
            .or_else(|| self.index.get(&strip_skin_tones(glyph)))
            .copied()
    }

    /// The key a glyph is stored under: its record's glyph if known
    fn canonical_glyph(&self, glyph: &str) -> String {
        match self.position(glyph) {
            Some(i) => self.records[i].glyph.clone(),
            None => glyph.to_string(),
        }
    }

    pub fn state(&self) -> CatalogState {
        self.state
    }

    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }

    pub fn max_recent(&self) -> usize {
        self.max_recent
    }

    /// Mark the catalog out of date, typically after a re-import
    pub fn invalidate(&mut self) {
        debug!("Catalog invalidated");
        self.state = CatalogState::Stale;
    }

    /// Load again from the same files
    pub fn reload(&mut self) {
        *self = Self::load(self.paths.clone(), self.max_recent);
    }

    /// All records in catalog order
    pub fn records(&self) -> Result<&[EmojiRecord]> {
        self.ensure_loaded()?;
        Ok(&self.records)
    }

    /// Look up a record by glyph, with or without skin tone
    pub fn get(&self, glyph: &str) -> Result<Option<&EmojiRecord>> {
        self.ensure_loaded()?;
        Ok(self.position(glyph).map(|i| &self.records[i]))
    }

    pub fn favorites(&self) -> Result<&BTreeSet<String>> {
        self.ensure_loaded()?;
        Ok(&self.favorites)
    }

    /// Recently used glyphs, most recent first
    pub fn recent(&self) -> Result<&[String]> {
        self.ensure_loaded()?;
        Ok(&self.recent)
    }

    pub fn len(&self) -> Result<usize> {
        self.ensure_loaded()?;
        Ok(self.records.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn stats(&self) -> Result<CatalogStats> {
        self.ensure_loaded()?;
        Ok(CatalogStats {
            total: self.records.len(),
            favorites: self.favorites.len(),
            recent: self.recent.len(),
        })
    }

    /// All, Recent and Favorites, then the dataset's categories sorted
    pub fn categories(&self) -> Result<Vec<CategoryId>> {
        self.ensure_loaded()?;
        let named: BTreeSet<&str> = self
            .records
            .iter()
            .map(|r| r.category.as_str())
            .filter(|c| !c.is_empty())
            .collect();

        let mut categories = vec![CategoryId::All, CategoryId::Recent, CategoryId::Favorites];
        categories.extend(named.into_iter().map(|c| CategoryId::Named(c.to_string())));
        Ok(categories)
    }

    /// Records matching a category and a search text
    ///
    /// A non-empty search always looks at the whole catalog, whatever
    /// category is selected.
    pub fn filter(
        &self,
        category: &CategoryId,
        search_text: &str,
        language: &str,
    ) -> Result<Vec<&EmojiRecord>> {
        self.ensure_loaded()?;
        let query = search_text.trim().to_lowercase();
        let category = if query.is_empty() {
            category.clone()
        } else {
            CategoryId::All
        };

        Ok(self
            .records
            .iter()
            .filter(|record| self.in_category(record, &category))
            .filter(|record| query.is_empty() || record.matches_text(&query, language))
            .collect())
    }

    /// Category predicate of [`Catalog::filter`]
    ///
    /// `Recent` compares tone-stripped glyphs: records hold base glyphs while
    /// the recent list keeps the toned glyph that was inserted, so `👍🏽` in
    /// the recent list selects the `👍` record.
    fn in_category(&self, record: &EmojiRecord, category: &CategoryId) -> bool {
        match category {
            CategoryId::All => true,
            CategoryId::Recent => self.recent_set.contains(&record.glyph),
            CategoryId::Favorites => record.favorite,
            CategoryId::Named(name) => &record.category == name,
        }
    }

    /// Flip the favorite flag of `glyph`, returning the new state
    pub fn toggle_favorite(&mut self, glyph: &str) -> Result<Applied<bool>> {
        self.ensure_loaded()?;
        if glyph.is_empty() {
            return Ok(Applied::unchanged(false));
        }

        let key = self.canonical_glyph(glyph);
        let favorite = if self.favorites.remove(&key) {
            debug!("Removed from favorites: {}", key);
            false
        } else {
            debug!("Added to favorites: {}", key);
            self.favorites.insert(key.clone());
            true
        };

        if let Some(i) = self.position(&key) {
            self.records[i].favorite = favorite;
        }

        let written = FavoritesStore::new(&self.paths.favorites).save(&self.favorites);
        Ok(Applied::persisted(favorite, written))
    }

    /// Move `glyph` to the front of the recent list
    pub fn record_use(&mut self, glyph: &str) -> Result<Applied<Vec<String>>> {
        self.ensure_loaded()?;
        if glyph.is_empty() {
            return Ok(Applied::unchanged(self.recent.clone()));
        }

        let mut recent = std::mem::take(&mut self.recent);
        recent.retain(|g| g != glyph);
        recent.insert(0, glyph.to_string());
        recent.truncate(self.max_recent);
        self.set_recent(recent);

        let written = RecentStore::new(&self.paths.recent).save(&self.recent);
        Ok(Applied::persisted(self.recent.clone(), written))
    }

    /// Add personal search keywords for `glyph` in `language`
    ///
    /// The words are trimmed and deduplicated in their given order, merged
    /// into the record right away and stored as the personal list of that
    /// glyph in the overrides file. Returns the
    /// record's resulting keywords for `language`.
    pub fn set_personal_keywords<I, S>(
        &mut self,
        glyph: &str,
        language: &str,
        words: I,
    ) -> Result<Applied<Vec<String>>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ensure_loaded()?;
        let mut seen = HashSet::new();
        let words: Vec<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_string())
            .filter(|w| !w.is_empty() && seen.insert(w.clone()))
            .collect();

        let key = self.canonical_glyph(glyph);
        if key.is_empty() {
            return Ok(Applied::unchanged(Vec::new()));
        }

        let merged = match self.position(&key) {
            Some(i) => {
                let record = &mut self.records[i];
                record.keywords.merge(language, words.iter().cloned());
                record.keywords.for_language(language)
            }
            None => words.clone(),
        };

        self.overrides
            .set_personal_keywords(&key, language, words.clone());
        let written =
            overrides::persist_personal_keywords(&self.paths.overrides, &key, language, &words);
        Ok(Applied::persisted(merged, written))
    }

    /// Keywords the user added for `glyph` in `language`
    pub fn personal_keywords(&self, glyph: &str, language: &str) -> Result<Vec<String>> {
        self.ensure_loaded()?;
        Ok(self
            .overrides
            .personal_keywords(&self.canonical_glyph(glyph), language))
    }

    /// Keywords the record carries for `language`, English as fallback
    pub fn default_keywords(&self, glyph: &str, language: &str) -> Result<Vec<String>> {
        Ok(self
            .get(glyph)?
            .map(|record| record.keywords.for_language(language))
            .unwrap_or_default())
    }
}

/// Collapse skin tone variants onto their base glyph
///
/// The first record of every base glyph wins, later variants are dropped.
/// Records without a glyph are dropped as well.
pub fn normalize_skin_tones(records: Vec<EmojiRecord>) -> Vec<EmojiRecord> {
    let mut seen = HashSet::new();
    let before = records.len();

    let normalized: Vec<EmojiRecord> = records
        .into_iter()
        .filter(|record| !record.glyph.is_empty())
        .filter_map(|mut record| {
            let base = strip_skin_tones(&record.glyph);
            if !seen.insert(base.clone()) {
                return None;
            }
            record.glyph = base;
            Some(record)
        })
        .collect();

    debug!(
        "Skin tone normalization kept {}/{} records",
        normalized.len(),
        before
    );
    normalized
}
