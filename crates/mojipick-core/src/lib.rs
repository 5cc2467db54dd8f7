//! # mojipick core
//!
//! The data side of the mojipick emoji picker.
//!
//! This crate provides:
//! - An importer for Unicode's `emoji-test.txt` feed
//! - User overrides (names, keywords, categories, favorites) per emoji
//! - A catalog with skin tone normalization, categories and search
//! - Favorites, recents and personal keywords persisted as JSON
//! - Skin tone handling and a multi-emoji paste buffer

pub mod buffer;
pub mod catalog;
pub mod error;
pub mod importer;
mod lenient;
pub mod overrides;
pub mod record;
pub mod skin_tone;
pub mod source;
pub mod store;

pub use buffer::PasteBuffer;
pub use catalog::{
    normalize_skin_tones, Applied, Catalog, CatalogState, CatalogStats, CategoryId, StorePaths,
};
pub use error::{CoreError, Result};
pub use importer::{build, build_with_report, import, shortcode_for, ImportReport};
pub use overrides::{OverrideEntry, OverrideStore};
pub use record::{EmojiRecord, KeywordSet, BASE_LANGUAGE, DEFAULT_CATEGORY};
pub use skin_tone::{strip_skin_tones, SkinTone};
pub use source::{source_for, CachedFeed, EmojiSource, InMemory, LocalFile, RemoteFeed, EMOJI_TEST_URL};

/// Core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
