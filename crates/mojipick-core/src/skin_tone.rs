//! Fitzpatrick skin tone modifiers
//!
//! Emoji such as 👍 accept one of five modifier codepoints (U+1F3FB..U+1F3FF)
//! right after the base glyph. The catalog stores only the base form and the
//! active tone is applied when a glyph is inserted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The five modifier codepoints, lightest first
pub const MODIFIERS: [char; 5] = [
    '\u{1F3FB}',
    '\u{1F3FC}',
    '\u{1F3FD}',
    '\u{1F3FE}',
    '\u{1F3FF}',
];

const PREVIEW_BASE: &str = "\u{1F590}";

/// Skin tone selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkinTone {
    /// No modifier (yellow)
    #[default]
    Default,
    Light,
    MediumLight,
    Medium,
    MediumDark,
    Dark,
}

impl SkinTone {
    pub fn all() -> [Self; 6] {
        [
            Self::Default,
            Self::Light,
            Self::MediumLight,
            Self::Medium,
            Self::MediumDark,
            Self::Dark,
        ]
    }

    /// Tone by position, 0 being the default tone
    pub fn from_index(index: usize) -> Option<Self> {
        Self::all().get(index).copied()
    }

    pub fn index(&self) -> usize {
        match self {
            Self::Default => 0,
            Self::Light => 1,
            Self::MediumLight => 2,
            Self::Medium => 3,
            Self::MediumDark => 4,
            Self::Dark => 5,
        }
    }

    /// Modifier codepoint, `None` for the default tone
    pub fn modifier(&self) -> Option<char> {
        match self.index() {
            0 => None,
            i => Some(MODIFIERS[i - 1]),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Light => "light",
            Self::MediumLight => "medium-light",
            Self::Medium => "medium",
            Self::MediumDark => "medium-dark",
            Self::Dark => "dark",
        }
    }

    /// A raised hand rendered in this tone, for tone selectors
    pub fn preview(&self) -> String {
        self.apply(PREVIEW_BASE)
    }

    /// Apply this tone to a glyph, replacing any tone it already carries
    pub fn apply(&self, glyph: &str) -> String {
        let mut base = strip_skin_tones(glyph);
        if let Some(modifier) = self.modifier() {
            if !base.is_empty() {
                base.push(modifier);
            }
        }
        base
    }
}

impl fmt::Display for SkinTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SkinTone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        if let Ok(index) = normalized.parse::<usize>() {
            return Self::from_index(index).ok_or_else(|| format!("Skin tone out of range: {}", s));
        }
        Self::all()
            .into_iter()
            .find(|tone| tone.label() == normalized)
            .ok_or_else(|| format!("Unknown skin tone: {}", s))
    }
}

/// Whether `c` is one of the five tone modifiers
pub fn is_modifier(c: char) -> bool {
    MODIFIERS.contains(&c)
}

/// Remove every skin tone modifier from `text`
pub fn strip_skin_tones(text: &str) -> String {
    text.chars().filter(|c| !is_modifier(*c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_removes_all_modifiers() {
        assert_eq!(strip_skin_tones("👍🏽"), "👍");
        // Couple with two different tones
        assert_eq!(strip_skin_tones("🧑🏻‍🤝‍🧑🏿"), "🧑‍🤝‍🧑");
        assert_eq!(strip_skin_tones("😀"), "😀");
        assert_eq!(strip_skin_tones(""), "");
    }

    #[test]
    fn test_strip_is_idempotent() {
        let once = strip_skin_tones("👋🏾");
        assert_eq!(strip_skin_tones(&once), once);
    }

    #[test]
    fn test_apply_replaces_existing_tone() {
        assert_eq!(SkinTone::Dark.apply("👍"), "👍🏿");
        assert_eq!(SkinTone::Light.apply("👍🏿"), "👍🏻");
        assert_eq!(SkinTone::Default.apply("👍🏿"), "👍");
        assert_eq!(SkinTone::Medium.apply(""), "");
    }

    #[test]
    fn test_index_roundtrip() {
        for (i, tone) in SkinTone::all().iter().enumerate() {
            assert_eq!(tone.index(), i);
            assert_eq!(SkinTone::from_index(i), Some(*tone));
        }
        assert_eq!(SkinTone::from_index(6), None);
    }

    #[test]
    fn test_parse() {
        assert_eq!("medium-dark".parse::<SkinTone>(), Ok(SkinTone::MediumDark));
        assert_eq!("Medium_Light".parse::<SkinTone>(), Ok(SkinTone::MediumLight));
        assert_eq!("3".parse::<SkinTone>(), Ok(SkinTone::Medium));
        assert!("purple".parse::<SkinTone>().is_err());
        assert!("9".parse::<SkinTone>().is_err());
    }

    #[test]
    fn test_preview() {
        assert_eq!(SkinTone::Default.preview(), "🖐");
        assert_eq!(SkinTone::Light.preview(), "🖐🏻");
    }
}
