//! Buffer for inserting several emoji at once
//!
//! Glyphs are collected with the active skin tone applied and handed over as
//! one string when the user confirms.

use crate::skin_tone::SkinTone;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasteBuffer {
    glyphs: Vec<String>,
}

impl PasteBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `glyph` in `tone`, returning the glyph as buffered
    pub fn push(&mut self, glyph: &str, tone: SkinTone) -> String {
        let toned = tone.apply(glyph);
        if !toned.is_empty() {
            self.glyphs.push(toned.clone());
        }
        toned
    }

    /// Glyphs buffered so far, in insertion order
    pub fn glyphs(&self) -> &[String] {
        &self.glyphs
    }

    /// Current content as one string
    pub fn contents(&self) -> String {
        self.glyphs.concat()
    }

    /// Take the whole content, leaving the buffer empty
    pub fn finish(&mut self) -> String {
        std::mem::take(&mut self.glyphs).concat()
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_applies_tone() {
        let mut buffer = PasteBuffer::new();
        assert_eq!(buffer.push("👍", SkinTone::Dark), "👍🏿");
        assert_eq!(buffer.push("👍🏻", SkinTone::Default), "👍");
        assert_eq!(buffer.glyphs(), ["👍🏿", "👍"]);
    }

    #[test]
    fn test_finish_empties_buffer() {
        let mut buffer = PasteBuffer::new();
        buffer.push("😀", SkinTone::Default);
        buffer.push("❤️", SkinTone::Default);
        assert_eq!(buffer.contents(), "😀❤️");
        assert_eq!(buffer.len(), 2);

        assert_eq!(buffer.finish(), "😀❤️");
        assert!(buffer.is_empty());
        assert_eq!(buffer.finish(), "");
    }

    #[test]
    fn test_empty_glyph_is_ignored() {
        let mut buffer = PasteBuffer::new();
        buffer.push("", SkinTone::Medium);
        assert!(buffer.is_empty());
    }
}
