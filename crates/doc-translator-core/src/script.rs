//! Source-script detection.
//!
//! Translating every string in a document wastes provider calls on numbers,
//! punctuation and text that is already in the target language. The detector
//! answers one question: does this string contain at least one character of
//! the source language's script?

use crate::config::{CodeRange, Lang};

/// Thai block, the original deployment's source script.
pub const THAI: CodeRange = CodeRange::new(0x0E00, 0x0E7F);

/// Decides whether a string is eligible for translation.
#[derive(Debug, Clone)]
pub struct ScriptDetector {
    ranges: Vec<CodeRange>,
}

impl ScriptDetector {
    /// Detector over explicit code-point ranges.
    pub fn new(ranges: Vec<CodeRange>) -> Self {
        Self { ranges }
    }

    /// Detector for the default source script (Thai).
    pub fn thai() -> Self {
        Self::new(vec![THAI])
    }

    /// Detector for a source language code.
    ///
    /// Unknown languages fall back to the Thai default so a misconfigured
    /// language code degrades to the original behavior rather than
    /// translating everything.
    pub fn for_lang(lang: &Lang) -> Self {
        let ranges = match lang.as_str() {
            "th" => vec![THAI],
            // Arabic + Arabic Supplement
            "ar" | "fa" | "ur" => vec![CodeRange::new(0x0600, 0x06FF), CodeRange::new(0x0750, 0x077F)],
            // Cyrillic
            "ru" | "uk" | "bg" | "sr" => vec![CodeRange::new(0x0400, 0x04FF)],
            // Hiragana, Katakana and the unified CJK block kanji draw from
            "ja" => vec![CodeRange::new(0x3040, 0x30FF), CodeRange::new(0x4E00, 0x9FFF)],
            // CJK Unified Ideographs
            "zh" | "zh-CN" | "zh-TW" => vec![CodeRange::new(0x4E00, 0x9FFF)],
            // Hangul syllables and jamo
            "ko" => vec![CodeRange::new(0xAC00, 0xD7AF), CodeRange::new(0x1100, 0x11FF)],
            // Hebrew
            "he" => vec![CodeRange::new(0x0590, 0x05FF)],
            // Greek and Coptic
            "el" => vec![CodeRange::new(0x0370, 0x03FF)],
            // Devanagari
            "hi" | "mr" | "ne" => vec![CodeRange::new(0x0900, 0x097F)],
            other => {
                tracing::warn!(
                    "No script table entry for source language '{other}', defaulting to Thai"
                );
                vec![THAI]
            }
        };
        Self::new(ranges)
    }

    /// Returns true iff `text` contains at least one character in the
    /// source script. Empty, whitespace-only and numeric-only strings are
    /// never eligible.
    pub fn should_translate(&self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        text.chars()
            .any(|c| self.ranges.iter().any(|r| r.contains(c)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thai_text_is_eligible() {
        let detector = ScriptDetector::thai();
        assert!(detector.should_translate("สวัสดี"));
        // Mixed content counts as long as one source-script character appears
        assert!(detector.should_translate("Invoice 42 ใบแจ้งหนี้"));
    }

    #[test]
    fn test_non_source_text_is_not_eligible() {
        let detector = ScriptDetector::thai();
        assert!(!detector.should_translate("hello"));
        assert!(!detector.should_translate("12345"));
        assert!(!detector.should_translate("3.14"));
        assert!(!detector.should_translate(""));
        assert!(!detector.should_translate("   \t\n"));
    }

    #[test]
    fn test_configured_range() {
        let cyrillic = ScriptDetector::for_lang(&Lang::new("ru"));
        assert!(cyrillic.should_translate("привет"));
        assert!(!cyrillic.should_translate("สวัสดี"));
    }

    #[test]
    fn test_unknown_language_falls_back_to_thai() {
        let detector = ScriptDetector::for_lang(&Lang::new("xx"));
        assert!(detector.should_translate("สวัสดี"));
    }
}
