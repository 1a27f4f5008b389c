//! Cleanup of emitted LaTeX.
//!
//! Flat text is edited in browsers and pasted from other documents, so it
//! drags along characters that either break a LaTeX run or typeset badly:
//! zero-width placeholders, presentation-form ligatures, private-use glyphs
//! and Unicode punctuation that has a native TeX spelling.

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::model::PLACEHOLDER;

/// Zero-width characters editors leave behind to keep lines from collapsing.
const ZERO_WIDTH: [char; 5] = [PLACEHOLDER, '\u{200C}', '\u{200D}', '\u{2060}', '\u{FEFF}'];

/// Presentation forms that pdflatex cannot typeset.
const LIGATURES: [(char, &str); 7] = [
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
    ('\u{FB05}', "st"),
    ('\u{FB06}', "st"),
];

/// Unicode punctuation and its TeX input form.
const TEX_PUNCTUATION: [(char, &str); 7] = [
    ('\u{2018}', "`"),
    ('\u{2019}', "'"),
    ('\u{201C}', "``"),
    ('\u{201D}', "''"),
    ('\u{2013}', "--"),
    ('\u{2014}', "---"),
    ('\u{2026}', "\\ldots{}"),
];

/// Remove every zero-width placeholder character.
pub fn strip_zero_width(text: &str) -> String {
    text.chars().filter(|c| !ZERO_WIDTH.contains(c)).collect()
}

/// Cleanup preset levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CleanupPreset {
    /// NFC normalization only
    Minimal,
    /// NFC, ligatures, replacement characters, whitespace and blank lines
    #[default]
    Standard,
    /// Standard plus private-use removal and TeX punctuation
    Aggressive,
}

/// Options for LaTeX cleanup.
#[derive(Debug, Clone)]
pub struct CleanupOptions {
    /// Normalize Unicode to NFC form
    pub normalize_unicode: bool,

    /// Expand presentation-form ligatures
    pub fix_ligatures: bool,

    /// Remove Private Use Area (PUA) characters
    pub remove_pua: bool,

    /// Remove the Unicode replacement character (U+FFFD)
    pub remove_replacement_char: bool,

    /// Spell curly quotes, dashes and ellipses the TeX way
    pub tex_punctuation: bool,

    /// Strip trailing whitespace from every line
    pub trim_trailing_whitespace: bool,

    /// Maximum consecutive newlines (0 = unlimited)
    pub max_consecutive_newlines: u8,
}

impl CleanupOptions {
    /// Create options from a preset.
    pub fn from_preset(preset: CleanupPreset) -> Self {
        let standard = Self {
            normalize_unicode: true,
            fix_ligatures: true,
            remove_pua: false,
            remove_replacement_char: true,
            tex_punctuation: false,
            trim_trailing_whitespace: true,
            max_consecutive_newlines: 2,
        };
        match preset {
            CleanupPreset::Minimal => Self {
                normalize_unicode: true,
                ..Self::none()
            },
            CleanupPreset::Standard => standard,
            CleanupPreset::Aggressive => Self {
                remove_pua: true,
                tex_punctuation: true,
                ..standard
            },
        }
    }

    /// Options that leave text untouched.
    pub fn none() -> Self {
        Self {
            normalize_unicode: false,
            fix_ligatures: false,
            remove_pua: false,
            remove_replacement_char: false,
            tex_punctuation: false,
            trim_trailing_whitespace: false,
            max_consecutive_newlines: 0,
        }
    }

    fn rewrites_chars(&self) -> bool {
        self.fix_ligatures || self.remove_pua || self.remove_replacement_char || self.tex_punctuation
    }
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self::from_preset(CleanupPreset::Standard)
    }
}

/// Cleanup pipeline applied to a finished LaTeX string.
pub struct CleanupPipeline {
    options: CleanupOptions,
    trailing_ws_regex: Regex,
    blank_run_regex: Option<Regex>,
}

impl CleanupPipeline {
    /// Create a new cleanup pipeline with the given options.
    pub fn new(options: CleanupOptions) -> Self {
        let blank_run_regex = match options.max_consecutive_newlines {
            0 => None,
            max => Some(Regex::new(&format!(r"\n{{{},}}", max as usize + 1)).unwrap()),
        };
        Self {
            options,
            trailing_ws_regex: Regex::new(r"(?m)[ \t]+$").unwrap(),
            blank_run_regex,
        }
    }

    /// Create a pipeline from a preset.
    pub fn from_preset(preset: CleanupPreset) -> Self {
        Self::new(CleanupOptions::from_preset(preset))
    }

    /// Run text through every enabled step.
    pub fn process(&self, text: &str) -> String {
        let mut result = strip_zero_width(text);

        if self.options.normalize_unicode {
            result = result.nfc().collect();
        }

        if self.options.rewrites_chars() {
            result = self.rewrite_chars(&result);
        }

        if self.options.trim_trailing_whitespace {
            result = self.trailing_ws_regex.replace_all(&result, "").into_owned();
        }

        if let Some(ref re) = self.blank_run_regex {
            let replacement = "\n".repeat(self.options.max_consecutive_newlines as usize);
            result = re.replace_all(&result, replacement.as_str()).into_owned();
        }

        result
    }

    fn rewrite_chars(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            if self.options.remove_replacement_char && c == '\u{FFFD}' {
                continue;
            }
            if self.options.remove_pua && is_private_use(c) {
                continue;
            }
            if self.options.fix_ligatures {
                if let Some((_, expanded)) = LIGATURES.iter().find(|(lig, _)| *lig == c) {
                    out.push_str(expanded);
                    continue;
                }
            }
            if self.options.tex_punctuation {
                if let Some((_, tex)) = TEX_PUNCTUATION.iter().find(|(p, _)| *p == c) {
                    out.push_str(tex);
                    continue;
                }
            }
            out.push(c);
        }
        out
    }
}

impl Default for CleanupPipeline {
    fn default() -> Self {
        Self::new(CleanupOptions::default())
    }
}

fn is_private_use(c: char) -> bool {
    matches!(c as u32, 0xE000..=0xF8FF | 0xF0000..=0xFFFFD | 0x100000..=0x10FFFD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_zero_width() {
        assert_eq!(strip_zero_width("a\u{200B}b\u{FEFF}"), "ab");
    }

    #[test]
    fn test_unicode_normalization() {
        let pipeline = CleanupPipeline::from_preset(CleanupPreset::Minimal);
        assert_eq!(pipeline.process("cafe\u{0301}"), "caf\u{00E9}");
    }

    #[test]
    fn test_ligature_fix() {
        let pipeline = CleanupPipeline::from_preset(CleanupPreset::Standard);
        assert_eq!(pipeline.process("\u{FB01}nding \u{FB02}owers"), "finding flowers");
    }

    #[test]
    fn test_trailing_whitespace_and_newlines() {
        let pipeline = CleanupPipeline::from_preset(CleanupPreset::Standard);
        assert_eq!(pipeline.process("a  \n\n\n\nb\t\n"), "a\n\nb\n");
    }

    #[test]
    fn test_aggressive_only_steps() {
        let text = "x\u{E000}y \u{201C}quoted\u{201D} 1\u{2013}2\u{2026}";
        assert_eq!(CleanupPipeline::from_preset(CleanupPreset::Standard).process(text), text);
        assert_eq!(
            CleanupPipeline::from_preset(CleanupPreset::Aggressive).process(text),
            "xy ``quoted'' 1--2\\ldots{}"
        );
    }

    #[test]
    fn test_none_is_identity() {
        let text = "\u{FB01} \u{FFFD}  \n\n\n\n";
        assert_eq!(CleanupPipeline::new(CleanupOptions::none()).process(text), text);
    }
}
