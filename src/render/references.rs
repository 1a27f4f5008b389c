//! Cross-reference index built in a first pass over the flat text.
//!
//! `\eqref{..}` in flat text may point at an equation, a section or a
//! theorem. LaTeX wants `\eqref` only for equations, so every label is
//! collected up front and classified.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use super::cleanup::strip_zero_width;
use crate::escape::decode;
use crate::model::{GridKind, Mark};
use crate::parser::{tokenize, Token};

fn label_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\\label\{([^{}]*)\}").unwrap())
}

/// If a line is a displayed equation candidate, return its math and label.
///
/// The line must consist of one math token, optionally followed by one
/// label mark; blank text between them is ignored.
pub(crate) fn equation_parts<'a>(significant: &[Token<'a>]) -> Option<(&'a str, Option<&'a str>)> {
    match significant {
        [Token::Math(latex)] => Some((*latex, None)),
        [Token::Math(latex), Token::Marked(Mark::Label, label)] => {
            Some((*latex, Some((*label).trim())))
        }
        _ => None,
    }
}

/// Check if candidate equation parts carry a label.
pub(crate) fn is_labeled_equation(latex: &str, label: Option<&str>) -> bool {
    label.is_some() || label_regex().is_match(latex)
}

/// How a reference key should be typeset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    /// `\eqref`
    Equation,
    /// `\ref`
    Plain,
}

impl RefKind {
    /// LaTeX command name.
    pub fn command(self) -> &'static str {
        match self {
            RefKind::Equation => "eqref",
            RefKind::Plain => "ref",
        }
    }
}

/// Labels known to a document.
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    equations: HashSet<String>,
    targets: HashSet<String>,
}

impl ReferenceIndex {
    /// Collect every label in a flat-text document.
    pub fn collect<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        let mut index = Self::default();
        for line in lines {
            index.scan_line(&strip_zero_width(line));
        }
        log::debug!(
            "indexed {} equation labels and {} other targets",
            index.equations.len(),
            index.targets.len()
        );
        index
    }

    fn scan_line(&mut self, line: &str) {
        let trimmed = line.trim();
        for kind in GridKind::ALL {
            if let Some(Ok((spec, rest))) = kind.split_line(trimmed) {
                self.add_labels_in(spec, false);
                self.scan_tokens(&tokenize(rest), false);
                return;
            }
        }

        let tokens = tokenize(line);
        let significant: Vec<Token> = tokens.iter().copied().filter(|t| !t.is_blank()).collect();
        let equation_line = equation_parts(&significant).is_some();
        self.scan_tokens(&tokens, equation_line);
    }

    fn scan_tokens(&mut self, tokens: &[Token], equation_line: bool) {
        for token in tokens {
            match *token {
                Token::Math(latex) => self.add_labels_in(latex, true),
                Token::Marked(Mark::Label, label) => self.insert(label, equation_line),
                Token::Marked(mark, name)
                    if matches!(mark, Mark::Section | Mark::Subsection) || mark.is_theorem_like() =>
                {
                    self.insert(name, false)
                }
                Token::Image(body) => {
                    let encoded = body.split_once(' ').map_or("", |(_, caption)| caption);
                    if let Ok(caption) = decode(encoded) {
                        self.add_labels_in(&caption, false);
                    }
                }
                _ => {}
            }
        }
    }

    fn add_labels_in(&mut self, text: &str, equation: bool) {
        for caps in label_regex().captures_iter(text) {
            self.insert(&caps[1], equation);
        }
    }

    fn insert(&mut self, label: &str, equation: bool) {
        let label = label.trim();
        if label.is_empty() {
            return;
        }
        if equation {
            self.equations.insert(label.to_string());
        } else {
            self.targets.insert(label.to_string());
        }
    }

    /// Classify a reference key, or `None` if no label matches.
    pub fn resolve(&self, key: &str) -> Option<RefKind> {
        if self.equations.contains(key) {
            Some(RefKind::Equation)
        } else if self.targets.contains(key) {
            Some(RefKind::Plain)
        } else {
            None
        }
    }

    /// Total number of known labels.
    pub fn len(&self) -> usize {
        self.equations.len() + self.targets.len()
    }

    /// Check if no labels are known.
    pub fn is_empty(&self) -> bool {
        self.equations.is_empty() && self.targets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_and_classifies() {
        let text = [
            r"\section{Intro}",
            r"$E = mc^2 \label{energy}$",
            r"$a^2 + b^2 = c^2$ \label{pyth}",
            r"\theorem{Fermat} No solutions.",
            r"Inline \label{para} text",
            r"$\begin{figure}1 Cat \label{cat}\end{figure}$ Pets \label{pets}",
            r"\includegraphics{4 Plot%20%5Clabel%7Bplot%7D}",
        ];
        let index = ReferenceIndex::collect(text);

        assert_eq!(index.resolve("energy"), Some(RefKind::Equation));
        assert_eq!(index.resolve("pyth"), Some(RefKind::Equation));
        assert_eq!(index.resolve("Intro"), Some(RefKind::Plain));
        assert_eq!(index.resolve("Fermat"), Some(RefKind::Plain));
        assert_eq!(index.resolve("para"), Some(RefKind::Plain));
        assert_eq!(index.resolve("cat"), Some(RefKind::Plain));
        assert_eq!(index.resolve("pets"), Some(RefKind::Plain));
        assert_eq!(index.resolve("plot"), Some(RefKind::Plain));
        assert_eq!(index.resolve("missing"), None);
        assert_eq!(index.len(), 8);
    }

    #[test]
    fn test_equation_parts() {
        let tokens = tokenize(r"$x$ \label{a}");
        let significant: Vec<Token> = tokens.into_iter().filter(|t| !t.is_blank()).collect();
        assert_eq!(equation_parts(&significant), Some(("x", Some("a"))));

        let tokens = tokenize(r"see $x$");
        assert_eq!(equation_parts(&tokens), None);
    }

    #[test]
    fn test_placeholder_lines_are_ignored() {
        let index = ReferenceIndex::collect(["\u{200B}", ""]);
        assert!(index.is_empty());
    }
}
