//! Paragraph and inline-level types.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Zero-width space standing in for an empty paragraph in flat text.
pub const PLACEHOLDER: char = '\u{200B}';

/// Check if a line carries no content beyond placeholder characters.
pub fn is_placeholder_only(line: &str) -> bool {
    line.chars().all(|c| c == PLACEHOLDER)
}

/// A paragraph of inline content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Inline content in document order
    pub content: Vec<Inline>,
}

impl Paragraph {
    /// Create a new empty paragraph.
    pub fn new() -> Self {
        Self {
            content: Vec::new(),
        }
    }

    /// Create a paragraph with plain text.
    pub fn with_text(text: impl Into<String>) -> Self {
        let mut p = Self::new();
        p.add_text(text);
        p
    }

    /// Create a paragraph from inline content, merging adjacent plain runs.
    pub fn from_inlines(items: impl IntoIterator<Item = Inline>) -> Self {
        let mut p = Self::new();
        for item in items {
            p.push(item);
        }
        p
    }

    /// Append inline content.
    ///
    /// Plain text is merged into a preceding plain run and empty plain runs
    /// are dropped, so unmarked runs are always maximal. Marked runs are
    /// kept apart even when adjacent and identically marked.
    pub fn push(&mut self, item: Inline) {
        if let Inline::Text(run) = &item {
            if run.mark.is_none() {
                if run.text.is_empty() {
                    return;
                }
                if let Some(Inline::Text(last)) = self.content.last_mut() {
                    if last.mark.is_none() {
                        last.text.push_str(&run.text);
                        return;
                    }
                }
            }
        }
        self.content.push(item);
    }

    /// Add plain text to the paragraph.
    pub fn add_text(&mut self, text: impl Into<String>) {
        self.push(Inline::Text(TextRun::new(text)));
    }

    /// Add a marked text run.
    pub fn add_marked(&mut self, text: impl Into<String>, mark: Mark) {
        self.push(Inline::Text(TextRun::marked(text, mark)));
    }

    /// Add an inline math node.
    pub fn add_math(&mut self, latex: impl Into<String>) {
        self.push(Inline::Math(MathNode::new(latex)));
    }

    /// Get plain text content of the paragraph.
    pub fn plain_text(&self) -> String {
        inline_plain_text(&self.content)
    }

    /// Check if the paragraph has no content.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Iterate over the marks used in this paragraph.
    pub fn marks(&self) -> impl Iterator<Item = Mark> + '_ {
        self.content.iter().filter_map(|item| match item {
            Inline::Text(run) => run.mark,
            Inline::Math(_) => None,
        })
    }
}

/// Plain text of a sequence of inline content; math contributes its source.
pub fn inline_plain_text(content: &[Inline]) -> String {
    content
        .iter()
        .map(|item| match item {
            Inline::Text(run) => run.text.as_str(),
            Inline::Math(math) => math.latex.as_str(),
        })
        .collect()
}

/// Inline content within a paragraph or caption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inline {
    /// A text run carrying at most one mark
    Text(TextRun),

    /// An inline math node
    Math(MathNode),
}

impl Inline {
    /// Create a plain text inline.
    pub fn text(text: impl Into<String>) -> Self {
        Inline::Text(TextRun::new(text))
    }

    /// Create a marked text inline.
    pub fn marked(text: impl Into<String>, mark: Mark) -> Self {
        Inline::Text(TextRun::marked(text, mark))
    }

    /// Create a math inline.
    pub fn math(latex: impl Into<String>) -> Self {
        Inline::Math(MathNode::new(latex))
    }
}

/// A run of text sharing one mark state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRun {
    /// The text content
    pub text: String,

    /// The only active mark, if any
    pub mark: Option<Mark>,
}

impl TextRun {
    /// Create an unmarked text run.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            mark: None,
        }
    }

    /// Create a text run carrying a mark.
    pub fn marked(text: impl Into<String>, mark: Mark) -> Self {
        Self {
            text: text.into(),
            mark: Some(mark),
        }
    }

    /// Build a run from a host editor's mark set.
    ///
    /// Marks are mutually exclusive, so more than one distinct mark is
    /// rejected rather than silently resolved.
    pub fn try_with_marks(text: impl Into<String>, marks: &[Mark]) -> Result<Self> {
        let mut mark: Option<Mark> = None;
        for &candidate in marks {
            match mark {
                Some(existing) if existing != candidate => {
                    return Err(Error::MarkConflict(
                        existing.name().to_string(),
                        candidate.name().to_string(),
                    ));
                }
                _ => mark = Some(candidate),
            }
        }
        Ok(Self {
            text: text.into(),
            mark,
        })
    }

    /// Apply a mark, replacing whatever mark was active.
    pub fn apply_mark(&mut self, mark: Mark) {
        self.mark = Some(mark);
    }

    /// Remove the active mark.
    pub fn clear_mark(&mut self) {
        self.mark = None;
    }

    /// Check if this run is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// An inline math node holding its LaTeX source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MathNode {
    /// LaTeX source of the formula
    pub latex: String,
}

impl MathNode {
    /// Create a math node.
    pub fn new(latex: impl Into<String>) -> Self {
        Self {
            latex: latex.into(),
        }
    }
}

/// A style or semantic tag on a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mark {
    /// `\textbf`
    Bold,
    /// `\textit`
    Italic,
    /// `\texttt`
    Code,
    /// `\section`
    Section,
    /// `\subsection`
    Subsection,
    /// `\eqref`, a cross reference to a label, section or theorem
    Reference,
    /// `\cite`
    Citation,
    /// `\theorem`
    Theorem,
    /// `\qed`, closes the open proof
    Qed,
    /// `\label`
    Label,
    /// `\definition`
    Definition,
    /// `\proposition`
    Proposition,
    /// `\corollary`
    Corollary,
    /// `\lemma`
    Lemma,
    /// `\remark`
    Remark,
}

impl Mark {
    /// Every mark, in declaration order.
    pub const ALL: [Mark; 15] = [
        Mark::Bold,
        Mark::Italic,
        Mark::Code,
        Mark::Section,
        Mark::Subsection,
        Mark::Reference,
        Mark::Citation,
        Mark::Theorem,
        Mark::Qed,
        Mark::Label,
        Mark::Definition,
        Mark::Proposition,
        Mark::Corollary,
        Mark::Lemma,
        Mark::Remark,
    ];

    /// The escape keyword used in flat text.
    pub fn keyword(self) -> &'static str {
        match self {
            Mark::Bold => "textbf",
            Mark::Italic => "textit",
            Mark::Code => "texttt",
            Mark::Section => "section",
            Mark::Subsection => "subsection",
            Mark::Reference => "eqref",
            Mark::Citation => "cite",
            Mark::Theorem => "theorem",
            Mark::Qed => "qed",
            Mark::Label => "label",
            Mark::Definition => "definition",
            Mark::Proposition => "proposition",
            Mark::Corollary => "corollary",
            Mark::Lemma => "lemma",
            Mark::Remark => "remark",
        }
    }

    /// Look a mark up by its escape keyword.
    pub fn from_keyword(keyword: &str) -> Option<Mark> {
        Mark::ALL.into_iter().find(|m| m.keyword() == keyword)
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Mark::Bold => "bold",
            Mark::Italic => "italic",
            Mark::Code => "code",
            Mark::Section => "section",
            Mark::Subsection => "subsection",
            Mark::Reference => "reference",
            Mark::Citation => "citation",
            Mark::Theorem => "theorem",
            Mark::Qed => "qed",
            Mark::Label => "label",
            Mark::Definition => "definition",
            Mark::Proposition => "proposition",
            Mark::Corollary => "corollary",
            Mark::Lemma => "lemma",
            Mark::Remark => "remark",
        }
    }

    /// Marks that start a theorem-like environment.
    pub fn is_theorem_like(self) -> bool {
        matches!(
            self,
            Mark::Theorem
                | Mark::Lemma
                | Mark::Definition
                | Mark::Proposition
                | Mark::Corollary
                | Mark::Remark
        )
    }

    /// Theorem-like marks that are followed by a proof.
    pub fn opens_proof(self) -> bool {
        matches!(self, Mark::Theorem | Mark::Lemma)
    }
}

impl std::fmt::Display for Mark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\\{}", self.keyword())
    }
}
