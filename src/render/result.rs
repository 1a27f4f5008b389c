//! Rendering result with statistics and diagnostics.

use serde::{Deserialize, Serialize};

use crate::error::Diagnostic;

/// Result of emitting LaTeX, including content and statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderResult {
    /// The LaTeX document (or body, without preamble)
    pub content: String,

    /// Collected BibTeX entries, if any code block carried them
    pub bibliography: Option<String>,

    /// Emission statistics
    pub stats: EmitStats,

    /// Directives that were skipped or could not be resolved
    pub diagnostics: Vec<Diagnostic>,
}

impl RenderResult {
    /// Create a simple result with just content.
    pub fn content_only(content: String) -> Self {
        Self {
            content,
            ..Default::default()
        }
    }

    /// Get the content length in bytes.
    pub fn content_len(&self) -> usize {
        self.content.len()
    }

    /// Check if emission found nothing to report.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Statistics collected while emitting LaTeX.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmitStats {
    /// Lines of flat text read
    pub line_count: u32,

    /// Number of paragraphs emitted
    pub paragraph_count: u32,

    /// Number of sections and subsections
    pub section_count: u32,

    /// Number of theorem-like environments
    pub theorem_count: u32,

    /// Number of proofs closed
    pub proof_count: u32,

    /// Number of displayed equations and math environments
    pub equation_count: u32,

    /// Number of code listings
    pub code_count: u32,

    /// Number of tables
    pub table_count: u32,

    /// Number of figure grids
    pub figure_count: u32,

    /// Number of standalone images
    pub image_count: u32,

    /// Number of citation commands
    pub citation_count: u32,

    /// Number of cross references
    pub reference_count: u32,

    /// Cross references that named no known label
    pub unresolved_reference_count: u32,

    /// Number of BibTeX entries collected
    pub bib_entry_count: u32,

    /// Approximate word count of plain text
    pub word_count: u32,

    /// Character count of plain text (excluding whitespace)
    pub char_count: u32,
}

impl EmitStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add word and character counts from text.
    pub fn count_text(&mut self, text: &str) {
        self.word_count += text.split_whitespace().count() as u32;
        self.char_count += text.chars().filter(|c| !c.is_whitespace()).count() as u32;
    }

    /// Total number of floats (tables, figure grids and images).
    pub fn float_count(&self) -> u32 {
        self.table_count + self.figure_count + self.image_count
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &EmitStats) {
        self.line_count += other.line_count;
        self.paragraph_count += other.paragraph_count;
        self.section_count += other.section_count;
        self.theorem_count += other.theorem_count;
        self.proof_count += other.proof_count;
        self.equation_count += other.equation_count;
        self.code_count += other.code_count;
        self.table_count += other.table_count;
        self.figure_count += other.figure_count;
        self.image_count += other.image_count;
        self.citation_count += other.citation_count;
        self.reference_count += other.reference_count;
        self.unresolved_reference_count += other.unresolved_reference_count;
        self.bib_entry_count += other.bib_entry_count;
        self.word_count += other.word_count;
        self.char_count += other.char_count;
    }
}
