//! Block-level types.

use serde::{Deserialize, Serialize};

use super::{inline_plain_text, Inline, Paragraph};

/// A top-level unit of the document. Each block is one line of flat text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// A paragraph of inline content
    Paragraph(Paragraph),

    /// A code listing
    Code(CodeBlock),

    /// A standalone image
    Image(ImageBlock),

    /// A table grid, kept as raw cell specification
    Table(GridBlock),

    /// A figure grid of sub-images, kept as raw cell specification
    Figure(GridBlock),
}

impl Block {
    /// Check if this block is atomic (anything but a paragraph).
    pub fn is_atomic(&self) -> bool {
        !matches!(self, Block::Paragraph(_))
    }

    /// Get plain text content of the block.
    pub fn plain_text(&self) -> String {
        match self {
            Block::Paragraph(p) => p.plain_text(),
            Block::Code(code) => code.code.clone(),
            Block::Image(image) => inline_plain_text(&image.caption),
            Block::Table(grid) | Block::Figure(grid) => inline_plain_text(&grid.caption),
        }
    }
}

impl From<Paragraph> for Block {
    fn from(p: Paragraph) -> Self {
        Block::Paragraph(p)
    }
}

/// A code block with its language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlock {
    /// Language of the listing
    pub lang: CodeLang,

    /// Source code, newlines included
    pub code: String,
}

impl CodeBlock {
    /// Create a code block.
    pub fn new(lang: CodeLang, code: impl Into<String>) -> Self {
        Self {
            lang,
            code: code.into(),
        }
    }
}

/// Languages a code block can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeLang {
    /// Python
    Python,
    /// JavaScript
    JavaScript,
    /// Java
    Java,
    /// BibTeX; these blocks feed the bibliography
    BibTeX,
}

impl CodeLang {
    /// Every language, ordered so no keyword is a prefix of a later one.
    pub const ALL: [CodeLang; 4] = [
        CodeLang::JavaScript,
        CodeLang::Python,
        CodeLang::BibTeX,
        CodeLang::Java,
    ];

    /// The escape keyword used in flat text.
    pub fn keyword(self) -> &'static str {
        match self {
            CodeLang::Python => "python",
            CodeLang::JavaScript => "javascript",
            CodeLang::Java => "java",
            CodeLang::BibTeX => "bibtex",
        }
    }

    /// Look a language up by its escape keyword.
    pub fn from_keyword(keyword: &str) -> Option<CodeLang> {
        CodeLang::ALL.into_iter().find(|l| l.keyword() == keyword)
    }

    /// Language name understood by the `listings` package.
    pub fn listings_name(self) -> &'static str {
        match self {
            CodeLang::Python => "Python",
            CodeLang::JavaScript => "JavaScript",
            CodeLang::Java => "Java",
            CodeLang::BibTeX => "TeX",
        }
    }
}

/// An image block referencing the side-table by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageBlock {
    /// Key into the image side-table
    pub id: String,

    /// Caption; may contain a label mark
    pub caption: Vec<Inline>,
}

impl ImageBlock {
    /// Create an image block without caption.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            caption: Vec::new(),
        }
    }

    /// Set the caption and return self.
    pub fn with_caption(mut self, caption: Vec<Inline>) -> Self {
        self.caption = caption;
        self
    }
}

/// A table or figure grid.
///
/// The cell specification is kept verbatim: rows separated by `\\`, cells
/// by `&`. It is only resolved into a layout by the LaTeX emitter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridBlock {
    /// Raw cell specification
    pub spec: String,

    /// Caption trailing the grid on its line
    pub caption: Vec<Inline>,
}

impl GridBlock {
    /// Create a grid from its raw specification.
    pub fn new(spec: impl Into<String>) -> Self {
        Self {
            spec: spec.into(),
            caption: Vec::new(),
        }
    }

    /// Set the caption and return self.
    pub fn with_caption(mut self, caption: Vec<Inline>) -> Self {
        self.caption = caption;
        self
    }
}

/// Which grid environment a block delimits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridKind {
    /// `\begin{table}` ... `\end{table}`
    Table,
    /// `\begin{figure}` ... `\end{figure}`
    Figure,
}

impl GridKind {
    /// Both grid kinds.
    pub const ALL: [GridKind; 2] = [GridKind::Table, GridKind::Figure];

    /// Environment name.
    pub fn name(self) -> &'static str {
        match self {
            GridKind::Table => "table",
            GridKind::Figure => "figure",
        }
    }

    /// Flat-text opening delimiter.
    pub fn open(self) -> &'static str {
        match self {
            GridKind::Table => "$\\begin{table}",
            GridKind::Figure => "$\\begin{figure}",
        }
    }

    /// Flat-text closing delimiter.
    pub fn close(self) -> &'static str {
        match self {
            GridKind::Table => "\\end{table}$",
            GridKind::Figure => "\\end{figure}$",
        }
    }

    /// Split a line opening this grid into its spec and trailing text.
    ///
    /// Returns `None` when the line does not start with the opening
    /// delimiter, and `Some(Err(()))` when it does but never closes.
    pub fn split_line(self, line: &str) -> Option<std::result::Result<(&str, &str), ()>> {
        let rest = line.strip_prefix(self.open())?;
        Some(match rest.find(self.close()) {
            Some(end) => Ok((&rest[..end], &rest[end + self.close().len()..])),
            None => Err(()),
        })
    }

    /// Build the block variant for this grid kind.
    pub fn into_block(self, grid: GridBlock) -> Block {
        match self {
            GridKind::Table => Block::Table(grid),
            GridKind::Figure => Block::Figure(grid),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_keywords() {
        for lang in CodeLang::ALL {
            assert_eq!(CodeLang::from_keyword(lang.keyword()), Some(lang));
        }
        assert_eq!(CodeLang::from_keyword("rust"), None);
    }

    #[test]
    fn test_split_grid_line() {
        let line = "$\\begin{table}A & B\\end{table}$ Results";
        let (spec, rest) = GridKind::Table.split_line(line).unwrap().unwrap();
        assert_eq!(spec, "A & B");
        assert_eq!(rest, " Results");

        assert!(GridKind::Figure.split_line(line).is_none());
        assert_eq!(
            GridKind::Table.split_line("$\\begin{table}A & B"),
            Some(Err(()))
        );
    }

    #[test]
    fn test_block_is_atomic() {
        assert!(!Block::Paragraph(Paragraph::new()).is_atomic());
        assert!(Block::Code(CodeBlock::new(CodeLang::Java, "")).is_atomic());
    }
}
