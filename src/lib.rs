//! # plaintext
//!
//! Lossless flat-text transcoder and LaTeX emitter for structured math
//! documents.
//!
//! A document (paragraphs with marks and inline math, code blocks, images,
//! table and figure grids) is serialized to a single-line-per-block flat
//! text, parsed back without loss, and typeset as a standalone LaTeX
//! document.
//!
//! ## Quick Start
//!
//! ```no_run
//! use plaintext::{load_file, render};
//!
//! fn main() -> plaintext::Result<()> {
//!     // Load a flat-text file with its image table
//!     let doc = load_file("notes.txt")?;
//!
//!     // Typeset as LaTeX
//!     let options = render::RenderOptions::default();
//!     let latex = render::document_to_latex(&doc, &options)?;
//!     println!("{}", latex.content);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Lossless round trip**: flat text parses back to the same document
//! - **Grids**: tables with merged cells and partial borders, figure grids
//! - **Theorem environments**: theorems, lemmas, proofs and references
//! - **Code listings**: JavaScript, Python, Java and BibTeX
//! - **Cleanup pipeline**: Unicode normalization for the emitted LaTeX

pub mod error;
pub mod escape;
pub mod file;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use error::{Diagnostic, DiagnosticKind, Error, Result};
pub use file::{load_file, load_str, save_file, save_string, FlatFile};
pub use model::{
    Block, CodeBlock, CodeLang, Document, GridBlock, GridKind, ImageBlock, ImagePayload,
    ImageTable, Inline, Mark, MathNode, Paragraph, TextRun,
};
pub use parser::{parse_flat_text, parse_inline, ErrorMode, FlatTextParser, ParseOptions};
pub use render::{
    to_flat_text, CleanupOptions, CleanupPreset, JsonFormat, RenderOptions, RenderResult,
};

/// Serialize a document to flat text.
///
/// # Example
///
/// ```
/// use plaintext::{serialize, Document, Inline, Paragraph};
///
/// let mut para = Paragraph::new();
/// para.push(Inline::text("Let "));
/// para.push(Inline::math("x > 0"));
/// let doc = Document::from_blocks(vec![plaintext::Block::Paragraph(para)]);
/// assert_eq!(serialize(&doc), "Let $x > 0$");
/// ```
pub fn serialize(doc: &Document) -> String {
    render::to_flat_text(doc)
}

/// Parse flat text with an image table.
///
/// # Example
///
/// ```
/// use plaintext::{parse, ImageTable};
///
/// let doc = parse("\\textbf{Bold} words", &ImageTable::new()).unwrap();
/// assert_eq!(doc.block_count(), 1);
/// ```
pub fn parse(text: &str, images: &ImageTable) -> Result<Document> {
    parser::parse_flat_text(text, images)
}

/// Convert flat text to a standalone LaTeX document.
///
/// # Example
///
/// ```
/// use plaintext::to_latex;
///
/// let latex = to_latex("\\section{Intro}").unwrap();
/// assert!(latex.contains("\\section{Intro}\\label{Intro}"));
/// ```
pub fn to_latex(flat: &str) -> Result<String> {
    render::to_latex(flat, &RenderOptions::default())
}

/// Convert flat text to LaTeX with custom options.
///
/// # Example
///
/// ```
/// use plaintext::{to_latex_with_options, RenderOptions};
///
/// let options = RenderOptions::new().body_only();
/// let body = to_latex_with_options("Hello", &options).unwrap();
/// assert_eq!(body, "Hello\n");
/// ```
pub fn to_latex_with_options(flat: &str, options: &RenderOptions) -> Result<String> {
    render::to_latex(flat, options)
}

/// Convert a flat-text file on disk to LaTeX.
///
/// # Example
///
/// ```no_run
/// use plaintext::{convert_file, RenderOptions};
///
/// let result = convert_file("notes.txt", &RenderOptions::default()).unwrap();
/// std::fs::write("notes.tex", result.content).unwrap();
/// ```
pub fn convert_file<P: AsRef<std::path::Path>>(
    path: P,
    options: &RenderOptions,
) -> Result<RenderResult> {
    let contents = std::fs::read_to_string(path)?;
    let file = FlatFile::parse(&contents);
    render::to_latex_with_images(&file.text, &file.images, options)
}

/// Convert a document to JSON.
///
/// # Example
///
/// ```
/// use plaintext::{to_json, Document, JsonFormat};
///
/// let json = to_json(&Document::new(), JsonFormat::Compact).unwrap();
/// assert!(json.starts_with('{'));
/// ```
pub fn to_json(doc: &Document, format: JsonFormat) -> Result<String> {
    render::to_json(doc, format)
}

/// Builder for parsing flat text and emitting LaTeX.
///
/// # Example
///
/// ```no_run
/// use plaintext::Transcoder;
///
/// let latex = Transcoder::new()
///     .strict()
///     .with_image_prefix("figures/")
///     .body_only()
///     .load("notes.txt")?
///     .to_latex()?;
/// # Ok::<(), plaintext::Error>(())
/// ```
pub struct Transcoder {
    parse_options: ParseOptions,
    render_options: RenderOptions,
}

impl Transcoder {
    /// Create a new Transcoder builder.
    pub fn new() -> Self {
        Self {
            parse_options: ParseOptions::default(),
            render_options: RenderOptions::default(),
        }
    }

    /// Fail on the first malformed directive, when parsing and emitting.
    pub fn strict(mut self) -> Self {
        self.parse_options = self.parse_options.strict();
        self.render_options = self.render_options.with_error_mode(ErrorMode::Strict);
        self
    }

    /// Skip malformed directives with a diagnostic (default).
    pub fn lenient(mut self) -> Self {
        self.parse_options = self.parse_options.lenient();
        self.render_options = self.render_options.with_error_mode(ErrorMode::Lenient);
        self
    }

    /// Keep images whose payload is missing from the image table.
    pub fn keep_stale_images(mut self) -> Self {
        self.parse_options = self.parse_options.keep_stale_images();
        self
    }

    /// Emit only the document body, without preamble or postamble.
    pub fn body_only(mut self) -> Self {
        self.render_options = self.render_options.body_only();
        self
    }

    /// Set the path prefix for image files.
    pub fn with_image_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.render_options = self.render_options.with_image_prefix(prefix);
        self
    }

    /// Set cleanup preset.
    pub fn with_cleanup(mut self, preset: CleanupPreset) -> Self {
        self.render_options = self.render_options.with_cleanup_preset(preset);
        self
    }

    /// Collect emission statistics.
    pub fn with_stats(mut self) -> Self {
        self.render_options = self.render_options.with_stats(true);
        self
    }

    /// Parse flat-file contents (text with an optional image table).
    pub fn load_str(self, contents: &str) -> Result<TranscodeResult> {
        let file = FlatFile::parse(contents);
        let output = file.parse_with(self.parse_options)?;
        Ok(TranscodeResult {
            document: output.document,
            diagnostics: output.diagnostics,
            render_options: self.render_options,
        })
    }

    /// Parse a flat-text file on disk.
    pub fn load<P: AsRef<std::path::Path>>(self, path: P) -> Result<TranscodeResult> {
        let contents = std::fs::read_to_string(path)?;
        self.load_str(&contents)
    }
}

impl Default for Transcoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of parsing flat text.
pub struct TranscodeResult {
    /// The parsed document
    pub document: Document,
    /// Problems skipped while parsing
    pub diagnostics: Vec<Diagnostic>,
    /// Render options to use
    render_options: RenderOptions,
}

impl TranscodeResult {
    /// Convert to LaTeX.
    pub fn to_latex(&self) -> Result<String> {
        Ok(self.render()?.content)
    }

    /// Convert to LaTeX, keeping bibliography, statistics and diagnostics.
    pub fn render(&self) -> Result<RenderResult> {
        render::document_to_latex(&self.document, &self.render_options)
    }

    /// Convert back to flat text.
    pub fn to_flat_text(&self) -> String {
        render::to_flat_text(&self.document)
    }

    /// Convert to flat-file contents, including the image table.
    pub fn to_flat_file(&self) -> String {
        save_string(&self.document)
    }

    /// Convert to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.document, format)
    }

    /// Get the document.
    pub fn document(&self) -> &Document {
        &self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcoder_builder() {
        let transcoder = Transcoder::new()
            .strict()
            .body_only()
            .with_cleanup(CleanupPreset::Standard);

        assert!(matches!(
            transcoder.parse_options.error_mode,
            ErrorMode::Strict
        ));
        assert_eq!(transcoder.render_options.error_mode, ErrorMode::Strict);
        assert!(!transcoder.render_options.include_preamble);
        assert!(transcoder.render_options.cleanup.is_some());
    }

    #[test]
    fn test_transcoder_builder_default() {
        let builder = Transcoder::default();
        assert!(builder.render_options.include_preamble);
        assert_eq!(builder.parse_options.error_mode, ErrorMode::Lenient);
        assert!(builder.parse_options.drop_stale_images);
    }

    #[test]
    fn test_transcoder_keep_stale_images() {
        let builder = Transcoder::new().keep_stale_images();
        assert!(!builder.parse_options.drop_stale_images);
    }

    #[test]
    fn test_transcoder_with_image_prefix() {
        let builder = Transcoder::new().with_image_prefix("figs/");
        assert_eq!(builder.render_options.image_path_prefix, "figs/");
    }

    #[test]
    fn test_load_str_and_render() {
        let result = Transcoder::new()
            .body_only()
            .load_str("\\textbf{Bold} and $x$")
            .unwrap();
        assert!(result.diagnostics.is_empty());
        assert_eq!(result.to_flat_text(), "\\textbf{Bold} and $x$");
        assert_eq!(result.to_latex().unwrap(), "\\textbf{Bold} and $x$\n");
    }

    #[test]
    fn test_load_str_reports_stale_image() {
        let result = Transcoder::new().load_str("\\includegraphics{9 }").unwrap();
        assert!(result.document.is_empty());
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].kind, DiagnosticKind::StaleImage);
    }

    #[test]
    fn test_strict_load_rejects_bad_escape() {
        let result = Transcoder::new().strict().load_str("\\python{%ZZ}");
        assert!(matches!(result, Err(Error::Decode(_))));
    }

    #[test]
    fn test_serialize_and_parse() {
        let doc = parse("Line one\n\u{200B}\nLine two", &ImageTable::new()).unwrap();
        assert_eq!(doc.block_count(), 3);
        assert_eq!(serialize(&doc), "Line one\n\u{200B}\nLine two");
    }

    #[test]
    fn test_non_ascii_mark_body() {
        let doc = parse("\\textbf{café}", &ImageTable::new()).unwrap();
        let Block::Paragraph(p) = &doc.blocks[0] else {
            panic!("expected a paragraph");
        };
        assert_eq!(p.content, vec![Inline::marked("café", Mark::Bold)]);

        let latex = to_latex_with_options("\\section{Größe}", &RenderOptions::new().body_only())
            .unwrap();
        assert!(latex.starts_with("\\section{Größe}\\label{Größe}"));
    }
}
