//! Flat-text parser.

use crate::error::{Diagnostic, DiagnosticKind, Error, Result};
use crate::escape::decode;
use crate::model::{
    is_placeholder_only, Block, CodeBlock, Document, GridBlock, GridKind, ImageBlock, ImageTable,
    Inline, Paragraph,
};
use crate::render::figure_image_ids;

use super::options::{ErrorMode, ParseOptions};
use super::tokens::{Token, Tokenizer};

/// A parsed document together with the problems skipped along the way.
#[derive(Debug, Clone, Default)]
pub struct ParseOutput {
    /// The reconstructed document
    pub document: Document,

    /// Recoverable problems, in line order
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseOutput {
    /// Check if parsing found nothing to report.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Parser from flat text back to a structured document.
#[derive(Debug, Clone, Default)]
pub struct FlatTextParser {
    options: ParseOptions,
}

impl FlatTextParser {
    /// Create a parser with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with custom options.
    pub fn with_options(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Parse flat text, resolving image ids against `images`.
    ///
    /// Each line yields one block, or several when code and image
    /// directives split a paragraph. An empty input yields an empty
    /// document.
    pub fn parse(&self, text: &str, images: &ImageTable) -> Result<ParseOutput> {
        let mut output = ParseOutput::default();
        if text.is_empty() {
            return Ok(output);
        }

        for (idx, line) in text.split('\n').enumerate() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            self.parse_line(idx + 1, line, images, &mut output)?;
        }

        log::debug!(
            "parsed {} blocks with {} diagnostics",
            output.document.block_count(),
            output.diagnostics.len()
        );
        Ok(output)
    }

    fn parse_line(
        &self,
        line_no: usize,
        line: &str,
        images: &ImageTable,
        output: &mut ParseOutput,
    ) -> Result<()> {
        if is_placeholder_only(line) {
            output.document.add_paragraph(Paragraph::new());
            return Ok(());
        }

        for kind in GridKind::ALL {
            if let Some(Ok((spec, rest))) = kind.split_line(line) {
                let grid = GridBlock::new(spec).with_caption(parse_inline(rest.trim_start()));
                if kind == GridKind::Figure && self.options.hydrate_figures {
                    self.hydrate_figure(line_no, spec, images, output);
                }
                output.document.add_block(kind.into_block(grid));
                return Ok(());
            }
        }

        let mut paragraph = Paragraph::new();
        let mut atomic = false;
        for spanned in Tokenizer::new(line) {
            match spanned.token {
                Token::Text(text) => paragraph.push(Inline::text(text)),
                Token::Math(latex) => paragraph.push(Inline::math(latex)),
                Token::Marked(mark, text) => paragraph.push(Inline::marked(text, mark)),
                Token::Code(lang, payload) => {
                    atomic = true;
                    flush(&mut paragraph, &mut output.document);
                    match decode(payload) {
                        Ok(code) => output.document.add_block(Block::Code(CodeBlock::new(lang, code))),
                        Err(e) => self.recover(line_no, e, &mut output.diagnostics)?,
                    }
                }
                Token::Image(body) => {
                    atomic = true;
                    flush(&mut paragraph, &mut output.document);
                    self.parse_image(line_no, body, images, output)?;
                }
            }
        }

        if !paragraph.is_empty() || !atomic {
            output.document.add_paragraph(paragraph);
        }
        Ok(())
    }

    fn parse_image(
        &self,
        line_no: usize,
        body: &str,
        images: &ImageTable,
        output: &mut ParseOutput,
    ) -> Result<()> {
        let (id, encoded) = body.split_once(' ').unwrap_or((body, ""));
        let id = id.trim();

        let caption = match decode(encoded) {
            Ok(caption) => parse_inline(&caption),
            Err(e) => return self.recover(line_no, e, &mut output.diagnostics),
        };
        let block = ImageBlock::new(id).with_caption(caption);

        match images.get(id) {
            Some(payload) => output.document.add_image(block, payload.clone()),
            None if self.options.drop_stale_images => {
                log::warn!("line {}: dropping image {} missing from the image table", line_no, id);
                output.diagnostics.push(Diagnostic::new(
                    line_no,
                    DiagnosticKind::StaleImage,
                    format!("image {} is not in the image table", id),
                ));
            }
            None => {
                log::warn!("line {}: image {} has no payload", line_no, id);
                output.diagnostics.push(Diagnostic::new(
                    line_no,
                    DiagnosticKind::StaleImage,
                    format!("image {} kept without payload", id),
                ));
                output.document.add_block(Block::Image(block));
            }
        }
        Ok(())
    }

    fn hydrate_figure(&self, line_no: usize, spec: &str, images: &ImageTable, output: &mut ParseOutput) {
        for id in figure_image_ids(spec) {
            match images.get(&id) {
                Some(payload) => output.document.add_resource(id, payload.clone()),
                None => {
                    log::warn!("line {}: figure image {} missing from the image table", line_no, id);
                    output.diagnostics.push(Diagnostic::new(
                        line_no,
                        DiagnosticKind::StaleImage,
                        format!("figure image {} is not in the image table", id),
                    ));
                }
            }
        }
    }

    fn recover(&self, line_no: usize, err: Error, diagnostics: &mut Vec<Diagnostic>) -> Result<()> {
        if self.options.error_mode == ErrorMode::Strict {
            return Err(err);
        }
        log::warn!("line {}: skipping directive: {}", line_no, err);
        diagnostics.push(Diagnostic::new(line_no, DiagnosticKind::Decode, err.to_string()));
        Ok(())
    }
}

fn flush(paragraph: &mut Paragraph, document: &mut Document) {
    if !paragraph.is_empty() {
        document.add_paragraph(std::mem::take(paragraph));
    }
}

/// Parse inline flat text (a caption or paragraph body).
///
/// Code and image directives are not inline content; they are kept as
/// literal text.
pub fn parse_inline(text: &str) -> Vec<Inline> {
    let mut paragraph = Paragraph::new();
    for spanned in Tokenizer::new(text) {
        match spanned.token {
            Token::Math(latex) => paragraph.push(Inline::math(latex)),
            Token::Marked(mark, body) => paragraph.push(Inline::marked(body, mark)),
            Token::Text(_) | Token::Code(..) | Token::Image(_) => {
                paragraph.push(Inline::text(spanned.raw))
            }
        }
    }
    paragraph.content
}

/// Parse flat text with default options.
pub fn parse_flat_text(text: &str, images: &ImageTable) -> Result<Document> {
    Ok(FlatTextParser::new().parse(text, images)?.document)
}
