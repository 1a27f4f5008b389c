//! LaTeX emission from flat text.
//!
//! Emission works line by line on flat text, after a first pass that
//! indexes every label for reference resolution. Each line is dispatched
//! to the first matching handler: theorem-like lines, qed lines, math
//! environments, labeled equations, table and figure grids, and finally
//! ordinary paragraphs, which may still carry code and image directives.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Diagnostic, DiagnosticKind, Error, Result};
use crate::escape::decode;
use crate::model::{CodeLang, Document, GridKind, ImageTable, Mark};
use crate::parser::{tokenize, ErrorMode, Token, Tokenizer};

use super::cleanup::strip_zero_width;
use super::figure::FigureLayout;
use super::flat::to_flat_text;
use super::preamble::{postamble, preamble};
use super::references::{equation_parts, is_labeled_equation, ReferenceIndex};
use super::table::TableLayout;
use super::{CleanupPipeline, EmitStats, RenderOptions, RenderResult};

/// Convert flat text to LaTeX.
pub fn to_latex(flat: &str, options: &RenderOptions) -> Result<String> {
    let renderer = LatexRenderer::new(options.clone());
    Ok(renderer.render(flat)?.content)
}

/// Convert flat text to LaTeX, resolving image file names from `images`.
pub fn to_latex_with_images(
    flat: &str,
    images: &ImageTable,
    options: &RenderOptions,
) -> Result<RenderResult> {
    LatexRenderer::new(options.clone())
        .with_images(images.clone())
        .render(flat)
}

/// Convert a document model to LaTeX.
pub fn document_to_latex(doc: &Document, options: &RenderOptions) -> Result<RenderResult> {
    to_latex_with_images(&to_flat_text(doc), &doc.resources, options)
}

fn math_env_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\\begin\{(align\*?|aligned|gather\*?|[pbvVB]?matrix|smallmatrix)\}").unwrap()
    })
}

fn row_break_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\\\\\s*").unwrap())
}

/// LaTeX renderer.
pub struct LatexRenderer {
    options: RenderOptions,
    images: ImageTable,
    stats: EmitStats,
    diagnostics: Vec<Diagnostic>,
    bibliography: Vec<String>,
    references: ReferenceIndex,
    proof_open: bool,
    line_no: usize,
}

impl LatexRenderer {
    /// Create a new LaTeX renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            images: ImageTable::new(),
            stats: EmitStats::new(),
            diagnostics: Vec::new(),
            bibliography: Vec::new(),
            references: ReferenceIndex::default(),
            proof_open: false,
            line_no: 0,
        }
    }

    /// Set the image table used to name image files.
    pub fn with_images(mut self, images: ImageTable) -> Self {
        self.images = images;
        self
    }

    /// Render flat text to LaTeX.
    pub fn render(mut self, flat: &str) -> Result<RenderResult> {
        let lines: Vec<&str> = flat
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect();
        self.references = ReferenceIndex::collect(lines.iter().copied());

        let mut body = String::with_capacity(flat.len() * 2);
        for (idx, line) in lines.iter().enumerate() {
            self.line_no = idx + 1;
            self.render_line(&mut body, line)?;
        }
        self.close_proof(&mut body);
        self.stat(|s| s.line_count = lines.len() as u32);

        let bibliography = if self.bibliography.is_empty() {
            None
        } else {
            Some(strip_zero_width(&self.bibliography.join("\n\n")) + "\n")
        };

        let mut output = String::new();
        if self.options.include_preamble {
            output.push_str(&preamble());
        }
        output.push_str(body.trim_end());
        output.push_str("\n\n");
        if self.options.include_preamble {
            let bib = bibliography.as_ref().map(|_| {
                (
                    self.options.bibliography_style.as_str(),
                    self.options.bibliography_name.as_str(),
                )
            });
            output.push_str(&postamble(bib));
        }

        let mut content = strip_zero_width(&output);
        if let Some(ref cleanup_options) = self.options.cleanup {
            let pipeline = CleanupPipeline::new(cleanup_options.clone());
            content = pipeline.process(&content);
        }
        let content = format!("{}\n", content.trim());

        log::debug!(
            "emitted {} bytes of LaTeX with {} diagnostics",
            content.len(),
            self.diagnostics.len()
        );

        Ok(RenderResult {
            content,
            bibliography,
            stats: self.stats,
            diagnostics: self.diagnostics,
        })
    }

    fn stat(&mut self, update: impl FnOnce(&mut EmitStats)) {
        if self.options.collect_stats {
            update(&mut self.stats);
        }
    }

    fn render_line(&mut self, out: &mut String, raw: &str) -> Result<()> {
        let line = strip_zero_width(raw);
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(());
        }

        for kind in GridKind::ALL {
            match kind.split_line(trimmed) {
                Some(Ok((spec, rest))) => return self.render_grid(out, kind, spec, rest),
                Some(Err(())) => {
                    return Err(grid_error(
                        kind,
                        format!("line {}: {} never closes", self.line_no, kind.close()),
                    ))
                }
                None => {}
            }
        }

        let tokens = tokenize(&line);
        let significant: Vec<Token> = tokens.iter().copied().filter(|t| !t.is_blank()).collect();

        if let Some(Token::Marked(mark, name)) = significant.first().copied() {
            if mark.is_theorem_like() {
                let first = tokens.iter().position(|t| !t.is_blank()).unwrap_or(0);
                self.render_theorem(out, mark, name, &tokens[first + 1..]);
                return Ok(());
            }
        }

        if tokens.iter().any(|t| matches!(t, Token::Marked(Mark::Qed, _))) {
            self.render_qed(out, &tokens);
            return Ok(());
        }

        if let [Token::Math(latex)] = significant.as_slice() {
            if let Some(caps) = math_env_regex().captures(latex.trim_start()) {
                self.render_math_env(out, latex.trim(), &caps[1]);
                return Ok(());
            }
        }

        if let Some((latex, label)) = equation_parts(&significant) {
            if is_labeled_equation(latex, label) {
                self.render_equation(out, latex, label);
                return Ok(());
            }
        }

        self.render_flow(out, &line)
    }

    fn render_theorem(&mut self, out: &mut String, mark: Mark, name: &str, rest: &[Token]) {
        self.close_proof(out);
        self.stat(|s| s.theorem_count += 1);

        let env = mark.keyword();
        let name = name.trim();
        if name.is_empty() {
            out.push_str(&format!("\\begin{{{}}}\n", env));
        } else {
            out.push_str(&format!("\\begin{{{}}}[{}]\\label{{{}}}\n", env, name, name));
        }

        let mut statement = String::new();
        for token in rest {
            self.render_token(&mut statement, *token);
        }
        let statement = statement.trim();
        if !statement.is_empty() {
            out.push_str(statement);
            out.push('\n');
        }
        out.push_str(&format!("\\end{{{}}}\n\n", env));

        if mark.opens_proof() {
            out.push_str("\\begin{proof}\n");
            self.proof_open = true;
        }
    }

    fn render_qed(&mut self, out: &mut String, tokens: &[Token]) {
        let mut text = String::new();
        for token in tokens {
            if !matches!(token, Token::Marked(Mark::Qed, _)) {
                self.render_token(&mut text, *token);
            }
        }
        let text = text.trim();
        if !text.is_empty() {
            out.push_str(text);
            out.push('\n');
        }

        if self.proof_open {
            out.push_str("\\end{proof}\n\n");
            self.proof_open = false;
            self.stat(|s| s.proof_count += 1);
        } else {
            log::debug!("line {}: qed without an open proof", self.line_no);
            out.push_str("\\qed\n\n");
        }
    }

    fn close_proof(&mut self, out: &mut String) {
        if self.proof_open {
            log::debug!("closing proof left open before line {}", self.line_no);
            out.push_str("\\end{proof}\n\n");
            self.proof_open = false;
            self.stat(|s| s.proof_count += 1);
        }
    }

    fn render_math_env(&mut self, out: &mut String, latex: &str, env: &str) {
        self.stat(|s| s.equation_count += 1);
        let body = reflow_rows(latex);
        if env.starts_with("align") || env.starts_with("gather") {
            out.push_str(&body);
            out.push_str("\n\n");
        } else {
            out.push_str("\\[\n");
            out.push_str(&body);
            out.push_str("\n\\]\n\n");
        }
    }

    fn render_equation(&mut self, out: &mut String, latex: &str, label: Option<&str>) {
        self.stat(|s| s.equation_count += 1);
        out.push_str("\\begin{equation}\n");
        out.push_str(latex.trim());
        out.push('\n');
        if let Some(label) = label.filter(|l| !l.is_empty()) {
            out.push_str(&format!("\\label{{{}}}\n", label));
        }
        out.push_str("\\end{equation}\n\n");
    }

    /// Ordinary line: inline content, split around code and image directives.
    fn render_flow(&mut self, out: &mut String, line: &str) -> Result<()> {
        let mut paragraph = String::new();
        for spanned in Tokenizer::new(line) {
            match spanned.token {
                Token::Code(lang, payload) => {
                    self.flush_paragraph(out, &mut paragraph);
                    self.render_code(out, lang, payload)?;
                }
                Token::Image(body) => {
                    self.flush_paragraph(out, &mut paragraph);
                    self.render_image(out, body)?;
                }
                token => self.render_token(&mut paragraph, token),
            }
        }
        self.flush_paragraph(out, &mut paragraph);
        Ok(())
    }

    fn flush_paragraph(&mut self, out: &mut String, paragraph: &mut String) {
        let text = paragraph.trim();
        if !text.is_empty() {
            if self.options.collect_stats {
                self.stats.paragraph_count += 1;
                self.stats.count_text(text);
            }
            out.push_str(text);
            out.push_str("\n\n");
        }
        paragraph.clear();
    }

    fn render_code(&mut self, out: &mut String, lang: CodeLang, payload: &str) -> Result<()> {
        let code = match decode(payload) {
            Ok(code) => code,
            Err(e) => return self.recover(out, e),
        };

        if lang == CodeLang::BibTeX {
            let entry = code.trim();
            if !entry.is_empty() {
                let entries = entry.matches('@').count().max(1) as u32;
                self.stat(|s| s.bib_entry_count += entries);
                self.bibliography.push(entry.to_string());
            }
            return Ok(());
        }

        self.stat(|s| s.code_count += 1);
        out.push_str(&format!(
            "\\begin{{lstlisting}}[language={}]\n{}\n\\end{{lstlisting}}\n\n",
            lang.listings_name(),
            code.trim_end_matches('\n')
        ));
        Ok(())
    }

    fn render_image(&mut self, out: &mut String, body: &str) -> Result<()> {
        let (id, encoded) = body.split_once(' ').unwrap_or((body, ""));
        let id = id.trim();
        let caption = match decode(encoded) {
            Ok(caption) => caption,
            Err(e) => return self.recover(out, e),
        };
        if !self.images.contains(id) {
            log::warn!("line {}: image {} is not in the image table", self.line_no, id);
        }
        self.stat(|s| s.image_count += 1);

        let (caption, labels) = self.render_caption(&caption);
        out.push_str(&format!(
            "\\begin{{figure}}[{}]\n\\centering\n",
            self.options.float_placement
        ));
        out.push_str(&format!(
            "\\includegraphics[width={}\\linewidth]{{{}{}}}\n",
            self.options.image_width,
            self.options.image_path_prefix,
            self.images.filename(id)
        ));
        push_caption(out, &caption, &labels);
        out.push_str("\\end{figure}\n\n");
        Ok(())
    }

    fn render_grid(&mut self, out: &mut String, kind: GridKind, spec: &str, rest: &str) -> Result<()> {
        let (caption, labels) = self.render_caption(rest.trim());
        let env = kind.name();
        out.push_str(&format!(
            "\\begin{{{}}}[{}]\n\\centering\n",
            env, self.options.float_placement
        ));

        match kind {
            GridKind::Table => {
                let layout = TableLayout::resolve(spec).map_err(|e| self.locate(e))?;
                self.stat(|s| s.table_count += 1);
                push_caption(out, &caption, &labels);
                out.push_str(&layout.render());
                out.push('\n');
            }
            GridKind::Figure => {
                let layout = FigureLayout::resolve(spec).map_err(|e| self.locate(e))?;
                self.stat(|s| s.figure_count += 1);
                out.push_str(&layout.render(&self.images, &self.options));
                out.push('\n');
                push_caption(out, &caption, &labels);
            }
        }

        out.push_str(&format!("\\end{{{}}}\n\n", env));
        Ok(())
    }

    /// Render caption text, pulling its labels out.
    fn render_caption(&mut self, text: &str) -> (String, Vec<String>) {
        let mut caption = String::new();
        let mut labels = Vec::new();
        for spanned in Tokenizer::new(text) {
            match spanned.token {
                Token::Marked(Mark::Label, label) if !label.trim().is_empty() => {
                    labels.push(label.trim().to_string())
                }
                Token::Code(..) | Token::Image(_) => caption.push_str(&self.escape(spanned.raw)),
                token => self.render_token(&mut caption, token),
            }
        }
        (caption.trim().to_string(), labels)
    }

    fn render_token(&mut self, out: &mut String, token: Token) {
        match token {
            Token::Text(text) => out.push_str(&self.escape(text)),
            Token::Math(latex) => {
                out.push('$');
                out.push_str(latex);
                out.push('$');
            }
            Token::Marked(mark, text) => self.render_marked(out, mark, text),
            Token::Code(lang, payload) => {
                out.push_str(&format!("\\{}{{{}}}", lang.keyword(), payload));
            }
            Token::Image(body) => out.push_str(&format!("\\includegraphics{{{}}}", body)),
        }
    }

    fn render_marked(&mut self, out: &mut String, mark: Mark, text: &str) {
        match mark {
            Mark::Bold | Mark::Italic | Mark::Code => {
                out.push_str(&format!("{}{{{}}}", mark, self.escape(text)));
            }
            Mark::Section | Mark::Subsection => {
                self.stat(|s| s.section_count += 1);
                let title = text.trim();
                out.push_str(&format!("{}{{{}}}", mark, self.escape(title)));
                if !title.is_empty() {
                    out.push_str(&format!("\\label{{{}}}", title));
                }
            }
            Mark::Reference => self.render_reference(out, text),
            Mark::Citation => {
                self.stat(|s| s.citation_count += 1);
                let keys: Vec<&str> = text
                    .split(',')
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .collect();
                out.push_str(&format!("\\cite{{{}}}", keys.join(",")));
            }
            Mark::Label => out.push_str(&format!("\\label{{{}}}", text.trim())),
            Mark::Qed => out.push_str("\\qed"),
            Mark::Theorem
            | Mark::Definition
            | Mark::Proposition
            | Mark::Corollary
            | Mark::Lemma
            | Mark::Remark => {
                out.push_str(&format!("\\textbf{{{}}}", self.escape(text)));
            }
        }
    }

    fn render_reference(&mut self, out: &mut String, text: &str) {
        let mut parts = Vec::new();
        for key in text.split(',').map(str::trim).filter(|k| !k.is_empty()) {
            self.stat(|s| s.reference_count += 1);
            match self.references.resolve(key) {
                Some(kind) => parts.push(format!("\\{}{{{}}}", kind.command(), key)),
                None => {
                    log::warn!("line {}: unresolved reference {}", self.line_no, key);
                    self.stat(|s| s.unresolved_reference_count += 1);
                    self.diagnostics.push(Diagnostic::new(
                        self.line_no,
                        DiagnosticKind::UnresolvedReference,
                        format!("no label named {}", key),
                    ));
                    parts.push(format!("\\eqref{{{}}}", key));
                }
            }
        }
        out.push_str(&parts.join(", "));
    }

    fn escape(&self, text: &str) -> String {
        if self.options.escape_special_chars {
            escape_latex(text)
        } else {
            text.to_string()
        }
    }

    fn recover(&mut self, out: &mut String, err: Error) -> Result<()> {
        if self.options.error_mode == ErrorMode::Strict {
            return Err(err);
        }
        log::warn!("line {}: skipping directive: {}", self.line_no, err);
        out.push_str(&format!("% line {}: {}\n\n", self.line_no, err));
        self.diagnostics.push(Diagnostic::new(
            self.line_no,
            DiagnosticKind::Decode,
            err.to_string(),
        ));
        Ok(())
    }

    fn locate(&self, err: Error) -> Error {
        match err {
            Error::MalformedGrid { kind, message } => Error::MalformedGrid {
                kind,
                message: format!("line {}: {}", self.line_no, message),
            },
            other => other,
        }
    }
}

fn grid_error(kind: GridKind, message: String) -> Error {
    match kind {
        GridKind::Table => Error::table(message),
        GridKind::Figure => Error::figure(message),
    }
}

fn push_caption(out: &mut String, caption: &str, labels: &[String]) {
    if !caption.is_empty() {
        out.push_str(&format!("\\caption{{{}}}\n", caption));
    }
    for label in labels {
        out.push_str(&format!("\\label{{{}}}\n", label));
    }
}

/// Put each row of a math environment on its own line.
fn reflow_rows(latex: &str) -> String {
    let body = row_break_regex().replace_all(latex, "\\\\\n");
    let mut out = String::with_capacity(body.len() + 8);
    for (i, line) in body.lines().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(line.trim());
    }
    let out = match out.find('}') {
        Some(end) if out.starts_with("\\begin{") && !out[end + 1..].starts_with('\n') => {
            format!("{}\n{}", &out[..end + 1], &out[end + 1..])
        }
        _ => out,
    };
    match out.rfind("\\end{") {
        Some(start) if start > 0 && !out[..start].ends_with('\n') => {
            format!("{}\n{}", &out[..start], &out[start..])
        }
        _ => out,
    }
}

/// Escape the characters LaTeX treats specially in running text.
///
/// Already-escaped characters are left alone.
pub fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev = '\0';
    for c in text.chars() {
        if matches!(c, '&' | '%' | '#' | '_') && prev != '\\' {
            out.push('\\');
        }
        out.push(c);
        prev = c;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(flat: &str) -> String {
        to_latex(flat, &RenderOptions::new().body_only()).unwrap()
    }

    #[test]
    fn test_paragraph_and_marks() {
        assert_eq!(
            body(r"Cost 5% of \textbf{R&D} and $x_1$"),
            "Cost 5\\% of \\textbf{R\\&D} and $x_1$\n"
        );
    }

    #[test]
    fn test_theorem_and_proof() {
        let out = body("\\theorem{Pythagoras} $a^2+b^2=c^2$\nObvious.\n\\qed{\u{200B}}");
        assert_eq!(
            out,
            "\\begin{theorem}[Pythagoras]\\label{Pythagoras}\n$a^2+b^2=c^2$\n\\end{theorem}\n\n\
             \\begin{proof}\nObvious.\n\n\\end{proof}\n"
        );
    }

    #[test]
    fn test_definition_has_no_proof() {
        let out = body(r"\definition{Group} A set with an operation.");
        assert!(out.contains("\\begin{definition}[Group]\\label{Group}"));
        assert!(!out.contains("proof"));
    }

    #[test]
    fn test_unclosed_proof_closed_at_end_and_by_next_theorem() {
        let out = body("\\lemma{A}\nstep\n\\theorem{B}");
        assert_eq!(out.matches("\\begin{proof}").count(), 2);
        assert_eq!(out.matches("\\end{proof}").count(), 2);
        let first_end = out.find("\\end{proof}").unwrap();
        assert!(first_end < out.find("\\begin{theorem}").unwrap());
    }

    #[test]
    fn test_qed_without_proof() {
        assert_eq!(body(r"Done. \qed{}"), "Done.\n\\qed\n");
    }

    #[test]
    fn test_align_reflow() {
        let out = body(r"$\begin{align*}a &= b \\ c &= d\end{align*}$");
        assert_eq!(out, "\\begin{align*}\na &= b \\\\\nc &= d\n\\end{align*}\n");
    }

    #[test]
    fn test_matrix_is_displayed() {
        let out = body(r"$\begin{pmatrix}1 & 0 \\ 0 & 1\end{pmatrix}$");
        assert!(out.starts_with("\\[\n\\begin{pmatrix}\n1 & 0 \\\\\n0 & 1\n\\end{pmatrix}\n\\]"));
    }

    #[test]
    fn test_labeled_equation_and_references() {
        let flat = "\\section{Intro}\n$E=mc^2$ \\label{energy}\nBy \\eqref{energy, Intro, nowhere}.";
        let result = to_latex_with_images(flat, &ImageTable::new(), &RenderOptions::new().body_only())
            .unwrap();

        assert!(result.content.contains("\\section{Intro}\\label{Intro}"));
        assert!(result
            .content
            .contains("\\begin{equation}\nE=mc^2\n\\label{energy}\n\\end{equation}"));
        assert!(result
            .content
            .contains("By \\eqref{energy}, \\ref{Intro}, \\eqref{nowhere}."));
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].kind, DiagnosticKind::UnresolvedReference);
    }

    #[test]
    fn test_unlabeled_math_line_stays_inline() {
        assert_eq!(body("$x$"), "$x$\n");
    }

    #[test]
    fn test_code_listing() {
        let out = body(r"\javascript{let%20x%20%3D%201%3B%0A}");
        assert_eq!(
            out,
            "\\begin{lstlisting}[language=JavaScript]\nlet x = 1;\n\\end{lstlisting}\n"
        );
    }

    #[test]
    fn test_bibtex_goes_to_bibliography() {
        let result = to_latex_with_images(
            r"\bibtex{%40book%7Bknuth%2C%20title%3D%7BTAOCP%7D%7D}",
            &ImageTable::new(),
            &RenderOptions::default(),
        )
        .unwrap();

        assert_eq!(result.bibliography.as_deref(), Some("@book{knuth, title={TAOCP}}\n"));
        assert!(!result.content.contains("@book"));
        assert!(result.content.contains("\\bibliographystyle{plain}\n\\bibliography{references}"));
        assert!(result.content.ends_with("\\end{document}\n"));
    }

    #[test]
    fn test_decode_failure_is_commented_out() {
        let result = to_latex_with_images(
            "a\n\\python{%ZZ}\nb",
            &ImageTable::new(),
            &RenderOptions::new().body_only(),
        )
        .unwrap();
        assert!(result.content.contains("% line 2: Decoding error"));
        assert_eq!(result.diagnostics[0].kind, DiagnosticKind::Decode);

        let strict = RenderOptions::new().body_only().with_error_mode(ErrorMode::Strict);
        assert!(to_latex("\\python{%ZZ}", &strict).is_err());
    }

    #[test]
    fn test_table_float() {
        let out = body(r"$\begin{table}A & B\end{table}$ Scores \label{tab}");
        assert!(out.starts_with("\\begin{table}[h]\n\\centering\n\\caption{Scores}\n\\label{tab}\n"));
        assert!(out.contains("\\begin{tabular}{|c|c|}"));
        assert!(out.ends_with("\\end{table}\n"));
    }

    #[test]
    fn test_malformed_table_aborts() {
        let err = to_latex(r"$\begin{table} \\ A\end{table}$", &RenderOptions::default()).unwrap_err();
        assert!(err.to_string().contains("line 1"));
        assert!(to_latex(r"$\begin{figure}1 & 2", &RenderOptions::default()).is_err());
    }

    #[test]
    fn test_image_figure() {
        let mut images = ImageTable::new();
        images.insert("3", crate::model::ImagePayload::new("data:image/png;base64,AA"));
        let result = to_latex_with_images(
            r"\includegraphics{3 A%20cat%20%5Clabel%7Bcat%7D}",
            &images,
            &RenderOptions::new().body_only(),
        )
        .unwrap();
        assert_eq!(
            result.content,
            "\\begin{figure}[h]\n\\centering\n\\includegraphics[width=0.8\\linewidth]{images/image3.png}\n\
             \\caption{A cat}\n\\label{cat}\n\\end{figure}\n"
        );
    }

    #[test]
    fn test_placeholders_stripped() {
        let out = to_latex("a\u{200B}b\n\u{200B}\n", &RenderOptions::default()).unwrap();
        assert!(!out.contains('\u{200B}'));
        assert!(out.contains("ab\n"));
    }

    #[test]
    fn test_escape_latex() {
        assert_eq!(escape_latex("a_b #1 50%"), "a\\_b \\#1 50\\%");
        assert_eq!(escape_latex("already \\& done"), "already \\& done");
    }

    #[test]
    fn test_stats() {
        let options = RenderOptions::new().body_only().with_stats(true);
        let flat = "\\section{A}\nText here\n$\\begin{table}x\\end{table}$";
        let result = to_latex_with_images(flat, &ImageTable::new(), &options).unwrap();
        assert_eq!(result.stats.section_count, 1);
        assert_eq!(result.stats.paragraph_count, 2);
        assert_eq!(result.stats.table_count, 1);
        assert_eq!(result.stats.line_count, 3);
    }
}
