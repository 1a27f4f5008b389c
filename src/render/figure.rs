//! Figure grid resolution into subfigures.
//!
//! Each figure cell names one image, optionally followed by a caption and a
//! `\label{..}`. Cells share a unit width of `1 / (most cells in a row)`;
//! a cell merged across `N` columns gets `N` units, capped so the row never
//! overflows the text width.

use super::grid::{matching_brace, parse_cell, split_cells, split_rows, strip_command};
use super::RenderOptions;
use crate::error::{Error, Result};
use crate::model::ImageTable;

/// One sub-image of a figure grid.
#[derive(Debug, Clone, PartialEq)]
pub struct FigureCell {
    /// Image id in the side-table
    pub image_id: String,
    /// Sub-caption (LaTeX source), may be empty
    pub caption: String,
    /// Sub-label, if the cell declares one
    pub label: Option<String>,
    /// Columns covered
    pub col_span: usize,
}

/// A resolved figure grid.
#[derive(Debug, Clone, PartialEq)]
pub struct FigureLayout {
    /// Rows of cells; blank rows and cells are dropped
    pub rows: Vec<Vec<FigureCell>>,
}

impl FigureLayout {
    /// Resolve a raw figure specification.
    pub fn resolve(spec: &str) -> Result<Self> {
        let mut rows = Vec::new();
        for (r, raw_row) in split_rows(spec).into_iter().enumerate() {
            let mut cells = Vec::new();
            for raw in split_cells(raw_row) {
                if let Some(cell) = parse_figure_cell(raw, r + 1)? {
                    cells.push(cell);
                }
            }
            if !cells.is_empty() {
                rows.push(cells);
            }
        }
        if rows.is_empty() {
            return Err(Error::figure("figure has no images"));
        }
        Ok(Self { rows })
    }

    /// Width of one unmerged cell, as a fraction of `\textwidth`.
    pub fn unit(&self) -> f64 {
        let max_cells = self.rows.iter().map(Vec::len).max().unwrap_or(1).max(1);
        1.0 / max_cells as f64
    }

    /// Width of a cell, capped at `cap`.
    pub fn cell_width(&self, cell: &FigureCell, cap: f64) -> f64 {
        (cell.col_span as f64 * self.unit()).min(cap)
    }

    /// Iterate over every image id in row order.
    pub fn image_ids(&self) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .flatten()
            .map(|cell| cell.image_id.as_str())
    }

    /// Number of sub-images.
    pub fn cell_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// Render the subfigure body of the figure environment.
    pub fn render(&self, images: &ImageTable, options: &RenderOptions) -> String {
        let rows: Vec<String> = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| self.render_cell(cell, images, options))
                    .collect::<Vec<_>>()
                    .join("\n\\hfill\n")
            })
            .collect();
        rows.join("\n\\par\\medskip\n")
    }

    fn render_cell(&self, cell: &FigureCell, images: &ImageTable, options: &RenderOptions) -> String {
        if !images.contains(&cell.image_id) {
            log::warn!("figure references unknown image {}", cell.image_id);
        }
        let width = self.cell_width(cell, options.figure_width_cap);
        let mut out = format!("\\begin{{subfigure}}{{{:.3}\\textwidth}}\n\\centering\n", width);
        out.push_str(&format!(
            "\\includegraphics[width=\\linewidth]{{{}{}}}\n",
            options.image_path_prefix,
            images.filename(&cell.image_id)
        ));
        if !cell.caption.is_empty() {
            out.push_str(&format!("\\caption{{{}}}\n", cell.caption));
        }
        if let Some(label) = &cell.label {
            out.push_str(&format!("\\label{{{}}}\n", label));
        }
        out.push_str("\\end{subfigure}");
        out
    }
}

/// Best-effort list of image ids in a figure spec.
///
/// Malformed specs yield whatever ids could be read; used when hydrating
/// parsed documents, where a bad grid is reported later by the emitter.
pub fn figure_image_ids(spec: &str) -> Vec<String> {
    split_rows(spec)
        .into_iter()
        .enumerate()
        .flat_map(|(r, row)| split_cells(row).into_iter().map(move |raw| (r, raw)))
        .filter_map(|(r, raw)| parse_figure_cell(raw, r + 1).ok().flatten())
        .map(|cell| cell.image_id)
        .collect()
}

fn parse_figure_cell(raw: &str, row: usize) -> Result<Option<FigureCell>> {
    let spec = parse_cell(raw);
    if spec.content.is_empty() {
        return Ok(None);
    }
    if spec.row_span > 1 {
        log::warn!("row {}: vertical merges are ignored in figures", row);
    }

    let mut content = spec.content;
    let label = take_label(&mut content);

    let content = content.trim();
    let (image_id, rest) = if let Some(body) = content.strip_prefix("\\includegraphics{") {
        match matching_brace(body, 0) {
            Some(end) => (body[..end].trim().to_string(), &body[end + 1..]),
            None => (String::new(), ""),
        }
    } else {
        match content.split_once(char::is_whitespace) {
            Some((id, rest)) => (id.to_string(), rest),
            None => (content.to_string(), ""),
        }
    };

    if image_id.is_empty() {
        return Err(Error::figure(format!("row {}: cell has no image id", row)));
    }

    Ok(Some(FigureCell {
        image_id,
        caption: unwrap_text(rest.trim()),
        label,
        col_span: spec.col_span,
    }))
}

/// Remove the first `\label{..}` from `content` and return its body.
fn take_label(content: &mut String) -> Option<String> {
    let start = content.find("\\label{")?;
    let body_start = start + "\\label{".len();
    let end = matching_brace(content, body_start)?;
    let label = content[body_start..end].trim().to_string();
    content.replace_range(start..end + 1, "");
    Some(label).filter(|l| !l.is_empty())
}

/// Replace a whole-caption `\text{..}` wrapper with its body.
fn unwrap_text(caption: &str) -> String {
    strip_command(caption, "\\text")
        .unwrap_or(caption)
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ImagePayload;

    #[test]
    fn test_two_cells_half_width() {
        let layout = FigureLayout::resolve(r"1 Cat \label{cat} & 2 Dog").unwrap();
        assert_eq!(layout.rows.len(), 1);
        assert_eq!(layout.unit(), 0.5);

        let cat = &layout.rows[0][0];
        assert_eq!(cat.image_id, "1");
        assert_eq!(cat.caption, "Cat");
        assert_eq!(cat.label.as_deref(), Some("cat"));
        assert_eq!(format!("{:.3}", layout.cell_width(cat, 0.95)), "0.500");
    }

    #[test]
    fn test_merged_cell_is_capped() {
        let layout = FigureLayout::resolve(r"\mergeright[2]{1 Wide} \\ 2 & 3").unwrap();
        let wide = &layout.rows[0][0];
        assert_eq!(wide.col_span, 2);
        assert_eq!(format!("{:.3}", layout.cell_width(wide, 0.95)), "0.950");
    }

    #[test]
    fn test_includegraphics_cell_and_text_caption() {
        let layout = FigureLayout::resolve(r"\includegraphics{7} \text{A plot}").unwrap();
        let cell = &layout.rows[0][0];
        assert_eq!(cell.image_id, "7");
        assert_eq!(cell.caption, "A plot");
    }

    #[test]
    fn test_cell_without_id_is_error() {
        let err = FigureLayout::resolve(r"\label{x}").unwrap_err();
        assert!(matches!(err, Error::MalformedGrid { kind: "figure", .. }));
        assert!(FigureLayout::resolve(r" \\ ").is_err());
    }

    #[test]
    fn test_render_subfigures() {
        let mut images = ImageTable::new();
        images.insert("1", ImagePayload::new("data:image/jpeg;base64,AA"));
        let layout = FigureLayout::resolve(r"1 Cat & 2 \\ 3").unwrap();
        let out = layout.render(&images, &RenderOptions::default());

        assert!(out.contains("\\begin{subfigure}{0.500\\textwidth}"));
        assert!(out.contains("\\includegraphics[width=\\linewidth]{images/image1.jpg}"));
        assert!(out.contains("\\includegraphics[width=\\linewidth]{images/2}"));
        assert!(out.contains("\\caption{Cat}"));
        assert_eq!(out.matches("\\hfill").count(), 1);
        assert_eq!(out.matches("\\par\\medskip").count(), 1);
    }

    #[test]
    fn test_figure_image_ids() {
        assert_eq!(figure_image_ids(r"1 a & 2 \\ \includegraphics{3}"), vec!["1", "2", "3"]);
        assert!(figure_image_ids("").is_empty());
    }
}
