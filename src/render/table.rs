//! Table grid resolution into a `tabular` environment.
//!
//! Resolution happens in two passes. The first places every declared cell
//! into a dense slot matrix, marking the slots that horizontal and vertical
//! merges cover. The second walks the matrix row by row, emitting cells and
//! the horizontal rule beneath each row: `\hline` when every column is
//! ruled, otherwise one `\cline{a-b}` per maximal ruled run.

use super::grid::{parse_cell, split_cells, split_rows, strip_command, CellSpec, MAX_SPAN};
use crate::error::{Error, Result};

/// State of one slot in the resolved grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// Nothing placed here
    Vacant,
    /// A declared cell originates here
    Content(CellSpec),
    /// Covered by a horizontal merge from the left
    BlockedHorizontal {
        /// The merge suppresses the rule below
        no_bottom: bool,
        /// The covering cell originates in a row above
        from_above: bool,
    },
    /// Covered by a vertical merge from above
    BlockedVertical {
        /// The merge suppresses the rule to its right
        no_right: bool,
        /// The merge suppresses the rule below
        no_bottom: bool,
        /// Columns covered by the merge
        width: usize,
    },
}

impl Slot {
    fn is_blocked(&self) -> bool {
        matches!(
            self,
            Slot::BlockedHorizontal { .. } | Slot::BlockedVertical { .. }
        )
    }

    fn is_covered_from_above(&self) -> bool {
        matches!(
            self,
            Slot::BlockedVertical { .. } | Slot::BlockedHorizontal { from_above: true, .. }
        )
    }

    /// `\nbb` reaches every slot a merge covers, vertical ones included.
    fn suppresses_bottom(&self) -> bool {
        match self {
            Slot::Content(cell) => cell.no_bottom,
            Slot::BlockedHorizontal { no_bottom, .. } => *no_bottom,
            Slot::BlockedVertical { no_bottom, .. } => *no_bottom,
            Slot::Vacant => false,
        }
    }
}

/// The rule drawn beneath a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowRule {
    /// `\hline`
    Full,
    /// `\cline` over these inclusive, 1-based column ranges
    Partial(Vec<(usize, usize)>),
    /// No rule at all
    None,
}

impl RowRule {
    fn render(&self) -> Option<String> {
        match self {
            RowRule::Full => Some("\\hline".to_string()),
            RowRule::Partial(runs) => Some(
                runs.iter()
                    .map(|(a, b)| format!("\\cline{{{}-{}}}", a, b))
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
            RowRule::None => None,
        }
    }
}

/// A resolved table grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    /// Number of columns, fixed by the first row
    pub columns: usize,
    /// Slot matrix, `rows[r][c]`
    pub rows: Vec<Vec<Slot>>,
}

impl TableLayout {
    /// Resolve a raw table specification.
    pub fn resolve(spec: &str) -> Result<Self> {
        let parsed: Vec<Vec<CellSpec>> = split_rows(spec)
            .into_iter()
            .map(|row| {
                if row.trim().is_empty() {
                    Vec::new()
                } else {
                    split_cells(row).into_iter().map(parse_cell).collect()
                }
            })
            .collect();

        for (r, cells) in parsed.iter().enumerate() {
            if let Some(cell) = cells
                .iter()
                .find(|c| c.col_span > MAX_SPAN || c.row_span > MAX_SPAN)
            {
                return Err(Error::table(format!(
                    "row {}: merge span of {} exceeds the limit of {}",
                    r + 1,
                    cell.col_span.max(cell.row_span),
                    MAX_SPAN
                )));
            }
        }

        let columns = match parsed.first() {
            Some(first) if !first.is_empty() => first
                .iter()
                .try_fold(0usize, |sum, c| sum.checked_add(c.col_span))
                .filter(|&n| n <= MAX_SPAN)
                .ok_or_else(|| {
                    Error::table(format!("first row is wider than {} columns", MAX_SPAN))
                })?,
            _ => return Err(Error::table("first row is empty")),
        };

        let row_count = parsed.len();
        let mut rows = vec![vec![Slot::Vacant; columns]; row_count];

        for (r, cells) in parsed.into_iter().enumerate() {
            let mut c = 0;
            for cell in cells {
                while c < columns && rows[r][c].is_blocked() {
                    c += 1;
                }
                if c >= columns {
                    return Err(Error::table(format!(
                        "row {} has more cells than the {} columns of the first row",
                        r + 1,
                        columns
                    )));
                }
                let width = cell.col_span;
                if c + width > columns {
                    return Err(Error::table(format!(
                        "row {}: cell at column {} spans past column {}",
                        r + 1,
                        c + 1,
                        columns
                    )));
                }
                if rows[r][c + 1..c + width].iter().any(|s| *s != Slot::Vacant) {
                    return Err(Error::table(format!(
                        "row {}: merged cell at column {} overlaps another merge",
                        r + 1,
                        c + 1
                    )));
                }

                let mut last_row = r + cell.row_span - 1;
                if last_row >= row_count {
                    log::warn!(
                        "row {}: vertical merge of {} rows clamped to the table",
                        r + 1,
                        cell.row_span
                    );
                    last_row = row_count - 1;
                }

                for slot in &mut rows[r][c + 1..c + width] {
                    *slot = Slot::BlockedHorizontal {
                        no_bottom: cell.no_bottom,
                        from_above: false,
                    };
                }
                for below in rows.iter_mut().take(last_row + 1).skip(r + 1) {
                    if below[c..c + width].iter().any(|s| *s != Slot::Vacant) {
                        return Err(Error::table(format!(
                            "row {}: merged cell at column {} overlaps another merge",
                            r + 1,
                            c + 1
                        )));
                    }
                    below[c] = Slot::BlockedVertical {
                        no_right: cell.no_right,
                        no_bottom: cell.no_bottom,
                        width,
                    };
                    for slot in &mut below[c + 1..c + width] {
                        *slot = Slot::BlockedHorizontal {
                            no_bottom: cell.no_bottom,
                            from_above: true,
                        };
                    }
                }

                rows[r][c] = Slot::Content(cell);
                c += width;
            }
        }

        while rows
            .last()
            .map_or(false, |row| row.iter().all(|s| *s == Slot::Vacant))
        {
            rows.pop();
        }

        Ok(Self { columns, rows })
    }

    /// Rule drawn beneath row `r`. The last row is always fully ruled.
    pub fn rule_below(&self, r: usize) -> RowRule {
        let Some(next) = self.rows.get(r + 1) else {
            return RowRule::Full;
        };
        let drawn: Vec<bool> = (0..self.columns)
            .map(|c| !(next[c].is_covered_from_above() || self.rows[r][c].suppresses_bottom()))
            .collect();

        if drawn.iter().all(|&d| d) {
            return RowRule::Full;
        }

        let mut runs = Vec::new();
        let mut start: Option<usize> = None;
        for (c, &d) in drawn.iter().enumerate() {
            match (d, start) {
                (true, None) => start = Some(c),
                (false, Some(s)) => {
                    runs.push((s + 1, c));
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            runs.push((s + 1, self.columns));
        }

        if runs.is_empty() {
            RowRule::None
        } else {
            RowRule::Partial(runs)
        }
    }

    /// Render the `tabular` environment.
    pub fn render(&self) -> String {
        let mut out = format!("\\begin{{tabular}}{{|{}}}\n\\hline\n", "c|".repeat(self.columns));
        for r in 0..self.rows.len() {
            out.push_str(&self.render_row(r));
            out.push_str(" \\\\\n");
            if let Some(rule) = self.rule_below(r).render() {
                out.push_str(&rule);
                out.push('\n');
            }
        }
        out.push_str("\\end{tabular}");
        out
    }

    fn render_row(&self, r: usize) -> String {
        let mut parts = Vec::with_capacity(self.columns);
        for (c, slot) in self.rows[r].iter().enumerate() {
            match slot {
                Slot::BlockedHorizontal { .. } => {}
                Slot::Vacant => parts.push(String::new()),
                Slot::BlockedVertical {
                    no_right, width, ..
                } => {
                    if *no_right || *width > 1 {
                        parts.push(format!(
                            "\\multicolumn{{{}}}{{{}}}{{}}",
                            width,
                            column_spec(c, !no_right)
                        ));
                    } else {
                        parts.push(String::new());
                    }
                }
                Slot::Content(cell) => {
                    let mut body = cell_body(&cell.content);
                    if cell.row_span > 1 {
                        body = format!("\\multirow{{{}}}{{*}}{{{}}}", cell.row_span, body);
                    }
                    if cell.col_span > 1 || cell.no_right {
                        body = format!(
                            "\\multicolumn{{{}}}{{{}}}{{{}}}",
                            cell.col_span,
                            column_spec(c, !cell.no_right),
                            body
                        );
                    }
                    parts.push(body);
                }
            }
        }
        parts.join(" & ")
    }
}

/// Column specification for a `\multicolumn` starting at column `c`.
fn column_spec(c: usize, right_rule: bool) -> String {
    format!(
        "{}c{}",
        if c == 0 { "|" } else { "" },
        if right_rule { "|" } else { "" }
    )
}

/// Cell content as typeset: math unless it is a `\text{..}` literal.
fn cell_body(content: &str) -> String {
    if content.is_empty() {
        String::new()
    } else if let Some(literal) = strip_command(content, "\\text") {
        literal.to_string()
    } else {
        format!("${}$", content)
    }
}

/// Resolve and render a table spec in one step.
pub fn render_table(spec: &str) -> Result<String> {
    Ok(TableLayout::resolve(spec)?.render())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_merge() {
        let out = render_table(r"A & \mergeright[2]{B} \\ C & D & E").unwrap();
        assert!(out.starts_with("\\begin{tabular}{|c|c|c|}\n\\hline\n"));
        assert!(out.contains("$A$ & \\multicolumn{2}{c|}{$B$} \\\\\n\\hline\n"));
        assert!(out.contains("$C$ & $D$ & $E$ \\\\\n\\hline\n"));
        assert!(out.ends_with("\\end{tabular}"));
    }

    #[test]
    fn test_vertical_merge_uses_cline() {
        let layout = TableLayout::resolve(r"\mergelower[2]{X} & Y \\ Z").unwrap();
        assert_eq!(layout.columns, 2);
        assert!(matches!(layout.rows[1][0], Slot::BlockedVertical { .. }));
        assert_eq!(layout.rule_below(0), RowRule::Partial(vec![(2, 2)]));

        let out = layout.render();
        assert!(out.contains("\\multirow{2}{*}{$X$} & $Y$ \\\\\n\\cline{2-2}\n"));
        assert!(out.contains(" & $Z$ \\\\\n\\hline\n"));
    }

    #[test]
    fn test_first_row_blank_is_error() {
        let err = TableLayout::resolve(r" \\ A").unwrap_err();
        assert!(matches!(err, Error::MalformedGrid { kind: "table", .. }));
    }

    #[test]
    fn test_row_overflow_is_error() {
        assert!(TableLayout::resolve(r"A & B \\ C & D & E").is_err());
        assert!(TableLayout::resolve(r"A & B \\ C & \mergeright[2]{D}").is_err());
    }

    #[test]
    fn test_vertical_merge_clamped() {
        let layout = TableLayout::resolve(r"\mergelower[5]{X} & Y \\ Z").unwrap();
        assert_eq!(layout.rows.len(), 2);
        assert!(matches!(layout.rows[1][1], Slot::Content(_)));
    }

    #[test]
    fn test_trailing_vacant_rows_dropped() {
        let layout = TableLayout::resolve(r"A & B \\ \\ ").unwrap();
        assert_eq!(layout.rows.len(), 1);
    }

    #[test]
    fn test_no_bottom_and_no_right() {
        let layout = TableLayout::resolve(r"A \nbb & B \\ C & D").unwrap();
        assert_eq!(layout.rule_below(0), RowRule::Partial(vec![(2, 2)]));

        let out = render_table(r"A \nrb & B").unwrap();
        assert!(out.contains("\\multicolumn{1}{|c}{$A$} & $B$"));
    }

    #[test]
    fn test_text_literal_and_blank_cells() {
        let out = render_table(r"\text{Name} &  & x").unwrap();
        assert!(out.contains("Name &  & $x$ \\\\"));
    }

    #[test]
    fn test_rule_fully_suppressed() {
        let layout = TableLayout::resolve(r"\mergelower[2]{\mergeright[2]{X}} \\ ").unwrap();
        assert_eq!(layout.rows.len(), 2);
        assert_eq!(layout.rule_below(0), RowRule::None);
        assert!(layout.render().contains("\\multicolumn{2}{|c|}{}"));
    }

    #[test]
    fn test_non_ascii_cells() {
        let out = render_table(r"α & \text{Größe} \\ \mergeright[2]{\text{Ärger}}").unwrap();
        assert!(out.contains("$α$ & Größe \\\\\n\\hline\n"));
        assert!(out.contains("\\multicolumn{2}{|c|}{Ärger} \\\\\n"));
    }

    #[test]
    fn test_oversized_span_is_error() {
        for spec in [
            r"\mergeright[100000000000]{A}",
            r"\mergeright[100000000000000000000000]{A}",
            r"A \\ \mergelower[100000000000]{B}",
            r"A & \mergelower[257]{B}",
        ] {
            let err = TableLayout::resolve(spec).unwrap_err();
            assert!(
                matches!(err, Error::MalformedGrid { kind: "table", .. }),
                "{}",
                spec
            );
        }
    }

    #[test]
    fn test_table_width_limit() {
        let at_limit = vec![r"\mergeright[128]{A}"; 2].join(" & ");
        assert_eq!(TableLayout::resolve(&at_limit).unwrap().columns, MAX_SPAN);

        let too_wide = vec![r"\mergeright[128]{A}"; 3].join(" & ");
        assert!(TableLayout::resolve(&too_wide).is_err());
    }

    #[test]
    fn test_vertical_merge_no_bottom_covers_last_row() {
        let layout = TableLayout::resolve(r"\mergelower[2]{X} \nbb & Y \\ Z \\ A & B").unwrap();
        assert!(matches!(
            layout.rows[1][0],
            Slot::BlockedVertical { no_bottom: true, .. }
        ));
        assert_eq!(layout.rule_below(0), RowRule::Partial(vec![(2, 2)]));
        assert_eq!(layout.rule_below(1), RowRule::Partial(vec![(2, 2)]));
        assert_eq!(layout.rule_below(2), RowRule::Full);
    }
}
