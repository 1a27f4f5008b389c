//! Splitting and directive parsing for table and figure specifications.
//!
//! A grid spec is a row list separated by `\\` with cells separated by `&`.
//! Separators only count at brace depth zero and outside nested
//! `\begin{..}`/`\end{..}` environments, so cell content may itself hold
//! matrices and aligned equations.

use std::sync::OnceLock;

use regex::Regex;

/// Largest `\mergeright`/`\mergelower` span, and widest table, a grid accepts.
pub(crate) const MAX_SPAN: usize = 256;

/// Split `text` on `sep` where it appears at the top level.
///
/// `sep` must be ASCII. Scanning is byte-wise; slices are only taken at
/// separator positions.
pub(crate) fn split_top_level<'a>(text: &'a str, sep: &str) -> Vec<&'a str> {
    let bytes = text.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut env = 0usize;
    let mut last = 0;
    let mut i = 0;

    while i < bytes.len() {
        let rest = &bytes[i..];
        if rest.starts_with(b"\\begin{") {
            env += 1;
            i += "\\begin{".len();
            depth += 1;
            continue;
        }
        if rest.starts_with(b"\\end{") {
            env = env.saturating_sub(1);
            i += "\\end{".len();
            depth += 1;
            continue;
        }
        // Separators are ASCII, so `i` is a char boundary here.
        if depth == 0 && env == 0 && rest.starts_with(sep.as_bytes()) {
            parts.push(&text[last..i]);
            i += sep.len();
            last = i;
            continue;
        }
        match bytes[i] {
            b'\\' => {
                i += 2;
                continue;
            }
            b'{' => depth += 1,
            b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
        i += 1;
    }
    parts.push(&text[last.min(text.len())..]);
    parts
}

/// Split a grid spec into its rows.
pub(crate) fn split_rows(spec: &str) -> Vec<&str> {
    split_top_level(spec, "\\\\")
}

/// Split one row into its cells.
pub(crate) fn split_cells(row: &str) -> Vec<&str> {
    split_top_level(row, "&")
}

/// Find the `}` closing a group whose body starts at `from`.
pub(crate) fn matching_brace(text: &str, from: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                i += 2;
                continue;
            }
            b'{' => depth += 1,
            b'}' if depth == 0 => return Some(i),
            b'}' => depth -= 1,
            _ => {}
        }
        i += 1;
    }
    None
}

/// If `text` is exactly `\command{...}`, return the braced body.
pub(crate) fn strip_command<'a>(text: &'a str, command: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(command)?.strip_prefix('{')?;
    let end = matching_brace(rest, 0)?;
    if end + 1 == rest.len() {
        Some(&rest[..end])
    } else {
        None
    }
}

/// Content of a cell with its layout directives peeled off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellSpec {
    /// Remaining cell content, trimmed
    pub content: String,
    /// Columns covered, at least 1
    pub col_span: usize,
    /// Rows covered, at least 1
    pub row_span: usize,
    /// `\nbb`: suppress the rule below this cell
    pub no_bottom: bool,
    /// `\nrb`: suppress the rule right of this cell
    pub no_right: bool,
}

fn merge_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\\merge(right|lower)\[\s*(\d+)\s*\]\{").unwrap())
}

fn border_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\\(nbb|nrb)\b").unwrap())
}

/// Parse the merge and border directives of one raw cell.
///
/// `\mergeright[N]{body}` and `\mergelower[M]{body}` are replaced by their
/// body; `\nbb` and `\nrb` are removed. A span of zero counts as one and
/// a span too large for `usize` saturates; callers check [`MAX_SPAN`].
pub(crate) fn parse_cell(raw: &str) -> CellSpec {
    let mut text = raw.to_string();
    let mut col_span = 1;
    let mut row_span = 1;

    while let Some(caps) = merge_regex().captures(&text) {
        let Some((start, open_end)) = caps.get(0).map(|m| (m.start(), m.end())) else {
            break;
        };
        let horizontal = &caps[1] == "right";
        let n = caps[2].parse::<usize>().unwrap_or(usize::MAX).max(1);
        let Some(end) = matching_brace(&text, open_end) else {
            log::debug!("unclosed merge directive in cell: {}", raw);
            break;
        };
        if horizontal {
            col_span = n;
        } else {
            row_span = n;
        }
        let body = text[open_end..end].to_string();
        text.replace_range(start..end + 1, &body);
    }

    let mut no_bottom = false;
    let mut no_right = false;
    for caps in border_regex().captures_iter(&text) {
        match &caps[1] {
            "nbb" => no_bottom = true,
            _ => no_right = true,
        }
    }
    let text = border_regex().replace_all(&text, "");

    CellSpec {
        content: text.trim().to_string(),
        col_span,
        row_span,
        no_bottom,
        no_right,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_rows_and_cells() {
        let spec = r"A & B \\ C & D & E";
        let rows = split_rows(spec);
        assert_eq!(rows, vec!["A & B ", " C & D & E"]);
        assert_eq!(split_cells(rows[1]), vec![" C ", " D ", " E"]);
    }

    #[test]
    fn test_separators_inside_environments_are_ignored() {
        let spec = r"\begin{pmatrix}1 & 2 \\ 3 & 4\end{pmatrix} & x \\ y";
        let rows = split_rows(spec);
        assert_eq!(rows.len(), 2);
        assert_eq!(split_cells(rows[0]).len(), 2);
    }

    #[test]
    fn test_separators_inside_braces_are_ignored() {
        assert_eq!(split_cells(r"\text{a & b} & c"), vec![r"\text{a & b} ", " c"]);
        assert_eq!(split_cells(r"a \& b"), vec![r"a \& b"]);
    }

    #[test]
    fn test_non_ascii_cells() {
        let spec = r"α & \text{Größe} \\ \é & \mergeright[2]{ß}";
        let rows = split_rows(spec);
        assert_eq!(rows, vec![r"α & \text{Größe} ", r" \é & \mergeright[2]{ß}"]);
        assert_eq!(split_cells(rows[0]), vec!["α ", r" \text{Größe} "]);
        assert_eq!(split_cells(rows[1]), vec![r" \é ", r" \mergeright[2]{ß}"]);
        assert_eq!(strip_command(r"\text{Größe}", r"\text"), Some("Größe"));
    }

    #[test]
    fn test_strip_command() {
        assert_eq!(strip_command(r"\text{x{y}}", r"\text"), Some("x{y}"));
        assert_eq!(strip_command(r"\text{x} y", r"\text"), None);
        assert_eq!(strip_command("x", r"\text"), None);
    }

    #[test]
    fn test_parse_cell_directives() {
        let cell = parse_cell(r" \mergeright[2]{B} ");
        assert_eq!(cell.content, "B");
        assert_eq!(cell.col_span, 2);
        assert_eq!(cell.row_span, 1);

        let cell = parse_cell(r"\mergelower[3]{\mergeright[2]{x^2}} \nbb \nrb");
        assert_eq!(cell.content, "x^2");
        assert_eq!((cell.col_span, cell.row_span), (2, 3));
        assert!(cell.no_bottom && cell.no_right);
    }

    #[test]
    fn test_parse_cell_zero_span() {
        let cell = parse_cell(r"\mergeright[0]{A}");
        assert_eq!(cell.col_span, 1);
    }

    #[test]
    fn test_parse_cell_oversized_span_saturates() {
        let cell = parse_cell(r"\mergeright[100000000000000000000000]{A}");
        assert_eq!(cell.content, "A");
        assert_eq!(cell.col_span, usize::MAX);
        assert!(cell.col_span > MAX_SPAN);
    }

    #[test]
    fn test_plain_cell() {
        let cell = parse_cell(" x + y ");
        assert_eq!(cell.content, "x + y");
        assert!(!cell.no_bottom && !cell.no_right);
    }
}
