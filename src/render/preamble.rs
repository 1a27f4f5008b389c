//! Fixed document preamble and postamble for emitted LaTeX.

use crate::model::Mark;

const PACKAGES: &str = r"\documentclass{article}
\usepackage[utf8]{inputenc}
\usepackage{amsmath}
\usepackage{amssymb}
\usepackage{amsthm}
\usepackage{graphicx}
\usepackage{subcaption}
\usepackage{multirow}
\usepackage{listings}
\usepackage{xcolor}
\usepackage{hyperref}
\usepackage[margin=1in]{geometry}
";

const LISTINGS: &str = r#"\lstdefinelanguage{JavaScript}{
  keywords={async, await, break, case, catch, class, const, continue, default, delete, do, else, export, extends, false, finally, for, function, if, import, in, instanceof, let, new, null, return, switch, this, throw, true, try, typeof, undefined, var, void, while, yield},
  sensitive=true,
  comment=[l]{//},
  morecomment=[s]{/*}{*/},
  morestring=[b]',
  morestring=[b]",
  morestring=[b]`
}
\lstset{
  basicstyle=\ttfamily\small,
  keywordstyle=\color{blue},
  commentstyle=\color{gray},
  stringstyle=\color{red!60!black},
  breaklines=true,
  frame=single
}
"#;

/// Everything before the document body.
pub(crate) fn preamble() -> String {
    let mut out = String::from(PACKAGES);
    out.push('\n');
    out.push_str(&theorem_definitions());
    out.push('\n');
    out.push_str(LISTINGS);
    out.push_str("\n\\begin{document}\n\n");
    out
}

/// `\newtheorem` lines for every theorem-like mark, numbered together.
fn theorem_definitions() -> String {
    let mut out = String::new();
    let mut style = "plain";
    for mark in Mark::ALL.into_iter().filter(|m| m.is_theorem_like()) {
        let wanted = match mark {
            Mark::Definition => "definition",
            Mark::Remark => "remark",
            _ => "plain",
        };
        if wanted != style {
            out.push_str(&format!("\\theoremstyle{{{}}}\n", wanted));
            style = wanted;
        }
        let title = title_case(mark.name());
        if mark == Mark::Theorem {
            out.push_str(&format!("\\newtheorem{{{}}}{{{}}}\n", mark.keyword(), title));
        } else {
            out.push_str(&format!(
                "\\newtheorem{{{}}}[theorem]{{{}}}\n",
                mark.keyword(),
                title
            ));
        }
    }
    out
}

fn title_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Everything after the document body.
pub(crate) fn postamble(bibliography: Option<(&str, &str)>) -> String {
    let mut out = String::new();
    if let Some((style, name)) = bibliography {
        out.push_str(&format!("\\bibliographystyle{{{}}}\n\\bibliography{{{}}}\n\n", style, name));
    }
    out.push_str("\\end{document}\n");
    out
}
