//! Ranked tokenizer for one line of flat text.
//!
//! Each rule pairs a matcher (where is my next occurrence?) with a builder
//! (what token does it become?). At every step the rule whose match starts
//! earliest wins; on equal starts the higher-ranked rule wins. Text between
//! matches is emitted as plain text. Every rule's next match is cached and
//! only recomputed once the cursor has moved past it, so a line is scanned
//! in linear time no matter how many rules there are.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

use crate::model::{CodeLang, Mark};

/// A lexical token of flat text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Unmatched text
    Text(&'a str),
    /// `$latex$`
    Math(&'a str),
    /// `\keyword{text}` for a mark keyword
    Marked(Mark, &'a str),
    /// `\lang{percent-encoded code}`
    Code(CodeLang, &'a str),
    /// `\includegraphics{id percent-encoded-caption}`
    Image(&'a str),
}

impl Token<'_> {
    /// Check if this token is plain text made only of whitespace.
    pub fn is_blank(&self) -> bool {
        matches!(self, Token::Text(t) if t.trim().is_empty())
    }
}

/// A token together with the source text it was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spanned<'a> {
    /// The token
    pub token: Token<'a>,
    /// Source text of the whole token, delimiters included
    pub raw: &'a str,
}

/// Where a rule matched: the whole token and its payload.
#[derive(Debug, Clone)]
struct Found {
    span: Range<usize>,
    body: Range<usize>,
}

enum Matcher {
    /// `$...$`
    Math,
    /// `\keyword{` with a brace-balanced body
    Mark { mark: Mark, open: String },
    /// `\keyword{` with a brace-free payload
    Payload(Regex),
}

enum Builder {
    Math,
    Mark(Mark),
    Code(CodeLang),
    Image,
}

struct Rule {
    matcher: Matcher,
    builder: Builder,
}

impl Rule {
    fn find(&self, line: &str, from: usize) -> Option<Found> {
        match &self.matcher {
            Matcher::Math => find_math(line, from),
            Matcher::Mark { open, .. } => find_mark(line, from, open),
            Matcher::Payload(re) => {
                let caps = re.captures_at(line, from)?;
                let whole = caps.get(0)?;
                let body = caps.get(1)?;
                Some(Found {
                    span: whole.range(),
                    body: body.range(),
                })
            }
        }
    }

    fn build<'a>(&self, body: &'a str) -> Token<'a> {
        match self.builder {
            Builder::Math => Token::Math(body),
            Builder::Mark(mark) => Token::Marked(mark, body),
            Builder::Code(lang) => Token::Code(lang, body),
            Builder::Image => Token::Image(body),
        }
    }

    fn name(&self) -> &str {
        match &self.matcher {
            Matcher::Math => "$",
            Matcher::Mark { mark, .. } => mark.keyword(),
            Matcher::Payload(re) => re.as_str(),
        }
    }
}

fn payload_rule(keyword: &str, builder: Builder) -> Rule {
    let pattern = format!(r"\\{}\{{([^{{}}]*)\}}", regex::escape(keyword));
    Rule {
        matcher: Matcher::Payload(Regex::new(&pattern).expect("payload pattern is valid")),
        builder,
    }
}

/// The ranked rule list: math, marks (longest keyword first), code
/// languages, then images.
fn rules() -> &'static [Rule] {
    static RULES: OnceLock<Vec<Rule>> = OnceLock::new();
    RULES.get_or_init(|| {
        let mut rules = vec![Rule {
            matcher: Matcher::Math,
            builder: Builder::Math,
        }];

        let mut marks = Mark::ALL.to_vec();
        marks.sort_by_key(|m| std::cmp::Reverse(m.keyword().len()));
        rules.extend(marks.into_iter().map(|mark| Rule {
            matcher: Matcher::Mark {
                mark,
                open: format!("\\{}{{", mark.keyword()),
            },
            builder: Builder::Mark(mark),
        }));

        rules.extend(
            CodeLang::ALL
                .into_iter()
                .map(|lang| payload_rule(lang.keyword(), Builder::Code(lang))),
        );
        rules.push(payload_rule("includegraphics", Builder::Image));
        rules
    })
}

fn find_math(line: &str, from: usize) -> Option<Found> {
    let start = from + line[from..].find('$')?;
    let close = start + 1 + line[start + 1..].find('$')?;
    Some(Found {
        span: start..close + 1,
        body: start + 1..close,
    })
}

/// Find `\keyword{...}` with a balanced body.
///
/// A nested `\keyword{` inside a candidate body aborts that candidate and
/// the search restarts at the nested invocation, so two invocations of the
/// same keyword never fuse into one match.
fn find_mark(line: &str, from: usize, open: &str) -> Option<Found> {
    let bytes = line.as_bytes();
    let mut search = from;
    'candidates: loop {
        let start = search + line[search..].find(open)?;
        let body_start = start + open.len();
        let mut depth = 0usize;
        let mut i = body_start;
        while i < bytes.len() {
            if bytes[i..].starts_with(open.as_bytes()) {
                search = i;
                continue 'candidates;
            }
            match bytes[i] {
                b'\\' if matches!(bytes.get(i + 1), Some(b'{') | Some(b'}')) => {
                    i += 2;
                    continue;
                }
                b'{' => depth += 1,
                b'}' if depth == 0 => {
                    return Some(Found {
                        span: start..i + 1,
                        body: body_start..i,
                    });
                }
                b'}' => depth -= 1,
                _ => {}
            }
            i += 1;
        }
        return None;
    }
}

#[derive(Debug, Clone)]
enum Cached {
    Unknown,
    Missing,
    At(Found),
}

/// Iterator over the tokens of one line.
pub struct Tokenizer<'a> {
    line: &'a str,
    cursor: usize,
    cache: Vec<Cached>,
    pending: Option<Spanned<'a>>,
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer over a single line.
    pub fn new(line: &'a str) -> Self {
        Self {
            line,
            cursor: 0,
            cache: vec![Cached::Unknown; rules().len()],
            pending: None,
        }
    }

    fn next_match(&mut self) -> Option<(usize, Found)> {
        let mut best: Option<(usize, Found)> = None;
        for (rank, rule) in rules().iter().enumerate() {
            let stale = match &self.cache[rank] {
                Cached::Unknown => true,
                Cached::Missing => false,
                Cached::At(found) => found.span.start < self.cursor,
            };
            if stale {
                self.cache[rank] = match rule.find(self.line, self.cursor) {
                    Some(found) => Cached::At(found),
                    None => Cached::Missing,
                };
            }
            if let Cached::At(found) = &self.cache[rank] {
                let earlier = best
                    .as_ref()
                    .map_or(true, |(_, b)| found.span.start < b.span.start);
                if earlier {
                    best = Some((rank, found.clone()));
                }
            }
        }
        best
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Spanned<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(pending) = self.pending.take() {
            return Some(pending);
        }
        if self.cursor >= self.line.len() {
            return None;
        }

        let start = self.cursor;
        let Some((rank, found)) = self.next_match() else {
            self.cursor = self.line.len();
            let rest = &self.line[start..];
            return Some(Spanned {
                token: Token::Text(rest),
                raw: rest,
            });
        };

        let rule = &rules()[rank];
        log::trace!("rule {} matched at {}", rule.name(), found.span.start);
        let token = Spanned {
            token: rule.build(&self.line[found.body.clone()]),
            raw: &self.line[found.span.clone()],
        };
        self.cursor = found.span.end;

        if found.span.start > start {
            self.pending = Some(token);
            let text = &self.line[start..found.span.start];
            Some(Spanned {
                token: Token::Text(text),
                raw: text,
            })
        } else {
            Some(token)
        }
    }
}

/// Tokenize a line into a vector.
pub fn tokenize(line: &str) -> Vec<Token<'_>> {
    Tokenizer::new(line).map(|s| s.token).collect()
}
