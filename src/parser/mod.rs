//! Flat-text parsing module.

mod flat_parser;
mod options;
mod tokens;

pub use flat_parser::{parse_flat_text, parse_inline, FlatTextParser, ParseOutput};
pub use options::{ErrorMode, ParseOptions};
pub use tokens::{tokenize, Spanned, Token, Tokenizer};
