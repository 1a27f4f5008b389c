//! Document model types for the flat-text transcoder.
//!
//! This module defines the in-memory representation shared by the
//! serializer, the parser and the LaTeX emitter. The model is a flat list
//! of blocks; inline content lives inside paragraphs and captions.

mod block;
mod document;
mod paragraph;
mod resource;

pub use block::{Block, CodeBlock, CodeLang, GridBlock, GridKind, ImageBlock};
pub use document::Document;
pub use paragraph::{
    inline_plain_text, is_placeholder_only, Inline, Mark, MathNode, Paragraph, TextRun, PLACEHOLDER,
};
pub use resource::{ImagePayload, ImageTable};
