//! Flat-text serialization of a document.
//!
//! Every block becomes exactly one line; lines are joined with `\n`. An
//! empty paragraph is written as a single placeholder character so that it
//! survives hosts that collapse blank lines.

use crate::escape::encode;
use crate::model::{Block, Document, GridKind, Inline, PLACEHOLDER};

/// Serialize a document to flat text.
pub fn to_flat_text(doc: &Document) -> String {
    FlatTextSerializer::new().serialize(doc)
}

/// Serialize inline content (a paragraph body or a caption) to flat text.
pub fn inline_to_flat_text(content: &[Inline]) -> String {
    let mut out = String::new();
    write_inline(&mut out, content);
    out
}

/// Flat-text serializer.
#[derive(Debug, Default)]
pub struct FlatTextSerializer {
    out: String,
}

impl FlatTextSerializer {
    /// Create a new serializer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize a whole document.
    pub fn serialize(mut self, doc: &Document) -> String {
        for (i, block) in doc.blocks.iter().enumerate() {
            if i > 0 {
                self.out.push('\n');
            }
            self.write_block(block);
        }
        self.out
    }

    fn write_block(&mut self, block: &Block) {
        match block {
            Block::Paragraph(p) if p.is_empty() => self.out.push(PLACEHOLDER),
            Block::Paragraph(p) => write_inline(&mut self.out, &p.content),
            Block::Code(code) => {
                self.out.push('\\');
                self.out.push_str(code.lang.keyword());
                self.out.push('{');
                self.out.push_str(&encode(&code.code));
                self.out.push('}');
            }
            Block::Image(image) => {
                self.out.push_str("\\includegraphics{");
                self.out.push_str(&image.id);
                self.out.push(' ');
                self.out.push_str(&encode(&inline_to_flat_text(&image.caption)));
                self.out.push('}');
            }
            Block::Table(grid) => self.write_grid(GridKind::Table, &grid.spec, &grid.caption),
            Block::Figure(grid) => self.write_grid(GridKind::Figure, &grid.spec, &grid.caption),
        }
    }

    fn write_grid(&mut self, kind: GridKind, spec: &str, caption: &[Inline]) {
        self.out.push_str(kind.open());
        self.out.push_str(spec);
        self.out.push_str(kind.close());
        if !caption.is_empty() {
            self.out.push(' ');
            write_inline(&mut self.out, caption);
        }
    }
}

fn write_inline(out: &mut String, content: &[Inline]) {
    for item in content {
        match item {
            Inline::Text(run) => match run.mark {
                Some(mark) => {
                    out.push_str(&mark.to_string());
                    out.push('{');
                    out.push_str(&run.text);
                    out.push('}');
                }
                None => out.push_str(&run.text),
            },
            Inline::Math(math) => {
                out.push('$');
                out.push_str(&math.latex);
                out.push('$');
            }
        }
    }
}
