//! Document-level types.

use serde::{Deserialize, Serialize};

use super::{Block, ImageBlock, ImagePayload, ImageTable, Paragraph};

/// A structured document: an ordered list of blocks plus the image payloads
/// those blocks reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Blocks in document order
    pub blocks: Vec<Block>,

    /// Image payloads referenced by image blocks and figure cells
    pub resources: ImageTable,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self {
            blocks: Vec::new(),
            resources: ImageTable::new(),
        }
    }

    /// Create a document from blocks.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self {
            blocks,
            resources: ImageTable::new(),
        }
    }

    /// Add a block to the document.
    pub fn add_block(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Add a paragraph to the document.
    pub fn add_paragraph(&mut self, paragraph: Paragraph) {
        self.blocks.push(Block::Paragraph(paragraph));
    }

    /// Add an image block together with its payload.
    pub fn add_image(&mut self, image: ImageBlock, payload: ImagePayload) {
        self.resources.insert(image.id.clone(), payload);
        self.blocks.push(Block::Image(image));
    }

    /// Add a resource to the document.
    pub fn add_resource(&mut self, id: impl Into<String>, payload: ImagePayload) {
        self.resources.insert(id, payload);
    }

    /// Get a resource by ID.
    pub fn get_resource(&self, id: &str) -> Option<&ImagePayload> {
        self.resources.get(id)
    }

    /// Get the number of blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Check if the document has any blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterate over image blocks.
    pub fn images(&self) -> impl Iterator<Item = &ImageBlock> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Image(image) => Some(image),
            _ => None,
        })
    }

    /// Get plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(|block| block.plain_text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
