//! Flat-text files with an optional trailing image table.
//!
//! A file is the flat text itself, optionally followed by `||` and a
//! compact JSON object mapping image ids to `{src, title?}`.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::model::{Document, ImageTable};
use crate::parser::{FlatTextParser, ParseOptions, ParseOutput};
use crate::render::to_flat_text;

const TABLE_SEPARATOR: &str = "||";

/// Flat text together with the images it refers to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatFile {
    /// Flat-text body
    pub text: String,

    /// Image side table
    pub images: ImageTable,
}

impl FlatFile {
    /// Create a file from text and an image table.
    pub fn new(text: impl Into<String>, images: ImageTable) -> Self {
        Self {
            text: text.into(),
            images,
        }
    }

    /// Split file contents into text and image table.
    ///
    /// The table is the suffix after the last `||` that parses as an image
    /// table. When no suffix parses, the whole contents are text.
    pub fn parse(contents: &str) -> Self {
        for (idx, _) in contents.rmatch_indices(TABLE_SEPARATOR) {
            let suffix = &contents[idx + TABLE_SEPARATOR.len()..];
            if !suffix.trim_start().starts_with('{') {
                continue;
            }
            match ImageTable::from_json(suffix.trim()) {
                Ok(images) => {
                    log::debug!("found image table with {} entries", images.len());
                    return Self::new(&contents[..idx], images);
                }
                Err(e) => log::debug!("suffix at byte {} is not an image table: {}", idx, e),
            }
        }
        Self::new(contents, ImageTable::new())
    }

    /// Serialize a document and collect its images.
    pub fn from_document(doc: &Document) -> Self {
        Self::new(to_flat_text(doc), doc.resources.clone())
    }

    /// Parse the text into a document with default options.
    pub fn to_document(&self) -> Result<Document> {
        Ok(self.parse_with(ParseOptions::default())?.document)
    }

    /// Parse the text into a document, keeping diagnostics.
    pub fn parse_with(&self, options: ParseOptions) -> Result<ParseOutput> {
        FlatTextParser::with_options(options).parse(&self.text, &self.images)
    }

    /// Check if the file carries any images.
    pub fn has_images(&self) -> bool {
        !self.images.is_empty()
    }
}

impl fmt::Display for FlatFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)?;
        if self.has_images() {
            let json = self.images.to_json().map_err(|_| fmt::Error)?;
            write!(f, "{}{}", TABLE_SEPARATOR, json)?;
        }
        Ok(())
    }
}

/// Load a document from flat-file contents.
pub fn load_str(contents: &str) -> Result<Document> {
    FlatFile::parse(contents).to_document()
}

/// Load a document from a flat-text file on disk.
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let path = path.as_ref();
    log::debug!("loading {}", path.display());
    let contents = fs::read_to_string(path)?;
    load_str(&contents)
}

/// Serialize a document to flat-file contents.
pub fn save_string(doc: &Document) -> String {
    FlatFile::from_document(doc).to_string()
}

/// Write a document to a flat-text file on disk.
pub fn save_file<P: AsRef<Path>>(doc: &Document, path: P) -> Result<()> {
    let path = path.as_ref();
    log::debug!("saving {}", path.display());
    fs::write(path, save_string(doc))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ImageBlock, ImagePayload, Inline, Paragraph};

    fn sample_images() -> ImageTable {
        let mut images = ImageTable::new();
        images.insert("1", ImagePayload::new("data:image/png;base64,AAAA").with_title("cat"));
        images
    }

    #[test]
    fn test_parse_without_table() {
        let file = FlatFile::parse("Hello || world");
        assert_eq!(file.text, "Hello || world");
        assert!(!file.has_images());
    }

    #[test]
    fn test_parse_with_table() {
        let contents = r#"\includegraphics{1 }||{"1":{"src":"data:image/png;base64,AAAA","title":"cat"}}"#;
        let file = FlatFile::parse(contents);
        assert_eq!(file.text, "\\includegraphics{1 }");
        assert_eq!(file.images, sample_images());
    }

    #[test]
    fn test_parse_uses_last_valid_separator() {
        let contents = r#"a || b||{"1":{"src":"x.png"}}"#;
        let file = FlatFile::parse(contents);
        assert_eq!(file.text, "a || b");
        assert_eq!(file.images.len(), 1);
    }

    #[test]
    fn test_parse_rejects_non_table_suffix() {
        let contents = r#"text||{"not": "a table"}"#;
        let file = FlatFile::parse(contents);
        assert_eq!(file.text, contents);
        assert!(file.images.is_empty());
    }

    #[test]
    fn test_display_omits_empty_table() {
        let file = FlatFile::new("plain", ImageTable::new());
        assert_eq!(file.to_string(), "plain");
    }

    #[test]
    fn test_display_then_parse() {
        let file = FlatFile::new("\\includegraphics{1 }", sample_images());
        assert_eq!(FlatFile::parse(&file.to_string()), file);
    }

    #[test]
    fn test_save_and_load_file() {
        let mut doc = Document::new();
        let mut para = Paragraph::new();
        para.push(Inline::text("Hello "));
        para.push(Inline::math("x^2"));
        doc.add_paragraph(para);
        doc.add_image(ImageBlock::new("1"), ImagePayload::new("data:image/png;base64,AAAA"));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        save_file(&doc, &path).unwrap();

        let loaded = load_file(&path).unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_file(dir.path().join("missing.txt")).is_err());
    }
}
