//! Image payloads and the side-table that carries them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Payload metadata for one image, as stored in the file trailer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePayload {
    /// Image source, usually a `data:` URL
    pub src: String,

    /// Original filename if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl ImagePayload {
    /// Create a payload from its source.
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            title: None,
        }
    }

    /// Set the title and return self.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// MIME type declared by a `data:` URL source.
    pub fn mime_type(&self) -> Option<&str> {
        let rest = self.src.strip_prefix("data:")?;
        let end = rest.find(|c: char| c == ';' || c == ',')?;
        Some(&rest[..end]).filter(|mime| !mime.is_empty())
    }

    /// Get the file extension based on MIME type.
    pub fn extension(&self) -> &str {
        match self.mime_type() {
            Some("image/jpeg") => "jpg",
            Some("image/png") => "png",
            Some("image/gif") => "gif",
            Some("image/svg+xml") => "svg",
            Some("image/webp") => "webp",
            Some("application/pdf") => "pdf",
            _ => "png",
        }
    }

    /// Get a suggested filename based on title, or id and MIME type.
    pub fn suggested_filename(&self, id: &str) -> String {
        if let Some(ref title) = self.title {
            if !title.trim().is_empty() {
                return title.clone();
            }
        }
        format!("image{}.{}", id, self.extension())
    }
}

/// Image id to payload map, scoped to one load or save.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageTable {
    entries: BTreeMap<String, ImagePayload>,
}

impl ImageTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a table from its JSON object form.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the table as a compact JSON object.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Insert a payload, returning the one it replaced.
    pub fn insert(&mut self, id: impl Into<String>, payload: ImagePayload) -> Option<ImagePayload> {
        self.entries.insert(id.into(), payload)
    }

    /// Get a payload by id.
    pub fn get(&self, id: &str) -> Option<&ImagePayload> {
        self.entries.get(id)
    }

    /// Check whether an id is present.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ImagePayload)> {
        self.entries.iter()
    }

    /// File name to use for an image in typeset output.
    pub fn filename(&self, id: &str) -> String {
        match self.get(id) {
            Some(payload) => payload.suggested_filename(id),
            None => id.to_string(),
        }
    }
}

impl FromIterator<(String, ImagePayload)> for ImageTable {
    fn from_iter<I: IntoIterator<Item = (String, ImagePayload)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_type_from_data_url() {
        let payload = ImagePayload::new("data:image/jpeg;base64,/9j/4AAQ");
        assert_eq!(payload.mime_type(), Some("image/jpeg"));
        assert_eq!(payload.extension(), "jpg");

        let remote = ImagePayload::new("https://example.com/a.png");
        assert_eq!(remote.mime_type(), None);
        assert_eq!(remote.extension(), "png");
    }

    #[test]
    fn test_suggested_filename() {
        let payload = ImagePayload::new("data:image/gif;base64,R0lG").with_title("spin.gif");
        assert_eq!(payload.suggested_filename("3"), "spin.gif");

        let untitled = ImagePayload::new("data:image/gif;base64,R0lG");
        assert_eq!(untitled.suggested_filename("3"), "image3.gif");
    }

    #[test]
    fn test_table_json() {
        let json = r#"{"1":{"src":"data:image/png;base64,AA","title":"a.png"},"2":{"src":"x"}}"#;
        let table = ImageTable::from_json(json).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("1").unwrap().title.as_deref(), Some("a.png"));
        assert_eq!(table.get("2").unwrap().title, None);
        assert_eq!(table.to_json().unwrap(), json);
    }

    #[test]
    fn test_filename_for_unknown_id() {
        let table = ImageTable::new();
        assert_eq!(table.filename("9"), "9");
    }
}
