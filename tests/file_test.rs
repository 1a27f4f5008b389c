//! Integration tests for flat-text files on disk.

use plaintext::{
    convert_file, load_file, load_str, save_file, save_string, Block, Document, FlatFile,
    ImageBlock, ImagePayload, Inline, Mark, Paragraph, RenderOptions,
};

fn document_with_image() -> Document {
    let mut doc = Document::new();
    doc.add_paragraph(Paragraph::with_text("See the figure || below."));
    doc.add_image(
        ImageBlock::new("1").with_caption(vec![
            Inline::text("A cat "),
            Inline::marked("cat", Mark::Label),
        ]),
        ImagePayload::new("data:image/png;base64,AAAA").with_title("cat.png"),
    );
    doc
}

#[test]
fn test_save_string_appends_table_only_with_images() {
    let plain = Document::from_blocks(vec![Paragraph::with_text("No images").into()]);
    assert_eq!(save_string(&plain), "No images");

    let contents = save_string(&document_with_image());
    let (text, table) = contents.rsplit_once("||").unwrap();
    assert!(text.ends_with("\\includegraphics{1 A%20cat%20%5Clabel%7Bcat%7D}"));
    assert_eq!(
        table,
        r#"{"1":{"src":"data:image/png;base64,AAAA","title":"cat.png"}}"#
    );
}

#[test]
fn test_separator_inside_text_is_kept() {
    let doc = document_with_image();
    let loaded = load_str(&save_string(&doc)).unwrap();
    assert_eq!(loaded, doc);

    let Block::Paragraph(p) = &loaded.blocks[0] else {
        panic!("expected a paragraph");
    };
    assert_eq!(p.plain_text(), "See the figure || below.");
}

#[test]
fn test_file_round_trip_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");

    let doc = document_with_image();
    save_file(&doc, &path).unwrap();
    assert_eq!(load_file(&path).unwrap(), doc);

    let file = FlatFile::parse(&std::fs::read_to_string(&path).unwrap());
    assert!(file.has_images());
    assert_eq!(file.images.filename("1"), "cat.png");
}

#[test]
fn test_convert_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    save_file(&document_with_image(), &path).unwrap();

    let result = convert_file(&path, &RenderOptions::new().body_only()).unwrap();
    assert!(result.content.contains("{images/cat.png}"));
    assert!(result.content.contains("\\caption{A cat}\n\\label{cat}"));
    assert!(result.is_clean());
}

#[test]
fn test_load_file_missing() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_file(dir.path().join("missing.txt")).unwrap_err();
    assert!(matches!(err, plaintext::Error::Io(_)));
}
