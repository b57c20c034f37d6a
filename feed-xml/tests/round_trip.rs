use std::fs::{self, File};
use std::path::PathBuf;

use feed_xml::{parse, write, write_to, WriteOptions, XmlNode};
use pretty_assertions::assert_eq;

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(path)
}

#[test]
fn parse_write_parse_round_trip_preserves_tree_shape() {
    let bytes = fs::read(fixture("fixtures/mailFilters.xml")).expect("read fixture");
    let first = parse(&bytes).expect("initial parse");

    let written = write(&first).expect("write should succeed");
    let second = parse(&written).expect("re-parse should succeed");

    assert_eq!(first, second);
}

#[test]
fn write_emits_declaration_and_preserves_attribute_order() {
    let node = XmlNode::new("feed")
        .with_attr("xmlns", "http://www.w3.org/2005/Atom")
        .with_attr("xmlns:apps", "http://schemas.google.com/apps/2006")
        .with_child(
            XmlNode::new("apps:property")
                .with_attr("value", "x")
                .with_attr("name", "label"),
        );

    let text = String::from_utf8(write(&node).expect("write")).expect("utf8");
    assert!(text.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
    assert!(text.contains(r#"<apps:property value="x" name="label"/>"#));
    assert!(text.ends_with('\n'));
}

#[test]
fn write_to_file_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let out_path = dir.path().join("feed.xml");

    let node = XmlNode::new("feed")
        .with_child(XmlNode::new("title").with_text("Mail Filters & more"))
        .with_child(XmlNode::new("content"));
    let file = File::create(&out_path).expect("create output");
    write_to(file, &node, WriteOptions::default()).expect("write_to should succeed");

    let reparsed = parse(&fs::read(&out_path).expect("read back")).expect("re-parse");
    assert_eq!(node, reparsed);
}

#[test]
fn compact_layout_skips_declaration_and_indentation() {
    let node = XmlNode::new("entry")
        .with_child(XmlNode::new("category").with_attr("term", "filter"))
        .with_child(XmlNode::new("title").with_text("Mail Filter"));
    let options = WriteOptions {
        indent: 0,
        declaration: false,
    };

    let mut bytes = Vec::new();
    write_to(&mut bytes, &node, options).expect("write");
    assert_eq!(
        String::from_utf8(bytes).expect("utf8"),
        "<entry><category term=\"filter\"/><title>Mail Filter</title></entry>\n"
    );
}
