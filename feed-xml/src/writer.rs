use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use thiserror::Error;

use crate::tree::XmlNode;

/// Errors that can occur while writing XML from an [`XmlNode`] tree.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Failed to serialize XML bytes.
    #[error("failed to write XML: {0}")]
    Xml(#[from] quick_xml::Error),
    /// The sink rejected the output.
    #[error("failed to write XML output: {0}")]
    Io(#[from] std::io::Error),
}

/// Layout of a written document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Spaces per nesting level. Zero keeps the whole document on one line.
    pub indent: usize,
    /// Start with `<?xml version="1.0" encoding="UTF-8"?>`.
    pub declaration: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            declaration: true,
        }
    }
}

/// Serialize an [`XmlNode`] tree with [`WriteOptions::default`].
pub fn write(node: &XmlNode) -> Result<Vec<u8>, WriteError> {
    let mut bytes = Vec::new();
    write_to(&mut bytes, node, WriteOptions::default())?;
    Ok(bytes)
}

/// Serialize an [`XmlNode`] tree into `sink`. The document ends with a
/// newline.
pub fn write_to<W: Write>(
    sink: W,
    node: &XmlNode,
    options: WriteOptions,
) -> Result<(), WriteError> {
    let mut writer = if options.indent == 0 {
        Writer::new(sink)
    } else {
        Writer::new_with_indent(sink, b' ', options.indent)
    };

    if options.declaration {
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    }
    write_element(&mut writer, node)?;

    writer.into_inner().write_all(b"\n")?;
    Ok(())
}

fn write_element<W: Write>(writer: &mut Writer<W>, node: &XmlNode) -> Result<(), WriteError> {
    let start = BytesStart::new(node.tag.as_str()).with_attributes(
        node.attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str())),
    );

    if node.text.is_none() && node.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    if let Some(text) = &node.text {
        writer.write_event(Event::Text(BytesText::new(text)))?;
    }
    for child in &node.children {
        write_element(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(node.tag.as_str())))?;
    Ok(())
}
