//! Catalog XML parsing.
//!
//! Turns the catalog document into a generic element tree ([`XmlNode`]) with
//! quick-xml. The tree keeps attributes, child elements, and text (including
//! CDATA) and attaches no meaning to any of them; interpretation belongs to
//! [`crate::mapper`].

use std::path::Path;

use anyhow::{bail, Context, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Root element of a catalog document.
pub const CATALOG_ROOT: &str = "Products";
/// Element holding one product record.
pub const PRODUCT_ELEMENT: &str = "Product";

/// A parsed XML element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlNode {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
    /// Text and CDATA directly inside this element, joined in document order
    /// with the outer whitespace stripped. `None` when nothing but whitespace.
    pub text: Option<String>,
}

impl XmlNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First child element with the given name.
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// True when the element is nothing but text: no attributes, no children.
    pub fn is_text_only(&self) -> bool {
        self.attributes.is_empty() && self.children.is_empty()
    }

    fn push_text(&mut self, fragment: &str) {
        match &mut self.text {
            Some(text) => text.push_str(fragment),
            None => self.text = Some(fragment.to_string()),
        }
    }

    fn finish_text(&mut self) {
        if let Some(text) = self.text.take() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                self.text = Some(trimmed.to_string());
            }
        }
    }
}

/// Parse a complete XML document into its root element.
pub fn parse_document(xml: &str) -> Result<XmlNode> {
    // Fragments keep their whitespace; each element trims its joined text on close.
    let mut reader = Reader::from_str(xml);

    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        let event = reader
            .read_event()
            .with_context(|| format!("XML error at byte {}", reader.buffer_position()))?;
        match event {
            Event::Start(e) => stack.push(open_element(&e)?),
            Event::Empty(e) => {
                let node = open_element(&e)?;
                attach(&mut stack, &mut root, node)?;
            }
            Event::End(_) => {
                let mut node = stack.pop().context("closing tag without an open element")?;
                node.finish_text();
                attach(&mut stack, &mut root, node)?;
            }
            Event::Text(t) => {
                if let Some(top) = stack.last_mut() {
                    let text = t.unescape().context("invalid text content")?;
                    top.push_text(&text);
                }
            }
            Event::CData(c) => {
                if let Some(top) = stack.last_mut() {
                    let text = String::from_utf8(c.into_inner().into_owned())
                        .context("CDATA section is not valid UTF-8")?;
                    top.push_text(&text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        bail!("unexpected end of document inside <{}>", open.name);
    }
    root.context("document has no root element")
}

/// Parse a catalog document and return its product records in order.
pub fn parse_catalog(xml: &str) -> Result<Vec<XmlNode>> {
    let root = parse_document(xml)?;
    if root.name != CATALOG_ROOT {
        bail!(
            "expected <{}> root element, found <{}>",
            CATALOG_ROOT,
            root.name
        );
    }
    Ok(root
        .children
        .into_iter()
        .filter(|c| c.name == PRODUCT_ELEMENT)
        .collect())
}

/// Read and parse a catalog file.
pub fn load_catalog(path: &Path) -> Result<Vec<XmlNode>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;
    parse_catalog(&content)
        .with_context(|| format!("Failed to parse catalog file: {}", path.display()))
}

fn open_element(e: &BytesStart<'_>) -> Result<XmlNode> {
    let name = String::from_utf8(e.name().as_ref().to_vec()).context("element name is not UTF-8")?;
    let mut node = XmlNode::new(name);
    for attr in e.attributes() {
        let attr = attr.with_context(|| format!("malformed attribute on <{}>", node.name))?;
        let key = String::from_utf8(attr.key.as_ref().to_vec())
            .context("attribute name is not UTF-8")?;
        let value = attr
            .unescape_value()
            .with_context(|| format!("invalid value for attribute '{}'", key))?
            .into_owned();
        node.attributes.push((key, value));
    }
    Ok(node)
}

fn attach(stack: &mut [XmlNode], root: &mut Option<XmlNode>, node: XmlNode) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    } else if root.is_some() {
        bail!("document has more than one root element");
    } else {
        *root = Some(node);
    }
    Ok(())
}
