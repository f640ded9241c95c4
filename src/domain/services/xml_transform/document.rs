//! Whitespace-preserving XML document model
//!
//! Elements are parsed into a small tree; every other token (text,
//! comments, CDATA, declarations) is kept verbatim so an untouched document
//! serialises back byte for byte. Start tags remember their original text
//! until their attributes change.

use std::fmt::Write as _;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Error raised while parsing XML.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} (near byte {position})")]
pub struct XmlError {
    pub message: String,
    pub position: u64,
}

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    /// Any non-element token, exactly as it appeared in the source.
    Raw(String),
}

impl XmlNode {
    pub fn as_element(&self) -> Option<&XmlElement> {
        match self {
            XmlNode::Element(e) => Some(e),
            XmlNode::Raw(_) => None,
        }
    }

    fn is_whitespace(&self) -> bool {
        matches!(self, XmlNode::Raw(s) if !s.is_empty() && s.chars().all(char::is_whitespace))
    }
}

/// An attribute whose value is kept in its escaped source form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<XmlAttribute>,
    pub(crate) children: Vec<XmlNode>,
    self_closing: bool,
    raw_start: Option<String>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            self_closing: true,
            raw_start: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &[XmlAttribute] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Set (or add) an attribute; the start tag is regenerated on output.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        self.raw_start = None;
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value.to_string(),
            None => self.attributes.push(XmlAttribute {
                name: name.to_string(),
                value: value.to_string(),
            }),
        }
    }

    /// Remove an attribute, returning whether it existed.
    pub fn remove_attribute(&mut self, name: &str) -> bool {
        let before = self.attributes.len();
        self.attributes.retain(|a| a.name != name);
        let removed = self.attributes.len() != before;
        if removed {
            self.raw_start = None;
        }
        removed
    }

    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(XmlNode::as_element)
    }

    /// Append a child element, reusing the sibling indentation when the
    /// element already has element children.
    pub fn append_child(&mut self, child: XmlElement) {
        if self.self_closing {
            self.self_closing = false;
            self.raw_start = None;
        }

        let last_element = self
            .children
            .iter()
            .rposition(|n| matches!(n, XmlNode::Element(_)));

        let indent = last_element
            .and_then(|i| i.checked_sub(1))
            .map(|i| &self.children[i])
            .filter(|n| n.is_whitespace())
            .cloned();

        let closing_whitespace = self.children.last().is_some_and(XmlNode::is_whitespace);

        match (indent, closing_whitespace) {
            (Some(indent), true) => {
                let at = self.children.len() - 1;
                self.children.insert(at, XmlNode::Element(child));
                self.children.insert(at, indent);
            }
            (Some(indent), false) => {
                self.children.push(indent);
                self.children.push(XmlNode::Element(child));
            }
            (None, _) => self.children.push(XmlNode::Element(child)),
        }
    }

    /// Remove the child node at `index`, along with the whitespace that
    /// indents it.
    pub fn remove_child(&mut self, index: usize) {
        if index >= self.children.len() {
            return;
        }
        self.children.remove(index);
        if index > 0 && self.children[index - 1].is_whitespace() {
            self.children.remove(index - 1);
        }
    }

    fn write_to(&self, out: &mut String) {
        let empty = self.self_closing && self.children.is_empty();
        match &self.raw_start {
            Some(raw) => out.push_str(raw),
            None => {
                out.push('<');
                out.push_str(&self.name);
                for attr in &self.attributes {
                    let quote = if attr.value.contains('"') { '\'' } else { '"' };
                    let _ = write!(out, " {}={quote}{}{quote}", attr.name, attr.value);
                }
                out.push_str(if empty { " />" } else { ">" });
            }
        }
        if empty {
            return;
        }
        for child in &self.children {
            child.write_to(out);
        }
        let _ = write!(out, "</{}>", self.name);
    }
}

impl XmlNode {
    fn write_to(&self, out: &mut String) {
        match self {
            XmlNode::Element(e) => e.write_to(out),
            XmlNode::Raw(raw) => out.push_str(raw),
        }
    }
}

/// A parsed XML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    nodes: Vec<XmlNode>,
}

impl XmlDocument {
    /// Parse a document, keeping all formatting.
    pub fn parse(source: &str) -> Result<Self, XmlError> {
        let mut reader = Reader::from_str(source);
        reader.config_mut().trim_text(false);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut nodes: Vec<XmlNode> = Vec::new();

        loop {
            let event = reader.read_event().map_err(|e| XmlError {
                message: e.to_string(),
                position: reader.buffer_position() as u64,
            })?;
            let position = reader.buffer_position() as u64;

            let node = match event {
                Event::Start(start) => {
                    stack.push(element_from(&start, false, position)?);
                    continue;
                }
                Event::End(_) => match stack.pop() {
                    Some(element) => XmlNode::Element(element),
                    None => {
                        return Err(XmlError {
                            message: "closing tag without an open element".to_string(),
                            position,
                        })
                    }
                },
                Event::Empty(start) => XmlNode::Element(element_from(&start, true, position)?),
                Event::Text(text) => XmlNode::Raw(utf8(&text, position)?.to_string()),
                Event::CData(cdata) => {
                    XmlNode::Raw(format!("<![CDATA[{}]]>", utf8(&cdata, position)?))
                }
                Event::Comment(comment) => {
                    XmlNode::Raw(format!("<!--{}-->", utf8(&comment, position)?))
                }
                Event::Decl(decl) => XmlNode::Raw(format!("<?{}?>", utf8(&decl, position)?)),
                Event::PI(pi) => XmlNode::Raw(format!("<?{}?>", utf8(&pi, position)?)),
                Event::DocType(doctype) => XmlNode::Raw(format!(
                    "<!DOCTYPE {}>",
                    utf8(&doctype, position)?.trim_start()
                )),
                Event::Eof => break,
            };

            match stack.last_mut() {
                Some(parent) => parent.children.push(node),
                None => nodes.push(node),
            }
        }

        if let Some(open) = stack.last() {
            return Err(XmlError {
                message: format!("element <{}> is never closed", open.name),
                position: source.len() as u64,
            });
        }

        if !nodes.iter().any(|n| matches!(n, XmlNode::Element(_))) {
            return Err(XmlError {
                message: "document has no root element".to_string(),
                position: 0,
            });
        }

        Ok(Self { nodes })
    }

    pub fn root(&self) -> Option<&XmlElement> {
        self.nodes.iter().find_map(XmlNode::as_element)
    }

    pub fn root_mut(&mut self) -> Option<&mut XmlElement> {
        self.nodes.iter_mut().find_map(|n| match n {
            XmlNode::Element(e) => Some(e),
            XmlNode::Raw(_) => None,
        })
    }

    /// Serialise the document.
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            node.write_to(&mut out);
        }
        out
    }
}

fn element_from(start: &BytesStart<'_>, empty: bool, position: u64) -> Result<XmlElement, XmlError> {
    let name = utf8(start.name().as_ref(), position)?.to_string();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| XmlError {
            message: e.to_string(),
            position,
        })?;
        attributes.push(XmlAttribute {
            name: utf8(attr.key.as_ref(), position)?.to_string(),
            value: utf8(&attr.value, position)?.to_string(),
        });
    }

    let inner = utf8(start, position)?;
    let raw_start = if empty {
        format!("<{inner}/>")
    } else {
        format!("<{inner}>")
    };

    Ok(XmlElement {
        name,
        attributes,
        children: Vec::new(),
        self_closing: empty,
        raw_start: Some(raw_start),
    })
}

fn utf8(bytes: &[u8], position: u64) -> Result<&str, XmlError> {
    std::str::from_utf8(bytes).map_err(|e| XmlError {
        message: e.to_string(),
        position,
    })
}
