//! Lightweight XML document model for `AndroidManifest.xml`.
//!
//! Manifests are small, so the whole file is parsed into an owned element
//! tree up front. Each element records the line/column where its tag was
//! parsed so findings can point back into the file.

use anyhow::{Context, Result};
use quick_xml::events::Event;
use quick_xml::Reader;

/// A single XML attribute, with the prefix kept in the name
/// (e.g. `android:exported`).
#[derive(Debug, Clone)]
pub struct XmlAttr {
    pub name: String,
    pub value: String,
}

/// An XML element with its attributes and child elements.
#[derive(Debug, Clone)]
pub struct XmlElement {
    pub name: String,
    pub attrs: Vec<XmlAttr>,
    pub children: Vec<XmlElement>,
    /// Line of the opening tag (1-indexed).
    pub line: usize,
    /// Column of the opening tag (1-indexed).
    pub column: usize,
}

impl XmlElement {
    fn new(name: String, line: usize, column: usize) -> Self {
        Self {
            name,
            attrs: Vec::new(),
            children: Vec::new(),
            line,
            column,
        }
    }

    /// Value of an attribute in the `android:` namespace, matched by its
    /// local name regardless of the prefix the manifest chose.
    pub fn android_attr(&self, local: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| match a.name.split_once(':') {
                Some((_, l)) => l == local,
                None => false,
            })
            .map(|a| a.value.as_str())
    }

    /// Direct children with the given tag name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Run `f` on this element and every descendant, pre-order.
    pub fn for_each<'a>(&'a self, f: &mut impl FnMut(&'a XmlElement)) {
        f(self);
        for child in &self.children {
            child.for_each(f);
        }
    }
}

/// A parsed manifest.
#[derive(Debug, Clone)]
pub struct ManifestDocument {
    pub root: XmlElement,
}

impl ManifestDocument {
    /// Parse manifest content into an element tree.
    pub fn parse(content: &str) -> Result<Self> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);

        let line_starts: Vec<usize> = std::iter::once(0)
            .chain(content.match_indices('\n').map(|(i, _)| i + 1))
            .collect();

        let pos_to_line_col = |pos: u64| -> (usize, usize) {
            let pos = pos as usize;
            let line = line_starts.partition_point(|&start| start <= pos);
            let col = pos - line_starts.get(line.saturating_sub(1)).unwrap_or(&0) + 1;
            (line, col)
        };

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    let (line, col) = pos_to_line_col(reader.buffer_position());
                    let element = Self::element_from_tag(&e, line, col)?;
                    stack.push(element);
                }
                Ok(Event::Empty(e)) => {
                    let (line, col) = pos_to_line_col(reader.buffer_position());
                    let element = Self::element_from_tag(&e, line, col)?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None if root.is_none() => root = Some(element),
                        None => {}
                    }
                }
                Ok(Event::End(_)) => {
                    if let Some(done) = stack.pop() {
                        match stack.last_mut() {
                            Some(parent) => parent.children.push(done),
                            None if root.is_none() => root = Some(done),
                            None => {}
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    let (line, _) = pos_to_line_col(reader.buffer_position());
                    return Err(e).with_context(|| format!("XML parse error at line {}", line));
                }
            }
            buf.clear();
        }

        let root = root.context("manifest has no root element")?;
        Ok(Self { root })
    }

    fn element_from_tag(
        tag: &quick_xml::events::BytesStart<'_>,
        line: usize,
        column: usize,
    ) -> Result<XmlElement> {
        let name = String::from_utf8_lossy(tag.name().as_ref()).to_string();
        let mut element = XmlElement::new(name, line, column);
        for attr in tag.attributes() {
            let attr = attr.context("malformed attribute")?;
            element.attrs.push(XmlAttr {
                name: String::from_utf8_lossy(attr.key.as_ref()).to_string(),
                value: attr
                    .unescape_value()
                    .map(|v| v.to_string())
                    .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).to_string()),
            });
        }
        Ok(element)
    }
}
