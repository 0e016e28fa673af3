//! Owned XML element tree built on the quick-xml event API.

use crate::types::{CphdError, CphdResult};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

/// One XML element with its attributes, character data and children
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    name: String,
    namespace: Option<String>,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self { name: name.into(), text: text.into(), ..Default::default() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn set_namespace(&mut self, uri: impl Into<String>) {
        self.namespace = Some(uri.into());
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing value for the same key
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Direct children with the given local name, in document order
    pub fn children_named<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Element> + 'a {
        let name = name.to_string();
        self.children.iter().filter(move |c| c.name == name)
    }

    /// The single direct child named `name`; zero or several matches is an error
    pub fn first_and_only(&self, name: &str) -> CphdResult<&Element> {
        self.optional_child(name)?
            .ok_or_else(|| CphdError::MissingElement { path: name.to_string() })
    }

    /// The direct child named `name` if present; several matches is an error
    pub fn optional_child(&self, name: &str) -> CphdResult<Option<&Element>> {
        let mut matches = self.children_named(name);
        let first = matches.next();
        if matches.next().is_some() {
            return Err(CphdError::DuplicateElement { path: name.to_string() });
        }
        Ok(first)
    }

    pub fn push_child(&mut self, child: Element) -> &mut Element {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Create an empty child element and return it for population
    pub fn new_child(&mut self, name: impl Into<String>) -> &mut Element {
        self.push_child(Element::new(name))
    }

    /// Parse an XML document into its root element
    pub fn parse(bytes: &[u8]) -> CphdResult<Element> {
        let mut reader = Reader::from_reader(bytes);
        reader.trim_text(false);

        let mut buf = Vec::new();
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => stack.push(Self::from_start(e)?),
                Ok(Event::Empty(ref e)) => {
                    let element = Self::from_start(e)?;
                    Self::attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::End(_)) => {
                    let mut element = stack.pop().ok_or_else(|| {
                        CphdError::XmlParsing("unbalanced closing tag".to_string())
                    })?;
                    // Leaf text is kept verbatim, indentation between children is not
                    if !element.children.is_empty() && element.text.trim().is_empty() {
                        element.text.clear();
                    }
                    Self::attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::Text(ref e)) => {
                    let text = e.unescape().map_err(|err| {
                        CphdError::XmlParsing(format!("bad character data: {}", err))
                    })?;
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&text);
                    }
                }
                Ok(Event::CData(ref e)) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&String::from_utf8_lossy(e));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(CphdError::XmlParsing(format!(
                        "error at position {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
                _ => {}
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(CphdError::XmlParsing(format!(
                "document ended inside <{}>",
                stack.last().map(|e| e.name.as_str()).unwrap_or_default()
            )));
        }
        root.ok_or_else(|| CphdError::XmlParsing("document has no root element".to_string()))
    }

    pub fn parse_str(xml: &str) -> CphdResult<Element> {
        Self::parse(xml.as_bytes())
    }

    fn from_start(start: &BytesStart) -> CphdResult<Element> {
        let mut element = Element::new(String::from_utf8_lossy(start.local_name().as_ref()));
        for attr in start.attributes() {
            let attr = attr.map_err(|e| CphdError::XmlParsing(format!("bad attribute: {}", e)))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
            let value = attr
                .unescape_value()
                .map_err(|e| CphdError::XmlParsing(format!("bad attribute value: {}", e)))?
                .to_string();
            if key == "xmlns" {
                element.namespace = Some(value);
            } else if !key.starts_with("xmlns:") {
                let local = String::from_utf8_lossy(attr.key.local_name().as_ref()).to_string();
                element.attributes.push((local, value));
            }
        }
        Ok(element)
    }

    fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> CphdResult<()> {
        match stack.last_mut() {
            Some(parent) => parent.children.push(element),
            None if root.is_none() => *root = Some(element),
            None => {
                return Err(CphdError::XmlParsing(format!(
                    "second root element <{}>",
                    element.name
                )))
            }
        }
        Ok(())
    }

    /// Serialize as an indented document with an XML declaration
    pub fn to_xml_string(&self) -> CphdResult<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(|e| CphdError::XmlSerialization(e.to_string()))?;
        self.write_into(&mut writer)?;
        String::from_utf8(writer.into_inner())
            .map_err(|e| CphdError::XmlSerialization(format!("non UTF-8 output: {}", e)))
    }

    fn write_into<W: std::io::Write>(&self, writer: &mut Writer<W>) -> CphdResult<()> {
        let mut start = BytesStart::new(self.name.as_str());
        if let Some(ns) = &self.namespace {
            start.push_attribute(("xmlns", ns.as_str()));
        }
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.children.is_empty() && self.text.is_empty() {
            return emit(writer, Event::Empty(start));
        }

        emit(writer, Event::Start(start))?;
        if !self.text.is_empty() {
            emit(writer, Event::Text(BytesText::new(&self.text)))?;
        }
        for child in &self.children {
            child.write_into(writer)?;
        }
        emit(writer, Event::End(BytesEnd::new(self.name.as_str())))
    }
}

fn emit<W: std::io::Write>(writer: &mut Writer<W>, event: Event<'_>) -> CphdResult<()> {
    writer
        .write_event(event)
        .map_err(|e| CphdError::XmlSerialization(e.to_string()))
}
