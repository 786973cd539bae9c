//! Minimal owned SVG tree on top of quick-xml events.
//!
//! Only what template filling needs: walk elements, read and replace
//! attributes, replace text content. Everything else (comments, doctype,
//! processing instructions, entity references) is carried through verbatim.

use std::borrow::Cow;

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, BytesText, Event};

use crate::error::{Result, SheetError};

#[derive(Clone, Debug)]
pub enum Node {
    Element(Element),
    /// Raw, still escaped character data.
    Text(String),
    Other(Event<'static>),
}

#[derive(Clone, Debug)]
pub struct Element {
    start: BytesStart<'static>,
    pub children: Vec<Node>,
    self_closing: bool,
}

fn unescape_lossy(raw: &str) -> String {
    unescape(raw)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| raw.to_string())
}

impl Element {
    pub fn name(&self) -> String {
        String::from_utf8_lossy(self.start.name().as_ref()).into_owned()
    }

    /// Compares the tag name without namespace prefix (`svg:g` is `g`).
    pub fn is(&self, local: &str) -> bool {
        self.start.local_name().as_ref() == local.as_bytes()
    }

    pub fn attr(&self, key: &str) -> Option<String> {
        self.start
            .attributes()
            .with_checks(false)
            .flatten()
            .find(|a| a.key.as_ref() == key.as_bytes())
            .map(|a| unescape_lossy(&String::from_utf8_lossy(&a.value)))
    }

    pub fn has_attr(&self, key: &str) -> bool {
        self.attr(key).is_some()
    }

    /// Sets or replaces one attribute, keeping the others in order.
    pub fn set_attr(&mut self, key: &str, value: &str) {
        let mut start = BytesStart::new(self.name());
        let mut replaced = false;
        for a in self.start.attributes().with_checks(false).flatten() {
            if a.key.as_ref() == key.as_bytes() {
                start.push_attribute((key, value));
                replaced = true;
            } else {
                start.push_attribute((a.key.as_ref(), a.value.as_ref()));
            }
        }
        if !replaced {
            start.push_attribute((key, value));
        }
        self.start = start;
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Concatenated, unescaped text of this element and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out.trim().to_string()
    }

    /// Replaces all children with a single text node.
    pub fn set_text(&mut self, text: &str) {
        let escaped = quick_xml::escape::escape(text).into_owned();
        self.children = vec![Node::Text(escaped)];
        self.self_closing = false;
    }

    fn child_mut(&mut self, idx: usize) -> Option<&mut Element> {
        match self.children.get_mut(idx) {
            Some(Node::Element(e)) => Some(e),
            _ => None,
        }
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for n in nodes {
        match n {
            Node::Text(raw) => out.push_str(&unescape_lossy(raw)),
            Node::Element(e) => collect_text(&e.children, out),
            Node::Other(Event::CData(c)) => out.push_str(&String::from_utf8_lossy(c)),
            Node::Other(_) => {}
        }
    }
}

/// Index path from the document's top-level node list down to an element.
pub type NodePath = Vec<usize>;

#[derive(Clone, Debug, Default)]
pub struct Document {
    pub nodes: Vec<Node>,
}

impl Document {
    pub fn parse(src: &str) -> Result<Self> {
        let mut reader = Reader::from_str(src);
        reader.config_mut().trim_text(false);

        let mut open: Vec<Element> = Vec::new();
        let mut nodes: Vec<Node> = Vec::new();
        loop {
            let node = match reader.read_event()? {
                Event::Start(e) => {
                    open.push(Element {
                        start: e.into_owned(),
                        children: Vec::new(),
                        self_closing: false,
                    });
                    continue;
                }
                Event::End(_) => match open.pop() {
                    Some(el) => Node::Element(el),
                    None => return Err(SheetError::Malformed("unexpected closing tag".into())),
                },
                Event::Empty(e) => Node::Element(Element {
                    start: e.into_owned(),
                    children: Vec::new(),
                    self_closing: true,
                }),
                Event::Text(t) => Node::Text(String::from_utf8_lossy(&t).into_owned()),
                Event::Eof => break,
                other => Node::Other(other.into_owned()),
            };
            match open.last_mut() {
                Some(parent) => parent.children.push(node),
                None => nodes.push(node),
            }
        }
        if let Some(el) = open.last() {
            return Err(SheetError::Malformed(format!(
                "element <{}> is never closed",
                el.name()
            )));
        }
        Ok(Document { nodes })
    }

    /// The outermost element, normally `<svg>`.
    pub fn root(&self) -> Option<(usize, &Element)> {
        self.nodes.iter().enumerate().find_map(|(i, n)| match n {
            Node::Element(e) => Some((i, e)),
            _ => None,
        })
    }

    pub fn element(&self, path: &[usize]) -> Option<&Element> {
        let (first, rest) = path.split_first()?;
        let mut el = match self.nodes.get(*first)? {
            Node::Element(e) => e,
            _ => return None,
        };
        for &i in rest {
            el = match el.children.get(i)? {
                Node::Element(e) => e,
                _ => return None,
            };
        }
        Some(el)
    }

    pub fn element_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let (first, rest) = path.split_first()?;
        let mut el = match self.nodes.get_mut(*first)? {
            Node::Element(e) => e,
            _ => return None,
        };
        for &i in rest {
            el = el.child_mut(i)?;
        }
        Some(el)
    }

    /// Every text node of the document, unescaped, in document order.
    pub fn texts(&self) -> Vec<String> {
        let mut out = Vec::new();
        walk_texts(&self.nodes, &mut out);
        out
    }

    pub fn to_svg_string(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        for n in &self.nodes {
            write_node(&mut writer, n)?;
        }
        Ok(String::from_utf8(writer.into_inner())?)
    }
}

fn walk_texts(nodes: &[Node], out: &mut Vec<String>) {
    for n in nodes {
        match n {
            Node::Text(raw) => out.push(unescape_lossy(raw)),
            Node::Element(e) => walk_texts(&e.children, out),
            Node::Other(_) => {}
        }
    }
}

fn write_node(w: &mut Writer<Vec<u8>>, node: &Node) -> Result<()> {
    match node {
        Node::Element(el) => {
            if el.self_closing && el.children.is_empty() {
                w.write_event(Event::Empty(el.start.borrow()))?;
            } else {
                w.write_event(Event::Start(el.start.borrow()))?;
                for c in &el.children {
                    write_node(w, c)?;
                }
                w.write_event(Event::End(el.start.to_end()))?;
            }
        }
        Node::Text(raw) => w.write_event(Event::Text(BytesText::from_escaped(raw.as_str())))?,
        Node::Other(ev) => w.write_event(ev.borrow())?,
    }
    Ok(())
}
