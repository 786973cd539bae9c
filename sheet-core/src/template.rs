//! SVG card templates.
//!
//! A slot is a `<g>` that has no nested group, holds a `<text>` whose content
//! contains the marker `txt` (any case) and an `<image>`. Slots are numbered
//! in document order. A text node containing `(slice=N)` declares `N` cards
//! per row.

use std::fs;
use std::path::{Path, PathBuf};

use deck_core::SlotGeometry;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, SheetError};
use crate::svg::{Document, Element, Node, NodePath};

const LABEL_MARKER: &str = "txt";
const SLICE_TAG: &str = "(slice=";
const LANE_ATTR: &str = "data-lane";

#[derive(Clone, Debug)]
pub struct Slot {
    pub path: NodePath,
    pub id: Option<String>,
    pub lane: Option<usize>,
}

#[derive(Clone, Debug)]
pub struct Template {
    pub source: PathBuf,
    document: Document,
    slots: Vec<Slot>,
    slice_size: Option<usize>,
}

impl Template {
    pub fn load(path: &Path) -> Result<Self> {
        let src = fs::read_to_string(path).map_err(|source| SheetError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let template = Self::parse(&src, path)?;
        info!(
            template = %path.display(),
            slots = template.slot_count(),
            slice = ?template.slice_size,
            "template loaded"
        );
        Ok(template)
    }

    pub fn parse(src: &str, source: &Path) -> Result<Self> {
        let document = Document::parse(src)?;
        let mut slots = Vec::new();
        if let Some((idx, root)) = document.root() {
            find_slots(root, vec![idx], &mut slots)?;
        }
        let slice_size = find_slice(&document)?;
        debug!(slots = slots.len(), ?slice_size, "template parsed");
        Ok(Template {
            source: source.to_path_buf(),
            document,
            slots,
            slice_size,
        })
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slice_size(&self) -> Option<usize> {
        self.slice_size
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Lane table when every slot carries `data-lane`; mixing is rejected.
    pub fn lanes(&self) -> Result<Option<Vec<usize>>> {
        let tagged = self.slots.iter().filter(|s| s.lane.is_some()).count();
        if tagged == 0 {
            return Ok(None);
        }
        if tagged != self.slots.len() {
            return Err(SheetError::Template(format!(
                "{tagged} of {} slots carry {LANE_ATTR}; tag all of them or none",
                self.slots.len()
            )));
        }
        Ok(Some(self.slots.iter().filter_map(|s| s.lane).collect()))
    }

    pub fn geometry(&self) -> Result<SlotGeometry> {
        let geometry = SlotGeometry::new(self.slot_count(), self.slice_size);
        Ok(match self.lanes()? {
            Some(lanes) => geometry.with_lanes(lanes),
            None => geometry,
        })
    }

    pub fn structure(&self) -> TemplateStructure {
        let mut counts = TokenCounts::default();
        let slots = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(position, slot)| {
                let group = self.document.element(&slot.path)?;
                let tokens: Vec<Token> = group
                    .elements()
                    .enumerate()
                    .map(|(i, child)| {
                        let token = Token::of(child, i);
                        counts.add(token.kind);
                        token
                    })
                    .collect();
                Some(SlotStructure {
                    group_id: format!("group_{position:03}"),
                    position,
                    id: slot.id.clone(),
                    lane: slot.lane,
                    token_count: tokens.len(),
                    tokens,
                })
            })
            .collect();
        TemplateStructure {
            source: self.source.display().to_string(),
            slot_count: self.slot_count(),
            slice_size: self.slice_size,
            token_counts: counts,
            slots,
        }
    }
}

pub(crate) fn is_label(el: &Element) -> bool {
    el.is("text") && el.text_content().to_lowercase().contains(LABEL_MARKER)
}

fn is_slot(group: &Element) -> bool {
    if group.elements().any(|c| c.is("g")) {
        return false;
    }
    group.elements().any(is_label) && group.elements().any(|c| c.is("image"))
}

fn find_slots(el: &Element, path: NodePath, out: &mut Vec<Slot>) -> Result<()> {
    for (i, child) in el.children.iter().enumerate() {
        let Node::Element(child) = child else {
            continue;
        };
        if !child.is("g") {
            continue;
        }
        let mut child_path = path.clone();
        child_path.push(i);
        if is_slot(child) {
            let lane = match child.attr(LANE_ATTR) {
                Some(v) => Some(v.trim().parse::<usize>().map_err(|_| {
                    SheetError::Template(format!("invalid {LANE_ATTR} value '{v}'"))
                })?),
                None => None,
            };
            out.push(Slot {
                path: child_path.clone(),
                id: child.attr("id"),
                lane,
            });
        }
        find_slots(child, child_path, out)?;
    }
    Ok(())
}

fn find_slice(doc: &Document) -> Result<Option<usize>> {
    for text in doc.texts() {
        if let Some(n) = parse_slice(&text)? {
            return Ok(Some(n));
        }
    }
    Ok(None)
}

/// Reads `(slice=N)` out of free text.
pub fn parse_slice(text: &str) -> Result<Option<usize>> {
    let Some(start) = text.find(SLICE_TAG) else {
        return Ok(None);
    };
    let rest = &text[start + SLICE_TAG.len()..];
    let Some(end) = rest.find(')') else {
        return Err(SheetError::SliceAnnotation(text[start..].to_string()));
    };
    match rest[..end].trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(Some(n)),
        _ => Err(SheetError::SliceAnnotation(
            text[start..start + SLICE_TAG.len() + end + 1].to_string(),
        )),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Label,
    Image,
    Other,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub content: String,
    pub position: usize,
}

impl Token {
    fn of(el: &Element, position: usize) -> Self {
        let (kind, content) = if el.is("text") {
            let text = el.text_content();
            let kind = if is_label(el) {
                TokenKind::Label
            } else {
                TokenKind::Other
            };
            (kind, text)
        } else if el.is("image") {
            let href = el
                .attr("xlink:href")
                .or_else(|| el.attr("href"))
                .unwrap_or_default();
            (TokenKind::Image, href)
        } else {
            (TokenKind::Other, format!("<{}>", el.name()))
        };
        Token {
            kind,
            content,
            position,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct TokenCounts {
    pub label: usize,
    pub image: usize,
    pub other: usize,
}

impl TokenCounts {
    fn add(&mut self, kind: TokenKind) {
        match kind {
            TokenKind::Label => self.label += 1,
            TokenKind::Image => self.image += 1,
            TokenKind::Other => self.other += 1,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SlotStructure {
    pub group_id: String,
    pub position: usize,
    pub id: Option<String>,
    pub lane: Option<usize>,
    pub token_count: usize,
    pub tokens: Vec<Token>,
}

/// JSON-friendly view of a template, for inspection tooling.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TemplateStructure {
    pub source: String,
    pub slot_count: usize,
    pub slice_size: Option<usize>,
    pub token_counts: TokenCounts,
    pub slots: Vec<SlotStructure>,
}
