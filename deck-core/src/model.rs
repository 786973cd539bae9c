use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// One category of cards: an identifier plus its cards in print order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSet {
    pub id: String,
    #[serde(default)]
    pub cards: Vec<String>,
}

impl CardSet {
    pub fn new(id: impl Into<String>, cards: impl IntoIterator<Item = impl Into<String>>) -> Self {
        CardSet {
            id: id.into(),
            cards: cards.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Ordered sets discovered for one generation run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub sets: Vec<CardSet>,
}

impl Catalog {
    pub fn new(sets: Vec<CardSet>) -> Self {
        Catalog { sets }
    }

    pub fn set(&self, idx: usize) -> Option<&CardSet> {
        self.sets.get(idx)
    }

    /// Total number of cards before copy expansion.
    pub fn card_count(&self) -> usize {
        self.sets.iter().map(CardSet::len).sum()
    }
}

/// Slot geometry read from a template.
///
/// `lanes` optionally designates, per slot, which member of a set group feeds
/// that slot in naive mode. `None` means a single lane for the whole sheet.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotGeometry {
    pub slot_count: usize,
    pub slice_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lanes: Option<Vec<usize>>,
}

impl SlotGeometry {
    pub fn new(slot_count: usize, slice_size: Option<usize>) -> Self {
        SlotGeometry {
            slot_count,
            slice_size,
            lanes: None,
        }
    }

    pub fn with_lanes(mut self, lanes: Vec<usize>) -> Self {
        self.lanes = Some(lanes);
        self
    }

    /// Cards per row. A template without a slice annotation is one long row.
    pub fn slice(&self) -> usize {
        self.slice_size.unwrap_or(self.slot_count)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutMode {
    #[default]
    Naive,
    CellStack,
}

impl LayoutMode {
    pub fn as_str(self) -> &'static str {
        match self {
            LayoutMode::Naive => "naive",
            LayoutMode::CellStack => "cell-stack",
        }
    }
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutMode {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "naive" => Ok(LayoutMode::Naive),
            "cell-stack" | "cell_stack" | "cellstack" => Ok(LayoutMode::CellStack),
            other => Err(ConfigurationError::UnknownMode(other.to_string())),
        }
    }
}

/// Per-request layout parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Number of bands each sheet is cut into (`N`).
    pub parity: usize,
    pub mode: LayoutMode,
    pub copies: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            parity: 1,
            mode: LayoutMode::Naive,
            copies: 1,
        }
    }
}

/// A concrete card placed in a slot.
///
/// `index` points into the copy-expanded sequence of the set; `card` is the
/// position in the original sequence and `copy` which repetition it belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardPos {
    pub set: usize,
    pub index: usize,
    pub card: usize,
    pub copy: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CardRef {
    Card(CardPos),
    Placeholder,
}

impl CardRef {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, CardRef::Placeholder)
    }

    pub fn card(&self) -> Option<&CardPos> {
        match self {
            CardRef::Card(pos) => Some(pos),
            CardRef::Placeholder => None,
        }
    }
}

/// One printed sheet: exactly one reference per template slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub slots: Vec<CardRef>,
}

impl Page {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn cards(&self) -> impl Iterator<Item = (usize, &CardPos)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.card().map(|c| (i, c)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_defaults_to_slot_count() {
        let g = SlotGeometry::new(12, None);
        assert_eq!(g.slice(), 12);
        let g = SlotGeometry::new(12, Some(4));
        assert_eq!(g.slice(), 4);
    }

    #[test]
    fn mode_parses_both_spellings() {
        assert_eq!("naive".parse::<LayoutMode>(), Ok(LayoutMode::Naive));
        assert_eq!("Cell-Stack".parse::<LayoutMode>(), Ok(LayoutMode::CellStack));
        assert_eq!("cell_stack".parse::<LayoutMode>(), Ok(LayoutMode::CellStack));
        assert!(matches!(
            "zigzag".parse::<LayoutMode>(),
            Err(ConfigurationError::UnknownMode(_))
        ));
    }

    #[test]
    fn card_ref_serializes_with_kind_tag() {
        let r = CardRef::Card(CardPos {
            set: 1,
            index: 4,
            card: 1,
            copy: 1,
        });
        let v = serde_json::to_value(r).unwrap();
        assert_eq!(v["kind"], "card");
        assert_eq!(v["index"], 4);
        let p = serde_json::to_value(CardRef::Placeholder).unwrap();
        assert_eq!(p, serde_json::json!({ "kind": "placeholder" }));
    }
}
