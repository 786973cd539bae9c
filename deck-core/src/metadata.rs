//! Serializable description of a finished plan, handed to the metadata sink
//! and to preview tooling. Built once from a [`Plan`]; page order is kept as
//! planned.

use serde::{Deserialize, Serialize};

use crate::model::{CardRef, Catalog, LayoutMode};
use crate::parity::{ParityGroup, parity_groups};
use crate::planner::Plan;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CardEntry {
    Card {
        set_id: String,
        index: usize,
        label: String,
    },
    Placeholder,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotEntry {
    pub slot: usize,
    pub card: CardEntry,
    pub stack: usize,
    pub cell: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageEntry {
    /// 1-based print position.
    pub page: usize,
    pub slots: Vec<SlotEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupEntry {
    pub sets: Vec<Option<String>>,
    pub first_page: usize,
    pub page_count: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutMetadata {
    pub mode: LayoutMode,
    pub parity: usize,
    pub copies: usize,
    pub slot_count: usize,
    pub slice_size: usize,
    pub cells_per_page: usize,
    pub page_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell_stack_groups: Option<Vec<Vec<Option<String>>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parity_groups: Option<Vec<ParityGroup>>,
    pub groups: Vec<GroupEntry>,
    pub pages: Vec<PageEntry>,
}

impl LayoutMetadata {
    pub fn from_plan(plan: &Plan, catalog: &Catalog) -> Self {
        let set_name = |m: &Option<usize>| m.and_then(|s| catalog.set(s)).map(|s| s.id.clone());
        let groups: Vec<GroupEntry> = plan
            .groups
            .iter()
            .map(|g| GroupEntry {
                sets: g.members.iter().map(set_name).collect(),
                first_page: g.first_page,
                page_count: g.page_count,
            })
            .collect();

        let space = plan.parity_space();
        let pages = plan
            .pages
            .iter()
            .enumerate()
            .map(|(p, page)| PageEntry {
                page: p + 1,
                slots: page
                    .slots
                    .iter()
                    .enumerate()
                    .map(|(slot, r)| {
                        let coord = space.coord(slot);
                        SlotEntry {
                            slot,
                            card: card_entry(r, catalog),
                            stack: coord.stack,
                            cell: coord.cell,
                        }
                    })
                    .collect(),
            })
            .collect();

        let g = plan.geometry;
        let (cell_stack_groups, parity_groups) = match plan.config.mode {
            LayoutMode::CellStack => (Some(groups.iter().map(|e| e.sets.clone()).collect()), None),
            LayoutMode::Naive => (None, parity_groups(g.slot_count, g.slice_size, g.parity)),
        };

        LayoutMetadata {
            mode: plan.config.mode,
            parity: g.parity,
            copies: plan.config.copies,
            slot_count: g.slot_count,
            slice_size: g.slice_size,
            cells_per_page: plan.cells_per_page(),
            page_count: plan.page_count(),
            cell_stack_groups,
            parity_groups,
            groups,
            pages,
        }
    }
}

fn card_entry(r: &CardRef, catalog: &Catalog) -> CardEntry {
    match r {
        CardRef::Card(pos) => {
            let set = &catalog.sets[pos.set];
            CardEntry::Card {
                set_id: set.id.clone(),
                index: pos.index,
                label: set.cards.get(pos.card).cloned().unwrap_or_default(),
            }
        }
        CardRef::Placeholder => CardEntry::Placeholder,
    }
}
