//! Layout planner: turns slot geometry and a catalog into the ordered pages
//! that, once cut into bands and restacked, leave each set in one ordered pile.
//!
//! Two modes exist:
//! - naive: every slot is fed by a fixed lane (by default one lane covering the
//!   whole sheet), cards flow through a lane in `(stack, page, cell)` order;
//! - cell-stack: each band position holds one set, and consecutive card runs
//!   are spread across the bands so the restacked pile reads in order.
//!
//! Planning is pure and total once [`validate`] passes.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::chunk::{ceil_div, chunk_padded, expanded_len, source_of};
use crate::error::ConfigurationError;
use crate::model::{CardPos, CardRef, Catalog, LayoutConfig, LayoutMode, Page, SlotGeometry};
use crate::parity::{ParityCoord, ParitySpace};

/// Geometry after validation, with the slice size resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolved {
    pub slot_count: usize,
    pub slice_size: usize,
    pub parity: usize,
}

impl Resolved {
    pub fn cells(&self) -> usize {
        self.slot_count / self.parity
    }
}

/// Consecutive sets planned together onto a contiguous page range.
///
/// `members` is padded with `None` up to the group width.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetGroup {
    pub members: Vec<Option<usize>>,
    pub first_page: usize,
    pub page_count: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub geometry: Resolved,
    pub config: LayoutConfig,
    pub pages: Vec<Page>,
    pub groups: Vec<SetGroup>,
}

impl Plan {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn cells_per_page(&self) -> usize {
        self.geometry.cells()
    }

    pub fn parity_space(&self) -> ParitySpace {
        ParitySpace::validated(self.geometry.slot_count, self.geometry.parity)
    }

    /// `(stack, cell)` for every slot of every page, in page order.
    pub fn annotations(&self) -> Vec<Vec<ParityCoord>> {
        let space = self.parity_space();
        self.pages.iter().map(|p| space.annotate(p)).collect()
    }
}

/// Checks every precondition in a fixed order and reports the first failure.
pub fn validate(
    geometry: &SlotGeometry,
    catalog: &Catalog,
    config: &LayoutConfig,
) -> Result<Resolved, ConfigurationError> {
    let slots = geometry.slot_count;
    if slots == 0 {
        return Err(ConfigurationError::NoSlots);
    }
    let slice = geometry.slice();
    if slice == 0 {
        return Err(ConfigurationError::ZeroSliceSize);
    }
    if slots % slice != 0 {
        return Err(ConfigurationError::SliceMismatch { slots, slice });
    }
    let parity = config.parity;
    if parity == 0 {
        return Err(ConfigurationError::ZeroParity);
    }
    if parity > 1 {
        if slots % parity != 0 {
            return Err(ConfigurationError::ParityMismatch { slots, parity });
        }
        let rows = slots / slice;
        if config.mode == LayoutMode::Naive && rows % parity != 0 {
            return Err(ConfigurationError::RowParityMismatch {
                rows,
                slots,
                slice,
                parity,
            });
        }
    }
    if config.copies == 0 {
        return Err(ConfigurationError::ZeroCopies);
    }
    if catalog.sets.is_empty() {
        return Err(ConfigurationError::EmptyCatalog);
    }
    let copies = config.copies;
    if let Some(set) = catalog.sets.iter().find(|s| s.len().checked_mul(copies).is_none()) {
        return Err(ConfigurationError::CopiesOverflow {
            copies,
            len: set.len(),
        });
    }
    Ok(Resolved {
        slot_count: slots,
        slice_size: slice,
        parity,
    })
}

/// Plans the full page sequence. Identical inputs always give identical plans.
pub fn plan(
    geometry: &SlotGeometry,
    catalog: &Catalog,
    config: &LayoutConfig,
) -> Result<Plan, ConfigurationError> {
    let resolved = validate(geometry, catalog, config)?;
    let (pages, groups) = match config.mode {
        LayoutMode::Naive => {
            let lanes = resolve_lanes(geometry, &resolved)?;
            plan_naive(&resolved, &lanes, catalog, config.copies)
        }
        LayoutMode::CellStack => plan_cell_stack(&resolved, catalog, config.copies),
    };
    info!(
        mode = %config.mode,
        parity = config.parity,
        copies = config.copies,
        pages = pages.len(),
        groups = groups.len(),
        placeholders = pages
            .iter()
            .flat_map(|p| &p.slots)
            .filter(|r| r.is_placeholder())
            .count(),
        "layout planned"
    );
    Ok(Plan {
        geometry: resolved,
        config: *config,
        pages,
        groups,
    })
}

fn card_at(catalog: &Catalog, set: Option<usize>, index: usize, copies: usize) -> CardRef {
    let Some(set) = set else {
        return CardRef::Placeholder;
    };
    let len = catalog.sets[set].len();
    match source_of(index, len, copies) {
        Some((card, copy)) => CardRef::Card(CardPos {
            set,
            index,
            card,
            copy,
        }),
        None => CardRef::Placeholder,
    }
}

fn member_len(catalog: &Catalog, member: Option<usize>, copies: usize) -> usize {
    member.map_or(0, |s| expanded_len(catalog.sets[s].len(), copies))
}

// ── naive ───────────────────────────────────────────────────────────────────

/// Lane table for naive mode. Without one, every slot shares lane 0, so each
/// set fills whole pages in slot order before the next set starts.
fn resolve_lanes(
    geometry: &SlotGeometry,
    resolved: &Resolved,
) -> Result<Vec<usize>, ConfigurationError> {
    let slots = resolved.slot_count;
    let lanes = match &geometry.lanes {
        Some(lanes) => lanes.clone(),
        None => vec![0; slots],
    };
    if lanes.len() != slots {
        return Err(ConfigurationError::LaneTableLength {
            len: lanes.len(),
            slots,
        });
    }
    if let Some(&lane) = lanes.iter().find(|&&l| l >= slots) {
        return Err(ConfigurationError::LaneOutOfRange { lane, slots });
    }
    let max = lanes.iter().copied().max().unwrap_or(0);
    let mut used = vec![false; max + 1];
    for &l in &lanes {
        used[l] = true;
    }
    if let Some(lane) = used.iter().position(|u| !u) {
        return Err(ConfigurationError::EmptyLane { lane, max });
    }
    Ok(lanes)
}

/// Where a slot sits inside its lane: `index = before * pages + page * stride + rank`.
#[derive(Clone, Copy, Debug)]
struct LaneSlot {
    lane: usize,
    before: usize,
    stride: usize,
    rank: usize,
}

fn lane_slots(resolved: &Resolved, lanes: &[usize], lane_count: usize) -> Vec<LaneSlot> {
    let cells = resolved.cells();
    // per_stack[lane][stack] = number of lane slots in that band
    let mut per_stack = vec![vec![0usize; resolved.parity]; lane_count];
    let mut ranks = Vec::with_capacity(lanes.len());
    for (i, &lane) in lanes.iter().enumerate() {
        let stack = i / cells;
        ranks.push(per_stack[lane][stack]);
        per_stack[lane][stack] += 1;
    }
    lanes
        .iter()
        .enumerate()
        .map(|(i, &lane)| {
            let stack = i / cells;
            LaneSlot {
                lane,
                before: per_stack[lane][..stack].iter().sum(),
                stride: per_stack[lane][stack],
                rank: ranks[i],
            }
        })
        .collect()
}

fn plan_naive(
    resolved: &Resolved,
    lanes: &[usize],
    catalog: &Catalog,
    copies: usize,
) -> (Vec<Page>, Vec<SetGroup>) {
    let lane_count = lanes.iter().copied().max().map_or(0, |m| m + 1);
    let mut lane_size = vec![0usize; lane_count];
    for &l in lanes {
        lane_size[l] += 1;
    }
    let layout = lane_slots(resolved, lanes, lane_count);

    let mut pages = Vec::new();
    let mut groups = Vec::new();
    for (gi, members) in chunk_padded(catalog.sets.len(), lane_count)
        .into_iter()
        .enumerate()
    {
        let page_count = members
            .iter()
            .zip(&lane_size)
            .map(|(&m, &size)| ceil_div(member_len(catalog, m, copies), size))
            .max()
            .unwrap_or(0);
        debug!(group = gi, ?members, pages = page_count, "naive group");

        let first_page = pages.len();
        for p in 0..page_count {
            let slots = layout
                .iter()
                .map(|ls| {
                    let index = ls.before * page_count + p * ls.stride + ls.rank;
                    card_at(catalog, members[ls.lane], index, copies)
                })
                .collect();
            pages.push(Page { slots });
        }
        groups.push(SetGroup {
            members,
            first_page,
            page_count,
        });
    }
    (pages, groups)
}

// ── cell-stack ──────────────────────────────────────────────────────────────

fn plan_cell_stack(
    resolved: &Resolved,
    catalog: &Catalog,
    copies: usize,
) -> (Vec<Page>, Vec<SetGroup>) {
    let cells = resolved.cells();
    let parity = resolved.parity;

    let mut pages = Vec::new();
    let mut groups = Vec::new();
    for (gi, members) in chunk_padded(catalog.sets.len(), cells)
        .into_iter()
        .enumerate()
    {
        let longest = members
            .iter()
            .map(|&m| member_len(catalog, m, copies))
            .max()
            .unwrap_or(0);
        let limit = ceil_div(longest, parity);
        debug!(group = gi, longest, pages = limit, "cell-stack group");

        let first_page = pages.len();
        for p in 0..limit {
            let slots = (0..resolved.slot_count)
                .map(|i| {
                    let set_idx = i % cells;
                    let stack_idx = i / cells;
                    card_at(catalog, members[set_idx], p + stack_idx * limit, copies)
                })
                .collect();
            pages.push(Page { slots });
        }
        groups.push(SetGroup {
            members,
            first_page,
            page_count: limit,
        });
    }
    (pages, groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CardSet;

    fn catalog(lens: &[usize]) -> Catalog {
        Catalog::new(
            lens.iter()
                .enumerate()
                .map(|(s, &n)| CardSet::new(format!("set{s}"), (0..n).map(|c| format!("c{c}"))))
                .collect(),
        )
    }

    fn cfg(parity: usize, mode: LayoutMode, copies: usize) -> LayoutConfig {
        LayoutConfig {
            parity,
            mode,
            copies,
        }
    }

    fn at(set: usize, index: usize) -> CardRef {
        CardRef::Card(CardPos {
            set,
            index,
            card: index,
            copy: 0,
        })
    }

    #[test]
    fn rejects_parity_that_does_not_divide_slots() {
        let err = plan(
            &SlotGeometry::new(10, None),
            &catalog(&[1]),
            &cfg(3, LayoutMode::CellStack, 1),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::ParityMismatch {
                slots: 10,
                parity: 3
            }
        );
    }

    #[test]
    fn rejects_zero_slice() {
        let err = plan(
            &SlotGeometry::new(10, Some(0)),
            &catalog(&[1]),
            &LayoutConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err, ConfigurationError::ZeroSliceSize);
    }

    #[test]
    fn reports_first_violation_only() {
        // slice mismatch comes before the parity and copies checks
        let err = plan(
            &SlotGeometry::new(10, Some(4)),
            &Catalog::default(),
            &cfg(3, LayoutMode::Naive, 0),
        )
        .unwrap_err();
        assert_eq!(err, ConfigurationError::SliceMismatch { slots: 10, slice: 4 });
    }

    #[test]
    fn rejects_remaining_preconditions() {
        let g = SlotGeometry::new(12, Some(4));
        assert_eq!(
            plan(&g, &catalog(&[1]), &cfg(0, LayoutMode::Naive, 1)),
            Err(ConfigurationError::ZeroParity)
        );
        assert_eq!(
            plan(&g, &catalog(&[1]), &cfg(1, LayoutMode::Naive, 0)),
            Err(ConfigurationError::ZeroCopies)
        );
        assert_eq!(
            plan(&g, &Catalog::default(), &LayoutConfig::default()),
            Err(ConfigurationError::EmptyCatalog)
        );
        assert_eq!(
            plan(&SlotGeometry::new(0, None), &catalog(&[1]), &LayoutConfig::default()),
            Err(ConfigurationError::NoSlots)
        );
    }

    #[test]
    fn naive_rows_must_split_evenly_but_cell_stack_need_not() {
        // 12 slots, 4 per row: 3 rows cannot be cut into 2 bands of rows
        let g = SlotGeometry::new(12, Some(4));
        assert_eq!(
            plan(&g, &catalog(&[2]), &cfg(2, LayoutMode::Naive, 1)),
            Err(ConfigurationError::RowParityMismatch {
                rows: 3,
                slots: 12,
                slice: 4,
                parity: 2
            })
        );
        assert!(plan(&g, &catalog(&[2]), &cfg(2, LayoutMode::CellStack, 1)).is_ok());
    }

    #[test]
    fn cell_stack_scenario_forty_slots_two_bands() {
        let plan = plan(
            &SlotGeometry::new(40, Some(5)),
            &catalog(&[3; 20]),
            &cfg(2, LayoutMode::CellStack, 1),
        )
        .unwrap();
        assert_eq!(plan.cells_per_page(), 20);
        assert_eq!(plan.page_count(), 2);
        assert_eq!(plan.pages[0].slots[0], at(0, 0));
        assert_eq!(plan.pages[0].slots[20], at(0, 2));
        assert_eq!(plan.pages[1].slots[0], at(0, 1));
        assert_eq!(plan.pages[1].slots[20], CardRef::Placeholder);
        assert_eq!(plan.pages[0].slots[7], at(7, 0));
        assert_eq!(plan.pages[1].slots[27], CardRef::Placeholder);
    }

    #[test]
    fn cell_stack_pads_short_last_group() {
        let plan = plan(
            &SlotGeometry::new(4, Some(2)),
            &catalog(&[2, 2, 1]),
            &cfg(2, LayoutMode::CellStack, 1),
        )
        .unwrap();
        assert_eq!(plan.groups.len(), 2);
        assert_eq!(plan.groups[1].members, vec![Some(2), None]);
        assert_eq!(plan.groups[1].first_page, 1);
        // group 1: only set 2 with a single card
        let last = &plan.pages[1];
        assert_eq!(
            last.slots,
            vec![at(2, 0), CardRef::Placeholder, CardRef::Placeholder, CardRef::Placeholder]
        );
    }

    #[test]
    fn cell_stack_interleaves_copies() {
        let cat = Catalog::new(vec![CardSet::new("abc", ["a", "b", "c"])]);
        let plan = plan(
            &SlotGeometry::new(1, None),
            &cat,
            &cfg(1, LayoutMode::CellStack, 2),
        )
        .unwrap();
        let seq: Vec<usize> = plan
            .pages
            .iter()
            .map(|p| p.slots[0].card().unwrap().card)
            .collect();
        assert_eq!(seq, vec![0, 1, 2, 0, 1, 2]);
    }

    #[test]
    fn naive_single_band_is_plain_row_order() {
        // each set fills pages in slot order and the next set starts a new page
        let plan = plan(
            &SlotGeometry::new(4, Some(2)),
            &catalog(&[3, 1]),
            &LayoutConfig::default(),
        )
        .unwrap();
        assert_eq!(plan.page_count(), 2);
        assert_eq!(
            plan.pages[0].slots,
            vec![at(0, 0), at(0, 1), at(0, 2), CardRef::Placeholder]
        );
        assert_eq!(
            plan.pages[1].slots,
            vec![at(1, 0), CardRef::Placeholder, CardRef::Placeholder, CardRef::Placeholder]
        );
        for coords in plan.annotations() {
            for (i, c) in coords.iter().enumerate() {
                assert_eq!(*c, ParityCoord { stack: 0, cell: i });
            }
        }
    }

    #[test]
    fn naive_without_slice_fills_one_page_per_set() {
        let plan = plan(
            &SlotGeometry::new(4, None),
            &catalog(&[4, 6]),
            &LayoutConfig::default(),
        )
        .unwrap();
        assert_eq!(plan.page_count(), 3);
        assert_eq!(plan.pages[0].slots, vec![at(0, 0), at(0, 1), at(0, 2), at(0, 3)]);
        assert_eq!(plan.pages[1].slots, vec![at(1, 0), at(1, 1), at(1, 2), at(1, 3)]);
        assert_eq!(
            plan.pages[2].slots,
            vec![at(1, 4), at(1, 5), CardRef::Placeholder, CardRef::Placeholder]
        );
    }

    #[test]
    fn naive_bands_fill_top_band_across_pages_first() {
        // one column, four rows, two bands: the top band runs through every page
        // before the bottom band starts
        let plan = plan(
            &SlotGeometry::new(4, Some(1)),
            &catalog(&[6]),
            &cfg(2, LayoutMode::Naive, 1),
        )
        .unwrap();
        assert_eq!(plan.page_count(), 2);
        assert_eq!(plan.pages[0].slots, vec![at(0, 0), at(0, 1), at(0, 4), at(0, 5)]);
        assert_eq!(
            plan.pages[1].slots,
            vec![at(0, 2), at(0, 3), CardRef::Placeholder, CardRef::Placeholder]
        );
    }

    #[test]
    fn naive_uses_supplied_lane_table() {
        let g = SlotGeometry::new(4, Some(2)).with_lanes(vec![0, 0, 0, 0]);
        let plan = plan(&g, &catalog(&[5, 2]), &LayoutConfig::default()).unwrap();
        // one lane, so one set per group
        assert_eq!(plan.groups.len(), 2);
        assert_eq!(plan.groups[0].page_count, 2);
        assert_eq!(plan.groups[1].page_count, 1);
        assert_eq!(plan.pages[1].slots[0], at(0, 4));
        assert_eq!(plan.pages[2].slots[..2], [at(1, 0), at(1, 1)]);
    }

    #[test]
    fn naive_rejects_bad_lane_tables() {
        let short = SlotGeometry::new(4, None).with_lanes(vec![0, 1]);
        assert_eq!(
            plan(&short, &catalog(&[1]), &LayoutConfig::default()),
            Err(ConfigurationError::LaneTableLength { len: 2, slots: 4 })
        );
        let gap = SlotGeometry::new(4, None).with_lanes(vec![0, 2, 2, 0]);
        assert_eq!(
            plan(&gap, &catalog(&[1]), &LayoutConfig::default()),
            Err(ConfigurationError::EmptyLane { lane: 1, max: 2 })
        );
    }

    #[test]
    fn naive_rejects_lanes_beyond_slot_count() {
        let huge = SlotGeometry::new(4, None).with_lanes(vec![0, 0, 0, usize::MAX]);
        assert_eq!(
            plan(&huge, &catalog(&[1]), &LayoutConfig::default()),
            Err(ConfigurationError::LaneOutOfRange {
                lane: usize::MAX,
                slots: 4
            })
        );
        let past = SlotGeometry::new(4, None).with_lanes(vec![0, 1, 2, 4]);
        assert_eq!(
            plan(&past, &catalog(&[1]), &LayoutConfig::default()),
            Err(ConfigurationError::LaneOutOfRange { lane: 4, slots: 4 })
        );
    }

    #[test]
    fn rejects_copies_that_overflow_a_set() {
        for mode in [LayoutMode::Naive, LayoutMode::CellStack] {
            assert_eq!(
                plan(
                    &SlotGeometry::new(4, None),
                    &catalog(&[0, 2, 2]),
                    &cfg(1, mode, usize::MAX)
                ),
                Err(ConfigurationError::CopiesOverflow {
                    copies: usize::MAX,
                    len: 2
                })
            );
        }
    }

    #[test]
    fn empty_sets_emit_no_pages() {
        let plan = plan(
            &SlotGeometry::new(4, None),
            &catalog(&[0, 0]),
            &cfg(2, LayoutMode::CellStack, 3),
        )
        .unwrap();
        assert_eq!(plan.page_count(), 0);
        assert_eq!(plan.groups[0].page_count, 0);
    }

    #[test]
    fn planning_is_deterministic() {
        let cat = catalog(&[4, 7, 1, 0, 3]);
        let g = SlotGeometry::new(6, Some(3));
        let c = cfg(2, LayoutMode::Naive, 2);
        assert_eq!(plan(&g, &cat, &c), plan(&g, &cat, &c));
    }
}
