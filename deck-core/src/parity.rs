//! Parity space: where each slot lands once a sheet is cut into `N` equal
//! bands and the bands are stacked band 0 on top.
//!
//! The coordinates depend only on slot geometry, never on the layout mode, so
//! a naive layout can be checked against a prospective cut as well.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::model::Page;

/// Position of a slot after cutting: which band, and where inside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParityCoord {
    pub stack: usize,
    pub cell: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParitySpace {
    slot_count: usize,
    parity: usize,
}

impl ParitySpace {
    pub fn new(slot_count: usize, parity: usize) -> Result<Self, ConfigurationError> {
        if slot_count == 0 {
            return Err(ConfigurationError::NoSlots);
        }
        if parity == 0 {
            return Err(ConfigurationError::ZeroParity);
        }
        if slot_count % parity != 0 {
            return Err(ConfigurationError::ParityMismatch {
                slots: slot_count,
                parity,
            });
        }
        Ok(ParitySpace { slot_count, parity })
    }

    /// For geometry that already passed planner validation.
    pub(crate) fn validated(slot_count: usize, parity: usize) -> Self {
        ParitySpace { slot_count, parity }
    }

    pub fn parity(&self) -> usize {
        self.parity
    }

    /// Slots per band.
    pub fn cells(&self) -> usize {
        self.slot_count / self.parity
    }

    pub fn coord(&self, slot: usize) -> ParityCoord {
        let cells = self.cells();
        ParityCoord {
            stack: slot / cells,
            cell: slot % cells,
        }
    }

    /// Inverse of [`coord`](Self::coord).
    pub fn slot(&self, coord: ParityCoord) -> usize {
        coord.stack * self.cells() + coord.cell
    }

    pub fn annotate(&self, page: &Page) -> Vec<ParityCoord> {
        debug_assert_eq!(page.len(), self.slot_count);
        (0..page.len()).map(|i| self.coord(i)).collect()
    }
}

/// Annotates one page with `(stack, cell)` per slot.
pub fn annotate(
    slot_count: usize,
    parity: usize,
    page: &Page,
) -> Result<Vec<ParityCoord>, ConfigurationError> {
    Ok(ParitySpace::new(slot_count, parity)?.annotate(page))
}

/// Rows covered by one band when the cut runs between template rows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParityGroup {
    pub stack: usize,
    pub rows: Range<usize>,
}

/// Row-to-band mapping, `rows_per_stack = rows / parity`.
///
/// `None` when the bands would split a row.
pub fn parity_groups(slot_count: usize, slice: usize, parity: usize) -> Option<Vec<ParityGroup>> {
    if slice == 0 || parity == 0 || slot_count % slice != 0 {
        return None;
    }
    let rows = slot_count / slice;
    if rows % parity != 0 {
        return None;
    }
    let per_stack = rows / parity;
    Some(
        (0..parity)
            .map(|stack| ParityGroup {
                stack,
                rows: stack * per_stack..(stack + 1) * per_stack,
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CardRef;

    fn blank(slots: usize) -> Page {
        Page {
            slots: vec![CardRef::Placeholder; slots],
        }
    }

    #[test]
    fn single_band_keeps_slot_order() {
        let coords = annotate(6, 1, &blank(6)).unwrap();
        for (i, c) in coords.iter().enumerate() {
            assert_eq!(*c, ParityCoord { stack: 0, cell: i });
        }
    }

    #[test]
    fn two_bands_split_the_page_in_half() {
        let space = ParitySpace::new(40, 2).unwrap();
        assert_eq!(space.cells(), 20);
        assert_eq!(space.coord(0), ParityCoord { stack: 0, cell: 0 });
        assert_eq!(space.coord(19), ParityCoord { stack: 0, cell: 19 });
        assert_eq!(space.coord(20), ParityCoord { stack: 1, cell: 0 });
        assert_eq!(space.coord(39), ParityCoord { stack: 1, cell: 19 });
        for i in 0..40 {
            assert_eq!(space.slot(space.coord(i)), i);
        }
    }

    #[test]
    fn rejects_uneven_bands() {
        assert_eq!(
            ParitySpace::new(10, 3),
            Err(ConfigurationError::ParityMismatch {
                slots: 10,
                parity: 3
            })
        );
        assert_eq!(ParitySpace::new(10, 0), Err(ConfigurationError::ZeroParity));
    }

    #[test]
    fn row_groups_follow_rows_per_stack() {
        let groups = parity_groups(24, 3, 2).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].rows, 0..4);
        assert_eq!(groups[1].rows, 4..8);
        assert!(parity_groups(12, 4, 2).is_none());
    }
}
