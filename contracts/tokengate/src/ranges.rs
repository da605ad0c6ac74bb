//! Ordered-disjoint range algebra over closed `u64` intervals.
//!
//! Every set of token ids, ownership times, or transfer times in the engine
//! is a canonical `Vec<UintRange>`: sorted by start, no overlaps, no
//! mergeable adjacencies.

use near_sdk::near;

use crate::constants::{UNIVERSE_END, UNIVERSE_START};
use crate::errors::EngineError;

#[near(serializers = [borsh, json])]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UintRange {
    pub start: u64,
    pub end: u64,
}

impl UintRange {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    pub fn universe() -> Self {
        Self::new(UNIVERSE_START, UNIVERSE_END)
    }

    pub fn contains(&self, value: u64) -> bool {
        self.start <= value && value <= self.end
    }

    pub fn overlap(&self, other: &UintRange) -> Option<UintRange> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start <= end).then_some(UintRange { start, end })
    }
}

pub fn validate_ranges(ranges: &[UintRange]) -> Result<(), EngineError> {
    for range in ranges {
        if range.start > range.end {
            return Err(EngineError::InvalidInput(format!(
                "range start {} exceeds end {}",
                range.start, range.end
            )));
        }
    }
    Ok(())
}

/// Canonical form: sorted by start, touching and overlapping intervals merged.
pub fn sort_and_merge(ranges: &[UintRange]) -> Vec<UintRange> {
    let mut sorted: Vec<UintRange> = ranges.to_vec();
    sorted.sort_by(|a, b| a.start.cmp(&b.start).then(a.end.cmp(&b.end)));

    let mut merged: Vec<UintRange> = Vec::with_capacity(sorted.len());
    for range in sorted {
        match merged.last_mut() {
            // Touching counts as mergeable: [1..3] + [4..5] => [1..5].
            Some(last) if range.start <= last.end.saturating_add(1) => {
                last.end = last.end.max(range.end);
            }
            _ => merged.push(range),
        }
    }
    merged
}

pub fn search(value: u64, ranges: &[UintRange]) -> bool {
    ranges.iter().any(|r| r.contains(value))
}

/// Intersection of two range sets, in canonical form.
pub fn overlaps(left: &[UintRange], right: &[UintRange]) -> Vec<UintRange> {
    let mut out = Vec::new();
    for l in left {
        for r in right {
            if let Some(o) = l.overlap(r) {
                out.push(o);
            }
        }
    }
    sort_and_merge(&out)
}

/// Elements of `from` not covered by `remove`.
pub fn subtract(from: &[UintRange], remove: &[UintRange]) -> Vec<UintRange> {
    let mut remaining = from.to_vec();
    for r in remove {
        let mut next = Vec::with_capacity(remaining.len() + 1);
        for piece in &remaining {
            if piece.end < r.start || piece.start > r.end {
                next.push(*piece);
                continue;
            }
            if piece.start < r.start {
                next.push(UintRange::new(piece.start, r.start - 1));
            }
            if piece.end > r.end {
                next.push(UintRange::new(r.end + 1, piece.end));
            }
        }
        remaining = next;
    }
    sort_and_merge(&remaining)
}

/// Complement within a stated universe. Fails only when a boundary constant
/// would be pushed past `u64::MAX`.
pub fn invert(ranges: &[UintRange], universe: UintRange) -> Result<Vec<UintRange>, EngineError> {
    let mut inverted = Vec::new();
    let mut cursor = universe.start;
    for range in sort_and_merge(ranges) {
        if range.end < universe.start || range.start > universe.end {
            continue;
        }
        let clipped_start = range.start.max(universe.start);
        if clipped_start > cursor {
            inverted.push(UintRange::new(cursor, clipped_start - 1));
        }
        if range.end >= universe.end {
            return Ok(inverted);
        }
        cursor = cursor.max(
            range
                .end
                .checked_add(1)
                .ok_or_else(EngineError::range_overflow)?,
        );
    }
    if cursor <= universe.end {
        inverted.push(UintRange::new(cursor, universe.end));
    }
    Ok(inverted)
}

/// A `(tokenIds, ownershipTimes)` rectangle: the 2-D cell every first-match
/// and balance operation works over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub token_ids: UintRange,
    pub ownership_times: UintRange,
}

impl Cell {
    pub fn new(token_ids: UintRange, ownership_times: UintRange) -> Self {
        Self {
            token_ids,
            ownership_times,
        }
    }

    pub fn overlap(&self, other: &Cell) -> Option<Cell> {
        let token_ids = self.token_ids.overlap(&other.token_ids)?;
        let ownership_times = self.ownership_times.overlap(&other.ownership_times)?;
        Some(Cell {
            token_ids,
            ownership_times,
        })
    }
}

/// Subtracts `remove` from `cell`, yielding at most four residue rectangles
/// plus the overlap itself.
pub fn remove_cell_overlap(cell: &Cell, remove: &Cell) -> (Vec<Cell>, Option<Cell>) {
    let overlap = match cell.overlap(remove) {
        Some(o) => o,
        None => return (vec![*cell], None),
    };

    let mut remaining = Vec::with_capacity(4);
    // Left / right slabs keep the full time extent.
    if cell.token_ids.start < overlap.token_ids.start {
        remaining.push(Cell::new(
            UintRange::new(cell.token_ids.start, overlap.token_ids.start - 1),
            cell.ownership_times,
        ));
    }
    if cell.token_ids.end > overlap.token_ids.end {
        remaining.push(Cell::new(
            UintRange::new(overlap.token_ids.end + 1, cell.token_ids.end),
            cell.ownership_times,
        ));
    }
    // Top / bottom slabs are clipped to the overlap's id extent.
    if cell.ownership_times.start < overlap.ownership_times.start {
        remaining.push(Cell::new(
            overlap.token_ids,
            UintRange::new(cell.ownership_times.start, overlap.ownership_times.start - 1),
        ));
    }
    if cell.ownership_times.end > overlap.ownership_times.end {
        remaining.push(Cell::new(
            overlap.token_ids,
            UintRange::new(overlap.ownership_times.end + 1, cell.ownership_times.end),
        ));
    }
    (remaining, Some(overlap))
}

/// The workhorse of first-match: subtracts `claim`'s 2-D cell from every
/// entry of `existing`, returning the residue and the intersecting pieces.
pub fn universal_overlap(claim: &Cell, existing: &[Cell]) -> (Vec<Cell>, Vec<Cell>) {
    let mut remaining = Vec::new();
    let mut claimed = Vec::new();
    for cell in existing {
        let (residue, overlap) = remove_cell_overlap(cell, claim);
        remaining.extend(residue);
        if let Some(o) = overlap {
            claimed.push(o);
        }
    }
    (remaining, claimed)
}

/// Expands two range sets into their rectangle product.
pub fn cells_of(token_ids: &[UintRange], ownership_times: &[UintRange]) -> Vec<Cell> {
    let mut cells = Vec::with_capacity(token_ids.len() * ownership_times.len());
    for ids in token_ids {
        for times in ownership_times {
            cells.push(Cell::new(*ids, *times));
        }
    }
    cells
}
