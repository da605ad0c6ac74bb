//! First-match selection over multi-dimensional approval boxes.
//!
//! The splitter is data-oriented: callers keep a running `unhandled` list of
//! `(tokenId, ownershipTime)` cells and, approval by approval in list order,
//! claim the not-previously-handled portion. Claimed cells across the scan
//! are pairwise disjoint and bound to the earliest matcher.

use crate::approvals::types::{AllowedCombination, CollectionApproval};
use crate::errors::EngineError;
use crate::ranges::{self, Cell, UintRange};

/// Applies the approval's first allowed combination, inverting range sets
/// over the universe and list ids via `!` as flagged. The expanded approval
/// is the one the match pass sees.
pub fn expand_approval(approval: &CollectionApproval) -> Result<CollectionApproval, EngineError> {
    let combination = approval
        .allowed_combinations
        .first()
        .copied()
        .unwrap_or_default();
    if !combination.is_allowed {
        return Err(EngineError::DisallowedTransfer(format!(
            "approval {} forbids this combination",
            approval.approval_id
        )));
    }

    let invert_ranges = |ranges_in: &[UintRange], flag: bool| -> Result<Vec<UintRange>, EngineError> {
        if flag {
            ranges::invert(ranges_in, UintRange::universe())
        } else {
            Ok(ranges_in.to_vec())
        }
    };
    let invert_list = |list_id: &str, flag: bool| -> String {
        if flag {
            format!("!{}", list_id)
        } else {
            list_id.to_string()
        }
    };

    let mut expanded = approval.clone();
    expanded.from_list_id = invert_list(&approval.from_list_id, combination.invert_from);
    expanded.to_list_id = invert_list(&approval.to_list_id, combination.invert_to);
    expanded.initiated_by_list_id =
        invert_list(&approval.initiated_by_list_id, combination.invert_initiated_by);
    expanded.token_ids = invert_ranges(&approval.token_ids, combination.invert_token_ids)?;
    expanded.transfer_times =
        invert_ranges(&approval.transfer_times, combination.invert_transfer_times)?;
    expanded.ownership_times =
        invert_ranges(&approval.ownership_times, combination.invert_ownership_times)?;
    expanded.allowed_combinations = vec![AllowedCombination::default()];
    Ok(expanded)
}

/// Claims the portion of `unhandled` covered by `boxes`, returning the new
/// accumulator and the claimed cells.
pub fn claim_cells(unhandled: &[Cell], boxes: &[Cell]) -> (Vec<Cell>, Vec<Cell>) {
    let mut remaining = unhandled.to_vec();
    let mut claimed = Vec::new();
    for claim in boxes {
        let (next, overlaps) = ranges::universal_overlap(claim, &remaining);
        remaining = next;
        claimed.extend(overlaps);
    }
    (remaining, claimed)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchRecord {
    pub approval_index: usize,
    pub cell: Cell,
}

/// Full splitter over an ordered approval list whose address lists and
/// transfer time already matched. Used directly by tests; the evaluator
/// interleaves [`claim_cells`] with challenge and tracker checks instead.
pub fn first_match_records(
    approvals: &[CollectionApproval],
    universe: &[Cell],
) -> Vec<MatchRecord> {
    let mut unhandled = universe.to_vec();
    let mut records = Vec::new();
    for (approval_index, approval) in approvals.iter().enumerate() {
        if unhandled.is_empty() {
            break;
        }
        let boxes = ranges::cells_of(&approval.token_ids, &approval.ownership_times);
        let (remaining, claimed) = claim_cells(&unhandled, &boxes);
        unhandled = remaining;
        records.extend(claimed.into_iter().map(|cell| MatchRecord {
            approval_index,
            cell,
        }));
    }
    records
}
