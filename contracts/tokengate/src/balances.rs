//! Balance-set algebra.
//!
//! A balance set is a list of `{amount, tokenIds, ownershipTimes}` triples
//! whose `(id, time)` cells are pairwise disjoint. All operations are value
//! operations: inputs are never aliased, outputs are freshly assembled in
//! canonical order (no zero amounts, token ranges merged per amount/time
//! group).

use std::collections::BTreeMap;

use near_sdk::json_types::U128;
use near_sdk::near;

use crate::errors::EngineError;
use crate::ranges::{self, Cell, UintRange};

#[near(serializers = [borsh, json])]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Balance {
    pub amount: U128,
    pub token_ids: Vec<UintRange>,
    pub ownership_times: Vec<UintRange>,
}

impl Balance {
    pub fn new(amount: u128, token_ids: Vec<UintRange>, ownership_times: Vec<UintRange>) -> Self {
        Self {
            amount: U128(amount),
            token_ids,
            ownership_times,
        }
    }

    pub fn cells(&self) -> Vec<Cell> {
        ranges::cells_of(&self.token_ids, &self.ownership_times)
    }
}

pub fn validate_balances(balances: &[Balance]) -> Result<(), EngineError> {
    for balance in balances {
        ranges::validate_ranges(&balance.token_ids)?;
        ranges::validate_ranges(&balance.ownership_times)?;
        if balance.token_ids.is_empty() || balance.ownership_times.is_empty() {
            return Err(EngineError::InvalidInput(
                "balance must cover at least one token ID and ownership time".to_string(),
            ));
        }
    }
    Ok(())
}

/// Flattens a balance set into disjoint `(cell, amount)` pieces.
fn flatten(balances: &[Balance]) -> Vec<(Cell, u128)> {
    let mut flat = Vec::new();
    for balance in balances {
        for cell in balance.cells() {
            flat.push((cell, balance.amount.0));
        }
    }
    flat
}

/// Reassembles pieces into a canonical balance set: zero amounts dropped,
/// token ranges merged within each `(amount, ownershipTimes)` group, groups
/// ordered by amount then time.
fn assemble(pieces: Vec<(Cell, u128)>) -> Vec<Balance> {
    let mut groups: BTreeMap<(u128, u64, u64), Vec<UintRange>> = BTreeMap::new();
    for (cell, amount) in pieces {
        if amount == 0 {
            continue;
        }
        groups
            .entry((amount, cell.ownership_times.start, cell.ownership_times.end))
            .or_default()
            .push(cell.token_ids);
    }
    groups
        .into_iter()
        .map(|((amount, time_start, time_end), ids)| Balance {
            amount: U128(amount),
            token_ids: ranges::sort_and_merge(&ids),
            ownership_times: vec![UintRange::new(time_start, time_end)],
        })
        .collect()
}

/// Applies `amount` over `cell` to the flattened set. `add = false`
/// subtracts with an underflow error naming the first offending cell.
fn apply_to_cell(
    flat: Vec<(Cell, u128)>,
    cell: Cell,
    amount: u128,
    add: bool,
) -> Result<Vec<(Cell, u128)>, EngineError> {
    let mut out = Vec::with_capacity(flat.len() + 4);
    let mut uncovered = vec![cell];

    for (existing, existing_amount) in flat {
        let (residue, overlap) = ranges::remove_cell_overlap(&existing, &cell);
        for piece in residue {
            out.push((piece, existing_amount));
        }
        let Some(overlap) = overlap else { continue };
        let updated = if add {
            existing_amount
                .checked_add(amount)
                .ok_or_else(EngineError::amount_overflow)?
        } else {
            existing_amount.checked_sub(amount).ok_or_else(|| {
                EngineError::insufficient_balance(
                    overlap.token_ids.start,
                    overlap.ownership_times.start,
                )
            })?
        };
        out.push((overlap, updated));

        let mut next = Vec::with_capacity(uncovered.len());
        for piece in &uncovered {
            let (residue, _) = ranges::remove_cell_overlap(piece, &overlap);
            next.extend(residue);
        }
        uncovered = next;
    }

    // Cells the set does not cover carry amount zero.
    for piece in uncovered {
        if add {
            out.push((piece, amount));
        } else if amount > 0 {
            return Err(EngineError::insufficient_balance(
                piece.token_ids.start,
                piece.ownership_times.start,
            ));
        }
    }
    Ok(out)
}

pub fn add_balances(existing: &[Balance], delta: &[Balance]) -> Result<Vec<Balance>, EngineError> {
    let mut flat = flatten(existing);
    for balance in delta {
        for cell in balance.cells() {
            flat = apply_to_cell(flat, cell, balance.amount.0, true)?;
        }
    }
    Ok(assemble(flat))
}

pub fn subtract_balances(
    existing: &[Balance],
    delta: &[Balance],
) -> Result<Vec<Balance>, EngineError> {
    let mut flat = flatten(existing);
    for balance in delta {
        for cell in balance.cells() {
            flat = apply_to_cell(flat, cell, balance.amount.0, false)?;
        }
    }
    Ok(assemble(flat))
}

/// Removes every `(ids x times)` cell from the set.
pub fn delete_balances(
    token_ids: &[UintRange],
    ownership_times: &[UintRange],
    existing: &[Balance],
) -> Vec<Balance> {
    let mut flat = flatten(existing);
    for cell in ranges::cells_of(token_ids, ownership_times) {
        let mut next = Vec::with_capacity(flat.len());
        for (existing_cell, amount) in flat {
            let (residue, _) = ranges::remove_cell_overlap(&existing_cell, &cell);
            for piece in residue {
                next.push((piece, amount));
            }
        }
        flat = next;
    }
    assemble(flat)
}

/// Amounts held over `cell`, as a full disjoint cover of the cell; parts the
/// set does not cover appear with amount zero.
pub fn amounts_for_cell(cell: Cell, balances: &[Balance]) -> Vec<(Cell, u128)> {
    let mut pieces = vec![(cell, 0u128)];
    for (bcell, amount) in flatten(balances) {
        let mut next = Vec::with_capacity(pieces.len() + 4);
        for (piece, piece_amount) in pieces {
            let (residue, overlap) = ranges::remove_cell_overlap(&piece, &bcell);
            for r in residue {
                next.push((r, piece_amount));
            }
            if let Some(o) = overlap {
                next.push((o, piece_amount + amount));
            }
        }
        pieces = next;
    }
    pieces
}

/// Restriction of the set to `(ids x times)`, zero-amount parts dropped.
pub fn get_balances_for_ids(
    token_ids: &[UintRange],
    ownership_times: &[UintRange],
    balances: &[Balance],
) -> Vec<Balance> {
    let mut pieces = Vec::new();
    for cell in ranges::cells_of(token_ids, ownership_times) {
        pieces.extend(amounts_for_cell(cell, balances));
    }
    assemble(pieces)
}

/// Fails if any cell of `candidate` exceeds the amount `threshold` carries
/// at that cell (uncovered threshold cells allow nothing).
pub fn assert_balances_do_not_exceed(
    candidate: &[Balance],
    threshold: &[Balance],
) -> Result<(), EngineError> {
    for balance in candidate {
        for cell in balance.cells() {
            for (piece, allowed) in amounts_for_cell(cell, threshold) {
                if balance.amount.0 > allowed {
                    return Err(EngineError::DisallowedTransfer(format!(
                        "amount {} for token ID {} exceeds approved amount {}",
                        balance.amount.0, piece.token_ids.start, allowed
                    )));
                }
            }
        }
    }
    Ok(())
}

/// Partial-fill companion of [`assert_balances_do_not_exceed`]: clamps each
/// cell of `candidate` down to what `threshold` still admits.
pub fn clamp_balances_to_threshold(candidate: &[Balance], threshold: &[Balance]) -> Vec<Balance> {
    let mut pieces = Vec::new();
    for balance in candidate {
        for cell in balance.cells() {
            for (piece, allowed) in amounts_for_cell(cell, threshold) {
                pieces.push((piece, balance.amount.0.min(allowed)));
            }
        }
    }
    assemble(pieces)
}

/// Shifts every range of every balance by `increment * count`, for
/// predetermined-balance templates.
pub fn increment_balances(
    balances: &[Balance],
    increment_token_ids_by: u64,
    increment_ownership_times_by: u64,
    count: u64,
) -> Result<Vec<Balance>, EngineError> {
    let shift = |ranges: &[UintRange], by: u64| -> Result<Vec<UintRange>, EngineError> {
        let total = by.checked_mul(count).ok_or_else(EngineError::range_overflow)?;
        ranges
            .iter()
            .map(|r| {
                Ok(UintRange::new(
                    r.start
                        .checked_add(total)
                        .ok_or_else(EngineError::range_overflow)?,
                    r.end
                        .checked_add(total)
                        .ok_or_else(EngineError::range_overflow)?,
                ))
            })
            .collect()
    };
    balances
        .iter()
        .map(|b| {
            Ok(Balance {
                amount: b.amount,
                token_ids: shift(&b.token_ids, increment_token_ids_by)?,
                ownership_times: shift(&b.ownership_times, increment_ownership_times_by)?,
            })
        })
        .collect()
}

/// Canonical equality, independent of input fragmentation.
pub fn balances_equal(left: &[Balance], right: &[Balance]) -> bool {
    let zero: Vec<Balance> = Vec::new();
    add_balances(&zero, left).ok() == add_balances(&zero, right).ok()
}
