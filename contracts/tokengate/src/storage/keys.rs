//! String key formats.
//!
//! Every per-collection index is keyed `{collectionId}-{...}` so
//! `delete_collection` can walk one prefix per logical index.

use crate::constants::{KEY_DELIMITER, LEDGER_DELIMITER};

pub fn collection_prefix(collection_id: u64) -> String {
    format!("{}{}", collection_id, KEY_DELIMITER)
}

pub fn balance_store_key(collection_id: u64, address: &str) -> String {
    format!("{}{}{}", collection_id, KEY_DELIMITER, address)
}

pub fn approval_tracker_key(
    collection_id: u64,
    approver_address: &str,
    approval_level: &str,
    approval_id: &str,
    amount_tracker_id: &str,
    tracker_type: &str,
    address: &str,
) -> String {
    [
        &collection_id.to_string(),
        approver_address,
        approval_level,
        approval_id,
        amount_tracker_id,
        tracker_type,
        address,
    ]
    .join(KEY_DELIMITER)
}

pub fn challenge_tracker_key(
    collection_id: u64,
    approver_address: &str,
    approval_level: &str,
    approval_id: &str,
    challenge_tracker_id: &str,
    leaf_index: u128,
) -> String {
    [
        &collection_id.to_string(),
        approver_address,
        approval_level,
        approval_id,
        challenge_tracker_id,
        &leaf_index.to_string(),
    ]
    .join(KEY_DELIMITER)
}

pub fn approval_version_key(
    collection_id: u64,
    approval_level: &str,
    approver_address: &str,
    approval_id: &str,
) -> String {
    [
        &collection_id.to_string(),
        approval_level,
        approver_address,
        approval_id,
    ]
    .join(KEY_DELIMITER)
}

pub fn used_solution_key(
    collection_id: u64,
    approver_address: &str,
    approval_level: &str,
    approval_id: &str,
    challenge_id: &str,
    solution_hash: &str,
) -> String {
    [
        &collection_id.to_string(),
        approver_address,
        approval_level,
        approval_id,
        challenge_id,
        solution_hash,
    ]
    .join(KEY_DELIMITER)
}

pub fn dynamic_store_value_key(store_id: u64, address: &str) -> String {
    format!("{}{}{}", store_id, KEY_DELIMITER, address)
}

/// Account first: account ids cannot contain ':', denoms can.
pub fn ledger_key(address: &str, denom: &str) -> String {
    format!("{}{}{}", address, LEDGER_DELIMITER, denom)
}
