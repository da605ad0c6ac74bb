//! Structural validation of approvals, run on every create or update.

use std::collections::HashSet;

use crate::approvals::types::{
    ApprovalCriteria, CollectionApproval, UserIncomingApproval, UserOutgoingApproval,
};
use crate::constants::{BASIS_POINTS, MAX_MERKLE_PROOF_LENGTH, MAX_ROYALTY_BPS};
use crate::errors::EngineError;
use crate::ranges::UintRange;

fn validate_ranges(ranges: &[UintRange], what: &str) -> Result<(), EngineError> {
    if ranges.is_empty() {
        return Err(EngineError::InvalidInput(format!("{} must be non-empty", what)));
    }
    for range in ranges {
        if range.start > range.end {
            return Err(EngineError::InvalidInput(format!(
                "{} range {}-{} is inverted",
                what, range.start, range.end
            )));
        }
    }
    Ok(())
}

fn validate_criteria(criteria: &ApprovalCriteria, user_level: bool) -> Result<(), EngineError> {
    if user_level
        && (criteria.overrides_from_outgoing_approvals || criteria.overrides_to_incoming_approvals)
    {
        return Err(EngineError::InvalidInput(
            "override flags are collection-level only".to_string(),
        ));
    }
    if let Some(royalties) = &criteria.user_royalties {
        if royalties.percentage > MAX_ROYALTY_BPS {
            return Err(EngineError::InvalidInput(format!(
                "royalty percentage {} exceeds {} basis points",
                royalties.percentage, BASIS_POINTS
            )));
        }
        if royalties.percentage > 0 && royalties.payout_address.is_empty() {
            return Err(EngineError::InvalidInput(
                "royalties require a payout address".to_string(),
            ));
        }
    }
    for challenge in &criteria.merkle_challenges {
        if challenge.expected_proof_length as usize > MAX_MERKLE_PROOF_LENGTH {
            return Err(EngineError::InvalidInput(format!(
                "merkle proof length limit is {}",
                MAX_MERKLE_PROOF_LENGTH
            )));
        }
        if challenge.root.len() != 64 || hex::decode(&challenge.root).is_err() {
            return Err(EngineError::InvalidInput(
                "merkle root must be 32 hex-encoded bytes".to_string(),
            ));
        }
    }
    if let Some(predetermined) = &criteria.predetermined_balances {
        crate::balances::validate_balances(&predetermined.initial_balances)?;
    }
    if let Some(intervals) = criteria
        .approval_amounts
        .as_ref()
        .and_then(|a| a.reset_time_intervals.as_ref())
        .or_else(|| {
            criteria
                .max_num_transfers
                .as_ref()
                .and_then(|m| m.reset_time_intervals.as_ref())
        })
    {
        if intervals.interval_length == 0 && intervals.start_time != 0 {
            return Err(EngineError::InvalidInput(
                "reset intervals need a non-zero interval length".to_string(),
            ));
        }
    }
    Ok(())
}

fn validate_common(
    approval_id: &str,
    token_ids: &[UintRange],
    transfer_times: &[UintRange],
    ownership_times: &[UintRange],
    criteria: Option<&ApprovalCriteria>,
    user_level: bool,
) -> Result<(), EngineError> {
    if approval_id.is_empty() {
        return Err(EngineError::InvalidInput(
            "approval ID must be non-empty".to_string(),
        ));
    }
    validate_ranges(token_ids, "token ID")?;
    validate_ranges(transfer_times, "transfer time")?;
    validate_ranges(ownership_times, "ownership time")?;
    if let Some(criteria) = criteria {
        validate_criteria(criteria, user_level)?;
    }
    Ok(())
}

fn assert_unique_ids<'a>(ids: impl Iterator<Item = &'a str>) -> Result<(), EngineError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(EngineError::InvalidInput(format!(
                "duplicate approval ID {}",
                id
            )));
        }
    }
    Ok(())
}

pub fn validate_collection_approvals(
    approvals: &[CollectionApproval],
) -> Result<(), EngineError> {
    assert_unique_ids(approvals.iter().map(|a| a.approval_id.as_str()))?;
    for approval in approvals {
        validate_common(
            &approval.approval_id,
            &approval.token_ids,
            &approval.transfer_times,
            &approval.ownership_times,
            approval.approval_criteria.as_ref(),
            false,
        )?;
    }
    Ok(())
}

pub fn validate_outgoing_approvals(
    approvals: &[UserOutgoingApproval],
) -> Result<(), EngineError> {
    assert_unique_ids(approvals.iter().map(|a| a.approval_id.as_str()))?;
    for approval in approvals {
        validate_common(
            &approval.approval_id,
            &approval.token_ids,
            &approval.transfer_times,
            &approval.ownership_times,
            approval.approval_criteria.as_ref(),
            true,
        )?;
    }
    Ok(())
}

pub fn validate_incoming_approvals(
    approvals: &[UserIncomingApproval],
) -> Result<(), EngineError> {
    assert_unique_ids(approvals.iter().map(|a| a.approval_id.as_str()))?;
    for approval in approvals {
        validate_common(
            &approval.approval_id,
            &approval.token_ids,
            &approval.transfer_times,
            &approval.ownership_times,
            approval.approval_criteria.as_ref(),
            true,
        )?;
    }
    Ok(())
}
