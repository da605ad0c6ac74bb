use super::builder::EventBuilder;
use super::APPROVAL;
use crate::trackers::TrackerUpdate;

/// One event per tracker update, carrying the post-update state.
pub fn emit_approval_tracker_updated(
    collection_id: u64,
    approver_address: &str,
    approval_level: &str,
    approval_id: &str,
    update: &TrackerUpdate,
) {
    EventBuilder::new(APPROVAL, "approval", approver_address)
        .field("collection_id", collection_id.to_string())
        .field("approval_level", approval_level)
        .field("approval_id", approval_id)
        .field("amount_tracker_id", &update.amount_tracker_id)
        .field("tracker_type", &update.tracker_type)
        .field("approved_address", &update.address)
        .field("num_transfers", update.tracker.num_transfers.to_string())
        .field("amounts", &update.tracker.amounts)
        .field("last_updated_at", update.tracker.last_updated_at.to_string())
        .field("version", update.tracker.version.to_string())
        .emit();
}

pub fn emit_user_approvals_updated(collection_id: u64, holder: &str, scope: &str) {
    EventBuilder::new(APPROVAL, "user_approvals_updated", holder)
        .field("collection_id", collection_id.to_string())
        .field("scope", scope)
        .emit();
}
