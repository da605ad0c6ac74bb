use super::builder::EventBuilder;
use super::TRANSFER;
use crate::balances::Balance;
use crate::coins::ExecutedCoinTransfer;
use crate::transfer::types::UsedApproval;

/// `from_balances` is `None` for mint legs, which have no sender store.
#[allow(clippy::too_many_arguments)]
pub fn emit_transfer_executed(
    collection_id: u64,
    from: &str,
    to: &str,
    initiated_by: &str,
    approvals_used: &[UsedApproval],
    coin_transfers: &[ExecutedCoinTransfer],
    from_balances: Option<&[Balance]>,
    to_balances: &[Balance],
) {
    EventBuilder::new(TRANSFER, "used_approval_details", initiated_by)
        .field("collection_id", collection_id.to_string())
        .field("from", from)
        .field("to", to)
        .field("approvals_used", approvals_used)
        .field("coin_transfers", coin_transfers)
        .field_opt("from_balances", from_balances)
        .field("to_balances", to_balances)
        .emit();
}
