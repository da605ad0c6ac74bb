//! Transfer entry points: full execution and the as-much-as-possible
//! simulation.

pub mod evaluator;
pub mod types;

pub use types::{Transfer, UsedApproval};

use near_sdk::json_types::U64;
use near_sdk::{env, near};

use crate::balances::{self, Balance};
use crate::collections::types::Collection;
use crate::constants::{LEVEL_COLLECTION, LEVEL_INCOMING, LEVEL_OUTGOING, MINT_ADDRESS};
use crate::errors::EngineError;
use crate::events;
use crate::transfer::evaluator::{AutoDeletion, EvalMode};
use crate::{guards, ranges, Contract, ContractExt};

fn validate_transfer_input(
    collection: &Collection,
    transfer: &Transfer,
) -> Result<(), EngineError> {
    if transfer.from != MINT_ADDRESS && !crate::address_lists::is_valid_address(&transfer.from) {
        return Err(EngineError::InvalidAddress(transfer.from.clone()));
    }
    if transfer.to_addresses.is_empty() {
        return Err(EngineError::InvalidInput(
            "transfer has no recipients".to_string(),
        ));
    }
    if transfer.to_addresses.len() > crate::constants::MAX_RECIPIENTS_PER_TRANSFER {
        return Err(EngineError::InvalidInput(format!(
            "at most {} recipients per transfer",
            crate::constants::MAX_RECIPIENTS_PER_TRANSFER
        )));
    }
    for to in &transfer.to_addresses {
        if !crate::address_lists::is_valid_address(to) {
            return Err(EngineError::InvalidAddress(to.clone()));
        }
    }
    balances::validate_balances(&transfer.balances)?;
    // Minting can only create tokens the collection declares.
    if transfer.from == MINT_ADDRESS {
        for balance in &transfer.balances {
            for range in &balance.token_ids {
                let remaining = ranges::subtract(&[*range], &collection.valid_token_ids);
                if !remaining.is_empty() {
                    return Err(EngineError::InvalidInput(format!(
                        "token IDs {}-{} are not valid for collection {}",
                        range.start, range.end, collection.collection_id
                    )));
                }
            }
        }
    }
    Ok(())
}

impl Contract {
    fn execute_transfer(
        &mut self,
        collection: &mut Collection,
        transfer: &Transfer,
        initiator: &str,
        now: u64,
    ) -> Result<(), EngineError> {
        validate_transfer_input(collection, transfer)?;
        for to in &transfer.to_addresses {
            let result = self.evaluate_single_transfer(
                collection,
                transfer,
                &transfer.from,
                to,
                initiator,
                EvalMode::default(),
                now,
            )?;

            // All validations passed; side effects from here on.
            self.simulate_coin_transfers(
                &result.scheduled_coins,
                initiator,
                &collection.mint_escrow_address,
            )?;
            let executed = self.execute_coin_transfers(
                &result.scheduled_coins,
                initiator,
                &collection.mint_escrow_address,
                transfer.affiliate_address.as_deref(),
            )?;

            self.apply_balance_movement(collection, &transfer.from, to, &transfer.balances)?;
            self.apply_auto_deletions(collection, &result.auto_deletions);

            let from_balances = (transfer.from != MINT_ADDRESS)
                .then(|| self.balance_store_or_default(collection, &transfer.from).balances);
            let to_balances = self.balance_store_or_default(collection, to).balances;
            events::emit_transfer_executed(
                collection.collection_id,
                &transfer.from,
                to,
                initiator,
                &result.approvals_used,
                &executed,
                from_balances.as_deref(),
                &to_balances,
            );
        }
        Ok(())
    }

    fn apply_balance_movement(
        &mut self,
        collection: &Collection,
        from: &str,
        to: &str,
        moved: &[Balance],
    ) -> Result<(), EngineError> {
        if from == to {
            // Net-zero movement, still approval-gated: exercise both sides
            // against a single store so neither write is lost.
            let mut store = self.balance_store_or_default(collection, from);
            store.balances = balances::subtract_balances(&store.balances, moved)?;
            store.balances = balances::add_balances(&store.balances, moved)?;
            self.save_balance_store(collection.collection_id, from, store);
            return Ok(());
        }
        if from != MINT_ADDRESS {
            let mut from_store = self.balance_store_or_default(collection, from);
            from_store.balances = balances::subtract_balances(&from_store.balances, moved)?;
            self.save_balance_store(collection.collection_id, from, from_store);
        }
        let mut to_store = self.balance_store_or_default(collection, to);
        to_store.balances = balances::add_balances(&to_store.balances, moved)?;
        self.save_balance_store(collection.collection_id, to, to_store);
        Ok(())
    }

    fn apply_auto_deletions(&mut self, collection: &mut Collection, deletions: &[AutoDeletion]) {
        for deletion in deletions {
            match deletion.approval_level.as_str() {
                LEVEL_COLLECTION => {
                    collection
                        .collection_approvals
                        .retain(|a| a.approval_id != deletion.approval_id);
                }
                LEVEL_OUTGOING => {
                    let mut store =
                        self.balance_store_or_default(collection, &deletion.approver_address);
                    store
                        .outgoing_approvals
                        .retain(|a| a.approval_id != deletion.approval_id);
                    self.save_balance_store(
                        collection.collection_id,
                        &deletion.approver_address,
                        store,
                    );
                }
                LEVEL_INCOMING => {
                    let mut store =
                        self.balance_store_or_default(collection, &deletion.approver_address);
                    store
                        .incoming_approvals
                        .retain(|a| a.approval_id != deletion.approval_id);
                    self.save_balance_store(
                        collection.collection_id,
                        &deletion.approver_address,
                        store,
                    );
                }
                _ => {}
            }
        }
    }
}

#[near]
impl Contract {
    /// Executes a batch of transfers against one collection. Any failure
    /// reverts the whole batch.
    #[payable]
    #[handle_result]
    pub fn transfer_tokens(
        &mut self,
        collection_id: U64,
        transfers: Vec<Transfer>,
    ) -> Result<(), EngineError> {
        guards::check_one_yocto()?;
        if transfers.is_empty() || transfers.len() > crate::constants::MAX_TRANSFERS_PER_CALL {
            return Err(EngineError::InvalidInput(format!(
                "between 1 and {} transfers per call",
                crate::constants::MAX_TRANSFERS_PER_CALL
            )));
        }
        let initiator = env::predecessor_account_id().to_string();
        let now = env::block_timestamp_ms();
        let mut collection = self.collection_or_err(collection_id.0)?;
        if collection.is_archived {
            return Err(EngineError::Unauthorized(
                "collection is archived".to_string(),
            ));
        }
        for transfer in &transfers {
            self.execute_transfer(&mut collection, transfer, &initiator, now)?;
        }
        self.collections.insert(collection.collection_id, collection);
        Ok(())
    }

    /// Simulates one transfer leg in clamping mode and reports the portion
    /// no approval admits. Mutating signature, but nothing is written.
    #[handle_result]
    pub fn get_unapproved_balances(
        &mut self,
        collection_id: U64,
        transfer: Transfer,
        to_address: String,
        initiated_by: String,
    ) -> Result<Vec<Balance>, EngineError> {
        let now = env::block_timestamp_ms();
        let collection = self.collection_or_err(collection_id.0)?;
        validate_transfer_input(&collection, &transfer)?;
        let mode = EvalMode {
            dry_run: true,
            partial: true,
        };
        let from = transfer.from.clone();
        let result = self.evaluate_single_transfer(
            &collection,
            &transfer,
            &from,
            &to_address,
            &initiated_by,
            mode,
            now,
        )?;
        Ok(result.unapproved)
    }
}
