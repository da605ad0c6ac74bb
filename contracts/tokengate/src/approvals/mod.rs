//! User-level approval management.

pub mod lifecycle;
pub mod types;

pub use types::*;

use near_sdk::json_types::U64;
use near_sdk::{env, near};

use crate::collections::types::UserBalanceStore;
use crate::errors::EngineError;
use crate::events;
use crate::{guards, validation, Contract, ContractExt};

#[near]
impl Contract {
    /// Replaces the caller's outgoing approvals for a collection. Approvals
    /// absent from the new set are deleted; changed ones get a new version.
    #[payable]
    #[handle_result]
    pub fn set_outgoing_approvals(
        &mut self,
        collection_id: U64,
        approvals: Vec<UserOutgoingApproval>,
    ) -> Result<(), EngineError> {
        guards::check_one_yocto()?;
        validation::validate_outgoing_approvals(&approvals)?;
        let caller = env::predecessor_account_id().to_string();
        let collection = self.collection_or_err(collection_id.0)?;
        let mut store = self.balance_store_or_default(&collection, &caller);
        if !store.user_permissions.can_update_outgoing_approvals {
            return Err(EngineError::Unauthorized(
                "outgoing approvals are frozen for this account".to_string(),
            ));
        }
        let mut approvals = approvals;
        self.assign_outgoing_approval_versions(
            collection_id.0,
            &caller,
            &mut approvals,
            &store.outgoing_approvals,
        );
        store.outgoing_approvals = approvals;
        self.save_balance_store(collection_id.0, &caller, store);
        events::emit_user_approvals_updated(collection_id.0, &caller, "outgoing");
        Ok(())
    }

    /// Replaces the caller's incoming approvals for a collection.
    #[payable]
    #[handle_result]
    pub fn set_incoming_approvals(
        &mut self,
        collection_id: U64,
        approvals: Vec<UserIncomingApproval>,
    ) -> Result<(), EngineError> {
        guards::check_one_yocto()?;
        validation::validate_incoming_approvals(&approvals)?;
        let caller = env::predecessor_account_id().to_string();
        let collection = self.collection_or_err(collection_id.0)?;
        let mut store = self.balance_store_or_default(&collection, &caller);
        if !store.user_permissions.can_update_incoming_approvals {
            return Err(EngineError::Unauthorized(
                "incoming approvals are frozen for this account".to_string(),
            ));
        }
        let mut approvals = approvals;
        self.assign_incoming_approval_versions(
            collection_id.0,
            &caller,
            &mut approvals,
            &store.incoming_approvals,
        );
        store.incoming_approvals = approvals;
        self.save_balance_store(collection_id.0, &caller, store);
        events::emit_user_approvals_updated(collection_id.0, &caller, "incoming");
        Ok(())
    }

    /// Flips the caller's auto-approve flags. `None` leaves a flag as is.
    #[payable]
    #[handle_result]
    pub fn set_auto_approve_flags(
        &mut self,
        collection_id: U64,
        self_initiated_outgoing: Option<bool>,
        self_initiated_incoming: Option<bool>,
        all_incoming: Option<bool>,
    ) -> Result<(), EngineError> {
        guards::check_one_yocto()?;
        let caller = env::predecessor_account_id().to_string();
        let collection = self.collection_or_err(collection_id.0)?;
        let mut store = self.balance_store_or_default(&collection, &caller);
        if !store.user_permissions.can_update_auto_approve_flags {
            return Err(EngineError::Unauthorized(
                "auto-approve flags are frozen for this account".to_string(),
            ));
        }
        if let Some(flag) = self_initiated_outgoing {
            store.auto_approve_self_initiated_outgoing_transfers = flag;
        }
        if let Some(flag) = self_initiated_incoming {
            store.auto_approve_self_initiated_incoming_transfers = flag;
        }
        if let Some(flag) = all_incoming {
            store.auto_approve_all_incoming_transfers = flag;
        }
        self.save_balance_store(collection_id.0, &caller, store);
        events::emit_user_approvals_updated(collection_id.0, &caller, "flags");
        Ok(())
    }

    /// Permanently shrinks the caller's own update permissions. One-way:
    /// a permission turned off can never be turned back on.
    #[payable]
    #[handle_result]
    pub fn shrink_user_permissions(
        &mut self,
        collection_id: U64,
        can_update_outgoing_approvals: Option<bool>,
        can_update_incoming_approvals: Option<bool>,
        can_update_auto_approve_flags: Option<bool>,
    ) -> Result<(), EngineError> {
        guards::check_one_yocto()?;
        let caller = env::predecessor_account_id().to_string();
        let collection = self.collection_or_err(collection_id.0)?;
        let mut store = self.balance_store_or_default(&collection, &caller);
        let perms = &mut store.user_permissions;
        for (requested, current) in [
            (can_update_outgoing_approvals, &mut perms.can_update_outgoing_approvals),
            (can_update_incoming_approvals, &mut perms.can_update_incoming_approvals),
            (can_update_auto_approve_flags, &mut perms.can_update_auto_approve_flags),
        ] {
            match requested {
                Some(true) if !*current => {
                    return Err(EngineError::Unauthorized(
                        "permissions can only be shrunk".to_string(),
                    ));
                }
                Some(flag) => *current = flag,
                None => {}
            }
        }
        self.save_balance_store(collection_id.0, &caller, store);
        Ok(())
    }

    /// Upserts a single outgoing approval by ID. Thin wrapper over the
    /// list-replacement path, so versioning rules are identical.
    #[payable]
    #[handle_result]
    pub fn set_outgoing_approval(
        &mut self,
        collection_id: U64,
        approval: UserOutgoingApproval,
    ) -> Result<(), EngineError> {
        let caller = env::predecessor_account_id().to_string();
        let collection = self.collection_or_err(collection_id.0)?;
        let store = self.balance_store_or_default(&collection, &caller);
        let mut approvals = store.outgoing_approvals;
        match approvals.iter_mut().find(|a| a.approval_id == approval.approval_id) {
            Some(existing) => *existing = approval,
            None => approvals.push(approval),
        }
        self.set_outgoing_approvals(collection_id, approvals)
    }

    #[payable]
    #[handle_result]
    pub fn set_incoming_approval(
        &mut self,
        collection_id: U64,
        approval: UserIncomingApproval,
    ) -> Result<(), EngineError> {
        let caller = env::predecessor_account_id().to_string();
        let collection = self.collection_or_err(collection_id.0)?;
        let store = self.balance_store_or_default(&collection, &caller);
        let mut approvals = store.incoming_approvals;
        match approvals.iter_mut().find(|a| a.approval_id == approval.approval_id) {
            Some(existing) => *existing = approval,
            None => approvals.push(approval),
        }
        self.set_incoming_approvals(collection_id, approvals)
    }

    #[payable]
    #[handle_result]
    pub fn delete_outgoing_approval(
        &mut self,
        collection_id: U64,
        approval_id: String,
    ) -> Result<(), EngineError> {
        let caller = env::predecessor_account_id().to_string();
        let collection = self.collection_or_err(collection_id.0)?;
        let store = self.balance_store_or_default(&collection, &caller);
        let mut approvals = store.outgoing_approvals;
        let before = approvals.len();
        approvals.retain(|a| a.approval_id != approval_id);
        if approvals.len() == before {
            return Err(EngineError::NotFound(format!(
                "outgoing approval {}",
                approval_id
            )));
        }
        self.set_outgoing_approvals(collection_id, approvals)
    }

    #[payable]
    #[handle_result]
    pub fn delete_incoming_approval(
        &mut self,
        collection_id: U64,
        approval_id: String,
    ) -> Result<(), EngineError> {
        let caller = env::predecessor_account_id().to_string();
        let collection = self.collection_or_err(collection_id.0)?;
        let store = self.balance_store_or_default(&collection, &caller);
        let mut approvals = store.incoming_approvals;
        let before = approvals.len();
        approvals.retain(|a| a.approval_id != approval_id);
        if approvals.len() == before {
            return Err(EngineError::NotFound(format!(
                "incoming approval {}",
                approval_id
            )));
        }
        self.set_incoming_approvals(collection_id, approvals)
    }

    /// Combined update: each section is optional and applies under the same
    /// rules as its dedicated method.
    #[payable]
    #[handle_result]
    pub fn update_user_approvals(
        &mut self,
        collection_id: U64,
        outgoing_approvals: Option<Vec<UserOutgoingApproval>>,
        incoming_approvals: Option<Vec<UserIncomingApproval>>,
        auto_approve_self_initiated_outgoing: Option<bool>,
        auto_approve_self_initiated_incoming: Option<bool>,
        auto_approve_all_incoming: Option<bool>,
    ) -> Result<(), EngineError> {
        if let Some(approvals) = outgoing_approvals {
            self.set_outgoing_approvals(collection_id, approvals)?;
        }
        if let Some(approvals) = incoming_approvals {
            self.set_incoming_approvals(collection_id, approvals)?;
        }
        if auto_approve_self_initiated_outgoing.is_some()
            || auto_approve_self_initiated_incoming.is_some()
            || auto_approve_all_incoming.is_some()
        {
            self.set_auto_approve_flags(
                collection_id,
                auto_approve_self_initiated_outgoing,
                auto_approve_self_initiated_incoming,
                auto_approve_all_incoming,
            )?;
        }
        Ok(())
    }

    pub fn get_balance_store(&self, collection_id: U64, address: String) -> UserBalanceStore {
        match self.collections.get(&collection_id.0) {
            Some(collection) => self.balance_store_or_default(collection, &address),
            None => UserBalanceStore::default(),
        }
    }

    pub fn get_approval_version(
        &self,
        collection_id: U64,
        approval_level: String,
        approver_address: String,
        approval_id: String,
    ) -> Option<u64> {
        let key = crate::storage::keys::approval_version_key(
            collection_id.0,
            &approval_level,
            &approver_address,
            &approval_id,
        );
        // The stored counter is one past the last assigned version.
        self.approval_versions.get(&key).map(|next| next - 1)
    }
}
