//! Collection lifecycle: creation, manager-gated updates, archival, and
//! deletion with full state purge.

pub mod types;

pub use types::{
    Collection, CollectionPermissions, CosmosCoinWrapperPath, UserBalanceStore, UserPermissions,
};

use near_sdk::json_types::U64;
use near_sdk::{env, near};

use crate::approvals::types::CollectionApproval;
use crate::balances;
use crate::errors::EngineError;
use crate::events;
use crate::ranges::UintRange;
use crate::storage::keys;
use crate::{guards, validation, Contract, ContractExt};

impl Contract {
    pub(crate) fn collection_or_err(&self, collection_id: u64) -> Result<Collection, EngineError> {
        self.collections
            .get(&collection_id)
            .cloned()
            .ok_or_else(|| EngineError::collection_not_found(collection_id))
    }

    /// A holder's store, or the collection's default template if the holder
    /// has never been written. Defaults are materialized lazily: reading
    /// never allocates storage.
    pub(crate) fn balance_store_or_default(
        &self,
        collection: &Collection,
        address: &str,
    ) -> UserBalanceStore {
        self.balance_stores
            .get(&keys::balance_store_key(collection.collection_id, address))
            .cloned()
            .unwrap_or_else(|| collection.default_balances.clone())
    }

    pub(crate) fn save_balance_store(
        &mut self,
        collection_id: u64,
        address: &str,
        store: UserBalanceStore,
    ) {
        self.balance_stores
            .insert(keys::balance_store_key(collection_id, address), store);
    }

    fn assert_manager(&self, collection: &Collection) -> Result<(), EngineError> {
        if env::predecessor_account_id().as_str() != collection.manager {
            return Err(EngineError::only_manager());
        }
        Ok(())
    }

    fn register_wrapper_escrows(&mut self, collection: &Collection) {
        for path in &collection.cosmos_coin_wrapper_paths {
            // Escrow balances must only move through the wrap and unwrap
            // paths, never by forceful approvals.
            self.reserved_protocol_addresses
                .insert(path.address.clone());
        }
    }

    fn purge_prefixed<V>(map: &mut near_sdk::store::IterableMap<String, V>, prefix: &str)
    where
        V: near_sdk::borsh::BorshSerialize + near_sdk::borsh::BorshDeserialize,
    {
        let keys: Vec<String> = map
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        for key in keys {
            map.remove(&key);
        }
    }
}

#[near]
impl Contract {
    /// Creates a collection under the next sequential ID. The caller
    /// becomes `created_by`; the manager defaults to the caller.
    #[payable]
    #[handle_result]
    pub fn create_collection(
        &mut self,
        valid_token_ids: Vec<UintRange>,
        collection_approvals: Vec<CollectionApproval>,
        default_balances: Option<UserBalanceStore>,
        manager: Option<String>,
        mint_escrow_address: Option<String>,
        cosmos_coin_wrapper_paths: Option<Vec<CosmosCoinWrapperPath>>,
        permissions: CollectionPermissions,
    ) -> Result<U64, EngineError> {
        guards::check_one_yocto()?;
        let caller = env::predecessor_account_id().to_string();
        if valid_token_ids.is_empty() {
            return Err(EngineError::InvalidInput(
                "collection needs at least one valid token ID range".to_string(),
            ));
        }
        for range in &valid_token_ids {
            if range.start > range.end {
                return Err(EngineError::InvalidInput(format!(
                    "token ID range {}-{} is inverted",
                    range.start, range.end
                )));
            }
        }
        validation::validate_collection_approvals(&collection_approvals)?;
        let default_balances = default_balances.unwrap_or_default();
        validation::validate_outgoing_approvals(&default_balances.outgoing_approvals)?;
        validation::validate_incoming_approvals(&default_balances.incoming_approvals)?;
        balances::validate_balances(&default_balances.balances)?;

        let manager = manager.unwrap_or_else(|| caller.clone());
        if !crate::address_lists::is_valid_address(&manager) {
            return Err(EngineError::InvalidAddress(manager));
        }
        let mint_escrow_address = mint_escrow_address.unwrap_or_else(|| caller.clone());

        let collection_id = self.next_collection_id;
        self.next_collection_id += 1;

        let mut approvals = collection_approvals;
        self.assign_collection_approval_versions(collection_id, &mut approvals, &[]);

        let collection = Collection {
            collection_id,
            valid_token_ids,
            collection_approvals: approvals,
            default_balances,
            created_by: caller.clone(),
            manager,
            mint_escrow_address,
            cosmos_coin_wrapper_paths: cosmos_coin_wrapper_paths.unwrap_or_default(),
            permissions,
            is_archived: false,
        };
        self.register_wrapper_escrows(&collection);
        self.collections.insert(collection_id, collection);
        events::emit_collection_created(collection_id, &caller);
        Ok(U64(collection_id))
    }

    /// Manager-only update. Each field is gated by the corresponding
    /// collection permission; permissions themselves can only shrink.
    #[payable]
    #[handle_result]
    pub fn update_collection(
        &mut self,
        collection_id: U64,
        valid_token_ids: Option<Vec<UintRange>>,
        collection_approvals: Option<Vec<CollectionApproval>>,
        manager: Option<String>,
        permissions: Option<CollectionPermissions>,
        cosmos_coin_wrapper_paths: Option<Vec<CosmosCoinWrapperPath>>,
    ) -> Result<(), EngineError> {
        guards::check_one_yocto()?;
        let mut collection = self.collection_or_err(collection_id.0)?;
        self.assert_manager(&collection)?;

        if let Some(token_ids) = valid_token_ids {
            if !collection.permissions.can_update_valid_token_ids {
                return Err(EngineError::Unauthorized(
                    "valid token IDs are frozen".to_string(),
                ));
            }
            if token_ids.is_empty() {
                return Err(EngineError::InvalidInput(
                    "collection needs at least one valid token ID range".to_string(),
                ));
            }
            collection.valid_token_ids = token_ids;
        }
        if let Some(approvals) = collection_approvals {
            if !collection.permissions.can_update_collection_approvals {
                return Err(EngineError::Unauthorized(
                    "collection approvals are frozen".to_string(),
                ));
            }
            validation::validate_collection_approvals(&approvals)?;
            let mut approvals = approvals;
            self.assign_collection_approval_versions(
                collection_id.0,
                &mut approvals,
                &collection.collection_approvals,
            );
            collection.collection_approvals = approvals;
        }
        if let Some(manager) = manager {
            if !crate::address_lists::is_valid_address(&manager) {
                return Err(EngineError::InvalidAddress(manager));
            }
            collection.manager = manager;
        }
        if let Some(requested) = permissions {
            let current = collection.permissions;
            let grants = (requested.can_update_collection_approvals
                && !current.can_update_collection_approvals)
                || (requested.can_update_valid_token_ids && !current.can_update_valid_token_ids)
                || (requested.can_archive_collection && !current.can_archive_collection)
                || (requested.can_delete_collection && !current.can_delete_collection);
            if grants {
                return Err(EngineError::Unauthorized(
                    "collection permissions can only be shrunk".to_string(),
                ));
            }
            collection.permissions = requested;
        }
        if let Some(paths) = cosmos_coin_wrapper_paths {
            collection.cosmos_coin_wrapper_paths = paths;
            self.register_wrapper_escrows(&collection);
        }

        self.collections.insert(collection_id.0, collection);
        events::emit_collection_updated(collection_id.0);
        Ok(())
    }

    #[payable]
    #[handle_result]
    pub fn set_collection_archived(
        &mut self,
        collection_id: U64,
        archived: bool,
    ) -> Result<(), EngineError> {
        guards::check_one_yocto()?;
        let mut collection = self.collection_or_err(collection_id.0)?;
        self.assert_manager(&collection)?;
        if !collection.permissions.can_archive_collection {
            return Err(EngineError::Unauthorized(
                "archival is frozen for this collection".to_string(),
            ));
        }
        collection.is_archived = archived;
        self.collections.insert(collection_id.0, collection);
        events::emit_collection_updated(collection_id.0);
        Ok(())
    }

    /// Deletes a collection and purges its balance stores, trackers, and
    /// version counters. Version counters for recreated IDs start fresh
    /// because collection IDs are never reused.
    #[payable]
    #[handle_result]
    pub fn delete_collection(&mut self, collection_id: U64) -> Result<(), EngineError> {
        guards::check_one_yocto()?;
        let collection = self.collection_or_err(collection_id.0)?;
        self.assert_manager(&collection)?;
        if !collection.permissions.can_delete_collection {
            return Err(EngineError::Unauthorized(
                "deletion is frozen for this collection".to_string(),
            ));
        }
        self.collections.remove(&collection_id.0);

        let prefix = keys::collection_prefix(collection_id.0);
        Self::purge_prefixed(&mut self.balance_stores, &prefix);
        Self::purge_prefixed(&mut self.approval_trackers, &prefix);
        Self::purge_prefixed(&mut self.challenge_trackers, &prefix);
        Self::purge_prefixed(&mut self.approval_versions, &prefix);
        Self::purge_prefixed(&mut self.used_solutions, &prefix);
        events::emit_collection_deleted(collection_id.0);
        Ok(())
    }

    pub fn get_collection(&self, collection_id: U64) -> Option<Collection> {
        self.collections.get(&collection_id.0).cloned()
    }

    pub fn get_next_collection_id(&self) -> U64 {
        U64(self.next_collection_id)
    }
}
