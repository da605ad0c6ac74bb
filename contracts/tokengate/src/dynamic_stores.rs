//! Dynamic stores: creator-owned per-address counters consulted by
//! dynamic-store challenges. A value of zero means no uses left.

use near_sdk::json_types::U64;
use near_sdk::{env, near};

use crate::errors::EngineError;
use crate::events;
use crate::storage::keys;
use crate::{guards, Contract, ContractExt};

#[near(serializers = [borsh, json])]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DynamicStore {
    pub store_id: u64,
    pub created_by: String,
    /// Applied to any address without an explicit value.
    #[serde(default)]
    pub default_value: u64,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub custom_data: Option<String>,
}

impl Contract {
    pub(crate) fn dynamic_store_value(&self, store_id: u64, address: &str) -> u64 {
        match self
            .dynamic_store_values
            .get(&keys::dynamic_store_value_key(store_id, address))
        {
            Some(value) => *value,
            None => self
                .dynamic_stores
                .get(&store_id)
                .map(|s| s.default_value)
                .unwrap_or(0),
        }
    }

    /// Challenge commit hook. Saturates at zero so a concurrent explicit
    /// set cannot strand the counter.
    pub(crate) fn decrement_dynamic_store_value(&mut self, store_id: u64, address: &str) {
        let value = self.dynamic_store_value(store_id, address);
        self.dynamic_store_values.insert(
            keys::dynamic_store_value_key(store_id, address),
            value.saturating_sub(1),
        );
    }

    fn store_creator_or_err(&self, store_id: u64) -> Result<DynamicStore, EngineError> {
        let store = self
            .dynamic_stores
            .get(&store_id)
            .cloned()
            .ok_or_else(|| EngineError::NotFound(format!("dynamic store {}", store_id)))?;
        if env::predecessor_account_id().as_str() != store.created_by {
            return Err(EngineError::Unauthorized(
                "only the store creator may modify it".to_string(),
            ));
        }
        Ok(store)
    }
}

#[near]
impl Contract {
    #[payable]
    #[handle_result]
    pub fn create_dynamic_store(
        &mut self,
        default_value: Option<U64>,
        uri: Option<String>,
        custom_data: Option<String>,
    ) -> Result<U64, EngineError> {
        guards::check_one_yocto()?;
        let caller = env::predecessor_account_id().to_string();
        let store_id = self.next_dynamic_store_id;
        self.next_dynamic_store_id += 1;
        self.dynamic_stores.insert(
            store_id,
            DynamicStore {
                store_id,
                created_by: caller.clone(),
                default_value: default_value.map(|v| v.0).unwrap_or(0),
                uri,
                custom_data,
            },
        );
        events::emit_dynamic_store_created(store_id, &caller);
        Ok(U64(store_id))
    }

    #[payable]
    #[handle_result]
    pub fn update_dynamic_store(
        &mut self,
        store_id: U64,
        default_value: Option<U64>,
        uri: Option<String>,
        custom_data: Option<String>,
    ) -> Result<(), EngineError> {
        guards::check_one_yocto()?;
        let mut store = self.store_creator_or_err(store_id.0)?;
        if let Some(value) = default_value {
            store.default_value = value.0;
        }
        if uri.is_some() {
            store.uri = uri;
        }
        if custom_data.is_some() {
            store.custom_data = custom_data;
        }
        self.dynamic_stores.insert(store_id.0, store);
        Ok(())
    }

    /// Deletes the store definition. Per-address values become dead keys
    /// read as zero; they are not walked here.
    #[payable]
    #[handle_result]
    pub fn delete_dynamic_store(&mut self, store_id: U64) -> Result<(), EngineError> {
        guards::check_one_yocto()?;
        self.store_creator_or_err(store_id.0)?;
        self.dynamic_stores.remove(&store_id.0);
        Ok(())
    }

    #[payable]
    #[handle_result]
    pub fn set_dynamic_store_value(
        &mut self,
        store_id: U64,
        address: String,
        value: U64,
    ) -> Result<(), EngineError> {
        guards::check_one_yocto()?;
        self.store_creator_or_err(store_id.0)?;
        self.dynamic_store_values
            .insert(keys::dynamic_store_value_key(store_id.0, &address), value.0);
        Ok(())
    }

    #[payable]
    #[handle_result]
    pub fn increment_dynamic_store_value(
        &mut self,
        store_id: U64,
        address: String,
        amount: U64,
    ) -> Result<(), EngineError> {
        guards::check_one_yocto()?;
        self.store_creator_or_err(store_id.0)?;
        let current = self.dynamic_store_value(store_id.0, &address);
        let updated = current
            .checked_add(amount.0)
            .ok_or_else(EngineError::amount_overflow)?;
        self.dynamic_store_values
            .insert(keys::dynamic_store_value_key(store_id.0, &address), updated);
        Ok(())
    }

    #[payable]
    #[handle_result]
    pub fn decrement_dynamic_store_value_by(
        &mut self,
        store_id: U64,
        address: String,
        amount: U64,
        set_to_zero_on_underflow: bool,
    ) -> Result<(), EngineError> {
        guards::check_one_yocto()?;
        self.store_creator_or_err(store_id.0)?;
        let current = self.dynamic_store_value(store_id.0, &address);
        let updated = match current.checked_sub(amount.0) {
            Some(value) => value,
            None if set_to_zero_on_underflow => 0,
            None => {
                return Err(EngineError::Underflow(format!(
                    "dynamic store {} holds {} for {} but {} was requested",
                    store_id.0, current, address, amount.0
                )));
            }
        };
        self.dynamic_store_values
            .insert(keys::dynamic_store_value_key(store_id.0, &address), updated);
        Ok(())
    }

    pub fn get_dynamic_store(&self, store_id: U64) -> Option<DynamicStore> {
        self.dynamic_stores.get(&store_id.0).cloned()
    }

    pub fn get_dynamic_store_value(&self, store_id: U64, address: String) -> U64 {
        U64(self.dynamic_store_value(store_id.0, &address))
    }
}
