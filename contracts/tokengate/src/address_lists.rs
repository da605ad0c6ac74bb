//! Address-list storage and resolution.
//!
//! A list id resolves to a predicate over addresses. Reserved keywords,
//! `!` inversion, `AllWithout` complements, and colon-joined ephemeral lists
//! are resolved without touching storage; anything else is a stored list.
//! Resolution never recurses into stored-list references.

use near_sdk::json_types::U64;
use near_sdk::{env, near, AccountId};

use crate::constants::*;
use crate::errors::EngineError;
use crate::events;
use crate::{Contract, ContractExt};

#[near(serializers = [borsh, json])]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddressList {
    pub list_id: String,
    pub addresses: Vec<String>,
    /// `true`: the list equals the given set. `false`: its complement.
    pub include_addresses: bool,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub custom_data: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
}

impl AddressList {
    pub fn check(&self, address: &str) -> bool {
        let listed = self.addresses.iter().any(|a| a == address);
        listed == self.include_addresses
    }

    fn inverted(mut self) -> Self {
        self.include_addresses = !self.include_addresses;
        self
    }
}

pub fn is_valid_address(address: &str) -> bool {
    address.parse::<AccountId>().is_ok()
}

fn colon_list(spec: &str) -> Option<Vec<String>> {
    let parts: Vec<&str> = spec.split(LEDGER_DELIMITER).collect();
    if parts.is_empty() || parts.iter().any(|p| !is_valid_address(p)) {
        return None;
    }
    Some(parts.iter().map(|p| p.to_string()).collect())
}

impl Contract {
    /// Resolves a list id to its predicate. `manager` feeds the reserved
    /// `Manager` keyword and is empty outside a collection context.
    pub(crate) fn resolve_address_list(
        &self,
        list_id: &str,
        manager: &str,
    ) -> Result<AddressList, EngineError> {
        if let Some(inner) = list_id.strip_prefix('!') {
            return Ok(self.resolve_address_list(inner, manager)?.inverted());
        }

        let literal = |addresses: Vec<String>, include: bool| AddressList {
            list_id: list_id.to_string(),
            addresses,
            include_addresses: include,
            uri: None,
            custom_data: None,
            created_by: None,
        };

        match list_id {
            MINT_ADDRESS => return Ok(literal(vec![MINT_ADDRESS.to_string()], true)),
            LIST_ALL | LIST_ALL_WITH_MINT => return Ok(literal(vec![], false)),
            LIST_ALL_WITHOUT_MINT => return Ok(literal(vec![MINT_ADDRESS.to_string()], false)),
            LIST_NONE => return Ok(literal(vec![], true)),
            LIST_MANAGER => {
                if manager.is_empty() {
                    return Err(EngineError::InvalidAddressListId(
                        "Manager list resolved outside a collection context".to_string(),
                    ));
                }
                return Ok(literal(vec![manager.to_string()], true));
            }
            _ => {}
        }

        if let Some(rest) = list_id.strip_prefix(LIST_ALL_WITHOUT_PREFIX) {
            let addresses = colon_list(rest).ok_or_else(|| {
                EngineError::InvalidAddressListId(format!(
                    "AllWithout list contains an invalid address: {}",
                    rest
                ))
            })?;
            return Ok(literal(addresses, false));
        }

        if let Some(addresses) = colon_list(list_id) {
            return Ok(literal(addresses, true));
        }

        self.address_lists
            .get(list_id)
            .cloned()
            .ok_or_else(|| EngineError::list_not_found(list_id))
    }

    pub(crate) fn check_address(
        &self,
        list_id: &str,
        address: &str,
        manager: &str,
    ) -> Result<bool, EngineError> {
        Ok(self.resolve_address_list(list_id, manager)?.check(address))
    }
}

/// Creation rules: user-created ids may not collide with any reserved form.
pub(crate) fn validate_new_list_id(list_id: &str) -> Result<(), EngineError> {
    if list_id.is_empty() {
        return Err(EngineError::InvalidAddressListId("empty list id".to_string()));
    }
    let reserved = [
        MINT_ADDRESS,
        LIST_ALL,
        LIST_ALL_WITH_MINT,
        LIST_ALL_WITHOUT_MINT,
        LIST_NONE,
        LIST_MANAGER,
    ];
    if reserved.contains(&list_id) {
        return Err(EngineError::InvalidAddressListId(format!(
            "{} is a reserved keyword",
            list_id
        )));
    }
    if list_id.starts_with(LIST_ALL_WITHOUT_PREFIX) || list_id.starts_with('!') {
        return Err(EngineError::InvalidAddressListId(format!(
            "{} collides with a reserved prefix",
            list_id
        )));
    }
    if list_id.contains(':') || list_id.contains('_') {
        return Err(EngineError::InvalidAddressListId(format!(
            "{} contains a forbidden character",
            list_id
        )));
    }
    if is_valid_address(list_id) {
        return Err(EngineError::InvalidAddressListId(format!(
            "{} is itself a valid address",
            list_id
        )));
    }
    Ok(())
}

#[near]
impl Contract {
    #[payable]
    #[handle_result]
    pub fn create_address_list(&mut self, list: AddressList) -> Result<(), EngineError> {
        crate::guards::check_at_least_one_yocto()?;
        self.create_address_list_internal(list, &env::predecessor_account_id())
    }

    #[payable]
    #[handle_result]
    pub fn create_address_lists(&mut self, lists: Vec<AddressList>) -> Result<(), EngineError> {
        crate::guards::check_at_least_one_yocto()?;
        let creator = env::predecessor_account_id();
        for list in lists {
            self.create_address_list_internal(list, &creator)?;
        }
        Ok(())
    }

    pub(crate) fn create_address_list_internal(
        &mut self,
        mut list: AddressList,
        creator: &AccountId,
    ) -> Result<(), EngineError> {
        validate_new_list_id(&list.list_id)?;
        if self.address_lists.contains_key(&list.list_id) {
            return Err(EngineError::InvalidAddressListId(format!(
                "list {} already exists",
                list.list_id
            )));
        }
        if list.addresses.len() > MAX_ADDRESSES_PER_LIST {
            return Err(EngineError::InvalidInput(format!(
                "list exceeds {} addresses",
                MAX_ADDRESSES_PER_LIST
            )));
        }
        for address in &list.addresses {
            if !is_valid_address(address) && address != MINT_ADDRESS {
                return Err(EngineError::InvalidAddress(address.clone()));
            }
        }
        list.created_by = Some(creator.to_string());
        events::emit_address_list_created(creator, &list.list_id, list.addresses.len());
        self.address_lists.insert(list.list_id.clone(), list);
        Ok(())
    }

    pub fn get_address_list(&self, list_id: String) -> Option<&AddressList> {
        self.address_lists.get(&list_id)
    }

    pub fn check_list_membership(&self, list_id: String, address: String) -> bool {
        self.check_address(&list_id, &address, "").unwrap_or(false)
    }

    pub fn get_address_lists(&self, from_index: U64, limit: U64) -> Vec<&AddressList> {
        self.address_lists
            .values()
            .skip(from_index.0 as usize)
            .take(limit.0 as usize)
            .collect()
    }
}
