//! Authority-gated module administration: parameters, the
//! reserved-protocol set, and the classification registries.

use near_sdk::{env, near, AccountId};

use crate::constants::BASIS_POINTS;
use crate::errors::EngineError;
use crate::events;
use crate::guards;
use crate::{Contract, ContractExt};

/// Module parameters, editable only by the governance authority.
#[near(serializers = [borsh, json])]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Params {
    /// Empty means every denom is allowed in coin transfers.
    #[serde(default)]
    pub allowed_denoms: Vec<String>,
    /// Affiliate share of the protocol fee, in basis points.
    #[serde(default)]
    pub affiliate_percentage: u16,
    /// Recipient of the non-affiliate share of the protocol fee.
    pub community_pool: String,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            allowed_denoms: Vec::new(),
            affiliate_percentage: 0,
            community_pool: "community-pool".to_string(),
        }
    }
}

#[near]
impl Contract {
    #[payable]
    #[handle_result]
    pub fn update_params(
        &mut self,
        allowed_denoms: Option<Vec<String>>,
        affiliate_percentage: Option<u16>,
        community_pool: Option<String>,
    ) -> Result<(), EngineError> {
        guards::check_one_yocto()?;
        self.check_authority()?;
        if let Some(denoms) = allowed_denoms {
            self.params.allowed_denoms = denoms;
        }
        if let Some(bps) = affiliate_percentage {
            if bps > BASIS_POINTS {
                return Err(EngineError::InvalidInput(format!(
                    "affiliate percentage {} exceeds {} basis points",
                    bps, BASIS_POINTS
                )));
            }
            self.params.affiliate_percentage = bps;
        }
        if let Some(pool) = community_pool {
            if !crate::address_lists::is_valid_address(&pool) {
                return Err(EngineError::InvalidAddress(pool));
            }
            self.params.community_pool = pool;
        }
        events::emit_params_updated();
        Ok(())
    }

    /// Adds or removes a reserved-protocol address. Transfers that force
    /// balances out of such an address are refused by the evaluator.
    #[payable]
    #[handle_result]
    pub fn set_reserved_protocol_address(
        &mut self,
        address: String,
        reserved: bool,
    ) -> Result<(), EngineError> {
        guards::check_one_yocto()?;
        self.check_authority()?;
        if !crate::address_lists::is_valid_address(&address) {
            return Err(EngineError::InvalidAddress(address));
        }
        if reserved {
            self.reserved_protocol_addresses.insert(address);
        } else {
            self.reserved_protocol_addresses.remove(&address);
        }
        Ok(())
    }

    /// Registers or clears an address in the WASM-contract registry used by
    /// sender/recipient/initiator classification checks.
    #[payable]
    #[handle_result]
    pub fn register_wasm_contract(
        &mut self,
        address: AccountId,
        registered: bool,
    ) -> Result<(), EngineError> {
        guards::check_one_yocto()?;
        self.check_authority()?;
        if registered {
            self.wasm_contracts.insert(address);
        } else {
            self.wasm_contracts.remove(&address);
        }
        Ok(())
    }

    /// Pool addresses are also reserved-protocol: their balances may never
    /// be moved forcefully.
    #[payable]
    #[handle_result]
    pub fn register_pool_address(
        &mut self,
        address: AccountId,
        registered: bool,
    ) -> Result<(), EngineError> {
        guards::check_one_yocto()?;
        self.check_authority()?;
        if registered {
            self.pool_addresses.insert(address.clone());
            self.reserved_protocol_addresses.insert(address.to_string());
        } else {
            self.pool_addresses.remove(&address);
            self.reserved_protocol_addresses.remove(address.as_str());
        }
        Ok(())
    }

    #[payable]
    #[handle_result]
    pub fn transfer_authority(&mut self, new_authority: AccountId) -> Result<(), EngineError> {
        guards::check_one_yocto()?;
        self.check_authority()?;
        if new_authority == self.authority {
            return Err(EngineError::InvalidInput(
                "new authority must differ from current authority".to_string(),
            ));
        }
        let previous = self.authority.clone();
        self.authority = new_authority;
        events::emit_authority_transferred(&previous, &self.authority);
        Ok(())
    }

    pub fn get_authority(&self) -> &AccountId {
        &self.authority
    }

    pub fn get_params(&self) -> &Params {
        &self.params
    }

    pub fn is_reserved_protocol_address(&self, address: String) -> bool {
        self.reserved_protocol_addresses.contains(&address)
    }
}
