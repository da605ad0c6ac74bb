//! Address-classification checks against the WASM-contract and
//! liquidity-pool registries. An address missing from a registry classifies
//! as "not a contract" / "not a pool"; the check never errors on
//! registry absence, so these flags stay usable without those modules.

use near_sdk::AccountId;

use crate::approvals::types::AddressChecks;
use crate::errors::EngineError;
use crate::Contract;

impl Contract {
    pub(crate) fn is_wasm_contract(&self, address: &str) -> bool {
        address
            .parse::<AccountId>()
            .map(|id| self.wasm_contracts.contains(&id))
            .unwrap_or(false)
    }

    pub(crate) fn is_liquidity_pool(&self, address: &str) -> bool {
        address
            .parse::<AccountId>()
            .map(|id| self.pool_addresses.contains(&id))
            .unwrap_or(false)
    }

    pub(crate) fn check_address_classification(
        &self,
        checks: &AddressChecks,
        address: &str,
        role: &str,
    ) -> Result<(), EngineError> {
        let is_contract = self.is_wasm_contract(address);
        let is_pool = self.is_liquidity_pool(address);

        if checks.must_be_wasm_contract && !is_contract {
            return Err(EngineError::DisallowedTransfer(format!(
                "{} {} must be a WASM contract",
                role, address
            )));
        }
        if checks.must_not_be_wasm_contract && is_contract {
            return Err(EngineError::DisallowedTransfer(format!(
                "{} {} must not be a WASM contract",
                role, address
            )));
        }
        if checks.must_be_liquidity_pool && !is_pool {
            return Err(EngineError::DisallowedTransfer(format!(
                "{} {} must be a liquidity pool",
                role, address
            )));
        }
        if checks.must_not_be_liquidity_pool && is_pool {
            return Err(EngineError::DisallowedTransfer(format!(
                "{} {} must not be a liquidity pool",
                role, address
            )));
        }
        Ok(())
    }
}
