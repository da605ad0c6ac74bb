//! Coin representations of collection balances.
//!
//! A wrapper path turns token balances into fungible ledger coins:
//! wrapping escrows `template × units` balances at the path address and
//! credits `units` of `wrapped:<collectionId>:<pathId>` (or the `alias:`
//! form when the path allows it); unwrapping burns the coins and releases
//! the escrow. IBC denom hashes can be checked against their canonical
//! trace string.

use near_sdk::json_types::{U128, U64};
use near_sdk::{env, near};

use crate::balances::{self, Balance};
use crate::collections::types::{Collection, CosmosCoinWrapperPath};
use crate::constants::{ALIAS_DENOM_PREFIX, IBC_DENOM_PREFIX, WRAPPED_DENOM_PREFIX};
use crate::errors::EngineError;
use crate::events;
use crate::{guards, Contract, ContractExt};

pub fn wrapped_denom(collection_id: u64, path_id: &str) -> String {
    format!("{}:{}:{}", WRAPPED_DENOM_PREFIX, collection_id, path_id)
}

pub fn alias_denom(collection_id: u64, path_id: &str) -> String {
    format!("{}:{}:{}", ALIAS_DENOM_PREFIX, collection_id, path_id)
}

/// Parses a `wrapped:` or `alias:` denom into `(collection_id, path_id)`.
pub fn parse_path_denom(denom: &str) -> Result<(u64, String, bool), EngineError> {
    let mut parts = denom.splitn(3, ':');
    let prefix = parts.next().unwrap_or_default();
    let alias = match prefix {
        WRAPPED_DENOM_PREFIX => false,
        ALIAS_DENOM_PREFIX => true,
        _ => return Err(EngineError::InvalidDenom(denom.to_string())),
    };
    let collection_id = parts
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or_else(|| EngineError::InvalidDenom(denom.to_string()))?;
    let path_id = parts
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| EngineError::InvalidDenom(denom.to_string()))?;
    Ok((collection_id, path_id.to_string(), alias))
}

/// Scales a wrapper path's template balances by `units`.
fn scaled_template(
    template: &[Balance],
    units: u128,
) -> Result<Vec<Balance>, EngineError> {
    let mut scaled = Vec::with_capacity(template.len());
    for balance in template {
        let amount = balance
            .amount
            .0
            .checked_mul(units)
            .ok_or_else(EngineError::amount_overflow)?;
        scaled.push(Balance::new(
            amount,
            balance.token_ids.clone(),
            balance.ownership_times.clone(),
        ));
    }
    Ok(scaled)
}

fn path_or_err<'a>(
    collection: &'a Collection,
    path_id: &str,
) -> Result<&'a CosmosCoinWrapperPath, EngineError> {
    collection
        .cosmos_coin_wrapper_paths
        .iter()
        .find(|p| p.path_id == path_id)
        .ok_or_else(|| EngineError::NotFound(format!("wrapper path {}", path_id)))
}

/// Validates an `ibc/<64-hex>` denom against its canonical trace string
/// and returns the canonical form. The hash is the uppercase-hex SHA-256
/// of the trace, per the IBC transfer convention.
pub fn unwrap_ibc_denom(denom: &str, canonical: &str) -> Result<String, EngineError> {
    let hash = denom
        .strip_prefix(IBC_DENOM_PREFIX)
        .ok_or_else(|| EngineError::InvalidDenom(denom.to_string()))?;
    if hash.len() != 64 || hex::decode(hash).is_err() {
        return Err(EngineError::InvalidDenom(denom.to_string()));
    }
    let expected = hex::encode_upper(env::sha256(canonical.as_bytes()));
    if !hash.eq_ignore_ascii_case(&expected) {
        return Err(EngineError::InvalidConversion(format!(
            "{} does not hash to {}",
            canonical, denom
        )));
    }
    Ok(canonical.to_string())
}

#[near]
impl Contract {
    /// Escrows `template × units` of the caller's balances at the wrapper
    /// path address and credits `units` of the path's denom.
    #[payable]
    #[handle_result]
    pub fn wrap_tokens(
        &mut self,
        collection_id: U64,
        path_id: String,
        units: U128,
    ) -> Result<(), EngineError> {
        guards::check_one_yocto()?;
        if units.0 == 0 {
            return Err(EngineError::InvalidInput("cannot wrap zero units".to_string()));
        }
        let caller = env::predecessor_account_id().to_string();
        let collection = self.collection_or_err(collection_id.0)?;
        let path = path_or_err(&collection, &path_id)?.clone();
        let escrowed = scaled_template(&path.balances, units.0)?;

        let mut caller_store = self.balance_store_or_default(&collection, &caller);
        caller_store.balances = balances::subtract_balances(&caller_store.balances, &escrowed)?;
        self.save_balance_store(collection_id.0, &caller, caller_store);

        let mut escrow_store = self.balance_store_or_default(&collection, &path.address);
        escrow_store.balances = balances::add_balances(&escrow_store.balances, &escrowed)?;
        self.save_balance_store(collection_id.0, &path.address, escrow_store);

        let denom = if path.allow_alias {
            alias_denom(collection_id.0, &path_id)
        } else {
            wrapped_denom(collection_id.0, &path_id)
        };
        self.ledger_credit(&caller, &denom, units.0)?;
        events::emit_tokens_wrapped(collection_id.0, &caller, &denom, units.0);
        Ok(())
    }

    /// Burns `units` of a path denom from the caller and releases the
    /// matching escrowed balances. Exact inverse of `wrap_tokens`.
    #[payable]
    #[handle_result]
    pub fn unwrap_tokens(&mut self, denom: String, units: U128) -> Result<(), EngineError> {
        guards::check_one_yocto()?;
        if units.0 == 0 {
            return Err(EngineError::InvalidInput("cannot unwrap zero units".to_string()));
        }
        let caller = env::predecessor_account_id().to_string();
        let (collection_id, path_id, alias) = parse_path_denom(&denom)?;
        let collection = self.collection_or_err(collection_id)?;
        let path = path_or_err(&collection, &path_id)?.clone();
        if alias && !path.allow_alias {
            return Err(EngineError::InvalidDenom(denom.clone()));
        }
        let released = scaled_template(&path.balances, units.0)?;

        self.ledger_debit(&caller, &denom, units.0)?;

        let mut escrow_store = self.balance_store_or_default(&collection, &path.address);
        escrow_store.balances = balances::subtract_balances(&escrow_store.balances, &released)?;
        self.save_balance_store(collection_id, &path.address, escrow_store);

        let mut caller_store = self.balance_store_or_default(&collection, &caller);
        caller_store.balances = balances::add_balances(&caller_store.balances, &released)?;
        self.save_balance_store(collection_id, &caller, caller_store);

        events::emit_tokens_unwrapped(collection_id, &caller, &denom, units.0);
        Ok(())
    }

    /// Validates an IBC denom hash against its canonical trace and returns
    /// the canonical denom string.
    #[handle_result]
    pub fn unwrap_ibc_denom(
        &self,
        denom: String,
        canonical: String,
    ) -> Result<String, EngineError> {
        unwrap_ibc_denom(&denom, &canonical)
    }
}
