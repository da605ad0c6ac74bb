use near_sdk::AccountId;

use super::builder::EventBuilder;
use super::COIN;

pub fn emit_coins_deposited(account: &AccountId, amount: u128) {
    EventBuilder::new(COIN, "coins_deposited", account)
        .field("amount", amount.to_string())
        .emit();
}

pub fn emit_coins_withdrawn(account: &AccountId, amount: u128) {
    EventBuilder::new(COIN, "coins_withdrawn", account)
        .field("amount", amount.to_string())
        .emit();
}

pub fn emit_tokens_wrapped(collection_id: u64, account: &str, denom: &str, units: u128) {
    EventBuilder::new(COIN, "tokens_wrapped", account)
        .field("collection_id", collection_id.to_string())
        .field("denom", denom)
        .field("units", units.to_string())
        .emit();
}

pub fn emit_tokens_unwrapped(collection_id: u64, account: &str, denom: &str, units: u128) {
    EventBuilder::new(COIN, "tokens_unwrapped", account)
        .field("collection_id", collection_id.to_string())
        .field("denom", denom)
        .field("units", units.to_string())
        .emit();
}
