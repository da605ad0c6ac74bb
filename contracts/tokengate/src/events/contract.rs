use near_sdk::AccountId;

use super::builder::EventBuilder;
use super::CONTRACT;

pub fn emit_authority_transferred(old_authority: &AccountId, new_authority: &AccountId) {
    EventBuilder::new(CONTRACT, "authority_transferred", old_authority)
        .field("old_authority", old_authority)
        .field("new_authority", new_authority)
        .emit();
}

pub fn emit_params_updated() {
    EventBuilder::new(CONTRACT, "params_updated", "authority").emit();
}
