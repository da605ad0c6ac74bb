//! Dynamic-store challenges: decrement-on-use counters of permitted uses
//! per address.

use crate::approvals::types::DynamicStoreChallenge;
use crate::challenges::{resolve_party, ChallengeWrite};
use crate::errors::EngineError;
use crate::Contract;

impl Contract {
    /// Checks the party has a use left; the decrement itself is deferred to
    /// the commit phase (and skipped entirely in simulation mode).
    pub(crate) fn satisfy_dynamic_store_challenge(
        &self,
        challenge: &DynamicStoreChallenge,
        initiator: &str,
        sender: &str,
        recipient: &str,
    ) -> Result<Vec<ChallengeWrite>, EngineError> {
        let party = resolve_party(&challenge.ownership_check_party, initiator, sender, recipient);

        if !self.dynamic_stores.contains_key(&challenge.store_id) {
            return Err(EngineError::NotFound(format!(
                "dynamic store {}",
                challenge.store_id
            )));
        }
        let value = self.dynamic_store_value(challenge.store_id, &party);
        if value == 0 {
            return Err(EngineError::DisallowedTransfer(format!(
                "{} has no uses left in dynamic store {}",
                party, challenge.store_id
            )));
        }
        Ok(vec![ChallengeWrite::DynamicStoreDecrement {
            store_id: challenge.store_id,
            address: party,
        }])
    }
}
