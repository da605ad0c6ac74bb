//! MustOwnTokens challenges: the named party must hold amounts within a
//! range in another (or the same) collection.

use crate::approvals::types::MustOwnTokens;
use crate::balances;
use crate::challenges::resolve_party;
use crate::errors::EngineError;
use crate::ranges::UintRange;
use crate::Contract;

impl Contract {
    pub(crate) fn check_must_own_tokens(
        &self,
        requirement: &MustOwnTokens,
        initiator: &str,
        sender: &str,
        recipient: &str,
        now: u64,
    ) -> Result<(), EngineError> {
        let party = resolve_party(&requirement.ownership_check_party, initiator, sender, recipient);

        let target = self
            .collections
            .get(&requirement.collection_id)
            .ok_or_else(|| EngineError::collection_not_found(requirement.collection_id))?;
        let store = self.balance_store_or_default(target, &party);

        let ownership_times = if requirement.override_with_current_time {
            vec![UintRange::new(now, now)]
        } else {
            requirement.ownership_times.clone()
        };

        let cells = crate::ranges::cells_of(&requirement.token_ids, &ownership_times);
        let mut any_in_range = false;
        // An empty query must not satisfy the all-assets quantifier vacuously.
        let mut all_in_range = !cells.is_empty();
        for cell in cells {
            for (_, amount) in balances::amounts_for_cell(cell, &store.balances) {
                let in_range = requirement.amount_range.start.0 <= amount
                    && amount <= requirement.amount_range.end.0;
                any_in_range |= in_range;
                all_in_range &= in_range;
            }
        }

        let satisfied = if requirement.must_satisfy_for_all_assets {
            all_in_range
        } else {
            any_in_range
        };
        if !satisfied {
            return Err(EngineError::DisallowedTransfer(format!(
                "{} does not own the required amounts in collection {}",
                party, requirement.collection_id
            )));
        }
        Ok(())
    }
}
