//! Auxiliary challenge predicates an approval may impose.
//!
//! Each evaluator validates without writing; the state writes it needs
//! (leaf-use counts, used solution hashes, dynamic-store decrements) come
//! back as [`ChallengeWrite`]s and are applied only once the whole approval
//! passes.

pub mod alt_time;
pub mod classification;
pub mod dynamic_store;
pub mod eth_signature;
pub mod merkle;
pub mod must_own;
pub mod zk;

use crate::constants::MINT_ADDRESS;
use crate::Contract;

/// A deferred challenge-state write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChallengeWrite {
    /// Increment a merkle challenge tracker (keyed by leaf index).
    ChallengeUse(String),
    /// Mark a zk-proof or signature hash as consumed.
    UsedSolution(String),
    /// Consume one use from a dynamic store for an address.
    DynamicStoreDecrement { store_id: u64, address: String },
}

impl Contract {
    pub(crate) fn apply_challenge_writes(&mut self, writes: Vec<ChallengeWrite>) {
        for write in writes {
            match write {
                ChallengeWrite::ChallengeUse(key) => self.record_challenge_use(key),
                ChallengeWrite::UsedSolution(key) => {
                    self.used_solutions.insert(key, true);
                }
                ChallengeWrite::DynamicStoreDecrement { store_id, address } => {
                    self.decrement_dynamic_store_value(store_id, &address);
                }
            }
        }
    }
}

/// Resolves an ownership-check party spec. Empty or unrecognized specs fall
/// back to the initiator.
pub fn resolve_party(spec: &str, initiator: &str, sender: &str, recipient: &str) -> String {
    match spec {
        "sender" => sender.to_string(),
        "recipient" => recipient.to_string(),
        MINT_ADDRESS => MINT_ADDRESS.to_string(),
        _ => initiator.to_string(),
    }
}
