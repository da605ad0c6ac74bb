//! External ECDSA (ETH personal-sign) challenges with replay tracking.

use near_sdk::json_types::Base64VecU8;
use near_sdk::{env, near};

use crate::approvals::types::EthSignatureChallenge;
use crate::challenges::ChallengeWrite;
use crate::errors::EngineError;
use crate::storage::keys;
use crate::Contract;

#[near(serializers = [borsh, json])]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EthSignatureSolution {
    /// 65 bytes: r || s || v.
    pub signature: Base64VecU8,
    /// Caller-chosen nonce folded into the signed message.
    pub nonce: String,
}

/// The message is anchored to this contract instance and the exact approval
/// being exercised, so a signature cannot be replayed across deployments,
/// collections, or initiators.
pub fn signed_message(collection_id: u64, approval_id: &str, initiator: &str, nonce: &str) -> String {
    format!(
        "tokengate:{}:{}:{}:{}:{}",
        env::current_account_id(),
        collection_id,
        approval_id,
        initiator,
        nonce
    )
}

fn personal_sign_digest(message: &str) -> Vec<u8> {
    let prefixed = format!("\x19Ethereum Signed Message:\n{}{}", message.len(), message);
    env::keccak256(prefixed.as_bytes())
}

fn recover_eth_address(digest: &[u8], signature: &[u8]) -> Option<String> {
    if signature.len() != 65 {
        return None;
    }
    let v = match signature[64] {
        v @ 0..=1 => v,
        v @ 27..=28 => v - 27,
        _ => return None,
    };
    let pubkey = env::ecrecover(digest, &signature[..64], v, true)?;
    let hash = env::keccak256(&pubkey);
    Some(format!("0x{}", hex::encode(&hash[12..32])))
}

impl Contract {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn satisfy_eth_signature_challenge(
        &self,
        challenge: &EthSignatureChallenge,
        solutions: &[EthSignatureSolution],
        collection_id: u64,
        approver_address: &str,
        approval_level: &str,
        approval_id: &str,
        initiator: &str,
    ) -> Result<Vec<ChallengeWrite>, EngineError> {
        let expected = challenge.signer.to_lowercase();
        let mut last_error = EngineError::NoValidSolutionForChallenge(
            "no eth signature attached".to_string(),
        );
        for solution in solutions {
            let message = signed_message(collection_id, approval_id, initiator, &solution.nonce);
            let digest = personal_sign_digest(&message);
            let Some(recovered) = recover_eth_address(&digest, &solution.signature.0) else {
                last_error = EngineError::NoValidSolutionForChallenge(
                    "eth signature recovery failed".to_string(),
                );
                continue;
            };
            if recovered != expected {
                last_error = EngineError::NoValidSolutionForChallenge(format!(
                    "eth signature recovered {} instead of {}",
                    recovered, expected
                ));
                continue;
            }
            let signature_hash = hex::encode(env::sha256(&solution.signature.0));
            let key = keys::used_solution_key(
                collection_id,
                approver_address,
                approval_level,
                approval_id,
                &challenge.challenge_tracker_id,
                &signature_hash,
            );
            if self.used_solutions.contains_key(&key) {
                last_error = EngineError::NoValidSolutionForChallenge(
                    "eth signature already used".to_string(),
                );
                continue;
            }
            return Ok(vec![ChallengeWrite::UsedSolution(key)]);
        }
        Err(last_error)
    }
}
