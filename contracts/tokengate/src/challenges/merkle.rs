//! Merkle-code challenges: SHA-256 parent chaining against a stored root,
//! with per-leaf use quotas and optional leaf-index transfer ordering.

use near_sdk::{env, near};

use crate::approvals::types::MerkleChallenge;
use crate::challenges::ChallengeWrite;
use crate::constants::MAX_MERKLE_PROOF_LENGTH;
use crate::errors::EngineError;
use crate::storage::keys;
use crate::Contract;

#[near(serializers = [borsh, json])]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerkleProofItem {
    /// Hex-encoded sibling hash.
    pub aunt: String,
    /// The aunt sits to the right of the running node.
    pub on_right: bool,
}

#[near(serializers = [borsh, json])]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerkleProof {
    pub leaf: String,
    pub aunts: Vec<MerkleProofItem>,
}

/// Heap-style leaf index: root is 1; a node whose aunt is on the right is a
/// left (even) child. Aunts are ordered leaf-side first, so the root-side
/// bit is the MSB. Indices are u128: a proof at the 64-aunt limit addresses
/// leaves past `u64::MAX`.
pub fn leaf_index(proof: &MerkleProof) -> u128 {
    let mut index: u128 = 1;
    for item in proof.aunts.iter().rev() {
        index = index * 2 + u128::from(!item.on_right);
    }
    index
}

pub fn leftmost_leaf_index(proof_length: u64) -> u128 {
    1u128 << proof_length
}

fn verify_chain(leaf: &str, proof: &MerkleProof, expected_root: &str) -> Result<(), EngineError> {
    let mut current = env::sha256(leaf.as_bytes());
    for item in &proof.aunts {
        let aunt = hex::decode(&item.aunt).map_err(|_| {
            EngineError::NoValidSolutionForChallenge("merkle aunt is not valid hex".to_string())
        })?;
        let mut joined = Vec::with_capacity(current.len() + aunt.len());
        if item.on_right {
            joined.extend_from_slice(&current);
            joined.extend_from_slice(&aunt);
        } else {
            joined.extend_from_slice(&aunt);
            joined.extend_from_slice(&current);
        }
        current = env::sha256(&joined);
    }
    if hex::encode(&current) != expected_root.to_lowercase() {
        return Err(EngineError::NoValidSolutionForChallenge(
            "merkle proof does not hash to the challenge root".to_string(),
        ));
    }
    Ok(())
}

/// Result of satisfying one merkle challenge.
#[derive(Debug)]
pub struct MerkleOutcome {
    pub writes: Vec<ChallengeWrite>,
    /// Set when `use_leaf_index_for_transfer_order`: the approval's
    /// `numIncrements` becomes `leafIndex - leftmostLeafIndex`.
    pub num_increments_override: Option<u64>,
}

impl Contract {
    /// Finds a proof satisfying `challenge` among the transfer's attached
    /// proofs. Scans in attachment order; the first structurally matching
    /// proof is the candidate (its failure is the challenge's failure).
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn satisfy_merkle_challenge(
        &self,
        challenge: &MerkleChallenge,
        proofs: &[MerkleProof],
        collection_id: u64,
        approver_address: &str,
        approval_level: &str,
        approval_id: &str,
        initiator: &str,
    ) -> Result<MerkleOutcome, EngineError> {
        if challenge.expected_proof_length as usize > MAX_MERKLE_PROOF_LENGTH {
            return Err(EngineError::InvalidInput(format!(
                "merkle proof length limit is {}",
                MAX_MERKLE_PROOF_LENGTH
            )));
        }
        let proof = proofs
            .iter()
            .find(|p| p.aunts.len() as u64 == challenge.expected_proof_length)
            .ok_or_else(|| {
                EngineError::NoValidSolutionForChallenge(format!(
                    "no merkle proof with {} aunts attached",
                    challenge.expected_proof_length
                ))
            })?;

        let leaf = if challenge.use_creator_address_as_leaf {
            initiator
        } else {
            proof.leaf.as_str()
        };
        verify_chain(leaf, proof, &challenge.root)?;

        let index = leaf_index(proof);
        let tracker_key = keys::challenge_tracker_key(
            collection_id,
            approver_address,
            approval_level,
            approval_id,
            &challenge.challenge_tracker_id,
            index,
        );
        if challenge.max_uses_per_leaf > 0
            && self.challenge_tracker_uses(&tracker_key) >= challenge.max_uses_per_leaf
        {
            return Err(EngineError::NoValidSolutionForChallenge(format!(
                "merkle leaf {} exhausted its {} uses",
                index, challenge.max_uses_per_leaf
            )));
        }

        // The offset within the leaf row is at most 2^64 - 1.
        let num_increments_override = challenge
            .use_leaf_index_for_transfer_order
            .then(|| (index - leftmost_leaf_index(challenge.expected_proof_length)) as u64);

        Ok(MerkleOutcome {
            writes: vec![ChallengeWrite::ChallengeUse(tracker_key)],
            num_increments_override,
        })
    }
}
