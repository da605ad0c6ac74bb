//! Groth16 (BN254) zero-knowledge proof challenges, verified through the
//! alt_bn128 host functions.
//!
//! Verification equation, arranged for the pairing-product check:
//! `e(-A, B) * e(alpha, beta) * e(vk_x, gamma) * e(C, delta) == 1` where
//! `vk_x = ic[0] + sum(input_i * ic[i+1])`. All encodings are the
//! little-endian forms the host expects.

use near_sdk::json_types::Base64VecU8;
use near_sdk::{env, near};
use primitive_types::U256;

use crate::approvals::types::{Groth16VerificationKey, ZkProof};
use crate::challenges::ChallengeWrite;
use crate::constants::{BN254_G1_SIZE, BN254_G2_SIZE, BN254_SCALAR_SIZE};
use crate::errors::EngineError;
use crate::storage::keys;
use crate::Contract;

/// BN254 scalar field modulus (Fr), little-endian limbs via U256.
fn fr_modulus() -> U256 {
    U256::from_str_radix(
        "30644e72e131a029b85045b68181585d2833e84879b9709143e1f593f0000001",
        16,
    )
    .unwrap_or_default()
}

#[near(serializers = [borsh, json])]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZkProofSolution {
    pub proof_a: Base64VecU8,
    pub proof_b: Base64VecU8,
    pub proof_c: Base64VecU8,
    /// 32-byte little-endian scalars, one per vkey input slot.
    pub public_inputs: Vec<Base64VecU8>,
}

fn check_len(bytes: &[u8], expected: usize, what: &str) -> Result<(), EngineError> {
    if bytes.len() != expected {
        return Err(EngineError::NoValidSolutionForChallenge(format!(
            "{} must be {} bytes, got {}",
            what,
            expected,
            bytes.len()
        )));
    }
    Ok(())
}

fn verify_groth16(
    vkey: &Groth16VerificationKey,
    solution: &ZkProofSolution,
) -> Result<(), EngineError> {
    check_len(&solution.proof_a.0, BN254_G1_SIZE, "proof A")?;
    check_len(&solution.proof_b.0, BN254_G2_SIZE, "proof B")?;
    check_len(&solution.proof_c.0, BN254_G1_SIZE, "proof C")?;
    check_len(&vkey.alpha_g1.0, BN254_G1_SIZE, "vkey alpha")?;
    check_len(&vkey.beta_g2.0, BN254_G2_SIZE, "vkey beta")?;
    check_len(&vkey.gamma_g2.0, BN254_G2_SIZE, "vkey gamma")?;
    check_len(&vkey.delta_g2.0, BN254_G2_SIZE, "vkey delta")?;
    if vkey.ic.len() != solution.public_inputs.len() + 1 {
        return Err(EngineError::NoValidSolutionForChallenge(format!(
            "vkey expects {} public inputs, got {}",
            vkey.ic.len().saturating_sub(1),
            solution.public_inputs.len()
        )));
    }

    let modulus = fr_modulus();
    for input in &solution.public_inputs {
        check_len(&input.0, BN254_SCALAR_SIZE, "public input")?;
        if U256::from_little_endian(&input.0) >= modulus {
            return Err(EngineError::NoValidSolutionForChallenge(
                "public input is not a canonical field element".to_string(),
            ));
        }
    }

    // vk_x = ic[0] + multiexp(ic[1..], inputs).
    let mut vk_x = vkey.ic[0].0.clone();
    check_len(&vk_x, BN254_G1_SIZE, "vkey ic[0]")?;
    if !solution.public_inputs.is_empty() {
        let mut multiexp_input = Vec::new();
        for (point, scalar) in vkey.ic[1..].iter().zip(&solution.public_inputs) {
            check_len(&point.0, BN254_G1_SIZE, "vkey ic point")?;
            multiexp_input.extend_from_slice(&point.0);
            multiexp_input.extend_from_slice(&scalar.0);
        }
        let weighted = env::alt_bn128_g1_multiexp(&multiexp_input);
        let mut sum_input = Vec::with_capacity(2 * (1 + BN254_G1_SIZE));
        sum_input.push(0u8);
        sum_input.extend_from_slice(&vk_x);
        sum_input.push(0u8);
        sum_input.extend_from_slice(&weighted);
        vk_x = env::alt_bn128_g1_sum(&sum_input);
    }

    // -A via the sign byte of g1_sum.
    let mut neg_input = Vec::with_capacity(1 + BN254_G1_SIZE);
    neg_input.push(1u8);
    neg_input.extend_from_slice(&solution.proof_a.0);
    let neg_a = env::alt_bn128_g1_sum(&neg_input);

    let mut pairing_input = Vec::with_capacity(4 * (BN254_G1_SIZE + BN254_G2_SIZE));
    pairing_input.extend_from_slice(&neg_a);
    pairing_input.extend_from_slice(&solution.proof_b.0);
    pairing_input.extend_from_slice(&vkey.alpha_g1.0);
    pairing_input.extend_from_slice(&vkey.beta_g2.0);
    pairing_input.extend_from_slice(&vk_x);
    pairing_input.extend_from_slice(&vkey.gamma_g2.0);
    pairing_input.extend_from_slice(&solution.proof_c.0);
    pairing_input.extend_from_slice(&vkey.delta_g2.0);

    if !env::alt_bn128_pairing_check(&pairing_input) {
        return Err(EngineError::NoValidSolutionForChallenge(
            "groth16 pairing check failed".to_string(),
        ));
    }
    Ok(())
}

pub fn solution_hash(solution: &ZkProofSolution) -> String {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&solution.proof_a.0);
    bytes.extend_from_slice(&solution.proof_b.0);
    bytes.extend_from_slice(&solution.proof_c.0);
    hex::encode(env::sha256(&bytes))
}

impl Contract {
    /// Finds a solution that verifies against the challenge's vkey and has
    /// not been consumed. The hash is marked used atomically with approval
    /// consumption (the returned write).
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn satisfy_zk_proof(
        &self,
        challenge: &ZkProof,
        solutions: &[ZkProofSolution],
        collection_id: u64,
        approver_address: &str,
        approval_level: &str,
        approval_id: &str,
    ) -> Result<Vec<ChallengeWrite>, EngineError> {
        let mut last_error = EngineError::NoValidSolutionForChallenge(
            "no zk proof solution attached".to_string(),
        );
        for solution in solutions {
            match verify_groth16(&challenge.verification_key, solution) {
                Err(err) => last_error = err,
                Ok(()) => {
                    let key = keys::used_solution_key(
                        collection_id,
                        approver_address,
                        approval_level,
                        approval_id,
                        "zk",
                        &solution_hash(solution),
                    );
                    if self.used_solutions.contains_key(&key) {
                        last_error = EngineError::NoValidSolutionForChallenge(
                            "zk proof solution already used".to_string(),
                        );
                        continue;
                    }
                    return Ok(vec![ChallengeWrite::UsedSolution(key)]);
                }
            }
        }
        Err(last_error)
    }
}
