use near_sdk::near;

use crate::approvals::types::ApprovalIdentifier;
use crate::balances::Balance;
use crate::challenges::eth_signature::EthSignatureSolution;
use crate::challenges::merkle::MerkleProof;
use crate::challenges::zk::ZkProofSolution;

/// One claimed movement: `from` to each of `to_addresses`, with the
/// attached material its approvals may demand.
#[near(serializers = [borsh, json])]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transfer {
    pub from: String,
    pub to_addresses: Vec<String>,
    pub balances: Vec<Balance>,
    #[serde(default)]
    pub prioritized_approvals: Vec<ApprovalIdentifier>,
    #[serde(default)]
    pub only_check_prioritized_collection_approvals: bool,
    #[serde(default)]
    pub only_check_prioritized_outgoing_approvals: bool,
    #[serde(default)]
    pub only_check_prioritized_incoming_approvals: bool,
    #[serde(default)]
    pub merkle_proofs: Vec<MerkleProof>,
    #[serde(default)]
    pub zk_proof_solutions: Vec<ZkProofSolution>,
    #[serde(default)]
    pub eth_signature_solutions: Vec<EthSignatureSolution>,
    #[serde(default)]
    pub affiliate_address: Option<String>,
}

/// Per-approval usage record, as emitted in `usedApprovalDetails`.
#[near(serializers = [json])]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UsedApproval {
    pub approval_id: String,
    pub approver_address: String,
    pub approval_level: String,
    pub version: u64,
}
