use near_sdk::json_types::{Base64VecU8, U128};
use near_sdk::near;

use crate::balances::Balance;
use crate::ranges::UintRange;

#[near(serializers = [borsh, json])]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResetTimeIntervals {
    /// Unix ms of the first interval boundary. A future start time means the
    /// tracker never resets until that time is reached.
    pub start_time: u64,
    pub interval_length: u64,
}

/// Transfer-count thresholds. Zero means unlimited.
#[near(serializers = [borsh, json])]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MaxNumTransfers {
    #[serde(default)]
    pub overall_max_num_transfers: u64,
    #[serde(default)]
    pub per_from_max_num_transfers: u64,
    #[serde(default)]
    pub per_to_max_num_transfers: u64,
    #[serde(default)]
    pub per_initiated_by_max_num_transfers: u64,
    #[serde(default)]
    pub amount_tracker_id: String,
    #[serde(default)]
    pub reset_time_intervals: Option<ResetTimeIntervals>,
}

/// Cumulative amount thresholds. Zero means unlimited.
#[near(serializers = [borsh, json])]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApprovalAmounts {
    #[serde(default)]
    pub overall_approval_amount: U128,
    #[serde(default)]
    pub per_from_approval_amount: U128,
    #[serde(default)]
    pub per_to_approval_amount: U128,
    #[serde(default)]
    pub per_initiated_by_approval_amount: U128,
    #[serde(default)]
    pub amount_tracker_id: String,
    #[serde(default)]
    pub reset_time_intervals: Option<ResetTimeIntervals>,
}

#[near(serializers = [borsh, json])]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderCalculationMethod {
    UseOverallNumTransfers,
    UsePerFromNumTransfers,
    UsePerToNumTransfers,
    UsePerInitiatedByNumTransfers,
    UseMerkleChallengeLeafIndex,
}

/// Deterministic incrementing balance template: use number `n` must move
/// exactly `initial_balances` shifted by `n` increments.
#[near(serializers = [borsh, json])]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PredeterminedBalances {
    pub initial_balances: Vec<Balance>,
    #[serde(default)]
    pub increment_token_ids_by: u64,
    #[serde(default)]
    pub increment_ownership_times_by: u64,
    pub order_calculation_method: OrderCalculationMethod,
}

#[near(serializers = [borsh, json])]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerkleChallenge {
    /// Hex-encoded SHA-256 root.
    pub root: String,
    pub expected_proof_length: u64,
    #[serde(default)]
    pub use_creator_address_as_leaf: bool,
    #[serde(default)]
    pub use_leaf_index_for_transfer_order: bool,
    /// Zero means unlimited uses per leaf.
    #[serde(default)]
    pub max_uses_per_leaf: u64,
    pub challenge_tracker_id: String,
}

/// Groth16 verification key over BN254, encoded for the alt_bn128 hosts.
#[near(serializers = [borsh, json])]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZkProof {
    pub verification_key: Groth16VerificationKey,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub custom_data: Option<String>,
}

#[near(serializers = [borsh, json])]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Groth16VerificationKey {
    pub alpha_g1: Base64VecU8,
    pub beta_g2: Base64VecU8,
    pub gamma_g2: Base64VecU8,
    pub delta_g2: Base64VecU8,
    /// `ic[0]` plus one point per public input.
    pub ic: Vec<Base64VecU8>,
}

#[near(serializers = [borsh, json])]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Coin {
    pub amount: U128,
    pub denom: String,
}

#[near(serializers = [borsh, json])]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoinTransfer {
    pub to: String,
    pub coins: Vec<Coin>,
    #[serde(default)]
    pub override_from_with_approver_address: bool,
    #[serde(default)]
    pub override_to_with_initiator: bool,
}

#[near(serializers = [borsh, json])]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AmountRange {
    pub start: U128,
    pub end: U128,
}

#[near(serializers = [borsh, json])]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MustOwnTokens {
    pub collection_id: u64,
    pub token_ids: Vec<UintRange>,
    pub ownership_times: Vec<UintRange>,
    pub amount_range: AmountRange,
    /// `initiator`, `sender`, `recipient`, `Mint`; empty falls back to
    /// initiator.
    #[serde(default)]
    pub ownership_check_party: String,
    #[serde(default)]
    pub must_satisfy_for_all_assets: bool,
    #[serde(default)]
    pub override_with_current_time: bool,
}

#[near(serializers = [borsh, json])]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AddressChecks {
    #[serde(default)]
    pub must_be_wasm_contract: bool,
    #[serde(default)]
    pub must_not_be_wasm_contract: bool,
    #[serde(default)]
    pub must_be_liquidity_pool: bool,
    #[serde(default)]
    pub must_not_be_liquidity_pool: bool,
}

#[near(serializers = [borsh, json])]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AltTimeChecks {
    /// UTC hours `[0,23]` during which transfers are refused.
    #[serde(default)]
    pub offline_hours: Vec<UintRange>,
    /// UTC weekdays `[0,6]`, Sunday = 0.
    #[serde(default)]
    pub offline_days: Vec<UintRange>,
}

#[near(serializers = [borsh, json])]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DynamicStoreChallenge {
    pub store_id: u64,
    #[serde(default)]
    pub ownership_check_party: String,
}

#[near(serializers = [borsh, json])]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EthSignatureChallenge {
    /// `0x`-prefixed ETH address expected to have signed.
    pub signer: String,
    pub challenge_tracker_id: String,
}

#[near(serializers = [borsh, json])]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserRoyalties {
    pub payout_address: String,
    /// Basis points over 10,000.
    pub percentage: u16,
}

#[near(serializers = [borsh, json])]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AutoDeletionOptions {
    #[serde(default)]
    pub after_one_use: bool,
    #[serde(default)]
    pub after_overall_max_num_transfers: bool,
}

#[near(serializers = [borsh, json])]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApprovalCriteria {
    #[serde(default)]
    pub max_num_transfers: Option<MaxNumTransfers>,
    #[serde(default)]
    pub approval_amounts: Option<ApprovalAmounts>,
    #[serde(default)]
    pub predetermined_balances: Option<PredeterminedBalances>,
    #[serde(default)]
    pub merkle_challenges: Vec<MerkleChallenge>,
    #[serde(default)]
    pub zk_proofs: Vec<ZkProof>,
    #[serde(default)]
    pub coin_transfers: Vec<CoinTransfer>,
    #[serde(default)]
    pub must_own_tokens: Vec<MustOwnTokens>,
    #[serde(default)]
    pub sender_checks: Option<AddressChecks>,
    #[serde(default)]
    pub recipient_checks: Option<AddressChecks>,
    #[serde(default)]
    pub initiator_checks: Option<AddressChecks>,
    #[serde(default)]
    pub alt_time_checks: Option<AltTimeChecks>,
    #[serde(default)]
    pub dynamic_store_challenges: Vec<DynamicStoreChallenge>,
    #[serde(default)]
    pub eth_signature_challenges: Vec<EthSignatureChallenge>,
    /// Collection level only: skip the sender's outgoing layer.
    #[serde(default)]
    pub overrides_from_outgoing_approvals: bool,
    /// Collection level only: skip the recipient's incoming layer.
    #[serde(default)]
    pub overrides_to_incoming_approvals: bool,
    #[serde(default)]
    pub user_royalties: Option<UserRoyalties>,
    #[serde(default)]
    pub auto_deletion_options: Option<AutoDeletionOptions>,
    /// Only usable when the caller explicitly prioritized this approval.
    #[serde(default)]
    pub must_prioritize: bool,
    #[serde(default)]
    pub require_from_equals_initiated_by: bool,
    #[serde(default)]
    pub require_from_does_not_equal_initiated_by: bool,
    #[serde(default)]
    pub require_to_equals_initiated_by: bool,
    #[serde(default)]
    pub require_to_does_not_equal_initiated_by: bool,
}

impl ApprovalCriteria {
    /// An approval is auto-scannable when using it cannot require material
    /// the caller must attach (proofs, signatures) or explicit opt-in.
    pub fn is_auto_scannable(&self) -> bool {
        self.merkle_challenges.is_empty()
            && self.zk_proofs.is_empty()
            && self.eth_signature_challenges.is_empty()
            && !self.must_prioritize
    }
}

/// Per-combination range/list inversion flags, applied before the match
/// pass. An approval is expanded so exactly one combination remains.
#[near(serializers = [borsh, json])]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AllowedCombination {
    pub is_allowed: bool,
    #[serde(default)]
    pub invert_from: bool,
    #[serde(default)]
    pub invert_to: bool,
    #[serde(default)]
    pub invert_initiated_by: bool,
    #[serde(default)]
    pub invert_token_ids: bool,
    #[serde(default)]
    pub invert_transfer_times: bool,
    #[serde(default)]
    pub invert_ownership_times: bool,
}

impl Default for AllowedCombination {
    fn default() -> Self {
        Self {
            is_allowed: true,
            invert_from: false,
            invert_to: false,
            invert_initiated_by: false,
            invert_token_ids: false,
            invert_transfer_times: false,
            invert_ownership_times: false,
        }
    }
}

#[near(serializers = [borsh, json])]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectionApproval {
    pub approval_id: String,
    pub from_list_id: String,
    pub to_list_id: String,
    pub initiated_by_list_id: String,
    pub token_ids: Vec<UintRange>,
    pub transfer_times: Vec<UintRange>,
    pub ownership_times: Vec<UintRange>,
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub approval_criteria: Option<ApprovalCriteria>,
    #[serde(default)]
    pub allowed_combinations: Vec<AllowedCombination>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub custom_data: Option<String>,
}

/// Outgoing approval: `from` is fixed to the holder.
#[near(serializers = [borsh, json])]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserOutgoingApproval {
    pub approval_id: String,
    pub to_list_id: String,
    pub initiated_by_list_id: String,
    pub token_ids: Vec<UintRange>,
    pub transfer_times: Vec<UintRange>,
    pub ownership_times: Vec<UintRange>,
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub approval_criteria: Option<ApprovalCriteria>,
    #[serde(default)]
    pub allowed_combinations: Vec<AllowedCombination>,
}

/// Incoming approval: `to` is fixed to the holder.
#[near(serializers = [borsh, json])]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserIncomingApproval {
    pub approval_id: String,
    pub from_list_id: String,
    pub initiated_by_list_id: String,
    pub token_ids: Vec<UintRange>,
    pub transfer_times: Vec<UintRange>,
    pub ownership_times: Vec<UintRange>,
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub approval_criteria: Option<ApprovalCriteria>,
    #[serde(default)]
    pub allowed_combinations: Vec<AllowedCombination>,
}

impl UserOutgoingApproval {
    /// Injects the holder as `from`; a bare address is a valid ephemeral
    /// list id, so the common evaluator needs no special casing.
    pub fn to_collection_approval(&self, holder: &str) -> CollectionApproval {
        CollectionApproval {
            approval_id: self.approval_id.clone(),
            from_list_id: holder.to_string(),
            to_list_id: self.to_list_id.clone(),
            initiated_by_list_id: self.initiated_by_list_id.clone(),
            token_ids: self.token_ids.clone(),
            transfer_times: self.transfer_times.clone(),
            ownership_times: self.ownership_times.clone(),
            version: self.version,
            approval_criteria: self.approval_criteria.clone(),
            allowed_combinations: self.allowed_combinations.clone(),
            uri: None,
            custom_data: None,
        }
    }
}

impl UserIncomingApproval {
    pub fn to_collection_approval(&self, holder: &str) -> CollectionApproval {
        CollectionApproval {
            approval_id: self.approval_id.clone(),
            from_list_id: self.from_list_id.clone(),
            to_list_id: holder.to_string(),
            initiated_by_list_id: self.initiated_by_list_id.clone(),
            token_ids: self.token_ids.clone(),
            transfer_times: self.transfer_times.clone(),
            ownership_times: self.ownership_times.clone(),
            version: self.version,
            approval_criteria: self.approval_criteria.clone(),
            allowed_combinations: self.allowed_combinations.clone(),
            uri: None,
            custom_data: None,
        }
    }
}

/// Caller-supplied ordering hint plus version pin.
#[near(serializers = [borsh, json])]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApprovalIdentifier {
    pub approval_id: String,
    /// `collection`, `outgoing`, or `incoming`.
    pub approval_level: String,
    /// Empty for collection level; the holder for user levels.
    #[serde(default)]
    pub approver_address: String,
    pub version: u64,
}
