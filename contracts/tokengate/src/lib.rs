use near_sdk::store::{IterableMap, IterableSet, LookupMap};
use near_sdk::{env, near, AccountId, PanicOnDefault};

pub mod constants;
mod errors;
mod guards;
mod validation;

mod events;

mod address_lists;
mod balances;
mod first_match;
mod ranges;

mod approvals;
mod challenges;
mod coins;
mod collections;
mod denoms;
mod dynamic_stores;
mod trackers;
mod transfer;

mod admin;
mod storage;

#[cfg(test)]
mod tests;

pub use address_lists::AddressList;
pub use admin::Params;
pub use approvals::types::{
    AddressChecks, AllowedCombination, AltTimeChecks, ApprovalAmounts, ApprovalCriteria,
    ApprovalIdentifier, AutoDeletionOptions, Coin, CoinTransfer, CollectionApproval,
    DynamicStoreChallenge, EthSignatureChallenge, Groth16VerificationKey, MaxNumTransfers,
    MerkleChallenge, MustOwnTokens, OrderCalculationMethod, PredeterminedBalances,
    ResetTimeIntervals, UserIncomingApproval, UserOutgoingApproval, UserRoyalties, ZkProof,
};
pub use balances::Balance;
pub use challenges::eth_signature::EthSignatureSolution;
pub use challenges::merkle::{MerkleProof, MerkleProofItem};
pub use challenges::zk::ZkProofSolution;
pub use coins::ExecutedCoinTransfer;
pub use collections::{
    Collection, CollectionPermissions, CosmosCoinWrapperPath, UserBalanceStore, UserPermissions,
};
pub use constants::*;
pub use dynamic_stores::DynamicStore;
pub use errors::EngineError;
pub use ranges::UintRange;
pub use storage::StorageKey;
pub use trackers::ApprovalTracker;
pub use transfer::{Transfer, UsedApproval};

#[near(
    contract_state,
    contract_metadata(
        version = "0.1.0",
        standard(standard = "nep297", version = "1.0.0"),
    )
)]
#[derive(PanicOnDefault)]
pub struct Contract {
    pub version: String,

    pub authority: AccountId,
    pub params: Params,

    pub next_collection_id: u64,
    pub next_dynamic_store_id: u64,

    pub collections: IterableMap<u64, Collection>,
    // Keyed "{collectionId}-{address}"; absent stores read as the
    // collection's default balances.
    pub(crate) balance_stores: IterableMap<String, UserBalanceStore>,
    pub(crate) address_lists: IterableMap<String, AddressList>,

    pub(crate) approval_trackers: IterableMap<String, ApprovalTracker>,
    // Merkle leaf-use counters, keyed down to the leaf index.
    pub(crate) challenge_trackers: IterableMap<String, u64>,
    // Monotonic per-approval-identity version counters; survive deletion.
    pub(crate) approval_versions: IterableMap<String, u64>,
    // Consumed zk-proof and eth-signature solution hashes.
    pub(crate) used_solutions: IterableMap<String, bool>,

    pub(crate) dynamic_stores: IterableMap<u64, DynamicStore>,
    pub(crate) dynamic_store_values: LookupMap<String, u64>,

    // Forceful transfers out of these addresses are always refused.
    pub(crate) reserved_protocol_addresses: IterableSet<String>,
    pub(crate) wasm_contracts: IterableSet<AccountId>,
    pub(crate) pool_addresses: IterableSet<AccountId>,

    // (account, denom) ledger backing coin transfers, keyed "account:denom".
    pub(crate) coin_ledger: LookupMap<String, u128>,
}

#[near]
impl Contract {
    #[init]
    pub fn new(authority: AccountId, params: Option<Params>) -> Self {
        let mut contract = Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            authority,
            params: params.unwrap_or_default(),
            next_collection_id: 1,
            next_dynamic_store_id: 1,
            collections: IterableMap::new(StorageKey::Collections),
            balance_stores: IterableMap::new(StorageKey::BalanceStores),
            address_lists: IterableMap::new(StorageKey::AddressLists),
            approval_trackers: IterableMap::new(StorageKey::ApprovalTrackers),
            challenge_trackers: IterableMap::new(StorageKey::ChallengeTrackers),
            approval_versions: IterableMap::new(StorageKey::ApprovalVersions),
            used_solutions: IterableMap::new(StorageKey::UsedSolutions),
            dynamic_stores: IterableMap::new(StorageKey::DynamicStores),
            dynamic_store_values: LookupMap::new(StorageKey::DynamicStoreValues),
            reserved_protocol_addresses: IterableSet::new(StorageKey::ReservedProtocolAddresses),
            wasm_contracts: IterableSet::new(StorageKey::WasmContracts),
            pool_addresses: IterableSet::new(StorageKey::PoolAddresses),
            coin_ledger: LookupMap::new(StorageKey::CoinLedger),
        };
        let pool = contract.params.community_pool.clone();
        contract.reserved_protocol_addresses.insert(pool);
        contract
    }

    pub fn get_version(&self) -> &str {
        &self.version
    }
}
