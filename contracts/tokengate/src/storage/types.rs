use near_sdk::near;
use near_sdk::BorshStorageKey;

#[near]
#[derive(BorshStorageKey)]
pub enum StorageKey {
    Collections,
    BalanceStores,
    AddressLists,
    ApprovalTrackers,
    ChallengeTrackers,
    ApprovalVersions,
    UsedSolutions,
    DynamicStores,
    DynamicStoreValues,
    ReservedProtocolAddresses,
    WasmContracts,
    PoolAddresses,
    CoinLedger,
}
