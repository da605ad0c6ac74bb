use near_sdk::NearToken;

/// Basis-point denominator for every percentage in the engine.
pub const BASIS_POINTS: u16 = 10_000; // 100%

/// Protocol fee taken from each denom's aggregate coin-transfer total.
pub const PROTOCOL_FEE_BPS: u16 = 50; // 0.5%

pub const MAX_ROYALTY_BPS: u16 = 10_000;

/// Canonical mint address literal. Not a valid account id on purpose.
pub const MINT_ADDRESS: &str = "Mint";

/// Ledger denom credited by native NEAR deposits.
pub const NATIVE_DENOM: &str = "unear";

// Reserved address-list ids (keyword handling in address_lists.rs).
pub const LIST_ALL: &str = "All";
pub const LIST_ALL_WITH_MINT: &str = "AllWithMint";
pub const LIST_ALL_WITHOUT_MINT: &str = "AllWithoutMint";
pub const LIST_NONE: &str = "None";
pub const LIST_MANAGER: &str = "Manager";
pub const LIST_ALL_WITHOUT_PREFIX: &str = "AllWithout";

/// Approval levels, also used verbatim in tracker keys and error strings.
pub const LEVEL_COLLECTION: &str = "collection";
pub const LEVEL_OUTGOING: &str = "outgoing";
pub const LEVEL_INCOMING: &str = "incoming";

// Tracker types, used verbatim in tracker keys.
pub const TRACKER_OVERALL: &str = "overall";
pub const TRACKER_FROM: &str = "from";
pub const TRACKER_TO: &str = "to";
pub const TRACKER_INITIATED_BY: &str = "initiatedBy";

/// Universe for token ids and times. Ranges are closed, ids start at 1.
pub const UNIVERSE_START: u64 = 1;
pub const UNIVERSE_END: u64 = u64::MAX;

// Key delimiter invariant: '-' never splits ambiguously because every
// segment before an address is numeric or a fixed keyword.
pub const KEY_DELIMITER: &str = "-";
/// Ledger keys join account and denom with ':', which cannot appear in
/// NEAR account ids.
pub const LEDGER_DELIMITER: &str = ":";

pub const ONE_YOCTO: NearToken = NearToken::from_yoctonear(1);

pub const MS_PER_HOUR: u64 = 3_600_000;
pub const MS_PER_DAY: u64 = 86_400_000;
/// 1970-01-01 was a Thursday.
pub const EPOCH_WEEKDAY: u64 = 4;

pub const MAX_ADDRESSES_PER_LIST: usize = 1_000;
pub const MAX_TRANSFERS_PER_CALL: usize = 25;
pub const MAX_RECIPIENTS_PER_TRANSFER: usize = 25;
pub const MAX_MERKLE_PROOF_LENGTH: usize = 64;

// BN254 encodings expected by the alt_bn128 host functions.
pub const BN254_G1_SIZE: usize = 64;
pub const BN254_G2_SIZE: usize = 128;
pub const BN254_SCALAR_SIZE: usize = 32;

/// Denom prefixes for engine-minted coin representations.
pub const WRAPPED_DENOM_PREFIX: &str = "wrapped";
pub const ALIAS_DENOM_PREFIX: &str = "alias";
pub const IBC_DENOM_PREFIX: &str = "ibc/";
