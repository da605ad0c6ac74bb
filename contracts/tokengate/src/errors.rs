use near_sdk_macros::NearSchema;

#[derive(NearSchema, near_sdk::FunctionError)]
#[abi(json)]
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub enum EngineError {
    InadequateApprovals(String),
    DisallowedTransfer(String),
    Underflow(String),
    Overflow(String),
    InvalidAddress(String),
    InvalidAddressListId(String),
    AddressListNotFound(String),
    CollectionNotFound(String),
    MismatchedVersions(String),
    UninitializedVersion(String),
    InvalidDenom(String),
    InvalidConversion(String),
    NoValidSolutionForChallenge(String),
    ReservedProtocolForcefulTransferDenied(String),
    Unauthorized(String),
    InvalidInput(String),
    NotFound(String),
    InsufficientDeposit(String),
    NotImplemented(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InadequateApprovals(msg) => write!(f, "Inadequate approvals: {}", msg),
            Self::DisallowedTransfer(msg) => write!(f, "Disallowed transfer: {}", msg),
            Self::Underflow(msg) => write!(f, "Underflow: {}", msg),
            Self::Overflow(msg) => write!(f, "Overflow: {}", msg),
            Self::InvalidAddress(msg) => write!(f, "Invalid address: {}", msg),
            Self::InvalidAddressListId(msg) => write!(f, "Invalid address list id: {}", msg),
            Self::AddressListNotFound(msg) => write!(f, "Address list not found: {}", msg),
            Self::CollectionNotFound(msg) => write!(f, "Collection not found: {}", msg),
            Self::MismatchedVersions(msg) => write!(f, "Mismatched versions: {}", msg),
            Self::UninitializedVersion(msg) => write!(f, "Uninitialized version: {}", msg),
            Self::InvalidDenom(msg) => write!(f, "Invalid denom: {}", msg),
            Self::InvalidConversion(msg) => write!(f, "Invalid conversion: {}", msg),
            Self::NoValidSolutionForChallenge(msg) => {
                write!(f, "No valid solution for challenge: {}", msg)
            }
            Self::ReservedProtocolForcefulTransferDenied(msg) => {
                write!(f, "Reserved protocol forceful transfer denied: {}", msg)
            }
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Self::NotFound(msg) => write!(f, "Not found: {}", msg),
            Self::InsufficientDeposit(msg) => write!(f, "Insufficient deposit: {}", msg),
            Self::NotImplemented(msg) => write!(f, "Not implemented: {}", msg),
        }
    }
}

impl EngineError {
    pub fn collection_not_found(collection_id: u64) -> Self {
        Self::CollectionNotFound(format!("collection {}", collection_id))
    }
    pub fn list_not_found(list_id: &str) -> Self {
        Self::AddressListNotFound(list_id.to_string())
    }
    pub fn insufficient_balance(token_id: u64, ownership_time: u64) -> Self {
        Self::Underflow(format!(
            "insufficient balance for token ID {} at ownership time {}",
            token_id, ownership_time
        ))
    }
    pub fn amount_overflow() -> Self {
        Self::Overflow("amount arithmetic overflowed".to_string())
    }
    pub fn range_overflow() -> Self {
        Self::Overflow("range arithmetic exceeded the universe bound".to_string())
    }
    pub fn only_authority() -> Self {
        Self::Unauthorized("Only the governance authority can perform this action".to_string())
    }
    pub fn only_manager() -> Self {
        Self::Unauthorized("Only the collection manager can perform this action".to_string())
    }
}
