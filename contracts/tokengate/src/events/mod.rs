mod builder;

mod approval;
mod coin;
mod collection;
mod contract;
mod transfer;

pub use approval::*;
pub use coin::*;
pub use collection::*;
pub use contract::*;
pub use transfer::*;

pub(crate) const STANDARD: &str = "tokengate";
pub(crate) const VERSION: &str = "1.0.0";
pub(crate) const PREFIX: &str = "EVENT_JSON:";

pub(crate) const COLLECTION: &str = "COLLECTION_UPDATE";
pub(crate) const APPROVAL: &str = "APPROVAL_UPDATE";
pub(crate) const TRANSFER: &str = "TRANSFER_UPDATE";
pub(crate) const COIN: &str = "COIN_UPDATE";
pub(crate) const CONTRACT: &str = "CONTRACT_UPDATE";
