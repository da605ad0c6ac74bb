use near_sdk::env;

use crate::constants::ONE_YOCTO;
use crate::errors::EngineError;
use crate::Contract;

/// Full-access-key assertion for state-changing calls.
pub fn check_one_yocto() -> Result<(), EngineError> {
    if env::attached_deposit() != ONE_YOCTO {
        return Err(EngineError::InsufficientDeposit(
            "requires attached deposit of exactly 1 yoctoNEAR".to_string(),
        ));
    }
    Ok(())
}

pub fn check_at_least_one_yocto() -> Result<(), EngineError> {
    if env::attached_deposit() < ONE_YOCTO {
        return Err(EngineError::InsufficientDeposit(
            "requires attached deposit of at least 1 yoctoNEAR".to_string(),
        ));
    }
    Ok(())
}

impl Contract {
    /// Governance-authority gate for params and registry edits.
    pub(crate) fn check_authority(&self) -> Result<(), EngineError> {
        if env::predecessor_account_id() != self.authority {
            return Err(EngineError::only_authority());
        }
        Ok(())
    }
}
