//! Native-coin side-transfers tied to approval use.
//!
//! Coins live in an in-contract `(account, denom)` ledger so that royalty
//! splits, protocol fees, and affiliate cuts execute synchronously and
//! atomically with the approval evaluation. Native NEAR funds the `unear`
//! denom through `deposit`; wrapped and alias denoms are minted and burned
//! by the engine itself.

use near_sdk::json_types::U128;
use near_sdk::{env, near, AccountId, NearToken, Promise};

use crate::approvals::types::{CoinTransfer, UserRoyalties};
use crate::constants::{BASIS_POINTS, MINT_ADDRESS, NATIVE_DENOM, PROTOCOL_FEE_BPS};
use crate::errors::EngineError;
use crate::events;
use crate::storage::keys;
use crate::{Contract, ContractExt};

/// Coin transfers scheduled by one used approval, executed in schedule
/// order after all approval validations pass.
#[derive(Clone, Debug)]
pub struct ScheduledCoinTransfers {
    /// Empty for collection level unless substituted with the mint escrow.
    pub approver_address: String,
    pub transfers: Vec<CoinTransfer>,
    pub royalties: Option<UserRoyalties>,
}

#[near(serializers = [json])]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutedCoinTransfer {
    pub from: String,
    pub to: String,
    pub amount: U128,
    pub denom: String,
}

fn split_amount(amount: u128, bps: u16) -> Result<u128, EngineError> {
    // BASIS_POINTS is a non-zero constant; the guard keeps the division total.
    if BASIS_POINTS == 0 {
        return Err(EngineError::InvalidInput("zero fee denominator".to_string()));
    }
    amount
        .checked_mul(bps as u128)
        .map(|v| v / BASIS_POINTS as u128)
        .ok_or_else(EngineError::amount_overflow)
}

impl Contract {
    pub(crate) fn ledger_balance(&self, address: &str, denom: &str) -> u128 {
        self.coin_ledger
            .get(&keys::ledger_key(address, denom))
            .copied()
            .unwrap_or(0)
    }

    pub(crate) fn ledger_credit(
        &mut self,
        address: &str,
        denom: &str,
        amount: u128,
    ) -> Result<(), EngineError> {
        let key = keys::ledger_key(address, denom);
        let balance = self.coin_ledger.get(&key).copied().unwrap_or(0);
        let updated = balance
            .checked_add(amount)
            .ok_or_else(EngineError::amount_overflow)?;
        self.coin_ledger.insert(key, updated);
        Ok(())
    }

    pub(crate) fn ledger_debit(
        &mut self,
        address: &str,
        denom: &str,
        amount: u128,
    ) -> Result<(), EngineError> {
        let key = keys::ledger_key(address, denom);
        let balance = self.coin_ledger.get(&key).copied().unwrap_or(0);
        let updated = balance.checked_sub(amount).ok_or_else(|| {
            EngineError::Underflow(format!(
                "{} holds {} {} but {} is required",
                address, balance, denom, amount
            ))
        })?;
        self.coin_ledger.insert(key, updated);
        Ok(())
    }

    fn check_denom_allowed(&self, denom: &str) -> Result<(), EngineError> {
        if !self.params.allowed_denoms.is_empty()
            && !self.params.allowed_denoms.iter().any(|d| d == denom)
        {
            return Err(EngineError::InvalidDenom(denom.to_string()));
        }
        Ok(())
    }

    fn resolve_coin_parties(
        &self,
        scheduled: &ScheduledCoinTransfers,
        transfer: &CoinTransfer,
        initiator: &str,
        mint_escrow_address: &str,
    ) -> (String, String) {
        let from = if transfer.override_from_with_approver_address {
            if scheduled.approver_address.is_empty() {
                mint_escrow_address.to_string()
            } else {
                scheduled.approver_address.clone()
            }
        } else {
            initiator.to_string()
        };
        let to = if transfer.override_to_with_initiator {
            initiator.to_string()
        } else {
            transfer.to.clone()
        };
        (from, to)
    }

    /// Face-amount totals per `(payer, denom)` across the whole schedule,
    /// in first-seen order. The protocol fee applies to these totals, so
    /// sub-rounding coins cannot dodge the fee entry by entry.
    fn payer_denom_totals(
        &self,
        scheduled: &[ScheduledCoinTransfers],
        initiator: &str,
        mint_escrow_address: &str,
    ) -> Result<Vec<(String, String, u128)>, EngineError> {
        let mut totals: Vec<(String, String, u128)> = Vec::new();
        for batch in scheduled {
            for transfer in &batch.transfers {
                let (from, _) =
                    self.resolve_coin_parties(batch, transfer, initiator, mint_escrow_address);
                for coin in &transfer.coins {
                    self.check_denom_allowed(&coin.denom)?;
                    match totals
                        .iter_mut()
                        .find(|(a, d, _)| a == &from && d == &coin.denom)
                    {
                        Some(entry) => {
                            entry.2 = entry
                                .2
                                .checked_add(coin.amount.0)
                                .ok_or_else(EngineError::amount_overflow)?;
                        }
                        None => totals.push((from.clone(), coin.denom.clone(), coin.amount.0)),
                    }
                }
            }
        }
        Ok(totals)
    }

    /// Simulation phase: verifies allowed denoms and spendable balances
    /// without writing. Royalty/fee arithmetic runs here too so overflow
    /// surfaces before any state change.
    pub(crate) fn simulate_coin_transfers(
        &self,
        scheduled: &[ScheduledCoinTransfers],
        initiator: &str,
        mint_escrow_address: &str,
    ) -> Result<(), EngineError> {
        for batch in scheduled {
            let royalty_bps = batch.royalties.as_ref().map(|r| r.percentage).unwrap_or(0);
            for transfer in &batch.transfers {
                for coin in &transfer.coins {
                    split_amount(coin.amount.0, royalty_bps)?;
                }
            }
        }
        for (address, denom, total) in
            self.payer_denom_totals(scheduled, initiator, mint_escrow_address)?
        {
            // The protocol fee is charged on top of the face total.
            let fee = split_amount(total, PROTOCOL_FEE_BPS)?;
            let charged = total
                .checked_add(fee)
                .ok_or_else(EngineError::amount_overflow)?;
            if self.ledger_balance(&address, &denom) < charged {
                return Err(EngineError::Underflow(format!(
                    "{} cannot cover {} {} in scheduled coin transfers",
                    address, charged, denom
                )));
            }
        }
        Ok(())
    }

    /// Execution phase. Each payer is debited their per-denom face total
    /// plus one fee on that total, split between affiliate and community
    /// pool; then, first-by-approval and then-by-index, royalties go to the
    /// payout address and the remainder of each coin to `to`.
    pub(crate) fn execute_coin_transfers(
        &mut self,
        scheduled: &[ScheduledCoinTransfers],
        initiator: &str,
        mint_escrow_address: &str,
        affiliate_address: Option<&str>,
    ) -> Result<Vec<ExecutedCoinTransfer>, EngineError> {
        for (from, denom, total) in
            self.payer_denom_totals(scheduled, initiator, mint_escrow_address)?
        {
            // Fee on top: `to` and the royalty payout split the face
            // amounts untouched.
            let fee = split_amount(total, PROTOCOL_FEE_BPS)?;
            let charged = total
                .checked_add(fee)
                .ok_or_else(EngineError::amount_overflow)?;
            self.ledger_debit(&from, &denom, charged)?;

            if fee > 0 {
                let affiliate_cut = match affiliate_address {
                    Some(affiliate) => {
                        let cut = split_amount(fee, self.params.affiliate_percentage)?;
                        self.ledger_credit(affiliate, &denom, cut)?;
                        cut
                    }
                    None => 0,
                };
                let pool = self.params.community_pool.clone();
                self.ledger_credit(&pool, &denom, fee - affiliate_cut)?;
            }
        }

        let mut executed = Vec::new();
        for batch in scheduled {
            for transfer in &batch.transfers {
                let (from, to) =
                    self.resolve_coin_parties(batch, transfer, initiator, mint_escrow_address);
                for coin in &transfer.coins {
                    let royalty = match &batch.royalties {
                        Some(r) if r.percentage > 0 => {
                            let cut = split_amount(coin.amount.0, r.percentage)?;
                            self.ledger_credit(&r.payout_address, &coin.denom, cut)?;
                            executed.push(ExecutedCoinTransfer {
                                from: from.clone(),
                                to: r.payout_address.clone(),
                                amount: U128(cut),
                                denom: coin.denom.clone(),
                            });
                            cut
                        }
                        _ => 0,
                    };

                    let remainder = coin.amount.0.checked_sub(royalty).ok_or_else(|| {
                        EngineError::Underflow("royalty exceeds the coin amount".to_string())
                    })?;
                    self.ledger_credit(&to, &coin.denom, remainder)?;
                    executed.push(ExecutedCoinTransfer {
                        from: from.clone(),
                        to: to.clone(),
                        amount: U128(remainder),
                        denom: coin.denom.clone(),
                    });
                }
            }
        }
        Ok(executed)
    }
}

#[near]
impl Contract {
    /// Funds the caller's `unear` ledger balance with the attached deposit.
    #[payable]
    #[handle_result]
    pub fn deposit(&mut self) -> Result<(), EngineError> {
        let amount = env::attached_deposit().as_yoctonear();
        if amount == 0 {
            return Err(EngineError::InsufficientDeposit(
                "deposit requires an attached amount".to_string(),
            ));
        }
        let caller = env::predecessor_account_id();
        self.ledger_credit(caller.as_str(), NATIVE_DENOM, amount)?;
        events::emit_coins_deposited(&caller, amount);
        Ok(())
    }

    /// Pays native NEAR back out of the caller's `unear` balance.
    #[payable]
    #[handle_result]
    pub fn withdraw(&mut self, amount: U128) -> Result<Promise, EngineError> {
        crate::guards::check_one_yocto()?;
        let caller = env::predecessor_account_id();
        self.ledger_debit(caller.as_str(), NATIVE_DENOM, amount.0)?;
        events::emit_coins_withdrawn(&caller, amount.0);
        Ok(Promise::new(caller).transfer(NearToken::from_yoctonear(amount.0)))
    }

    pub fn get_coin_balance(&self, address: String, denom: String) -> U128 {
        U128(self.ledger_balance(&address, &denom))
    }

    /// Mint address holds nothing in the ledger; reserved as a sanity view.
    pub fn get_mint_coin_balance(&self, denom: String) -> U128 {
        U128(self.ledger_balance(MINT_ADDRESS, &denom))
    }
}
