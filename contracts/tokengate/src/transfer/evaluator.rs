//! The transfer-authorization evaluator.
//!
//! A transfer walks three approval layers (collection, sender-outgoing,
//! recipient-incoming). Within a layer, approvals are scanned in
//! prioritization-then-list order; each approval claims the not-yet-handled
//! portion of the balances in flight (first-match), and must then pass its
//! requirement flags, challenges, and tracker thresholds. A failing approval
//! is recorded and skipped; the transfer aborts only when balances remain
//! unapproved after the scan, or when a hard refusal (version pin mismatch,
//! reserved-protocol forceful transfer) fires.

use crate::approvals::types::{
    ApprovalCriteria, ApprovalIdentifier, CoinTransfer, CollectionApproval,
    OrderCalculationMethod, ResetTimeIntervals, UserRoyalties,
};
use crate::balances::{self, Balance};
use crate::challenges::ChallengeWrite;
use crate::coins::ScheduledCoinTransfers;
use crate::collections::types::Collection;
use crate::constants::*;
use crate::errors::EngineError;
use crate::first_match;
use crate::ranges;
use crate::trackers::{TrackerContext, TrackerUpdate};
use crate::transfer::types::{Transfer, UsedApproval};
use crate::Contract;

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct EvalMode {
    /// Validate everything, write nothing.
    pub dry_run: bool,
    /// Clamp to thresholds instead of failing; implies no hard abort on
    /// unapproved remainder.
    pub partial: bool,
}

/// Everything one passing approval wants committed.
pub(crate) struct ApprovalUsePlan {
    pub approval_id: String,
    pub version: u64,
    pub admitted: Vec<Balance>,
    pub tracker_updates: Vec<TrackerUpdate>,
    pub challenge_writes: Vec<ChallengeWrite>,
    pub overrides_from: bool,
    pub overrides_to: bool,
    pub coin_transfers: Vec<CoinTransfer>,
    pub royalties: Option<UserRoyalties>,
    pub delete_after_one_use: bool,
    pub delete_after_overall_max: bool,
    pub overall_max_num_transfers: u64,
    /// Post-update overall tracker count, for threshold auto-deletion.
    pub overall_num_transfers: u64,
}

pub(crate) struct LayerOutcome {
    pub used: Vec<ApprovalUsePlan>,
    pub remaining: Vec<Balance>,
}

/// A deferred approval deletion, applied after the transfer succeeds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct AutoDeletion {
    pub approval_level: String,
    pub approver_address: String,
    pub approval_id: String,
}

pub(crate) struct SingleTransferResult {
    pub approvals_used: Vec<UsedApproval>,
    pub scheduled_coins: Vec<ScheduledCoinTransfers>,
    pub auto_deletions: Vec<AutoDeletion>,
    /// Non-empty only in partial mode.
    pub unapproved: Vec<Balance>,
}

struct LayerParams<'a> {
    collection: &'a Collection,
    level: &'a str,
    approver_address: &'a str,
    only_prioritized: bool,
    from: &'a str,
    to: &'a str,
    initiator: &'a str,
    now: u64,
}

fn first_token_id(queue: &[Balance]) -> u64 {
    queue
        .first()
        .and_then(|b| b.token_ids.first())
        .map(|r| r.start)
        .unwrap_or_default()
}

fn is_hard_error(err: &EngineError) -> bool {
    matches!(
        err,
        EngineError::ReservedProtocolForcefulTransferDenied(_) | EngineError::MismatchedVersions(_)
    )
}

impl Contract {
    /// Reorders candidates per the caller's prioritization and drops those
    /// the caller may not or did not opt into. Version pins are enforced
    /// here, before any tracker is touched.
    fn order_candidates(
        &self,
        candidates: Vec<CollectionApproval>,
        prioritized: &[ApprovalIdentifier],
        level: &str,
        approver_address: &str,
        only_prioritized: bool,
    ) -> Result<Vec<CollectionApproval>, EngineError> {
        let relevant: Vec<&ApprovalIdentifier> = prioritized
            .iter()
            .filter(|p| p.approval_level == level && p.approver_address == approver_address)
            .collect();

        let mut front: Vec<CollectionApproval> = Vec::new();
        for pin in &relevant {
            let Some(approval) = candidates.iter().find(|a| a.approval_id == pin.approval_id)
            else {
                continue;
            };
            if approval.version != pin.version {
                return Err(EngineError::MismatchedVersions(format!(
                    "prioritized approval {} is pinned to version {} but is at version {}",
                    pin.approval_id, pin.version, approval.version
                )));
            }
            front.push(approval.clone());
        }

        let mut ordered = front;
        if !only_prioritized {
            for approval in candidates {
                if relevant.iter().any(|p| p.approval_id == approval.approval_id) {
                    continue;
                }
                let scannable = approval
                    .approval_criteria
                    .as_ref()
                    .map(ApprovalCriteria::is_auto_scannable)
                    .unwrap_or(true);
                if scannable {
                    ordered.push(approval);
                }
            }
        }
        Ok(ordered)
    }

    /// Validates one approval against the claimed portion of the queue,
    /// without writing. `Ok(None)` means the approval did not match (not a
    /// failure); `Err` carries the reason a matched approval cannot be used.
    fn plan_approval_use(
        &self,
        params: &LayerParams,
        approval: &CollectionApproval,
        transfer: &Transfer,
        unhandled: &[Balance],
        mode: EvalMode,
    ) -> Result<Option<ApprovalUsePlan>, EngineError> {
        let expanded = first_match::expand_approval(approval)?;

        let manager = &params.collection.manager;
        if !self.check_address(&expanded.from_list_id, params.from, manager)?
            || !self.check_address(&expanded.to_list_id, params.to, manager)?
            || !self.check_address(&expanded.initiated_by_list_id, params.initiator, manager)?
        {
            return Ok(None);
        }
        if !ranges::search(params.now, &expanded.transfer_times) {
            return Ok(None);
        }

        let claimed = balances::get_balances_for_ids(
            &expanded.token_ids,
            &expanded.ownership_times,
            unhandled,
        );
        if claimed.is_empty() {
            return Ok(None);
        }

        let criteria = expanded.approval_criteria.clone().unwrap_or_default();

        // Forceful transfers out of reserved-protocol addresses are refused
        // outright, never skipped.
        if params.level == LEVEL_COLLECTION
            && criteria.overrides_from_outgoing_approvals
            && self.reserved_protocol_addresses.contains(params.from)
        {
            return Err(EngineError::ReservedProtocolForcefulTransferDenied(format!(
                "{} is a reserved protocol address",
                params.from
            )));
        }

        self.check_requirement_flags(&criteria, params)?;
        let (challenge_writes, num_increments_override) =
            self.run_challenges(&criteria, params, &expanded, transfer)?;

        let ctx = TrackerContext {
            collection_id: params.collection.collection_id,
            approver_address: params.approver_address,
            approval_level: params.level,
            approval_id: &expanded.approval_id,
            approval_version: approval.version,
            now: params.now,
        };

        if let Some(predetermined) = &criteria.predetermined_balances {
            let num_increments = match num_increments_override {
                Some(n) => n,
                None => self.predetermined_num_increments(
                    &ctx,
                    &criteria,
                    predetermined.order_calculation_method,
                    params,
                )?,
            };
            let expected = balances::increment_balances(
                &predetermined.initial_balances,
                predetermined.increment_token_ids_by,
                predetermined.increment_ownership_times_by,
                num_increments,
            )?;
            if !balances::balances_equal(&claimed, &expected) {
                return Err(EngineError::DisallowedTransfer(format!(
                    "transfer does not match predetermined balances for use {}",
                    num_increments
                )));
            }
        }

        let (tracker_updates, admitted, overall_num_transfers) =
            self.assert_tracker_thresholds(&ctx, &criteria, &expanded, params, &claimed, mode)?;
        if admitted.is_empty() && mode.partial {
            return Err(EngineError::DisallowedTransfer(
                "thresholds admit nothing further under this approval".to_string(),
            ));
        }

        let auto = criteria.auto_deletion_options.unwrap_or_default();
        Ok(Some(ApprovalUsePlan {
            approval_id: expanded.approval_id.clone(),
            version: approval.version,
            admitted,
            tracker_updates,
            challenge_writes,
            overrides_from: criteria.overrides_from_outgoing_approvals,
            overrides_to: criteria.overrides_to_incoming_approvals,
            coin_transfers: criteria.coin_transfers.clone(),
            royalties: criteria.user_royalties.clone(),
            delete_after_one_use: auto.after_one_use,
            delete_after_overall_max: auto.after_overall_max_num_transfers,
            overall_max_num_transfers: criteria
                .max_num_transfers
                .as_ref()
                .map(|m| m.overall_max_num_transfers)
                .unwrap_or(0),
            overall_num_transfers,
        }))
    }

    fn check_requirement_flags(
        &self,
        criteria: &ApprovalCriteria,
        params: &LayerParams,
    ) -> Result<(), EngineError> {
        if criteria.require_from_equals_initiated_by && params.from != params.initiator {
            return Err(EngineError::DisallowedTransfer(
                "from must equal initiator".to_string(),
            ));
        }
        if criteria.require_from_does_not_equal_initiated_by && params.from == params.initiator {
            return Err(EngineError::DisallowedTransfer(
                "from must not equal initiator".to_string(),
            ));
        }
        if criteria.require_to_equals_initiated_by && params.to != params.initiator {
            return Err(EngineError::DisallowedTransfer(
                "to must equal initiator".to_string(),
            ));
        }
        if criteria.require_to_does_not_equal_initiated_by && params.to == params.initiator {
            return Err(EngineError::DisallowedTransfer(
                "to must not equal initiator".to_string(),
            ));
        }
        Ok(())
    }

    fn run_challenges(
        &self,
        criteria: &ApprovalCriteria,
        params: &LayerParams,
        expanded: &CollectionApproval,
        transfer: &Transfer,
    ) -> Result<(Vec<ChallengeWrite>, Option<u64>), EngineError> {
        let mut writes = Vec::new();
        let mut num_increments_override = None;

        if let Some(alt_time) = &criteria.alt_time_checks {
            crate::challenges::alt_time::check_alt_time(alt_time, params.now)?;
        }
        if let Some(checks) = &criteria.sender_checks {
            self.check_address_classification(checks, params.from, "sender")?;
        }
        if let Some(checks) = &criteria.recipient_checks {
            self.check_address_classification(checks, params.to, "recipient")?;
        }
        if let Some(checks) = &criteria.initiator_checks {
            self.check_address_classification(checks, params.initiator, "initiator")?;
        }
        for requirement in &criteria.must_own_tokens {
            self.check_must_own_tokens(
                requirement,
                params.initiator,
                params.from,
                params.to,
                params.now,
            )?;
        }
        for challenge in &criteria.merkle_challenges {
            let outcome = self.satisfy_merkle_challenge(
                challenge,
                &transfer.merkle_proofs,
                params.collection.collection_id,
                params.approver_address,
                params.level,
                &expanded.approval_id,
                params.initiator,
            )?;
            writes.extend(outcome.writes);
            if outcome.num_increments_override.is_some() {
                num_increments_override = outcome.num_increments_override;
            }
        }
        for challenge in &criteria.zk_proofs {
            writes.extend(self.satisfy_zk_proof(
                challenge,
                &transfer.zk_proof_solutions,
                params.collection.collection_id,
                params.approver_address,
                params.level,
                &expanded.approval_id,
            )?);
        }
        for challenge in &criteria.eth_signature_challenges {
            writes.extend(self.satisfy_eth_signature_challenge(
                challenge,
                &transfer.eth_signature_solutions,
                params.collection.collection_id,
                params.approver_address,
                params.level,
                &expanded.approval_id,
                params.initiator,
            )?);
        }
        for challenge in &criteria.dynamic_store_challenges {
            writes.extend(self.satisfy_dynamic_store_challenge(
                challenge,
                params.initiator,
                params.from,
                params.to,
            )?);
        }
        Ok((writes, num_increments_override))
    }

    fn predetermined_num_increments(
        &self,
        ctx: &TrackerContext,
        criteria: &ApprovalCriteria,
        method: OrderCalculationMethod,
        params: &LayerParams,
    ) -> Result<u64, EngineError> {
        let (tracker_type, address) = match method {
            OrderCalculationMethod::UseOverallNumTransfers => (TRACKER_OVERALL, ""),
            OrderCalculationMethod::UsePerFromNumTransfers => (TRACKER_FROM, params.from),
            OrderCalculationMethod::UsePerToNumTransfers => (TRACKER_TO, params.to),
            OrderCalculationMethod::UsePerInitiatedByNumTransfers => {
                (TRACKER_INITIATED_BY, params.initiator)
            }
            OrderCalculationMethod::UseMerkleChallengeLeafIndex => {
                return Err(EngineError::DisallowedTransfer(
                    "order method requires a merkle challenge with leaf ordering".to_string(),
                ));
            }
        };
        let (tracker_id, reset) = amount_tracker_settings(criteria);
        Ok(self.tracker_num_transfers(ctx, tracker_id, tracker_type, address, reset))
    }

    /// Runs the per-type tracker increments demanded by the present
    /// threshold sections. Returns the pending updates, the admitted
    /// balances (clamped only in partial mode), and the post-update overall
    /// transfer count.
    fn assert_tracker_thresholds(
        &self,
        ctx: &TrackerContext,
        criteria: &ApprovalCriteria,
        expanded: &CollectionApproval,
        params: &LayerParams,
        claimed: &[Balance],
        mode: EvalMode,
    ) -> Result<(Vec<TrackerUpdate>, Vec<Balance>, u64), EngineError> {
        let has_sections =
            criteria.max_num_transfers.is_some() || criteria.approval_amounts.is_some();
        if !has_sections {
            return Ok((Vec::new(), claimed.to_vec(), 0));
        }

        let (tracker_id, reset) = amount_tracker_settings(criteria);
        let amounts = criteria.approval_amounts.clone().unwrap_or_default();
        let counts = criteria.max_num_transfers.clone().unwrap_or_default();

        let threshold_balance = |amount: u128| -> Option<Vec<Balance>> {
            (amount > 0).then(|| {
                vec![Balance::new(
                    amount,
                    expanded.token_ids.clone(),
                    expanded.ownership_times.clone(),
                )]
            })
        };

        let slots: [(&str, &str, u128, u64); 4] = [
            (TRACKER_OVERALL, "", amounts.overall_approval_amount.0, counts.overall_max_num_transfers),
            (TRACKER_FROM, params.from, amounts.per_from_approval_amount.0, counts.per_from_max_num_transfers),
            (TRACKER_TO, params.to, amounts.per_to_approval_amount.0, counts.per_to_max_num_transfers),
            (TRACKER_INITIATED_BY, params.initiator, amounts.per_initiated_by_approval_amount.0, counts.per_initiated_by_max_num_transfers),
        ];

        let mut updates = Vec::new();
        let mut admitted = claimed.to_vec();
        let mut overall_num_transfers = 0;

        for (tracker_type, address, amount_threshold, count_threshold) in slots {
            // The overall tracker always advances when any section is
            // present; per-address trackers only when their threshold binds.
            let needed = tracker_type == TRACKER_OVERALL
                || amount_threshold > 0
                || count_threshold > 0;
            if !needed {
                continue;
            }
            let threshold = threshold_balance(amount_threshold);
            let increment = self.increment_and_assert(
                ctx,
                tracker_id,
                tracker_type,
                address,
                threshold.as_deref(),
                count_threshold,
                &admitted,
                reset,
                mode.partial,
            )?;
            if mode.partial {
                admitted = increment.admitted;
            }
            if tracker_type == TRACKER_OVERALL {
                overall_num_transfers = increment.update.tracker.num_transfers;
            }
            updates.push(increment.update);
        }
        Ok((updates, admitted, overall_num_transfers))
    }

    /// Scans one approval layer over `queue`. Commits tracker and challenge
    /// writes approval-by-approval as they pass (a later hard failure
    /// reverts the whole transaction).
    #[allow(clippy::too_many_arguments)]
    fn evaluate_layer(
        &mut self,
        params: &LayerParams,
        candidates: Vec<CollectionApproval>,
        transfer: &Transfer,
        queue: Vec<Balance>,
        mode: EvalMode,
    ) -> Result<LayerOutcome, EngineError> {
        let ordered = self.order_candidates(
            candidates,
            &transfer.prioritized_approvals,
            params.level,
            params.approver_address,
            params.only_prioritized,
        )?;

        let mut unhandled = queue;
        let mut used: Vec<ApprovalUsePlan> = Vec::new();
        let mut failures: Vec<(usize, String)> = Vec::new();

        for (index, approval) in ordered.iter().enumerate() {
            if unhandled.is_empty() {
                break;
            }
            match self.plan_approval_use(params, approval, transfer, &unhandled, mode) {
                Ok(None) => {}
                Ok(Some(plan)) => {
                    unhandled = balances::subtract_balances(&unhandled, &plan.admitted)?;
                    if !mode.dry_run {
                        let ctx = TrackerContext {
                            collection_id: params.collection.collection_id,
                            approver_address: params.approver_address,
                            approval_level: params.level,
                            approval_id: &plan.approval_id,
                            approval_version: plan.version,
                            now: params.now,
                        };
                        self.persist_tracker_updates(&ctx, plan.tracker_updates.clone());
                        self.apply_challenge_writes(plan.challenge_writes.clone());
                    }
                    used.push(plan);
                }
                Err(err) if is_hard_error(&err) => return Err(err),
                Err(err) => failures.push((index, err.to_string())),
            }
        }

        if !unhandled.is_empty() && !mode.partial {
            let diagnostic = match failures.as_slice() {
                [] => "no approval matched".to_string(),
                [(_, reason)] => reason.clone(),
                many => {
                    let indices: Vec<String> =
                        many.iter().map(|(i, _)| i.to_string()).collect();
                    format!(
                        "{} approvals matched but failed (indices: {})",
                        many.len(),
                        indices.join(", ")
                    )
                }
            };
            return Err(EngineError::InadequateApprovals(format!(
                "{} approvals not satisfied: attempting to transfer ID {} from {} to {} initiated by {} - {}",
                params.level,
                first_token_id(&unhandled),
                params.from,
                params.to,
                params.initiator,
                diagnostic
            )));
        }

        Ok(LayerOutcome {
            used,
            remaining: unhandled,
        })
    }

    /// Full three-layer evaluation of a single `(from, to)` movement.
    pub(crate) fn evaluate_single_transfer(
        &mut self,
        collection: &Collection,
        transfer: &Transfer,
        from: &str,
        to: &str,
        initiator: &str,
        mode: EvalMode,
        now: u64,
    ) -> Result<SingleTransferResult, EngineError> {
        let zero: Vec<Balance> = Vec::new();
        let queue = balances::add_balances(&zero, &transfer.balances)?;

        let collection_params = LayerParams {
            collection,
            level: LEVEL_COLLECTION,
            approver_address: "",
            only_prioritized: transfer.only_check_prioritized_collection_approvals,
            from,
            to,
            initiator,
            now,
        };
        let collection_outcome = self.evaluate_layer(
            &collection_params,
            collection.collection_approvals.clone(),
            transfer,
            queue.clone(),
            mode,
        )?;

        let mut outgoing_queue: Vec<Balance> = Vec::new();
        let mut incoming_queue: Vec<Balance> = Vec::new();
        for plan in &collection_outcome.used {
            // Mint has no user store: its legs behave as from-overridden.
            if !plan.overrides_from && from != MINT_ADDRESS {
                outgoing_queue = balances::add_balances(&outgoing_queue, &plan.admitted)?;
            }
            if !plan.overrides_to {
                incoming_queue = balances::add_balances(&incoming_queue, &plan.admitted)?;
            }
        }

        let mut approvals_used: Vec<UsedApproval> = Vec::new();
        let mut scheduled: Vec<ScheduledCoinTransfers> = Vec::new();
        let mut auto_deletions: Vec<AutoDeletion> = Vec::new();
        let mut record_layer =
            |outcome: &LayerOutcome, level: &str, approver: &str| {
                for plan in &outcome.used {
                    approvals_used.push(UsedApproval {
                        approval_id: plan.approval_id.clone(),
                        approver_address: approver.to_string(),
                        approval_level: level.to_string(),
                        version: plan.version,
                    });
                    if !plan.coin_transfers.is_empty() {
                        scheduled.push(ScheduledCoinTransfers {
                            approver_address: approver.to_string(),
                            transfers: plan.coin_transfers.clone(),
                            royalties: plan.royalties.clone(),
                        });
                    }
                    let threshold_reached = plan.delete_after_overall_max
                        && plan.overall_max_num_transfers > 0
                        && plan.overall_num_transfers >= plan.overall_max_num_transfers;
                    if plan.delete_after_one_use || threshold_reached {
                        auto_deletions.push(AutoDeletion {
                            approval_level: level.to_string(),
                            approver_address: approver.to_string(),
                            approval_id: plan.approval_id.clone(),
                        });
                    }
                }
            };
        record_layer(&collection_outcome, LEVEL_COLLECTION, "");

        let mut unapproved = collection_outcome.remaining.clone();

        // Sender-outgoing layer, entered only for queued cells.
        if !outgoing_queue.is_empty() {
            let store = self.balance_store_or_default(collection, from);
            let mut candidates: Vec<CollectionApproval> = store
                .outgoing_approvals
                .iter()
                .map(|a| a.to_collection_approval(from))
                .collect();
            if store.auto_approve_self_initiated_outgoing_transfers && initiator == from {
                candidates.push(synthetic_self_approval(from, initiator, true));
            }
            let params = LayerParams {
                collection,
                level: LEVEL_OUTGOING,
                approver_address: from,
                only_prioritized: transfer.only_check_prioritized_outgoing_approvals,
                from,
                to,
                initiator,
                now,
            };
            let outcome =
                self.evaluate_layer(&params, candidates, transfer, outgoing_queue, mode)?;
            record_layer(&outcome, LEVEL_OUTGOING, from);
            unapproved = balances::add_balances(&unapproved, &outcome.remaining)?;
        }

        // Recipient-incoming layer.
        let to_store = self.balance_store_or_default(collection, to);
        if !incoming_queue.is_empty() && !to_store.auto_approve_all_incoming_transfers {
            let mut candidates: Vec<CollectionApproval> = to_store
                .incoming_approvals
                .iter()
                .map(|a| a.to_collection_approval(to))
                .collect();
            if to_store.auto_approve_self_initiated_incoming_transfers && initiator == to {
                candidates.push(synthetic_self_approval(to, initiator, false));
            }
            let params = LayerParams {
                collection,
                level: LEVEL_INCOMING,
                approver_address: to,
                only_prioritized: transfer.only_check_prioritized_incoming_approvals,
                from,
                to,
                initiator,
                now,
            };
            let outcome =
                self.evaluate_layer(&params, candidates, transfer, incoming_queue, mode)?;
            record_layer(&outcome, LEVEL_INCOMING, to);
            unapproved = balances::add_balances(&unapproved, &outcome.remaining)?;
        }

        // Deduplicate: a cell refused by both user layers counts once.
        let unapproved = balances::clamp_balances_to_threshold(&unapproved, &queue);

        Ok(SingleTransferResult {
            approvals_used,
            scheduled_coins: scheduled,
            auto_deletions,
            unapproved,
        })
    }
}

fn amount_tracker_settings(
    criteria: &ApprovalCriteria,
) -> (&str, Option<&ResetTimeIntervals>) {
    if let Some(amounts) = &criteria.approval_amounts {
        if !amounts.amount_tracker_id.is_empty() || amounts.reset_time_intervals.is_some() {
            return (
                amounts.amount_tracker_id.as_str(),
                amounts.reset_time_intervals.as_ref(),
            );
        }
    }
    if let Some(counts) = &criteria.max_num_transfers {
        return (
            counts.amount_tracker_id.as_str(),
            counts.reset_time_intervals.as_ref(),
        );
    }
    ("", None)
}

/// The synthetic approval appended by the self-initiated auto-approve
/// flags: matches every balance, only when the holder initiated.
fn synthetic_self_approval(holder: &str, initiator: &str, outgoing: bool) -> CollectionApproval {
    CollectionApproval {
        approval_id: if outgoing {
            "self-initiated-outgoing".to_string()
        } else {
            "self-initiated-incoming".to_string()
        },
        from_list_id: if outgoing {
            holder.to_string()
        } else {
            LIST_ALL.to_string()
        },
        to_list_id: if outgoing {
            LIST_ALL.to_string()
        } else {
            holder.to_string()
        },
        initiated_by_list_id: initiator.to_string(),
        token_ids: vec![crate::ranges::UintRange::universe()],
        transfer_times: vec![crate::ranges::UintRange::universe()],
        ownership_times: vec![crate::ranges::UintRange::universe()],
        version: 0,
        approval_criteria: None,
        allowed_combinations: Vec::new(),
        uri: None,
        custom_data: None,
    }
}
