//! Persistent per-approval counters and running amounts.
//!
//! Trackers are created on first hit, logically reset when the approval's
//! version moved or a reset-interval boundary was crossed, and enforce the
//! per-overall / per-from / per-to / per-initiator thresholds.

use near_sdk::near;

use crate::approvals::types::ResetTimeIntervals;
use crate::balances::{self, Balance};
use crate::errors::EngineError;
use crate::storage::keys;
use crate::Contract;

#[near(serializers = [borsh, json])]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApprovalTracker {
    /// Cumulative consumed amounts within the current reset window.
    pub amounts: Vec<Balance>,
    pub num_transfers: u64,
    /// Unix ms of the last recorded use.
    pub last_updated_at: u64,
    /// Approval version this tracker was accumulated under.
    pub version: u64,
}

impl ApprovalTracker {
    fn fresh(version: u64, now: u64) -> Self {
        Self {
            amounts: Vec::new(),
            num_transfers: 0,
            last_updated_at: now,
            version,
        }
    }

    fn reset(&mut self) {
        self.amounts = Vec::new();
        self.num_transfers = 0;
    }
}

/// A pending tracker write computed during approval validation and persisted
/// only after the whole approval passes.
#[derive(Clone, Debug)]
pub struct TrackerUpdate {
    pub key: String,
    pub tracker: ApprovalTracker,
    pub tracker_type: String,
    pub address: String,
    pub amount_tracker_id: String,
}

/// The first interval boundary strictly after `t`. Boundaries before
/// `start_time` do not exist: a future start time defers every reset.
fn boundary_after(t: u64, policy: &ResetTimeIntervals) -> Option<u64> {
    if policy.interval_length == 0 {
        return None;
    }
    if t < policy.start_time {
        return Some(policy.start_time);
    }
    let elapsed_intervals = (t - policy.start_time) / policy.interval_length;
    policy
        .start_time
        .checked_add(policy.interval_length.checked_mul(elapsed_intervals + 1)?)
}

/// Outcome of one threshold assertion: the tracker state to persist plus the
/// balances actually admitted (differs from the request only in partial
/// mode).
#[derive(Debug)]
pub struct TrackerIncrement {
    pub update: TrackerUpdate,
    pub admitted: Vec<Balance>,
}

pub struct TrackerContext<'a> {
    pub collection_id: u64,
    pub approver_address: &'a str,
    pub approval_level: &'a str,
    pub approval_id: &'a str,
    pub approval_version: u64,
    pub now: u64,
}

impl Contract {
    fn load_tracker(&self, key: &str, ctx: &TrackerContext) -> ApprovalTracker {
        let mut tracker = self
            .approval_trackers
            .get(key)
            .cloned()
            .unwrap_or_else(|| ApprovalTracker::fresh(ctx.approval_version, ctx.now));
        // A stale version invalidates everything accumulated under it.
        if tracker.version != ctx.approval_version {
            tracker.reset();
            tracker.version = ctx.approval_version;
        }
        tracker
    }

    /// One threshold pass: load, version-reset, interval-reset,
    /// amount threshold, transfer-count threshold. In partial mode, clamps
    /// the request to what the thresholds still admit instead of erroring.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn increment_and_assert(
        &self,
        ctx: &TrackerContext,
        amount_tracker_id: &str,
        tracker_type: &str,
        address: &str,
        threshold_amounts: Option<&[Balance]>,
        threshold_transfers: u64,
        transfer_balances: &[Balance],
        reset_policy: Option<&ResetTimeIntervals>,
        partial: bool,
    ) -> Result<TrackerIncrement, EngineError> {
        let key = keys::approval_tracker_key(
            ctx.collection_id,
            ctx.approver_address,
            ctx.approval_level,
            ctx.approval_id,
            amount_tracker_id,
            tracker_type,
            address,
        );
        let mut tracker = self.load_tracker(&key, ctx);

        if let Some(policy) = reset_policy {
            // Rolling over several intervals in one jump still zeroes once.
            if let Some(boundary) = boundary_after(tracker.last_updated_at, policy) {
                if ctx.now >= boundary {
                    tracker.reset();
                }
            }
        }

        let mut admitted = transfer_balances.to_vec();

        if let Some(threshold) = threshold_amounts {
            let candidate = balances::add_balances(&tracker.amounts, &admitted)?;
            match balances::assert_balances_do_not_exceed(&candidate, threshold) {
                Ok(()) => tracker.amounts = candidate,
                Err(err) => {
                    if !partial {
                        return Err(EngineError::DisallowedTransfer(format!(
                            "exceeded approval amount threshold for {} tracker: {}",
                            tracker_type, err
                        )));
                    }
                    let capacity =
                        balances::subtract_balances(threshold, &tracker.amounts).unwrap_or_default();
                    admitted = balances::clamp_balances_to_threshold(&admitted, &capacity);
                    tracker.amounts = balances::add_balances(&tracker.amounts, &admitted)?;
                }
            }
        }

        let new_num_transfers = tracker
            .num_transfers
            .checked_add(1)
            .ok_or_else(EngineError::amount_overflow)?;
        if threshold_transfers > 0 && new_num_transfers > threshold_transfers {
            if partial {
                admitted = Vec::new();
            } else {
                return Err(EngineError::DisallowedTransfer(format!(
                    "exceeded max num transfers - {}",
                    threshold_transfers
                )));
            }
        } else {
            tracker.num_transfers = new_num_transfers;
        }

        tracker.last_updated_at = ctx.now;
        Ok(TrackerIncrement {
            update: TrackerUpdate {
                key,
                tracker,
                tracker_type: tracker_type.to_string(),
                address: address.to_string(),
                amount_tracker_id: amount_tracker_id.to_string(),
            },
            admitted,
        })
    }

    /// The current `numTransfers` of a tracker after logical resets, used
    /// for predetermined-balance order calculation.
    pub(crate) fn tracker_num_transfers(
        &self,
        ctx: &TrackerContext,
        amount_tracker_id: &str,
        tracker_type: &str,
        address: &str,
        reset_policy: Option<&ResetTimeIntervals>,
    ) -> u64 {
        let key = keys::approval_tracker_key(
            ctx.collection_id,
            ctx.approver_address,
            ctx.approval_level,
            ctx.approval_id,
            amount_tracker_id,
            tracker_type,
            address,
        );
        let mut tracker = self.load_tracker(&key, ctx);
        if let Some(policy) = reset_policy {
            if let Some(boundary) = boundary_after(tracker.last_updated_at, policy) {
                if ctx.now >= boundary {
                    tracker.reset();
                }
            }
        }
        tracker.num_transfers
    }

    pub(crate) fn persist_tracker_updates(
        &mut self,
        ctx: &TrackerContext,
        updates: Vec<TrackerUpdate>,
    ) {
        for update in updates {
            crate::events::emit_approval_tracker_updated(
                ctx.collection_id,
                ctx.approver_address,
                ctx.approval_level,
                ctx.approval_id,
                &update,
            );
            self.approval_trackers.insert(update.key, update.tracker);
        }
    }

    // Challenge trackers: per-leaf use counters.

    pub(crate) fn challenge_tracker_uses(&self, key: &str) -> u64 {
        self.challenge_trackers.get(key).copied().unwrap_or(0)
    }

    pub(crate) fn record_challenge_use(&mut self, key: String) {
        let uses = self.challenge_tracker_uses(&key);
        self.challenge_trackers.insert(key, uses + 1);
    }
}
