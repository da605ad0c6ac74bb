//! Approval versioning.
//!
//! Every approval identity `(collection, level, approver, approval ID)` has
//! a monotonic version counter that survives deletion: recreating an
//! approval under an old ID always yields a fresh version, so stale
//! prioritized pins can never silently bind to changed terms.

use crate::approvals::types::{CollectionApproval, UserIncomingApproval, UserOutgoingApproval};
use crate::constants::{LEVEL_COLLECTION, LEVEL_INCOMING, LEVEL_OUTGOING};
use crate::storage::keys;
use crate::Contract;

fn collection_content_matches(a: &CollectionApproval, b: &CollectionApproval) -> bool {
    let mut left = a.clone();
    let mut right = b.clone();
    left.version = 0;
    right.version = 0;
    left == right
}

fn outgoing_content_matches(a: &UserOutgoingApproval, b: &UserOutgoingApproval) -> bool {
    let mut left = a.clone();
    let mut right = b.clone();
    left.version = 0;
    right.version = 0;
    left == right
}

fn incoming_content_matches(a: &UserIncomingApproval, b: &UserIncomingApproval) -> bool {
    let mut left = a.clone();
    let mut right = b.clone();
    left.version = 0;
    right.version = 0;
    left == right
}

impl Contract {
    /// Allocates the next version for an approval identity and advances the
    /// counter.
    pub(crate) fn next_approval_version(
        &mut self,
        collection_id: u64,
        approval_level: &str,
        approver_address: &str,
        approval_id: &str,
    ) -> u64 {
        let key =
            keys::approval_version_key(collection_id, approval_level, approver_address, approval_id);
        let next = self.approval_versions.get(&key).copied().unwrap_or(0);
        self.approval_versions.insert(key, next + 1);
        next
    }

    /// New or changed approvals get a fresh version; untouched ones keep
    /// theirs.
    pub(crate) fn assign_collection_approval_versions(
        &mut self,
        collection_id: u64,
        approvals: &mut [CollectionApproval],
        existing: &[CollectionApproval],
    ) {
        for approval in approvals.iter_mut() {
            match existing.iter().find(|e| e.approval_id == approval.approval_id) {
                Some(previous) if collection_content_matches(approval, previous) => {
                    approval.version = previous.version;
                }
                _ => {
                    approval.version = self.next_approval_version(
                        collection_id,
                        LEVEL_COLLECTION,
                        "",
                        &approval.approval_id,
                    );
                }
            }
        }
    }

    pub(crate) fn assign_outgoing_approval_versions(
        &mut self,
        collection_id: u64,
        holder: &str,
        approvals: &mut [UserOutgoingApproval],
        existing: &[UserOutgoingApproval],
    ) {
        for approval in approvals.iter_mut() {
            match existing.iter().find(|e| e.approval_id == approval.approval_id) {
                Some(previous) if outgoing_content_matches(approval, previous) => {
                    approval.version = previous.version;
                }
                _ => {
                    approval.version = self.next_approval_version(
                        collection_id,
                        LEVEL_OUTGOING,
                        holder,
                        &approval.approval_id,
                    );
                }
            }
        }
    }

    pub(crate) fn assign_incoming_approval_versions(
        &mut self,
        collection_id: u64,
        holder: &str,
        approvals: &mut [UserIncomingApproval],
        existing: &[UserIncomingApproval],
    ) {
        for approval in approvals.iter_mut() {
            match existing.iter().find(|e| e.approval_id == approval.approval_id) {
                Some(previous) if incoming_content_matches(approval, previous) => {
                    approval.version = previous.version;
                }
                _ => {
                    approval.version = self.next_approval_version(
                        collection_id,
                        LEVEL_INCOMING,
                        holder,
                        &approval.approval_id,
                    );
                }
            }
        }
    }
}
