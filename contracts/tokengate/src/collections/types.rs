use near_sdk::near;

use crate::approvals::types::{CollectionApproval, UserIncomingApproval, UserOutgoingApproval};
use crate::balances::Balance;
use crate::ranges::UintRange;

#[near(serializers = [borsh, json])]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollectionPermissions {
    #[serde(default)]
    pub can_update_collection_approvals: bool,
    #[serde(default)]
    pub can_update_valid_token_ids: bool,
    #[serde(default)]
    pub can_archive_collection: bool,
    #[serde(default)]
    pub can_delete_collection: bool,
}

#[near(serializers = [borsh, json])]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UserPermissions {
    #[serde(default)]
    pub can_update_outgoing_approvals: bool,
    #[serde(default)]
    pub can_update_incoming_approvals: bool,
    #[serde(default)]
    pub can_update_auto_approve_flags: bool,
}

impl UserPermissions {
    pub fn permissive() -> Self {
        Self {
            can_update_outgoing_approvals: true,
            can_update_incoming_approvals: true,
            can_update_auto_approve_flags: true,
        }
    }
}

#[near(serializers = [borsh, json])]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserBalanceStore {
    pub balances: Vec<Balance>,
    pub outgoing_approvals: Vec<UserOutgoingApproval>,
    pub incoming_approvals: Vec<UserIncomingApproval>,
    #[serde(default)]
    pub auto_approve_self_initiated_outgoing_transfers: bool,
    #[serde(default)]
    pub auto_approve_self_initiated_incoming_transfers: bool,
    #[serde(default)]
    pub auto_approve_all_incoming_transfers: bool,
    #[serde(default)]
    pub user_permissions: UserPermissions,
}

impl Default for UserBalanceStore {
    fn default() -> Self {
        Self {
            balances: Vec::new(),
            outgoing_approvals: Vec::new(),
            incoming_approvals: Vec::new(),
            auto_approve_self_initiated_outgoing_transfers: true,
            auto_approve_self_initiated_incoming_transfers: true,
            // Receiving requires no opt-in unless the holder turns this off.
            auto_approve_all_incoming_transfers: true,
            user_permissions: UserPermissions::permissive(),
        }
    }
}

/// A path through which collection balances wrap into an SDK-style coin
/// denom. `balances` is the template escrowed per unit of the wrapped denom.
#[near(serializers = [borsh, json])]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CosmosCoinWrapperPath {
    pub path_id: String,
    /// Escrow address for the path; auto-registered reserved-protocol.
    pub address: String,
    pub balances: Vec<Balance>,
    #[serde(default)]
    pub symbol: Option<String>,
    /// Expose an `alias:` denom alongside the `wrapped:` denom.
    #[serde(default)]
    pub allow_alias: bool,
}

#[near(serializers = [borsh, json])]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Collection {
    pub collection_id: u64,
    pub valid_token_ids: Vec<UintRange>,
    pub collection_approvals: Vec<CollectionApproval>,
    pub default_balances: UserBalanceStore,
    pub created_by: String,
    /// Manager address; feeds the reserved `Manager` list keyword.
    pub manager: String,
    /// Approver substitute for collection-level coin transfers.
    pub mint_escrow_address: String,
    #[serde(default)]
    pub cosmos_coin_wrapper_paths: Vec<CosmosCoinWrapperPath>,
    pub permissions: CollectionPermissions,
    #[serde(default)]
    pub is_archived: bool,
}
