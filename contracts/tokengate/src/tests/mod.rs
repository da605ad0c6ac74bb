
// --- Unit Tests ---
pub mod unit {
    pub mod address_lists_test;
    pub mod admin_test;
    pub mod balances_test;
    pub mod challenges_test;
    pub mod coins_test;
    pub mod collections_test;
    pub mod denoms_test;
    pub mod first_match_test;
    pub mod lifecycle_test;
    pub mod ranges_test;
    pub mod trackers_test;
    pub mod transfer_test;
}
