#[cfg(test)]
mod tests {
    use near_sdk::json_types::U64;

    use crate::approvals::types::UserOutgoingApproval;
    use crate::tests::test_utils::*;

    fn outgoing(approval_id: &str) -> UserOutgoingApproval {
        UserOutgoingApproval {
            approval_id: approval_id.to_string(),
            to_list_id: "All".to_string(),
            initiated_by_list_id: "All".to_string(),
            token_ids: vec![full_range()],
            transfer_times: vec![full_range()],
            ownership_times: vec![full_range()],
            version: 0,
            approval_criteria: None,
            allowed_combinations: Vec::new(),
        }
    }

    fn collection_version(contract: &crate::Contract, collection_id: u64) -> u64 {
        contract
            .get_collection(U64(collection_id))
            .unwrap()
            .collection_approvals
            .first()
            .map(|a| a.version)
            .expect("approval missing")
    }

    #[test]
    fn first_assignment_is_version_zero() {
        let mut contract = new_contract();
        let collection_id = basic_collection(&mut contract);
        assert_eq!(collection_version(&contract, collection_id), 0);
        assert_eq!(
            contract.get_approval_version(
                U64(collection_id),
                "collection".to_string(),
                String::new(),
                "open".to_string(),
            ),
            Some(0)
        );
    }

    #[test]
    fn unchanged_content_keeps_its_version() {
        let mut contract = new_contract();
        let collection_id = basic_collection(&mut contract);
        set_caller(alice());
        contract
            .update_collection(
                U64(collection_id),
                None,
                Some(vec![permissive_approval("open")]),
                None,
                None,
                None,
            )
            .unwrap();
        assert_eq!(collection_version(&contract, collection_id), 0);
    }

    #[test]
    fn changed_content_bumps_and_deletion_never_rewinds() {
        let mut contract = new_contract();
        let collection_id = basic_collection(&mut contract);
        set_caller(alice());

        let mut narrowed = permissive_approval("open");
        narrowed.token_ids = vec![range(1, 50)];
        contract
            .update_collection(U64(collection_id), None, Some(vec![narrowed]), None, None, None)
            .unwrap();
        assert_eq!(collection_version(&contract, collection_id), 1);

        // Delete, then recreate under the same ID: the counter continues.
        contract
            .update_collection(U64(collection_id), None, Some(vec![]), None, None, None)
            .unwrap();
        contract
            .update_collection(
                U64(collection_id),
                None,
                Some(vec![permissive_approval("open")]),
                None,
                None,
                None,
            )
            .unwrap();
        assert_eq!(collection_version(&contract, collection_id), 2);
        assert_eq!(
            contract.get_approval_version(
                U64(collection_id),
                "collection".to_string(),
                String::new(),
                "open".to_string(),
            ),
            Some(2)
        );
    }

    #[test]
    fn user_approvals_version_independently() {
        let mut contract = new_contract();
        let collection_id = basic_collection(&mut contract);

        set_caller(bob());
        contract
            .set_outgoing_approvals(U64(collection_id), vec![outgoing("give")])
            .unwrap();
        let store = contract.get_balance_store(U64(collection_id), bob().to_string());
        assert_eq!(store.outgoing_approvals[0].version, 0);

        // Identical resubmission is a no-op for versioning.
        contract
            .set_outgoing_approvals(U64(collection_id), vec![outgoing("give")])
            .unwrap();
        let store = contract.get_balance_store(U64(collection_id), bob().to_string());
        assert_eq!(store.outgoing_approvals[0].version, 0);

        let mut narrowed = outgoing("give");
        narrowed.token_ids = vec![range(1, 5)];
        contract
            .set_outgoing_approvals(U64(collection_id), vec![narrowed])
            .unwrap();
        let store = contract.get_balance_store(U64(collection_id), bob().to_string());
        assert_eq!(store.outgoing_approvals[0].version, 1);

        // Same ID under another holder starts its own counter.
        set_caller(charlie());
        contract
            .set_outgoing_approvals(U64(collection_id), vec![outgoing("give")])
            .unwrap();
        let store = contract.get_balance_store(U64(collection_id), charlie().to_string());
        assert_eq!(store.outgoing_approvals[0].version, 0);
    }

    #[test]
    fn single_approval_wrappers_upsert_and_delete() {
        let mut contract = new_contract();
        let collection_id = basic_collection(&mut contract);

        set_caller(bob());
        contract.set_outgoing_approval(U64(collection_id), outgoing("a")).unwrap();
        contract.set_outgoing_approval(U64(collection_id), outgoing("b")).unwrap();
        let mut replacement = outgoing("a");
        replacement.token_ids = vec![range(1, 3)];
        contract.set_outgoing_approval(U64(collection_id), replacement).unwrap();

        let store = contract.get_balance_store(U64(collection_id), bob().to_string());
        assert_eq!(store.outgoing_approvals.len(), 2);
        let a = store.outgoing_approvals.iter().find(|x| x.approval_id == "a").unwrap();
        assert_eq!(a.version, 1);
        assert_eq!(a.token_ids, vec![range(1, 3)]);

        contract
            .delete_outgoing_approval(U64(collection_id), "a".to_string())
            .unwrap();
        let store = contract.get_balance_store(U64(collection_id), bob().to_string());
        assert_eq!(store.outgoing_approvals.len(), 1);

        let err = contract
            .delete_outgoing_approval(U64(collection_id), "a".to_string())
            .unwrap_err();
        assert!(err.to_string().contains("outgoing approval a"), "{}", err);
    }

    #[test]
    fn frozen_user_permissions_stay_frozen() {
        let mut contract = new_contract();
        let collection_id = basic_collection(&mut contract);

        set_caller(bob());
        contract
            .shrink_user_permissions(U64(collection_id), Some(false), None, None)
            .unwrap();
        let err = contract
            .set_outgoing_approvals(U64(collection_id), vec![outgoing("give")])
            .unwrap_err();
        assert!(err.to_string().contains("outgoing approvals are frozen"), "{}", err);

        let err = contract
            .shrink_user_permissions(U64(collection_id), Some(true), None, None)
            .unwrap_err();
        assert!(err.to_string().contains("can only be shrunk"), "{}", err);

        // Other sections remain usable.
        contract
            .set_auto_approve_flags(U64(collection_id), None, None, Some(false))
            .unwrap();
    }
}
