#[cfg(test)]
mod tests {
    use near_sdk::json_types::U64;

    use crate::approvals::types::{
        AddressChecks, AltTimeChecks, ApprovalCriteria, ApprovalIdentifier, AutoDeletionOptions,
        CoinTransfer, CollectionApproval, MaxNumTransfers, OrderCalculationMethod,
        PredeterminedBalances, UserIncomingApproval, UserRoyalties,
    };
    use crate::tests::test_utils::*;
    use crate::{EngineError, MINT_ADDRESS};

    fn gated_approval(criteria: ApprovalCriteria) -> CollectionApproval {
        let mut approval = permissive_approval("gated");
        approval.approval_criteria = Some(criteria);
        approval
    }

    fn one_use_criteria() -> ApprovalCriteria {
        ApprovalCriteria {
            max_num_transfers: Some(MaxNumTransfers {
                overall_max_num_transfers: 1,
                amount_tracker_id: "t".to_string(),
                ..MaxNumTransfers::default()
            }),
            ..ApprovalCriteria::default()
        }
    }

    #[test]
    fn plain_transfer_moves_balances() {
        let mut contract = new_contract();
        let collection_id = basic_collection(&mut contract);

        set_caller(bob());
        contract
            .transfer_tokens(
                U64(collection_id),
                vec![simple_transfer(bob().as_str(), charlie(), vec![bal(5, range(1, 1))])],
            )
            .unwrap();

        assert_eq!(amount_at(&contract, collection_id, &bob(), 1), 95);
        assert_eq!(amount_at(&contract, collection_id, &charlie(), 1), 105);
        assert_eq!(amount_at(&contract, collection_id, &bob(), 2), 100);
    }

    #[test]
    fn batch_size_limits() {
        let mut contract = new_contract();
        let collection_id = basic_collection(&mut contract);
        set_caller(bob());
        let err = contract
            .transfer_tokens(U64(collection_id), vec![])
            .unwrap_err();
        assert!(err.to_string().contains("between 1 and 25 transfers"), "{}", err);
    }

    #[test]
    fn overall_max_binds_across_transfers() {
        let mut contract = new_contract();
        let collection_id =
            basic_collection_with(&mut contract, vec![gated_approval(one_use_criteria())]);

        set_caller(bob());
        let transfer = simple_transfer(bob().as_str(), charlie(), vec![bal(1, range(1, 1))]);
        contract
            .transfer_tokens(U64(collection_id), vec![transfer.clone()])
            .unwrap();

        let err = contract
            .transfer_tokens(U64(collection_id), vec![transfer])
            .unwrap_err();
        assert!(err.to_string().contains("collection approvals not satisfied"), "{}", err);
        assert!(err.to_string().contains("exceeded max num transfers - 1"), "{}", err);
    }

    #[test]
    fn version_pin_mismatch_aborts_without_tracker_use() {
        let mut contract = new_contract();
        let collection_id =
            basic_collection_with(&mut contract, vec![gated_approval(one_use_criteria())]);

        set_caller(bob());
        let mut pinned = simple_transfer(bob().as_str(), charlie(), vec![bal(1, range(1, 1))]);
        pinned.prioritized_approvals = vec![ApprovalIdentifier {
            approval_id: "gated".to_string(),
            approval_level: "collection".to_string(),
            approver_address: String::new(),
            version: 5,
        }];
        let err = contract
            .transfer_tokens(U64(collection_id), vec![pinned.clone()])
            .unwrap_err();
        assert!(matches!(err, EngineError::MismatchedVersions(_)), "{}", err);
        assert!(err.to_string().contains("pinned to version 5"), "{}", err);

        // The abort fired before any tracker write: the single permitted use
        // is still available under the correct pin.
        pinned.prioritized_approvals[0].version = 0;
        contract
            .transfer_tokens(U64(collection_id), vec![pinned])
            .unwrap();
    }

    #[test]
    fn offline_hours_refuse_the_transfer() {
        let mut contract = new_contract();
        // The test block timestamp sits in UTC hour 22.
        let criteria = ApprovalCriteria {
            alt_time_checks: Some(AltTimeChecks {
                offline_hours: vec![range(22, 22)],
                offline_days: vec![],
            }),
            ..ApprovalCriteria::default()
        };
        let collection_id = basic_collection_with(&mut contract, vec![gated_approval(criteria)]);

        set_caller(bob());
        let err = contract
            .transfer_tokens(
                U64(collection_id),
                vec![simple_transfer(bob().as_str(), charlie(), vec![bal(1, range(1, 1))])],
            )
            .unwrap_err();
        assert!(
            err.to_string().contains("current UTC hour 22 falls within offline hours"),
            "{}",
            err
        );
    }

    #[test]
    fn recipient_contract_requirement() {
        let mut contract = new_contract();
        let criteria = ApprovalCriteria {
            recipient_checks: Some(AddressChecks {
                must_be_wasm_contract: true,
                ..AddressChecks::default()
            }),
            ..ApprovalCriteria::default()
        };
        let collection_id = basic_collection_with(&mut contract, vec![gated_approval(criteria)]);

        set_caller(bob());
        let transfer = simple_transfer(bob().as_str(), charlie(), vec![bal(1, range(1, 1))]);
        let err = contract
            .transfer_tokens(U64(collection_id), vec![transfer.clone()])
            .unwrap_err();
        assert!(err.to_string().contains("must be a WASM contract"), "{}", err);

        set_caller(alice());
        contract.register_wasm_contract(charlie(), true).unwrap();
        set_caller(bob());
        contract
            .transfer_tokens(U64(collection_id), vec![transfer])
            .unwrap();
    }

    #[test]
    fn royalty_and_protocol_fee_split() {
        let mut contract = new_contract();
        let criteria = ApprovalCriteria {
            coin_transfers: vec![CoinTransfer {
                to: alice().to_string(),
                coins: vec![coin(1_000, "unear")],
                override_from_with_approver_address: false,
                override_to_with_initiator: false,
            }],
            user_royalties: Some(UserRoyalties {
                payout_address: "royalties.near".to_string(),
                percentage: 250,
            }),
            ..ApprovalCriteria::default()
        };
        let collection_id = basic_collection_with(&mut contract, vec![gated_approval(criteria)]);

        fund_ledger(&mut contract, bob(), 2_000);
        set_caller(bob());
        contract
            .transfer_tokens(
                U64(collection_id),
                vec![simple_transfer(bob().as_str(), charlie(), vec![bal(1, range(1, 1))])],
            )
            .unwrap();

        // 2.5% royalty comes out of the face amount; the 0.5% protocol fee
        // is charged on top of it.
        assert_eq!(contract.get_coin_balance(alice().to_string(), "unear".into()).0, 975);
        assert_eq!(contract.get_coin_balance("royalties.near".into(), "unear".into()).0, 25);
        assert_eq!(contract.get_coin_balance("community-pool".into(), "unear".into()).0, 5);
        assert_eq!(contract.get_coin_balance(bob().to_string(), "unear".into()).0, 995);
    }

    #[test]
    fn affiliate_takes_a_share_of_the_fee() {
        let mut contract = new_contract();
        set_caller(alice());
        contract.update_params(None, Some(5_000), None).unwrap();

        let criteria = ApprovalCriteria {
            coin_transfers: vec![CoinTransfer {
                to: alice().to_string(),
                coins: vec![coin(1_000, "unear")],
                override_from_with_approver_address: false,
                override_to_with_initiator: false,
            }],
            ..ApprovalCriteria::default()
        };
        let collection_id = basic_collection_with(&mut contract, vec![gated_approval(criteria)]);

        fund_ledger(&mut contract, bob(), 2_000);
        set_caller(bob());
        let mut transfer = simple_transfer(bob().as_str(), charlie(), vec![bal(1, range(1, 1))]);
        transfer.affiliate_address = Some("affiliate.near".to_string());
        contract.transfer_tokens(U64(collection_id), vec![transfer]).unwrap();

        // Fee 5: half to the affiliate (floored), rest to the pool.
        assert_eq!(contract.get_coin_balance("affiliate.near".into(), "unear".into()).0, 2);
        assert_eq!(contract.get_coin_balance("community-pool".into(), "unear".into()).0, 3);
        assert_eq!(contract.get_coin_balance(alice().to_string(), "unear".into()).0, 1_000);
    }

    #[test]
    fn insufficient_ledger_blocks_the_whole_transfer() {
        let mut contract = new_contract();
        let criteria = ApprovalCriteria {
            coin_transfers: vec![CoinTransfer {
                to: alice().to_string(),
                coins: vec![coin(1_000, "unear")],
                override_from_with_approver_address: false,
                override_to_with_initiator: false,
            }],
            ..ApprovalCriteria::default()
        };
        let collection_id = basic_collection_with(&mut contract, vec![gated_approval(criteria)]);

        fund_ledger(&mut contract, bob(), 500);
        set_caller(bob());
        let err = contract
            .transfer_tokens(
                U64(collection_id),
                vec![simple_transfer(bob().as_str(), charlie(), vec![bal(1, range(1, 1))])],
            )
            .unwrap_err();
        assert!(err.to_string().contains("cannot cover"), "{}", err);
        // No token movement either.
        assert_eq!(amount_at(&contract, collection_id, &bob(), 1), 100);
    }

    #[test]
    fn minting_creates_declared_tokens_only() {
        let mut contract = new_contract();
        let collection_id = basic_collection(&mut contract);

        set_caller(bob());
        contract
            .transfer_tokens(
                U64(collection_id),
                vec![simple_transfer(MINT_ADDRESS, bob(), vec![bal(5, range(1, 1))])],
            )
            .unwrap();
        assert_eq!(amount_at(&contract, collection_id, &bob(), 1), 105);

        let err = contract
            .transfer_tokens(
                U64(collection_id),
                vec![simple_transfer(MINT_ADDRESS, bob(), vec![bal(1, range(200, 200))])],
            )
            .unwrap_err();
        assert!(err.to_string().contains("not valid for collection"), "{}", err);
    }

    #[test]
    fn opted_out_recipient_needs_an_incoming_approval() {
        let mut contract = new_contract();
        let collection_id = basic_collection(&mut contract);

        set_caller(charlie());
        contract
            .set_auto_approve_flags(U64(collection_id), None, None, Some(false))
            .unwrap();

        set_caller(bob());
        let transfer = simple_transfer(bob().as_str(), charlie(), vec![bal(1, range(1, 1))]);
        let err = contract
            .transfer_tokens(U64(collection_id), vec![transfer.clone()])
            .unwrap_err();
        assert!(err.to_string().contains("incoming approvals not satisfied"), "{}", err);

        set_caller(charlie());
        contract
            .set_incoming_approvals(
                U64(collection_id),
                vec![UserIncomingApproval {
                    approval_id: "accept-all".to_string(),
                    from_list_id: "All".to_string(),
                    initiated_by_list_id: "All".to_string(),
                    token_ids: vec![full_range()],
                    transfer_times: vec![full_range()],
                    ownership_times: vec![full_range()],
                    version: 0,
                    approval_criteria: None,
                    allowed_combinations: Vec::new(),
                }],
            )
            .unwrap();

        set_caller(bob());
        contract.transfer_tokens(U64(collection_id), vec![transfer]).unwrap();
        assert_eq!(amount_at(&contract, collection_id, &charlie(), 1), 101);
    }

    #[test]
    fn forceful_override_skips_the_incoming_layer() {
        let mut contract = new_contract();
        let criteria = ApprovalCriteria {
            overrides_to_incoming_approvals: true,
            ..ApprovalCriteria::default()
        };
        let collection_id = basic_collection_with(&mut contract, vec![gated_approval(criteria)]);

        set_caller(charlie());
        contract
            .set_auto_approve_flags(U64(collection_id), None, None, Some(false))
            .unwrap();

        set_caller(bob());
        contract
            .transfer_tokens(
                U64(collection_id),
                vec![simple_transfer(bob().as_str(), charlie(), vec![bal(1, range(1, 1))])],
            )
            .unwrap();
        assert_eq!(amount_at(&contract, collection_id, &charlie(), 1), 101);
    }

    #[test]
    fn reserved_protocol_sender_refuses_forceful_transfers() {
        let mut contract = new_contract();
        let criteria = ApprovalCriteria {
            overrides_from_outgoing_approvals: true,
            ..ApprovalCriteria::default()
        };
        let collection_id = basic_collection_with(&mut contract, vec![gated_approval(criteria)]);

        set_caller(alice());
        contract
            .set_reserved_protocol_address(bob().to_string(), true)
            .unwrap();

        set_caller(charlie());
        let err = contract
            .transfer_tokens(
                U64(collection_id),
                vec![simple_transfer(bob().as_str(), charlie(), vec![bal(1, range(1, 1))])],
            )
            .unwrap_err();
        assert!(
            matches!(err, EngineError::ReservedProtocolForcefulTransferDenied(_)),
            "{}",
            err
        );
        assert_eq!(amount_at(&contract, collection_id, &bob(), 1), 100);
    }

    #[test]
    fn approval_auto_deletes_after_one_use() {
        let mut contract = new_contract();
        let criteria = ApprovalCriteria {
            auto_deletion_options: Some(AutoDeletionOptions {
                after_one_use: true,
                after_overall_max_num_transfers: false,
            }),
            ..ApprovalCriteria::default()
        };
        let collection_id = basic_collection_with(&mut contract, vec![gated_approval(criteria)]);

        set_caller(bob());
        let transfer = simple_transfer(bob().as_str(), charlie(), vec![bal(1, range(1, 1))]);
        contract
            .transfer_tokens(U64(collection_id), vec![transfer.clone()])
            .unwrap();

        let collection = contract.get_collection(U64(collection_id)).unwrap();
        assert!(collection.collection_approvals.is_empty());

        let err = contract
            .transfer_tokens(U64(collection_id), vec![transfer])
            .unwrap_err();
        assert!(err.to_string().contains("no approval matched"), "{}", err);
    }

    #[test]
    fn predetermined_balances_enforce_transfer_order() {
        let mut contract = new_contract();
        let criteria = ApprovalCriteria {
            max_num_transfers: Some(MaxNumTransfers {
                overall_max_num_transfers: 10,
                amount_tracker_id: "pd".to_string(),
                ..MaxNumTransfers::default()
            }),
            predetermined_balances: Some(PredeterminedBalances {
                initial_balances: vec![bal(1, range(1, 1))],
                increment_token_ids_by: 1,
                increment_ownership_times_by: 0,
                order_calculation_method: OrderCalculationMethod::UseOverallNumTransfers,
            }),
            ..ApprovalCriteria::default()
        };
        let collection_id = basic_collection_with(&mut contract, vec![gated_approval(criteria)]);

        set_caller(bob());
        contract
            .transfer_tokens(
                U64(collection_id),
                vec![simple_transfer(bob().as_str(), charlie(), vec![bal(1, range(1, 1))])],
            )
            .unwrap();
        contract
            .transfer_tokens(
                U64(collection_id),
                vec![simple_transfer(bob().as_str(), charlie(), vec![bal(1, range(2, 2))])],
            )
            .unwrap();

        // Use 2 must move token 3, nothing else.
        let err = contract
            .transfer_tokens(
                U64(collection_id),
                vec![simple_transfer(bob().as_str(), charlie(), vec![bal(1, range(2, 2))])],
            )
            .unwrap_err();
        assert!(err.to_string().contains("predetermined balances"), "{}", err);
    }

    #[test]
    fn unapproved_balances_report_the_uncovered_remainder() {
        let mut contract = new_contract();
        let mut limited = permissive_approval("limited");
        limited.token_ids = vec![range(1, 5)];
        let collection_id = basic_collection_with(&mut contract, vec![limited]);

        let transfer = simple_transfer(bob().as_str(), charlie(), vec![bal(5, range(1, 10))]);
        let unapproved = contract
            .get_unapproved_balances(
                U64(collection_id),
                transfer,
                charlie().to_string(),
                bob().to_string(),
            )
            .unwrap();
        assert!(crate::balances::balances_equal(&unapproved, &[bal(5, range(6, 10))]));

        // And the full transfer indeed fails outright.
        set_caller(bob());
        let err = contract
            .transfer_tokens(
                U64(collection_id),
                vec![simple_transfer(bob().as_str(), charlie(), vec![bal(5, range(1, 10))])],
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::InadequateApprovals(_)), "{}", err);
    }

    #[test]
    fn transfer_events_name_the_used_approvals() {
        let mut contract = new_contract();
        let collection_id = basic_collection(&mut contract);
        set_caller(bob());
        contract
            .transfer_tokens(
                U64(collection_id),
                vec![simple_transfer(bob().as_str(), charlie(), vec![bal(1, range(1, 1))])],
            )
            .unwrap();
        let logs = near_sdk::test_utils::get_logs();
        let transfer_log = logs
            .iter()
            .find(|l| l.contains("TRANSFER_UPDATE"))
            .expect("transfer event missing");
        assert!(transfer_log.starts_with("EVENT_JSON:"));
        assert!(transfer_log.contains("\"open\""));
        assert!(transfer_log.contains("self-initiated-outgoing"));
    }

    #[test]
    fn transfer_events_report_resulting_balances() {
        let mut contract = new_contract();
        let collection_id = basic_collection(&mut contract);
        set_caller(bob());
        contract
            .transfer_tokens(
                U64(collection_id),
                vec![simple_transfer(bob().as_str(), charlie(), vec![bal(5, range(1, 1))])],
            )
            .unwrap();
        let logs = near_sdk::test_utils::get_logs();
        let transfer_log = logs
            .iter()
            .find(|l| l.contains("TRANSFER_UPDATE"))
            .expect("transfer event missing");
        // Post-transfer stores: bob down to 95 of token 1, charlie up to 105.
        assert!(transfer_log.contains("\"from_balances\""), "{}", transfer_log);
        assert!(transfer_log.contains("\"to_balances\""), "{}", transfer_log);
        assert!(transfer_log.contains("\"95\""), "{}", transfer_log);
        assert!(transfer_log.contains("\"105\""), "{}", transfer_log);
    }

    #[test]
    fn mint_events_omit_the_sender_store() {
        let mut contract = new_contract();
        let collection_id = basic_collection(&mut contract);
        set_caller(bob());
        contract
            .transfer_tokens(
                U64(collection_id),
                vec![simple_transfer(MINT_ADDRESS, bob(), vec![bal(5, range(1, 1))])],
            )
            .unwrap();
        let logs = near_sdk::test_utils::get_logs();
        let transfer_log = logs
            .iter()
            .find(|l| l.contains("TRANSFER_UPDATE"))
            .expect("transfer event missing");
        assert!(!transfer_log.contains("\"from_balances\""), "{}", transfer_log);
        assert!(transfer_log.contains("\"to_balances\""), "{}", transfer_log);
    }

    #[test]
    fn mint_legs_never_consult_the_outgoing_layer() {
        let mut contract = new_contract();
        let collection_id = basic_collection(&mut contract);
        set_caller(bob());
        // Restricting the outgoing layer to an empty prioritized set would
        // refuse everything if that layer ran for the mint leg.
        let mut transfer = simple_transfer(MINT_ADDRESS, bob(), vec![bal(5, range(1, 1))]);
        transfer.only_check_prioritized_outgoing_approvals = true;
        contract
            .transfer_tokens(U64(collection_id), vec![transfer])
            .unwrap();
        assert_eq!(amount_at(&contract, collection_id, &bob(), 1), 105);
    }
}
