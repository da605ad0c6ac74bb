#[cfg(test)]
mod tests {
    use near_sdk::json_types::U128;
    use near_sdk::testing_env;

    use crate::approvals::types::CoinTransfer;
    use crate::coins::ScheduledCoinTransfers;
    use crate::tests::test_utils::*;
    use crate::EngineError;

    fn batch(approver: &str, transfers: Vec<CoinTransfer>) -> ScheduledCoinTransfers {
        ScheduledCoinTransfers {
            approver_address: approver.to_string(),
            transfers,
            royalties: None,
        }
    }

    fn plain_transfer(to: &str, amount: u128, denom: &str) -> CoinTransfer {
        CoinTransfer {
            to: to.to_string(),
            coins: vec![coin(amount, denom)],
            override_from_with_approver_address: false,
            override_to_with_initiator: false,
        }
    }

    #[test]
    fn deposits_accumulate() {
        let mut contract = new_contract();
        fund_ledger(&mut contract, bob(), 1_000);
        fund_ledger(&mut contract, bob(), 500);
        assert_eq!(contract.get_coin_balance(bob().to_string(), "unear".into()).0, 1_500);
    }

    #[test]
    fn deposit_requires_attached_amount() {
        let mut contract = new_contract();
        testing_env!(context(bob()).build());
        let err = contract.deposit().unwrap_err();
        assert!(matches!(err, EngineError::InsufficientDeposit(_)), "{}", err);
    }

    #[test]
    fn withdraw_debits_the_ledger() {
        let mut contract = new_contract();
        fund_ledger(&mut contract, bob(), 1_000);
        set_caller(bob());
        contract.withdraw(U128(400)).unwrap();
        assert_eq!(contract.get_coin_balance(bob().to_string(), "unear".into()).0, 600);

        // Promise carries no Debug impl; take the error side directly.
        let err = contract.withdraw(U128(1_000)).err().unwrap();
        assert!(err.to_string().contains("holds 600"), "{}", err);
    }

    #[test]
    fn allowed_denoms_filter_coin_transfers() {
        let mut contract = new_contract();
        set_caller(alice());
        contract
            .update_params(Some(vec!["unear".to_string()]), None, None)
            .unwrap();
        fund_ledger(&mut contract, bob(), 10_000);

        let batches = vec![batch("", vec![plain_transfer(alice().as_str(), 100, "uusdc")])];
        let err = contract
            .simulate_coin_transfers(&batches, bob().as_str(), "escrow.near")
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidDenom(_)), "{}", err);

        let batches = vec![batch("", vec![plain_transfer(alice().as_str(), 100, "unear")])];
        assert!(contract
            .simulate_coin_transfers(&batches, bob().as_str(), "escrow.near")
            .is_ok());
    }

    #[test]
    fn simulation_checks_the_fee_inclusive_total() {
        let mut contract = new_contract();
        // Exactly the face amount, but not the 0.5% fee on top.
        fund_ledger(&mut contract, bob(), 1_000);
        let batches = vec![batch("", vec![plain_transfer(alice().as_str(), 1_000, "unear")])];
        let err = contract
            .simulate_coin_transfers(&batches, bob().as_str(), "escrow.near")
            .unwrap_err();
        assert!(err.to_string().contains("cannot cover 1005"), "{}", err);
    }

    #[test]
    fn protocol_fee_applies_to_the_denom_total() {
        let mut contract = new_contract();
        contract.ledger_credit(bob().as_str(), "unear", 1_000).unwrap();

        // Three 150-unit coins: each rounds to a zero fee on its own, but
        // 0.5% of the 450 total is 2.
        let batches = vec![batch(
            "",
            vec![
                plain_transfer(alice().as_str(), 150, "unear"),
                plain_transfer(alice().as_str(), 150, "unear"),
                plain_transfer(alice().as_str(), 150, "unear"),
            ],
        )];
        contract
            .execute_coin_transfers(&batches, bob().as_str(), "escrow.near", None)
            .unwrap();

        assert_eq!(contract.get_coin_balance(bob().to_string(), "unear".into()).0, 548);
        assert_eq!(contract.get_coin_balance(alice().to_string(), "unear".into()).0, 450);
        assert_eq!(contract.get_coin_balance("community-pool".into(), "unear".into()).0, 2);
    }

    #[test]
    fn override_flags_reroute_the_parties() {
        let mut contract = new_contract();
        contract.ledger_credit("escrow.near", "unear", 2_000).unwrap();

        // Collection-level batch with an empty approver: the mint escrow
        // substitutes as payer, and the payout loops back to the initiator.
        let batches = vec![batch(
            "",
            vec![CoinTransfer {
                to: alice().to_string(),
                coins: vec![coin(1_000, "unear")],
                override_from_with_approver_address: true,
                override_to_with_initiator: true,
            }],
        )];
        let executed = contract
            .execute_coin_transfers(&batches, bob().as_str(), "escrow.near", None)
            .unwrap();

        assert_eq!(executed.len(), 1);
        assert_eq!(executed[0].from, "escrow.near");
        assert_eq!(executed[0].to, bob().to_string());
        assert_eq!(contract.get_coin_balance("escrow.near".into(), "unear".into()).0, 995);
        assert_eq!(contract.get_coin_balance(bob().to_string(), "unear".into()).0, 1_000);
        assert_eq!(contract.get_coin_balance("community-pool".into(), "unear".into()).0, 5);
        assert_eq!(contract.get_coin_balance(alice().to_string(), "unear".into()).0, 0);
    }

    #[test]
    fn user_level_approver_pays_under_override() {
        let mut contract = new_contract();
        contract.ledger_credit("seller.near", "unear", 2_000).unwrap();

        let batches = vec![batch(
            "seller.near",
            vec![CoinTransfer {
                to: charlie().to_string(),
                coins: vec![coin(200, "unear")],
                override_from_with_approver_address: true,
                override_to_with_initiator: false,
            }],
        )];
        contract
            .execute_coin_transfers(&batches, bob().as_str(), "escrow.near", None)
            .unwrap();
        assert_eq!(contract.get_coin_balance("seller.near".into(), "unear".into()).0, 1_799);
        assert_eq!(contract.get_coin_balance(charlie().to_string(), "unear".into()).0, 200);
    }
}
