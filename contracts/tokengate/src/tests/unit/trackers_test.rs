#[cfg(test)]
mod tests {
    use crate::approvals::types::ResetTimeIntervals;
    use crate::tests::test_utils::*;
    use crate::trackers::TrackerContext;
    use crate::TRACKER_OVERALL;

    const NOW: u64 = 1_700_000_000_000;

    fn ctx(version: u64, now: u64) -> TrackerContext<'static> {
        TrackerContext {
            collection_id: 1,
            approver_address: "",
            approval_level: "collection",
            approval_id: "open",
            approval_version: version,
            now,
        }
    }

    #[test]
    fn count_threshold_enforced() {
        let mut contract = new_contract();
        let context = ctx(0, NOW);
        let first = contract
            .increment_and_assert(&context, "t", TRACKER_OVERALL, "", None, 1, &[bal(1, range(1, 1))], None, false)
            .unwrap();
        assert_eq!(first.update.tracker.num_transfers, 1);
        contract.persist_tracker_updates(&context, vec![first.update]);

        let err = contract
            .increment_and_assert(&context, "t", TRACKER_OVERALL, "", None, 1, &[bal(1, range(1, 1))], None, false)
            .unwrap_err();
        assert!(err.to_string().ends_with("exceeded max num transfers - 1"), "{}", err);
    }

    #[test]
    fn amount_threshold_accumulates_across_uses() {
        let mut contract = new_contract();
        let context = ctx(0, NOW);
        let threshold = vec![bal(5, range(1, 10))];

        let first = contract
            .increment_and_assert(&context, "t", TRACKER_OVERALL, "", Some(&threshold), 0, &[bal(3, range(1, 10))], None, false)
            .unwrap();
        contract.persist_tracker_updates(&context, vec![first.update]);

        // 3 consumed, 2 left: another 3 must fail, 2 must pass.
        assert!(contract
            .increment_and_assert(&context, "t", TRACKER_OVERALL, "", Some(&threshold), 0, &[bal(3, range(1, 10))], None, false)
            .is_err());
        assert!(contract
            .increment_and_assert(&context, "t", TRACKER_OVERALL, "", Some(&threshold), 0, &[bal(2, range(1, 10))], None, false)
            .is_ok());
    }

    #[test]
    fn partial_mode_clamps_to_capacity() {
        let mut contract = new_contract();
        let context = ctx(0, NOW);
        let threshold = vec![bal(5, range(1, 10))];
        let first = contract
            .increment_and_assert(&context, "t", TRACKER_OVERALL, "", Some(&threshold), 0, &[bal(4, range(1, 10))], None, false)
            .unwrap();
        contract.persist_tracker_updates(&context, vec![first.update]);

        let clamped = contract
            .increment_and_assert(&context, "t", TRACKER_OVERALL, "", Some(&threshold), 0, &[bal(4, range(1, 10))], None, true)
            .unwrap();
        assert!(crate::balances::balances_equal(&clamped.admitted, &[bal(1, range(1, 10))]));
    }

    #[test]
    fn version_bump_logically_resets() {
        let mut contract = new_contract();
        let v0 = ctx(0, NOW);
        let used = contract
            .increment_and_assert(&v0, "t", TRACKER_OVERALL, "", None, 1, &[bal(1, range(1, 1))], None, false)
            .unwrap();
        contract.persist_tracker_updates(&v0, vec![used.update]);
        assert!(contract
            .increment_and_assert(&v0, "t", TRACKER_OVERALL, "", None, 1, &[bal(1, range(1, 1))], None, false)
            .is_err());

        // Same key under a newer approval version starts from zero.
        let v1 = ctx(1, NOW);
        let fresh = contract
            .increment_and_assert(&v1, "t", TRACKER_OVERALL, "", None, 1, &[bal(1, range(1, 1))], None, false)
            .unwrap();
        assert_eq!(fresh.update.tracker.num_transfers, 1);
    }

    #[test]
    fn interval_boundary_resets_once() {
        let mut contract = new_contract();
        let policy = ResetTimeIntervals {
            start_time: NOW,
            interval_length: 1_000,
        };
        let context = ctx(0, NOW);
        let used = contract
            .increment_and_assert(&context, "t", TRACKER_OVERALL, "", None, 1, &[bal(1, range(1, 1))], Some(&policy), false)
            .unwrap();
        contract.persist_tracker_updates(&context, vec![used.update]);

        // Still inside the window: threshold binds.
        let same_window = ctx(0, NOW + 999);
        assert!(contract
            .increment_and_assert(&same_window, "t", TRACKER_OVERALL, "", None, 1, &[bal(1, range(1, 1))], Some(&policy), false)
            .is_err());

        // Several intervals later: a single reset clears the count.
        let later = ctx(0, NOW + 5_500);
        let fresh = contract
            .increment_and_assert(&later, "t", TRACKER_OVERALL, "", None, 1, &[bal(1, range(1, 1))], Some(&policy), false)
            .unwrap();
        assert_eq!(fresh.update.tracker.num_transfers, 1);
    }

    #[test]
    fn future_start_time_defers_resets() {
        let mut contract = new_contract();
        let policy = ResetTimeIntervals {
            start_time: NOW + 100_000,
            interval_length: 1_000,
        };
        let context = ctx(0, NOW);
        let used = contract
            .increment_and_assert(&context, "t", TRACKER_OVERALL, "", None, 1, &[bal(1, range(1, 1))], Some(&policy), false)
            .unwrap();
        contract.persist_tracker_updates(&context, vec![used.update]);

        // Usage predating the start time never resets before it arrives.
        let before_start = ctx(0, NOW + 99_999);
        assert!(contract
            .increment_and_assert(&before_start, "t", TRACKER_OVERALL, "", None, 1, &[bal(1, range(1, 1))], Some(&policy), false)
            .is_err());

        let after_start = ctx(0, NOW + 100_001);
        assert!(contract
            .increment_and_assert(&after_start, "t", TRACKER_OVERALL, "", None, 1, &[bal(1, range(1, 1))], Some(&policy), false)
            .is_ok());
    }

    #[test]
    fn num_transfers_view_respects_resets() {
        let mut contract = new_contract();
        let context = ctx(0, NOW);
        let used = contract
            .increment_and_assert(&context, "t", TRACKER_OVERALL, "", None, 0, &[bal(1, range(1, 1))], None, false)
            .unwrap();
        contract.persist_tracker_updates(&context, vec![used.update]);
        assert_eq!(contract.tracker_num_transfers(&context, "t", TRACKER_OVERALL, "", None), 1);

        let newer = ctx(3, NOW);
        assert_eq!(contract.tracker_num_transfers(&newer, "t", TRACKER_OVERALL, "", None), 0);
    }
}
