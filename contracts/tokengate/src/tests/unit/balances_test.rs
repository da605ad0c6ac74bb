#[cfg(test)]
mod tests {
    use crate::balances::{self, Balance};
    use crate::ranges::Cell;
    use crate::tests::test_utils::{bal, full_range, range};

    #[test]
    fn add_then_subtract_round_trips() {
        let start = vec![bal(10, range(1, 10))];
        let delta = vec![bal(3, range(4, 6))];
        let added = balances::add_balances(&start, &delta).unwrap();
        let back = balances::subtract_balances(&added, &delta).unwrap();
        assert!(balances::balances_equal(&back, &start));
    }

    #[test]
    fn add_splits_into_disjoint_cells() {
        let start = vec![bal(10, range(1, 10))];
        let delta = vec![bal(5, range(5, 15))];
        let result = balances::add_balances(&start, &delta).unwrap();
        // 1..4 stays at 10, 5..10 becomes 15, 11..15 appears at 5.
        let pieces = balances::amounts_for_cell(
            Cell::new(range(1, 15), full_range()),
            &result,
        );
        for (cell, amount) in pieces {
            let expected = match cell.token_ids.start {
                1..=4 => 10,
                5..=10 => 15,
                _ => 5,
            };
            assert_eq!(amount, expected, "cell {:?}", cell.token_ids);
        }
    }

    #[test]
    fn subtract_underflow_names_cell() {
        let start = vec![bal(2, range(1, 10))];
        let err = balances::subtract_balances(&start, &[bal(3, range(5, 5))]).unwrap_err();
        assert!(err.to_string().contains("5"), "{}", err);
    }

    #[test]
    fn subtract_from_uncovered_cell_fails() {
        let start = vec![bal(2, range(1, 10))];
        let err = balances::subtract_balances(&start, &[bal(1, range(20, 20))]).unwrap_err();
        assert!(err.to_string().to_lowercase().contains("insufficient"), "{}", err);
    }

    #[test]
    fn zero_amounts_are_dropped() {
        let start = vec![bal(2, range(1, 10))];
        let result = balances::subtract_balances(&start, &[bal(2, range(1, 10))]).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn get_balances_for_ids_restricts() {
        let set = vec![bal(7, range(1, 10))];
        let restricted = balances::get_balances_for_ids(&[range(8, 20)], &[full_range()], &set);
        assert_eq!(restricted.len(), 1);
        assert_eq!(restricted[0].amount.0, 7);
        assert_eq!(restricted[0].token_ids, vec![range(8, 10)]);
    }

    #[test]
    fn threshold_check_rejects_excess() {
        let candidate = vec![bal(5, range(1, 5))];
        let threshold = vec![bal(4, range(1, 10))];
        let err =
            balances::assert_balances_do_not_exceed(&candidate, &threshold).unwrap_err();
        assert!(err.to_string().contains("exceeds approved amount 4"), "{}", err);
        assert!(balances::assert_balances_do_not_exceed(&candidate, &[bal(5, range(1, 10))]).is_ok());
    }

    #[test]
    fn threshold_uncovered_cells_allow_nothing() {
        let candidate = vec![bal(1, range(50, 50))];
        let threshold = vec![bal(100, range(1, 10))];
        assert!(balances::assert_balances_do_not_exceed(&candidate, &threshold).is_err());
    }

    #[test]
    fn clamp_reduces_to_admitted() {
        let candidate = vec![bal(10, range(1, 10))];
        let threshold = vec![bal(4, range(1, 5))];
        let clamped = balances::clamp_balances_to_threshold(&candidate, &threshold);
        // 1..5 clamps to 4; 6..10 has no threshold coverage and clamps to 0.
        assert!(balances::balances_equal(&clamped, &[bal(4, range(1, 5))]));
    }

    #[test]
    fn increment_balances_shifts_ranges() {
        let template = vec![Balance::new(1, vec![range(1, 1)], vec![range(100, 200)])];
        let third = balances::increment_balances(&template, 1, 50, 2).unwrap();
        assert_eq!(third[0].token_ids, vec![range(3, 3)]);
        assert_eq!(third[0].ownership_times, vec![range(200, 300)]);
    }

    #[test]
    fn balances_equal_ignores_fragmentation() {
        let whole = vec![bal(5, range(1, 10))];
        let split = vec![bal(5, range(1, 4)), bal(5, range(5, 10))];
        assert!(balances::balances_equal(&whole, &split));
        assert!(!balances::balances_equal(&whole, &[bal(5, range(1, 9))]));
    }
}
