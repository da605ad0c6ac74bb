#[cfg(test)]
mod tests {
    use crate::approvals::types::AllowedCombination;
    use crate::first_match::{self, MatchRecord};
    use crate::ranges::{cells_of, Cell};
    use crate::tests::test_utils::{full_range, permissive_approval, range};

    #[test]
    fn earliest_matcher_wins() {
        let mut narrow = permissive_approval("narrow");
        narrow.token_ids = vec![range(1, 5)];
        let mut wide = permissive_approval("wide");
        wide.token_ids = vec![range(1, 10)];

        let universe = vec![Cell::new(range(1, 10), full_range())];
        let records = first_match::first_match_records(&[narrow, wide], &universe);

        let narrow_cells: Vec<&MatchRecord> =
            records.iter().filter(|r| r.approval_index == 0).collect();
        let wide_cells: Vec<&MatchRecord> =
            records.iter().filter(|r| r.approval_index == 1).collect();
        assert_eq!(narrow_cells.len(), 1);
        assert_eq!(narrow_cells[0].cell.token_ids, range(1, 5));
        assert_eq!(wide_cells.len(), 1);
        assert_eq!(wide_cells[0].cell.token_ids, range(6, 10));
    }

    #[test]
    fn covered_cells_stay_bound_under_reordering() {
        let mut a = permissive_approval("a");
        a.token_ids = vec![range(1, 10)];
        let mut b = permissive_approval("b");
        b.token_ids = vec![range(20, 30)];

        let universe = vec![Cell::new(range(1, 30), full_range())];
        let forward = first_match::first_match_records(&[a.clone(), b.clone()], &universe);
        let backward = first_match::first_match_records(&[b, a], &universe);

        // Disjoint approvals claim the same cells regardless of order.
        let claimed = |records: &[MatchRecord]| -> Vec<Cell> {
            let mut cells: Vec<Cell> = records.iter().map(|r| r.cell).collect();
            cells.sort_by_key(|c| c.token_ids.start);
            cells
        };
        assert_eq!(claimed(&forward), claimed(&backward));
    }

    #[test]
    fn claimed_cells_are_disjoint() {
        let mut a = permissive_approval("a");
        a.token_ids = vec![range(1, 7)];
        let mut b = permissive_approval("b");
        b.token_ids = vec![range(5, 10)];

        let universe = vec![Cell::new(range(1, 10), full_range())];
        let records = first_match::first_match_records(&[a, b], &universe);
        for (i, left) in records.iter().enumerate() {
            for right in &records[i + 1..] {
                assert!(left.cell.overlap(&right.cell).is_none());
            }
        }
    }

    #[test]
    fn expand_rejects_disallowed_combination() {
        let mut approval = permissive_approval("closed");
        approval.allowed_combinations = vec![AllowedCombination {
            is_allowed: false,
            ..AllowedCombination::default()
        }];
        assert!(first_match::expand_approval(&approval).is_err());
    }

    #[test]
    fn expand_inverts_token_ids_over_universe() {
        let mut approval = permissive_approval("inverted");
        approval.token_ids = vec![range(1, 100)];
        approval.allowed_combinations = vec![AllowedCombination {
            is_allowed: true,
            invert_token_ids: true,
            ..AllowedCombination::default()
        }];
        let expanded = first_match::expand_approval(&approval).unwrap();
        assert_eq!(expanded.token_ids[0].start, 101);
        assert_eq!(expanded.token_ids[0].end, u64::MAX);
    }

    #[test]
    fn expand_inverts_list_ids_by_prefix() {
        let mut approval = permissive_approval("inverted");
        approval.from_list_id = "VipList".to_string();
        approval.allowed_combinations = vec![AllowedCombination {
            is_allowed: true,
            invert_from: true,
            ..AllowedCombination::default()
        }];
        let expanded = first_match::expand_approval(&approval).unwrap();
        assert_eq!(expanded.from_list_id, "!VipList");
    }

    #[test]
    fn claim_cells_partitions_unhandled() {
        let unhandled = cells_of(&[range(1, 10)], &[full_range()]);
        let boxes = cells_of(&[range(3, 20)], &[full_range()]);
        let (remaining, claimed) = first_match::claim_cells(&unhandled, &boxes);
        assert_eq!(claimed.len(), 1);
        assert_eq!(claimed[0].token_ids, range(3, 10));
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].token_ids, range(1, 2));
    }
}
