use std::collections::BTreeMap;

use crate::coverage::model::CoverageResult;

fn result(hits: &[(u32, u64)], branches: &[(u32, u32, u32)]) -> CoverageResult {
    CoverageResult {
        line_hits: hits.iter().copied().collect::<BTreeMap<_, _>>(),
        branch_totals: branches.iter().map(|(l, t, _)| (*l, *t)).collect(),
        branch_covered: branches.iter().map(|(l, _, c)| (*l, *c)).collect(),
    }
}

#[test]
fn merge_adds_hits_for_lines_reported_by_several_classes() {
    let mut merged = result(&[(3, 1), (4, 0)], &[]);
    merged.merge(result(&[(3, 2), (9, 1)], &[]));
    assert_eq!(merged.line_hits.get(&3).copied(), Some(3));
    assert_eq!(merged.line_hits.get(&4).copied(), Some(0));
    assert_eq!(merged.line_hits.get(&9).copied(), Some(1));
}

#[test]
fn merge_overwrites_branch_data() {
    let mut merged = result(&[(5, 1)], &[(5, 2, 1)]);
    merged.merge(result(&[], &[(5, 4, 4)]));
    assert_eq!(merged.conditions(5), Some((4, 4)));
}

#[test]
fn empty_result_reports_empty_and_counts_nothing() {
    let empty = CoverageResult::default();
    assert!(empty.is_empty());
    assert_eq!(empty.lines_covered(), 0);
    assert!(!result(&[(1, 0)], &[]).is_empty());
    assert_eq!(result(&[(1, 0), (2, 5)], &[]).lines_covered(), 1);
}
