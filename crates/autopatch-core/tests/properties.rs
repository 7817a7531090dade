use autopatch_core::{compute_diff, ChangeKind, DiffEngine, DiffResult};
use proptest::prelude::*;
use similar::{Algorithm, ChangeTag, TextDiff};

/// Texts built from a small line vocabulary so inputs share lines often
fn source_text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec![
            "a\n", "b\n", "c\n", "}\n", "\n", "    x();\n", "a", "b",
        ]),
        0..24,
    )
    .prop_map(|parts| parts.concat())
}

fn unchanged_lines(result: &DiffResult) -> usize {
    result
        .iter()
        .filter(|r| r.kind == ChangeKind::Unchanged)
        .map(|r| r.line_count)
        .sum()
}

proptest! {
    #[test]
    fn test_round_trip_original(original in source_text(), fixed in source_text()) {
        let result = compute_diff(&original, &fixed);
        prop_assert_eq!(result.original(), original);
    }

    #[test]
    fn test_round_trip_fixed(original in source_text(), fixed in source_text()) {
        let result = compute_diff(&original, &fixed);
        prop_assert_eq!(result.fixed(), fixed);
    }

    #[test]
    fn test_adjacent_runs_differ(original in source_text(), fixed in source_text()) {
        let result = compute_diff(&original, &fixed);
        for pair in result.runs().windows(2) {
            prop_assert_ne!(pair[0].kind, pair[1].kind);
        }
        for run in result.iter() {
            prop_assert!(!run.text.is_empty());
            prop_assert_eq!(run.lines().count(), run.line_count);
        }
    }

    #[test]
    fn test_identity(text in source_text()) {
        let result = compute_diff(&text, &text);
        if text.is_empty() {
            prop_assert!(result.is_empty());
        } else {
            prop_assert_eq!(result.len(), 1);
            prop_assert_eq!(result.runs()[0].kind, ChangeKind::Unchanged);
            prop_assert_eq!(&result.runs()[0].text, &text);
        }
    }

    #[test]
    fn test_deterministic(original in source_text(), fixed in source_text()) {
        prop_assert_eq!(compute_diff(&original, &fixed), compute_diff(&original, &fixed));
    }

    #[test]
    fn test_minimal_against_myers(original in source_text(), fixed in source_text()) {
        let result = compute_diff(&original, &fixed);
        let oracle = TextDiff::configure()
            .algorithm(Algorithm::Myers)
            .diff_lines(&original, &fixed);
        let common = oracle
            .iter_all_changes()
            .filter(|c| c.tag() == ChangeTag::Equal)
            .count();
        prop_assert_eq!(unchanged_lines(&result), common);
    }

    #[test]
    fn test_removed_precedes_added(original in source_text(), fixed in source_text()) {
        let result = compute_diff(&original, &fixed);
        // Between unchanged runs: at most one removed run, then at most one added run
        for gap in result.runs().split(|r| r.kind == ChangeKind::Unchanged) {
            let kinds: Vec<_> = gap.iter().map(|r| r.kind).collect();
            prop_assert!(
                kinds.is_empty()
                    || kinds == [ChangeKind::Removed]
                    || kinds == [ChangeKind::Added]
                    || kinds == [ChangeKind::Removed, ChangeKind::Added],
                "unexpected gap {:?}",
                kinds
            );
        }
    }

    #[test]
    fn test_line_numbers_track_both_sides(original in source_text(), fixed in source_text()) {
        let result = compute_diff(&original, &fixed);
        let (mut old_next, mut new_next) = (1usize, 1usize);
        for run in result.iter() {
            if run.kind.in_original() {
                prop_assert_eq!(run.old_start, Some(old_next));
                old_next += run.line_count;
            } else {
                prop_assert_eq!(run.old_start, None);
            }
            if run.kind.in_fixed() {
                prop_assert_eq!(run.new_start, Some(new_next));
                new_next += run.line_count;
            } else {
                prop_assert_eq!(run.new_start, None);
            }
        }
    }

    #[test]
    fn test_ceiling_only_refuses(original in source_text(), fixed in source_text()) {
        let engine = DiffEngine::new().with_max_cells(Some(64));
        if let Ok(result) = engine.try_diff(&original, &fixed) {
            prop_assert_eq!(result, compute_diff(&original, &fixed));
        }
    }
}
