//! Side-by-side view - original on the left, fixed on the right

use super::{
    display_text, fit_width, format_line_number, gutter_style, kind_style, render_empty_state,
    RenderOptions,
};
use autopatch_core::{ChangeKind, DiffResult, DiffRun};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

const SEPARATOR: &str = " │ ";
const MIN_WIDTH: usize = 20;

/// One side of a row
struct Cell {
    number: Option<usize>,
    kind: ChangeKind,
    text: String,
}

fn cells(run: &DiffRun, opts: &RenderOptions, left: bool) -> Vec<Cell> {
    run.lines()
        .enumerate()
        .map(|(offset, line)| {
            let (old, new) = run.line_numbers(offset);
            Cell {
                number: if left { old } else { new },
                kind: run.kind,
                text: display_text(line.content(), opts.tab_width),
            }
        })
        .collect()
}

fn cell_spans(
    cell: Option<&Cell>,
    col_width: usize,
    opts: &RenderOptions,
) -> Vec<Span<'static>> {
    let Some(cell) = cell else {
        return vec![Span::raw(" ".repeat(col_width))];
    };

    let style = kind_style(cell.kind);
    let mut spans = Vec::with_capacity(3);
    let mut used = 0;
    if opts.line_numbers {
        let gutter = format!("{} ", format_line_number(cell.number));
        used += gutter.len();
        spans.push(Span::styled(gutter, gutter_style()));
    }
    let sign = format!("{} ", cell.kind.sign());
    used += sign.len();
    spans.push(Span::styled(sign, style));
    spans.push(Span::styled(
        fit_width(&cell.text, col_width.saturating_sub(used)),
        style,
    ));
    spans
}

/// Render the diff as two aligned columns.
///
/// A removed run directly followed by an added run is paired row by row;
/// unpaired lines leave the other column blank.
pub fn render_side_by_side(result: &DiffResult, opts: &RenderOptions) -> Vec<Line<'static>> {
    if result.is_empty() {
        return render_empty_state();
    }

    let width = opts.width.max(MIN_WIDTH);
    let col_width = (width - SEPARATOR.width()) / 2;

    let mut rows: Vec<(Option<Cell>, Option<Cell>)> = Vec::new();
    let runs = result.runs();
    let mut idx = 0;
    while idx < runs.len() {
        let run = &runs[idx];
        match run.kind {
            ChangeKind::Unchanged => {
                let left = cells(run, opts, true);
                let right = cells(run, opts, false);
                rows.extend(left.into_iter().zip(right).map(|(l, r)| (Some(l), Some(r))));
            }
            ChangeKind::Removed => {
                let mut left = cells(run, opts, true).into_iter();
                let mut right = match runs.get(idx + 1) {
                    Some(next) if next.kind == ChangeKind::Added => {
                        idx += 1;
                        cells(next, opts, false)
                    }
                    _ => Vec::new(),
                }
                .into_iter();
                loop {
                    match (left.next(), right.next()) {
                        (None, None) => break,
                        (l, r) => rows.push((l, r)),
                    }
                }
            }
            ChangeKind::Added => {
                rows.extend(cells(run, opts, false).into_iter().map(|r| (None, Some(r))));
            }
        }
        idx += 1;
    }

    rows.iter()
        .map(|(left, right)| {
            let mut spans = cell_spans(left.as_ref(), col_width, opts);
            spans.push(Span::styled(SEPARATOR, gutter_style()));
            spans.extend(cell_spans(right.as_ref(), col_width, opts));
            Line::from(spans)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::plain;
    use super::*;
    use autopatch_core::compute_diff;

    // 23 columns: two 10-column sides around the separator
    fn rows(original: &str, fixed: &str) -> Vec<String> {
        let opts = RenderOptions {
            line_numbers: false,
            tab_width: 4,
            width: 23,
        };
        render_side_by_side(&compute_diff(original, fixed), &opts)
            .iter()
            .map(plain)
            .collect()
    }

    fn row(left: &str, right: &str) -> String {
        format!("{:<10}{}{:<10}", left, SEPARATOR, right)
    }

    #[test]
    fn test_pairs_removed_with_added() {
        assert_eq!(
            rows("a\nb\nc\n", "a\nx\nc\n"),
            vec![
                row("  a", "  a"),
                row("- b", "+ x"),
                row("  c", "  c"),
            ]
        );
    }

    #[test]
    fn test_uneven_pairing_leaves_blanks() {
        assert_eq!(
            rows("a\nb\n", "x\ny\nz\n"),
            vec![
                row("- a", "+ x"),
                row("- b", "+ y"),
                row("", "+ z"),
            ]
        );
    }

    #[test]
    fn test_lone_added_run() {
        assert_eq!(
            rows("a\n", "a\nb\n"),
            vec![row("  a", "  a"), row("", "+ b")]
        );
    }

    #[test]
    fn test_long_lines_are_truncated() {
        let out = rows("short\n", "a much longer line\n");
        assert_eq!(out, vec![row("- short", "+ a much l")]);
    }

    #[test]
    fn test_line_numbers_per_side() {
        let opts = RenderOptions {
            line_numbers: true,
            tab_width: 4,
            width: 43,
        };
        let lines = render_side_by_side(&compute_diff("a\nb\n", "b\n"), &opts);
        let text: Vec<String> = lines.iter().map(plain).collect();
        assert_eq!(
            text,
            vec![
                format!("{:<20}{}{:<20}", "   1 - a", SEPARATOR, ""),
                format!("{:<20}{}{:<20}", "   2   b", SEPARATOR, "   1   b"),
            ]
        );
    }
}
