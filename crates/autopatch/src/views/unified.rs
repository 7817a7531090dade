//! Unified view - one row per line, removed before added

use super::{
    display_text, format_line_number, gutter_style, kind_style, marker_style,
    render_empty_state, RenderOptions, NO_NEWLINE_MARKER,
};
use autopatch_core::DiffResult;
use ratatui::text::{Line, Span};

/// Render the whole diff as a unified listing.
///
/// Gutter is `old new sign`; a marker row follows any line without a terminator.
pub fn render_unified(result: &DiffResult, opts: &RenderOptions) -> Vec<Line<'static>> {
    if result.is_empty() {
        return render_empty_state();
    }

    let mut lines = Vec::new();
    for run in result {
        let style = kind_style(run.kind);
        for (offset, line) in run.lines().enumerate() {
            let mut spans = Vec::with_capacity(3);
            if opts.line_numbers {
                let (old, new) = run.line_numbers(offset);
                spans.push(Span::styled(
                    format!("{} {} ", format_line_number(old), format_line_number(new)),
                    gutter_style(),
                ));
            }
            spans.push(Span::styled(format!("{} ", run.kind.sign()), style));
            spans.push(Span::styled(
                display_text(line.content(), opts.tab_width),
                style,
            ));
            lines.push(Line::from(spans));

            if !line.is_terminated() {
                lines.push(Line::styled(NO_NEWLINE_MARKER, marker_style()));
            }
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::super::plain;
    use super::*;
    use autopatch_core::compute_diff;

    fn rows(original: &str, fixed: &str, line_numbers: bool) -> Vec<String> {
        let opts = RenderOptions {
            line_numbers,
            ..RenderOptions::default()
        };
        render_unified(&compute_diff(original, fixed), &opts)
            .iter()
            .map(plain)
            .collect()
    }

    #[test]
    fn test_signs_and_order() {
        assert_eq!(
            rows("a\nb\nc\n", "a\nx\nc\n", false),
            vec!["  a", "- b", "+ x", "  c"]
        );
    }

    #[test]
    fn test_gutter_numbers() {
        assert_eq!(
            rows("a\nb\n", "a\nc\nd\n", true),
            vec![
                "   1    1   a",
                "   2      - b",
                "        2 + c",
                "        3 + d",
            ]
        );
    }

    #[test]
    fn test_no_newline_marker() {
        assert_eq!(
            rows("line1", "line1\nline2", false),
            vec![
                "- line1",
                NO_NEWLINE_MARKER,
                "+ line1",
                "+ line2",
                NO_NEWLINE_MARKER,
            ]
        );
    }

    #[test]
    fn test_blank_lines_keep_a_row() {
        assert_eq!(rows("a\n\nb\n", "a\n\nb\n", false), vec!["  a", "  ", "  b"]);
    }

    #[test]
    fn test_empty_inputs() {
        let lines = render_unified(&compute_diff("", ""), &RenderOptions::default());
        assert_eq!(lines.len(), 1);
    }
}
