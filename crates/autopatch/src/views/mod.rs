//! View rendering modules

mod side_by_side;
mod unified;

pub use side_by_side::render_side_by_side;
pub use unified::render_unified;

use autopatch_core::ChangeKind;
use crossterm::queue;
use crossterm::style::{
    Attribute, Color as TermColor, Print, ResetColor, SetAttribute, SetForegroundColor,
};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use std::io::{self, Write};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Marker row shown after a line that has no terminator
pub const NO_NEWLINE_MARKER: &str = "\\ No newline at end of file";

/// Layout settings shared by the views
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub line_numbers: bool,
    pub tab_width: usize,
    /// Total width available, used by the split view
    pub width: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            line_numbers: true,
            tab_width: 4,
            width: 120,
        }
    }
}

fn kind_style(kind: ChangeKind) -> Style {
    match kind {
        ChangeKind::Added => Style::default().fg(Color::Green),
        ChangeKind::Removed => Style::default().fg(Color::Red),
        ChangeKind::Unchanged => Style::default().fg(Color::Gray),
    }
}

fn gutter_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

fn marker_style() -> Style {
    Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::ITALIC)
}

fn format_line_number(number: Option<usize>) -> String {
    match number {
        Some(n) => format!("{:>4}", n),
        None => "    ".to_string(),
    }
}

/// Prepare line content for display: drop a trailing `\r` and expand tabs
fn display_text(content: &str, tab_width: usize) -> String {
    let content = content.strip_suffix('\r').unwrap_or(content);
    if !content.contains('\t') {
        return content.to_string();
    }

    let tab_width = tab_width.max(1);
    let mut out = String::with_capacity(content.len());
    let mut col = 0;
    for g in content.graphemes(true) {
        if g == "\t" {
            let spaces = tab_width - col % tab_width;
            out.extend(std::iter::repeat(' ').take(spaces));
            col += spaces;
        } else {
            out.push_str(g);
            col += g.width();
        }
    }
    out
}

/// Truncate or pad `text` to exactly `width` display columns
fn fit_width(text: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for g in text.graphemes(true) {
        let w = g.width();
        if used + w > width {
            break;
        }
        out.push_str(g);
        used += w;
    }
    out.extend(std::iter::repeat(' ').take(width - used));
    out
}

fn term_color(color: Color) -> TermColor {
    match color {
        Color::Red => TermColor::DarkRed,
        Color::Green => TermColor::DarkGreen,
        Color::Gray => TermColor::Grey,
        Color::DarkGray => TermColor::DarkGrey,
        Color::Yellow => TermColor::DarkYellow,
        Color::Cyan => TermColor::DarkCyan,
        Color::White => TermColor::White,
        Color::Rgb(r, g, b) => TermColor::Rgb { r, g, b },
        Color::Indexed(i) => TermColor::AnsiValue(i),
        _ => TermColor::Reset,
    }
}

/// Placeholder shown when both texts are empty
fn render_empty_state() -> Vec<Line<'static>> {
    vec![Line::styled("(both files are empty)", marker_style())]
}

/// Write rendered lines to a terminal stream, with or without color
pub fn print_lines(out: &mut impl Write, lines: &[Line<'_>], color: bool) -> io::Result<()> {
    for line in lines {
        for span in &line.spans {
            if !color {
                queue!(out, Print(&span.content))?;
                continue;
            }
            if let Some(fg) = span.style.fg {
                queue!(out, SetForegroundColor(term_color(fg)))?;
            }
            if span.style.add_modifier.contains(Modifier::BOLD) {
                queue!(out, SetAttribute(Attribute::Bold))?;
            }
            if span.style.add_modifier.contains(Modifier::ITALIC) {
                queue!(out, SetAttribute(Attribute::Italic))?;
            }
            queue!(out, Print(&span.content), SetAttribute(Attribute::Reset), ResetColor)?;
        }
        queue!(out, Print("\n"))?;
    }
    out.flush()
}

/// Plain text of a rendered line (for tests and non-terminal output)
#[cfg(test)]
fn plain(line: &Line<'_>) -> String {
    line.spans.iter().map(|s| s.content.as_ref()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::text::Span;

    #[test]
    fn test_display_text_expands_tabs() {
        assert_eq!(display_text("\tx", 4), "    x");
        assert_eq!(display_text("ab\tc", 4), "ab  c");
        assert_eq!(display_text("line\r", 4), "line");
    }

    #[test]
    fn test_fit_width_pads_and_truncates() {
        assert_eq!(fit_width("abc", 5), "abc  ");
        assert_eq!(fit_width("abcdef", 4), "abcd");
        // Wide characters never get split
        assert_eq!(fit_width("日本語", 5), "日本 ");
    }

    #[test]
    fn test_format_line_number() {
        assert_eq!(format_line_number(Some(7)), "   7");
        assert_eq!(format_line_number(None), "    ");
    }

    #[test]
    fn test_print_without_color() {
        let lines = vec![Line::from(vec![
            Span::styled("-", kind_style(ChangeKind::Removed)),
            Span::raw("x"),
        ])];
        let mut out = Vec::new();
        print_lines(&mut out, &lines, false).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "-x\n");
    }

    #[test]
    fn test_print_with_color_emits_escapes() {
        let lines = vec![Line::from(Span::styled("+y", kind_style(ChangeKind::Added)))];
        let mut out = Vec::new();
        print_lines(&mut out, &lines, true).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\u{1b}["));
        assert!(text.contains("+y"));
    }
}
