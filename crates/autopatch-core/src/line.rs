//! Line tokenization that keeps terminators for exact reconstruction

/// A single line of input text, including its `\n` terminator when present.
///
/// Equality is exact string equality over the whole line, terminator
/// included, so `"foo"` and `"foo\n"` are different lines. A trailing `\r`
/// is part of the line content; no normalization happens here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Line<'a> {
    text: &'a str,
}

impl<'a> Line<'a> {
    /// The full line, terminator included
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// The line without its `\n` terminator
    pub fn content(&self) -> &'a str {
        self.text.strip_suffix('\n').unwrap_or(self.text)
    }

    /// The terminator, if this line has one
    pub fn terminator(&self) -> Option<&'a str> {
        if self.is_terminated() {
            Some("\n")
        } else {
            None
        }
    }

    /// Whether the line ends in `\n`. Only the last line of a text can be unterminated.
    pub fn is_terminated(&self) -> bool {
        self.text.ends_with('\n')
    }
}

/// Iterate the lines of `text`.
///
/// Splits after every `\n`. A non-empty fragment after the last newline is
/// yielded as its own unterminated line; an empty text yields nothing.
pub fn lines(text: &str) -> impl Iterator<Item = Line<'_>> {
    text.split_inclusive('\n').map(|text| Line { text })
}

/// Collect the lines of `text`
pub fn split_lines(text: &str) -> Vec<Line<'_>> {
    lines(text).collect()
}

/// Count the lines of `text` the same way [`split_lines`] tokenizes it
pub fn count_lines(text: &str) -> usize {
    lines(text).count()
}
