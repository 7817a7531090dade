//! Run representation for diff output

use crate::line::{self, Line};
use serde::{Deserialize, Serialize};

/// The kind of change a run represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Lines present only in the fixed text
    Added,
    /// Lines present only in the original text
    Removed,
    /// Lines present in both texts (context)
    Unchanged,
}

impl ChangeKind {
    /// Check if this is an actual change (not just context)
    pub fn is_change(self) -> bool {
        self != ChangeKind::Unchanged
    }

    /// Whether runs of this kind belong to the original text
    pub fn in_original(self) -> bool {
        matches!(self, ChangeKind::Removed | ChangeKind::Unchanged)
    }

    /// Whether runs of this kind belong to the fixed text
    pub fn in_fixed(self) -> bool {
        matches!(self, ChangeKind::Added | ChangeKind::Unchanged)
    }

    /// Unified-diff sign for this kind
    pub fn sign(self) -> char {
        match self {
            ChangeKind::Added => '+',
            ChangeKind::Removed => '-',
            ChangeKind::Unchanged => ' ',
        }
    }
}

/// A maximal group of consecutive lines sharing one kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRun {
    /// The kind of change
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    /// The lines of the run, terminators included exactly as in the source
    #[serde(rename = "value")]
    pub text: String,
    /// Number of lines in `text`
    #[serde(rename = "count")]
    pub line_count: usize,
    /// 1-based line number of the first line in the original text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_start: Option<usize>,
    /// 1-based line number of the first line in the fixed text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_start: Option<usize>,
}

impl DiffRun {
    pub fn new(kind: ChangeKind, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            kind,
            line_count: line::count_lines(&text),
            text,
            old_start: None,
            new_start: None,
        }
    }

    pub fn added(text: impl Into<String>) -> Self {
        Self::new(ChangeKind::Added, text)
    }

    pub fn removed(text: impl Into<String>) -> Self {
        Self::new(ChangeKind::Removed, text)
    }

    pub fn unchanged(text: impl Into<String>) -> Self {
        Self::new(ChangeKind::Unchanged, text)
    }

    pub fn with_lines(mut self, old_start: Option<usize>, new_start: Option<usize>) -> Self {
        self.old_start = old_start;
        self.new_start = new_start;
        self
    }

    /// Append one line to the run
    pub(crate) fn push_line(&mut self, line: Line<'_>) {
        self.text.push_str(line.text());
        self.line_count += 1;
    }

    /// Iterate the run's lines, tokenized the same way the engine tokenized them
    pub fn lines(&self) -> impl Iterator<Item = Line<'_>> {
        line::lines(&self.text)
    }

    /// Check if this is an actual change (not just context)
    pub fn is_change(&self) -> bool {
        self.kind.is_change()
    }

    /// Line numbers `(old, new)` of the run's `offset`-th line
    pub fn line_numbers(&self, offset: usize) -> (Option<usize>, Option<usize>) {
        (
            self.old_start.map(|n| n + offset),
            self.new_start.map(|n| n + offset),
        )
    }
}
