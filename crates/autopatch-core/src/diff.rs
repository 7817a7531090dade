//! Diff computation engine

use crate::change::{ChangeKind, DiffRun};
use crate::line::{self, Line};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, debug_span, warn};

/// Default ceiling on the number of LCS table cells (about 100 MB of `u32`)
pub const DEFAULT_MAX_CELLS: usize = 25_000_000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiffError {
    #[error("Input too large to diff: {cells} table cells exceeds the limit of {limit}")]
    OversizedInput { cells: usize, limit: usize },
}

/// Result of a diff operation: an ordered sequence of runs
///
/// Removed and unchanged runs concatenate to the original text, added and
/// unchanged runs concatenate to the fixed text, and no two adjacent runs
/// share a kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiffResult {
    runs: Vec<DiffRun>,
}

impl DiffResult {
    /// All runs in order
    pub fn runs(&self) -> &[DiffRun] {
        &self.runs
    }

    pub fn into_runs(self) -> Vec<DiffRun> {
        self.runs
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DiffRun> {
        self.runs.iter()
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Check if any run is an actual change
    pub fn has_changes(&self) -> bool {
        self.runs.iter().any(DiffRun::is_change)
    }

    /// Total number of added lines
    pub fn insertions(&self) -> usize {
        self.count_lines(ChangeKind::Added)
    }

    /// Total number of removed lines
    pub fn deletions(&self) -> usize {
        self.count_lines(ChangeKind::Removed)
    }

    fn count_lines(&self, kind: ChangeKind) -> usize {
        self.runs
            .iter()
            .filter(|r| r.kind == kind)
            .map(|r| r.line_count)
            .sum()
    }

    /// Rebuild the original text from removed and unchanged runs
    pub fn original(&self) -> String {
        self.concat(ChangeKind::in_original)
    }

    /// Rebuild the fixed text from added and unchanged runs
    pub fn fixed(&self) -> String {
        self.concat(ChangeKind::in_fixed)
    }

    fn concat(&self, keep: impl Fn(ChangeKind) -> bool) -> String {
        self.runs
            .iter()
            .filter(|r| keep(r.kind))
            .map(|r| r.text.as_str())
            .collect()
    }

    /// Coarse view that replaces the whole original with the whole fixed text.
    ///
    /// Used when a line-level diff is refused for size. Empty sides are omitted.
    pub fn whole_file_replace(original: &str, fixed: &str) -> Self {
        let mut runs = Vec::with_capacity(2);
        if !original.is_empty() {
            runs.push(DiffRun::removed(original).with_lines(Some(1), None));
        }
        if !fixed.is_empty() {
            runs.push(DiffRun::added(fixed).with_lines(None, Some(1)));
        }
        Self { runs }
    }
}

impl<'a> IntoIterator for &'a DiffResult {
    type Item = &'a DiffRun;
    type IntoIter = std::slice::Iter<'a, DiffRun>;

    fn into_iter(self) -> Self::IntoIter {
        self.runs.iter()
    }
}

/// Compute the line diff between `original` and `fixed`.
///
/// Total and deterministic; equivalent to `DiffEngine::new().diff(..)`.
pub fn compute_diff(original: &str, fixed: &str) -> DiffResult {
    DiffEngine::new().diff(original, fixed)
}

/// The main diff engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffEngine {
    /// Maximum LCS table cells [`DiffEngine::try_diff`] will allocate
    max_cells: Option<usize>,
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self {
            max_cells: Some(DEFAULT_MAX_CELLS),
        }
    }
}

/// One step of the edit script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Equal,
    Delete,
    Insert,
}

impl DiffEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the table ceiling used by [`DiffEngine::try_diff`]; `None` disables it
    pub fn with_max_cells(mut self, max_cells: Option<usize>) -> Self {
        self.max_cells = max_cells;
        self
    }

    pub fn max_cells(&self) -> Option<usize> {
        self.max_cells
    }

    /// Compute diff between two strings, ignoring the size ceiling
    pub fn diff(&self, original: &str, fixed: &str) -> DiffResult {
        // Without a limit there is nothing to refuse
        self.compute(original, fixed, None)
            .unwrap_or_else(|_| DiffResult::whole_file_replace(original, fixed))
    }

    /// Compute diff between two strings, refusing inputs whose LCS table
    /// would exceed the configured ceiling
    pub fn try_diff(&self, original: &str, fixed: &str) -> Result<DiffResult, DiffError> {
        self.compute(original, fixed, self.max_cells)
    }

    fn compute(
        &self,
        original: &str,
        fixed: &str,
        limit: Option<usize>,
    ) -> Result<DiffResult, DiffError> {
        let old_lines = line::split_lines(original);
        let new_lines = line::split_lines(fixed);

        // Common prefix and suffix are always unchanged
        let prefix = old_lines
            .iter()
            .zip(&new_lines)
            .take_while(|(a, b)| a == b)
            .count();
        let suffix = old_lines[prefix..]
            .iter()
            .rev()
            .zip(new_lines[prefix..].iter().rev())
            .take_while(|(a, b)| a == b)
            .count();

        let old_mid = &old_lines[prefix..old_lines.len() - suffix];
        let new_mid = &new_lines[prefix..new_lines.len() - suffix];
        let cells = table_cells(old_mid.len(), new_mid.len());

        let span = debug_span!(
            "compute_diff",
            old_lines = old_lines.len(),
            new_lines = new_lines.len(),
            prefix,
            suffix,
            cells
        );
        let _guard = span.enter();

        if let Some(limit) = limit {
            if cells > limit {
                warn!(cells, limit, "Refusing to build LCS table");
                return Err(DiffError::OversizedInput { cells, limit });
            }
        }

        let mut ops = Vec::with_capacity(old_lines.len() + new_lines.len());
        ops.extend(std::iter::repeat(Op::Equal).take(prefix));
        ops.extend(align(old_mid, new_mid));
        ops.extend(std::iter::repeat(Op::Equal).take(suffix));

        let result = build_runs(&old_lines, &new_lines, &ops);
        debug!(runs = result.len(), "Diff computed");
        Ok(result)
    }
}

/// Cells an LCS table over `n` by `m` lines needs (zero when either side is empty)
fn table_cells(n: usize, m: usize) -> usize {
    if n == 0 || m == 0 {
        0
    } else {
        (n + 1).saturating_mul(m + 1)
    }
}

/// Map every distinct line to a small integer so the table compares ids, not strings
fn intern<'a>(old: &[Line<'a>], new: &[Line<'a>]) -> (Vec<u32>, Vec<u32>) {
    let mut ids: HashMap<&'a str, u32> = HashMap::new();
    let mut id_of = |line: &Line<'a>| {
        let next = ids.len() as u32;
        *ids.entry(line.text()).or_insert(next)
    };
    let old_ids: Vec<u32> = old.iter().map(&mut id_of).collect();
    let new_ids: Vec<u32> = new.iter().map(&mut id_of).collect();
    (old_ids, new_ids)
}

/// Suffix LCS lengths: `get(i, j)` is the LCS length of `old[i..]` and `new[j..]`
struct LcsTable {
    width: usize,
    cells: Vec<u32>,
}

impl LcsTable {
    fn build(old: &[u32], new: &[u32]) -> Self {
        let width = new.len() + 1;
        let mut cells = vec![0u32; (old.len() + 1) * width];
        for i in (0..old.len()).rev() {
            for j in (0..new.len()).rev() {
                cells[i * width + j] = if old[i] == new[j] {
                    cells[(i + 1) * width + j + 1] + 1
                } else {
                    cells[(i + 1) * width + j].max(cells[i * width + j + 1])
                };
            }
        }
        Self { width, cells }
    }

    fn get(&self, i: usize, j: usize) -> u32 {
        self.cells[i * self.width + j]
    }
}

/// Edit script for two line sequences.
///
/// Walks the LCS table forward. Equal lines under the cursor are matched;
/// otherwise the original line is consumed whenever that keeps the LCS length.
/// Between two matches every deletion is emitted before any insertion.
fn align(old: &[Line<'_>], new: &[Line<'_>]) -> Vec<Op> {
    let (n, m) = (old.len(), new.len());
    if n == 0 || m == 0 {
        let mut ops = vec![Op::Delete; n];
        ops.extend(std::iter::repeat(Op::Insert).take(m));
        return ops;
    }

    let (old_ids, new_ids) = intern(old, new);
    let table = LcsTable::build(&old_ids, &new_ids);

    let mut ops = Vec::with_capacity(n + m);
    let (mut deletes, mut inserts) = (0usize, 0usize);
    let flush = |ops: &mut Vec<Op>, deletes: &mut usize, inserts: &mut usize| {
        ops.extend(std::iter::repeat(Op::Delete).take(*deletes));
        ops.extend(std::iter::repeat(Op::Insert).take(*inserts));
        *deletes = 0;
        *inserts = 0;
    };

    let (mut i, mut j) = (0, 0);
    while i < n || j < m {
        if i < n && j < m && old_ids[i] == new_ids[j] {
            flush(&mut ops, &mut deletes, &mut inserts);
            ops.push(Op::Equal);
            i += 1;
            j += 1;
        } else if j == m || (i < n && table.get(i + 1, j) >= table.get(i, j + 1)) {
            deletes += 1;
            i += 1;
        } else {
            inserts += 1;
            j += 1;
        }
    }
    flush(&mut ops, &mut deletes, &mut inserts);

    ops
}

/// Classify lines by the edit script and merge consecutive lines of one kind
fn build_runs(old: &[Line<'_>], new: &[Line<'_>], ops: &[Op]) -> DiffResult {
    let mut runs: Vec<DiffRun> = Vec::new();
    let (mut i, mut j) = (0usize, 0usize);

    for op in ops {
        let (kind, line, old_no, new_no) = match op {
            Op::Equal => {
                let entry = (ChangeKind::Unchanged, old[i], Some(i + 1), Some(j + 1));
                i += 1;
                j += 1;
                entry
            }
            Op::Delete => {
                let entry = (ChangeKind::Removed, old[i], Some(i + 1), None);
                i += 1;
                entry
            }
            Op::Insert => {
                let entry = (ChangeKind::Added, new[j], None, Some(j + 1));
                j += 1;
                entry
            }
        };

        match runs.last_mut() {
            Some(run) if run.kind == kind => run.push_line(line),
            _ => runs.push(DiffRun::new(kind, line.text()).with_lines(old_no, new_no)),
        }
    }

    DiffResult { runs }
}
