//! Line-level diff computation and rendering.
//!
//! Lines are aligned with the Myers algorithm from `similar`. Each aligned
//! row carries the expected line, the actual line and a delta marker; the
//! rows are then laid out as a three-column table by [`DiffTable`].

use serde::{Deserialize, Serialize};
use similar::{capture_diff_slices, Algorithm, DiffTag};

use replaykit_core::{DiffSettings, DiffStyle};

use crate::table::DiffTable;

/// Describes how one aligned row differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Delta {
    /// Line present and identical on both sides
    Same,
    /// Line only in the expected value
    Removed,
    /// Line only in the actual value
    Added,
    /// Line present on both sides with different content
    Changed,
}

impl Delta {
    /// Marker printed in the delta column.
    pub fn marker(&self) -> &'static str {
        match self {
            Delta::Same => "",
            Delta::Removed => "-",
            Delta::Added => "+",
            Delta::Changed => "<>",
        }
    }
}

/// One aligned row of a line diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRow {
    /// Expected line (absent for added lines)
    pub want: Option<String>,
    /// How the row differs
    pub delta: Delta,
    /// Actual line (absent for removed lines)
    pub got: Option<String>,
}

impl DiffRow {
    fn same(want: &str, got: &str) -> Self {
        Self {
            want: Some(want.to_string()),
            delta: Delta::Same,
            got: Some(got.to_string()),
        }
    }

    fn removed(want: &str) -> Self {
        Self {
            want: Some(want.to_string()),
            delta: Delta::Removed,
            got: None,
        }
    }

    fn added(got: &str) -> Self {
        Self {
            want: None,
            delta: Delta::Added,
            got: Some(got.to_string()),
        }
    }

    fn changed(want: &str, got: &str) -> Self {
        Self {
            want: Some(want.to_string()),
            delta: Delta::Changed,
            got: Some(got.to_string()),
        }
    }
}

/// Summary statistics for a line diff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    /// Number of identical lines
    pub same: usize,
    /// Number of lines only in the expected value
    pub removed: usize,
    /// Number of lines only in the actual value
    pub added: usize,
    /// Number of lines changed in place
    pub changed: usize,
}

impl DiffStats {
    /// Tally a set of rows.
    pub fn from_rows(rows: &[DiffRow]) -> Self {
        let mut stats = Self::default();
        for row in rows {
            match row.delta {
                Delta::Same => stats.same += 1,
                Delta::Removed => stats.removed += 1,
                Delta::Added => stats.added += 1,
                Delta::Changed => stats.changed += 1,
            }
        }
        stats
    }

    /// Whether both sides were identical.
    pub fn is_match(&self) -> bool {
        self.removed == 0 && self.added == 0 && self.changed == 0
    }

    /// Generate a human-readable summary.
    pub fn summary(&self) -> String {
        if self.is_match() {
            return "No differences".to_string();
        }

        let mut parts = Vec::new();
        if self.changed > 0 {
            parts.push(format!("{} changed", self.changed));
        }
        if self.removed > 0 {
            parts.push(format!("{} removed", self.removed));
        }
        if self.added > 0 {
            parts.push(format!("{} added", self.added));
        }

        format!("Differences: {}", parts.join(", "))
    }
}

/// Align `want` and `got` line by line.
///
/// Lines are split on `\n` without dropping the last empty segment, so a
/// missing or extra trailing newline shows up as an added or removed empty
/// line.
pub fn diff_lines(want: &str, got: &str) -> Vec<DiffRow> {
    let old: Vec<&str> = want.split('\n').collect();
    let new: Vec<&str> = got.split('\n').collect();
    let mut rows = Vec::with_capacity(old.len().max(new.len()));

    for op in capture_diff_slices(Algorithm::Myers, &old, &new) {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        match tag {
            DiffTag::Equal => {
                for (o, n) in old_range.zip(new_range) {
                    rows.push(DiffRow::same(old[o], new[n]));
                }
            }
            DiffTag::Delete => {
                for o in old_range {
                    rows.push(DiffRow::removed(old[o]));
                }
            }
            DiffTag::Insert => {
                for n in new_range {
                    rows.push(DiffRow::added(new[n]));
                }
            }
            DiffTag::Replace => {
                let (mut old_range, mut new_range) = (old_range, new_range);
                loop {
                    match (old_range.next(), new_range.next()) {
                        (Some(o), Some(n)) => rows.push(DiffRow::changed(old[o], new[n])),
                        (Some(o), None) => rows.push(DiffRow::removed(old[o])),
                        (None, Some(n)) => rows.push(DiffRow::added(new[n])),
                        (None, None) => break,
                    }
                }
            }
        }
    }

    rows
}

/// Renders failure diffs in the configured style.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiffRenderer {
    style: DiffStyle,
}

impl DiffRenderer {
    /// Create a renderer for the given style.
    pub fn new(style: DiffStyle) -> Self {
        Self { style }
    }

    /// Create a renderer from diff flags.
    pub fn from_settings(settings: &DiffSettings) -> Self {
        Self::new(settings.style())
    }

    /// Configured style.
    pub fn style(&self) -> DiffStyle {
        self.style
    }

    /// Render the delta table, or `None` when diffs are disabled.
    pub fn render(&self, want: &str, got: &str) -> Option<String> {
        if self.style == DiffStyle::Off {
            return None;
        }

        let table = DiffTable::new(diff_lines(want, got)).captions("Want", "", "Got");
        Some(table.render(self.style))
    }
}
