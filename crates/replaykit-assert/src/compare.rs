//! Equality engine.
//!
//! A [`Comparison`] normalizes both sides according to an [`EqualityMode`]
//! chosen by the caller and records whether they match. Normalized text is
//! only kept for unequal pairs; an equal comparison carries nothing but its
//! mode.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use replaykit_core::Message;
use replaykit_diff::{diff_lines, DiffRenderer, DiffStats};

use crate::failure::Failure;

/// Notion of equality used by a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EqualityMode {
    /// Recursive, order-sensitive equality over composite values
    DeepStructural,
    /// Byte-for-byte string equality
    ExactString,
    /// Byte-for-byte string equality, reported line by line
    LineString,
    /// Lines sorted lexicographically before comparing; duplicates count
    UnorderedLines,
    /// Equality of the indented JSON serializations
    Json,
}

#[derive(Debug, Clone)]
struct Sides {
    got: String,
    want: String,
}

/// Outcome of comparing an actual value against an expected one.
#[derive(Debug, Clone)]
pub struct Comparison {
    mode: EqualityMode,
    mismatch: Option<Sides>,
}

impl Comparison {
    fn settle(mode: EqualityMode, equal: bool, sides: impl FnOnce() -> Sides) -> Self {
        Self {
            mode,
            mismatch: if equal { None } else { Some(sides()) },
        }
    }

    /// Compare with `PartialEq`; mismatches are shown with pretty `Debug`.
    pub fn structural<T: PartialEq + Debug + ?Sized>(got: &T, want: &T) -> Self {
        Self::settle(EqualityMode::DeepStructural, got == want, || Sides {
            got: format!("{:#?}", got),
            want: format!("{:#?}", want),
        })
    }

    /// Compare two strings byte for byte.
    pub fn exact(got: &str, want: &str) -> Self {
        Self::strings(EqualityMode::ExactString, got, want)
    }

    /// Compare two strings byte for byte, diffing mismatches per line.
    pub fn lines(got: &str, want: &str) -> Self {
        Self::strings(EqualityMode::LineString, got, want)
    }

    fn strings(mode: EqualityMode, got: &str, want: &str) -> Self {
        Self::settle(mode, got == want, || Sides {
            got: got.to_string(),
            want: want.to_string(),
        })
    }

    /// Compare two sequences of strings regardless of order.
    ///
    /// Both sides are sorted element-wise, so duplicate counts matter. A
    /// mismatch reads as a line diff of the sorted forms joined with
    /// newlines. The callers' slices are left untouched.
    pub fn unordered<G, W>(got: &[G], want: &[W]) -> Self
    where
        G: AsRef<str>,
        W: AsRef<str>,
    {
        let got = sorted(got);
        let want = sorted(want);
        Self::settle(EqualityMode::UnorderedLines, got == want, || Sides {
            got: got.join("\n"),
            want: want.join("\n"),
        })
    }

    /// Compare the indented JSON serializations of two values.
    ///
    /// This is a weak equality: values of different types that serialize
    /// alike compare equal.
    pub fn json<G, W>(got: &G, want: &W) -> Self
    where
        G: Serialize + Debug + ?Sized,
        W: Serialize + Debug + ?Sized,
    {
        let got = stringify(got);
        let want = stringify(want);
        let equal = got == want;
        Self::settle(EqualityMode::Json, equal, || Sides { got, want })
    }

    /// Compare two textual values under a caller-chosen mode.
    ///
    /// `UnorderedLines` treats each side as its `\n`-separated lines, a
    /// trailing empty line included; `Json` parses each
    /// side as JSON (falling back to the raw text when it does not parse);
    /// `DeepStructural` compares the strings as values.
    pub fn text(mode: EqualityMode, got: &str, want: &str) -> Self {
        match mode {
            EqualityMode::DeepStructural => Self::structural(got, want),
            EqualityMode::ExactString => Self::exact(got, want),
            EqualityMode::LineString => Self::lines(got, want),
            EqualityMode::UnorderedLines => {
                let got: Vec<&str> = got.split('\n').collect();
                let want: Vec<&str> = want.split('\n').collect();
                Self::unordered(&got, &want)
            }
            EqualityMode::Json => {
                let got = json_text(got);
                let want = json_text(want);
                let equal = got == want;
                Self::settle(EqualityMode::Json, equal, || Sides { got, want })
            }
        }
    }

    /// Mode the comparison ran under.
    pub fn mode(&self) -> EqualityMode {
        self.mode
    }

    /// Whether both sides matched.
    pub fn is_equal(&self) -> bool {
        self.mismatch.is_none()
    }

    /// Turn a mismatch into a [`Failure`] rendered with `renderer`.
    pub fn check(self, renderer: &DiffRenderer, message: Option<Message>) -> Result<(), Failure> {
        let Some(Sides { got, want }) = self.mismatch else {
            return Ok(());
        };

        let stats = DiffStats::from_rows(&diff_lines(&want, &got));
        let diff = renderer.render(&want, &got);

        Err(Failure {
            mode: self.mode,
            got,
            want,
            diff,
            stats,
            message: message.filter(|m| !m.is_empty()),
        })
    }
}

fn sorted<S: AsRef<str>>(items: &[S]) -> Vec<&str> {
    let mut lines: Vec<&str> = items.iter().map(AsRef::as_ref).collect();
    lines.sort_unstable();
    lines
}

fn stringify<T: Serialize + Debug + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| format!("{:#?}", value))
}

fn json_text(text: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value) => stringify(&value),
        Err(_) => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use replaykit_core::DiffStyle;
    use replaykit_diff::Delta;

    #[derive(Debug, PartialEq, Serialize)]
    struct Entry {
        name: String,
        size: u64,
    }

    #[test]
    fn test_structural_equal() {
        let a = vec![1, 2, 3];
        assert!(Comparison::structural(&a, &vec![1, 2, 3]).is_equal());
    }

    #[test]
    fn test_structural_order_sensitive() {
        let c = Comparison::structural(&vec![1, 2], &vec![2, 1]);
        assert!(!c.is_equal());
        assert_eq!(c.mode(), EqualityMode::DeepStructural);
    }

    #[test]
    fn test_structural_maps() {
        let mut a = BTreeMap::new();
        a.insert("k", vec!["v"]);
        let b = a.clone();
        assert!(Comparison::structural(&a, &b).is_equal());
    }

    #[test]
    fn test_structural_failure_uses_pretty_debug() {
        let got = Entry {
            name: "a".into(),
            size: 1,
        };
        let want = Entry {
            name: "a".into(),
            size: 2,
        };
        let failure = Comparison::structural(&got, &want)
            .check(&DiffRenderer::default(), None)
            .unwrap_err();
        assert!(failure.got.contains("size: 1"));
        assert!(failure.want.contains("size: 2"));
        assert_eq!(failure.stats.changed, 1);
    }

    #[test]
    fn test_lines_same() {
        assert!(Comparison::lines("a\nb\n", "a\nb\n").is_equal());
    }

    #[test]
    fn test_lines_trailing_newline() {
        let failure = Comparison::lines("s\n", "s")
            .check(&DiffRenderer::new(DiffStyle::Plain), None)
            .unwrap_err();
        assert_eq!(failure.stats.added, 1);
        assert!(failure.diff.unwrap().lines().any(|l| l.contains(Delta::Added.marker())));
    }

    #[test]
    fn test_exact_mismatch() {
        let c = Comparison::exact("abc", "abd");
        assert!(!c.is_equal());
        assert_eq!(c.mode(), EqualityMode::ExactString);
    }

    #[test]
    fn test_unordered_equal() {
        assert!(Comparison::unordered(&["b", "a"], &["a", "b"]).is_equal());
    }

    #[test]
    fn test_unordered_duplicates_count() {
        assert!(!Comparison::unordered(&["a", "a", "b"], &["a", "b"]).is_equal());
    }

    #[test]
    fn test_unordered_empty_element_is_not_empty_set() {
        let none: [&str; 0] = [];
        assert!(!Comparison::unordered(&[""], &none).is_equal());
        assert!(!Comparison::unordered(&none, &[""]).is_equal());
        assert!(Comparison::unordered(&none, &none).is_equal());
    }

    #[test]
    fn test_unordered_compares_elements_not_joined_text() {
        assert!(!Comparison::unordered(&["a\nb"], &["a", "b"]).is_equal());
        assert!(!Comparison::unordered(&["a", "b"], &["b\na"]).is_equal());
    }

    #[test]
    fn test_text_unordered_keeps_trailing_line() {
        assert!(!Comparison::text(EqualityMode::UnorderedLines, "a\n", "a").is_equal());
        assert!(!Comparison::text(EqualityMode::UnorderedLines, "a\r\nb", "b\na").is_equal());
        assert!(Comparison::text(EqualityMode::UnorderedLines, "b\na\n", "a\nb\n").is_equal());
    }

    #[test]
    fn test_unordered_leaves_input_untouched() {
        let got = vec!["z".to_string(), "a".to_string()];
        let _ = Comparison::unordered(&got, &["a", "z"]);
        assert_eq!(got, vec!["z", "a"]);
    }

    #[test]
    fn test_unordered_reports_sorted_forms() {
        let failure = Comparison::unordered(&["c", "a"], &["b", "a"])
            .check(&DiffRenderer::default(), None)
            .unwrap_err();
        assert_eq!(failure.got, "a\nc");
        assert_eq!(failure.want, "a\nb");
    }

    #[test]
    fn test_json_weak_equality() {
        let typed = Entry {
            name: "x".into(),
            size: 3,
        };
        let dynamic = serde_json::json!({ "name": "x", "size": 3 });
        assert!(Comparison::json(&typed, &dynamic).is_equal());
    }

    #[test]
    fn test_json_mismatch_is_indented() {
        let failure = Comparison::json(&serde_json::json!({"a": 1}), &serde_json::json!({"a": 2}))
            .check(&DiffRenderer::default(), None)
            .unwrap_err();
        assert_eq!(failure.got, "{\n  \"a\": 1\n}");
        assert_eq!(failure.mode, EqualityMode::Json);
    }

    #[test]
    fn test_text_modes() {
        assert!(Comparison::text(EqualityMode::UnorderedLines, "b\na", "a\nb").is_equal());
        assert!(Comparison::text(EqualityMode::Json, "{\"a\":1}", "{ \"a\": 1 }").is_equal());
        assert!(!Comparison::text(EqualityMode::Json, "not json", "{}").is_equal());
        assert!(Comparison::text(EqualityMode::DeepStructural, "x", "x").is_equal());
        assert!(!Comparison::text(EqualityMode::ExactString, "x", "y").is_equal());
        assert!(!Comparison::text(EqualityMode::LineString, "x", "x\n").is_equal());
    }

    #[test]
    fn test_check_equal_is_ok() {
        let result = Comparison::lines("same", "same")
            .check(&DiffRenderer::new(DiffStyle::Color), Some(Message::new("ignored")));
        assert!(result.is_ok());
    }

    #[test]
    fn test_check_drops_empty_message() {
        let failure = Comparison::exact("a", "b")
            .check(&DiffRenderer::default(), Some(Message::new("")))
            .unwrap_err();
        assert!(failure.message.is_none());
    }

    #[test]
    fn test_check_without_diff() {
        let failure = Comparison::exact("a", "b")
            .check(&DiffRenderer::default(), None)
            .unwrap_err();
        assert!(failure.diff.is_none());
        assert_eq!(failure.report(), "Want:\nb\n\nGot :\na");
    }
}
