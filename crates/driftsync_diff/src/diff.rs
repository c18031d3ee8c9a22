//! Diff computation over the structured patch model.

use crate::error::PatchResult;
use crate::patch::{split_lines, DiffStats, Hunk, Patch, PatchLine};
use similar::{capture_diff_slices, Algorithm, DiffTag};

/// A computed diff: serialized patch text plus line-change counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputedDiff {
    /// Unified-diff text. Empty when the inputs are identical.
    pub text: String,
    /// Number of added lines.
    pub additions: usize,
    /// Number of removed lines.
    pub deletions: usize,
}

impl ComputedDiff {
    /// Returns true if the inputs were identical.
    pub fn is_empty(&self) -> bool {
        self.additions == 0 && self.deletions == 0
    }
}

/// One step of the flattened change script: an index into the old or new
/// line vector.
enum ScriptStep {
    Context(usize),
    Remove(usize),
    Add(usize),
}

/// Computes a structured patch turning `original` into `modified`.
///
/// `context_lines` bounds the number of unchanged lines kept around each
/// change. Deterministic for identical inputs; identical contents yield an
/// empty patch.
///
/// Hunk headers are derived from the same per-line script that produces the
/// hunk bodies, so header counts and start positions always agree with the
/// body by construction.
pub fn compute_patch(original: &str, modified: &str, context_lines: usize) -> Patch {
    let old = split_lines(original);
    let new = split_lines(modified);
    let ops = capture_diff_slices(Algorithm::Myers, &old, &new);

    // Flatten the op stream into one step per line, in patch order.
    let mut script = Vec::new();
    for op in &ops {
        match op.tag() {
            DiffTag::Equal => script.extend(op.old_range().map(ScriptStep::Context)),
            DiffTag::Delete => script.extend(op.old_range().map(ScriptStep::Remove)),
            DiffTag::Insert => script.extend(op.new_range().map(ScriptStep::Add)),
            DiffTag::Replace => {
                script.extend(op.old_range().map(ScriptStep::Remove));
                script.extend(op.new_range().map(ScriptStep::Add));
            }
        }
    }

    // Old/new line positions reached before each step, plus the final pair.
    let mut positions = Vec::with_capacity(script.len() + 1);
    let (mut old_pos, mut new_pos) = (0usize, 0usize);
    for step in &script {
        positions.push((old_pos, new_pos));
        match step {
            ScriptStep::Context(_) => {
                old_pos += 1;
                new_pos += 1;
            }
            ScriptStep::Remove(_) => old_pos += 1,
            ScriptStep::Add(_) => new_pos += 1,
        }
    }
    positions.push((old_pos, new_pos));

    let changes: Vec<usize> = script
        .iter()
        .enumerate()
        .filter(|(_, step)| !matches!(step, ScriptStep::Context(_)))
        .map(|(i, _)| i)
        .collect();

    let mut hunks = Vec::new();
    let mut i = 0;
    while i < changes.len() {
        // Merge change runs whose gap fits inside both context windows.
        let mut j = i;
        while j + 1 < changes.len() && changes[j + 1] - changes[j] - 1 <= 2 * context_lines {
            j += 1;
        }
        let lo = changes[i].saturating_sub(context_lines);
        let hi = (changes[j] + 1 + context_lines).min(script.len());

        let mut lines = Vec::new();
        let (mut old_lines, mut new_lines) = (0usize, 0usize);
        for step in &script[lo..hi] {
            match step {
                ScriptStep::Context(k) => {
                    lines.push(PatchLine::Context(old[*k].to_owned()));
                    old_lines += 1;
                    new_lines += 1;
                }
                ScriptStep::Remove(k) => {
                    lines.push(PatchLine::Remove(old[*k].to_owned()));
                    old_lines += 1;
                }
                ScriptStep::Add(k) => {
                    lines.push(PatchLine::Add(new[*k].to_owned()));
                    new_lines += 1;
                }
            }
        }

        let (old_at, new_at) = positions[lo];
        hunks.push(Hunk {
            old_start: header_start(old_at, old_lines),
            old_lines,
            new_start: header_start(new_at, new_lines),
            new_lines,
            lines,
        });
        i = j + 1;
    }
    Patch { hunks }
}

/// Computes unified-diff text and line-change counts.
pub fn compute_diff(original: &str, modified: &str, context_lines: usize) -> ComputedDiff {
    let patch = compute_patch(original, modified, context_lines);
    let DiffStats {
        additions,
        deletions,
    } = patch.stats();
    ComputedDiff {
        text: patch.to_string(),
        additions,
        deletions,
    }
}

/// Recovers the original content from the modified content and the diff
/// that produced it.
///
/// Satisfies the round-trip law: for any `original`, `modified` and context
/// width, `reverse_apply(modified, &compute_diff(original, modified, n).text)`
/// returns `original`.
///
/// # Errors
///
/// Returns a [`crate::PatchError`] sentinel when `content` has diverged from
/// the diff's new side; callers treat this as "cannot reconstruct", never as
/// a fatal error.
pub fn reverse_apply(content: &str, diff_text: &str) -> PatchResult<String> {
    Patch::parse(diff_text)?.invert().apply(content)
}

/// Converts a zero-based range start into the unified header convention:
/// 1-based when the range is non-empty, the preceding line number when empty.
fn header_start(start: usize, len: usize) -> usize {
    if len == 0 {
        start
    } else {
        start + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn identical_inputs_yield_empty_diff() {
        let diff = compute_diff("same\ntext", "same\ntext", 3);
        assert!(diff.is_empty());
        assert_eq!(diff.text, "");
    }

    #[test]
    fn counts_changed_lines() {
        let diff = compute_diff("a\nb\nc", "a\nx\ny\nc", 3);
        assert_eq!(diff.deletions, 1);
        assert_eq!(diff.additions, 2);
    }

    #[test]
    fn diff_is_deterministic() {
        let a = "one\ntwo\nthree\nfour";
        let b = "one\n2\nthree\n4";
        assert_eq!(compute_diff(a, b, 2), compute_diff(a, b, 2));
    }

    #[test]
    fn forward_apply_reproduces_modified() {
        let a = "fn main() {\n    println!(\"hi\");\n}\n";
        let b = "fn main() {\n    println!(\"hello\");\n    0\n}\n";
        let patch = compute_patch(a, b, 3);
        assert_eq!(patch.apply(a).unwrap(), b);
    }

    #[test]
    fn round_trip_basic() {
        let a = "alpha\nbeta\ngamma";
        let b = "alpha\nBETA\ngamma\ndelta";
        let diff = compute_diff(a, b, 3);
        assert_eq!(reverse_apply(b, &diff.text).unwrap(), a);
    }

    #[test]
    fn round_trip_empty_original() {
        let diff = compute_diff("", "hello world", 3);
        assert_eq!(reverse_apply("hello world", &diff.text).unwrap(), "");
    }

    #[test]
    fn round_trip_empty_modified() {
        let diff = compute_diff("hello world", "", 3);
        assert_eq!(reverse_apply("", &diff.text).unwrap(), "hello world");
    }

    #[test]
    fn round_trip_trailing_newline_changes() {
        // Adding or dropping a trailing newline must round-trip exactly.
        for (a, b) in [
            ("no newline", "no newline\n"),
            ("with newline\n", "with newline"),
            ("a\nb\n", "a\nb\nc"),
        ] {
            let diff = compute_diff(a, b, 3);
            assert_eq!(reverse_apply(b, &diff.text).unwrap(), a, "{a:?} -> {b:?}");
        }
    }

    #[test]
    fn round_trip_disjoint_hunks() {
        // Changes far apart produce multiple hunks with zero context width.
        let a = "1\n2\n3\n4\n5\n6\n7\n8\n9\n10";
        let b = "ONE\n2\n3\n4\n5\n6\n7\n8\n9\nTEN";
        let diff = compute_diff(a, b, 1);
        assert!(diff.text.matches("@@ -").count() >= 2);
        assert_eq!(reverse_apply(b, &diff.text).unwrap(), a);
    }

    #[test]
    fn blank_line_replacement_parses_and_round_trips() {
        // A change next to blank lines must still emit a header that agrees
        // with the hunk body.
        let a = "\na\n";
        let b = "\n\n";
        let diff = compute_diff(a, b, 3);
        let patch = Patch::parse(&diff.text).unwrap();
        assert_eq!(patch.apply(a).unwrap(), b);
        assert_eq!(reverse_apply(b, &diff.text).unwrap(), a);
    }

    #[test]
    fn round_trip_zero_context_whitespace_lines() {
        // Zero-width context with runs of blank and space-only lines: the
        // inverted hunk offsets must land exactly where the forward diff
        // removed lines, recovering the original byte for byte.
        let a = " \na\na\na\n \n \n\n \n";
        let b = "\n\n";
        let diff = compute_diff(a, b, 0);
        assert_eq!(reverse_apply(b, &diff.text).unwrap(), a);
        let wide = compute_diff(a, b, 3);
        assert_eq!(reverse_apply(b, &wide.text).unwrap(), a);
    }

    #[test]
    fn reverse_apply_diverged_content_fails() {
        let diff = compute_diff("base", "edited", 3);
        assert!(reverse_apply("something else entirely", &diff.text).is_err());
    }

    proptest! {
        #[test]
        fn round_trip_law(
            a_lines in proptest::collection::vec("[abX ]{0,4}", 0..10),
            b_lines in proptest::collection::vec("[abX ]{0,4}", 0..10),
            context in 0usize..4,
        ) {
            let a = a_lines.join("\n");
            let b = b_lines.join("\n");
            let diff = compute_diff(&a, &b, context);
            let patch = compute_patch(&a, &b, context);
            prop_assert_eq!(patch.apply(&a).unwrap(), b.clone());
            prop_assert_eq!(reverse_apply(&b, &diff.text).unwrap(), a);
        }

        #[test]
        fn serialization_is_a_mirror(
            a_lines in proptest::collection::vec("[ab]{0,3}", 0..8),
            b_lines in proptest::collection::vec("[ab]{0,3}", 0..8),
        ) {
            let a = a_lines.join("\n");
            let b = b_lines.join("\n");
            let patch = compute_patch(&a, &b, 2);
            let reparsed = crate::Patch::parse(&patch.to_string()).unwrap();
            prop_assert_eq!(reparsed, patch);
        }
    }
}
