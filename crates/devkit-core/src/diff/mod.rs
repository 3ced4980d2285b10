//! Line-level diffs projected into two aligned columns.
//!
//! Texts are newline-normalized, split into lines, and compared with a
//! line-atomic Myers diff from the `similar` crate. The resulting hunks are
//! projected onto a left (original) and right (modified) column that always
//! have the same number of rows; a line present on only one side leaves a
//! [`LineKind::Placeholder`] on the other.

mod render;

pub use render::RenderConfig;

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use similar::{capture_diff_slices, Algorithm, DiffTag};
use tracing::debug;

/// Classification of a hunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HunkKind {
    /// Lines present in both texts.
    Unchanged,
    /// Lines only in the modified text.
    Added,
    /// Lines only in the original text.
    Removed,
}

/// A maximal run of consecutive lines sharing one classification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hunk {
    /// Classification shared by every line of the run.
    pub kind: HunkKind,
    /// Line texts without terminators.
    pub lines: Vec<String>,
}

/// Classification of a single display row on one side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    /// Present on both sides.
    Unchanged,
    /// Present only on the right.
    Added,
    /// Present only on the left.
    Removed,
    /// Blank filler keeping the columns aligned.
    Placeholder,
}

/// One row of one column.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayLine {
    /// Row classification.
    pub kind: LineKind,
    /// Line text; empty for placeholders.
    pub text: String,
    /// 1-based line number on this side; `None` for placeholders.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<usize>,
}

impl DisplayLine {
    fn numbered(kind: LineKind, text: &str, number: usize) -> Self {
        Self { kind, text: text.to_string(), number: Some(number) }
    }

    fn placeholder() -> Self {
        Self { kind: LineKind::Placeholder, text: String::new(), number: None }
    }

    /// Whether this row is alignment filler.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.kind == LineKind::Placeholder
    }
}

/// Two index-aligned columns describing a comparison.
///
/// ```
/// # use devkit_core::diff::{compute_side_by_side, LineKind};
/// let view = compute_side_by_side("a\nb\nc", "a\nx\nc");
/// assert_eq!(view.left.len(), 3);
/// assert_eq!(view.right.len(), 3);
/// assert_eq!(view.left[1].kind, LineKind::Removed);
/// assert_eq!(view.right[1].kind, LineKind::Added);
/// assert_eq!(view.right[1].text, "x");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideBySide {
    /// Rows of the original text.
    pub left: Vec<DisplayLine>,
    /// Rows of the modified text.
    pub right: Vec<DisplayLine>,
    /// Set when exactly one of the texts ends with a line terminator.
    #[serde(default)]
    pub newline_at_eof_changed: bool,
}

impl SideBySide {
    /// Number of rows (identical for both columns).
    #[must_use]
    pub fn len(&self) -> usize {
        self.left.len()
    }

    /// Whether there are no rows at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Iterates over `(left, right)` row pairs.
    pub fn rows(&self) -> impl Iterator<Item = (&DisplayLine, &DisplayLine)> + '_ {
        self.left.iter().zip(self.right.iter())
    }

    /// Number of lines only in the modified text.
    #[must_use]
    pub fn additions(&self) -> usize {
        self.right.iter().filter(|line| line.kind == LineKind::Added).count()
    }

    /// Number of lines only in the original text.
    #[must_use]
    pub fn deletions(&self) -> usize {
        self.left.iter().filter(|line| line.kind == LineKind::Removed).count()
    }

    /// Whether both texts have the same lines and agree on a final newline.
    #[must_use]
    pub fn is_identical(&self) -> bool {
        self.additions() == 0 && self.deletions() == 0 && !self.newline_at_eof_changed
    }
}

/// Replaces every `\r\n` with `\n`.
#[must_use]
pub fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if text.contains("\r\n") {
        Cow::Owned(text.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Splits normalized text into lines.
///
/// One trailing newline does not start an extra line, and empty text is a
/// single empty line. `"a"` and `"a\n"` therefore split alike; the
/// difference is tracked by [`SideBySide::newline_at_eof_changed`].
///
/// ```
/// # use devkit_core::diff::split_lines;
/// assert_eq!(split_lines(""), vec![""]);
/// assert_eq!(split_lines("a\nb\n"), vec!["a", "b"]);
/// assert_eq!(split_lines("a\n\n"), vec!["a", ""]);
/// ```
#[must_use]
pub fn split_lines(text: &str) -> Vec<&str> {
    text.strip_suffix('\n').unwrap_or(text).split('\n').collect()
}

/// Computes the hunks of a line diff between two texts.
///
/// ```
/// # use devkit_core::diff::{line_hunks, HunkKind};
/// let hunks = line_hunks("a\nb", "a\nb\nc");
/// assert_eq!(hunks.len(), 2);
/// assert_eq!(hunks[0].kind, HunkKind::Unchanged);
/// assert_eq!(hunks[1].kind, HunkKind::Added);
/// assert_eq!(hunks[1].lines, vec!["c"]);
/// ```
#[must_use]
pub fn line_hunks(original: &str, modified: &str) -> Vec<Hunk> {
    let original = normalize_newlines(original);
    let modified = normalize_newlines(modified);
    let old_lines = split_lines(&original);
    let new_lines = split_lines(&modified);

    let mut hunks: Vec<Hunk> = Vec::new();
    for op in capture_diff_slices(Algorithm::Myers, &old_lines, &new_lines) {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        match tag {
            DiffTag::Equal => push_run(&mut hunks, HunkKind::Unchanged, &old_lines[old_range]),
            DiffTag::Delete => push_run(&mut hunks, HunkKind::Removed, &old_lines[old_range]),
            DiffTag::Insert => push_run(&mut hunks, HunkKind::Added, &new_lines[new_range]),
            DiffTag::Replace => {
                push_run(&mut hunks, HunkKind::Removed, &old_lines[old_range]);
                push_run(&mut hunks, HunkKind::Added, &new_lines[new_range]);
            }
        }
    }

    debug!(
        hunks = hunks.len(),
        old_lines = old_lines.len(),
        new_lines = new_lines.len(),
        "computed line diff"
    );
    hunks
}

fn push_run(hunks: &mut Vec<Hunk>, kind: HunkKind, lines: &[&str]) {
    if lines.is_empty() {
        return;
    }
    match hunks.last_mut() {
        Some(last) if last.kind == kind => {
            last.lines.extend(lines.iter().map(|line| (*line).to_string()));
        }
        _ => {
            let lines = lines.iter().map(|line| (*line).to_string()).collect();
            hunks.push(Hunk { kind, lines });
        }
    }
}

/// Projects hunks onto two aligned columns.
///
/// Unchanged lines appear on both sides. Added lines appear on the right
/// against a left placeholder, removed lines on the left against a right
/// placeholder. A removed hunk immediately followed by an added hunk is laid
/// out row by row as a replacement, padding the shorter side.
#[must_use]
pub fn project(hunks: &[Hunk]) -> SideBySide {
    let mut view = SideBySide::default();
    let mut left_number = 0usize;
    let mut right_number = 0usize;
    let mut iter = hunks.iter().peekable();

    while let Some(hunk) = iter.next() {
        match hunk.kind {
            HunkKind::Unchanged => {
                for line in &hunk.lines {
                    left_number += 1;
                    right_number += 1;
                    view.left.push(DisplayLine::numbered(LineKind::Unchanged, line, left_number));
                    view.right.push(DisplayLine::numbered(LineKind::Unchanged, line, right_number));
                }
            }
            HunkKind::Removed => {
                let added = iter.next_if(|next| next.kind == HunkKind::Added);
                let added_lines = added.map_or(&[][..], |next| next.lines.as_slice());
                let rows = hunk.lines.len().max(added_lines.len());
                for row in 0..rows {
                    match hunk.lines.get(row) {
                        Some(line) => {
                            left_number += 1;
                            let line = DisplayLine::numbered(LineKind::Removed, line, left_number);
                            view.left.push(line);
                        }
                        None => view.left.push(DisplayLine::placeholder()),
                    }
                    match added_lines.get(row) {
                        Some(line) => {
                            right_number += 1;
                            let line = DisplayLine::numbered(LineKind::Added, line, right_number);
                            view.right.push(line);
                        }
                        None => view.right.push(DisplayLine::placeholder()),
                    }
                }
            }
            HunkKind::Added => {
                for line in &hunk.lines {
                    right_number += 1;
                    view.left.push(DisplayLine::placeholder());
                    view.right.push(DisplayLine::numbered(LineKind::Added, line, right_number));
                }
            }
        }
    }

    view
}

/// Diffs two texts and returns the side-by-side projection.
///
/// ```
/// let view = devkit_core::compute_side_by_side("a", "a\n");
/// assert_eq!(view.len(), 1);
/// assert!(view.newline_at_eof_changed);
/// assert!(!view.is_identical());
/// ```
#[must_use]
pub fn compute_side_by_side(original: &str, modified: &str) -> SideBySide {
    let mut view = project(&line_hunks(original, modified));
    view.newline_at_eof_changed = original.ends_with('\n') != modified.ends_with('\n');
    view
}
