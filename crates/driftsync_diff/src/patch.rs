//! Structured patch model with exact unified-diff serialization.
//!
//! A [`Patch`] is a list of [`Hunk`]s. The text form follows the
//! context-bounded unified-diff grammar (`@@ -a,b +c,d @@` headers, then
//! `+`/`-`/space lines, no file headers), and [`Patch::parse`] /
//! [`std::fmt::Display`] are exact mirrors of each other.
//!
//! Inversion is first-class: [`Patch::invert`] swaps the old/new header
//! fields and flips add/remove tags on every line, instead of rewriting
//! serialized text.

use crate::error::{PatchError, PatchResult};
use std::fmt;

/// One line of a hunk body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchLine {
    /// A line present in both sides.
    Context(String),
    /// A line present only in the new side.
    Add(String),
    /// A line present only in the old side.
    Remove(String),
}

impl PatchLine {
    /// The line text, without the leading marker.
    pub fn text(&self) -> &str {
        match self {
            PatchLine::Context(t) | PatchLine::Add(t) | PatchLine::Remove(t) => t,
        }
    }

    /// Flips `Add` to `Remove` and vice versa; `Context` is unchanged.
    fn flipped(self) -> Self {
        match self {
            PatchLine::Context(t) => PatchLine::Context(t),
            PatchLine::Add(t) => PatchLine::Remove(t),
            PatchLine::Remove(t) => PatchLine::Add(t),
        }
    }
}

/// A contiguous change region.
///
/// `old_start`/`new_start` hold the numbers exactly as they appear in the
/// hunk header: 1-based when the corresponding line count is non-zero, the
/// preceding line number when it is zero (standard unified convention).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    /// Start position in the old content, header convention.
    pub old_start: usize,
    /// Number of old-side lines covered (context + removals).
    pub old_lines: usize,
    /// Start position in the new content, header convention.
    pub new_start: usize,
    /// Number of new-side lines covered (context + additions).
    pub new_lines: usize,
    /// The hunk body, in order.
    pub lines: Vec<PatchLine>,
}

impl Hunk {
    /// Zero-based offset of this hunk in the old content.
    fn old_offset(&self) -> usize {
        if self.old_lines == 0 {
            self.old_start
        } else {
            self.old_start - 1
        }
    }

    /// Swaps the old and new sides.
    fn invert(self) -> Self {
        Hunk {
            old_start: self.new_start,
            old_lines: self.new_lines,
            new_start: self.old_start,
            new_lines: self.old_lines,
            lines: self.lines.into_iter().map(PatchLine::flipped).collect(),
        }
    }

    /// Verifies the header counts against the body.
    fn check_counts(&self) -> PatchResult<()> {
        let mut old = 0usize;
        let mut new = 0usize;
        for line in &self.lines {
            match line {
                PatchLine::Context(_) => {
                    old += 1;
                    new += 1;
                }
                PatchLine::Add(_) => new += 1,
                PatchLine::Remove(_) => old += 1,
            }
        }
        if old != self.old_lines || new != self.new_lines {
            return Err(PatchError::malformed(format!(
                "hunk body ({old} old, {new} new lines) disagrees with header \
                 (-{},{} +{},{})",
                self.old_start, self.old_lines, self.new_start, self.new_lines
            )));
        }
        Ok(())
    }
}

/// A parsed, invertible patch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Patch {
    /// Hunks in old-content order.
    pub hunks: Vec<Hunk>,
}

/// Line-change counts for a patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiffStats {
    /// Number of added lines.
    pub additions: usize,
    /// Number of removed lines.
    pub deletions: usize,
}

impl DiffStats {
    /// Returns true if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.additions == 0 && self.deletions == 0
    }
}

/// Splits content into lines such that joining with `'\n'` is the exact
/// inverse: a trailing newline yields a final empty line.
pub(crate) fn split_lines(content: &str) -> Vec<&str> {
    content.split('\n').collect()
}

impl Patch {
    /// Parses unified-diff text into a structured patch.
    ///
    /// The empty string parses to an empty patch.
    ///
    /// # Errors
    ///
    /// Returns [`PatchError::Malformed`] if the text does not follow the
    /// grammar or a hunk body disagrees with its header counts.
    pub fn parse(text: &str) -> PatchResult<Self> {
        let mut hunks: Vec<Hunk> = Vec::new();
        let raw_lines: Vec<&str> = text.split('\n').collect();
        let last = raw_lines.len().saturating_sub(1);

        for (i, raw) in raw_lines.iter().enumerate() {
            if raw.is_empty() && i == last {
                // Trailing newline of the patch text itself.
                break;
            }
            if let Some(header) = raw.strip_prefix("@@ ") {
                hunks.push(parse_header(header)?);
                continue;
            }
            let hunk = hunks
                .last_mut()
                .ok_or_else(|| PatchError::malformed("body line before first hunk header"))?;
            if let Some(t) = raw.strip_prefix('+') {
                hunk.lines.push(PatchLine::Add(t.to_owned()));
            } else if let Some(t) = raw.strip_prefix('-') {
                hunk.lines.push(PatchLine::Remove(t.to_owned()));
            } else if let Some(t) = raw.strip_prefix(' ') {
                hunk.lines.push(PatchLine::Context(t.to_owned()));
            } else {
                return Err(PatchError::malformed(format!(
                    "unrecognized patch line: {raw:?}"
                )));
            }
        }

        for hunk in &hunks {
            hunk.check_counts()?;
        }
        Ok(Patch { hunks })
    }

    /// Returns the algebraic inverse of this patch.
    ///
    /// Applying the inverse to the new-side content recovers the old side.
    #[must_use]
    pub fn invert(self) -> Self {
        Patch {
            hunks: self.hunks.into_iter().map(Hunk::invert).collect(),
        }
    }

    /// Applies the patch to `content`, producing the new-side content.
    ///
    /// Every context and removed line is verified against `content`.
    ///
    /// # Errors
    ///
    /// Returns [`PatchError::ContextMismatch`] as soon as `content` disagrees
    /// with what the patch recorded. The input is never partially applied.
    pub fn apply(&self, content: &str) -> PatchResult<String> {
        let lines = split_lines(content);
        let mut out: Vec<&str> = Vec::with_capacity(lines.len());
        let mut cursor = 0usize;

        for hunk in &self.hunks {
            let start = hunk.old_offset();
            if start < cursor || start > lines.len() {
                return Err(PatchError::ContextMismatch { line: start + 1 });
            }
            out.extend_from_slice(&lines[cursor..start]);
            let mut pos = start;
            for line in &hunk.lines {
                match line {
                    PatchLine::Context(expected) => {
                        if lines.get(pos).copied() != Some(expected.as_str()) {
                            return Err(PatchError::ContextMismatch { line: pos + 1 });
                        }
                        out.push(expected);
                        pos += 1;
                    }
                    PatchLine::Remove(expected) => {
                        if lines.get(pos).copied() != Some(expected.as_str()) {
                            return Err(PatchError::ContextMismatch { line: pos + 1 });
                        }
                        pos += 1;
                    }
                    PatchLine::Add(added) => out.push(added),
                }
            }
            cursor = pos;
        }

        out.extend_from_slice(&lines[cursor..]);
        Ok(out.join("\n"))
    }

    /// Counts added and removed lines.
    pub fn stats(&self) -> DiffStats {
        let mut stats = DiffStats::default();
        for hunk in &self.hunks {
            for line in &hunk.lines {
                match line {
                    PatchLine::Add(_) => stats.additions += 1,
                    PatchLine::Remove(_) => stats.deletions += 1,
                    PatchLine::Context(_) => {}
                }
            }
        }
        stats
    }

    /// Returns true if the patch has no hunks.
    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }
}

fn parse_header(header: &str) -> PatchResult<Hunk> {
    // header is the text after "@@ ", e.g. "-1,3 +2,4 @@"
    let body = header
        .strip_suffix(" @@")
        .ok_or_else(|| PatchError::malformed(format!("bad hunk header: @@ {header}")))?;
    let mut parts = body.split(' ');
    let old = parts
        .next()
        .and_then(|p| p.strip_prefix('-'))
        .ok_or_else(|| PatchError::malformed(format!("bad hunk header: @@ {header}")))?;
    let new = parts
        .next()
        .and_then(|p| p.strip_prefix('+'))
        .ok_or_else(|| PatchError::malformed(format!("bad hunk header: @@ {header}")))?;
    if parts.next().is_some() {
        return Err(PatchError::malformed(format!("bad hunk header: @@ {header}")));
    }
    let (old_start, old_lines) = parse_range(old)?;
    let (new_start, new_lines) = parse_range(new)?;
    Ok(Hunk {
        old_start,
        old_lines,
        new_start,
        new_lines,
        lines: Vec::new(),
    })
}

fn parse_range(range: &str) -> PatchResult<(usize, usize)> {
    let (start, count) = match range.split_once(',') {
        Some((s, c)) => (s, Some(c)),
        None => (range, None),
    };
    let start: usize = start
        .parse()
        .map_err(|_| PatchError::malformed(format!("bad range: {range}")))?;
    let count: usize = match count {
        // A bare number means one line, per the unified grammar.
        None => 1,
        Some(c) => c
            .parse()
            .map_err(|_| PatchError::malformed(format!("bad range: {range}")))?,
    };
    Ok((start, count))
}

impl fmt::Display for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for hunk in &self.hunks {
            writeln!(
                f,
                "@@ -{},{} +{},{} @@",
                hunk.old_start, hunk.old_lines, hunk.new_start, hunk.new_lines
            )?;
            for line in &hunk.lines {
                match line {
                    PatchLine::Context(t) => writeln!(f, " {t}")?,
                    PatchLine::Add(t) => writeln!(f, "+{t}")?,
                    PatchLine::Remove(t) => writeln!(f, "-{t}")?,
                }
            }
        }
        Ok(())
    }
}
