//! # driftsync Diff
//!
//! Reversible unified-diff patch model for driftsync.
//!
//! This crate provides:
//! - A structured hunk model ([`Patch`], [`Hunk`], [`PatchLine`])
//! - Exact unified-diff serialization and parsing (mirrors of each other)
//! - First-class inversion ([`Patch::invert`])
//! - Context-verified application ([`Patch::apply`])
//! - Diff computation over the `similar` line-diff ([`compute_diff`])
//!
//! ## Key Invariants
//!
//! - Round-trip law: `reverse_apply(modified, compute_diff(original,
//!   modified, n).text)` recovers `original` exactly, for any inputs and
//!   context width
//! - Serialization and parsing are exact mirrors; the text format is the
//!   context-bounded unified-diff grammar with no file headers
//! - Apply never partially applies: any context mismatch fails before the
//!   input is touched
//! - Failed applies are sentinels ("cannot reconstruct"), never panics
//!
//! The line model splits content on `'\n'` such that a trailing newline
//! yields a final empty line; joining with `'\n'` is the exact inverse.
//! This keeps round-trips byte-exact for content with or without trailing
//! newlines.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod diff;
mod error;
mod patch;

pub use diff::{compute_diff, compute_patch, reverse_apply, ComputedDiff};
pub use error::{PatchError, PatchResult};
pub use patch::{DiffStats, Hunk, Patch, PatchLine};
