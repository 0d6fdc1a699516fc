//! # sizegate
//!
//! A batch size gate for photo folders. Every image directly inside a source
//! directory is brought under a byte ceiling or set aside, and ends in exactly
//! one of two folders under a target directory.
//!
//! # Architecture: One Pipeline, Two Passes
//!
//! ```text
//! 1. Main pass   source/*.{png,jpg,…}  →  route each file
//!                  normalize name → check size → compress → resize → place
//! 2. Sweep       target/**             →  oversized leftovers → incompatible/
//! ```
//!
//! The main pass is strictly single-level; the sweep is recursive but never
//! descends into the destination folders. Running the pipeline twice does
//! nothing the second time.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`pipeline`] | Shared core: [`Pipeline::run`](pipeline::Pipeline::run) and the [`RunReport`](pipeline::RunReport) |
//! | [`router`] | Per-file state machine and outcomes |
//! | [`walker`] | Top-level discovery and the recursive leftover sweep |
//! | [`layout`] | Destination folders under the target, collision-free moves |
//! | [`imaging`] | Two-stage reduction, orientation handling, codec backend |
//! | [`naming`] | Facetune filename normalization and `-N` disambiguation |
//! | [`config`] | `sizegate.toml` loading, merging and validation |
//! | [`command`] | Validated run request used by both front ends |
//! | [`output`] | CLI output formatting of run reports |
//!
//! # Design Decisions
//!
//! ## Bounded Reduction
//!
//! Reduction is one re-encode at a fixed quality, then at most one downscale
//! into a fixed bounding box. There is no quality search, so some images stay
//! over the ceiling. Those are moved, untouched, to the incompatible folder
//! and reported; that is a normal outcome, not an error.
//!
//! ## Moves, Never Copies, Never Overwrites
//!
//! A file has exactly one location at any time. Reduced output replaces the
//! original; a file that could not be reduced keeps its original bytes. When a
//! name is taken, a `-1`, `-2`, … suffix is added to the stem instead of
//! replacing what is there.
//!
//! ## One Bad File Does Not Stop a Run
//!
//! Undecodable images go to the incompatible folder. Filesystem errors on one
//! file are recorded as failed in the report and the run moves on. Only a
//! missing or unreadable source directory ends a run early.
//!
//! ## Sequential
//!
//! Files are routed one at a time in name order. The filesystem is the only
//! shared state, so ordering is what keeps runs deterministic.

pub mod command;
pub mod config;
pub mod imaging;
pub mod layout;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod router;
pub mod walker;

#[cfg(test)]
pub(crate) mod test_helpers;
