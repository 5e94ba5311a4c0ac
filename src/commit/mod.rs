//! Configuration commit synchronization.
//!
//! The daemon delivers a commit as a run of config notifications closed by a
//! `.commit.end` marker. [`ConfigCommitTracker`] turns that run into either
//! one full configuration snapshot per commit, or a feed of individual
//! [`ConfigDelta`]s.
mod delta;
mod tracker;
pub use delta::*;
pub(crate) use tracker::*;
