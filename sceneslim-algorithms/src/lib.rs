//! # sceneslim algorithms
//!
//! Scene-level passes of the optimizer:
//! - Timeline reduction: drops redundant key values and empty keyframes and
//!   reports which transforms the animation drives
//! - Timeline sampling, to check that a reduction preserved motion
//! - Transform pruning and empty-group flattening over the scene graph

// Library code propagates or reports; tests may unwrap.
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

pub mod prune;
pub mod timeline;

// Re-export commonly used items
pub use prune::*;
pub use timeline::*;
