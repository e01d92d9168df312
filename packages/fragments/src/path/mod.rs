//! Element paths: the live tracker and the specifications matched against it.

mod census;
mod spec;
mod tracker;

pub use census::PathCensus;
pub use spec::{Anchor, PathSpec};
pub use tracker::PathTracker;
