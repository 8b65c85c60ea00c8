//! Initial schedule construction.
//!
//! Builds a schedule that spreads jury duty fairly by pairing the most
//! loaded instructors with the least loaded ones, then filling classroom
//! slots in order. Slot search degrades through scored fallback tiers
//! instead of returning placeholder slots.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3-4

mod builder;
mod slot;

pub use builder::{Construction, FairnessBuilder};
pub use slot::{SlotCandidate, SlotTier};
