//! Scored slot candidates.
//!
//! Slot search never returns a placeholder: either a candidate comes back
//! carrying the tier it was found in (and that tier's penalty), or `None`
//! when no classroom slot is left at all.

/// How far slot search had to fall back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SlotTier {
    /// Next free slot in the pair's classroom.
    Preferred,
    /// Earliest feasible slot in another classroom (cyclic scan).
    Cyclic,
    /// Earliest slot where the partner is busy, so another jury member stands in.
    SubstituteJury,
    /// Earliest free classroom slot; instructor double bookings are accepted.
    Shared,
}

impl SlotTier {
    /// Penalty attached to a placement in this tier.
    pub fn penalty(self) -> f64 {
        match self {
            SlotTier::Preferred => 0.0,
            SlotTier::Cyclic => 1.0,
            SlotTier::SubstituteJury => 10.0,
            SlotTier::Shared => 1000.0,
        }
    }
}

/// A placement found by slot search.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotCandidate {
    /// Catalog position of the classroom.
    pub classroom: usize,
    /// Chronological order of the timeslot.
    pub order: usize,
    /// Responsible instructor followed by jury.
    pub instructor_ids: Vec<String>,
    /// Fallback tier.
    pub tier: SlotTier,
}

impl SlotCandidate {
    /// Placement penalty of this candidate.
    pub fn score(&self) -> f64 {
        self.tier.penalty()
    }
}
