//! Evidence — structured signals inferred from conversation text.
//!
//! Each user turn is run through the extractor, which produces an
//! [`EvidenceDelta`] from declarative keyword rule tables. Deltas are merged
//! into the session's accumulated [`Evidence`] under monotonic-growth
//! invariants: signal sets and specifics only grow, confidences only move
//! via defined update rules, and nothing resets short of a session clear.

pub mod extractor;
pub mod model;
pub mod rules;

pub use extractor::EvidenceExtractor;
pub use model::{
    ConfidenceSignal, DirectionSignal, Engagement, Evidence, EvidenceDelta, LifeStage,
};
pub use rules::RuleTables;
