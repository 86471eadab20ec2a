//! Onboarding stage tracking — the structured question sequence.
//!
//! A fixed ordered list of seven stages, three of them conditionally
//! optional. The tracker is an explicit state machine: the current stage is
//! the first incomplete, non-waived stage, and completion is idempotent.
//! Stages can also complete "naturally" when their evidence arrives through
//! free text instead of a structured answer.

pub mod stage;
pub mod tracker;

pub use stage::{Stage, StageId};
pub use tracker::StageTracker;
