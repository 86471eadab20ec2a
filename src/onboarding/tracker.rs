//! Stage tracker state machine.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::evidence::Evidence;
use crate::evidence::rules::CoverageFlags;
use crate::onboarding::stage::{Stage, StageId};

/// Tracks which onboarding stages a session has completed.
///
/// The current stage is the first incomplete, non-waived stage in order.
/// `ConfidenceAssessment` is waived (treated as satisfied) while no
/// direction signal exists — a career mentioned in passing is not a stated
/// direction, so there is nothing to assess confidence about yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTracker {
    completed: BTreeSet<StageId>,
    /// Whether any direction signal has been observed. Controls the
    /// confidence-assessment waiver.
    direction_seen: bool,
}

impl StageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a stage is currently waived.
    fn waived(&self, id: StageId) -> bool {
        id == StageId::ConfidenceAssessment && !self.direction_seen
    }

    /// Whether a stage counts as satisfied: completed or waived.
    pub fn satisfied(&self, id: StageId) -> bool {
        self.completed.contains(&id) || self.waived(id)
    }

    /// The first incomplete, non-waived stage, or `None` when every stage
    /// (required and optional alike) is satisfied.
    pub fn current_stage(&self) -> Option<StageId> {
        StageId::ALL.into_iter().find(|id| !self.satisfied(*id))
    }

    /// Mark a stage complete. Idempotent — completing an already-completed
    /// stage is a no-op.
    pub fn complete_stage(&mut self, id: StageId) {
        if self.completed.insert(id) {
            debug!(stage = %id, "onboarding stage completed");
        }
    }

    /// Fraction of required stages completed, waivers applied.
    pub fn progress(&self) -> f64 {
        let required: Vec<StageId> = StageId::ALL
            .into_iter()
            .filter(|id| id.required() && !self.waived(*id))
            .collect();
        if required.is_empty() {
            return 1.0;
        }
        let done = required
            .iter()
            .filter(|id| self.completed.contains(id))
            .count();
        done as f64 / required.len() as f64
    }

    /// Terminal condition: every required, non-waived stage is completed.
    pub fn is_complete(&self) -> bool {
        StageId::ALL
            .into_iter()
            .filter(|id| id.required())
            .all(|id| self.satisfied(id))
    }

    /// The stage list as reported to callers.
    pub fn stages(&self) -> Vec<Stage> {
        StageId::ALL
            .into_iter()
            .map(|id| Stage {
                id,
                name: id.name(),
                required: id.required() && !self.waived(id),
                completed: self.satisfied(id),
            })
            .collect()
    }

    /// Auto-complete stages whose evidence arrived through free text.
    ///
    /// Users often answer a structured question and volunteer two more
    /// categories in the same breath; the tracker credits those stages so
    /// they are never asked again.
    pub fn observe(&mut self, evidence: &Evidence, coverage: &CoverageFlags, exploration_seen: bool) {
        self.direction_seen = evidence.has_direction_signal();

        if evidence.user_name.is_some() {
            self.complete_stage(StageId::Rapport);
        }
        if evidence.life_stage != crate::evidence::LifeStage::Unknown {
            self.complete_stage(StageId::LifeStage);
        }
        if evidence.has_direction_signal() {
            self.complete_stage(StageId::CareerDirection);
        }
        if !evidence.confidence_level.signals.is_empty() {
            self.complete_stage(StageId::ConfidenceAssessment);
        }
        if evidence.motivation.total() > 0.0 {
            self.complete_stage(StageId::Motivation);
        }
        if coverage.goals {
            self.complete_stage(StageId::GoalClarification);
        }
        if exploration_seen {
            self.complete_stage(StageId::ExplorationHistory);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::model::{DirectionSignal, EvidenceDelta};

    #[test]
    fn current_stage_walks_in_order() {
        let mut tracker = StageTracker::new();
        assert_eq!(tracker.current_stage(), Some(StageId::Rapport));

        tracker.complete_stage(StageId::Rapport);
        assert_eq!(tracker.current_stage(), Some(StageId::LifeStage));

        tracker.complete_stage(StageId::LifeStage);
        assert_eq!(tracker.current_stage(), Some(StageId::CareerDirection));
    }

    #[test]
    fn confidence_assessment_waived_without_direction_evidence() {
        let mut tracker = StageTracker::new();
        tracker.complete_stage(StageId::Rapport);
        tracker.complete_stage(StageId::LifeStage);
        tracker.complete_stage(StageId::CareerDirection);
        // No direction evidence observed: skip straight to motivation.
        assert_eq!(tracker.current_stage(), Some(StageId::Motivation));
        assert!(tracker.satisfied(StageId::ConfidenceAssessment));
    }

    #[test]
    fn confidence_assessment_required_once_direction_seen() {
        let mut tracker = StageTracker::new();
        let mut evidence = Evidence::default();
        evidence.merge(&EvidenceDelta {
            direction_signal: Some(DirectionSignal::Few),
            ..Default::default()
        });
        tracker.observe(&evidence, &CoverageFlags::default(), false);

        tracker.complete_stage(StageId::Rapport);
        tracker.complete_stage(StageId::LifeStage);
        assert_eq!(tracker.current_stage(), Some(StageId::ConfidenceAssessment));
    }

    #[test]
    fn career_mention_without_a_signal_keeps_the_waiver() {
        let mut tracker = StageTracker::new();
        let mut evidence = Evidence::default();
        // "I quite like nursing": a named career, no direction signal.
        evidence.merge(&EvidenceDelta {
            specifics: vec!["nursing".into()],
            ..Default::default()
        });
        tracker.observe(&evidence, &CoverageFlags::default(), false);

        assert!(tracker.satisfied(StageId::ConfidenceAssessment));

        tracker.complete_stage(StageId::Rapport);
        tracker.complete_stage(StageId::LifeStage);
        tracker.complete_stage(StageId::CareerDirection);
        assert_ne!(
            tracker.current_stage(),
            Some(StageId::ConfidenceAssessment)
        );
    }

    #[test]
    fn complete_stage_is_idempotent() {
        let mut tracker = StageTracker::new();
        tracker.complete_stage(StageId::Rapport);
        let snapshot = tracker.clone();
        tracker.complete_stage(StageId::Rapport);
        assert_eq!(tracker, snapshot);
    }

    #[test]
    fn progress_counts_required_only() {
        let mut tracker = StageTracker::new();
        // 4 required while confidence assessment is waived:
        // rapport, life_stage, career_direction, goal_clarification.
        assert_eq!(tracker.progress(), 0.0);

        tracker.complete_stage(StageId::Rapport);
        tracker.complete_stage(StageId::LifeStage);
        assert_eq!(tracker.progress(), 0.5);

        // Optional stages don't move the needle.
        tracker.complete_stage(StageId::Motivation);
        assert_eq!(tracker.progress(), 0.5);

        tracker.complete_stage(StageId::CareerDirection);
        tracker.complete_stage(StageId::GoalClarification);
        assert_eq!(tracker.progress(), 1.0);
        assert!(tracker.is_complete());
    }

    #[test]
    fn observe_credits_free_text_answers() {
        let mut tracker = StageTracker::new();
        let mut evidence = Evidence::default();
        evidence.merge(&EvidenceDelta {
            user_name: Some("Leo".into()),
            life_stage: Some(crate::evidence::LifeStage::UniCollege),
            intrinsic: 0.2,
            ..Default::default()
        });

        let coverage = CoverageFlags {
            goals: true,
            ..Default::default()
        };
        tracker.observe(&evidence, &coverage, true);

        assert!(tracker.satisfied(StageId::Rapport));
        assert!(tracker.satisfied(StageId::LifeStage));
        assert!(tracker.satisfied(StageId::Motivation));
        assert!(tracker.satisfied(StageId::GoalClarification));
        assert!(tracker.satisfied(StageId::ExplorationHistory));
        assert!(!tracker.satisfied(StageId::CareerDirection));
    }

    #[test]
    fn tracker_serde_roundtrip() {
        let mut tracker = StageTracker::new();
        tracker.complete_stage(StageId::Rapport);
        let json = serde_json::to_string(&tracker).unwrap();
        let parsed: StageTracker = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, tracker);
    }
}
