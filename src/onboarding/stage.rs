//! Stage identifiers and the fixed stage list.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StageError;

/// The seven onboarding stages, in conversation order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    Rapport,
    LifeStage,
    CareerDirection,
    ConfidenceAssessment,
    Motivation,
    GoalClarification,
    ExplorationHistory,
}

impl StageId {
    /// All stages in conversation order.
    pub const ALL: [StageId; 7] = [
        StageId::Rapport,
        StageId::LifeStage,
        StageId::CareerDirection,
        StageId::ConfidenceAssessment,
        StageId::Motivation,
        StageId::GoalClarification,
        StageId::ExplorationHistory,
    ];

    /// Human-readable stage name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rapport => "Getting to know you",
            Self::LifeStage => "Where you are right now",
            Self::CareerDirection => "Career direction",
            Self::ConfidenceAssessment => "How sure you feel",
            Self::Motivation => "What drives you",
            Self::GoalClarification => "Your goals",
            Self::ExplorationHistory => "What you've tried",
        }
    }

    /// Whether the stage is required when no waiver applies.
    ///
    /// `ConfidenceAssessment` is required but waived while no career
    /// direction evidence exists; `Motivation` and `ExplorationHistory`
    /// are always optional.
    pub fn required(&self) -> bool {
        !matches!(self, Self::Motivation | Self::ExplorationHistory)
    }
}

impl std::fmt::Display for StageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Rapport => "rapport",
            Self::LifeStage => "life_stage",
            Self::CareerDirection => "career_direction",
            Self::ConfidenceAssessment => "confidence_assessment",
            Self::Motivation => "motivation",
            Self::GoalClarification => "goal_clarification",
            Self::ExplorationHistory => "exploration_history",
        };
        write!(f, "{s}")
    }
}

impl FromStr for StageId {
    type Err = StageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rapport" => Ok(Self::Rapport),
            "life_stage" => Ok(Self::LifeStage),
            "career_direction" => Ok(Self::CareerDirection),
            "confidence_assessment" => Ok(Self::ConfidenceAssessment),
            "motivation" => Ok(Self::Motivation),
            "goal_clarification" => Ok(Self::GoalClarification),
            "exploration_history" => Ok(Self::ExplorationHistory),
            other => Err(StageError::UnknownStage { id: other.to_string() }),
        }
    }
}

/// A stage as reported to callers: id, name, flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stage {
    pub id: StageId,
    pub name: &'static str,
    pub required: bool,
    pub completed: bool,
}
