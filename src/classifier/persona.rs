//! Persona types and the classification record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The four behavioral personas, ordered roughly by decision readiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonaType {
    UncertainUnengaged,
    ExploringUndecided,
    TentativelyDecided,
    FocusedConfident,
}

impl PersonaType {
    /// Coarse 3-way bucket used for transition copy and adaptation advice.
    pub fn bucket(&self) -> PersonaBucket {
        match self {
            Self::UncertainUnengaged => PersonaBucket::Uncertain,
            Self::ExploringUndecided => PersonaBucket::Exploring,
            Self::TentativelyDecided | Self::FocusedConfident => PersonaBucket::Decided,
        }
    }
}

impl std::fmt::Display for PersonaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::UncertainUnengaged => "uncertain_unengaged",
            Self::ExploringUndecided => "exploring_undecided",
            Self::TentativelyDecided => "tentatively_decided",
            Self::FocusedConfident => "focused_confident",
        };
        write!(f, "{s}")
    }
}

/// Coarser persona grouping: how settled the user is overall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonaBucket {
    Uncertain,
    Exploring,
    Decided,
}

/// Whether a classification is an early guess or backed by enough turns
/// and confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationStage {
    Provisional,
    Confirmed,
}

/// A persona classification with confidence and explainability text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub persona: PersonaType,
    /// Always within [0.6, 0.95].
    pub confidence: f64,
    pub stage: ClassificationStage,
    /// Short human-readable justification of which rule fired. Required
    /// for explainability and testing, not for behavior.
    pub reasoning: String,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets() {
        assert_eq!(PersonaType::UncertainUnengaged.bucket(), PersonaBucket::Uncertain);
        assert_eq!(PersonaType::ExploringUndecided.bucket(), PersonaBucket::Exploring);
        assert_eq!(PersonaType::TentativelyDecided.bucket(), PersonaBucket::Decided);
        assert_eq!(PersonaType::FocusedConfident.bucket(), PersonaBucket::Decided);
    }

    #[test]
    fn display_matches_serde() {
        let personas = [
            PersonaType::UncertainUnengaged,
            PersonaType::ExploringUndecided,
            PersonaType::TentativelyDecided,
            PersonaType::FocusedConfident,
        ];
        for persona in personas {
            let display = format!("{persona}");
            let json = serde_json::to_string(&persona).unwrap();
            assert_eq!(format!("\"{display}\""), json);
        }
    }
}
