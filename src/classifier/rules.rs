//! The deterministic persona decision table.

use chrono::Utc;
use tracing::debug;

use crate::classifier::persona::{
    Classification, ClassificationStage, PersonaType,
};
use crate::config::EngineConfig;
use crate::evidence::model::{ConfidenceSignal, DirectionSignal, Evidence};

const MIN_CONFIDENCE: f64 = 0.6;
const MAX_CONFIDENCE: f64 = 0.95;

/// Classifies accumulated evidence into a persona.
///
/// Decision order, first applicable rule wins:
/// 1. direction signal `none` → uncertain_unengaged (0.8)
/// 2. direction signal `few` or `exploring` → exploring_undecided (0.75)
/// 3. direction signal `one`:
///    a. low/moderate confidence or weak motivation → tentatively_decided (0.7)
///    b. high/very-high confidence and intrinsic > extrinsic → focused_confident (0.85)
///    c. mixed signals → tentatively_decided (0.65)
/// 4. no direct signal → inferred from engagement or specifics (0.6)
///
/// Ties between rules are resolved by rule order, never by score magnitude.
#[derive(Debug, Clone)]
pub struct PersonaClassifier {
    config: EngineConfig,
}

impl PersonaClassifier {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Classify evidence. Deterministic: identical evidence always yields
    /// the identical persona, confidence, and stage.
    pub fn classify(&self, evidence: &Evidence) -> Classification {
        let (persona, base, reason) = self.base_rule(evidence);
        let (confidence, adjustments) = self.adjust(evidence, base);

        let stage = if confidence > self.config.confirmation_confidence
            && evidence.message_count > self.config.confirmation_min_messages
        {
            ClassificationStage::Confirmed
        } else {
            ClassificationStage::Provisional
        };

        let reasoning = if adjustments.is_empty() {
            reason
        } else {
            format!("{reason}; adjusted for {}", adjustments.join(", "))
        };

        debug!(persona = %persona, confidence, ?stage, "classified evidence");

        Classification {
            persona,
            confidence,
            stage,
            reasoning,
            timestamp: Utc::now(),
        }
    }

    fn base_rule(&self, evidence: &Evidence) -> (PersonaType, f64, String) {
        let direction = &evidence.career_direction;
        let confidence_signals = &evidence.confidence_level.signals;

        if direction.signals.contains(&DirectionSignal::None) {
            return (
                PersonaType::UncertainUnengaged,
                0.8,
                "no career direction expressed".to_string(),
            );
        }

        if direction.signals.contains(&DirectionSignal::Few)
            || direction.signals.contains(&DirectionSignal::Exploring)
        {
            return (
                PersonaType::ExploringUndecided,
                0.75,
                "weighing several directions".to_string(),
            );
        }

        if direction.signals.contains(&DirectionSignal::One) {
            let low_confidence = confidence_signals.contains(&ConfidenceSignal::Low)
                || confidence_signals.contains(&ConfidenceSignal::Moderate);
            let weak_motivation = evidence.motivation.total() < 0.4;

            if low_confidence || weak_motivation {
                return (
                    PersonaType::TentativelyDecided,
                    0.7,
                    "one direction but limited conviction".to_string(),
                );
            }

            let high_confidence = confidence_signals.contains(&ConfidenceSignal::High)
                || confidence_signals.contains(&ConfidenceSignal::VeryHigh);
            if high_confidence && evidence.motivation.intrinsic > evidence.motivation.extrinsic {
                return (
                    PersonaType::FocusedConfident,
                    0.85,
                    "one direction, high confidence, intrinsically driven".to_string(),
                );
            }

            return (
                PersonaType::TentativelyDecided,
                0.65,
                "one direction with mixed signals".to_string(),
            );
        }

        // No direct signal: fall back to engagement and specifics.
        if evidence.engagement.uncertainty > 0.3 {
            return (
                PersonaType::UncertainUnengaged,
                0.6,
                "no direct signal; high uncertainty markers".to_string(),
            );
        }
        if direction.specifics.len() > 1 {
            return (
                PersonaType::ExploringUndecided,
                0.6,
                "no direct signal; multiple careers mentioned".to_string(),
            );
        }
        (
            PersonaType::ExploringUndecided,
            0.6,
            "no direct signal; defaulting to exploring".to_string(),
        )
    }

    fn adjust(&self, evidence: &Evidence, base: f64) -> (f64, Vec<&'static str>) {
        let mut confidence = base;
        let mut adjustments = Vec::new();

        if evidence.career_direction.confidence > 0.7 {
            confidence += 0.05;
            adjustments.push("strong direction evidence");
        }
        if evidence.confidence_level.confidence > 0.7 {
            confidence += 0.05;
            adjustments.push("strong confidence evidence");
        }
        if evidence.message_count > 5 {
            confidence += 0.05;
            adjustments.push("sustained conversation");
        }
        if !evidence.career_direction.specifics.is_empty() {
            confidence += 0.03;
            adjustments.push("named careers");
        }

        (confidence.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE), adjustments)
    }
}

impl Default for PersonaClassifier {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
