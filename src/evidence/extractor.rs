//! Evidence extraction — pure, deterministic keyword analysis of one turn.

use tracing::debug;

use crate::evidence::model::{DirectionSignal, Engagement, Evidence, EvidenceDelta};
use crate::evidence::rules::{CoverageFlags, RuleTables};
use crate::onboarding::StageId;

/// Message-level markers that feed the flow manager rather than the
/// evidence record: phase-transition coverage, exploration history, and
/// career-keyword presence for tool gating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageMarkers {
    pub coverage: CoverageFlags,
    pub exploration: bool,
    pub career_keyword: bool,
}

/// Extracts an [`EvidenceDelta`] from a single user message.
///
/// Extraction is a pure function of `(message, stage_hint, prior)` — no
/// side effects, fully deterministic, re-runnable. A message that matches
/// nothing yields an empty delta, which is not an error.
pub struct EvidenceExtractor {
    rules: RuleTables,
}

impl EvidenceExtractor {
    pub fn new() -> Self {
        Self {
            rules: RuleTables::standard(),
        }
    }

    /// Shared access to the rule tables (the flow manager reuses them for
    /// its own keyword checks).
    pub fn rules(&self) -> &RuleTables {
        &self.rules
    }

    /// Run all extraction rule sets over one user message.
    ///
    /// `stage_hint` selects the rule sets that only make sense in context:
    /// the bare-name heuristic runs only while the rapport stage is asking
    /// for a name. Everything else runs on every turn so that free-text
    /// answers outside the structured flow are never lost.
    pub fn extract(
        &self,
        message: &str,
        stage_hint: StageId,
        prior: &Evidence,
    ) -> EvidenceDelta {
        let text = message.trim();
        if text.is_empty() {
            return EvidenceDelta::default();
        }

        let mut delta = EvidenceDelta::default();

        delta.user_name = self.rules.explicit_name(text);
        if delta.user_name.is_none()
            && stage_hint == StageId::Rapport
            && prior.user_name.is_none()
        {
            delta.user_name = self.rules.bare_name(text);
        }

        delta.life_stage = self.rules.life_stage(text);

        delta.direction_signal = self.rules.direction_signal(text);
        delta.specifics = self.rules.career_mentions(text);
        if delta.direction_signal.is_some() || !delta.specifics.is_empty() {
            delta.direction_confidence = Some(direction_confidence(
                delta.direction_signal,
                &delta.specifics,
            ));
        }

        delta.confidence_signal = self.rules.confidence_signal(text);
        if delta.confidence_signal.is_some() {
            delta.level_confidence = Some(0.75);
        }

        delta.intrinsic = self.rules.intrinsic_hits(text) as f64 * 0.2;
        delta.extrinsic = self.rules.extrinsic_hits(text) as f64 * 0.2;

        delta.engagement = Engagement {
            uncertainty: if self.rules.has_uncertainty_marker(text) { 0.2 } else { 0.0 },
            enthusiasm: if self.rules.has_enthusiasm_marker(text) { 0.2 } else { 0.0 },
            detail_sharing: detail_score(text),
            question_asking: if text.contains('?') { 0.2 } else { 0.0 },
        };

        if delta.is_empty() {
            debug!(stage = %stage_hint, "no extraction rule matched");
        } else {
            debug!(
                stage = %stage_hint,
                direction = ?delta.direction_signal,
                specifics = delta.specifics.len(),
                "extracted evidence delta"
            );
        }
        delta
    }

    /// Message-level markers for the flow manager. Pure, like `extract`.
    pub fn markers(&self, message: &str) -> MessageMarkers {
        let text = message.trim();
        MessageMarkers {
            coverage: self.rules.coverage(text),
            exploration: self.rules.has_exploration_marker(text),
            career_keyword: self.rules.has_career_keyword(text),
        }
    }
}

impl Default for EvidenceExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Category confidence for career direction: a settled single direction
/// reads strongest, named careers strengthen any signal.
fn direction_confidence(signal: Option<DirectionSignal>, specifics: &[String]) -> f64 {
    let base = match signal {
        Some(DirectionSignal::One) => 0.8,
        Some(_) => 0.6,
        None => 0.5,
    };
    if specifics.is_empty() {
        base
    } else {
        base.max(0.75)
    }
}

/// Longer answers read as higher detail sharing.
fn detail_score(text: &str) -> f64 {
    match text.len() {
        0..=99 => 0.0,
        100..=199 => 0.2,
        _ => 0.3,
    }
}
