//! Configuration types.

use std::time::Duration;

/// Engine configuration — thresholds for classification, phase transition,
/// tool gating, and change detection.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Confidence above which a classification becomes `Confirmed`
    /// (together with the message floor below).
    pub confirmation_confidence: f64,
    /// Minimum user messages before a classification can be `Confirmed`.
    pub confirmation_min_messages: u32,
    /// Broad evidence categories (of 5) required for the natural
    /// phase-transition heuristic.
    pub natural_transition_min_categories: usize,
    /// Minimum user messages before the natural transition can fire.
    pub natural_transition_min_messages: u32,
    /// User messages required to enable the profile-update tool.
    pub profile_update_min_messages: u32,
    /// User messages required to enable career analysis (plus a career
    /// keyword must have been seen).
    pub career_analysis_min_messages: u32,
    /// User messages required to enable recommendations.
    pub recommendations_min_messages: u32,
    /// Absolute confidence delta that counts as a confidence change.
    pub confidence_change_threshold: f64,
    /// Timeout applied to the optional classification enhancer.
    pub enhancer_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            confirmation_confidence: 0.75,
            confirmation_min_messages: 3,
            // 4-of-5 at >= 10 messages was chosen empirically; tune against
            // real conversation data before tightening.
            natural_transition_min_categories: 4,
            natural_transition_min_messages: 10,
            profile_update_min_messages: 1,
            career_analysis_min_messages: 3,
            recommendations_min_messages: 5,
            confidence_change_threshold: 0.1,
            enhancer_timeout: Duration::from_secs(5),
        }
    }
}
