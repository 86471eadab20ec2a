//! Accumulated evidence model and merge invariants.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Where the user is in life relative to study and work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifeStage {
    SecondarySchool,
    UniCollege,
    Graduate,
    Working,
    GapYear,
    Neet,
    Unknown,
}

impl Default for LifeStage {
    fn default() -> Self {
        Self::Unknown
    }
}

impl std::fmt::Display for LifeStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::SecondarySchool => "secondary_school",
            Self::UniCollege => "uni_college",
            Self::Graduate => "graduate",
            Self::Working => "working",
            Self::GapYear => "gap_year",
            Self::Neet => "neet",
            Self::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

/// How many career directions the user appears to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionSignal {
    None,
    Few,
    One,
    Exploring,
}

/// How confident the user sounds about their direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceSignal {
    Low,
    Moderate,
    High,
    VeryHigh,
}

/// Career-direction evidence: signal set, named career mentions, and a
/// category confidence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CareerDirection {
    pub signals: BTreeSet<DirectionSignal>,
    /// Named career mentions in insertion order, deduplicated
    /// case-insensitively.
    pub specifics: Vec<String>,
    pub confidence: f64,
}

/// Confidence-level evidence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceLevel {
    pub signals: BTreeSet<ConfidenceSignal>,
    pub confidence: f64,
}

/// Accumulating motivation scores. Intrinsic and extrinsic are not
/// mutually exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Motivation {
    pub intrinsic: f64,
    pub extrinsic: f64,
}

impl Motivation {
    pub fn total(&self) -> f64 {
        self.intrinsic + self.extrinsic
    }
}

/// Engagement heuristics accumulated across turns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Engagement {
    pub uncertainty: f64,
    pub enthusiasm: f64,
    pub detail_sharing: f64,
    pub question_asking: f64,
}

/// Accumulated structured signals about a user's career-decision state.
///
/// Owned exclusively by one session. Never wholesale-replaced — only merged
/// via [`Evidence::merge`], which enforces the monotonic-growth invariants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    #[serde(default)]
    pub life_stage: LifeStage,
    #[serde(default)]
    pub career_direction: CareerDirection,
    #[serde(default)]
    pub confidence_level: ConfidenceLevel,
    #[serde(default)]
    pub motivation: Motivation,
    #[serde(default)]
    pub engagement: Engagement,
    /// Name captured during the rapport stage, if the user shared one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    /// User turns only. Strictly +1 per merged turn.
    #[serde(default)]
    pub message_count: u32,
}

/// Per-turn extraction result. All fields optional/additive; an empty delta
/// means no pattern matched, which is not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvidenceDelta {
    pub life_stage: Option<LifeStage>,
    pub direction_signal: Option<DirectionSignal>,
    /// All career keywords matched in this turn (not first-wins).
    pub specifics: Vec<String>,
    pub direction_confidence: Option<f64>,
    pub confidence_signal: Option<ConfidenceSignal>,
    pub level_confidence: Option<f64>,
    /// Additive motivation score deltas.
    pub intrinsic: f64,
    pub extrinsic: f64,
    /// Additive engagement score deltas.
    pub engagement: Engagement,
    pub user_name: Option<String>,
}

impl EvidenceDelta {
    /// Whether the turn produced no evidence at all.
    pub fn is_empty(&self) -> bool {
        self.life_stage.is_none()
            && self.direction_signal.is_none()
            && self.specifics.is_empty()
            && self.direction_confidence.is_none()
            && self.confidence_signal.is_none()
            && self.level_confidence.is_none()
            && self.intrinsic == 0.0
            && self.extrinsic == 0.0
            && self.engagement == Engagement::default()
            && self.user_name.is_none()
    }
}

fn clamp01(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

impl Evidence {
    /// Merge one user turn's delta into the accumulated evidence.
    ///
    /// Invariants enforced here:
    /// - signal sets only grow; `specifics` only grows (case-insensitive
    ///   dedup, insertion order preserved)
    /// - category confidences move via `max(current, incoming)`
    /// - motivation and engagement scores accumulate additively, clamped
    ///   to 1.0
    /// - `life_stage` only replaces `Unknown`
    /// - `message_count` increases by exactly 1 per merged turn, even for
    ///   an empty delta (the turn still happened)
    pub fn merge(&mut self, delta: &EvidenceDelta) {
        if let Some(stage) = delta.life_stage {
            if self.life_stage == LifeStage::Unknown {
                self.life_stage = stage;
            }
        }

        if let Some(signal) = delta.direction_signal {
            self.career_direction.signals.insert(signal);
        }
        for specific in &delta.specifics {
            self.add_specific(specific);
        }
        if let Some(conf) = delta.direction_confidence {
            self.career_direction.confidence =
                self.career_direction.confidence.max(clamp01(conf));
        }

        if let Some(signal) = delta.confidence_signal {
            self.confidence_level.signals.insert(signal);
        }
        if let Some(conf) = delta.level_confidence {
            self.confidence_level.confidence =
                self.confidence_level.confidence.max(clamp01(conf));
        }

        self.motivation.intrinsic = clamp01(self.motivation.intrinsic + delta.intrinsic);
        self.motivation.extrinsic = clamp01(self.motivation.extrinsic + delta.extrinsic);

        self.engagement.uncertainty =
            clamp01(self.engagement.uncertainty + delta.engagement.uncertainty);
        self.engagement.enthusiasm =
            clamp01(self.engagement.enthusiasm + delta.engagement.enthusiasm);
        self.engagement.detail_sharing =
            clamp01(self.engagement.detail_sharing + delta.engagement.detail_sharing);
        self.engagement.question_asking =
            clamp01(self.engagement.question_asking + delta.engagement.question_asking);

        if self.user_name.is_none() {
            self.user_name = delta.user_name.clone();
        }

        self.message_count += 1;
    }

    /// Append a career mention if not already present (case-insensitive).
    fn add_specific(&mut self, specific: &str) {
        let lower = specific.to_lowercase();
        if !self
            .career_direction
            .specifics
            .iter()
            .any(|s| s.to_lowercase() == lower)
        {
            self.career_direction.specifics.push(specific.to_string());
        }
    }

    /// Whether any direct career-direction signal has been observed.
    pub fn has_direction_signal(&self) -> bool {
        !self.career_direction.signals.is_empty()
    }
}
