//! Flow manager — phase machine, progress, tool gating, system directive.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::classifier::Classification;
use crate::config::EngineConfig;
use crate::evidence::Evidence;
use crate::evidence::extractor::MessageMarkers;
use crate::evidence::rules::CoverageFlags;
use crate::flow::prompts;
use crate::onboarding::StageTracker;

/// Top-level conversation phase. The transition is one-way: once a session
/// reaches `CareerConversation` it never reports `Onboarding` again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Onboarding,
    CareerConversation,
}

impl Default for Phase {
    fn default() -> Self {
        Self::Onboarding
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Onboarding => "onboarding",
            Self::CareerConversation => "career_conversation",
        };
        write!(f, "{s}")
    }
}

impl Phase {
    /// The only legal transition.
    pub fn can_transition_to(&self, target: Phase) -> bool {
        matches!((self, target), (Phase::Onboarding, Phase::CareerConversation))
    }
}

/// Persisted per-session flow state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowState {
    pub phase: Phase,
    /// Keyword coverage accumulated across all user messages, for the
    /// natural phase-transition heuristic.
    pub coverage: CoverageFlags,
    pub exploration_seen: bool,
    /// Whether any career keyword has appeared (career-analysis gating).
    pub career_keyword_seen: bool,
}

/// Which capabilities the dialogue generator may use right now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolFlags {
    pub profile_update: bool,
    pub career_analysis: bool,
    pub recommendations: bool,
}

/// Drives the two-phase conversation machine and produces everything the
/// external dialogue generator consumes: progress, next question, tool
/// flags, and the system directive.
#[derive(Debug, Clone)]
pub struct FlowManager {
    config: EngineConfig,
}

impl FlowManager {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Fold one message's markers into the accumulated flow state.
    pub fn absorb_markers(&self, state: &mut FlowState, markers: &MessageMarkers) {
        state.coverage.absorb(markers.coverage);
        state.exploration_seen |= markers.exploration;
        state.career_keyword_seen |= markers.career_keyword;
    }

    /// Evaluate the phase transition. Returns `true` if the session moved
    /// to `CareerConversation` on this call.
    ///
    /// Two triggers, either is sufficient:
    /// - the structured stage tracker reports completion
    /// - the natural-coverage heuristic: enough broad evidence categories
    ///   detected across all user messages, and enough messages overall.
    ///   This fallback exists because users answer in free text rather
    ///   than through the structured prompts; it is intentionally
    ///   approximate and its thresholds live in [`EngineConfig`].
    pub fn evaluate_transition(
        &self,
        state: &mut FlowState,
        tracker: &StageTracker,
        evidence: &Evidence,
    ) -> bool {
        if state.phase == Phase::CareerConversation {
            return false;
        }

        let structured = tracker.is_complete();
        let natural = self.natural_coverage_met(state, evidence);

        if structured || natural {
            debug_assert!(state.phase.can_transition_to(Phase::CareerConversation));
            state.phase = Phase::CareerConversation;
            info!(
                trigger = if structured { "structured" } else { "natural" },
                message_count = evidence.message_count,
                "onboarding complete, entering career conversation"
            );
            return true;
        }
        false
    }

    fn natural_coverage_met(&self, state: &FlowState, evidence: &Evidence) -> bool {
        // Name can arrive via evidence even when the coverage scan missed
        // the phrasing (bare-name answers during rapport).
        let mut coverage = state.coverage;
        coverage.name |= evidence.user_name.is_some();

        coverage.count() >= self.config.natural_transition_min_categories
            && evidence.message_count >= self.config.natural_transition_min_messages
    }

    /// Progress fraction: stage progress during onboarding, 1.0 after.
    pub fn progress(&self, state: &FlowState, tracker: &StageTracker) -> f64 {
        match state.phase {
            Phase::Onboarding => tracker.progress(),
            Phase::CareerConversation => 1.0,
        }
    }

    /// Human-readable description of where the conversation is.
    pub fn description(&self, state: &FlowState, tracker: &StageTracker) -> String {
        match state.phase {
            Phase::Onboarding => match tracker.current_stage() {
                Some(stage) => format!(
                    "Onboarding — {} ({:.0}% of required questions covered)",
                    stage.name(),
                    tracker.progress() * 100.0
                ),
                None => "Onboarding — wrapping up".to_string(),
            },
            Phase::CareerConversation => "Open career conversation".to_string(),
        }
    }

    /// The next question to put to the user. Phrasing is picked at random
    /// from the stage's pool; which stage is asked is deterministic.
    pub fn next_question(&self, state: &FlowState, tracker: &StageTracker) -> String {
        match state.phase {
            Phase::Onboarding => match tracker.current_stage() {
                Some(stage) => prompts::pick(prompts::stage_questions(stage)).to_string(),
                None => prompts::pick(prompts::open_questions()).to_string(),
            },
            Phase::CareerConversation => prompts::pick(prompts::open_questions()).to_string(),
        }
    }

    /// Message shown when the phase transition fires, tailored to the
    /// persona bucket.
    pub fn transition_message(
        &self,
        classification: &Classification,
        evidence: &Evidence,
    ) -> String {
        prompts::transition_message(
            classification.persona.bucket(),
            evidence.user_name.as_deref(),
        )
    }

    /// Progressive tool enablement.
    pub fn tool_flags(&self, state: &FlowState, evidence: &Evidence) -> ToolFlags {
        let count = evidence.message_count;
        ToolFlags {
            profile_update: count >= self.config.profile_update_min_messages,
            career_analysis: count >= self.config.career_analysis_min_messages
                && state.career_keyword_seen,
            recommendations: count >= self.config.recommendations_min_messages,
        }
    }

    /// The phase-appropriate instruction block for the external dialogue
    /// generator: evidence checklist plus the single mandatory next
    /// question.
    pub fn system_directive(
        &self,
        state: &FlowState,
        tracker: &StageTracker,
        evidence: &Evidence,
        classification: &Classification,
    ) -> String {
        match state.phase {
            Phase::Onboarding => self.onboarding_directive(state, tracker, evidence),
            Phase::CareerConversation => self.open_directive(state, evidence, classification),
        }
    }

    fn onboarding_directive(
        &self,
        state: &FlowState,
        tracker: &StageTracker,
        evidence: &Evidence,
    ) -> String {
        let checklist: Vec<String> = tracker
            .stages()
            .iter()
            .map(|s| {
                let mark = if s.completed { "x" } else { " " };
                let req = if s.required { "" } else { " (optional)" };
                format!("- [{mark}] {}{req}", s.name)
            })
            .collect();

        let name_line = match &evidence.user_name {
            Some(name) => format!("The user's name is {name}."),
            None => "You don't know the user's name yet.".to_string(),
        };

        format!(
            "You are guiding a structured career onboarding conversation.\n\
             {name_line}\n\n\
             Evidence checklist:\n{}\n\n\
             Ask exactly ONE question this turn, and it must be this one:\n{}\n\n\
             Acknowledge what the user just shared before asking. Keep it to \
             1-3 sentences. Warm, not form-like.",
            checklist.join("\n"),
            self.next_question(state, tracker),
        )
    }

    fn open_directive(
        &self,
        state: &FlowState,
        evidence: &Evidence,
        classification: &Classification,
    ) -> String {
        let guidance = match classification.persona.bucket() {
            crate::classifier::PersonaBucket::Uncertain => {
                "Go slowly. Offer structure and reassurance; suggest small, \
                 low-stakes exploration steps rather than big decisions."
            }
            crate::classifier::PersonaBucket::Exploring => {
                "Help them compare options concretely. Surface trade-offs \
                 between the careers they've mentioned."
            }
            crate::classifier::PersonaBucket::Decided => {
                "Be specific and practical. Pressure-test the chosen path \
                 and focus on concrete next steps."
            }
        };

        let specifics = if evidence.career_direction.specifics.is_empty() {
            "none named yet".to_string()
        } else {
            evidence.career_direction.specifics.join(", ")
        };

        let tools = self.tool_flags(state, evidence);

        format!(
            "You are in an open career conversation.\n\
             Persona: {} (confidence {:.2}, {}). {}\n\
             Careers mentioned so far: {specifics}.\n\
             Enabled capabilities: profile_update={}, career_analysis={}, recommendations={}.\n\n\
             Suggested opener if the user has nothing pending:\n{}",
            classification.persona,
            classification.confidence,
            classification.reasoning,
            guidance,
            tools.profile_update,
            tools.career_analysis,
            tools.recommendations,
            prompts::pick(prompts::open_questions()),
        )
    }
}

impl Default for FlowManager {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
