//! Waypoint — persona classification and conversation-phase orchestration
//! for career-guidance conversations.
//!
//! The engine watches an ongoing conversation one user turn at a time:
//! it extracts structured evidence from the text, merges it into the
//! session's accumulated record, classifies the user into one of four
//! behavioral personas, tracks a multi-stage onboarding flow, and emits
//! adaptation directives (pacing, support level, next question, tool
//! enablement) for an external dialogue generator. Everything except the
//! persistence boundary is synchronous, deterministic rule evaluation.

pub mod adaptation;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod flow;
pub mod onboarding;
pub mod store;

pub use adaptation::{AdaptationTracker, ChangeEvent, ChangeType};
pub use classifier::{
    Classification, ClassificationEnhancer, ClassificationStage, PersonaBucket, PersonaClassifier,
    PersonaType,
};
pub use config::EngineConfig;
pub use engine::{ConversationEngine, TurnOutcome};
pub use error::{Error, Result};
pub use evidence::{Evidence, EvidenceDelta, EvidenceExtractor};
pub use flow::{FlowManager, Phase, ToolFlags};
pub use onboarding::{StageId, StageTracker};
pub use store::{MemoryStore, SessionStore};
