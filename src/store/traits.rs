//! Backend-agnostic session store trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::evidence::Evidence;
use crate::flow::FlowState;
use crate::onboarding::StageTracker;

/// Everything the engine persists per session besides the evidence record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingRecord {
    pub tracker: StageTracker,
    pub flow: FlowState,
}

/// Durable key-value storage keyed by session id.
///
/// The engine only reads and writes through this trait; durability,
/// replication, and cross-restart behavior belong to the backend. All
/// failures are recoverable from the engine's point of view: a failed load
/// defaults, a failed save degrades one turn's persistence.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the accumulated evidence, `None` for a fresh session.
    async fn load_evidence(&self, session_id: &str) -> Result<Option<Evidence>, StoreError>;

    /// Persist the accumulated evidence.
    async fn save_evidence(&self, session_id: &str, evidence: &Evidence)
    -> Result<(), StoreError>;

    /// Load the onboarding record (stage tracker + flow state).
    async fn load_onboarding(
        &self,
        session_id: &str,
    ) -> Result<Option<OnboardingRecord>, StoreError>;

    /// Persist the onboarding record.
    async fn save_onboarding(
        &self,
        session_id: &str,
        record: &OnboardingRecord,
    ) -> Result<(), StoreError>;

    /// Remove everything stored for a session.
    async fn clear_session(&self, session_id: &str) -> Result<(), StoreError>;
}
