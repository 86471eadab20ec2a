//! In-memory session store — default backend and test double.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::evidence::Evidence;
use crate::store::traits::{OnboardingRecord, SessionStore};

#[derive(Debug, Default)]
struct SessionRecord {
    evidence: Option<Evidence>,
    onboarding: Option<OnboardingRecord>,
}

/// HashMap-backed store. Sessions are fully independent entries; there is
/// no cross-session state.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: RwLock<HashMap<String, SessionRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn load_evidence(&self, session_id: &str) -> Result<Option<Evidence>, StoreError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(session_id).and_then(|r| r.evidence.clone()))
    }

    async fn save_evidence(
        &self,
        session_id: &str,
        evidence: &Evidence,
    ) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().await;
        sessions.entry(session_id.to_string()).or_default().evidence = Some(evidence.clone());
        Ok(())
    }

    async fn load_onboarding(
        &self,
        session_id: &str,
    ) -> Result<Option<OnboardingRecord>, StoreError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(session_id).and_then(|r| r.onboarding.clone()))
    }

    async fn save_onboarding(
        &self,
        session_id: &str,
        record: &OnboardingRecord,
    ) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_id.to_string())
            .or_default()
            .onboarding = Some(record.clone());
        Ok(())
    }

    async fn clear_session(&self, session_id: &str) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(session_id);
        Ok(())
    }
}
