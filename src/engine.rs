//! ConversationEngine — the single entry point each user turn routes through.
//!
//! One engine serves many sessions; sessions are fully independent and a
//! session's turns must arrive in order (the transport serializes them).
//! Per-turn work is synchronous rule evaluation; the store is the only
//! async boundary, and store trouble never blocks a turn — a failed load
//! falls back to default evidence, a failed save degrades persistence for
//! that turn and the next successful save re-syncs.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::warn;

use crate::adaptation::{AdaptationTracker, ChangeCallback, ChangeEvent, SubscriptionId};
use crate::classifier::{
    Classification, ClassificationEnhancer, PersonaClassifier, refine_with_enhancer,
};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::evidence::{Evidence, EvidenceDelta, EvidenceExtractor};
use crate::flow::{FlowManager, Phase, ToolFlags};
use crate::onboarding::{Stage, StageId};
use crate::store::traits::OnboardingRecord;
use crate::store::SessionStore;

/// Everything produced by one user turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub delta: EvidenceDelta,
    pub classification: Classification,
    /// Current onboarding stage, `None` once every stage is satisfied.
    pub stage: Option<StageId>,
    /// Full stage list with completion flags.
    pub stages: Vec<Stage>,
    pub phase: Phase,
    pub progress: f64,
    pub next_question: String,
    /// Set on the turn the phase transition fires.
    pub transition_message: Option<String>,
    pub tool_flags: ToolFlags,
    pub change_event: Option<ChangeEvent>,
    /// False when a store failure degraded persistence this turn.
    pub persisted: bool,
}

/// In-memory per-session state the store does not hold.
struct SessionRuntime {
    adaptation: AdaptationTracker,
    classifications: Vec<Classification>,
}

/// The persona classification and conversation-phase orchestration engine.
pub struct ConversationEngine {
    store: Arc<dyn SessionStore>,
    config: EngineConfig,
    extractor: EvidenceExtractor,
    classifier: PersonaClassifier,
    flow: FlowManager,
    enhancer: Option<Arc<dyn ClassificationEnhancer>>,
    sessions: RwLock<HashMap<String, Arc<Mutex<SessionRuntime>>>>,
}

impl ConversationEngine {
    pub fn new(store: Arc<dyn SessionStore>, config: EngineConfig) -> Self {
        Self {
            store,
            classifier: PersonaClassifier::new(config.clone()),
            flow: FlowManager::new(config.clone()),
            config,
            extractor: EvidenceExtractor::new(),
            enhancer: None,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Attach an external classification enhancer. Optional; the engine is
    /// fully functional without one.
    pub fn with_enhancer(mut self, enhancer: Arc<dyn ClassificationEnhancer>) -> Self {
        self.enhancer = Some(enhancer);
        self
    }

    /// Process one user turn: extract → merge → observe → classify →
    /// flow update → adaptation diff, then persist.
    pub async fn process_turn(&self, session_id: &str, message: &str) -> TurnOutcome {
        let runtime = self.runtime(session_id).await;
        let mut runtime = runtime.lock().await;

        let mut evidence = self.load_evidence(session_id).await;
        let mut record = self.load_onboarding(session_id).await;

        let stage_hint = record
            .tracker
            .current_stage()
            .unwrap_or(StageId::ExplorationHistory);

        let delta = self.extractor.extract(message, stage_hint, &evidence);
        let markers = self.extractor.markers(message);

        evidence.merge(&delta);
        self.flow.absorb_markers(&mut record.flow, &markers);
        record
            .tracker
            .observe(&evidence, &record.flow.coverage, record.flow.exploration_seen);

        let classification = self.classify(&evidence).await;

        let transitioned =
            self.flow
                .evaluate_transition(&mut record.flow, &record.tracker, &evidence);
        let transition_message = transitioned
            .then(|| self.flow.transition_message(&classification, &evidence));

        let stage = match record.flow.phase {
            Phase::Onboarding => record.tracker.current_stage(),
            Phase::CareerConversation => None,
        };

        let change_event = runtime
            .adaptation
            .update(&classification, stage, "user_turn");
        runtime.classifications.push(classification.clone());

        let mut persisted = true;
        if let Err(e) = self.store.save_evidence(session_id, &evidence).await {
            warn!(session_id, error = %e, "failed to persist evidence");
            persisted = false;
        }
        if let Err(e) = self.store.save_onboarding(session_id, &record).await {
            warn!(session_id, error = %e, "failed to persist onboarding record");
            persisted = false;
        }

        TurnOutcome {
            delta,
            stage,
            stages: record.tracker.stages(),
            phase: record.flow.phase,
            progress: self.flow.progress(&record.flow, &record.tracker),
            next_question: self.flow.next_question(&record.flow, &record.tracker),
            transition_message,
            tool_flags: self.flow.tool_flags(&record.flow, &evidence),
            change_event,
            classification,
            persisted,
        }
    }

    /// The current phase-appropriate instruction block for the dialogue
    /// generator.
    pub async fn system_directive(&self, session_id: &str) -> String {
        let evidence = self.load_evidence(session_id).await;
        let record = self.load_onboarding(session_id).await;
        let classification = self.classify(&evidence).await;
        self.flow
            .system_directive(&record.flow, &record.tracker, &evidence, &classification)
    }

    /// Register a change subscriber for a session.
    pub async fn subscribe(&self, session_id: &str, callback: ChangeCallback) -> SubscriptionId {
        let runtime = self.runtime(session_id).await;
        let mut runtime = runtime.lock().await;
        runtime.adaptation.subscribe(callback)
    }

    /// Remove a previously registered subscriber.
    pub async fn unsubscribe(&self, session_id: &str, id: SubscriptionId) -> bool {
        let runtime = self.runtime(session_id).await;
        let mut runtime = runtime.lock().await;
        runtime.adaptation.unsubscribe(id)
    }

    /// All classifications produced for a session, in turn order.
    pub async fn classification_history(&self, session_id: &str) -> Vec<Classification> {
        let runtime = self.runtime(session_id).await;
        let runtime = runtime.lock().await;
        runtime.classifications.clone()
    }

    /// Clear all engine-owned state for a session. The raw transcript is
    /// owned by the transport and is unaffected.
    pub async fn reset(&self, session_id: &str) -> Result<()> {
        self.sessions.write().await.remove(session_id);
        self.store.clear_session(session_id).await?;
        Ok(())
    }

    async fn runtime(&self, session_id: &str) -> Arc<Mutex<SessionRuntime>> {
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                Arc::new(Mutex::new(SessionRuntime {
                    adaptation: AdaptationTracker::new(
                        self.config.confidence_change_threshold,
                    ),
                    classifications: Vec::new(),
                }))
            })
            .clone()
    }

    async fn load_evidence(&self, session_id: &str) -> Evidence {
        match self.store.load_evidence(session_id).await {
            Ok(Some(evidence)) => evidence,
            Ok(None) => Evidence::default(),
            Err(e) => {
                warn!(session_id, error = %e, "evidence load failed, using defaults for this turn");
                Evidence::default()
            }
        }
    }

    async fn load_onboarding(&self, session_id: &str) -> OnboardingRecord {
        match self.store.load_onboarding(session_id).await {
            Ok(Some(record)) => record,
            Ok(None) => OnboardingRecord::default(),
            Err(e) => {
                warn!(session_id, error = %e, "onboarding load failed, using defaults for this turn");
                OnboardingRecord::default()
            }
        }
    }

    async fn classify(&self, evidence: &Evidence) -> Classification {
        let baseline = self.classifier.classify(evidence);
        match &self.enhancer {
            Some(enhancer) => {
                refine_with_enhancer(enhancer, self.config.enhancer_timeout, evidence, baseline)
                    .await
            }
            None => baseline,
        }
    }
}
