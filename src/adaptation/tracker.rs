//! Change detection between successive classifications.
//!
//! One tracker per session. `update` diffs the new classification and
//! onboarding stage against the tracked state; when nothing changed it
//! returns `None` — callers treat that as "nothing to report", not an
//! error. When something changed it emits a [`ChangeEvent`], appends it to
//! the in-memory history, and notifies subscribers in registration order.
//! A panicking subscriber is caught and logged; it never prevents the
//! remaining subscribers from running, and `update` itself never fails.

use std::panic::{AssertUnwindSafe, catch_unwind};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::classifier::{Classification, PersonaType};
use crate::onboarding::StageId;

/// What kind of change an event reports, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Persona,
    Confidence,
    Stage,
}

/// The comparable slice of session state captured before and after.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StateSnapshot {
    pub persona: PersonaType,
    pub confidence: f64,
    pub stage: Option<StageId>,
}

/// A detected change with recommended conversation-style adjustments.
#[derive(Debug, Clone, Serialize)]
pub struct ChangeEvent {
    pub id: Uuid,
    pub change_type: ChangeType,
    pub previous: StateSnapshot,
    pub new: StateSnapshot,
    /// What prompted this update (e.g. the turn's message id or "turn").
    pub trigger: String,
    /// Short imperative adjustments for the dialogue generator.
    pub recommended_actions: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// Mutable per-session adaptation state.
#[derive(Debug, Clone, Serialize)]
pub struct AdaptationState {
    pub current_persona: PersonaType,
    pub previous_persona: Option<PersonaType>,
    pub confidence: f64,
    pub conversation_stage: Option<StageId>,
    /// Current conversational stance derived from the persona — the short
    /// form of the per-persona recommended actions.
    pub context: String,
    pub last_update: DateTime<Utc>,
}

/// Subscriber callback. Invoked synchronously, in registration order.
pub type ChangeCallback = Box<dyn Fn(&ChangeEvent) + Send + Sync>;

/// Handle for removing a subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

/// Tracks one session's adaptation state, change history, and subscribers.
pub struct AdaptationTracker {
    state: Option<AdaptationState>,
    history: Vec<ChangeEvent>,
    subscribers: Vec<(SubscriptionId, ChangeCallback)>,
    /// Confidence delta below which a change is noise.
    confidence_threshold: f64,
}

impl AdaptationTracker {
    pub fn new(confidence_threshold: f64) -> Self {
        Self {
            state: None,
            history: Vec::new(),
            subscribers: Vec::new(),
            confidence_threshold,
        }
    }

    /// Diff the new classification and stage against the tracked state.
    ///
    /// The first update only seeds the state — there is nothing to compare
    /// against yet, so it returns `None`.
    pub fn update(
        &mut self,
        classification: &Classification,
        stage: Option<StageId>,
        trigger: &str,
    ) -> Option<ChangeEvent> {
        let Some(state) = &self.state else {
            self.state = Some(AdaptationState {
                current_persona: classification.persona,
                previous_persona: None,
                confidence: classification.confidence,
                conversation_stage: stage,
                context: persona_context(classification.persona).to_string(),
                last_update: Utc::now(),
            });
            return None;
        };

        let persona_changed = state.current_persona != classification.persona;
        let confidence_changed =
            (state.confidence - classification.confidence).abs() > self.confidence_threshold;
        let stage_changed = state.conversation_stage != stage;

        if !persona_changed && !confidence_changed && !stage_changed {
            debug!(trigger, "no adaptation change detected");
            return None;
        }

        let change_type = if persona_changed {
            ChangeType::Persona
        } else if confidence_changed {
            ChangeType::Confidence
        } else {
            ChangeType::Stage
        };

        let previous = StateSnapshot {
            persona: state.current_persona,
            confidence: state.confidence,
            stage: state.conversation_stage,
        };
        let new = StateSnapshot {
            persona: classification.persona,
            confidence: classification.confidence,
            stage,
        };

        let event = ChangeEvent {
            id: Uuid::new_v4(),
            change_type,
            previous,
            new,
            trigger: trigger.to_string(),
            recommended_actions: recommended_actions(&previous, &new, self.confidence_threshold),
            timestamp: Utc::now(),
        };

        let previous_persona = state.current_persona;
        self.state = Some(AdaptationState {
            current_persona: classification.persona,
            previous_persona: Some(previous_persona),
            confidence: classification.confidence,
            conversation_stage: stage,
            context: persona_context(classification.persona).to_string(),
            last_update: event.timestamp,
        });

        self.history.push(event.clone());
        self.notify(&event);
        Some(event)
    }

    fn notify(&self, event: &ChangeEvent) {
        for (id, callback) in &self.subscribers {
            if catch_unwind(AssertUnwindSafe(|| callback(event))).is_err() {
                warn!(subscriber = %id.0, "adaptation subscriber panicked");
            }
        }
    }

    /// Register a subscriber. Returns the id needed to unsubscribe.
    pub fn subscribe(&mut self, callback: ChangeCallback) -> SubscriptionId {
        let id = SubscriptionId(Uuid::new_v4());
        self.subscribers.push((id, callback));
        id
    }

    /// Remove a subscriber. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub fn state(&self) -> Option<&AdaptationState> {
        self.state.as_ref()
    }

    pub fn history(&self) -> &[ChangeEvent] {
        &self.history
    }
}

/// Static per-persona advice plus dynamic deltas from the diff.
fn recommended_actions(
    previous: &StateSnapshot,
    new: &StateSnapshot,
    confidence_threshold: f64,
) -> Vec<String> {
    let mut actions: Vec<String> = persona_actions(new.persona)
        .iter()
        .map(|s| s.to_string())
        .collect();

    let delta = new.confidence - previous.confidence;
    if delta > confidence_threshold {
        actions.push("Confidence increased — provide more specific guidance".to_string());
    } else if delta < -confidence_threshold {
        actions.push("Confidence dropped — slow down and re-establish support".to_string());
    }
    if previous.stage != new.stage {
        actions.push("Onboarding stage advanced — move to the next topic".to_string());
    }
    actions
}

/// One-line stance summary carried in [`AdaptationState::context`].
fn persona_context(persona: PersonaType) -> &'static str {
    match persona {
        PersonaType::UncertainUnengaged => "gentle pacing, reassurance before options",
        PersonaType::ExploringUndecided => "comparing options, surfacing trade-offs",
        PersonaType::TentativelyDecided => "validating the direction, probing conviction",
        PersonaType::FocusedConfident => "brisk pacing, concrete next steps",
    }
}

fn persona_actions(persona: PersonaType) -> &'static [&'static str] {
    match persona {
        PersonaType::UncertainUnengaged => &[
            "Slow the pace",
            "Offer reassurance and structure",
            "Suggest low-stakes exploration steps",
        ],
        PersonaType::ExploringUndecided => &[
            "Compare options side by side",
            "Surface trade-offs between mentioned careers",
        ],
        PersonaType::TentativelyDecided => &[
            "Validate the chosen direction",
            "Probe conviction gently",
        ],
        PersonaType::FocusedConfident => &[
            "Increase pace",
            "Give specific, practical guidance",
        ],
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::classifier::ClassificationStage;

    fn classification(persona: PersonaType, confidence: f64) -> Classification {
        Classification {
            persona,
            confidence,
            stage: ClassificationStage::Provisional,
            reasoning: "test".to_string(),
            timestamp: Utc::now(),
        }
    }

    fn tracker() -> AdaptationTracker {
        AdaptationTracker::new(0.1)
    }

    #[test]
    fn first_update_seeds_state_without_event() {
        let mut t = tracker();
        let event = t.update(
            &classification(PersonaType::ExploringUndecided, 0.75),
            Some(StageId::Rapport),
            "turn",
        );
        assert!(event.is_none());
        assert!(t.history().is_empty());
        assert_eq!(
            t.state().unwrap().current_persona,
            PersonaType::ExploringUndecided
        );
    }

    #[test]
    fn context_follows_the_current_persona() {
        let mut t = tracker();
        t.update(
            &classification(PersonaType::ExploringUndecided, 0.75),
            None,
            "turn",
        );
        assert_eq!(
            t.state().unwrap().context,
            "comparing options, surfacing trade-offs"
        );

        t.update(
            &classification(PersonaType::FocusedConfident, 0.9),
            None,
            "turn",
        );
        assert_eq!(t.state().unwrap().context, "brisk pacing, concrete next steps");
    }

    #[test]
    fn identical_update_is_a_noop() {
        let mut t = tracker();
        let c = classification(PersonaType::ExploringUndecided, 0.75);
        t.update(&c, Some(StageId::Rapport), "turn");
        let event = t.update(&c, Some(StageId::Rapport), "turn");
        assert!(event.is_none());
        assert!(t.history().is_empty());
    }

    #[test]
    fn persona_change_outranks_confidence_and_stage() {
        let mut t = tracker();
        t.update(
            &classification(PersonaType::ExploringUndecided, 0.75),
            Some(StageId::Rapport),
            "turn",
        );
        // All three change at once: persona wins.
        let event = t
            .update(
                &classification(PersonaType::FocusedConfident, 0.9),
                Some(StageId::Motivation),
                "turn",
            )
            .unwrap();
        assert_eq!(event.change_type, ChangeType::Persona);
        assert_eq!(event.previous.persona, PersonaType::ExploringUndecided);
        assert_eq!(event.new.persona, PersonaType::FocusedConfident);
        assert_eq!(t.history().len(), 1);
    }

    #[test]
    fn small_confidence_drift_is_noise() {
        let mut t = tracker();
        t.update(
            &classification(PersonaType::ExploringUndecided, 0.75),
            None,
            "turn",
        );
        let event = t.update(
            &classification(PersonaType::ExploringUndecided, 0.8),
            None,
            "turn",
        );
        assert!(event.is_none());
    }

    #[test]
    fn confidence_jump_emits_confidence_event_with_dynamic_action() {
        let mut t = tracker();
        t.update(
            &classification(PersonaType::ExploringUndecided, 0.6),
            None,
            "turn",
        );
        let event = t
            .update(
                &classification(PersonaType::ExploringUndecided, 0.85),
                None,
                "turn",
            )
            .unwrap();
        assert_eq!(event.change_type, ChangeType::Confidence);
        assert!(
            event
                .recommended_actions
                .iter()
                .any(|a| a.contains("more specific guidance"))
        );
    }

    #[test]
    fn stage_change_alone_emits_stage_event() {
        let mut t = tracker();
        let c = classification(PersonaType::TentativelyDecided, 0.7);
        t.update(&c, Some(StageId::Rapport), "turn");
        let event = t.update(&c, Some(StageId::LifeStage), "turn").unwrap();
        assert_eq!(event.change_type, ChangeType::Stage);
        assert!(
            event
                .recommended_actions
                .iter()
                .any(|a| a.contains("next topic"))
        );
    }

    #[test]
    fn subscribers_run_in_order_and_survive_a_panic() {
        let mut t = tracker();
        let calls = Arc::new(AtomicUsize::new(0));

        let first = calls.clone();
        t.subscribe(Box::new(move |_| {
            first.fetch_add(1, Ordering::SeqCst);
        }));
        t.subscribe(Box::new(|_| panic!("bad subscriber")));
        let third = calls.clone();
        t.subscribe(Box::new(move |_| {
            third.fetch_add(10, Ordering::SeqCst);
        }));

        t.update(
            &classification(PersonaType::ExploringUndecided, 0.75),
            None,
            "turn",
        );
        t.update(
            &classification(PersonaType::FocusedConfident, 0.9),
            None,
            "turn",
        );

        // Both surviving subscribers ran despite the middle one panicking.
        assert_eq!(calls.load(Ordering::SeqCst), 11);
    }

    #[test]
    fn unsubscribe_removes_callback() {
        let mut t = tracker();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let id = t.subscribe(Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        assert!(t.unsubscribe(id));
        assert!(!t.unsubscribe(id));

        t.update(
            &classification(PersonaType::ExploringUndecided, 0.75),
            None,
            "turn",
        );
        t.update(
            &classification(PersonaType::FocusedConfident, 0.9),
            None,
            "turn",
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn actions_follow_the_new_persona() {
        let mut t = tracker();
        t.update(
            &classification(PersonaType::FocusedConfident, 0.9),
            None,
            "turn",
        );
        let event = t
            .update(
                &classification(PersonaType::UncertainUnengaged, 0.8),
                None,
                "turn",
            )
            .unwrap();
        assert!(
            event
                .recommended_actions
                .iter()
                .any(|a| a.contains("Slow the pace"))
        );
    }
}
