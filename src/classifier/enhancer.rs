//! Optional external classification refinement.
//!
//! A legacy variant of the classifier could ask an external model to refine
//! the deterministic result. The seam survives as a trait: implementations
//! live outside this crate, and any failure or timeout falls back to the
//! deterministic classification. User-visible behavior never depends on the
//! enhancer being available.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::classifier::persona::Classification;
use crate::error::EnhancerError;
use crate::evidence::Evidence;

/// External refinement of a deterministic classification.
#[async_trait]
pub trait ClassificationEnhancer: Send + Sync {
    /// Refine a baseline classification. May adjust confidence and
    /// reasoning; returned confidence is re-clamped by the caller.
    async fn refine(
        &self,
        evidence: &Evidence,
        baseline: &Classification,
    ) -> Result<Classification, EnhancerError>;
}

/// Run the enhancer with a timeout, falling back to the baseline on any
/// failure. Never returns an error — enhancer trouble is non-fatal.
pub async fn refine_with_enhancer(
    enhancer: &Arc<dyn ClassificationEnhancer>,
    timeout: Duration,
    evidence: &Evidence,
    baseline: Classification,
) -> Classification {
    match tokio::time::timeout(timeout, enhancer.refine(evidence, &baseline)).await {
        Ok(Ok(mut refined)) => {
            refined.confidence = refined.confidence.clamp(0.6, 0.95);
            refined
        }
        Ok(Err(e)) => {
            warn!(error = %e, "classification enhancer failed, using deterministic result");
            fallback(baseline)
        }
        Err(_) => {
            warn!(?timeout, "classification enhancer timed out, using deterministic result");
            fallback(baseline)
        }
    }
}

fn fallback(mut baseline: Classification) -> Classification {
    baseline.reasoning.push_str(" (external refinement unavailable)");
    baseline
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::PersonaClassifier;

    struct FailingEnhancer;

    #[async_trait]
    impl ClassificationEnhancer for FailingEnhancer {
        async fn refine(
            &self,
            _evidence: &Evidence,
            _baseline: &Classification,
        ) -> Result<Classification, EnhancerError> {
            Err(EnhancerError::RequestFailed("unreachable".into()))
        }
    }

    struct SlowEnhancer;

    #[async_trait]
    impl ClassificationEnhancer for SlowEnhancer {
        async fn refine(
            &self,
            _evidence: &Evidence,
            _baseline: &Classification,
        ) -> Result<Classification, EnhancerError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            unreachable!("timeout should fire first")
        }
    }

    struct BoostingEnhancer;

    #[async_trait]
    impl ClassificationEnhancer for BoostingEnhancer {
        async fn refine(
            &self,
            _evidence: &Evidence,
            baseline: &Classification,
        ) -> Result<Classification, EnhancerError> {
            let mut refined = baseline.clone();
            refined.confidence = 1.4; // out of range on purpose
            Ok(refined)
        }
    }

    fn baseline() -> Classification {
        PersonaClassifier::default().classify(&Evidence::default())
    }

    #[tokio::test]
    async fn failure_falls_back_to_baseline() {
        let enhancer: Arc<dyn ClassificationEnhancer> = Arc::new(FailingEnhancer);
        let base = baseline();
        let result =
            refine_with_enhancer(&enhancer, Duration::from_secs(1), &Evidence::default(), base.clone())
                .await;
        assert_eq!(result.persona, base.persona);
        assert_eq!(result.confidence, base.confidence);
        assert!(result.reasoning.contains("refinement unavailable"));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_falls_back_to_baseline() {
        let enhancer: Arc<dyn ClassificationEnhancer> = Arc::new(SlowEnhancer);
        let base = baseline();
        let result =
            refine_with_enhancer(&enhancer, Duration::from_millis(50), &Evidence::default(), base.clone())
                .await;
        assert_eq!(result.persona, base.persona);
        assert!(result.reasoning.contains("refinement unavailable"));
    }

    #[tokio::test]
    async fn refined_confidence_is_reclamped() {
        let enhancer: Arc<dyn ClassificationEnhancer> = Arc::new(BoostingEnhancer);
        let result = refine_with_enhancer(
            &enhancer,
            Duration::from_secs(1),
            &Evidence::default(),
            baseline(),
        )
        .await;
        assert_eq!(result.confidence, 0.95);
    }
}
