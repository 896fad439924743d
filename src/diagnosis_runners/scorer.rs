use std::fmt;
use std::sync::Arc;
use crate::common::{ProbabilityVector, Tensor};
use crate::error::DiagnosisError;

/// An opaque classification model: `(1, 224, 224, 3)` tensor in, one
/// probability per class out.
///
/// `score` takes `&self`; implementations must tolerate concurrent calls.
pub trait Scorer: Send + Sync {
    fn score(&self, tensor: &Tensor) -> anyhow::Result<ProbabilityVector>;

    /// Output length when the model fixes it, checked against the label set at startup.
    fn output_len(&self) -> Option<usize> {
        None
    }

    fn name(&self) -> String {
        "scorer".to_string()
    }
}

impl<S: Scorer + ?Sized> Scorer for Arc<S> {
    fn score(&self, tensor: &Tensor) -> anyhow::Result<ProbabilityVector> {
        (**self).score(tensor)
    }

    fn output_len(&self) -> Option<usize> {
        (**self).output_len()
    }

    fn name(&self) -> String {
        (**self).name()
    }
}

/// Whether the service can score at all. Decided once at startup.
#[derive(Clone)]
pub enum ScorerState {
    Ready(Arc<dyn Scorer>),
    Unavailable { reason: String },
}

impl ScorerState {
    pub fn ready<S: Scorer + 'static>(scorer: S) -> Self {
        ScorerState::Ready(Arc::new(scorer))
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        ScorerState::Unavailable { reason: reason.into() }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, ScorerState::Ready(_))
    }

    pub fn scorer(&self) -> Result<&Arc<dyn Scorer>, DiagnosisError> {
        match self {
            ScorerState::Ready(scorer) => Ok(scorer),
            ScorerState::Unavailable { reason } => Err(DiagnosisError::ServiceUnavailable(reason.clone())),
        }
    }
}

impl fmt::Debug for ScorerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScorerState::Ready(scorer) => f.debug_tuple("Ready").field(&scorer.name()).finish(),
            ScorerState::Unavailable { reason } => f.debug_struct("Unavailable").field("reason", reason).finish(),
        }
    }
}
