use crate::common::{LabelSet, Prediction, ProbabilityVector};
use crate::error::DiagnosisError;

/// Number of ranked classes carried alongside the winning one.
pub const TOP_PREDICTIONS: usize = 3;

/// Winning class of one scorer output.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub label: String,
    pub class_index: usize,
    pub confidence: f32,
    pub top: Vec<Prediction>,
}

/// Maps a probability vector onto its label.
///
/// The vector must have exactly one entry per label; anything else means the
/// model and the label file disagree, which is a deployment problem rather than
/// a bad request.
pub fn resolve(probs: &ProbabilityVector, labels: &LabelSet) -> Result<Resolution, DiagnosisError> {
    if probs.len() != labels.len() {
        return Err(DiagnosisError::Configuration(format!(
            "scorer returned {} probabilities for {} labels", probs.len(), labels.len()
        )));
    }

    let (class_index, confidence) = probs
        .argmax()
        .ok_or_else(|| DiagnosisError::Inference("scorer output holds no comparable value".to_string()))?;

    let label = label_at(labels, class_index)?;
    let top = probs
        .top_k(TOP_PREDICTIONS)
        .into_iter()
        .map(|(i, p)| label_at(labels, i).map(|label| Prediction { label, confidence: p }))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Resolution { label, class_index, confidence, top })
}

fn label_at(labels: &LabelSet, index: usize) -> Result<String, DiagnosisError> {
    labels
        .get(index)
        .map(str::to_string)
        .ok_or_else(|| DiagnosisError::Configuration(format!("no label at index {index}")))
}
