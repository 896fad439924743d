use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Crop type reported when the caller did not pass one.
pub const UNKNOWN_CROP: &str = "Unknown";

/// One ranked class from the scorer output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub confidence: f32,
}

/// Result of one diagnosis request. Built fresh per call, never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub label: String,
    pub class_index: usize,
    /// Maximum probability of the scorer output, in `[0, 1]`.
    pub confidence: f32,
    /// `confidence * 100` rounded to two decimal places.
    pub confidence_percentage: f64,
    pub is_healthy: bool,
    pub description: String,
    pub recommendations: Vec<String>,
    /// Caller-supplied crop type, passed through uninterpreted.
    pub crop_type: String,
    pub top_predictions: Vec<Prediction>,
    /// Captured when the request entered the service.
    pub timestamp: DateTime<Utc>,
}

impl Diagnosis {
    pub fn summary(&self) -> String {
        format!("{} ({:.2}% confidence)", self.label, self.confidence_percentage)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

/// Availability report that does not touch the scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub status: HealthStatus,
    pub model_loaded: bool,
    pub total_classes: usize,
    pub timestamp: DateTime<Utc>,
}
