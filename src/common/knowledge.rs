//! Disease descriptions and remedies, keyed by canonical label.
//!
//! Lookups never fail. A label without an entry gets boilerplate text chosen
//! by whether the label names a healthy class.

use std::collections::HashMap;
use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::error::StartupError;

pub const NO_DESCRIPTION: &str = "No description available.";
pub const HEALTHY_DESCRIPTION: &str = "Your plant appears to be healthy with no signs of disease.";

pub const HEALTHY_RECOMMENDATIONS: [&str; 5] = [
    "Your plant appears healthy!",
    "Continue regular care and monitoring",
    "Maintain proper watering and fertilization",
    "Keep monitoring for any changes",
    "Ensure adequate sunlight and nutrients",
];

/// Items 2..=6 of the generic disease list; item 1 names the label.
pub const DISEASE_RECOMMENDATIONS: [&str; 5] = [
    "Consult with a local agricultural extension office for specific treatment",
    "Remove and destroy affected plant parts if necessary",
    "Improve air circulation around plants",
    "Monitor plant health regularly",
    "Consider consulting a plant pathologist for detailed diagnosis",
];

/// Case-insensitive "healthy" substring test shared by lookup and diagnosis.
pub fn is_healthy_label(label: &str) -> bool {
    label.to_lowercase().contains("healthy")
}

pub fn generic_description(label: &str) -> String {
    format!("Disease detected: {label}. Please consult agricultural resources for more information.")
}

pub fn generic_disease_recommendations(label: &str) -> Vec<String> {
    std::iter::once(format!("Disease detected: {label}"))
        .chain(DISEASE_RECOMMENDATIONS.iter().map(|s| s.to_string()))
        .collect()
}

pub fn healthy_recommendations() -> Vec<String> {
    HEALTHY_RECOMMENDATIONS.iter().map(|s| s.to_string()).collect()
}

/// One record of the remedies file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub remedies: Vec<String>,
}

impl KnowledgeEntry {
    pub fn new(description: &str, remedies: &[&str]) -> Self {
        Self {
            description: Some(description.to_string()),
            remedies: remedies.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn validate(&self, label: &str) -> Result<(), StartupError> {
        if let Some(description) = &self.description {
            if description.trim().is_empty() {
                return Err(StartupError::KnowledgeMalformed(format!("blank description for '{label}'")));
            }
        }
        if let Some(i) = self.remedies.iter().position(|r| r.trim().is_empty()) {
            return Err(StartupError::KnowledgeMalformed(format!("blank remedy {i} for '{label}'")));
        }
        Ok(())
    }
}

/// Description text and ordered recommendations for one label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseInfo {
    pub description: String,
    pub recommendations: Vec<String>,
}

/// Label → entry mapping, read-only after load. May be empty.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    entries: HashMap<String, KnowledgeEntry>,
}

impl KnowledgeBase {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(entries: HashMap<String, KnowledgeEntry>) -> Result<Self, StartupError> {
        for (label, entry) in entries.iter() {
            entry.validate(label)?;
        }
        Ok(Self { entries })
    }

    /// Parses `{"<label>": {"description": "...", "remedies": ["..."]}, ...}`.
    pub fn from_json_str(json: &str) -> Result<Self, StartupError> {
        let entries: HashMap<String, KnowledgeEntry> = serde_json::from_str(json)
            .map_err(|e| StartupError::KnowledgeMalformed(e.to_string()))?;
        Self::new(entries)
    }

    /// A missing file yields an empty base; a malformed one is an error.
    pub fn from_file_or_empty<P: AsRef<Path>>(path: P) -> Result<Self, StartupError> {
        let path = path.as_ref();
        if !path.exists() {
            log::warn!("Remedies file not found at: {}", path.display());
            return Ok(Self::empty());
        }
        let json = std::fs::read_to_string(path)?;
        let base = Self::from_json_str(&json)?;
        log::info!("Loaded remedies for {} disease classes", base.len());
        Ok(base)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, label: &str) -> Option<&KnowledgeEntry> {
        self.entries.get(label)
    }

    /// Description and recommendations for `label`. Always non-empty.
    ///
    /// A stored entry wins. A stored entry without remedies still falls back
    /// to the healthy or generic list for its recommendations.
    pub fn describe(&self, label: &str) -> DiseaseInfo {
        let healthy = is_healthy_label(label);
        let entry = self.entries.get(label);

        let description = match entry {
            Some(entry) => entry.description.clone().unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            None if healthy => HEALTHY_DESCRIPTION.to_string(),
            None => generic_description(label),
        };

        let recommendations = match entry {
            Some(entry) if !entry.remedies.is_empty() => entry.remedies.clone(),
            _ if healthy => healthy_recommendations(),
            _ => generic_disease_recommendations(label),
        };

        DiseaseInfo { description, recommendations }
    }
}
