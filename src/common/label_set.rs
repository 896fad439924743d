use std::collections::HashSet;
use std::path::Path;
use crate::error::StartupError;

/// Ordered class names. Index `i` names output position `i` of the scorer.
///
/// Loaded once at startup and never reordered afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSet {
    names: Vec<String>,
}

impl LabelSet {
    /// Validates and wraps a list of class names.
    ///
    /// Rejects an empty list, blank names and duplicates: any of those would
    /// break the index alignment with the scorer output.
    pub fn new(names: Vec<String>) -> Result<Self, StartupError> {
        if names.is_empty() {
            return Err(StartupError::LabelsMalformed("class names list is empty".to_string()));
        }

        let mut seen = HashSet::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(StartupError::LabelsMalformed(format!("class name at index {i} is blank")));
            }
            if !seen.insert(name.as_str()) {
                return Err(StartupError::LabelsMalformed(format!(
                    "duplicate class name '{name}' at index {i}"
                )));
            }
        }

        Ok(Self { names })
    }

    /// Parses a JSON array of strings, e.g. `["Tomato_Healthy", "Tomato_Blight"]`.
    pub fn from_json_str(json: &str) -> Result<Self, StartupError> {
        let names: Vec<String> = serde_json::from_str(json)
            .map_err(|e| StartupError::LabelsMalformed(format!("expected a JSON array of strings: {e}")))?;
        Self::new(names)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, StartupError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(StartupError::LabelsMissing(path.to_path_buf()));
        }
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// The first `n` names, for startup logging.
    pub fn preview(&self, n: usize) -> String {
        if self.names.len() > n {
            format!("{:?}...", &self.names[..n])
        } else {
            format!("{:?}", self.names)
        }
    }
}
