//! Error types for the diagnosis pipeline.
//!
//! `DiagnosisError` is what a single request can fail with. `StartupError` is
//! what loading the label set, knowledge file or service assembly can fail with.

use std::path::PathBuf;
use thiserror::Error;

/// Per-request failure. The four kinds stay distinct all the way to the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiagnosisError {
    /// The uploaded bytes are not a supported, well-formed image.
    #[error("Error processing image: {0}")]
    Decode(String),

    /// The scorer never loaded. Persistent until the service is rebuilt.
    #[error("Model not loaded: {0}")]
    ServiceUnavailable(String),

    /// Label set and scorer output disagree, or a tensor has the wrong shape.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The scorer failed while running.
    #[error("Prediction failed: {0}")]
    Inference(String),
}

impl DiagnosisError {
    /// HTTP-equivalent status for a transport layer wrapping the pipeline.
    pub fn status_code(&self) -> u16 {
        match self {
            DiagnosisError::Decode(_) => 400,
            DiagnosisError::ServiceUnavailable(_) => 503,
            DiagnosisError::Configuration(_) | DiagnosisError::Inference(_) => 500,
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, DiagnosisError::Decode(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            DiagnosisError::Decode(_) => "decode",
            DiagnosisError::ServiceUnavailable(_) => "service_unavailable",
            DiagnosisError::Configuration(_) => "configuration",
            DiagnosisError::Inference(_) => "inference",
        }
    }
}

impl From<image::ImageError> for DiagnosisError {
    fn from(err: image::ImageError) -> Self {
        DiagnosisError::Decode(err.to_string())
    }
}

/// Failure while assembling a `DiagnosisService`.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Class names file not found at: {}", .0.display())]
    LabelsMissing(PathBuf),

    #[error("Malformed class names: {0}")]
    LabelsMalformed(String),

    #[error("Malformed remedies data: {0}")]
    KnowledgeMalformed(String),

    #[error("Scorer produces {scorer} outputs but {labels} class names were loaded")]
    LabelCountMismatch { scorer: usize, labels: usize },

    #[error("No class names were supplied to the service builder")]
    LabelsNotSet,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = DiagnosisError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_keep_kinds_apart() {
        assert_eq!(DiagnosisError::Decode("x".into()).status_code(), 400);
        assert_eq!(DiagnosisError::ServiceUnavailable("x".into()).status_code(), 503);
        assert_eq!(DiagnosisError::Configuration("x".into()).status_code(), 500);
        assert_eq!(DiagnosisError::Inference("x".into()).status_code(), 500);
        assert_ne!(
            DiagnosisError::Configuration("x".into()).kind(),
            DiagnosisError::Inference("x".into()).kind()
        );
    }

    #[test]
    fn test_only_decode_is_client_error() {
        assert!(DiagnosisError::Decode("bad".into()).is_client_error());
        assert!(!DiagnosisError::ServiceUnavailable("down".into()).is_client_error());
        assert!(!DiagnosisError::Inference("boom".into()).is_client_error());
    }

    #[test]
    fn test_error_display() {
        let err = DiagnosisError::Inference("session exploded".to_string());
        assert_eq!(err.to_string(), "Prediction failed: session exploded");

        let err = StartupError::LabelCountMismatch { scorer: 38, labels: 3 };
        assert_eq!(err.to_string(), "Scorer produces 38 outputs but 3 class names were loaded");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: StartupError = io_err.into();
        assert!(matches!(err, StartupError::Io(_)));
    }
}
