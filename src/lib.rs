mod utils;
mod diagnosis_service;
pub mod error;
pub mod data;
pub mod diagnosis_runners;
pub mod common;

use std::time::Instant;
use crate::common::{Diagnosis, ModelConfig};

pub use diagnosis_service::{DiagnosisRequest, DiagnosisService, DiagnosisServiceBuilder};
pub use error::{DiagnosisError, Result, StartupError};

/// Builds the service from on-disk assets.
///
/// Fails only for label or knowledge problems; a model that does not load
/// yields a service that reports itself degraded.
pub fn init_service(model_details: &ModelConfig) -> Result<DiagnosisService, StartupError> {
    log::info!("Initializing diagnosis service with ({}) execution provider", model_details.inference_device);
    let service = DiagnosisService::load(model_details)?;
    if !service.is_model_loaded() {
        log::warn!("Service started without a model; only health checks will succeed");
    }
    Ok(service)
}

pub fn run_diagnosis(service: &DiagnosisService, bytes: &[u8], crop_type: Option<&str>) -> Result<Diagnosis> {
    let now = Instant::now();

    let mut request = DiagnosisRequest::new(bytes);
    request.crop_type = crop_type;
    let diagnosis = service.diagnose_with(&request)?;

    log::debug!("Processing time: {:?}", now.elapsed());

    Ok(diagnosis)
}
