//! Wires normalizer, scorer, label resolver and knowledge base into a single
//! request pipeline.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use chrono::Utc;
use image::ImageFormat;
use parking_lot::Mutex;
use crate::common::{Diagnosis, HealthStatus, KnowledgeBase, LabelSet, ModelConfig, ProbabilityVector,
                    ServiceHealth, Tensor, UNKNOWN_CROP, is_healthy_label};
use crate::data::TimeCalc;
use crate::diagnosis_runners::{label_resolver, InferenceProcess, Normalizer, OrtScorer, Resolution, Scorer, ScorerState};
use crate::error::{DiagnosisError, StartupError};
use crate::utils;

/// One upload as handed over by the transport layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiagnosisRequest<'a> {
    pub bytes: &'a [u8],
    /// Passed through to the result; `"Unknown"` when absent.
    pub crop_type: Option<&'a str>,
    /// Encoding the client claimed, if any. Must agree with the bytes.
    pub declared_format: Option<ImageFormat>,
}

impl<'a> DiagnosisRequest<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, ..Default::default() }
    }

    pub fn with_crop_type(mut self, crop_type: &'a str) -> Self {
        self.crop_type = Some(crop_type);
        self
    }

    pub fn with_declared_format(mut self, format: ImageFormat) -> Self {
        self.declared_format = Some(format);
        self
    }
}

/// Immutable after construction apart from the timing stats; share it behind an `Arc`.
#[derive(Debug)]
pub struct DiagnosisService {
    scorer: ScorerState,
    labels: LabelSet,
    knowledge: KnowledgeBase,
    normalizer: Normalizer,
    profile: bool,
    stats: Mutex<TimeCalc>,
}

impl DiagnosisService {
    pub fn builder() -> DiagnosisServiceBuilder {
        DiagnosisServiceBuilder::default()
    }

    /// Loads labels, then the optional knowledge file, then the model.
    ///
    /// Label and knowledge problems abort startup. A model that fails to load
    /// leaves the service up in the unavailable state.
    pub fn load(config: &ModelConfig) -> Result<Self, StartupError> {
        log::info!("Loading diagnosis service\n{}", config);

        let labels = LabelSet::from_file(&config.labels_path)?;
        log::info!("Loaded {} class names", labels.len());
        log::info!("Classes: {}", labels.preview(5));

        let knowledge = match &config.remedies_path {
            Some(path) => KnowledgeBase::from_file_or_empty(path)?,
            None => KnowledgeBase::empty(),
        };

        let scorer = match OrtScorer::new(&config.to_config_ort()) {
            Ok(scorer) => {
                log::info!("Model loaded successfully from: {}", config.weights_path);
                ScorerState::ready(scorer)
            }
            Err(err) => {
                log::error!("Failed to load model: {err:#}");
                log::error!("Diagnosis requests will be rejected until the service is restarted");
                ScorerState::unavailable(format!("{err:#}"))
            }
        };

        Self::builder()
            .labels(labels)
            .knowledge(knowledge)
            .scorer_state(scorer)
            .normalizer(Normalizer::new(config.resize_filter, config.pixel_transform))
            .profile(config.profile)
            .build()
    }

    pub fn diagnose(&self, bytes: &[u8]) -> Result<Diagnosis, DiagnosisError> {
        self.diagnose_with(&DiagnosisRequest::new(bytes))
    }

    /// Runs one request end to end. Safe to call from any number of threads.
    pub fn diagnose_with(&self, request: &DiagnosisRequest<'_>) -> Result<Diagnosis, DiagnosisError> {
        let timestamp = Utc::now();

        // no point decoding an upload nobody can score
        self.scorer.scorer()?;

        let (resolution, timings) = self.forward(request, self.profile).map_err(|err| {
            match &err {
                DiagnosisError::Decode(msg) => log::warn!("Rejected upload: {msg}"),
                other => log::error!("Diagnosis failed: {other}"),
            }
            err
        })?;
        self.stats.lock().record(&timings);

        let info = self.knowledge.describe(&resolution.label);
        let diagnosis = Diagnosis {
            is_healthy: is_healthy_label(&resolution.label),
            confidence_percentage: utils::round_to(resolution.confidence as f64 * 100.0, 2),
            label: resolution.label,
            class_index: resolution.class_index,
            confidence: resolution.confidence,
            description: info.description,
            recommendations: info.recommendations,
            crop_type: request.crop_type.unwrap_or(UNKNOWN_CROP).to_string(),
            top_predictions: resolution.top,
            timestamp,
        };

        log::info!("Prediction: {}", diagnosis.summary());
        Ok(diagnosis)
    }

    /// Runs the request on tokio's blocking pool.
    pub async fn diagnose_async(
        self: Arc<Self>,
        bytes: Vec<u8>,
        crop_type: Option<String>,
    ) -> Result<Diagnosis, DiagnosisError> {
        tokio::task::spawn_blocking(move || {
            let mut request = DiagnosisRequest::new(&bytes);
            request.crop_type = crop_type.as_deref();
            self.diagnose_with(&request)
        })
        .await
        .map_err(|e| DiagnosisError::Inference(format!("diagnosis task failed: {e}")))?
    }

    pub fn health(&self) -> ServiceHealth {
        let model_loaded = self.is_model_loaded();
        ServiceHealth {
            status: if model_loaded { HealthStatus::Healthy } else { HealthStatus::Degraded },
            model_loaded,
            total_classes: self.labels.len(),
            timestamp: Utc::now(),
        }
    }

    /// Label names in model order.
    pub fn classes(&self) -> Result<&[String], DiagnosisError> {
        self.scorer.scorer()?;
        Ok(self.labels.names())
    }

    pub fn is_model_loaded(&self) -> bool {
        self.scorer.is_available()
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Per-stage timings of all successful requests so far.
    pub fn stats(&self) -> TimeCalc {
        self.stats.lock().clone()
    }
}

impl InferenceProcess<DiagnosisRequest<'_>> for DiagnosisService {
    type Output = Resolution;

    fn preprocess(&self, input: &DiagnosisRequest<'_>) -> Result<Tensor, DiagnosisError> {
        self.normalizer.normalize_with(input.bytes, input.declared_format)
    }

    fn inference(&self, xs: &Tensor) -> Result<ProbabilityVector, DiagnosisError> {
        let scorer = self.scorer.scorer()?;
        match panic::catch_unwind(AssertUnwindSafe(|| scorer.score(xs))) {
            Ok(Ok(probs)) => Ok(probs),
            Ok(Err(err)) => Err(DiagnosisError::Inference(format!("{err:#}"))),
            Err(payload) => Err(DiagnosisError::Inference(format!(
                "scorer panicked: {}", utils::panic_message(payload.as_ref())
            ))),
        }
    }

    fn postprocess(&self, ys: ProbabilityVector) -> Result<Resolution, DiagnosisError> {
        label_resolver::resolve(&ys, &self.labels)
    }
}

/// Assembles a [`DiagnosisService`] from parts that are already loaded.
#[derive(Default)]
pub struct DiagnosisServiceBuilder {
    labels: Option<LabelSet>,
    knowledge: KnowledgeBase,
    scorer: Option<ScorerState>,
    normalizer: Normalizer,
    profile: bool,
}

impl DiagnosisServiceBuilder {
    pub fn labels(mut self, labels: LabelSet) -> Self {
        self.labels = Some(labels);
        self
    }

    pub fn knowledge(mut self, knowledge: KnowledgeBase) -> Self {
        self.knowledge = knowledge;
        self
    }

    pub fn scorer<S: Scorer + 'static>(mut self, scorer: S) -> Self {
        self.scorer = Some(ScorerState::ready(scorer));
        self
    }

    pub fn shared_scorer(mut self, scorer: Arc<dyn Scorer>) -> Self {
        self.scorer = Some(ScorerState::Ready(scorer));
        self
    }

    pub fn scorer_state(mut self, state: ScorerState) -> Self {
        self.scorer = Some(state);
        self
    }

    pub fn unavailable(mut self, reason: &str) -> Self {
        self.scorer = Some(ScorerState::unavailable(reason));
        self
    }

    pub fn normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn profile(mut self, profile: bool) -> Self {
        self.profile = profile;
        self
    }

    /// Fails when no labels were given, or when the scorer fixes an output
    /// length that differs from the label count.
    pub fn build(self) -> Result<DiagnosisService, StartupError> {
        let labels = self.labels.ok_or(StartupError::LabelsNotSet)?;
        let scorer = self
            .scorer
            .unwrap_or_else(|| ScorerState::unavailable("no scorer configured"));

        if let ScorerState::Ready(s) = &scorer {
            if let Some(n) = s.output_len() {
                if n != labels.len() {
                    return Err(StartupError::LabelCountMismatch { scorer: n, labels: labels.len() });
                }
            }
        }

        Ok(DiagnosisService {
            scorer,
            labels,
            knowledge: self.knowledge,
            normalizer: self.normalizer,
            profile: self.profile,
            stats: Mutex::new(TimeCalc::default()),
        })
    }
}
