use std::time::Instant;
use anyhow::Result;
use crate::common::{ProbabilityVector, Tensor};
use crate::data::ConfigOrt;
use crate::diagnosis_runners::ort_classifier::ort_engine::OrtEngine;
use crate::diagnosis_runners::Scorer;

/// Scorer backed by an ONNX export of the classifier.
#[derive(Debug)]
pub struct OrtScorer {
    engine: OrtEngine,
    apply_softmax: bool,
    profile: bool,
}

impl OrtScorer {
    pub fn new(config: &ConfigOrt) -> Result<Self> {
        let engine = OrtEngine::new(config)?;
        log::info!(
            "Model loaded: {} | input '{}' {:?} | output '{}' with {} classes",
            config.onnx_path,
            engine.input_name(),
            engine.input_dims(),
            engine.output_name(),
            engine.output_len().map_or_else(|| "dynamic".to_string(), |n| n.to_string()),
        );
        let scorer = Self {
            engine,
            apply_softmax: config.apply_softmax,
            profile: config.profile,
        };

        // first runs pay for allocator and EP warm-up
        for i in 0..config.num_dry_run {
            let t = Instant::now();
            scorer.score(&Tensor::zeros())?;
            log::debug!("Dry run {} took {:?}", i + 1, t.elapsed());
        }

        Ok(scorer)
    }
}

impl Scorer for OrtScorer {
    fn score(&self, tensor: &Tensor) -> Result<ProbabilityVector> {
        let t = Instant::now();
        let ys = ProbabilityVector::from(self.engine.run(tensor)?);
        if self.profile {
            log::info!("[Profile] onnxruntime: {:?}", t.elapsed());
        }

        Ok(if self.apply_softmax { ys.softmax() } else { ys })
    }

    fn output_len(&self) -> Option<usize> {
        self.engine.output_len()
    }

    fn name(&self) -> String {
        format!("onnxruntime:{}", self.engine.device())
    }
}
