use std::time::{Duration, Instant};
use crate::common::{ProbabilityVector, Tensor};
use crate::error::DiagnosisError;
use crate::utils;

/// The three pipeline stages of one diagnosis.
pub trait InferenceProcess<I: ?Sized> {
    type Output;

    /// Pre-process the input data.
    fn preprocess(&self, input: &I) -> Result<Tensor, DiagnosisError>;

    /// Executes the model on the preprocessed data.
    fn inference(&self, xs: &Tensor) -> Result<ProbabilityVector, DiagnosisError>;

    /// Post-process the model's output.
    fn postprocess(&self, ys: ProbabilityVector) -> Result<Self::Output, DiagnosisError>;

    /// Executes the full pipeline.
    fn run(&self, input: &I) -> Result<Self::Output, DiagnosisError> {
        let xs = self.preprocess(input)?;
        let ys = self.inference(&xs)?;
        self.postprocess(ys)
    }

    /// Executes the full pipeline, returning the time spent in each stage.
    fn forward(&self, input: &I, profile: bool) -> Result<(Self::Output, [Duration; 3]), DiagnosisError> {
        let started = Instant::now();

        let t_pre = Instant::now();
        let xs = self.preprocess(input)?;
        let t_pre = t_pre.elapsed();

        let mut elapsed = started.elapsed();
        elapsed = utils::trace("Preprocessing input", started, elapsed);

        let t_exe = Instant::now();
        let ys = self.inference(&xs)?;
        let t_exe = t_exe.elapsed();

        elapsed = utils::trace("Scoring", started, elapsed);

        let t_post = Instant::now();
        let output = self.postprocess(ys)?;
        let t_post = t_post.elapsed();

        utils::trace("Postprocessing", started, elapsed);

        if profile {
            log::info!("> Preprocess: {t_pre:?} | Inference: {t_exe:?} | Postprocess: {t_post:?}");
        }

        Ok((output, [t_pre, t_exe, t_post]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two classes; class 1 wins when the first pixel's mean is above 0.5.
    struct MeanPixel;

    impl InferenceProcess<[f32; 3]> for MeanPixel {
        type Output = usize;

        fn preprocess(&self, input: &[f32; 3]) -> Result<Tensor, DiagnosisError> {
            let mut xs = vec![0.0; Tensor::SHAPE.iter().product()];
            xs[..3].copy_from_slice(input);
            Tensor::from_shape_vec(xs)
        }

        fn inference(&self, xs: &Tensor) -> Result<ProbabilityVector, DiagnosisError> {
            let mean = (0..3).map(|c| xs.pixel(0, 0, c)).sum::<f32>() / 3.0;
            Ok(vec![1.0 - mean, mean].into())
        }

        fn postprocess(&self, ys: ProbabilityVector) -> Result<usize, DiagnosisError> {
            ys.argmax()
                .map(|(i, _)| i)
                .ok_or_else(|| DiagnosisError::Inference("empty".to_string()))
        }
    }

    #[test]
    fn test_run_and_forward_agree() {
        let input: [f32; 3] = [0.9, 0.8, 0.7];
        assert_eq!(MeanPixel.run(&input).unwrap(), 1);

        let (output, timings) = MeanPixel.forward(&input, true).unwrap();
        assert_eq!(output, 1);
        assert_eq!(timings.len(), 3);

        assert_eq!(MeanPixel.run(&[0.1f32, 0.0, 0.2]).unwrap(), 0);
    }

    #[test]
    fn test_stage_error_stops_pipeline() {
        let err = MeanPixel.run(&[f32::NAN; 3]).unwrap_err();
        assert!(matches!(err, DiagnosisError::Inference(_)));
    }
}
