pub mod image_ops;
pub mod inference_process;
pub mod label_resolver;
pub mod ort_classifier;
mod scorer;

pub use image_ops::{Normalizer, ResizeFilter};
pub use inference_process::InferenceProcess;
pub use label_resolver::{resolve, Resolution, TOP_PREDICTIONS};
pub use ort_classifier::{OrtEngine, OrtScorer};
pub use scorer::{Scorer, ScorerState};
