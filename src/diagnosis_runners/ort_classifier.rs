pub mod ort_engine;
mod ort_scorer;

pub use ort_engine::OrtEngine;
pub use ort_scorer::OrtScorer;
