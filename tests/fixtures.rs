#![allow(dead_code)]

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use parking_lot::Mutex;
use cropix_detect::common::{LabelSet, ProbabilityVector, Tensor};
use cropix_detect::diagnosis_runners::Scorer;

pub(crate) const TOMATO_LABELS: [&str; 3] = ["Tomato_Healthy", "Tomato_Blight", "Tomato_Rust"];

pub(crate) fn tomato_labels() -> LabelSet {
    LabelSet::new(TOMATO_LABELS.iter().map(|s| s.to_string()).collect()).unwrap()
}

/// A leafy-looking gradient, encoded in the given format.
pub(crate) fn leaf_image_bytes(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let image = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width) as u8, 160, (y * 255 / height) as u8])
    });
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image).write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

/// Returns a fixed vector and remembers the shape of every tensor it saw.
pub(crate) struct FixedScorer {
    output: Vec<f32>,
    fixed_len: Option<usize>,
    pub(crate) calls: AtomicUsize,
    pub(crate) shapes: Mutex<Vec<Vec<usize>>>,
}

impl FixedScorer {
    pub(crate) fn new(output: &[f32]) -> Self {
        Self {
            output: output.to_vec(),
            fixed_len: None,
            calls: AtomicUsize::new(0),
            shapes: Mutex::new(Vec::new()),
        }
    }

    /// Also reports its output length up front, like an ONNX graph with a static class axis.
    pub(crate) fn with_fixed_len(mut self) -> Self {
        self.fixed_len = Some(self.output.len());
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Scorer for FixedScorer {
    fn score(&self, tensor: &Tensor) -> anyhow::Result<ProbabilityVector> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.shapes.lock().push(tensor.shape().to_vec());
        Ok(self.output.clone().into())
    }

    fn output_len(&self) -> Option<usize> {
        self.fixed_len
    }

    fn name(&self) -> String {
        "fixed".to_string()
    }
}

pub(crate) struct FailingScorer;

impl Scorer for FailingScorer {
    fn score(&self, _tensor: &Tensor) -> anyhow::Result<ProbabilityVector> {
        anyhow::bail!("device lost")
    }
}

pub(crate) struct PanickingScorer;

impl Scorer for PanickingScorer {
    fn score(&self, _tensor: &Tensor) -> anyhow::Result<ProbabilityVector> {
        panic!("kernel exploded")
    }
}

/// Sleeps while scoring and tracks how many calls overlap.
pub(crate) struct SlowScorer {
    output: Vec<f32>,
    delay: Duration,
    active: AtomicUsize,
    pub(crate) max_active: AtomicUsize,
}

impl SlowScorer {
    pub(crate) fn new(output: &[f32], delay: Duration) -> Self {
        Self {
            output: output.to_vec(),
            delay,
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
        }
    }
}

impl Scorer for SlowScorer {
    fn score(&self, _tensor: &Tensor) -> anyhow::Result<ProbabilityVector> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        thread::sleep(self.delay);
        self.active.fetch_sub(1, Ordering::SeqCst);
        Ok(self.output.clone().into())
    }
}
