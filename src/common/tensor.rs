use ndarray::{Array, Array4, ArrayView4, Ix4};
use crate::error::DiagnosisError;

pub const TENSOR_BATCH: usize = 1;
pub const TENSOR_HEIGHT: usize = 224;
pub const TENSOR_WIDTH: usize = 224;
pub const TENSOR_CHANNELS: usize = 3;

/// Scorer input, wrapper over [`Array4<f32>`] laid out as NHWC `(1, 224, 224, 3)`, RGB.
///
/// The shape is checked on construction; there is no way to build a `Tensor`
/// of any other shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor(Array4<f32>);

impl Tensor {
    pub const SHAPE: [usize; 4] = [TENSOR_BATCH, TENSOR_HEIGHT, TENSOR_WIDTH, TENSOR_CHANNELS];

    pub fn new(array: Array4<f32>) -> Result<Self, DiagnosisError> {
        if array.shape() != Self::SHAPE {
            return Err(DiagnosisError::Configuration(format!(
                "Tensor shape {:?} does not match the scorer input {:?}",
                array.shape(),
                Self::SHAPE
            )));
        }
        Ok(Self(array))
    }

    pub fn from_shape_vec(xs: Vec<f32>) -> Result<Self, DiagnosisError> {
        let array: Array<f32, Ix4> = Array::from_shape_vec(Self::SHAPE, xs)
            .map_err(|e| DiagnosisError::Configuration(format!("Cannot shape tensor: {e}")))?;
        Self::new(array)
    }

    /// All-zero tensor, used for warm-up runs.
    pub fn zeros() -> Self {
        Self(Array4::zeros(Self::SHAPE))
    }

    pub fn view(&self) -> ArrayView4<'_, f32> {
        self.0.view()
    }

    /// Value at `(y, x, channel)` of the single batch entry.
    pub fn pixel(&self, y: usize, x: usize, channel: usize) -> f32 {
        self.0[[0, y, x, channel]]
    }
}

impl std::ops::Deref for Tensor {
    type Target = Array4<f32>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
