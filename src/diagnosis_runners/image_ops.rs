//! Turns uploaded image bytes into the scorer's input tensor.
//!
//! decode → RGB8 → fixed-filter resize to 224×224 → per-channel transform → NHWC tensor.

use fast_image_resize::{images::Image as FirImage, FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::ImageFormat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use crate::common::{LeafImage, PixelTransform, Tensor, TENSOR_HEIGHT, TENSOR_WIDTH};
use crate::error::DiagnosisError;

/// Resampling filter used for the resize step. One filter per normalizer,
/// used for every request.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    Nearest,
    Bilinear,
    /// Bicubic (a = -0.5).
    #[default]
    CatmullRom,
    Lanczos3,
}

impl ResizeFilter {
    fn resize_alg(&self) -> ResizeAlg {
        match self {
            ResizeFilter::Nearest => ResizeAlg::Nearest,
            ResizeFilter::Bilinear => ResizeAlg::Convolution(FilterType::Bilinear),
            ResizeFilter::CatmullRom => ResizeAlg::Convolution(FilterType::CatmullRom),
            ResizeFilter::Lanczos3 => ResizeAlg::Convolution(FilterType::Lanczos3),
        }
    }
}

/// Pure, stateless; safe to share between any number of threads.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Normalizer {
    filter: ResizeFilter,
    transform: PixelTransform,
}

impl Normalizer {
    pub fn new(filter: ResizeFilter, transform: PixelTransform) -> Self {
        Self { filter, transform }
    }

    pub fn filter(&self) -> ResizeFilter {
        self.filter
    }

    pub fn transform(&self) -> PixelTransform {
        self.transform
    }

    pub fn normalize(&self, bytes: &[u8]) -> Result<Tensor, DiagnosisError> {
        self.normalize_with(bytes, None)
    }

    pub fn normalize_with(&self, bytes: &[u8], declared: Option<ImageFormat>) -> Result<Tensor, DiagnosisError> {
        let image = LeafImage::decode(bytes, declared)?;
        log::debug!("Decoded {:?} image of {}x{}", image.format, image.img_width, image.img_height);
        self.normalize_image(image)
    }

    pub fn normalize_image(&self, image: LeafImage) -> Result<Tensor, DiagnosisError> {
        let resized = self.resize(image)?;
        self.to_tensor(&resized)
    }

    /// Always goes through the resizer, also for inputs that are already 224×224.
    fn resize(&self, image: LeafImage) -> Result<FirImage<'static>, DiagnosisError> {
        let (w, h) = image.dimensions();
        if w == 0 || h == 0 {
            return Err(DiagnosisError::Decode(format!("image has no pixels ({w}x{h})")));
        }

        let src = image.into_fir_image()?;
        let mut dst = FirImage::new(TENSOR_WIDTH as u32, TENSOR_HEIGHT as u32, PixelType::U8x3);
        let options = ResizeOptions::new().resize_alg(self.filter.resize_alg());

        Resizer::new()
            .resize(&src, &mut dst, &options)
            .map_err(|e| DiagnosisError::Decode(format!("resize failed: {e}")))?;
        Ok(dst)
    }

    fn to_tensor(&self, img: &FirImage) -> Result<Tensor, DiagnosisError> {
        let buf = img.buffer();
        let expected = TENSOR_WIDTH * TENSOR_HEIGHT * 3;
        if buf.len() != expected {
            return Err(DiagnosisError::Configuration(format!(
                "Unexpected buffer size: got {}, expected {}", buf.len(), expected
            )));
        }

        // HWC buffer maps 1:1 onto the NHWC tensor
        let mut data: Vec<f32> = buf.par_iter().map(|&v| v as f32).collect();
        let transform = self.transform;
        data.par_chunks_mut(3).for_each(|px| transform.apply(px));

        Tensor::from_shape_vec(data)
    }
}

/// Normalizes with the default filter and transform.
pub fn normalize(bytes: &[u8]) -> Result<Tensor, DiagnosisError> {
    Normalizer::default().normalize(bytes)
}
