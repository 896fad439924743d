use serde::{Deserialize, Serialize};

/// ImageNet normalization mean values (RGB)
pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
/// ImageNet normalization std values (RGB)
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Per-channel transform applied to 8-bit RGB samples before scoring.
///
/// This is part of the scorer's input contract and has to match whatever the
/// model saw at training time. It is configured, never guessed from the model.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelTransform {
    /// Keras EfficientNet: identity, values stay in `0.0..=255.0`.
    /// The rescaling layer is part of the exported graph.
    #[default]
    EfficientNet,
    /// `x / 255`, values in `0.0..=1.0`.
    UnitScale,
    /// `x / 127.5 - 1`, values in `-1.0..=1.0` (MobileNet/Inception style).
    Symmetric,
    /// `(x / 255 - mean) / std` with the ImageNet statistics.
    Imagenet,
}

impl PixelTransform {
    pub fn name(&self) -> &'static str {
        match self {
            PixelTransform::EfficientNet => "efficientnet",
            PixelTransform::UnitScale => "unit_scale",
            PixelTransform::Symmetric => "symmetric",
            PixelTransform::Imagenet => "imagenet",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "efficientnet" => Some(PixelTransform::EfficientNet),
            "unit_scale" => Some(PixelTransform::UnitScale),
            "symmetric" => Some(PixelTransform::Symmetric),
            "imagenet" => Some(PixelTransform::Imagenet),
            _ => None,
        }
    }

    /// Transforms one RGB pixel in place. `px` holds raw sample values as f32.
    #[inline]
    pub fn apply(&self, px: &mut [f32]) {
        match self {
            PixelTransform::EfficientNet => {}
            PixelTransform::UnitScale => px.iter_mut().for_each(|v| *v /= 255.0),
            PixelTransform::Symmetric => px.iter_mut().for_each(|v| *v = *v / 127.5 - 1.0),
            PixelTransform::Imagenet => {
                for (c, v) in px.iter_mut().enumerate() {
                    *v = (*v / 255.0 - IMAGENET_MEAN[c]) / IMAGENET_STD[c];
                }
            }
        }
    }

    /// Inclusive value range the transform maps `0..=255` onto, per channel.
    pub fn output_range(&self, channel: usize) -> (f32, f32) {
        match self {
            PixelTransform::EfficientNet => (0.0, 255.0),
            PixelTransform::UnitScale => (0.0, 1.0),
            PixelTransform::Symmetric => (-1.0, 1.0),
            PixelTransform::Imagenet => (
                -IMAGENET_MEAN[channel] / IMAGENET_STD[channel],
                (1.0 - IMAGENET_MEAN[channel]) / IMAGENET_STD[channel],
            ),
        }
    }
}
