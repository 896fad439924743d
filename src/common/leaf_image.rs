use fast_image_resize::images::Image as FirImage;
use fast_image_resize::PixelType;
use image::{DynamicImage, ImageFormat, RgbImage};
use crate::error::DiagnosisError;

/// Encodings the service accepts for uploads.
pub const SUPPORTED_FORMATS: [ImageFormat; 4] = [
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::WebP,
];

/// A decoded upload, already projected to 8-bit RGB.
#[derive(Debug, Clone)]
pub struct LeafImage {
    pub image: RgbImage,
    pub img_width: u32,
    pub img_height: u32,
    pub format: ImageFormat,
}

impl std::ops::Deref for LeafImage {
    type Target = RgbImage;

    fn deref(&self) -> &Self::Target {
        &self.image
    }
}

impl LeafImage {
    /// Sniffs the encoding from the magic bytes and decodes.
    ///
    /// `declared` is the encoding the client claimed (e.g. from a content
    /// type). When given it has to agree with what the bytes say.
    pub fn decode(bytes: &[u8], declared: Option<ImageFormat>) -> Result<Self, DiagnosisError> {
        if bytes.is_empty() {
            return Err(DiagnosisError::Decode("empty upload".to_string()));
        }

        let format = image::guess_format(bytes)
            .map_err(|_| DiagnosisError::Decode("unrecognised image encoding".to_string()))?;

        if !SUPPORTED_FORMATS.contains(&format) {
            return Err(DiagnosisError::Decode(format!(
                "unsupported image format {:?}, expected one of JPEG, PNG, GIF, WebP",
                format
            )));
        }

        if let Some(declared) = declared {
            if declared != format {
                return Err(DiagnosisError::Decode(format!(
                    "declared format {:?} does not match image data ({:?})",
                    declared, format
                )));
            }
        }

        let dynamic = image::load_from_memory_with_format(bytes, format)?;
        Ok(Self::from_dynamic(dynamic, format))
    }

    /// Projects any colour mode onto RGB8. RGB8 input is moved through untouched;
    /// grayscale is replicated, alpha is dropped, wider samples are scaled down.
    pub fn from_dynamic(image: DynamicImage, format: ImageFormat) -> Self {
        let image = image.into_rgb8();
        let (img_width, img_height) = image.dimensions();
        Self {
            image,
            img_width,
            img_height,
            format,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.img_width, self.img_height)
    }

    pub fn into_fir_image<'a>(self) -> Result<FirImage<'a>, DiagnosisError> {
        let (width, height) = self.dimensions();
        FirImage::from_vec_u8(width, height, self.image.into_raw(), PixelType::U8x3)
            .map_err(|e| DiagnosisError::Decode(format!("cannot wrap decoded pixels: {e}")))
    }
}

/// Maps a MIME content type onto one of the accepted encodings.
pub fn format_from_content_type(content_type: &str) -> Option<ImageFormat> {
    let mime = content_type.split(';').next()?.trim().to_lowercase();
    ImageFormat::from_mime_type(mime).filter(|f| SUPPORTED_FORMATS.contains(f))
}
