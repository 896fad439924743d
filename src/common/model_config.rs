use std::path::Path;
use anyhow::Context;
use crate::common::inference_device::InferenceDevice;
use crate::common::pixel_transform::PixelTransform;
use crate::common::tensor::{TENSOR_HEIGHT, TENSOR_WIDTH};
use crate::data::{ConfigOrt, FsAccess};
use crate::diagnosis_runners::ResizeFilter;

pub const ENV_ASSET_DIR: &str = "CROPIX_ASSET_DIR";
pub const ENV_ORT_LIB: &str = "CROPIX_ORT_LIB";
pub const ENV_DEVICE: &str = "CROPIX_DEVICE";
pub const ENV_PIXEL_TRANSFORM: &str = "CROPIX_PIXEL_TRANSFORM";

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub weights_path: String,
    pub labels_path: String,
    /// Optional descriptions/remedies file. A missing file is tolerated.
    pub remedies_path: Option<String>,
    /// Dynamic onnxruntime library. `None` uses whatever `ort` finds itself.
    pub ort_lib_path: Option<String>,
    pub inference_device: InferenceDevice,
    pub pixel_transform: PixelTransform,
    pub resize_filter: ResizeFilter,
    pub width: u32,
    pub height: u32,
    pub dry_run: bool,
    pub apply_softmax: bool,
    pub profile: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            weights_path: String::new(),
            labels_path: String::new(),
            remedies_path: None,
            ort_lib_path: None,
            inference_device: InferenceDevice::CPU,
            pixel_transform: PixelTransform::EfficientNet,
            resize_filter: ResizeFilter::CatmullRom,
            width: TENSOR_WIDTH as u32,
            height: TENSOR_HEIGHT as u32,
            dry_run: true,
            apply_softmax: false,
            profile: false,
        }
    }
}

impl ModelConfig {
    pub fn new(weights_path: String, labels_path: String, remedies_path: Option<String>) -> Self {
        Self {
            weights_path,
            labels_path,
            remedies_path,
            ..Default::default()
        }
    }

    /// Standard asset layout:
    /// `<dir>/models/model.onnx`, `<dir>/models/class_names.json`, `<dir>/remedies.json`.
    pub fn from_asset_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        let models = dir.join("models");
        Self::new(
            models.join("model.onnx").to_string_lossy().into_owned(),
            models.join("class_names.json").to_string_lossy().into_owned(),
            Some(dir.join("remedies.json").to_string_lossy().into_owned()),
        )
    }

    /// Builds the config from `CROPIX_*` environment variables.
    ///
    /// The asset directory is `CROPIX_ASSET_DIR` when set, otherwise the first of
    /// the working, config and home directories holding the label file, otherwise
    /// the working directory.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let asset_dir = match lookup(ENV_ASSET_DIR) {
            Some(dir) => dir.into(),
            None => match FsAccess::find_asset_dir() {
                Some(dir) => dir,
                None => FsAccess::Current.path()?,
            },
        };

        let mut config = Self::from_asset_dir(asset_dir);
        config.ort_lib_path = lookup(ENV_ORT_LIB).filter(|s| !s.trim().is_empty());

        if let Some(device) = lookup(ENV_DEVICE) {
            config.inference_device = device
                .parse::<InferenceDevice>()
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("Invalid {ENV_DEVICE}"))?;
        }

        if let Some(transform) = lookup(ENV_PIXEL_TRANSFORM) {
            config.pixel_transform = PixelTransform::from_name(&transform)
                .ok_or_else(|| anyhow::anyhow!("Invalid {ENV_PIXEL_TRANSFORM}: '{transform}'"))?;
        }

        Ok(config)
    }

    pub fn with_device(mut self, device: InferenceDevice) -> Self {
        self.inference_device = device;
        self
    }

    pub fn with_ort_lib_path(mut self, path: &str) -> Self {
        self.ort_lib_path = Some(path.to_string());
        self
    }

    pub fn with_pixel_transform(mut self, transform: PixelTransform) -> Self {
        self.pixel_transform = transform;
        self
    }

    pub fn to_config_ort(&self) -> ConfigOrt {
        let config = ConfigOrt::new()
            .with_model(&self.weights_path)
            .with_device(self.inference_device)
            .with_model_width(self.width)
            .with_model_height(self.height)
            .with_dry_run(if self.dry_run { 1 } else { 0 })
            .with_softmax(self.apply_softmax)
            .with_profile(self.profile);
        match &self.ort_lib_path {
            Some(path) => config.with_ort_lib_path(path),
            None => config,
        }
    }
}

impl std::fmt::Display for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Weights File Path: {}\n\
        Labels Path: {}\n\
        Remedies Path: {}\n\
        OnnxRuntime Lib Path: {}\n\
        Inference Device: {}\n\
        Pixel Transform: {}\n\
        Model Input Resolution: {}x{}",
               self.weights_path, self.labels_path,
               self.remedies_path.as_deref().unwrap_or("-"),
               self.ort_lib_path.as_deref().unwrap_or("-"),
               self.inference_device, self.pixel_transform.name(),
               self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_asset_dir_layout() {
        let config = ModelConfig::from_asset_dir("/srv/cropix");
        assert_eq!(config.weights_path, "/srv/cropix/models/model.onnx");
        assert_eq!(config.labels_path, "/srv/cropix/models/class_names.json");
        assert_eq!(config.remedies_path.as_deref(), Some("/srv/cropix/remedies.json"));
        assert_eq!((config.width, config.height), (224, 224));
        assert_eq!(config.pixel_transform, PixelTransform::EfficientNet);
    }

    #[test]
    fn test_from_lookup_reads_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_ASSET_DIR, "/opt/assets"),
            (ENV_ORT_LIB, "/opt/ort/libonnxruntime.so"),
            (ENV_DEVICE, "cuda:1"),
            (ENV_PIXEL_TRANSFORM, "imagenet"),
        ]);
        let config = ModelConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.labels_path, "/opt/assets/models/class_names.json");
        assert_eq!(config.ort_lib_path.as_deref(), Some("/opt/ort/libonnxruntime.so"));
        assert_eq!(config.inference_device, InferenceDevice::CUDA(1));
        assert_eq!(config.pixel_transform, PixelTransform::Imagenet);
    }

    #[test]
    fn test_from_lookup_rejects_bad_device() {
        let env: HashMap<&str, &str> = HashMap::from([(ENV_ASSET_DIR, "/a"), (ENV_DEVICE, "abacus")]);
        assert!(ModelConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).is_err());
    }

    #[test]
    fn test_to_config_ort_carries_paths() {
        let config = ModelConfig::from_asset_dir("/srv")
            .with_ort_lib_path("/lib/ort.so")
            .with_device(InferenceDevice::CUDA(0))
            .with_pixel_transform(PixelTransform::Symmetric);
        assert_eq!(config.pixel_transform, PixelTransform::Symmetric);
        let ort = config.to_config_ort();
        assert_eq!(ort.device, InferenceDevice::CUDA(0));
        assert_eq!(ort.onnx_path, "/srv/models/model.onnx");
        assert_eq!(ort.ort_lib_path.as_deref(), Some("/lib/ort.so"));
        assert_eq!(ort.num_dry_run, 1);
    }
}
