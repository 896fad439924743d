//! Options for building the ONNX Runtime scorer.

use crate::common::InferenceDevice;

#[derive(Debug, Clone)]
pub struct ConfigOrt {
    pub onnx_path: String,
    pub ort_lib_path: Option<String>,
    pub device: InferenceDevice,
    pub model_width: u32,
    pub model_height: u32,
    pub num_dry_run: usize,
    pub profile: bool,
    /// 0 (disabled) ..= 3 (all optimizations)
    pub optimization_level: u8,
    pub intra_threads: Option<usize>,
    /// Set for graphs that end in logits instead of a softmax layer.
    pub apply_softmax: bool,

    // trt related
    pub trt_engine_cache_enable: bool,
    pub trt_fp16_enable: bool,
}

impl Default for ConfigOrt {
    fn default() -> Self {
        Self {
            onnx_path: String::new(),
            ort_lib_path: None,
            device: InferenceDevice::CPU,
            model_width: 224,
            model_height: 224,
            num_dry_run: 1,
            profile: false,
            optimization_level: 3,
            intra_threads: None,
            apply_softmax: false,

            trt_engine_cache_enable: true,
            trt_fp16_enable: false,
        }
    }
}

impl ConfigOrt {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_model(mut self, onnx_path: &str) -> Self {
        self.onnx_path = onnx_path.to_string();
        self
    }

    pub fn with_ort_lib_path(mut self, ort_lib_path: &str) -> Self {
        self.ort_lib_path = Some(ort_lib_path.to_string());
        self
    }

    pub fn with_model_width(mut self, n: u32) -> Self {
        self.model_width = n;
        self
    }

    pub fn with_model_height(mut self, n: u32) -> Self {
        self.model_height = n;
        self
    }

    pub fn with_dry_run(mut self, n: usize) -> Self {
        self.num_dry_run = n;
        self
    }

    pub fn with_device(mut self, device_type: InferenceDevice) -> Self {
        self.device = device_type;
        self
    }

    pub fn with_trt_fp16(mut self, x: bool) -> Self {
        self.trt_fp16_enable = x;
        self
    }

    pub fn with_trt_engine_cache(mut self, x: bool) -> Self {
        self.trt_engine_cache_enable = x;
        self
    }

    pub fn with_profile(mut self, profile: bool) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_optimization_level(mut self, level: u8) -> Self {
        self.optimization_level = level.min(3);
        self
    }

    pub fn with_intra_threads(mut self, n: usize) -> Self {
        self.intra_threads = Some(n.max(1));
        self
    }

    pub fn with_softmax(mut self, x: bool) -> Self {
        self.apply_softmax = x;
        self
    }
}
