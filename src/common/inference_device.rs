use std::fmt;
use std::str::FromStr;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum InferenceDevice {
    #[default] CPU,
    CUDA(usize),
    TensorRT(usize),
    CoreML(usize),
}

// Hardcoded device names. Storing the "proper" spelling and the lowercase version.
const CPU: [&str; 2] = ["CPU", "cpu"];
const CUDA: [&str; 2] = ["CUDA", "cuda"];
const TENSOR_RT: [&str; 2] = ["TensorRT", "tensorrt"];
const CORE_ML: [&str; 2] = ["CoreML", "coreml"];

impl InferenceDevice {
    pub fn from_name(device: &str, device_id: usize) -> Option<Self> {
        let device = device.trim().to_lowercase();
        [
            InferenceDevice::CPU,
            InferenceDevice::CUDA(device_id),
            InferenceDevice::TensorRT(device_id),
            InferenceDevice::CoreML(device_id),
        ]
        .into_iter()
        .find(|d| d.str_lowercase() == device)
    }

    pub fn str(&self) -> &'static str {
        match self {
            InferenceDevice::CPU => CPU[0],
            InferenceDevice::CUDA(_) => CUDA[0],
            InferenceDevice::TensorRT(_) => TENSOR_RT[0],
            InferenceDevice::CoreML(_) => CORE_ML[0],
        }
    }

    pub fn str_lowercase(&self) -> &'static str {
        match self {
            InferenceDevice::CPU => CPU[1],
            InferenceDevice::CUDA(_) => CUDA[1],
            InferenceDevice::TensorRT(_) => TENSOR_RT[1],
            InferenceDevice::CoreML(_) => CORE_ML[1],
        }
    }

    pub fn device_id(&self) -> usize {
        match self {
            InferenceDevice::CPU => 0,
            InferenceDevice::CUDA(id) | InferenceDevice::TensorRT(id) | InferenceDevice::CoreML(id) => *id,
        }
    }

    pub fn all_inference_devices() -> Vec<&'static str> {
        vec![CPU[1], CUDA[1], TENSOR_RT[1], CORE_ML[1]]
    }
}

impl fmt::Display for InferenceDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InferenceDevice::CPU => write!(f, "{}", CPU[0]),
            _ => write!(f, "{}:{}", self.str(), self.device_id()),
        }
    }
}

/// Parses `cpu`, `cuda`, `cuda:1`, `tensorrt:0`, ...
impl FromStr for InferenceDevice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, id) = match s.split_once(':') {
            Some((name, id)) => {
                let id = id.trim().parse::<usize>()
                    .map_err(|_| format!("Invalid device id in '{s}'"))?;
                (name, id)
            }
            None => (s, 0),
        };
        InferenceDevice::from_name(name, id).ok_or_else(|| {
            format!("Unknown inference device '{s}'. Expected one of: {}",
                    InferenceDevice::all_inference_devices().join(", "))
        })
    }
}
