mod diagnosis;
mod inference_device;
mod knowledge;
mod label_set;
mod leaf_image;
mod model_config;
mod pixel_transform;
mod probability;
mod tensor;

pub use diagnosis::*;
pub use inference_device::*;
pub use knowledge::*;
pub use label_set::*;
pub use leaf_image::*;
pub use model_config::*;
pub use pixel_transform::*;
pub use probability::*;
pub use tensor::*;
