//! ONNX Runtime session wrapper for single-input, single-output classifiers.

use std::path::Path;
use anyhow::Result;
use half::{bf16, f16};
use ndarray::{Array, IxDyn};
use ort::{
    execution_providers::{ExecutionProvider,
                          CPUExecutionProvider,
                          CUDAExecutionProvider,
                          TensorRTExecutionProvider,
                          CoreMLExecutionProvider},
    session::builder::{GraphOptimizationLevel, SessionBuilder},
    session::{Session, SessionInputValue},
    tensor::TensorElementType,
    value::{DynValue, Value, ValueType},
};
use crate::common::{InferenceDevice, Tensor};
use crate::data::{ConfigOrt, CROSS_MARK};

/// ONNXRuntime Backend
#[derive(Debug)]
pub struct OrtEngine {
    session: Session,
    device: InferenceDevice,
    input_name: String,
    input_dtype: TensorElementType,
    input_dims: Vec<i64>,
    output_name: String,
    output_dtype: TensorElementType,
    output_dims: Vec<i64>,
}

impl OrtEngine {
    pub fn new(config: &ConfigOrt) -> Result<Self> {
        if !Path::new(&config.onnx_path).is_file() {
            anyhow::bail!("{CROSS_MARK} Model file not found at: {}", config.onnx_path);
        }

        if let Some(lib) = &config.ort_lib_path {
            ort::init_from(lib)
                .commit()
                .map_err(|e| anyhow::anyhow!("Failed to commit ORT from {lib}: {e:?}"))?;
        }

        let mut builder = Session::builder()?;

        let mut device = config.device;
        match device {
            InferenceDevice::TensorRT(device_id) => {
                Self::build_trt(
                    &mut builder,
                    device_id,
                    config.trt_fp16_enable,
                    config.trt_engine_cache_enable,
                )?;
            }
            InferenceDevice::CUDA(device_id) => {
                Self::build_cuda(&mut builder, device_id).unwrap_or_else(|err| {
                    log::warn!("{err}, Using cpu");
                    device = InferenceDevice::CPU;
                })
            }
            InferenceDevice::CoreML(_) => Self::build_coreml(&mut builder).unwrap_or_else(|err| {
                log::warn!("{err}, Using cpu");
                device = InferenceDevice::CPU;
            }),
            InferenceDevice::CPU => {
                Self::build_cpu(&mut builder)?;
            }
        }

        let mut builder = builder.with_optimization_level(Self::optimization_level(config.optimization_level))?;
        if let Some(n) = config.intra_threads {
            builder = builder.with_intra_threads(n)?;
        }
        let session = builder.commit_from_file(&config.onnx_path)?;

        let input = session
            .inputs
            .first()
            .ok_or_else(|| anyhow::anyhow!("{CROSS_MARK} Model declares no inputs"))?;
        let (input_dtype, input_dims) = Self::tensor_info(&input.input_type)?;
        let input_name = input.name.clone();

        let output = session
            .outputs
            .first()
            .ok_or_else(|| anyhow::anyhow!("{CROSS_MARK} Model declares no outputs"))?;
        let (output_dtype, output_dims) = Self::tensor_info(&output.output_type)?;
        let output_name = output.name.clone();

        Self::check_input_dims(&input_dims, config.model_height, config.model_width)?;

        log::info!(
            "Backend: ONNXRuntime | Device: {} | Input: {} {:?} {:?} | Output: {} {:?} {:?}",
            device, input_name, input_dtype, input_dims, output_name, output_dtype, output_dims,
        );

        Ok(Self {
            session,
            device,
            input_name,
            input_dtype,
            input_dims,
            output_name,
            output_dtype,
            output_dims,
        })
    }

    fn optimization_level(level: u8) -> GraphOptimizationLevel {
        match level {
            0 => GraphOptimizationLevel::Disable,
            1 => GraphOptimizationLevel::Level1,
            2 => GraphOptimizationLevel::Level2,
            _ => GraphOptimizationLevel::Level3,
        }
    }

    fn build_trt(
        builder: &mut SessionBuilder,
        device_id: usize,
        fp16_enable: bool,
        engine_cache_enable: bool,
    ) -> Result<()> {
        let trt = TensorRTExecutionProvider::default()
            .with_device_id(device_id as i32)
            .with_fp16(fp16_enable)
            .with_engine_cache(engine_cache_enable)
            .with_engine_cache_path("trt-cache")
            .with_timing_cache(false);
        if trt.is_available()? {
            match trt.register(builder) {
                Ok(_) => { }
                Err(err) => { anyhow::bail!("{CROSS_MARK} TensorRT initialization failed: {:?}", err) }
            }
            log::info!("🐢 Initial model serialization with TensorRT may takes some time...\n");
            Ok(())
        } else {
            anyhow::bail!("{CROSS_MARK} TensorRT execution provider not available")
        }
    }

    fn build_cuda(builder: &mut SessionBuilder, device_id: usize) -> Result<()> {
        let ep = CUDAExecutionProvider::default().with_device_id(device_id as i32);
        if ep.is_available()? {
            match ep.register(builder) {
                Ok(_) => { }
                Err(err) => { anyhow::bail!("{CROSS_MARK} CUDA initialization failed: {:?}", err) }
            }
            Ok(())
        } else {
            anyhow::bail!("{CROSS_MARK} CUDA execution provider not available")
        }
    }

    fn build_coreml(builder: &mut SessionBuilder) -> Result<()> {
        let ep = CoreMLExecutionProvider::default();
        if ep.is_available()? {
            match ep.register(builder) {
                Ok(_) => { }
                Err(err) => { anyhow::bail!("{CROSS_MARK} CoreML initialization failed: {:?}", err) }
            }
            Ok(())
        } else {
            anyhow::bail!("{CROSS_MARK} CoreML execution provider not available")
        }
    }

    fn build_cpu(builder: &mut SessionBuilder) -> Result<()> {
        let ep = CPUExecutionProvider::default();
        if ep.is_available()? {
            match ep.register(builder) {
                Ok(_) => { }
                Err(err) => { anyhow::bail!("{CROSS_MARK} CPU initialization failed: {:?}", err) }
            }
            Ok(())
        } else {
            anyhow::bail!("{CROSS_MARK} CPU execution provider not available")
        }
    }

    fn tensor_info(value_type: &ValueType) -> Result<(TensorElementType, Vec<i64>)> {
        match value_type {
            ValueType::Tensor { ty, dimensions, .. } => Ok((*ty, dimensions.clone())),
            other => anyhow::bail!("{CROSS_MARK} Expected a tensor, model declares {other:?}"),
        }
    }

    /// NHWC with 3 channels; dynamic (`-1`) axes are accepted.
    fn check_input_dims(dims: &[i64], height: u32, width: u32) -> Result<()> {
        let expected = [1, height as i64, width as i64, 3];
        if dims.len() != expected.len() || dims.iter().zip(expected).any(|(&d, e)| d > 0 && d != e) {
            if dims.len() == 4 && dims[1] == 3 {
                anyhow::bail!("{CROSS_MARK} Model expects NCHW input {dims:?}, only NHWC {expected:?} is supported");
            }
            anyhow::bail!("{CROSS_MARK} Model input {dims:?} does not match {expected:?}");
        }
        Ok(())
    }

    fn tensor_preprocess(x: &Tensor, dtype: &TensorElementType) -> Result<DynValue> {
        let x = x.view().into_dyn();
        let x = match dtype {
            TensorElementType::Float32 => Value::from_array(x.to_owned())?.into_dyn(),
            TensorElementType::Float64 => Value::from_array(x.mapv(|x_| x_ as f64))?.into_dyn(),
            TensorElementType::Float16 => Value::from_array(x.mapv(f16::from_f32))?.into_dyn(),
            TensorElementType::Bfloat16 => Value::from_array(x.mapv(bf16::from_f32))?.into_dyn(),
            TensorElementType::Uint8 => Value::from_array(x.mapv(|x_| x_ as u8))?.into_dyn(),
            _ => anyhow::bail!("Unsupported ort input type: {:?}", dtype),
        };
        Ok(x)
    }

    fn tensor_postprocess(x: &DynValue, dtype: &TensorElementType) -> Result<Array<f32, IxDyn>> {
        fn _extract_and_convert<T>(x: &DynValue, map_fn: impl Fn(T) -> f32) -> Result<Array<f32, IxDyn>>
        where
            T: Clone + 'static + ort::tensor::PrimitiveTensorElementType,
        {
            let view = x
                .try_extract_tensor::<T>()
                .map_err(|e| anyhow::anyhow!("Failed to extract from ort outputs: {e:?}"))?;
            Ok(view.mapv(map_fn))
        }
        match dtype {
            TensorElementType::Float32 => _extract_and_convert::<f32>(x, |x| x),
            TensorElementType::Float16 => _extract_and_convert::<f16>(x, f16::to_f32),
            TensorElementType::Bfloat16 => _extract_and_convert::<bf16>(x, bf16::to_f32),
            TensorElementType::Float64 => _extract_and_convert::<f64>(x, |x| x as f32),
            _ => Err(anyhow::anyhow!("Unsupported ort output type: {:?}", dtype)),
        }
    }

    /// One forward pass. Returns the output flattened in logical order.
    pub fn run(&self, tensor: &Tensor) -> Result<Vec<f32>> {
        let xs_ = [Into::<SessionInputValue<'_>>::into(Self::tensor_preprocess(tensor, &self.input_dtype)?)];

        let outputs = self.session.run(&xs_[..])?;
        let y = Self::tensor_postprocess(&outputs[self.output_name.as_str()], &self.output_dtype)?;

        // (N,) or (1, N); anything with a real second axis is not a class vector
        if y.shape().iter().filter(|&&d| d > 1).count() > 1 {
            anyhow::bail!("Expected a single class vector, model returned shape {:?}", y.shape());
        }
        Ok(y.iter().copied().collect())
    }

    /// Number of classes when the output's last axis is fixed.
    pub fn output_len(&self) -> Option<usize> {
        self.output_dims
            .last()
            .filter(|&&d| d > 0)
            .map(|&d| d as usize)
    }

    pub fn device(&self) -> InferenceDevice {
        self.device
    }

    pub fn input_name(&self) -> &str {
        &self.input_name
    }

    pub fn input_dims(&self) -> &[i64] {
        &self.input_dims
    }

    pub fn output_name(&self) -> &str {
        &self.output_name
    }
}
