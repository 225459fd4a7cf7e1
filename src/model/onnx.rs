//! Image classification via ONNX Runtime.

use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use tracing::info;

use super::{Device, ModelFiles};
use crate::error::{ClassifyError, Result};
use crate::preprocess::Blob;
use crate::traits::InferenceBackend;

/// Default input layer name of Caffe-derived ImageNet networks.
pub const DEFAULT_INPUT_NAME: &str = "data";

/// Default output layer name (the softmax) of Caffe-derived ImageNet networks.
pub const DEFAULT_OUTPUT_NAME: &str = "prob";

/// A classification network loaded into an ONNX Runtime session.
pub struct OnnxClassifier {
    session: Session,
    input_name: String,
    output_name: String,
    model_name: String,
    device: Device,
}

impl OnnxClassifier {
    /// Load a network from its topology and weights files.
    pub fn load(files: &ModelFiles, device: Device) -> Result<Self> {
        files.validate()?;
        let session = build_session(files, &device)?;

        let model_name = files
            .topology
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("onnx")
            .to_string();
        info!(model = %model_name, device = device.name(), "loaded network");

        Ok(Self {
            session,
            input_name: DEFAULT_INPUT_NAME.to_string(),
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            model_name,
            device,
        })
    }

    /// Override the input and output layer names.
    pub fn with_layers(mut self, input: impl Into<String>, output: impl Into<String>) -> Self {
        self.input_name = input.into();
        self.output_name = output.into();
        self
    }

    pub fn device(&self) -> Device {
        self.device
    }
}

impl InferenceBackend for OnnxClassifier {
    fn name(&self) -> &str {
        &self.model_name
    }

    fn forward(&mut self, input: &Blob) -> Result<Vec<f32>> {
        use ort::value::TensorRef;

        let data = input
            .as_slice()
            .ok_or_else(|| ClassifyError::Inference("input blob is not contiguous".to_string()))?;
        let tensor = TensorRef::from_array_view((input.shape(), data)).map_err(|e| {
            ClassifyError::Inference(format!("Failed to create input tensor: {}", e))
        })?;

        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => tensor])
            .map_err(|e| ClassifyError::Inference(format!("ONNX inference failed: {}", e)))?;

        let prob = outputs.get(self.output_name.as_str()).ok_or_else(|| {
            ClassifyError::Inference(format!("model has no output layer '{}'", self.output_name))
        })?;

        // The output is reshaped to a single row regardless of its rank.
        let (_shape, scores) = prob.try_extract_tensor::<f32>().map_err(|e| {
            ClassifyError::Inference(format!("Failed to extract '{}': {}", self.output_name, e))
        })?;

        Ok(scores.to_vec())
    }
}

/// Build an ONNX session with the appropriate execution provider.
fn build_session(files: &ModelFiles, device: &Device) -> Result<Session> {
    let builder = Session::builder()
        .map_err(|e| files.error(format!("Failed to create session builder: {}", e)))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| files.error(format!("Failed to set optimization level: {}", e)))?;

    let mut builder = match device {
        Device::Cpu => builder,
        #[cfg(feature = "cuda")]
        Device::Cuda { device_id } => {
            use ort::execution_providers::CUDAExecutionProvider;
            builder
                .with_execution_providers([CUDAExecutionProvider::default()
                    .with_device_id(*device_id as i32)
                    .build()])
                .map_err(|e| files.error(format!("Failed to configure CUDA: {}", e)))?
        }
    };

    builder
        .commit_from_file(&files.topology)
        .map_err(|e| files.error(format!("Failed to load ONNX model: {}", e)))
}
