//! Network loading and execution.

pub mod device;
pub mod files;
pub mod onnx;

pub use device::Device;
pub use files::ModelFiles;
pub use onnx::{DEFAULT_INPUT_NAME, DEFAULT_OUTPUT_NAME, OnnxClassifier};
