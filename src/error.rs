//! Classifier error types

use std::path::PathBuf;

/// Where to fetch a compatible network when the model files are unusable.
pub const MODEL_DOWNLOAD_HINT: &str = "bvlc_googlenet ONNX model can be downloaded here: \
https://github.com/onnx/models/tree/main/validated/vision/classification/inception_and_googlenet/googlenet";

/// Classifier error types
#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    // Input errors
    #[error("Can't load image for classification: {} ({reason})", path.display())]
    ImageLoad { path: PathBuf, reason: String },

    #[error("File with classes labels not found: {}", path.display())]
    LabelsNotFound { path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Model errors
    #[error(
        "Can't load network by using the following files:\n  topology: {}\n  weights:  {}\n  reason:   {reason}\n{hint}",
        topology.display(),
        weights.display(),
        hint = MODEL_DOWNLOAD_HINT
    )]
    ModelLoad {
        topology: PathBuf,
        weights: PathBuf,
        reason: String,
    },

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("model produced an empty probability vector")]
    EmptyOutput,

    /// The predicted class has no entry in the label table.
    #[error("class #{class_id} has no label (label file holds {labels} entries)")]
    Lookup { class_id: usize, labels: usize },

    // Output errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for classifier operations
pub type Result<T> = std::result::Result<T, ClassifyError>;
