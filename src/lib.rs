//! dnn-classify - image classification with pretrained ONNX networks
//!
//! Loads an ImageNet-style classification network, runs it a fixed number
//! of times over one image to measure mean latency, and reports the most
//! probable class with its name from a synset label file.
//!
//! # Example
//!
//! ```rust,no_run
//! use dnn_classify::{ClassifyRequest, Config, ModelFiles, classify};
//!
//! fn main() -> dnn_classify::Result<()> {
//!     let request = ClassifyRequest {
//!         image: "space_shuttle.jpg".into(),
//!         model: ModelFiles::single("googlenet-12.onnx"),
//!         labels: "synset_words.txt".into(),
//!     };
//!
//!     let report = classify(&request, &Config::default())?;
//!     println!("{report}");
//!     Ok(())
//! }
//! ```

pub mod bench;
pub mod config;
pub mod error;
pub mod labels;
pub mod model;
pub mod pipeline;
pub mod prediction;
pub mod preprocess;
pub mod traits;
mod version;

// Re-export main types at crate root
pub use bench::{Timing, run_timed};
pub use config::{Config, RunConfig};
pub use error::{ClassifyError, Result};
pub use labels::{LabelTable, parse_label_line, parse_labels, read_class_names};
pub use model::{Device, ModelFiles, OnnxClassifier};
pub use pipeline::{ClassifyRequest, Report, classify, classify_with};
pub use prediction::{Prediction, best_class};
pub use preprocess::{Blob, PreprocessConfig, blob_from_image, load_image};
pub use traits::InferenceBackend;
pub use version::{GIT_BRANCH, GIT_SHA, PKG_VERSION, git_dirty, version_string};
