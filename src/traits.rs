//! The inference seam.
//!
//! The timing loop and the classification pipeline only need "run one
//! forward pass over a blob"; everything model-specific sits behind this
//! trait. [`OnnxClassifier`](crate::model::OnnxClassifier) is the real
//! implementation.

use crate::Result;
use crate::preprocess::Blob;

/// A loaded network that maps an input blob to per-class scores.
pub trait InferenceBackend {
    /// Backend name for logging and reports.
    fn name(&self) -> &str;

    /// Run one forward pass and return the output layer flattened to one row.
    fn forward(&mut self, input: &Blob) -> Result<Vec<f32>>;
}

impl<B: InferenceBackend + ?Sized> InferenceBackend for Box<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn forward(&mut self, input: &Blob) -> Result<Vec<f32>> {
        (**self).forward(input)
    }
}
