//! The classification run, from image file to report.
//!
//! Each step is fallible and the first failure ends the run; nothing is
//! printed from here, so a failed run produces no partial output.

use std::fmt;
use std::path::PathBuf;

use image::DynamicImage;
use serde::Serialize;
use tracing::{info, warn};

use crate::bench::{Timing, run_timed};
use crate::config::Config;
use crate::error::Result;
use crate::labels::LabelTable;
use crate::model::{ModelFiles, OnnxClassifier};
use crate::prediction::{Prediction, best_class};
use crate::preprocess::{blob_from_image, load_image};
use crate::traits::InferenceBackend;

/// Inputs of one classification run.
#[derive(Debug, Clone)]
pub struct ClassifyRequest {
    /// Image to classify.
    pub image: PathBuf,
    /// Network files.
    pub model: ModelFiles,
    /// Class label file.
    pub labels: PathBuf,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    #[serde(flatten)]
    pub prediction: Prediction,
    pub class_name: String,
    pub timing: Timing,
    pub backend: String,
}

impl Report {
    /// Render as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Best class: #{} '{}'",
            self.prediction.class_id, self.class_name
        )?;
        writeln!(f, "Probability: {}%", self.prediction.percent())?;
        write!(
            f,
            "Time: {} ms (average from {} iterations)",
            self.timing.mean_ms(),
            self.timing.iterations
        )
    }
}

/// Classify with an ONNX Runtime backend built from the request's model files.
pub fn classify(request: &ClassifyRequest, config: &Config) -> Result<Report> {
    config.validate()?;

    let image = load_image(&request.image)?;
    let mut backend = OnnxClassifier::load(&request.model, config.run.device()?)?
        .with_layers(&config.run.input_name, &config.run.output_name);

    classify_loaded(&mut backend, &image, request, config)
}

/// Classify with an already loaded backend.
pub fn classify_with<B: InferenceBackend + ?Sized>(
    backend: &mut B,
    request: &ClassifyRequest,
    config: &Config,
) -> Result<Report> {
    config.validate()?;

    let image = load_image(&request.image)?;
    classify_loaded(backend, &image, request, config)
}

fn classify_loaded<B: InferenceBackend + ?Sized>(
    backend: &mut B,
    image: &DynamicImage,
    request: &ClassifyRequest,
    config: &Config,
) -> Result<Report> {
    let blob = blob_from_image(image, &config.preprocess);
    let (probs, timing) = run_timed(backend, &blob, config.run.iterations, config.run.warmup)?;

    let prediction = best_class(&probs)?;
    let labels = LabelTable::load(&request.labels)?;
    if labels.len() != probs.len() {
        warn!(
            labels = labels.len(),
            classes = probs.len(),
            "label count differs from model output width"
        );
    }
    let class_name = labels.get(prediction.class_id)?.to_string();

    info!(
        class_id = prediction.class_id,
        class = %class_name,
        probability = prediction.probability,
        mean_ms = timing.mean_ms(),
        "classified image"
    );

    Ok(Report {
        prediction,
        class_name,
        timing,
        backend: backend.name().to_string(),
    })
}
