//! Image decoding and input blob construction.
//!
//! Turns a decoded image into the `1 x 3 x H x W` float tensor a Caffe-style
//! ImageNet network expects: 2x2 bilinear resize to the network's input size
//! (half-pixel centers, edge clamping, no antialiasing),
//! raw 0..255 pixel values in BGR order, per-channel mean subtraction.
//! These constants are dictated by how the network was trained; any
//! mismatch silently degrades predictions instead of failing.

use std::path::Path;

use image::{DynamicImage, ImageReader};
use ndarray::Array4;
use serde::{Deserialize, Serialize};

use crate::error::{ClassifyError, Result};

/// Per-model normalization parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessConfig {
    /// Network input width in pixels (default: 224).
    #[serde(default = "default_side")]
    pub width: u32,
    /// Network input height in pixels (default: 224).
    #[serde(default = "default_side")]
    pub height: u32,
    /// Mean subtracted from each output channel, in output channel order
    /// (B, G, R by default, R, G, B with `swap_rb`) (default: 104, 117, 123).
    #[serde(default = "default_mean")]
    pub mean: [f32; 3],
    /// Multiplier applied after mean subtraction (default: 1.0).
    #[serde(default = "default_scale")]
    pub scale: f32,
    /// Emit channels as R, G, B instead of B, G, R (default: false).
    #[serde(default)]
    pub swap_rb: bool,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            width: default_side(),
            height: default_side(),
            mean: default_mean(),
            scale: default_scale(),
            swap_rb: false,
        }
    }
}

fn default_side() -> u32 {
    224
}

fn default_mean() -> [f32; 3] {
    [104.0, 117.0, 123.0]
}

fn default_scale() -> f32 {
    1.0
}

impl PreprocessConfig {
    /// Reject settings that cannot produce a usable blob.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ClassifyError::Configuration(format!(
                "input size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.scale == 0.0 || !self.scale.is_finite() {
            return Err(ClassifyError::Configuration(format!(
                "scale must be finite and non-zero, got {}",
                self.scale
            )));
        }
        Ok(())
    }
}

/// A batch of one image in NCHW layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Blob(Array4<f32>);

impl Blob {
    /// Tensor shape as `[batch, channels, height, width]`.
    pub fn shape(&self) -> [usize; 4] {
        let dims = self.0.dim();
        [dims.0, dims.1, dims.2, dims.3]
    }

    /// Contiguous row-major view of the data.
    pub fn as_slice(&self) -> Option<&[f32]> {
        self.0.as_slice()
    }

    pub fn array(&self) -> &Array4<f32> {
        &self.0
    }
}

impl From<Array4<f32>> for Blob {
    fn from(array: Array4<f32>) -> Self {
        Self(array)
    }
}

/// Decode an image file, guessing the format from its contents.
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    let image_load = |reason: String| ClassifyError::ImageLoad {
        path: path.to_path_buf(),
        reason,
    };

    ImageReader::open(path)
        .map_err(|e| image_load(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| image_load(e.to_string()))?
        .decode()
        .map_err(|e| image_load(e.to_string()))
}

/// Source sample positions along one axis: the two neighbouring pixels and
/// the weight of the second.
fn sample_axis(src_len: u32, dst_len: u32) -> Vec<(u32, u32, f32)> {
    let ratio = src_len as f32 / dst_len as f32;
    let last = src_len.saturating_sub(1);
    (0..dst_len)
        .map(|d| {
            let pos = ((d as f32 + 0.5) * ratio - 0.5).max(0.0);
            let i0 = (pos.floor() as u32).min(last);
            let i1 = (i0 + 1).min(last);
            (i0, i1, pos - i0 as f32)
        })
        .collect()
}

/// Build the network input blob from an image.
pub fn blob_from_image(img: &DynamicImage, config: &PreprocessConfig) -> Blob {
    let rgb = img.to_rgb8();
    let xs = sample_axis(rgb.width(), config.width);
    let ys = sample_axis(rgb.height(), config.height);

    let h = config.height as usize;
    let w = config.width as usize;
    let array = Array4::from_shape_fn((1, 3, h, w), |(_, c, y, x)| {
        // Output channel c in B, G, R order, or R, G, B when swapped.
        let rgb_channel = if config.swap_rb { c } else { 2 - c };
        let (x0, x1, fx) = xs[x];
        let (y0, y1, fy) = ys[y];
        let at = |px: u32, py: u32| f32::from(rgb.get_pixel(px, py)[rgb_channel]);

        let top = at(x0, y0) + (at(x1, y0) - at(x0, y0)) * fx;
        let bottom = at(x0, y1) + (at(x1, y1) - at(x0, y1)) * fx;
        let value = top + (bottom - top) * fy;
        (value - config.mean[c]) * config.scale
    });

    Blob(array)
}
