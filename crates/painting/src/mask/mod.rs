//! Mask rasterizer - turns the paint overlay into a binary mask
//!
//! The output always has the original image's dimensions and contains only
//! opaque white (painted) and opaque black (not painted) pixels. Three ways
//! of getting there are offered, see [`ResampleStrategy`].

mod encode;
mod rasterizer;
mod resample;
mod threshold;

pub use encode::{mask_filename, BinaryMask};
pub use rasterizer::MaskRasterizer;
pub use resample::{center_crop, draw_and_sample, sample_nearest};
pub use threshold::{clears_alpha_threshold, is_stroke_pixel, threshold_image};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::surface::SurfaceError;

#[derive(Debug, Error)]
pub enum MaskError {
    #[error("Nothing has been drawn")]
    EmptyMask,
    #[error("Mask target has a zero dimension")]
    ZeroDimensions,
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    #[error("Mask encoding failed: {0}")]
    Encode(String),
}

/// How the overlay is brought to the original image size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResampleStrategy {
    /// Sample the buffer pixel at `floor(x * buffer_w / target_w)`
    Nearest,
    /// Scale the buffer with a bilinear filter, center-cropping first when
    /// aspect ratios differ
    #[default]
    DrawAndSample,
    /// Replay the stroke log directly at target resolution
    Replay,
}

/// Encoded file format of the mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaskFormat {
    #[default]
    Png,
    Jpeg,
}

impl MaskFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            MaskFormat::Png => "png",
            MaskFormat::Jpeg => "jpg",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            MaskFormat::Png => "image/png",
            MaskFormat::Jpeg => "image/jpeg",
        }
    }
}

/// Thresholds are fixed (see [`is_stroke_pixel`]); only the resampling and
/// the file format are configurable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskSettings {
    pub strategy: ResampleStrategy,
    pub format: MaskFormat,
}
