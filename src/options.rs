//! Processing configuration.
//!
//! One immutable [`ProcessingOptions`] value is shared read-only by
//! every image in a batch. The struct serializes with serde so callers
//! can persist option profiles and feed them back in later.

use serde::{Deserialize, Serialize};

use crate::error::OptionsError;

/// How the effective threshold is chosen in threshold mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdaptiveMethod {
    /// Use the configured [`ProcessingOptions::threshold`] value.
    #[default]
    Custom,
    /// Estimate a threshold from the image's own histogram.
    Otsu,
}

/// Which binarized value becomes transparent when transparency keying
/// is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransparencyColor {
    /// Pixels that end up at 0 get alpha 0.
    #[default]
    Black,
    /// Pixels that end up at 255 get alpha 0.
    White,
}

/// Configuration for one batch run.
///
/// Numeric fields are expected in their documented UI ranges
/// (brightness/contrast -100..=100, gamma > 0); [`validate`] rejects
/// the values that would make the pixel math non-finite.
///
/// [`validate`]: ProcessingOptions::validate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingOptions {
    /// Channel spread (`max - min`) at or below which a pixel counts
    /// as grayscale.
    pub tolerance: u8,
    /// `true` selects threshold mode for the final stage, `false`
    /// selects inversion mode.
    pub use_threshold: bool,
    /// Custom threshold, used when [`adaptive_method`] is
    /// [`AdaptiveMethod::Custom`].
    ///
    /// [`adaptive_method`]: Self::adaptive_method
    pub threshold: u8,
    pub adaptive_method: AdaptiveMethod,
    /// Convert the image to grayscale before the final stage.
    pub grayscale: bool,
    /// Apply a box blur before the final stage.
    pub blur: bool,
    /// Box blur radius; the kernel is `2*radius+1` on a side. A radius
    /// of 0 disables the blur even when [`blur`](Self::blur) is set.
    pub blur_radius: u32,
    /// Additive brightness, -100..=100.
    pub brightness: i32,
    /// Contrast percentage, -100..=100 by UI contract; anything
    /// strictly inside (-259, 259) is mathematically valid.
    pub contrast: i32,
    /// Gamma correction exponent, > 0. 1.0 is the identity.
    pub gamma: f32,
    /// Apply the 3x3 sharpen kernel before the final stage.
    pub sharpen: bool,
    /// Enable transparency keying on mask-true pixels.
    pub transparent: bool,
    pub transparency_color: TransparencyColor,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            tolerance: 5,
            use_threshold: false,
            threshold: 128,
            adaptive_method: AdaptiveMethod::Custom,
            grayscale: false,
            blur: false,
            blur_radius: 1,
            brightness: 0,
            contrast: 0,
            gamma: 1.0,
            sharpen: false,
            transparent: false,
            transparency_color: TransparencyColor::Black,
        }
    }
}

impl ProcessingOptions {
    /// Reject configurations that would produce non-finite pixel
    /// values: gamma <= 0 (or NaN/inf) and contrast at or beyond the
    /// +/-259 pole of the contrast-factor formula.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if !self.gamma.is_finite() || self.gamma <= 0.0 {
            return Err(OptionsError::InvalidGamma(self.gamma));
        }
        if self.contrast <= -259 || self.contrast >= 259 {
            return Err(OptionsError::ContrastOutOfRange(self.contrast));
        }
        Ok(())
    }

    /// Whether the final stage needs an Otsu estimate captured before
    /// preprocessing runs.
    pub fn wants_adaptive_threshold(&self) -> bool {
        self.use_threshold && self.adaptive_method == AdaptiveMethod::Otsu
    }
}
