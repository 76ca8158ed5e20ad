//! Per-image pipeline.
//!
//! Each image moves through a fixed sequence of states:
//!
//! ```text
//! Decoded -> Captured (mask + optional Otsu estimate) ->
//! Preprocessed -> finished buffer
//! ```
//!
//! The grayscale mask and the adaptive threshold estimate are both
//! computed from the buffer *as decoded*, before any filter mutates
//! it — the final stage's gating and the adaptive threshold must
//! reflect the source image, not the filtered one. The typestate
//! encoding makes that ordering structural: there is no way to reach
//! [`Captured::preprocess`] without having captured first.
//!
//! [`process_image`] drives all stages and checks a [`CancelToken`]
//! between them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::buffer::PixelBuffer;
use crate::error::{OptionsError, PipelineError};
use crate::filters::blur::box_blur;
use crate::filters::color_adjust::{adjust_brightness_contrast, apply_gamma};
use crate::filters::grayscale::convert_to_grayscale;
use crate::filters::sharpen::sharpen;
use crate::filters::threshold::{apply_stage, StageMode};
use crate::mask::GrayscaleMask;
use crate::options::ProcessingOptions;
use crate::otsu::otsu_threshold;

/// Cooperative cancellation flag, shared between a batch driver and
/// whoever wants to stop it.
///
/// Clones share the same flag. The pipeline honors cancellation
/// between stages, never mid-filter.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    pub(crate) fn checkpoint(&self) -> Result<(), PipelineError> {
        if self.is_cancelled() {
            Err(PipelineError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Entry state: a decoded buffer paired with validated options.
#[must_use = "pipeline stages are consumed by advancing — call .capture() to continue"]
pub struct Decoded {
    buffer: PixelBuffer,
    options: ProcessingOptions,
}

impl Decoded {
    /// Validate `options` and enter the pipeline.
    ///
    /// # Errors
    /// Returns [`OptionsError`] for gamma <= 0 or contrast at the
    /// formula's pole — rejected here so no stage ever computes
    /// non-finite pixels.
    pub fn new(buffer: PixelBuffer, options: ProcessingOptions) -> Result<Self, OptionsError> {
        options.validate()?;
        Ok(Self { buffer, options })
    }

    /// Capture the grayscale mask and, when the options ask for an
    /// adaptive threshold, the Otsu estimate — both from the
    /// as-decoded pixels.
    pub fn capture(self) -> Captured {
        let mask = GrayscaleMask::capture(&self.buffer, self.options.tolerance);
        let adaptive = self
            .options
            .wants_adaptive_threshold()
            .then(|| otsu_threshold(&self.buffer));
        debug!(
            grayscale_pixels = mask.count_true(),
            adaptive_threshold = ?adaptive,
            "snapshot captured"
        );
        Captured {
            buffer: self.buffer,
            mask,
            adaptive,
            options: self.options,
        }
    }
}

/// Snapshot state: mask and optional estimate are pinned; the buffer
/// is still untouched.
#[must_use = "pipeline stages are consumed by advancing — call .preprocess() to continue"]
pub struct Captured {
    buffer: PixelBuffer,
    mask: GrayscaleMask,
    adaptive: Option<u8>,
    options: ProcessingOptions,
}

impl Captured {
    /// The mask captured from the original pixels.
    pub fn mask(&self) -> &GrayscaleMask {
        &self.mask
    }

    /// The Otsu estimate, if one was requested and captured.
    pub fn adaptive_threshold(&self) -> Option<u8> {
        self.adaptive
    }

    /// Mutable buffer access, for instrumentation hooks that want to
    /// observe or drive preprocessing externally. The captured mask
    /// and estimate are unaffected.
    pub fn buffer_mut(&mut self) -> &mut PixelBuffer {
        &mut self.buffer
    }

    /// Run the preprocessing filters in their fixed order: grayscale,
    /// box blur, brightness/contrast, gamma, sharpen — each only when
    /// its option asks for it, each in place.
    pub fn preprocess(self) -> Preprocessed {
        let Self {
            mut buffer,
            mask,
            adaptive,
            options,
        } = self;
        let data = buffer.array_mut();

        if options.grayscale {
            debug!("grayscale conversion");
            convert_to_grayscale(data);
        }
        if options.blur && options.blur_radius > 0 {
            debug!(radius = options.blur_radius, "box blur");
            box_blur(data, options.blur_radius);
        }
        if options.brightness != 0 || options.contrast != 0 {
            debug!(
                brightness = options.brightness,
                contrast = options.contrast,
                "brightness/contrast"
            );
            adjust_brightness_contrast(data, options.brightness, options.contrast);
        }
        if options.gamma != 1.0 {
            debug!(gamma = options.gamma, "gamma correction");
            apply_gamma(data, options.gamma);
        }
        if options.sharpen {
            debug!("sharpen");
            sharpen(data);
        }

        Preprocessed {
            buffer,
            mask,
            adaptive,
            options,
        }
    }
}

/// Filtered state: ready for the final threshold/inversion pass.
#[must_use = "pipeline stages are consumed by advancing — call .finish() to continue"]
pub struct Preprocessed {
    buffer: PixelBuffer,
    mask: GrayscaleMask,
    adaptive: Option<u8>,
    options: ProcessingOptions,
}

impl Preprocessed {
    /// Run the threshold/inversion stage against the pre-filter mask
    /// and hand the buffer back to the caller.
    pub fn finish(self) -> PixelBuffer {
        let Self {
            mut buffer,
            mask,
            adaptive,
            options,
        } = self;

        let mode = if options.use_threshold {
            StageMode::Threshold(adaptive.unwrap_or(options.threshold))
        } else {
            StageMode::Invert
        };
        let transparency = options.transparent.then_some(options.transparency_color);

        debug!(?mode, ?transparency, "threshold/inversion stage");
        apply_stage(buffer.array_mut(), &mask, mode, transparency);
        buffer
    }
}

/// Run one image through every stage, honoring `cancel` between them.
///
/// # Errors
/// Returns [`PipelineError::InvalidOptions`] for a configuration the
/// validator rejects, or [`PipelineError::Cancelled`] when the token
/// fires before the image completes.
pub fn process_image(
    buffer: PixelBuffer,
    options: &ProcessingOptions,
    cancel: &CancelToken,
) -> Result<PixelBuffer, PipelineError> {
    cancel.checkpoint()?;
    let decoded = Decoded::new(buffer, options.clone())?;
    let captured = decoded.capture();
    cancel.checkpoint()?;
    let preprocessed = captured.preprocess();
    cancel.checkpoint()?;
    Ok(preprocessed.finish())
}
