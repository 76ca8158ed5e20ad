//! Batch driver.
//!
//! Processes every submitted image independently on the rayon pool —
//! no two images share a buffer, so there is nothing to lock. Per-item
//! decode failures and cancellations are collected as failures without
//! aborting the rest of the batch, and an atomic completion counter
//! guarantees the batch-complete signal fires exactly once.

use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use tracing::{info, warn};

use crate::buffer::PixelBuffer;
use crate::error::{DecodeError, OptionsError, PipelineError};
use crate::options::ProcessingOptions;
use crate::pipeline::{CancelToken, Decoded};

/// Produces a decoded pixel buffer for one batch item.
///
/// This is the seam to the external decoder: the core never touches
/// encoded image data. Already-decoded buffers implement it directly,
/// as does `Result<PixelBuffer, DecodeError>` for callers that decode
/// (and possibly fail) before submission.
pub trait ImageSource {
    fn decode(self) -> Result<PixelBuffer, DecodeError>;
}

impl ImageSource for PixelBuffer {
    fn decode(self) -> Result<PixelBuffer, DecodeError> {
        Ok(self)
    }
}

impl ImageSource for Result<PixelBuffer, DecodeError> {
    fn decode(self) -> Result<PixelBuffer, DecodeError> {
        self
    }
}

/// One submitted image: a filename and its (not yet decoded) source.
#[derive(Debug, Clone)]
pub struct BatchItem<S> {
    pub filename: String,
    pub source: S,
}

impl<S> BatchItem<S> {
    pub fn new(filename: impl Into<String>, source: S) -> Self {
        Self {
            filename: filename.into(),
            source,
        }
    }
}

/// A finished image, named `processed_<original>`. The buffer is owned
/// by the caller from here on.
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    pub filename: String,
    pub buffer: PixelBuffer,
}

/// An image that never reached the results: decode failure or
/// cancellation, keyed by its original filename.
#[derive(Debug, Clone)]
pub struct BatchFailure {
    pub filename: String,
    pub error: PipelineError,
}

/// Everything a batch run produced. Results keep submission order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub results: Vec<ProcessedImage>,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    /// Whether every submitted image reached the results.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Batch progress callbacks.
///
/// All methods default to no-ops; implement only what you need.
/// `preprocess` and the per-image notifications run on worker threads
/// and may interleave across images; `loading_started`,
/// `loading_finished` and `results_ready` each fire exactly once per
/// batch.
pub trait BatchObserver: Sync {
    /// The batch was accepted and workers are about to start.
    fn loading_started(&self, _total: usize) {}

    /// Fired per image after the mask/threshold snapshot is captured
    /// and before the built-in preprocessing filters run. The buffer
    /// may be mutated for instrumentation or externally-driven
    /// filtering; the captured snapshot is unaffected.
    fn preprocess(&self, _filename: &str, _buffer: &mut PixelBuffer, _options: &ProcessingOptions) {
    }

    /// An image reached the results. `completed` counts every settled
    /// image (finished or failed) including this one.
    fn image_finished(&self, _filename: &str, _completed: usize, _total: usize) {}

    /// An image dropped out of the batch.
    fn image_failed(&self, _filename: &str, _error: &PipelineError) {}

    /// Every submitted image has settled. Fires exactly once.
    fn loading_finished(&self) {}

    /// The ordered result list, fired once before `process_batch`
    /// returns.
    fn results_ready(&self, _results: &[ProcessedImage]) {}
}

/// Observer that ignores every notification.
pub struct NoObserver;

impl BatchObserver for NoObserver {}

/// Process a whole batch.
///
/// Options are validated once up front; a rejected configuration
/// fails the call before any image is touched. Images then run
/// independently (and in parallel) to completion; per-item failures
/// land in the report's `failures` list.
///
/// # Errors
/// Returns [`OptionsError`] when the shared configuration is invalid.
pub fn process_batch<S>(
    items: Vec<BatchItem<S>>,
    options: &ProcessingOptions,
    cancel: &CancelToken,
    observer: &dyn BatchObserver,
) -> Result<BatchReport, OptionsError>
where
    S: ImageSource + Send,
{
    options.validate()?;

    let total = items.len();
    observer.loading_started(total);

    // Guards the batch-complete signal: the worker that settles the
    // last image — whichever thread that is — fires it, exactly once.
    let settled = AtomicUsize::new(0);

    let outcomes: Vec<(String, Result<PixelBuffer, PipelineError>)> = items
        .into_par_iter()
        .map(|item| {
            let BatchItem { filename, source } = item;
            let outcome = run_one(&filename, source, options, cancel, observer);

            let done = settled.fetch_add(1, Ordering::SeqCst) + 1;
            match &outcome {
                Ok(_) => observer.image_finished(&filename, done, total),
                Err(error) => {
                    warn!(%filename, %error, "image dropped from batch");
                    observer.image_failed(&filename, error);
                }
            }
            if done == total {
                observer.loading_finished();
            }

            (filename, outcome)
        })
        .collect();

    if total == 0 {
        observer.loading_finished();
    }

    let mut report = BatchReport::default();
    for (filename, outcome) in outcomes {
        match outcome {
            Ok(buffer) => report.results.push(ProcessedImage {
                filename: format!("processed_{filename}"),
                buffer,
            }),
            Err(error) => report.failures.push(BatchFailure { filename, error }),
        }
    }

    info!(
        results = report.results.len(),
        failures = report.failures.len(),
        "batch complete"
    );
    observer.results_ready(&report.results);
    Ok(report)
}

fn run_one<S: ImageSource>(
    filename: &str,
    source: S,
    options: &ProcessingOptions,
    cancel: &CancelToken,
    observer: &dyn BatchObserver,
) -> Result<PixelBuffer, PipelineError> {
    cancel.checkpoint()?;
    let buffer = source.decode()?;
    let mut captured = Decoded::new(buffer, options.clone())?.capture();
    cancel.checkpoint()?;
    observer.preprocess(filename, captured.buffer_mut(), options);
    let preprocessed = captured.preprocess();
    cancel.checkpoint()?;
    Ok(preprocessed.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn gray_buffer(v: u8) -> PixelBuffer {
        let mut buf = PixelBuffer::new(2, 2);
        for y in 0..2 {
            for x in 0..2 {
                buf.set_pixel(x, y, [v, v, v, 255]);
            }
        }
        buf
    }

    #[derive(Default)]
    struct CountingObserver {
        started: AtomicUsize,
        finished_images: AtomicUsize,
        failed_images: AtomicUsize,
        loading_finished: AtomicUsize,
        results_ready: AtomicUsize,
        result_names: Mutex<Vec<String>>,
    }

    impl BatchObserver for CountingObserver {
        fn loading_started(&self, _total: usize) {
            self.started.fetch_add(1, Ordering::SeqCst);
        }
        fn image_finished(&self, _filename: &str, _completed: usize, _total: usize) {
            self.finished_images.fetch_add(1, Ordering::SeqCst);
        }
        fn image_failed(&self, _filename: &str, _error: &PipelineError) {
            self.failed_images.fetch_add(1, Ordering::SeqCst);
        }
        fn loading_finished(&self) {
            self.loading_finished.fetch_add(1, Ordering::SeqCst);
        }
        fn results_ready(&self, results: &[ProcessedImage]) {
            self.results_ready.fetch_add(1, Ordering::SeqCst);
            *self.result_names.lock().unwrap() =
                results.iter().map(|r| r.filename.clone()).collect();
        }
    }

    #[test]
    fn results_keep_submission_order_and_prefix_names() {
        let items = vec![
            BatchItem::new("a.png", gray_buffer(10)),
            BatchItem::new("b.png", gray_buffer(20)),
            BatchItem::new("c.png", gray_buffer(30)),
        ];
        let report = process_batch(
            items,
            &ProcessingOptions::default(),
            &CancelToken::new(),
            &NoObserver,
        )
        .unwrap();
        assert!(report.is_complete());
        let names: Vec<_> = report.results.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(
            names,
            ["processed_a.png", "processed_b.png", "processed_c.png"]
        );
    }

    #[test]
    fn decode_failure_does_not_abort_the_batch() {
        let items = vec![
            BatchItem::new("good.png", Ok(gray_buffer(10))),
            BatchItem::new("bad.png", Err(DecodeError::source("truncated file"))),
        ];
        let observer = CountingObserver::default();
        let report = process_batch(
            items,
            &ProcessingOptions::default(),
            &CancelToken::new(),
            &observer,
        )
        .unwrap();

        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].filename, "processed_good.png");
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].filename, "bad.png");
        assert!(matches!(
            report.failures[0].error,
            PipelineError::Decode(DecodeError::Source(_))
        ));
        assert_eq!(observer.failed_images.load(Ordering::SeqCst), 1);
        assert_eq!(observer.finished_images.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn completion_signals_fire_exactly_once() {
        let items: Vec<BatchItem<PixelBuffer>> = (0..8)
            .map(|i| BatchItem::new(format!("{i}.png"), gray_buffer(i as u8 * 10)))
            .collect();
        let observer = CountingObserver::default();
        process_batch(
            items,
            &ProcessingOptions::default(),
            &CancelToken::new(),
            &observer,
        )
        .unwrap();

        assert_eq!(observer.started.load(Ordering::SeqCst), 1);
        assert_eq!(observer.loading_finished.load(Ordering::SeqCst), 1);
        assert_eq!(observer.results_ready.load(Ordering::SeqCst), 1);
        assert_eq!(observer.finished_images.load(Ordering::SeqCst), 8);
        assert_eq!(observer.result_names.lock().unwrap().len(), 8);
    }

    #[test]
    fn empty_batch_still_signals_completion() {
        let observer = CountingObserver::default();
        let report = process_batch(
            Vec::<BatchItem<PixelBuffer>>::new(),
            &ProcessingOptions::default(),
            &CancelToken::new(),
            &observer,
        )
        .unwrap();
        assert!(report.results.is_empty());
        assert_eq!(observer.loading_finished.load(Ordering::SeqCst), 1);
        assert_eq!(observer.results_ready.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn invalid_options_reject_the_whole_batch() {
        let items = vec![BatchItem::new("a.png", gray_buffer(10))];
        let err = process_batch(
            items,
            &ProcessingOptions {
                gamma: -1.0,
                ..Default::default()
            },
            &CancelToken::new(),
            &NoObserver,
        )
        .unwrap_err();
        assert!(matches!(err, OptionsError::InvalidGamma(_)));
    }

    #[test]
    fn cancelled_batch_reports_every_item() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let items = vec![
            BatchItem::new("a.png", gray_buffer(10)),
            BatchItem::new("b.png", gray_buffer(20)),
        ];
        let report = process_batch(items, &ProcessingOptions::default(), &cancel, &NoObserver)
            .unwrap();
        assert!(report.results.is_empty());
        assert_eq!(report.failures.len(), 2);
        assert!(report
            .failures
            .iter()
            .all(|f| f.error == PipelineError::Cancelled));
    }

    #[test]
    fn preprocess_hook_mutates_pixels_but_not_the_snapshot() {
        // The hook paints a colored pixel gray. The stage still skips
        // that pixel: its mask flag was captured before the hook ran.
        struct PaintGray;
        impl BatchObserver for PaintGray {
            fn preprocess(
                &self,
                _filename: &str,
                buffer: &mut PixelBuffer,
                _options: &ProcessingOptions,
            ) {
                buffer.set_pixel(0, 0, [60, 60, 60, 255]);
            }
        }

        let mut buf = PixelBuffer::new(1, 1);
        buf.set_pixel(0, 0, [200, 0, 0, 255]);
        let report = process_batch(
            vec![BatchItem::new("hook.png", buf)],
            &ProcessingOptions::default(),
            &CancelToken::new(),
            &PaintGray,
        )
        .unwrap();
        // Untouched by the inversion stage, alpha forced opaque.
        assert_eq!(report.results[0].buffer.pixel(0, 0), [60, 60, 60, 255]);
    }
}
