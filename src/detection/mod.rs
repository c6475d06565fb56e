pub mod color;
pub mod digits;
pub mod edges;
pub mod fusion;
pub mod ocr;
pub mod preprocessing;
pub mod region;

use std::sync::Arc;
use std::time::Duration;

use image::DynamicImage;

use crate::models::{DetectionVerdict, MethodResult, MethodSource};
use crate::profiles::ProfileTable;
use self::ocr::TextRecognizer;

/// Default bound on a single text-recognition call.
const DEFAULT_OCR_TIMEOUT: Duration = Duration::from_secs(5);

/// Multi-method INR denomination detector.
///
/// Holds only immutable state (the profile table and a shared recognizer
/// handle), so one detector serves concurrent callers without coordination.
pub struct CurrencyDetector {
    profiles: ProfileTable,
    recognizer: Arc<dyn TextRecognizer>,
    ocr_timeout: Duration,
    verbose: bool,
}

impl CurrencyDetector {
    pub fn new(recognizer: Arc<dyn TextRecognizer>) -> Self {
        Self {
            profiles: ProfileTable::new(),
            recognizer,
            ocr_timeout: DEFAULT_OCR_TIMEOUT,
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_ocr_timeout(mut self, timeout: Duration) -> Self {
        self.ocr_timeout = timeout;
        self
    }

    /// Run the full multi-method analysis on one frame.
    ///
    /// Always returns a verdict for a decoded frame: a method that fails,
    /// times out or panics degrades to an empty result and fusion proceeds
    /// with whatever the remaining methods produced.
    pub fn detect(&self, frame: &DynamicImage) -> DetectionVerdict {
        if self.verbose {
            println!(
                "Preprocessing frame ({}x{})...",
                frame.width(),
                frame.height()
            );
        }
        let processed = preprocessing::preprocess(frame);

        let table = &self.profiles;
        let recognizer = &self.recognizer;
        let timeout = self.ocr_timeout;

        if self.verbose {
            println!("Running analysis methods...");
        }

        // The methods only read the shared frame and table; joining the
        // scope is the barrier fusion waits on.
        let (digit_reading, note_region, coverage_matches, mean_color, edge_estimate) =
            std::thread::scope(|scope| {
                let digit_task = scope.spawn(|| digits::extract(&processed, recognizer, timeout));
                let region_task = scope.spawn(|| region::locate(&processed));
                let coverage_task = scope.spawn(|| color::match_by_coverage(&processed, table));
                let mean_task = scope.spawn(|| color::match_by_mean(&processed, table));
                let edge_task = scope.spawn(|| edges::estimate(&processed));

                (
                    digit_task
                        .join()
                        .unwrap_or_else(|_| digits::DigitReading::empty()),
                    region_task.join().unwrap_or(None),
                    coverage_task.join().unwrap_or_default(),
                    mean_task
                        .join()
                        .unwrap_or_else(|_| MethodResult::empty(MethodSource::ColorAverage)),
                    edge_task.join().unwrap_or_else(|_| {
                        (
                            MethodResult::empty(MethodSource::EdgeComplexity),
                            edges::EdgeDensity::default(),
                        )
                    }),
                )
            });

        let size_matches = note_region
            .as_ref()
            .map(|region| region::match_by_size(region.aspect_ratio, table))
            .unwrap_or_default();

        if self.verbose {
            match digit_reading.result.denomination {
                Some(denomination) => println!(
                    "  digits: {} at {:.1}% (rotation {}°)",
                    denomination, digit_reading.result.confidence, digit_reading.rotation
                ),
                None => println!("  digits: no valid reading"),
            }
            match &note_region {
                Some(region) => println!(
                    "  region: {}x{} px, aspect {:.2}, {} size match(es)",
                    region.width,
                    region.height,
                    region.aspect_ratio,
                    size_matches.len()
                ),
                None => println!("  region: no note outline found"),
            }
            println!("  color coverage: {} candidate(s)", coverage_matches.len());
            if let Some(denomination) = mean_color.denomination {
                println!(
                    "  average color: {} at {:.1}%",
                    denomination, mean_color.confidence
                );
            }
            if let Some(hue) = color::dominant_hue(&processed) {
                println!("  dominant hue: {:.0}°", hue);
            }
            let density = edge_estimate.1;
            println!(
                "  edge density L/C/R: {:.3}/{:.3}/{:.3} (global {:.3})",
                density.left, density.center, density.right, density.global
            );
        }

        let outputs = fusion::MethodOutputs {
            ocr: digit_reading.result,
            size_matches,
            coverage_matches,
            mean_color,
            edge_estimate: edge_estimate.0,
        };
        fusion::fuse(&outputs, table)
    }
}
