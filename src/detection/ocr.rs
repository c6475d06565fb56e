use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use image::GrayImage;
use ocrs::{ImageSource, OcrEngine, OcrEngineParams};
use rten::Model;

/// Boundary to the external text-recognition engine.
///
/// Implementations return whatever raw text the engine read, which may be
/// empty or garbage; an empty string is a normal result, not an error.
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, image: &GrayImage) -> anyhow::Result<String>;
}

/// ocrs-backed recognizer with models loaded once at construction.
pub struct OcrsRecognizer {
    engine: OcrEngine,
}

impl OcrsRecognizer {
    /// Load models from the standard cache location.
    pub fn from_cache_dir() -> anyhow::Result<Self> {
        let home_dir = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE"))?;

        let cache_dir = Path::new(&home_dir).join(".cache/ocrs");
        let detection_model_path = cache_dir.join("text-detection.rten");
        let recognition_model_path = cache_dir.join("text-recognition.rten");

        if !detection_model_path.exists() || !recognition_model_path.exists() {
            anyhow::bail!(
                "OCR models not found. Please run: ocrs-cli --help (or download models manually)\n\
                 Expected locations:\n  - {}\n  - {}",
                detection_model_path.display(),
                recognition_model_path.display()
            );
        }

        Self::from_model_paths(&detection_model_path, &recognition_model_path)
    }

    pub fn from_model_paths(detection: &Path, recognition: &Path) -> anyhow::Result<Self> {
        let detection_model = Model::load_file(detection)?;
        let recognition_model = Model::load_file(recognition)?;

        let engine = OcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })?;

        Ok(Self { engine })
    }
}

impl TextRecognizer for OcrsRecognizer {
    fn recognize(&self, image: &GrayImage) -> anyhow::Result<String> {
        // The engine wants RGB input regardless of source color depth.
        let rgb = image::DynamicImage::ImageLuma8(image.clone()).to_rgb8();

        let source = ImageSource::from_bytes(rgb.as_raw(), rgb.dimensions())
            .map_err(|e| anyhow::anyhow!("invalid recognizer input buffer: {e}"))?;
        let input = self.engine.prepare_input(source)?;
        let text = self.engine.get_text(&input)?;

        Ok(text)
    }
}

/// Run one recognizer call on a worker thread, bounded by `timeout`.
///
/// Timeouts and recognizer errors both degrade to `None` so a wedged or
/// failing engine costs one reading, not the whole detection. A timed-out
/// worker is abandoned; it finishes in the background and its result is
/// dropped with the channel.
pub fn recognize_bounded(
    recognizer: &Arc<dyn TextRecognizer>,
    image: &GrayImage,
    timeout: Duration,
) -> Option<String> {
    let (sender, receiver) = mpsc::channel();
    let worker_recognizer = Arc::clone(recognizer);
    let worker_image = image.clone();

    thread::spawn(move || {
        let _ = sender.send(worker_recognizer.recognize(&worker_image));
    });

    match receiver.recv_timeout(timeout) {
        Ok(Ok(text)) => Some(text),
        Ok(Err(_)) | Err(_) => None,
    }
}
