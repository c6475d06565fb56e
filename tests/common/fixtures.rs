use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use image::{DynamicImage, GrayImage, Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

use notesight::TextRecognizer;

/// A frame filled with a single color.
pub fn solid_frame(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
}

/// A black frame with a filled note-colored rectangle centered in it.
pub fn note_frame(
    canvas: (u32, u32),
    note: (u32, u32),
    color: [u8; 3],
) -> DynamicImage {
    let mut frame = RgbImage::from_pixel(canvas.0, canvas.1, Rgb([0, 0, 0]));
    let x = ((canvas.0 - note.0) / 2) as i32;
    let y = ((canvas.1 - note.1) / 2) as i32;
    draw_filled_rect_mut(&mut frame, Rect::at(x, y).of_size(note.0, note.1), Rgb(color));
    DynamicImage::ImageRgb8(frame)
}

/// Always returns the same reading; counts how often it was called.
pub struct FixedRecognizer {
    text: String,
    calls: AtomicUsize,
}

impl FixedRecognizer {
    pub fn new(text: &str) -> Arc<Self> {
        Arc::new(Self {
            text: text.to_string(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TextRecognizer for FixedRecognizer {
    fn recognize(&self, _image: &GrayImage) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.clone())
    }
}

/// Replays a script, one entry per call, then empty readings forever.
pub struct ScriptedRecognizer {
    script: Mutex<VecDeque<String>>,
}

impl ScriptedRecognizer {
    pub fn new(entries: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(entries.iter().map(|s| s.to_string()).collect()),
        })
    }
}

impl TextRecognizer for ScriptedRecognizer {
    fn recognize(&self, _image: &GrayImage) -> anyhow::Result<String> {
        let mut script = self.script.lock().unwrap();
        Ok(script.pop_front().unwrap_or_default())
    }
}

/// Never reads anything.
pub struct SilentRecognizer;

impl TextRecognizer for SilentRecognizer {
    fn recognize(&self, _image: &GrayImage) -> anyhow::Result<String> {
        Ok(String::new())
    }
}

/// Fails every call.
pub struct FailingRecognizer;

impl TextRecognizer for FailingRecognizer {
    fn recognize(&self, _image: &GrayImage) -> anyhow::Result<String> {
        anyhow::bail!("recognition backend unavailable")
    }
}

/// Sleeps past any sane timeout before answering.
pub struct SleepyRecognizer {
    pub delay: Duration,
}

impl TextRecognizer for SleepyRecognizer {
    fn recognize(&self, _image: &GrayImage) -> anyhow::Result<String> {
        thread::sleep(self.delay);
        Ok("2000".to_string())
    }
}
