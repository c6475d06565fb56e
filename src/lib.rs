pub mod detection;
pub mod models;
pub mod profiles;

pub use detection::CurrencyDetector;
pub use detection::ocr::{OcrsRecognizer, TextRecognizer};
pub use models::{Denomination, DetectionVerdict, MethodResult, MethodSource, NoteRegion};
pub use profiles::{DenominationProfile, HsvRange, ProfileTable};
