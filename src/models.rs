use serde::Serialize;

/// The seven legal INR note face values.
///
/// Variant order is ascending face value, so the derived `Ord` doubles as
/// the deterministic tie-break order used throughout the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "u32")]
pub enum Denomination {
    Ten,
    Twenty,
    Fifty,
    OneHundred,
    TwoHundred,
    FiveHundred,
    TwoThousand,
}

impl Denomination {
    pub const ALL: [Denomination; 7] = [
        Denomination::Ten,
        Denomination::Twenty,
        Denomination::Fifty,
        Denomination::OneHundred,
        Denomination::TwoHundred,
        Denomination::FiveHundred,
        Denomination::TwoThousand,
    ];

    /// Face value in rupees.
    pub fn value(self) -> u32 {
        match self {
            Denomination::Ten => 10,
            Denomination::Twenty => 20,
            Denomination::Fifty => 50,
            Denomination::OneHundred => 100,
            Denomination::TwoHundred => 200,
            Denomination::FiveHundred => 500,
            Denomination::TwoThousand => 2000,
        }
    }

    pub fn from_value(value: u32) -> Option<Denomination> {
        Denomination::ALL.into_iter().find(|d| d.value() == value)
    }
}

impl From<Denomination> for u32 {
    fn from(denomination: Denomination) -> u32 {
        denomination.value()
    }
}

impl std::fmt::Display for Denomination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "₹{}", self.value())
    }
}

/// Which analysis method produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodSource {
    Ocr,
    Size,
    ColorCoverage,
    ColorAverage,
    EdgeComplexity,
}

impl MethodSource {
    pub fn name(self) -> &'static str {
        match self {
            MethodSource::Ocr => "digit recognition",
            MethodSource::Size => "size matching",
            MethodSource::ColorCoverage => "color coverage",
            MethodSource::ColorAverage => "average color",
            MethodSource::EdgeComplexity => "edge complexity",
        }
    }
}

/// One method's vote: a candidate denomination and a confidence in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MethodResult {
    pub denomination: Option<Denomination>,
    pub confidence: f32,
    pub source: MethodSource,
}

impl MethodResult {
    pub fn new(denomination: Denomination, confidence: f32, source: MethodSource) -> Self {
        Self {
            denomination: Some(denomination),
            confidence,
            source,
        }
    }

    /// A method that produced nothing; contributes zero to fusion.
    pub fn empty(source: MethodSource) -> Self {
        Self {
            denomination: None,
            confidence: 0.0,
            source,
        }
    }
}

/// The note outline found by the region locator.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteRegion {
    /// Corners of the approximating quadrilateral, image coordinates.
    pub corners: [(i32, i32); 4],
    /// Bounding-box dimensions in pixels.
    pub width: u32,
    pub height: u32,
    /// Width over height, inverted when below 1 so orientation is irrelevant.
    pub aspect_ratio: f32,
}

/// The sole detector output. Serializes to the wire shape consumed by callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionVerdict {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub denomination: Option<Denomination>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_name: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    pub verified: bool,
    pub message: String,
}

impl DetectionVerdict {
    /// No method produced any candidate.
    pub fn no_note() -> Self {
        Self {
            success: false,
            denomination: None,
            confidence: None,
            currency: None,
            symbol: None,
            color_name: None,
            method: None,
            verified: false,
            message: "No currency note detected. Please ensure the note is fully visible in frame."
                .to_string(),
        }
    }

    /// A winner emerged but its accumulated score fell below the floor.
    pub fn low_confidence() -> Self {
        Self {
            success: false,
            denomination: None,
            confidence: None,
            currency: None,
            symbol: None,
            color_name: None,
            method: None,
            verified: false,
            message:
                "Detection confidence too low. Please hold the note flat and ensure good lighting."
                    .to_string(),
        }
    }
}
