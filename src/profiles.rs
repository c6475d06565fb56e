//! Reference characteristics of INR notes.
//!
//! Physical dimensions follow RBI published sizes; HSV reference boxes are
//! tuned wide to survive faded and unevenly lit notes. Hue is in degrees
//! (0-360), saturation and value in 0-1.

use crate::models::Denomination;

/// Inclusive HSV box a note's ink is expected to fall in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HsvRange {
    pub hue: (f32, f32),
    pub saturation: (f32, f32),
    pub value: (f32, f32),
}

impl HsvRange {
    pub fn contains(&self, hue: f32, saturation: f32, value: f32) -> bool {
        self.hue.0 <= hue
            && hue <= self.hue.1
            && self.saturation.0 <= saturation
            && saturation <= self.saturation.1
            && self.value.0 <= value
            && value <= self.value.1
    }

    /// True when the (hue, saturation) point sits inside the box, ignoring value.
    pub fn contains_mean(&self, hue: f32, saturation: f32) -> bool {
        self.hue.0 <= hue
            && hue <= self.hue.1
            && self.saturation.0 <= saturation
            && saturation <= self.saturation.1
    }

    pub fn hue_center(&self) -> f32 {
        (self.hue.0 + self.hue.1) / 2.0
    }

    pub fn hue_half_width(&self) -> f32 {
        (self.hue.1 - self.hue.0) / 2.0
    }
}

/// Everything the detector knows about one denomination.
#[derive(Debug, Clone, PartialEq)]
pub struct DenominationProfile {
    pub denomination: Denomination,
    /// Long side of the printed note in millimeters.
    pub width_mm: f32,
    /// Short side in millimeters.
    pub height_mm: f32,
    /// width_mm / height_mm, always >= 1.
    pub aspect_ratio: f32,
    pub color_range: HsvRange,
    pub color_name: &'static str,
}

/// Immutable table of all seven profiles, built once per detector and shared
/// read-only across every detection call.
#[derive(Debug, Clone)]
pub struct ProfileTable {
    profiles: [DenominationProfile; 7],
}

impl ProfileTable {
    pub fn new() -> Self {
        let entries: [(Denomination, f32, f32, HsvRange, &'static str); 7] = [
            (
                Denomination::Ten,
                123.0,
                63.0,
                HsvRange {
                    hue: (10.0, 60.0),
                    saturation: (0.12, 1.0),
                    value: (0.12, 1.0),
                },
                "Chocolate Brown/Orange",
            ),
            (
                Denomination::Twenty,
                129.0,
                63.0,
                HsvRange {
                    hue: (40.0, 100.0),
                    saturation: (0.12, 1.0),
                    value: (0.12, 1.0),
                },
                "Greenish Yellow",
            ),
            (
                Denomination::Fifty,
                135.0,
                66.0,
                HsvRange {
                    hue: (170.0, 270.0),
                    saturation: (0.12, 1.0),
                    value: (0.12, 1.0),
                },
                "Fluorescent Blue",
            ),
            (
                Denomination::OneHundred,
                142.0,
                66.0,
                HsvRange {
                    hue: (250.0, 330.0),
                    saturation: (0.08, 1.0),
                    value: (0.12, 1.0),
                },
                "Lavender/Violet",
            ),
            (
                Denomination::TwoHundred,
                146.0,
                66.0,
                HsvRange {
                    hue: (30.0, 80.0),
                    saturation: (0.2, 1.0),
                    value: (0.2, 1.0),
                },
                "Bright Yellow",
            ),
            (
                Denomination::FiveHundred,
                150.0,
                66.0,
                // Grey ink carries no usable hue; the box spans the full
                // hue circle and discriminates on low saturation instead.
                HsvRange {
                    hue: (0.0, 360.0),
                    saturation: (0.0, 0.24),
                    value: (0.12, 0.86),
                },
                "Stone Grey",
            ),
            (
                Denomination::TwoThousand,
                166.0,
                66.0,
                HsvRange {
                    hue: (270.0, 350.0),
                    saturation: (0.12, 1.0),
                    value: (0.12, 1.0),
                },
                "Magenta/Pink",
            ),
        ];

        let profiles = entries.map(|(denomination, width_mm, height_mm, color_range, color_name)| {
            DenominationProfile {
                denomination,
                width_mm,
                height_mm,
                aspect_ratio: width_mm / height_mm,
                color_range,
                color_name,
            }
        });

        Self { profiles }
    }

    pub fn get(&self, denomination: Denomination) -> &DenominationProfile {
        &self.profiles[denomination as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = &DenominationProfile> {
        self.profiles.iter()
    }
}

impl Default for ProfileTable {
    fn default() -> Self {
        Self::new()
    }
}
