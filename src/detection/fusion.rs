use std::collections::BTreeMap;

use crate::models::{Denomination, DetectionVerdict, MethodResult};
use crate::profiles::ProfileTable;

/// Fixed contribution of each method family to the weighted sum.
const OCR_WEIGHT: f32 = 0.6;
const SIZE_WEIGHT: f32 = 0.25;
const COLOR_WEIGHT: f32 = 0.15;

/// How many entries of each ranked match list enter the sum.
const TOP_MATCHES: usize = 3;

/// Agreement of two or more families boosts confidence, capped hard.
const VERIFICATION_BONUS: f32 = 1.2;
const CONFIDENCE_CAP: f32 = 95.0;

/// Verdicts scoring below this floor are reported as failures.
const MIN_CONFIDENCE: f32 = 30.0;

/// Running score and family-agreement flags for one candidate.
#[derive(Debug, Clone, Copy, Default)]
struct VerificationRecord {
    score: f32,
    ocr: bool,
    size: bool,
    color: bool,
}

impl VerificationRecord {
    fn family_count(&self) -> u32 {
        u32::from(self.ocr) + u32::from(self.size) + u32::from(self.color)
    }
}

/// Everything the method fan-out produced for one frame. The mean-color and
/// edge-complexity estimates ride along for diagnostics but never enter the
/// weighted score.
#[derive(Debug, Clone)]
pub struct MethodOutputs {
    pub ocr: MethodResult,
    pub size_matches: Vec<MethodResult>,
    pub coverage_matches: Vec<MethodResult>,
    pub mean_color: MethodResult,
    pub edge_estimate: MethodResult,
}

/// Combine the method outputs into the final verdict.
pub fn fuse(outputs: &MethodOutputs, table: &ProfileTable) -> DetectionVerdict {
    let mut records: BTreeMap<Denomination, VerificationRecord> = BTreeMap::new();

    if let Some(denomination) = outputs.ocr.denomination {
        let record = records.entry(denomination).or_default();
        record.score += outputs.ocr.confidence * OCR_WEIGHT;
        record.ocr = true;
    }

    for result in outputs.size_matches.iter().take(TOP_MATCHES) {
        let Some(denomination) = result.denomination else {
            continue;
        };
        let record = records.entry(denomination).or_default();
        record.score += result.confidence * SIZE_WEIGHT;
        record.size = true;
    }

    for result in outputs.coverage_matches.iter().take(TOP_MATCHES) {
        let Some(denomination) = result.denomination else {
            continue;
        };
        let record = records.entry(denomination).or_default();
        record.score += result.confidence * COLOR_WEIGHT;
        record.color = true;
    }

    if records.is_empty() {
        return DetectionVerdict::no_note();
    }

    // BTreeMap iterates ascending face value, and strictly-greater keeps the
    // first seen, so equal scores resolve to the smaller denomination.
    let mut winner: Option<(Denomination, VerificationRecord)> = None;
    for (&denomination, &record) in &records {
        let better = match winner {
            None => true,
            Some((_, best)) => record.score > best.score,
        };
        if better {
            winner = Some((denomination, record));
        }
    }
    let Some((denomination, record)) = winner else {
        return DetectionVerdict::no_note();
    };

    let count = record.family_count();
    let mut confidence = record.score;
    if count >= 2 {
        confidence = (confidence * VERIFICATION_BONUS).min(CONFIDENCE_CAP);
    }

    if confidence < MIN_CONFIDENCE {
        return DetectionVerdict::low_confidence();
    }

    let confidence = (confidence * 100.0).round() / 100.0;
    let verified = record.ocr && count >= 2;
    let status = if count >= 2 {
        format!("{count}/3 methods verified")
    } else {
        "Single method detection".to_string()
    };
    let method = if verified {
        format!("Multi-feature ({status})")
    } else {
        status
    };

    let profile = table.get(denomination);
    DetectionVerdict {
        success: true,
        denomination: Some(denomination),
        confidence: Some(confidence),
        currency: Some("INR"),
        symbol: Some("₹"),
        color_name: Some(profile.color_name),
        method: Some(method),
        verified,
        message: format!("Detected {denomination} note with {confidence}% confidence"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MethodSource;

    fn outputs() -> MethodOutputs {
        MethodOutputs {
            ocr: MethodResult::empty(MethodSource::Ocr),
            size_matches: Vec::new(),
            coverage_matches: Vec::new(),
            mean_color: MethodResult::empty(MethodSource::ColorAverage),
            edge_estimate: MethodResult::empty(MethodSource::EdgeComplexity),
        }
    }

    fn size(denomination: Denomination, confidence: f32) -> MethodResult {
        MethodResult::new(denomination, confidence, MethodSource::Size)
    }

    fn coverage(denomination: Denomination, confidence: f32) -> MethodResult {
        MethodResult::new(denomination, confidence, MethodSource::ColorCoverage)
    }

    fn table() -> ProfileTable {
        ProfileTable::new()
    }

    #[test]
    fn empty_outputs_report_no_note() {
        let verdict = fuse(&outputs(), &table());
        assert!(!verdict.success);
        assert!(verdict.message.contains("fully visible"));
    }

    #[test]
    fn ocr_only_at_the_score_floor_still_succeeds() {
        // 50 x 0.6 = 30, exactly the floor; 30 is not below 30.
        let mut out = outputs();
        out.ocr = MethodResult::new(Denomination::FiveHundred, 50.0, MethodSource::Ocr);
        let verdict = fuse(&out, &table());
        assert!(verdict.success);
        assert_eq!(verdict.denomination, Some(Denomination::FiveHundred));
        assert_eq!(verdict.confidence, Some(30.0));
        assert!(!verdict.verified);
        assert_eq!(verdict.method.as_deref(), Some("Single method detection"));
    }

    #[test]
    fn ocr_only_below_the_floor_fails() {
        let mut out = outputs();
        out.ocr = MethodResult::new(Denomination::Ten, 40.0, MethodSource::Ocr);
        let verdict = fuse(&out, &table());
        assert!(!verdict.success);
        assert!(verdict.message.contains("confidence too low"));
    }

    #[test]
    fn full_agreement_is_bonused_capped_and_verified() {
        let mut out = outputs();
        out.ocr = MethodResult::new(Denomination::FiveHundred, 95.0, MethodSource::Ocr);
        out.size_matches = vec![size(Denomination::FiveHundred, 100.0)];
        out.coverage_matches = vec![coverage(Denomination::FiveHundred, 100.0)];
        let verdict = fuse(&out, &table());
        // 57 + 25 + 15 = 97, bonused to 116.4, capped at 95.
        assert_eq!(verdict.confidence, Some(95.0));
        assert!(verdict.verified);
        assert_eq!(
            verdict.method.as_deref(),
            Some("Multi-feature (3/3 methods verified)")
        );
        assert_eq!(verdict.color_name, Some("Stone Grey"));
        assert_eq!(verdict.currency, Some("INR"));
    }

    #[test]
    fn size_and_color_agree_without_ocr() {
        let mut out = outputs();
        out.size_matches = vec![size(Denomination::TwoHundred, 80.0)];
        out.coverage_matches = vec![coverage(Denomination::TwoHundred, 80.0)];
        let verdict = fuse(&out, &table());
        // 20 + 12 = 32, bonused to 38.4; two families but no OCR.
        assert!(verdict.success);
        assert_eq!(verdict.confidence, Some(38.4));
        assert!(!verdict.verified);
        assert_eq!(verdict.method.as_deref(), Some("2/3 methods verified"));
    }

    #[test]
    fn size_match_outranks_a_color_only_match() {
        let mut out = outputs();
        out.size_matches = vec![size(Denomination::FiveHundred, 90.0)];
        out.coverage_matches = vec![coverage(Denomination::OneHundred, 90.0)];
        let verdict = fuse(&out, &table());
        // 22.5 beats 13.5 regardless of the final success gate.
        assert_eq!(verdict.denomination, None); // 22.5 < 30: reported as low confidence
        assert!(verdict.message.contains("confidence too low"));

        out.ocr = MethodResult::new(Denomination::FiveHundred, 60.0, MethodSource::Ocr);
        let verdict = fuse(&out, &table());
        assert_eq!(verdict.denomination, Some(Denomination::FiveHundred));
    }

    #[test]
    fn equal_scores_resolve_to_the_smaller_face_value() {
        let mut out = outputs();
        out.coverage_matches = vec![
            coverage(Denomination::TwoThousand, 100.0),
            coverage(Denomination::OneHundred, 100.0),
        ];
        out.size_matches = vec![
            size(Denomination::TwoThousand, 90.0),
            size(Denomination::OneHundred, 90.0),
        ];
        let verdict = fuse(&out, &table());
        assert_eq!(verdict.denomination, Some(Denomination::OneHundred));
    }

    #[test]
    fn advisory_methods_never_score() {
        let mut out = outputs();
        out.mean_color =
            MethodResult::new(Denomination::TwoThousand, 100.0, MethodSource::ColorAverage);
        out.edge_estimate =
            MethodResult::new(Denomination::TwoThousand, 40.0, MethodSource::EdgeComplexity);
        let verdict = fuse(&out, &table());
        // Only advisory signals present: nothing accumulated a score.
        assert!(!verdict.success);
        assert!(verdict.message.contains("fully visible"));
    }

    #[test]
    fn only_top_three_ranked_matches_count() {
        let mut out = outputs();
        out.coverage_matches = vec![
            coverage(Denomination::Ten, 90.0),
            coverage(Denomination::Twenty, 80.0),
            coverage(Denomination::Fifty, 70.0),
            coverage(Denomination::TwoThousand, 60.0),
        ];
        let verdict = fuse(&out, &table());
        // The fourth entry must not create a record; winner is the top one
        // (and fails the floor, which is fine for this check).
        assert!(!verdict.success);
        assert!(verdict.message.contains("confidence too low"));
    }
}
