use iced::Color;
use serde::Serialize;

pub const HIGH_CONFIDENCE_THRESHOLD: f32 = 0.8;
pub const MEDIUM_CONFIDENCE_THRESHOLD: f32 = 0.5;

/// Discrete confidence band used to pick overlay colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    /// Thresholds are inclusive at the lower edge of each band.
    /// Out-of-range values are not validated.
    pub fn from_confidence(confidence: f32) -> Self {
        if confidence >= HIGH_CONFIDENCE_THRESHOLD {
            ConfidenceTier::High
        } else if confidence >= MEDIUM_CONFIDENCE_THRESHOLD {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }

    pub fn color(self) -> Color {
        match self {
            ConfidenceTier::High => Color::from_rgb8(0x00, 0xff, 0x00),   // #00ff00
            ConfidenceTier::Medium => Color::from_rgb8(0xff, 0xff, 0x00), // #ffff00
            ConfidenceTier::Low => Color::from_rgb8(0xff, 0x00, 0x00),    // #ff0000
        }
    }
}

pub fn classify(confidence: f32) -> (ConfidenceTier, Color) {
    let tier = ConfidenceTier::from_confidence(confidence);
    (tier, tier.color())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries_classify_to_upper_tier() {
        assert_eq!(classify(0.8).0, ConfidenceTier::High);
        assert_eq!(classify(0.5).0, ConfidenceTier::Medium);
    }

    #[test]
    fn test_tier_bands() {
        for c in [0.8, 0.85, 0.99, 1.0] {
            assert_eq!(ConfidenceTier::from_confidence(c), ConfidenceTier::High, "c = {}", c);
        }
        for c in [0.5, 0.6, 0.79, 0.7999] {
            assert_eq!(ConfidenceTier::from_confidence(c), ConfidenceTier::Medium, "c = {}", c);
        }
        for c in [0.0, 0.1, 0.49, 0.4999] {
            assert_eq!(ConfidenceTier::from_confidence(c), ConfidenceTier::Low, "c = {}", c);
        }
    }

    #[test]
    fn test_tier_colors_are_distinct() {
        let (_, high) = classify(0.9);
        let (_, medium) = classify(0.6);
        let (_, low) = classify(0.2);
        assert_eq!(high, Color::from_rgb8(0, 255, 0));
        assert_ne!(high, medium);
        assert_ne!(medium, low);
        assert_ne!(high, low);
    }
}
