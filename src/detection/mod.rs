//! Detection results returned by the remote service
//!
//! Holds the detection record itself plus the two pure helpers that turn it
//! into something drawable: tier classification and the model-to-display
//! coordinate mapping.

pub mod client;
pub mod confidence;
pub mod geometry;

use serde::Serialize;

pub use confidence::{classify, ConfidenceTier};
pub use geometry::{map_to_display, DisplayBox, ViewportGeometry};

/// A single object found by the detection service.
///
/// Coordinates are in model input space with a center+extent encoding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    pub center_x: f32,
    pub center_y: f32,
    pub width: f32,
    pub height: f32,
    pub label: String,
    pub confidence: f32,
}

impl Detection {
    pub fn new(center_x: f32, center_y: f32, width: f32, height: f32, label: &str, confidence: f32) -> Self {
        Self {
            center_x,
            center_y,
            width,
            height,
            label: label.to_string(),
            confidence,
        }
    }

    pub fn tier(&self) -> ConfidenceTier {
        ConfidenceTier::from_confidence(self.confidence)
    }

    /// Line shown in the results list, e.g. `nodule: 93% confidence`
    pub fn summary_line(&self) -> String {
        format!("{}: {}% confidence", self.label, (self.confidence * 100.0).round() as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_line_rounds_to_whole_percent() {
        let det = Detection::new(10.0, 10.0, 4.0, 4.0, "nodule", 0.926);
        assert_eq!(det.summary_line(), "nodule: 93% confidence");

        let det = Detection::new(10.0, 10.0, 4.0, 4.0, "cyst", 0.5);
        assert_eq!(det.summary_line(), "cyst: 50% confidence");
    }

    #[test]
    fn test_tier_follows_confidence() {
        let det = Detection::new(0.0, 0.0, 1.0, 1.0, "mass", 0.81);
        assert_eq!(det.tier(), ConfidenceTier::High);
    }
}
