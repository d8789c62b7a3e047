use std::path::Path;

use crate::detect::backend::PersonDetector;
use crate::detect::result::DetectionResult;

/// Deterministic detector driven only by the file name.
///
/// The seed is the sum of the name's character code points; the count is
/// `seed % 4` and the confidence is a bounded value derived from the same
/// seed, floored at the configured threshold.
#[derive(Clone, Debug)]
pub struct MockDetector {
    confidence_threshold: f32,
}

impl MockDetector {
    pub fn new(confidence_threshold: f32) -> Self {
        Self {
            confidence_threshold,
        }
    }

    fn detect_name(&self, name: &str) -> DetectionResult {
        let seed: u64 = name.chars().map(|ch| u64::from(u32::from(ch))).sum();
        let person_count = (seed % 4) as u32;
        if person_count == 0 {
            return DetectionResult::empty();
        }
        let raw = (0.55 + (seed % 30) as f32 / 100.0).min(0.95);
        let conf = self.confidence_threshold.max(raw);
        DetectionResult {
            person_count,
            max_person_conf: (conf * 1000.0).round() / 1000.0,
            detection_error: String::new(),
        }
    }
}

impl Default for MockDetector {
    fn default() -> Self {
        Self::new(0.25)
    }
}

impl PersonDetector for MockDetector {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn detect(&mut self, image_path: &Path) -> DetectionResult {
        let name = image_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        self.detect_name(&name)
    }
}
