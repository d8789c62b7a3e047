use std::path::Path;

use crate::detect::backend::PersonDetector;
use crate::detect::result::DetectionResult;

/// Placeholder used when no real detector could be set up.
///
/// Every call returns a zero count carrying the fixed reason, so affected
/// rows are never marked relevant.
#[derive(Clone, Debug)]
pub struct UnavailableDetector {
    reason: String,
}

impl UnavailableDetector {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl PersonDetector for UnavailableDetector {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    fn detect(&mut self, _image_path: &Path) -> DetectionResult {
        DetectionResult::failed(self.reason.clone())
    }
}
