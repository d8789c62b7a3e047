use std::path::Path;

use super::result::DetectionResult;

/// Person detector over image files.
///
/// Implementations never fail: any internal problem is reported through
/// `DetectionResult::detection_error` with a zero count, so a single bad
/// image cannot abort a batch. Detectors are driven from one thread at a
/// time; a worker that parallelizes must own its own instance.
pub trait PersonDetector: Send {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Count people in the image at `image_path`.
    fn detect(&mut self, image_path: &Path) -> DetectionResult;
}
