/// Outcome of running person detection on one image.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DetectionResult {
    pub person_count: u32,
    /// Highest confidence among counted boxes, 0 when nothing was counted.
    pub max_person_conf: f32,
    /// Empty when detection succeeded.
    pub detection_error: String,
}

impl DetectionResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            person_count: 0,
            max_person_conf: 0.0,
            detection_error: reason.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        !self.detection_error.is_empty()
    }
}
