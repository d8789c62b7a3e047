use std::fmt;
use std::path::PathBuf;

use anyhow::Result;

use super::backend::PersonDetector;
use super::backends::{MockDetector, UnavailableDetector};

pub const DEFAULT_MODEL_PATH: &str = "data/models/yolov8n.onnx";
pub const DEFAULT_INPUT_SIZE: u32 = 640;
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.7;

/// Detector variants selectable by configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectorKind {
    /// Filename-seeded deterministic counts.
    Mock,
    /// ONNX person detector.
    Yolo,
}

impl DetectorKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "mock" => Some(DetectorKind::Mock),
            "yolo" => Some(DetectorKind::Yolo),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DetectorKind::Mock => "mock",
            DetectorKind::Yolo => "yolo",
        }
    }
}

impl fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters shared by all detector variants.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectorSettings {
    pub confidence_threshold: f32,
    pub model_path: PathBuf,
    pub input_size: u32,
    pub iou_threshold: f32,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.25,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            input_size: DEFAULT_INPUT_SIZE,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
        }
    }
}

/// The detector chosen for a run, plus a root-level warning when the
/// requested detector could not be used.
pub struct DetectorSelection {
    pub detector: Box<dyn PersonDetector>,
    pub warning: String,
}

impl fmt::Debug for DetectorSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetectorSelection")
            .field("detector", &self.detector.name())
            .field("warning", &self.warning)
            .finish()
    }
}

/// Construct the ML-backed detector.
#[cfg(feature = "backend-tract")]
pub fn build_ml_detector(settings: &DetectorSettings) -> Result<Box<dyn PersonDetector>> {
    let detector = super::backends::TractPersonDetector::new(
        &settings.model_path,
        settings.input_size,
        settings.confidence_threshold,
        settings.iou_threshold,
    )?;
    Ok(Box::new(detector))
}

/// Construct the ML-backed detector.
#[cfg(not(feature = "backend-tract"))]
pub fn build_ml_detector(_settings: &DetectorSettings) -> Result<Box<dyn PersonDetector>> {
    Err(anyhow::anyhow!(
        "person detection requires the backend-tract feature"
    ))
}

/// Resolve a detector by name.
///
/// Never fails: unknown names and ML initialization errors both degrade to
/// an `UnavailableDetector` with a matching warning.
pub fn build_detector(kind_name: &str, settings: &DetectorSettings) -> DetectorSelection {
    let kind = DetectorKind::from_name(kind_name);
    if let Some(kind) = kind {
        log::debug!("building {} detector", kind);
    }
    match kind {
        Some(DetectorKind::Mock) => DetectorSelection {
            detector: Box::new(MockDetector::new(settings.confidence_threshold)),
            warning: String::new(),
        },
        Some(DetectorKind::Yolo) => match build_ml_detector(settings) {
            Ok(detector) => DetectorSelection {
                detector,
                warning: String::new(),
            },
            Err(err) => {
                let reason = format!("Detector unavailable: {:#}", err);
                DetectorSelection {
                    detector: Box::new(UnavailableDetector::new(reason.clone())),
                    warning: reason,
                }
            }
        },
        None => DetectorSelection {
            detector: Box::new(UnavailableDetector::new(format!(
                "Unsupported detector_type='{}'",
                kind_name
            ))),
            warning: format!(
                "Unsupported detector_type='{}', using unavailable detector fallback.",
                kind_name
            ),
        },
    }
}
