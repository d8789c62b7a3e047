mod backend;
mod backends;
mod registry;
mod result;

pub use backend::PersonDetector;
#[cfg(feature = "backend-tract")]
pub use backends::TractPersonDetector;
pub use backends::{MockDetector, UnavailableDetector};
pub use registry::{
    build_detector, build_ml_detector, DetectorKind, DetectorSelection, DetectorSettings,
    DEFAULT_INPUT_SIZE, DEFAULT_IOU_THRESHOLD, DEFAULT_MODEL_PATH,
};
pub use result::DetectionResult;
