//! Store snapshot analysis
//!
//! This crate turns per-store folders of camera snapshots into
//! person-detection insights for a retail dashboard.
//!
//! # Pipeline
//!
//! 1. **Discovery**: each qualifying subdirectory of the root is a store; a
//!    root holding images directly is analyzed as one store.
//! 2. **Per image**: parse `HH-MM-SS_Cnn-f.jpg`, validate the file, run the
//!    configured person detector. Failures at any step are recorded on the row
//!    and never abort the run.
//! 3. **Aggregation**: camera hotspots ranked by people per relevant image,
//!    and a store summary with the peak time bucket.
//!
//! # Module Structure
//!
//! - `filename`: snapshot name parsing
//! - `validate`: structural image checks
//! - `detect`: person detector trait, backends and selection
//! - `store`, `hotspot`, `summary`: single-store analysis
//! - `root`: store discovery and the `analyze` entry point
//! - `export`: CSV export and reload
//! - `snapshot`: folder integrity audit
//! - `config`: file and environment configuration

pub mod config;
pub mod detect;
pub mod export;
pub mod filename;
pub mod hotspot;
pub mod insights;
pub mod root;
pub mod snapshot;
pub mod store;
pub mod summary;
pub mod validate;

pub use config::AnalyzerConfig;
pub use detect::{
    build_detector, DetectionResult, DetectorKind, DetectorSelection, DetectorSettings,
    MockDetector, PersonDetector, UnavailableDetector,
};
pub use export::{export_analysis, load_exports};
pub use filename::{parse_filename, ParsedFilename};
pub use hotspot::build_camera_hotspots;
pub use insights::{
    AnalysisOutput, CameraHotspotRow, ImageInsightRow, RejectReason, StoreAnalysis,
    StoreSummaryRow,
};
pub use root::{analyze, analyze_with_detector, discover_stores, AnalysisOptions, StoreLayout};
pub use snapshot::{audit_snapshots, SnapshotAudit};
pub use store::analyze_store;
pub use summary::{build_store_summary, peak_time_bucket};
pub use validate::validate_image;
