//! Root-level discovery and multi-store analysis.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;

use crate::detect::{build_detector, DetectorSettings, PersonDetector};
use crate::insights::AnalysisOutput;
use crate::store::{analyze_store, is_image_file};

/// How a root directory maps onto stores.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreLayout {
    /// One store per qualifying subdirectory, sorted by name.
    Subdirectories(Vec<PathBuf>),
    /// No qualifying subdirectories, but the root holds images itself.
    RootFallback(PathBuf),
    /// Nothing to analyze.
    Empty,
}

impl StoreLayout {
    pub fn store_dirs(&self) -> Vec<PathBuf> {
        match self {
            StoreLayout::Subdirectories(dirs) => dirs.clone(),
            StoreLayout::RootFallback(root) => vec![root.clone()],
            StoreLayout::Empty => Vec::new(),
        }
    }

    pub fn is_root_fallback(&self) -> bool {
        matches!(self, StoreLayout::RootFallback(_))
    }
}

/// Options for a full analysis run.
#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisOptions {
    /// Detector name: `yolo`, `mock`, or anything else for the unavailable stub.
    pub detector_kind: String,
    pub detector: DetectorSettings,
    /// Width of the peak-hour bucket; must be at least one minute.
    pub time_bucket_minutes: u32,
    /// Day used to anchor snapshot times; local today when unset.
    pub reference_day: Option<NaiveDate>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            detector_kind: "yolo".to_string(),
            detector: DetectorSettings::default(),
            time_bucket_minutes: 1,
            reference_day: None,
        }
    }
}

impl AnalysisOptions {
    pub fn new(detector_kind: &str) -> Self {
        Self {
            detector_kind: detector_kind.to_string(),
            ..Self::default()
        }
    }

    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.detector.confidence_threshold = threshold;
        self
    }

    pub fn with_time_bucket_minutes(mut self, minutes: u32) -> Self {
        self.time_bucket_minutes = minutes;
        self
    }

    pub fn with_reference_day(mut self, day: NaiveDate) -> Self {
        self.reference_day = Some(day);
        self
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

fn is_store_dir(dir: &Path) -> Result<bool> {
    let mut has_files = false;
    let mut has_dirs = false;
    for entry in std::fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))? {
        let path = entry?.path();
        if path.is_file() {
            if is_image_file(&path) {
                return Ok(true);
            }
            has_files = true;
        } else if path.is_dir() {
            has_dirs = true;
        }
    }
    Ok(!has_files && !has_dirs)
}

fn root_has_images(root: &Path) -> Result<bool> {
    for entry in std::fs::read_dir(root).with_context(|| format!("failed to list {}", root.display()))? {
        let path = entry?.path();
        if path.is_file() && is_image_file(&path) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Decide which directories under `root` are stores.
///
/// A visible subdirectory qualifies when it holds at least one image file or
/// is completely empty. Only when none qualify does the root itself become
/// the single store, and only if it directly holds images.
pub fn discover_stores(root: &Path) -> Result<StoreLayout> {
    let mut candidates = Vec::new();
    for entry in std::fs::read_dir(root).with_context(|| format!("failed to list {}", root.display()))? {
        let path = entry?.path();
        if path.is_dir() && !is_hidden(&path) {
            candidates.push(path);
        }
    }
    candidates.sort();

    let mut stores = Vec::new();
    for dir in candidates {
        match is_store_dir(&dir) {
            Ok(true) => stores.push(dir),
            Ok(false) => log::debug!("skipping non-store directory {}", dir.display()),
            Err(err) => log::warn!("skipping unreadable directory {}: {:#}", dir.display(), err),
        }
    }

    if !stores.is_empty() {
        return Ok(StoreLayout::Subdirectories(stores));
    }
    if root_has_images(root)? {
        return Ok(StoreLayout::RootFallback(root.to_path_buf()));
    }
    Ok(StoreLayout::Empty)
}

/// Analyze every store under `root` with the detector named in `options`.
pub fn analyze(root: &Path, options: &AnalysisOptions) -> Result<AnalysisOutput> {
    let selection = build_detector(&options.detector_kind, &options.detector);
    if !selection.warning.is_empty() {
        log::warn!("{}", selection.warning);
    }
    let mut detector = selection.detector;
    analyze_with_detector(root, detector.as_mut(), selection.warning, options)
}

/// Analyze every store under `root` with an already-built detector.
///
/// Stores are processed one at a time; each store's row set is complete
/// before it is added to the output. A store whose directory cannot be read
/// is logged and left out. A zero `time_bucket_minutes` is an error.
pub fn analyze_with_detector(
    root: &Path,
    detector: &mut dyn PersonDetector,
    detector_warning: String,
    options: &AnalysisOptions,
) -> Result<AnalysisOutput> {
    if options.time_bucket_minutes == 0 {
        return Err(anyhow!("time bucket must be at least one minute"));
    }
    let root = root
        .canonicalize()
        .with_context(|| format!("failed to resolve root {}", root.display()))?;
    let layout = discover_stores(&root)?;
    if layout.is_root_fallback() {
        log::info!(
            "no store subdirectories under {}; analyzing the root as a single store",
            root.display()
        );
    }

    let mut output = AnalysisOutput {
        detector_warning,
        used_root_fallback_store: layout.is_root_fallback(),
        ..AnalysisOutput::default()
    };

    for store_dir in layout.store_dirs() {
        let store_id = store_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| store_dir.to_string_lossy().into_owned());
        match analyze_store(
            &store_id,
            &store_dir,
            &mut *detector,
            options.reference_day,
            options.time_bucket_minutes,
        ) {
            Ok(analysis) => {
                output.all_stores_summary.push(analysis.summary.clone());
                output.stores.insert(store_id, analysis);
            }
            Err(err) => log::warn!("store {} skipped: {:#}", store_id, err),
        }
    }

    output
        .all_stores_summary
        .sort_by(|a, b| a.store_id.cmp(&b.store_id));
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn hidden_and_text_only_directories_are_not_stores() {
        let root = tempdir().unwrap();
        std::fs::create_dir(root.path().join(".cache")).unwrap();
        std::fs::create_dir(root.path().join("tests")).unwrap();
        std::fs::write(root.path().join("tests/a.txt"), "ignore").unwrap();
        std::fs::create_dir(root.path().join("store_1")).unwrap();
        std::fs::write(root.path().join("store_1/09-57-27_D02-1.jpg"), b"x").unwrap();

        let layout = discover_stores(root.path()).unwrap();
        assert_eq!(
            layout,
            StoreLayout::Subdirectories(vec![root.path().join("store_1")])
        );
    }

    #[test]
    fn empty_directories_count_as_stores() {
        let root = tempdir().unwrap();
        std::fs::create_dir(root.path().join("store_empty")).unwrap();
        let layout = discover_stores(root.path()).unwrap();
        assert_eq!(layout.store_dirs(), vec![root.path().join("store_empty")]);
    }

    #[test]
    fn directory_with_only_subdirectories_is_not_a_store() {
        let root = tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("archive/2025")).unwrap();
        assert_eq!(discover_stores(root.path()).unwrap(), StoreLayout::Empty);
    }

    #[test]
    fn root_images_trigger_fallback_only_without_store_dirs() {
        let root = tempdir().unwrap();
        std::fs::write(root.path().join("09-57-27_D02-1.jpg"), b"x").unwrap();
        std::fs::create_dir(root.path().join("notes")).unwrap();
        std::fs::write(root.path().join("notes/readme.md"), "n").unwrap();
        assert_eq!(
            discover_stores(root.path()).unwrap(),
            StoreLayout::RootFallback(root.path().to_path_buf())
        );

        std::fs::create_dir(root.path().join("store_1")).unwrap();
        assert!(matches!(
            discover_stores(root.path()).unwrap(),
            StoreLayout::Subdirectories(_)
        ));
    }

    #[test]
    fn builder_sets_fields() {
        let day = NaiveDate::from_ymd_opt(2026, 2, 24).unwrap();
        let options = AnalysisOptions::new("mock")
            .with_confidence_threshold(0.4)
            .with_time_bucket_minutes(15)
            .with_reference_day(day);
        assert_eq!(options.detector_kind, "mock");
        assert_eq!(options.detector.confidence_threshold, 0.4);
        assert_eq!(options.time_bucket_minutes, 15);
        assert_eq!(options.reference_day, Some(day));
    }
}
