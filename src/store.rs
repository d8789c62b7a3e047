//! Single-store analysis pass.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::detect::{DetectionResult, PersonDetector};
use crate::filename::parse_filename;
use crate::hotspot::build_camera_hotspots;
use crate::insights::{ImageInsightRow, RejectReason, StoreAnalysis};
use crate::summary::build_store_summary;
use crate::validate::validate_image;

/// Extensions treated as images when listing directories (case-insensitive).
pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "webp"];

/// Returns true when `path` has one of the known image extensions.
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Image files directly inside `dir`, sorted by file name.
pub fn list_store_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to list {}", dir.display()))?;
    let mut images = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("failed to read entry in {}", dir.display()))?
            .path();
        if path.is_file() && is_image_file(&path) {
            images.push(path);
        }
    }
    images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(images)
}

/// Analyze every image in `store_dir`.
///
/// Files whose names do not parse are never validated or sent to the
/// detector. Invalid images are never sent to the detector. The returned
/// rows are ordered by timestamp, camera id and file name, with unparsed rows
/// last; hotspots and the summary are derived from that finalized set.
pub fn analyze_store(
    store_id: &str,
    store_dir: &Path,
    detector: &mut dyn PersonDetector,
    reference_day: Option<NaiveDate>,
    time_bucket_minutes: u32,
) -> Result<StoreAnalysis> {
    let images = list_store_images(store_dir)?;
    log::info!(
        "store {}: analyzing {} images with {} detector",
        store_id,
        images.len(),
        detector.name()
    );

    let mut rows = Vec::with_capacity(images.len());
    for path in &images {
        rows.push(analyze_image(store_id, path, &mut *detector, reference_day));
    }
    rows.sort_by(row_order);

    let camera_hotspots = build_camera_hotspots(store_id, &rows);
    let summary = build_store_summary(store_id, &rows, &camera_hotspots, time_bucket_minutes);
    log::info!(
        "store {}: {} valid, {} relevant, {} people",
        store_id,
        summary.valid_images,
        summary.relevant_images,
        summary.total_people
    );

    Ok(StoreAnalysis {
        image_insights: rows,
        camera_hotspots,
        summary,
    })
}

fn analyze_image(
    store_id: &str,
    path: &Path,
    detector: &mut dyn PersonDetector,
    reference_day: Option<NaiveDate>,
) -> ImageInsightRow {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let Some(parsed) = parse_filename(&filename, reference_day) else {
        log::debug!("{}: rejected ({})", filename, RejectReason::BadFilename.as_str());
        return ImageInsightRow {
            store_id: store_id.to_string(),
            filename,
            camera_id: String::new(),
            timestamp: None,
            is_valid: false,
            person_count: 0,
            max_person_conf: 0.0,
            relevant: false,
            reject_reason: Some(RejectReason::BadFilename),
            detection_error: String::new(),
            path: path.to_string_lossy().into_owned(),
        };
    };

    let (is_valid, reject_reason) = validate_image(path);
    let detection = if is_valid {
        detector.detect(path)
    } else {
        if let Some(reason) = reject_reason {
            log::debug!("{}: rejected ({})", filename, reason.as_str());
        }
        DetectionResult::empty()
    };
    let relevant = is_valid && !detection.is_error() && detection.person_count >= 1;
    log::debug!(
        "{}: valid={} people={} relevant={}",
        filename,
        is_valid,
        detection.person_count,
        relevant
    );

    ImageInsightRow {
        store_id: store_id.to_string(),
        filename,
        camera_id: parsed.camera_id,
        timestamp: Some(parsed.timestamp),
        is_valid,
        person_count: detection.person_count,
        max_person_conf: detection.max_person_conf,
        relevant,
        reject_reason,
        detection_error: detection.detection_error,
        path: path.to_string_lossy().into_owned(),
    }
}

fn row_order(a: &ImageInsightRow, b: &ImageInsightRow) -> Ordering {
    let by_time = match (a.timestamp, b.timestamp) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_time
        .then_with(|| a.camera_id.cmp(&b.camera_id))
        .then_with(|| a.filename.cmp(&b.filename))
}
