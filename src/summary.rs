//! Per-store summary and peak time bucket.

use std::collections::BTreeMap;

use chrono::DateTime;

use crate::insights::{CameraHotspotRow, ImageInsightRow, StoreSummaryRow};

/// Summarize a store's finalized row set.
///
/// `camera_hotspots` must come from the same rows; the top hotspot is only
/// reported when the rank-1 camera has at least one relevant image.
pub fn build_store_summary(
    store_id: &str,
    image_insights: &[ImageInsightRow],
    camera_hotspots: &[CameraHotspotRow],
    time_bucket_minutes: u32,
) -> StoreSummaryRow {
    let count = |pred: fn(&ImageInsightRow) -> bool| -> u32 {
        image_insights.iter().filter(|row| pred(row)).count() as u32
    };

    let top_camera_hotspot = camera_hotspots
        .iter()
        .find(|h| h.hotspot_rank == 1)
        .filter(|h| h.relevant_images > 0)
        .map(|h| h.camera_id.clone())
        .unwrap_or_default();

    StoreSummaryRow {
        store_id: store_id.to_string(),
        total_images: image_insights.len() as u32,
        valid_images: count(|row| row.is_valid),
        relevant_images: count(|row| row.relevant),
        total_people: image_insights
            .iter()
            .map(|row| u64::from(row.person_count))
            .sum(),
        top_camera_hotspot,
        peak_time_bucket: peak_time_bucket(image_insights, time_bucket_minutes),
    }
}

/// Start of the busiest time bucket among relevant rows, as `HH:MM`.
///
/// Timestamps are floored to `time_bucket_minutes` from the Unix epoch and
/// person counts summed per bucket. Ties go to the earliest bucket. Returns an
/// empty string when no relevant row carries a timestamp.
///
/// A width of zero is treated as one minute; `root::analyze` rejects zero
/// before any store is read.
pub fn peak_time_bucket(image_insights: &[ImageInsightRow], time_bucket_minutes: u32) -> String {
    let width_s = i64::from(time_bucket_minutes.max(1)) * 60;

    let mut buckets: BTreeMap<i64, u64> = BTreeMap::new();
    for row in image_insights.iter().filter(|row| row.relevant) {
        let Some(ts) = row.timestamp else { continue };
        let start = ts.and_utc().timestamp().div_euclid(width_s) * width_s;
        *buckets.entry(start).or_default() += u64::from(row.person_count);
    }

    let mut peak: Option<(i64, u64)> = None;
    for (start, people) in buckets {
        if peak.map_or(true, |(_, best)| people > best) {
            peak = Some((start, people));
        }
    }

    peak.and_then(|(start, _)| DateTime::from_timestamp(start, 0))
        .map(|start| start.format("%H:%M").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hotspot::build_camera_hotspots;
    use chrono::NaiveDate;

    fn row(hms: (u32, u32, u32), camera: &str, relevant: bool, people: u32) -> ImageInsightRow {
        let ts = NaiveDate::from_ymd_opt(2026, 2, 24)
            .unwrap()
            .and_hms_opt(hms.0, hms.1, hms.2)
            .unwrap();
        ImageInsightRow {
            store_id: "s1".to_string(),
            filename: format!("{:02}-{:02}-{:02}_{}-1.jpg", hms.0, hms.1, hms.2, camera),
            camera_id: camera.to_string(),
            timestamp: Some(ts),
            is_valid: true,
            person_count: people,
            max_person_conf: 0.8,
            relevant,
            reject_reason: None,
            detection_error: String::new(),
            path: String::new(),
        }
    }

    #[test]
    fn peak_bucket_sums_people_per_minute() {
        let rows = vec![
            row((9, 57, 27), "D02", true, 2),
            row((9, 58, 1), "D02", true, 1),
            row((9, 58, 40), "D03", true, 2),
            row((9, 59, 0), "D03", false, 0),
        ];
        assert_eq!(peak_time_bucket(&rows, 1), "09:58");
        assert_eq!(peak_time_bucket(&rows, 0), "09:58");
    }

    #[test]
    fn peak_bucket_ties_prefer_earliest() {
        let rows = vec![
            row((10, 5, 0), "D02", true, 3),
            row((9, 1, 0), "D03", true, 3),
        ];
        assert_eq!(peak_time_bucket(&rows, 1), "09:01");
    }

    #[test]
    fn wider_buckets_floor_to_width() {
        let rows = vec![
            row((9, 14, 59), "D02", true, 1),
            row((9, 3, 0), "D02", true, 1),
            row((9, 16, 0), "D02", true, 1),
        ];
        assert_eq!(peak_time_bucket(&rows, 15), "09:00");
    }

    #[test]
    fn non_relevant_rows_never_form_a_peak() {
        let rows = vec![row((9, 0, 0), "D02", false, 5)];
        assert_eq!(peak_time_bucket(&rows, 1), "");
    }

    #[test]
    fn summary_counts_and_top_camera() {
        let mut invalid = row((9, 0, 0), "D04", false, 0);
        invalid.is_valid = false;
        let rows = vec![
            row((9, 57, 27), "D02", true, 2),
            row((9, 57, 44), "D03", false, 0),
            invalid,
        ];
        let hotspots = build_camera_hotspots("s1", &rows);
        let summary = build_store_summary("s1", &rows, &hotspots, 1);
        assert_eq!(summary.total_images, 3);
        assert_eq!(summary.valid_images, 2);
        assert_eq!(summary.relevant_images, 1);
        assert_eq!(summary.total_people, 2);
        assert_eq!(summary.top_camera_hotspot, "D02");
        assert_eq!(summary.peak_time_bucket, "09:57");
    }

    #[test]
    fn no_relevant_images_leaves_top_camera_empty() {
        let rows = vec![row((9, 0, 0), "D02", false, 0)];
        let hotspots = build_camera_hotspots("s1", &rows);
        let summary = build_store_summary("s1", &rows, &hotspots, 1);
        assert_eq!(hotspots.len(), 1);
        assert_eq!(summary.top_camera_hotspot, "");
        assert_eq!(summary.peak_time_bucket, "");
    }

    #[test]
    fn empty_store_summary_is_all_zero() {
        let summary = build_store_summary("s1", &[], &[], 1);
        assert_eq!(summary, StoreSummaryRow::empty("s1"));
    }
}
