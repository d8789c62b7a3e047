//! Row types produced by an analysis run.
//!
//! Every run builds a fresh set of rows. Rows are never mutated once a store's
//! row set is finalized; the tabular export writes them with the column order
//! declared here.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

pub const IMAGE_INSIGHT_COLUMNS: [&str; 11] = [
    "store_id",
    "filename",
    "camera_id",
    "timestamp",
    "is_valid",
    "person_count",
    "max_person_conf",
    "relevant",
    "reject_reason",
    "detection_error",
    "path",
];

pub const CAMERA_HOTSPOT_COLUMNS: [&str; 6] = [
    "store_id",
    "camera_id",
    "relevant_images",
    "total_people",
    "avg_people_per_relevant_image",
    "hotspot_rank",
];

pub const STORE_SUMMARY_COLUMNS: [&str; 7] = [
    "store_id",
    "total_images",
    "valid_images",
    "relevant_images",
    "total_people",
    "top_camera_hotspot",
    "peak_time_bucket",
];

/// Why an image was excluded before detection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    BadFilename,
    ZeroByte,
    Unreadable,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::BadFilename => "bad_filename",
            RejectReason::ZeroByte => "zero_byte",
            RejectReason::Unreadable => "unreadable",
        }
    }
}

/// One discovered image file and what the pipeline concluded about it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageInsightRow {
    pub store_id: String,
    pub filename: String,
    pub camera_id: String,
    #[serde(with = "timestamp_field")]
    pub timestamp: Option<NaiveDateTime>,
    #[serde(deserialize_with = "lenient_bool")]
    pub is_valid: bool,
    pub person_count: u32,
    pub max_person_conf: f32,
    #[serde(deserialize_with = "lenient_bool")]
    pub relevant: bool,
    pub reject_reason: Option<RejectReason>,
    pub detection_error: String,
    pub path: String,
}

/// Per-camera aggregate over the relevant images of a store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraHotspotRow {
    pub store_id: String,
    pub camera_id: String,
    pub relevant_images: u32,
    pub total_people: u64,
    pub avg_people_per_relevant_image: f64,
    pub hotspot_rank: u32,
}

/// One line of the all-stores summary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSummaryRow {
    pub store_id: String,
    pub total_images: u32,
    pub valid_images: u32,
    pub relevant_images: u32,
    pub total_people: u64,
    pub top_camera_hotspot: String,
    pub peak_time_bucket: String,
}

impl StoreSummaryRow {
    pub fn empty(store_id: &str) -> Self {
        Self {
            store_id: store_id.to_string(),
            total_images: 0,
            valid_images: 0,
            relevant_images: 0,
            total_people: 0,
            top_camera_hotspot: String::new(),
            peak_time_bucket: String::new(),
        }
    }
}

/// Complete result for one store directory.
#[derive(Clone, Debug, PartialEq)]
pub struct StoreAnalysis {
    pub image_insights: Vec<ImageInsightRow>,
    pub camera_hotspots: Vec<CameraHotspotRow>,
    pub summary: StoreSummaryRow,
}

/// Result of one root-level analysis run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnalysisOutput {
    pub stores: BTreeMap<String, StoreAnalysis>,
    /// Store summaries sorted by store id.
    pub all_stores_summary: Vec<StoreSummaryRow>,
    /// Non-fatal detector problem; empty when detection ran normally.
    pub detector_warning: String,
    pub used_root_fallback_store: bool,
}

mod timestamp_field {
    use chrono::NaiveDateTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";
    const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.serialize_str(&ts.format(FORMAT).to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        NaiveDateTime::parse_from_str(raw, FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(raw, ISO_FORMAT))
            .map(Some)
            .map_err(|e| D::Error::custom(format!("invalid timestamp '{}': {}", raw, e)))
    }
}

// Accepts pandas-style `True`/`False` as well as `true`/`false` and `1`/`0`.
fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let raw = String::deserialize(deserializer)?;
    match raw.trim() {
        "true" | "True" | "TRUE" | "1" => Ok(true),
        "false" | "False" | "FALSE" | "0" | "" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "invalid boolean '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reject_reason_strings_match_export_vocabulary() {
        assert_eq!(RejectReason::BadFilename.as_str(), "bad_filename");
        assert_eq!(RejectReason::ZeroByte.as_str(), "zero_byte");
        assert_eq!(RejectReason::Unreadable.as_str(), "unreadable");
    }

    #[test]
    fn empty_summary_has_zero_counts() {
        let row = StoreSummaryRow::empty("store_a");
        assert_eq!(row.total_images, 0);
        assert_eq!(row.total_people, 0);
        assert!(row.top_camera_hotspot.is_empty());
        assert!(row.peak_time_bucket.is_empty());
    }
}
