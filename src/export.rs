//! CSV export and reload of analysis results.
//!
//! Layout of an export directory:
//! - `all_stores_summary.csv`
//! - `store_<store_id>_image_insights.csv`
//! - `store_<store_id>_camera_hotspots.csv`

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::insights::{
    AnalysisOutput, CameraHotspotRow, ImageInsightRow, StoreAnalysis, StoreSummaryRow,
    CAMERA_HOTSPOT_COLUMNS, IMAGE_INSIGHT_COLUMNS, STORE_SUMMARY_COLUMNS,
};

pub const SUMMARY_FILE: &str = "all_stores_summary.csv";

pub fn image_insights_path(out_dir: &Path, store_id: &str) -> PathBuf {
    out_dir.join(format!("store_{}_image_insights.csv", store_id))
}

pub fn camera_hotspots_path(out_dir: &Path, store_id: &str) -> PathBuf {
    out_dir.join(format!("store_{}_camera_hotspots.csv", store_id))
}

fn write_rows<T: Serialize>(path: &Path, header: &[&str], rows: &[T]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    // Written explicitly so empty tables still carry their header.
    writer
        .write_record(header)
        .with_context(|| format!("failed to write header to {}", path.display()))?;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("failed to write row to {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(())
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut rows = Vec::new();
    for (idx, record) in reader.deserialize().enumerate() {
        let row: T =
            record.with_context(|| format!("invalid row {} in {}", idx + 1, path.display()))?;
        rows.push(row);
    }
    Ok(rows)
}

/// Write the summary and per-store tables into `out_dir`, creating it if needed.
pub fn export_analysis(output: &AnalysisOutput, out_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    write_rows(
        &out_dir.join(SUMMARY_FILE),
        &STORE_SUMMARY_COLUMNS,
        &output.all_stores_summary,
    )?;
    for (store_id, store) in &output.stores {
        write_rows(
            &image_insights_path(out_dir, store_id),
            &IMAGE_INSIGHT_COLUMNS,
            &store.image_insights,
        )?;
        write_rows(
            &camera_hotspots_path(out_dir, store_id),
            &CAMERA_HOTSPOT_COLUMNS,
            &store.camera_hotspots,
        )?;
    }
    log::info!(
        "exported {} stores to {}",
        output.stores.len(),
        out_dir.display()
    );
    Ok(())
}

/// Reload an export directory.
///
/// A missing summary yields an empty output. Stores listed in the summary
/// without both per-store files are skipped. Run-level flags are not part of
/// the export and come back cleared.
pub fn load_exports(out_dir: &Path) -> Result<AnalysisOutput> {
    let summary_path = out_dir.join(SUMMARY_FILE);
    if !summary_path.exists() {
        return Ok(AnalysisOutput::default());
    }

    let all_stores_summary: Vec<StoreSummaryRow> = read_rows(&summary_path)?;
    let mut output = AnalysisOutput::default();
    for summary in &all_stores_summary {
        let images_path = image_insights_path(out_dir, &summary.store_id);
        let hotspots_path = camera_hotspots_path(out_dir, &summary.store_id);
        if !images_path.exists() || !hotspots_path.exists() {
            log::warn!("store {} has no per-store export files", summary.store_id);
            continue;
        }
        let image_insights: Vec<ImageInsightRow> = read_rows(&images_path)?;
        let camera_hotspots: Vec<CameraHotspotRow> = read_rows(&hotspots_path)?;
        output.stores.insert(
            summary.store_id.clone(),
            StoreAnalysis {
                image_insights,
                camera_hotspots,
                summary: summary.clone(),
            },
        );
    }
    output.all_stores_summary = all_stores_summary;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_summary_loads_empty() {
        let dir = tempdir().unwrap();
        let output = load_exports(dir.path()).unwrap();
        assert!(output.stores.is_empty());
        assert!(output.all_stores_summary.is_empty());
    }

    #[test]
    fn empty_output_still_writes_header() {
        let dir = tempdir().unwrap();
        export_analysis(&AnalysisOutput::default(), dir.path()).unwrap();
        let raw = std::fs::read_to_string(dir.path().join(SUMMARY_FILE)).unwrap();
        assert_eq!(raw.trim_end(), STORE_SUMMARY_COLUMNS.join(","));
    }

    #[test]
    fn stores_without_detail_files_are_skipped() {
        let dir = tempdir().unwrap();
        let output = AnalysisOutput {
            all_stores_summary: vec![StoreSummaryRow::empty("ghost")],
            ..AnalysisOutput::default()
        };
        export_analysis(&output, dir.path()).unwrap();
        let loaded = load_exports(dir.path()).unwrap();
        assert_eq!(loaded.all_stores_summary.len(), 1);
        assert!(loaded.stores.is_empty());
    }

    #[test]
    fn reads_pandas_style_booleans_and_timestamps() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(SUMMARY_FILE),
            "store_id,total_images,valid_images,relevant_images,total_people,top_camera_hotspot,peak_time_bucket\n\
             s1,2,1,1,2,D02,09:57\n",
        )
        .unwrap();
        std::fs::write(
            image_insights_path(dir.path(), "s1"),
            "store_id,filename,camera_id,timestamp,is_valid,person_count,max_person_conf,relevant,reject_reason,detection_error,path\n\
             s1,09-57-27_D02-1.jpg,D02,2026-02-24 09:57:27,True,2,0.75,True,,,/x/09-57-27_D02-1.jpg\n\
             s1,bad_name.jpg,,,False,0,0.0,False,bad_filename,,/x/bad_name.jpg\n",
        )
        .unwrap();
        std::fs::write(
            camera_hotspots_path(dir.path(), "s1"),
            "store_id,camera_id,relevant_images,total_people,avg_people_per_relevant_image,hotspot_rank\n\
             s1,D02,1,2,2.0,1\n",
        )
        .unwrap();

        let loaded = load_exports(dir.path()).unwrap();
        let store = &loaded.stores["s1"];
        assert_eq!(store.image_insights.len(), 2);
        assert!(store.image_insights[0].relevant);
        assert!(store.image_insights[0].timestamp.is_some());
        assert_eq!(
            store.image_insights[1].reject_reason,
            Some(crate::insights::RejectReason::BadFilename)
        );
        assert!(store.image_insights[1].timestamp.is_none());
        assert_eq!(store.camera_hotspots[0].hotspot_rank, 1);
        assert_eq!(store.summary.top_camera_hotspot, "D02");
    }
}
