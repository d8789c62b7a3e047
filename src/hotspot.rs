//! Camera hotspot ranking.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::insights::{CameraHotspotRow, ImageInsightRow};

#[derive(Default)]
struct CameraTally {
    relevant_images: u32,
    total_people: u64,
}

/// Rank every camera seen in `rows`.
///
/// All cameras with a non-blank id appear, including those with no relevant
/// images. Only relevant rows contribute to counts. Order is average people
/// per relevant image descending, then total people descending, then camera
/// id ascending; ranks run 1..=K with no gaps.
pub fn build_camera_hotspots(store_id: &str, rows: &[ImageInsightRow]) -> Vec<CameraHotspotRow> {
    let mut tallies: BTreeMap<&str, CameraTally> = BTreeMap::new();
    for row in rows {
        let camera = row.camera_id.trim();
        if camera.is_empty() {
            continue;
        }
        let tally = tallies.entry(camera).or_default();
        if row.relevant {
            tally.relevant_images += 1;
            tally.total_people += u64::from(row.person_count);
        }
    }

    let mut hotspots: Vec<CameraHotspotRow> = tallies
        .into_iter()
        .map(|(camera_id, tally)| CameraHotspotRow {
            store_id: store_id.to_string(),
            camera_id: camera_id.to_string(),
            relevant_images: tally.relevant_images,
            total_people: tally.total_people,
            avg_people_per_relevant_image: average(tally.total_people, tally.relevant_images),
            hotspot_rank: 0,
        })
        .collect();

    hotspots.sort_by(hotspot_order);
    for (idx, hotspot) in hotspots.iter_mut().enumerate() {
        hotspot.hotspot_rank = idx as u32 + 1;
    }
    hotspots
}

fn average(total_people: u64, relevant_images: u32) -> f64 {
    if relevant_images == 0 {
        return 0.0;
    }
    let avg = total_people as f64 / f64::from(relevant_images);
    (avg * 1000.0).round() / 1000.0
}

fn hotspot_order(a: &CameraHotspotRow, b: &CameraHotspotRow) -> Ordering {
    b.avg_people_per_relevant_image
        .total_cmp(&a.avg_people_per_relevant_image)
        .then_with(|| b.total_people.cmp(&a.total_people))
        .then_with(|| a.camera_id.cmp(&b.camera_id))
}
