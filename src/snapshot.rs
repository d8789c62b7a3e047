//! Quick integrity audit of a single snapshot folder.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};

use crate::filename::snapshot_camera_id;
use crate::insights::RejectReason;
use crate::validate::validate_image;

/// Counts over the snapshot files of one folder.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SnapshotAudit {
    pub total: usize,
    pub zero_byte: usize,
    /// Files that fail to decode, zero-byte files included.
    pub unreadable: usize,
    pub per_camera: BTreeMap<String, usize>,
}

impl SnapshotAudit {
    pub fn camera_count(&self) -> usize {
        self.per_camera.len()
    }
}

/// Audit `.jpg` files in `dir` whose names follow the snapshot pattern.
pub fn audit_snapshots(dir: &Path) -> Result<SnapshotAudit> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.ends_with(".jpg") {
                names.push(name.to_string());
            }
        }
    }
    names.sort();

    let mut audit = SnapshotAudit::default();
    for name in names {
        let Some(camera_id) = snapshot_camera_id(&name) else {
            continue;
        };
        let path = dir.join(&name);
        audit.total += 1;
        match validate_image(&path) {
            (true, _) => {}
            (false, Some(RejectReason::ZeroByte)) => {
                audit.zero_byte += 1;
                audit.unreadable += 1;
            }
            (false, _) => audit.unreadable += 1,
        }
        *audit.per_camera.entry(camera_id.to_string()).or_default() += 1;
    }
    Ok(audit)
}
