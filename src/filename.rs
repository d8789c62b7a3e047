//! Snapshot filename parsing.
//!
//! Camera snapshots are named `HH-MM-SS_Cnn-f.jpg`: a zero-padded wall-clock
//! time, a camera id made of one uppercase letter and two digits, and a frame
//! number. The pattern is case-sensitive and only matches the literal `.jpg`
//! suffix; other image extensions are picked up by directory listing but never
//! parse.

use std::sync::OnceLock;

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

const SNAPSHOT_PATTERN: &str =
    r"^(?P<hh>[0-9]{2})-(?P<mm>[0-9]{2})-(?P<ss>[0-9]{2})_(?P<camera>[A-Z][0-9]{2})-(?P<frame>[0-9]+)\.jpg$";

/// Fields recovered from a snapshot filename.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedFilename {
    pub timestamp: NaiveDateTime,
    pub camera_id: String,
    pub frame_no: u64,
}

fn snapshot_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(SNAPSHOT_PATTERN).expect("snapshot pattern is valid"))
}

struct NameParts<'a> {
    time: NaiveTime,
    camera_id: &'a str,
    frame_no: u64,
}

fn split_name(name: &str) -> Option<NameParts<'_>> {
    let caps = snapshot_regex().captures(name)?;
    let hour: u32 = caps["hh"].parse().ok()?;
    let minute: u32 = caps["mm"].parse().ok()?;
    let second: u32 = caps["ss"].parse().ok()?;
    let time = NaiveTime::from_hms_opt(hour, minute, second)?;
    let frame_no: u64 = caps["frame"].parse().ok()?;
    let camera_id = caps.name("camera")?.as_str();
    Some(NameParts {
        time,
        camera_id,
        frame_no,
    })
}

/// Parse a snapshot filename.
///
/// The time of day is anchored to `reference_day`, or to the local current
/// date when none is given. Names that do not match the pattern, or whose
/// time fields are out of range, yield `None`.
pub fn parse_filename(name: &str, reference_day: Option<NaiveDate>) -> Option<ParsedFilename> {
    let parts = split_name(name)?;
    let day = reference_day.unwrap_or_else(|| Local::now().date_naive());
    Some(ParsedFilename {
        timestamp: day.and_time(parts.time),
        camera_id: parts.camera_id.to_string(),
        frame_no: parts.frame_no,
    })
}

/// Camera id of a snapshot filename, without anchoring it to a day.
///
/// Accepts exactly the names `parse_filename` accepts.
pub fn snapshot_camera_id(name: &str) -> Option<&str> {
    split_name(name).map(|parts| parts.camera_id)
}
