use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::detect::{DetectorSettings, DEFAULT_INPUT_SIZE, DEFAULT_IOU_THRESHOLD, DEFAULT_MODEL_PATH};
use crate::root::AnalysisOptions;

const DEFAULT_ROOT: &str = ".";
const DEFAULT_OUT_DIR: &str = "exports";
const DEFAULT_CONFIDENCE: f32 = 0.25;
const DEFAULT_DETECTOR: &str = "yolo";
const DEFAULT_TIME_BUCKET_MINUTES: u32 = 1;

#[derive(Debug, Deserialize, Default)]
struct AnalyzerConfigFile {
    root: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    time_bucket_minutes: Option<u32>,
    reference_day: Option<NaiveDate>,
    detector: Option<DetectorConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct DetectorConfigFile {
    kind: Option<String>,
    confidence_threshold: Option<f32>,
    model_path: Option<PathBuf>,
    input_size: Option<u32>,
    iou_threshold: Option<f32>,
}

/// Settings for an analysis run, resolved from file, environment and defaults.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub root: PathBuf,
    pub out_dir: PathBuf,
    pub detector_kind: String,
    pub detector: DetectorSettings,
    pub time_bucket_minutes: u32,
    pub reference_day: Option<NaiveDate>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self::from_file(AnalyzerConfigFile::default())
    }
}

impl AnalyzerConfig {
    /// Load from `STORE_INSIGHTS_CONFIG` (JSON) if set, then apply
    /// `STORE_INSIGHTS_*` environment overrides and validate.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("STORE_INSIGHTS_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: AnalyzerConfigFile) -> Self {
        let detector = file.detector.unwrap_or_default();
        Self {
            root: file.root.unwrap_or_else(|| PathBuf::from(DEFAULT_ROOT)),
            out_dir: file
                .out_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR)),
            detector_kind: detector
                .kind
                .unwrap_or_else(|| DEFAULT_DETECTOR.to_string()),
            detector: DetectorSettings {
                confidence_threshold: detector
                    .confidence_threshold
                    .unwrap_or(DEFAULT_CONFIDENCE),
                model_path: detector
                    .model_path
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH)),
                input_size: detector.input_size.unwrap_or(DEFAULT_INPUT_SIZE),
                iou_threshold: detector.iou_threshold.unwrap_or(DEFAULT_IOU_THRESHOLD),
            },
            time_bucket_minutes: file
                .time_bucket_minutes
                .unwrap_or(DEFAULT_TIME_BUCKET_MINUTES),
            reference_day: file.reference_day,
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Some(root) = non_empty_env("STORE_INSIGHTS_ROOT") {
            self.root = PathBuf::from(root);
        }
        if let Some(out) = non_empty_env("STORE_INSIGHTS_OUT") {
            self.out_dir = PathBuf::from(out);
        }
        if let Some(kind) = non_empty_env("STORE_INSIGHTS_DETECTOR") {
            self.detector_kind = kind;
        }
        if let Some(path) = non_empty_env("STORE_INSIGHTS_MODEL_PATH") {
            self.detector.model_path = PathBuf::from(path);
        }
        if let Some(conf) = non_empty_env("STORE_INSIGHTS_CONF") {
            self.detector.confidence_threshold = conf
                .parse()
                .map_err(|_| anyhow!("STORE_INSIGHTS_CONF must be a number between 0 and 1"))?;
        }
        if let Some(minutes) = non_empty_env("STORE_INSIGHTS_TIME_BUCKET") {
            self.time_bucket_minutes = minutes.parse().map_err(|_| {
                anyhow!("STORE_INSIGHTS_TIME_BUCKET must be an integer number of minutes")
            })?;
        }
        if let Some(day) = non_empty_env("STORE_INSIGHTS_REFERENCE_DAY") {
            let parsed = NaiveDate::parse_from_str(&day, "%Y-%m-%d")
                .map_err(|_| anyhow!("STORE_INSIGHTS_REFERENCE_DAY must be YYYY-MM-DD"))?;
            self.reference_day = Some(parsed);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let conf = self.detector.confidence_threshold;
        if !(0.0..=1.0).contains(&conf) {
            return Err(anyhow!(
                "confidence threshold must be within [0, 1], got {}",
                conf
            ));
        }
        if self.time_bucket_minutes == 0 {
            return Err(anyhow!("time bucket must be at least one minute"));
        }
        if self.detector.input_size == 0 {
            return Err(anyhow!("model input size must be greater than zero"));
        }
        let iou = self.detector.iou_threshold;
        if !(iou > 0.0 && iou <= 1.0) {
            return Err(anyhow!("IoU threshold must be within (0, 1], got {}", iou));
        }
        Ok(())
    }

    /// Options for `root::analyze`.
    pub fn options(&self) -> AnalysisOptions {
        AnalysisOptions {
            detector_kind: self.detector_kind.clone(),
            detector: self.detector.clone(),
            time_bucket_minutes: self.time_bucket_minutes,
            reference_day: self.reference_day,
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn read_config_file(path: &Path) -> Result<AnalyzerConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}
