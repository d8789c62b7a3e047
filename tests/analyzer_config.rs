use std::path::PathBuf;
use std::sync::Mutex;

use chrono::NaiveDate;
use tempfile::NamedTempFile;

use store_insights::config::AnalyzerConfig;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "STORE_INSIGHTS_CONFIG",
        "STORE_INSIGHTS_ROOT",
        "STORE_INSIGHTS_OUT",
        "STORE_INSIGHTS_CONF",
        "STORE_INSIGHTS_DETECTOR",
        "STORE_INSIGHTS_TIME_BUCKET",
        "STORE_INSIGHTS_MODEL_PATH",
        "STORE_INSIGHTS_REFERENCE_DAY",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn loads_config_from_file_and_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let json = r#"{
        "root": "/data/stores",
        "out_dir": "/data/exports",
        "time_bucket_minutes": 15,
        "reference_day": "2026-02-24",
        "detector": {
            "kind": "mock",
            "confidence_threshold": 0.4,
            "model_path": "/models/yolov8s.onnx",
            "input_size": 320,
            "iou_threshold": 0.5
        }
    }"#;
    std::io::Write::write_all(&mut file, json.as_bytes()).expect("write config");

    std::env::set_var("STORE_INSIGHTS_CONFIG", file.path());
    std::env::set_var("STORE_INSIGHTS_OUT", "/tmp/out");
    std::env::set_var("STORE_INSIGHTS_TIME_BUCKET", "5");

    let cfg = AnalyzerConfig::load().expect("load config");

    assert_eq!(cfg.root, PathBuf::from("/data/stores"));
    assert_eq!(cfg.out_dir, PathBuf::from("/tmp/out"));
    assert_eq!(cfg.detector_kind, "mock");
    assert_eq!(cfg.detector.confidence_threshold, 0.4);
    assert_eq!(cfg.detector.model_path, PathBuf::from("/models/yolov8s.onnx"));
    assert_eq!(cfg.detector.input_size, 320);
    assert_eq!(cfg.detector.iou_threshold, 0.5);
    assert_eq!(cfg.time_bucket_minutes, 5);
    assert_eq!(cfg.reference_day, NaiveDate::from_ymd_opt(2026, 2, 24));

    let options = cfg.options();
    assert_eq!(options.detector_kind, "mock");
    assert_eq!(options.time_bucket_minutes, 5);

    clear_env();
}

#[test]
fn invalid_env_values_are_rejected() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("STORE_INSIGHTS_CONF", "high");
    assert!(AnalyzerConfig::load().is_err());
    clear_env();

    std::env::set_var("STORE_INSIGHTS_TIME_BUCKET", "0");
    assert!(AnalyzerConfig::load().is_err());
    clear_env();

    std::env::set_var("STORE_INSIGHTS_REFERENCE_DAY", "24/02/2026");
    assert!(AnalyzerConfig::load().is_err());
    clear_env();
}

#[test]
fn missing_config_file_is_an_error() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("STORE_INSIGHTS_CONFIG", "/nonexistent/store-insights.json");
    let err = AnalyzerConfig::load().unwrap_err();
    assert!(err.to_string().contains("failed to read config file"));

    clear_env();
}
