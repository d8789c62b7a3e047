//! analyze_stores - analyze store snapshot folders and export CSV insights

use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;

use store_insights::{analyze, export_analysis, AnalyzerConfig};

#[path = "../ui.rs"]
mod ui;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Root folder containing one subfolder per store [default: .]
    #[arg(long)]
    root: Option<PathBuf>,
    /// Output folder for CSV exports [default: exports]
    #[arg(long)]
    out: Option<PathBuf>,
    /// Person detection confidence threshold [default: 0.25]
    #[arg(long)]
    conf: Option<f32>,
    /// Detector backend: 'yolo' runs the ONNX model, 'mock' is deterministic [default: yolo]
    #[arg(long, value_parser = ["yolo", "mock"])]
    detector: Option<String>,
    /// Time bucket in minutes for peak-time aggregation [default: 1]
    #[arg(long)]
    time_bucket: Option<u32>,
    /// Day the snapshot times belong to (YYYY-MM-DD); today when omitted.
    #[arg(long, value_parser = parse_day)]
    reference_day: Option<NaiveDate>,
    /// Path to the YOLOv8 ONNX weights.
    #[arg(long)]
    model: Option<PathBuf>,
    /// UI mode for stderr progress.
    #[arg(long, value_enum, default_value_t = ui::UiMode::Auto)]
    ui: ui::UiMode,
}

fn parse_day(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| format!("expected YYYY-MM-DD, got '{}'", raw))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let ui = ui::Ui::new(args.ui, std::io::stderr().is_terminal());

    let mut cfg = AnalyzerConfig::load()?;
    if let Some(root) = args.root {
        cfg.root = root;
    }
    if let Some(out) = args.out {
        cfg.out_dir = out;
    }
    if let Some(conf) = args.conf {
        cfg.detector.confidence_threshold = conf;
    }
    if let Some(detector) = args.detector {
        cfg.detector_kind = detector;
    }
    if let Some(minutes) = args.time_bucket {
        cfg.time_bucket_minutes = minutes;
    }
    if let Some(day) = args.reference_day {
        cfg.reference_day = Some(day);
    }
    if let Some(model) = args.model {
        cfg.detector.model_path = model;
    }
    cfg.validate()?;

    let output = {
        let _stage = ui.stage("Analyze stores");
        analyze(&cfg.root, &cfg.options())?
    };
    {
        let _stage = ui.stage("Export CSV");
        export_analysis(&output, &cfg.out_dir)?;
    }

    let summary_path = cfg.out_dir.join(store_insights::export::SUMMARY_FILE);
    let summary_path = summary_path.canonicalize().unwrap_or(summary_path);
    println!("Stores analyzed: {}", output.stores.len());
    println!("Summary CSV: {}", summary_path.display());
    if output.used_root_fallback_store {
        println!(
            "No subfolders found in root. Used root folder as a single store for compatibility."
        );
    }
    if !output.detector_warning.is_empty() {
        println!("WARNING: {}", output.detector_warning);
    }

    if output.all_stores_summary.is_empty() {
        println!("No stores or images found.");
        return Ok(());
    }

    println!("Per-store summary:");
    for row in &output.all_stores_summary {
        println!(
            "  {}: total={}, valid={}, relevant={}, people={}, top_hotspot={}, peak={}",
            row.store_id,
            row.total_images,
            row.valid_images,
            row.relevant_images,
            row.total_people,
            or_dash(&row.top_camera_hotspot),
            or_dash(&row.peak_time_bucket)
        );
    }
    Ok(())
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}
