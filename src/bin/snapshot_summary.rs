//! snapshot_summary - integrity audit of one snapshot folder

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use store_insights::audit_snapshots;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Folder holding `HH-MM-SS_Cnn-f.jpg` snapshots.
    #[arg(long, default_value = ".")]
    dir: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let audit = audit_snapshots(&args.dir)?;
    if audit.total == 0 {
        println!("No matching snapshot files found.");
        return Ok(());
    }

    println!("Total snapshots: {}", audit.total);
    println!("Cameras: {}", audit.camera_count());
    println!("Zero-byte files: {}", audit.zero_byte);
    println!("Unreadable files: {}", audit.unreadable);
    println!("Per-camera counts:");
    for (camera, count) in &audit.per_camera {
        println!("  {}: {}", camera, count);
    }
    Ok(())
}
