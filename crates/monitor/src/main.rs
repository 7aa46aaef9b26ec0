//! Fatigue Monitor - Main Entry Point
//!
//! Usage: `fatigue-monitor <recording.jsonl> [settings-file]`

use anyhow::{bail, Result};
use monitor::{init_logging, run_replay, MonitorSettings};
use std::path::PathBuf;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let Some(recording) = args.next().map(PathBuf::from) else {
        bail!("usage: fatigue-monitor <recording.jsonl> [settings-file]");
    };
    let settings_path = args.next().map(PathBuf::from);

    let settings = MonitorSettings::load(settings_path.as_deref())?;
    init_logging(settings.level(), settings.log_json)?;

    info!("=== Fatigue Monitor v{} ===", env!("CARGO_PKG_VERSION"));

    let summary = run_replay(&settings, &recording).await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
