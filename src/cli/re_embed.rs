//! CLI `re-embed` command — re-encode every sample with the configured encoder.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use olivetti::config::OlivettiConfig;

/// Re-encode all stored samples, then checkpoint once.
pub async fn re_embed(config: &OlivettiConfig) -> Result<()> {
    let mut engine = super::open_engine(config)?;

    let total = engine.stats().total_samples;
    if total == 0 {
        println!("No samples to re-encode.");
        return Ok(());
    }

    let encoder_name = engine.encoder().name().to_string();
    let dimensions = engine.encoder().dimensions();
    println!("Re-encoding {total} samples with '{encoder_name}' ({dimensions} dims)...");

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {spinner} {msg} ({elapsed})")
            .context("invalid progress template")?,
    );
    pb.set_message(format!("{total} samples"));
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let result = tokio::task::spawn_blocking(move || engine.reencode_all())
        .await
        .context("re-encode task failed")?;

    pb.finish_and_clear();
    let count = result.context("failed to save re-encoded snapshot")?;

    println!("Re-encoded {count} samples with '{encoder_name}'.");
    Ok(())
}
