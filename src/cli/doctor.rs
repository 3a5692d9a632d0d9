//! CLI `doctor` command — inspect the snapshot chain and print a health report.

use anyhow::{Context, Result};

use olivetti::config::OlivettiConfig;
use olivetti::embedding;
use olivetti::storage::health::check_snapshot_health;
use olivetti::storage::SnapshotStore;

/// Inspect the primary snapshot and its backups. Never modifies anything.
pub fn doctor(config: &OlivettiConfig) -> Result<()> {
    config.validate().context("invalid configuration")?;
    let path = config.resolved_snapshot_path();
    let store = SnapshotStore::new(&path, config.storage.backup_count)?;

    if !store.has_snapshot() {
        println!("Snapshot: not found at {}", path.display());
        println!("Run `olivetti ingest` or `olivetti serve` to create one.");
        return Ok(());
    }

    let encoder = embedding::create_encoder(&config.embedding)
        .context("failed to create encoder")?;
    let report = check_snapshot_health(&store);

    println!("Olivetti Health Report");
    println!("======================");
    println!();
    println!("Snapshot:          {}", path.display());
    println!("Backups kept:      {}", store.backup_count());
    println!();
    println!("Slots:");
    for slot in &report.slots {
        match &slot.summary {
            None => println!("  {:<8} missing", slot.slot),
            Some(Ok(summary)) => println!(
                "  {:<8} OK      {:>9}  v{}  {} banks, {} samples, saved {}",
                slot.slot,
                format_bytes(slot.size_bytes),
                summary.version,
                summary.banks,
                summary.samples,
                summary.saved_at.format("%Y-%m-%d %H:%M:%S UTC"),
            ),
            Some(Err(reason)) => println!("  {:<8} CORRUPT ({reason})", slot.slot),
        }
    }
    if report.stale_temp_file {
        println!();
        println!("Found a leftover {} from an interrupted save.", store.temp_path().display());
        println!("It is ignored on load and replaced by the next save.");
    }
    println!();

    let Some(usable) = report.recoverable_slot() else {
        println!("Recoverable state: NONE");
        println!();
        println!("Recovery steps:");
        println!("  1. Copy a known-good snapshot to {}", path.display());
        println!("  2. Or move the damaged files aside to start with empty memory.");
        return Ok(());
    };

    println!("Recoverable state: {} ({})", usable.slot, usable.path.display());
    if !report.primary_ok() {
        println!("  WARNING: primary snapshot is unusable; the next load falls back to {}.", usable.slot);
    }

    if let Some(Ok(summary)) = &usable.summary {
        println!();
        println!("Encoder:");
        println!("  Stored:          {} ({} dims)", summary.encoder, summary.dimensions);
        println!("  Configured:      {} ({} dims)", encoder.name(), encoder.dimensions());
        if summary.encoder != encoder.name() || summary.dimensions != encoder.dimensions() {
            println!("  WARNING: encoder mismatch! Run `olivetti re-embed` to update vectors.");
        } else {
            println!("  Status:          OK (match)");
        }
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
