use anyhow::Result;

use olivetti::config::OlivettiConfig;
use olivetti::memory::types::{BankKind, Lane};

/// Display bank statistics in the terminal.
pub fn stats(config: &OlivettiConfig, json: bool) -> Result<()> {
    let engine = super::open_engine(config)?;
    let response = engine.stats();

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!("Memory Statistics");
    println!("{}", "=".repeat(40));
    println!("  Banks:               {}", response.total_banks);
    println!("  Samples:             {}", response.total_samples);
    println!();

    println!("By Kind:");
    for kind in [BankKind::Style, BankKind::Voice] {
        let count = response.by_kind.get(kind.as_str()).copied().unwrap_or(0);
        println!("  {:<12} {}", kind, count);
    }
    println!();

    println!("By Lane:");
    for lane in Lane::ALL {
        let count = response.by_lane.get(lane.as_str()).copied().unwrap_or(0);
        println!("  {:<12} {}", lane, count);
    }
    println!();

    if !response.banks.is_empty() {
        println!("Banks:");
        for bank in &response.banks {
            println!(
                "  {}/{}/{:<20} {:>4}/{}",
                bank.kind, bank.lane, bank.identity, bank.samples, bank.capacity
            );
        }
        println!();
    }

    println!("Snapshot size:         {} bytes", response.snapshot_size_bytes);
    if let Some(slot) = engine.restored_from() {
        println!("Restored from:         {slot}");
    }

    Ok(())
}
