//! CLI `ingest` command — add one sample to a bank.

use anyhow::{Context, Result};

use olivetti::config::OlivettiConfig;
use olivetti::memory::types::{BankKind, Lane};

pub fn ingest(
    config: &OlivettiConfig,
    lane: Lane,
    identity: &str,
    kind: BankKind,
    text: &str,
    description: Option<&str>,
) -> Result<()> {
    let mut engine = super::open_engine(config)?;

    let outcome = engine
        .ingest_sample(lane, identity, kind, text, description)
        .context("ingest failed")?;

    println!(
        "Stored in {} ({}/{} samples)",
        outcome.bank, outcome.bank_size, outcome.capacity
    );
    if outcome.evicted {
        println!("Bank was full: the oldest sample was evicted.");
    }
    Ok(())
}
