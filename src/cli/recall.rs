use anyhow::Result;

use olivetti::config::OlivettiConfig;
use olivetti::memory::types::{BankKind, Lane};

/// Print the top `k` exemplars for `query` from one bank.
pub fn recall(
    config: &OlivettiConfig,
    lane: Lane,
    identity: &str,
    kind: BankKind,
    query: &str,
    k: usize,
) -> Result<()> {
    let engine = super::open_engine(config)?;
    let exemplars = engine.retrieve_exemplars(lane, identity, kind, query, k);

    if exemplars.is_empty() {
        println!("No exemplars found in {kind}/{lane}/{identity}.");
        return Ok(());
    }

    println!("Top {} exemplar(s) from {kind}/{lane}/{identity}\n", exemplars.len());

    for (i, exemplar) in exemplars.iter().enumerate() {
        println!(
            "  {}. (score: {:.4}){}",
            i + 1,
            exemplar.score,
            exemplar
                .description
                .as_deref()
                .map(|d| format!(" [{d}]"))
                .unwrap_or_default(),
        );
        println!("     {}", super::preview(&exemplar.text, 120));
        println!();
    }

    Ok(())
}
