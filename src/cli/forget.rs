//! CLI `forget` command — delete one identity's bank after confirmation.

use anyhow::{bail, Result};
use std::io::Write;

use olivetti::config::OlivettiConfig;
use olivetti::memory::types::{BankKind, Lane};

pub fn forget(
    config: &OlivettiConfig,
    lane: Lane,
    identity: &str,
    kind: BankKind,
    yes: bool,
) -> Result<()> {
    let mut engine = super::open_engine(config)?;

    if !yes {
        println!("This will permanently delete every {kind} sample for '{identity}' in {lane}.");
        print!("\nType the name again to confirm: ");
        std::io::stdout().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        if input.trim() != identity.trim() {
            bail!("forget cancelled");
        }
    }

    if engine.delete_identity(lane, identity, kind)? {
        println!("Deleted {kind}/{lane}/{identity}.");
    } else {
        println!("Nothing stored for {kind}/{lane}/{identity}.");
    }
    Ok(())
}
