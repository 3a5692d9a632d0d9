use anyhow::Result;

use olivetti::config::OlivettiConfig;
use olivetti::memory::types::{BankKey, BankKind, Lane};

/// List identities per lane, with their sample counts.
pub fn list(config: &OlivettiConfig, lane: Option<Lane>, kind: BankKind) -> Result<()> {
    let engine = super::open_engine(config)?;
    let lanes: Vec<Lane> = match lane {
        Some(lane) => vec![lane],
        None => Lane::ALL.to_vec(),
    };

    for lane in lanes {
        let identities = engine.list_identities(lane, kind);
        println!("{} ({kind}):", lane.label());
        if identities.is_empty() {
            println!("  (none)");
        }
        for identity in identities {
            let count = BankKey::new(kind, lane, &identity)
                .ok()
                .and_then(|key| engine.bank(&key).map(|b| b.len()))
                .unwrap_or(0);
            println!("  {identity:<24} {count} sample(s)");
        }
    }
    Ok(())
}
