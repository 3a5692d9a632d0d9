pub mod doctor;
pub mod draft;
pub mod forget;
pub mod ingest;
pub mod list;
pub mod re_embed;
pub mod recall;
pub mod stats;

use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;

use olivetti::config::OlivettiConfig;
use olivetti::memory::MemoryEngine;

/// Open the engine for a one-shot command, restoring the latest snapshot.
pub fn open_engine(config: &OlivettiConfig) -> Result<MemoryEngine> {
    MemoryEngine::open(config).with_context(|| {
        format!(
            "failed to open memory at {} (run `olivetti doctor` for details)",
            config.resolved_snapshot_path().display()
        )
    })
}

/// Text from the argument, else from `file`, else all of stdin.
pub fn read_text_input(text: Option<String>, file: Option<&Path>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(path) = file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()));
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read from stdin")?;
    Ok(buf)
}

/// First `max_chars` characters of `text` on one line, with an ellipsis if cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    let flat: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match flat.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &flat[..idx]),
        None => flat,
    }
}
