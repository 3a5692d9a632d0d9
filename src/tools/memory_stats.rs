//! MCP `memory_stats` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `memory_stats` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct MemoryStatsParams {
    /// If `true`, include the per-bank breakdown.
    #[schemars(description = "Include one line per bank (kind, lane, identity, size). Defaults to false.")]
    pub include_banks: Option<bool>,
}
