//! MCP `retrieve_exemplars` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `retrieve_exemplars` MCP tool.
///
/// Ranking is confined to one bank; there is no ranking across lanes or identities.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct RetrieveExemplarsParams {
    /// Writing lane of the bank to search.
    #[schemars(description = "Writing lane: 'narration', 'dialogue', 'interiority', or 'action'")]
    pub lane: String,

    /// Style or voice name.
    #[schemars(description = "Style or voice name whose bank is searched")]
    pub identity: String,

    /// `"style"` or `"voice"`. Defaults to `"style"`.
    #[schemars(description = "Bank kind: 'style' or 'voice'. Defaults to 'style'.")]
    pub kind: Option<String>,

    /// Query text, usually the tail of the current draft.
    #[schemars(description = "Query text, typically the last few hundred characters of the draft")]
    pub query: String,

    /// Maximum number of exemplars (1–20). Defaults to the configured `default_k`.
    #[schemars(description = "Maximum number of exemplars to return (1-20). Defaults to 2.")]
    pub k: Option<usize>,
}
