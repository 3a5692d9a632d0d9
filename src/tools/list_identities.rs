//! MCP `list_identities` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `list_identities` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ListIdentitiesParams {
    /// Restrict to one lane. All lanes when omitted.
    #[schemars(description = "Optional lane filter: 'narration', 'dialogue', 'interiority', or 'action'")]
    pub lane: Option<String>,

    #[schemars(description = "Bank kind: 'style' or 'voice'. Defaults to 'style'.")]
    pub kind: Option<String>,
}
