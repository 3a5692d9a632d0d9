use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct IngestSampleParams {
    #[schemars(description = "Writing lane: 'narration', 'dialogue', 'interiority', or 'action'")]
    pub lane: String,

    #[schemars(description = "Style name (for kind 'style') or voice name (for kind 'voice')")]
    pub identity: String,

    #[schemars(
        description = "Bank kind: 'style' (style bank, 250 samples per lane) or 'voice' (voice vault, 60 per lane). Defaults to 'style'."
    )]
    pub kind: Option<String>,

    #[schemars(description = "The sample text. Must not be empty.")]
    pub text: String,

    #[schemars(description = "Optional short description of the sample")]
    pub description: Option<String>,
}
