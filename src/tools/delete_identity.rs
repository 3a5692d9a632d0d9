use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DeleteIdentityParams {
    #[schemars(description = "Writing lane: 'narration', 'dialogue', 'interiority', or 'action'")]
    pub lane: String,

    #[schemars(description = "Style or voice name whose bank is removed")]
    pub identity: String,

    #[schemars(description = "Bank kind: 'style' or 'voice'. Defaults to 'style'.")]
    pub kind: Option<String>,

    #[schemars(description = "Must be true. Safety gate against accidental deletion.")]
    pub confirm: bool,
}
