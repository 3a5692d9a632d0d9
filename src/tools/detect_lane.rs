use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DetectLaneParams {
    #[schemars(description = "Draft text. Only the last paragraph is classified.")]
    pub text: String,
}
