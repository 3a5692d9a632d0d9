pub mod delete_identity;
pub mod detect_lane;
pub mod ingest_sample;
pub mod list_identities;
pub mod memory_stats;
pub mod retrieve_exemplars;

use delete_identity::DeleteIdentityParams;
use detect_lane::DetectLaneParams;
use ingest_sample::IngestSampleParams;
use list_identities::ListIdentitiesParams;
use memory_stats::MemoryStatsParams;
use retrieve_exemplars::RetrieveExemplarsParams;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::{tool, tool_handler, tool_router, ServerHandler};
use std::sync::{Arc, Mutex};

use olivetti::config::OlivettiConfig;
use olivetti::memory::types::{BankKind, Lane};
use olivetti::memory::MemoryEngine;

const MAX_K: usize = 20;

/// The Olivetti MCP tool handler. Holds the shared engine and config and
/// exposes the memory operations via the `#[tool_router]` macro.
#[derive(Clone)]
pub struct OlivettiTools {
    tool_router: ToolRouter<Self>,
    engine: Arc<Mutex<MemoryEngine>>,
    config: Arc<OlivettiConfig>,
}

fn parse_lane(lane: &str) -> Result<Lane, String> {
    lane.parse().map_err(|e: olivetti::error::MemoryError| e.to_string())
}

fn parse_kind(kind: Option<&str>) -> Result<BankKind, String> {
    match kind {
        Some(k) => k.parse().map_err(|e: olivetti::error::MemoryError| e.to_string()),
        None => Ok(BankKind::Style),
    }
}

/// Run `f` against the locked engine on the blocking pool.
async fn with_engine<T, F>(engine: &Arc<Mutex<MemoryEngine>>, f: F) -> Result<T, String>
where
    T: Send + 'static,
    F: FnOnce(&mut MemoryEngine) -> Result<T, String> + Send + 'static,
{
    let engine = Arc::clone(engine);
    tokio::task::spawn_blocking(move || {
        let mut engine = engine
            .lock()
            .map_err(|e| format!("engine lock poisoned: {e}"))?;
        f(&mut engine)
    })
    .await
    .map_err(|e| format!("engine task failed: {e}"))?
}

#[tool_router]
impl OlivettiTools {
    pub fn new(engine: Arc<Mutex<MemoryEngine>>, config: Arc<OlivettiConfig>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            engine,
            config,
        }
    }

    /// Add a writing sample to a style bank or voice vault.
    #[tool(description = "Store a writing sample in a style bank (kind 'style', 250 per lane) or voice vault (kind 'voice', 60 per lane). When a bank is full the oldest sample is evicted.")]
    async fn ingest_sample(
        &self,
        Parameters(params): Parameters<IngestSampleParams>,
    ) -> Result<String, String> {
        let lane = parse_lane(&params.lane)?;
        let kind = parse_kind(params.kind.as_deref())?;

        tracing::info!(
            lane = %lane,
            kind = %kind,
            identity = %params.identity,
            text_len = params.text.len(),
            "ingest_sample called"
        );

        let outcome = with_engine(&self.engine, move |engine| {
            engine
                .ingest_sample(
                    lane,
                    &params.identity,
                    kind,
                    &params.text,
                    params.description.as_deref(),
                )
                .map_err(|e| format!("ingest failed: {e}"))
        })
        .await?;

        serde_json::to_string(&outcome).map_err(|e| format!("serialization failed: {e}"))
    }

    /// Rank one bank against a query and return the closest exemplars.
    #[tool(description = "Retrieve the exemplars most similar to a query from one (lane, identity, kind) bank. Returns text, description, and similarity score. An unknown bank yields an empty list.")]
    async fn retrieve_exemplars(
        &self,
        Parameters(params): Parameters<RetrieveExemplarsParams>,
    ) -> Result<String, String> {
        let lane = parse_lane(&params.lane)?;
        let kind = parse_kind(params.kind.as_deref())?;
        let k = params
            .k
            .unwrap_or(self.config.retrieval.default_k)
            .min(MAX_K);

        tracing::info!(lane = %lane, kind = %kind, identity = %params.identity, k, "retrieve_exemplars called");

        let identity = params.identity.clone();
        let exemplars = with_engine(&self.engine, move |engine| {
            Ok(engine.retrieve_exemplars(lane, &params.identity, kind, &params.query, k))
        })
        .await?;

        Ok(serde_json::json!({
            "bank": format!("{kind}/{lane}/{identity}"),
            "total": exemplars.len(),
            "exemplars": exemplars,
        })
        .to_string())
    }

    /// Remove one identity's bank in one lane.
    #[tool(description = "Delete every sample for one identity in one lane and kind. Requires confirm=true. Deleting a bank that does not exist is not an error.")]
    async fn delete_identity(
        &self,
        Parameters(params): Parameters<DeleteIdentityParams>,
    ) -> Result<String, String> {
        if !params.confirm {
            return Err("confirm must be true to delete a bank".into());
        }
        let lane = parse_lane(&params.lane)?;
        let kind = parse_kind(params.kind.as_deref())?;

        tracing::info!(lane = %lane, kind = %kind, identity = %params.identity, "delete_identity called");

        let deleted = with_engine(&self.engine, move |engine| {
            engine
                .delete_identity(lane, &params.identity, kind)
                .map_err(|e| format!("delete failed: {e}"))
        })
        .await?;

        Ok(serde_json::json!({ "deleted": deleted }).to_string())
    }

    /// List identities with a bank, per lane.
    #[tool(description = "List style or voice names that have samples, grouped by lane.")]
    async fn list_identities(
        &self,
        Parameters(params): Parameters<ListIdentitiesParams>,
    ) -> Result<String, String> {
        let lanes = match params.lane.as_deref() {
            Some(lane) => vec![parse_lane(lane)?],
            None => Lane::ALL.to_vec(),
        };
        let kind = parse_kind(params.kind.as_deref())?;

        let listing = with_engine(&self.engine, move |engine| {
            let mut map = serde_json::Map::new();
            for lane in lanes {
                map.insert(
                    lane.as_str().to_string(),
                    serde_json::json!(engine.list_identities(lane, kind)),
                );
            }
            Ok(map)
        })
        .await?;

        Ok(serde_json::json!({ "kind": kind, "lanes": listing }).to_string())
    }

    /// Get statistics about stored banks.
    #[tool(description = "Get memory statistics: bank and sample counts by kind and lane, snapshot size.")]
    async fn memory_stats(
        &self,
        Parameters(params): Parameters<MemoryStatsParams>,
    ) -> Result<String, String> {
        let mut stats = with_engine(&self.engine, |engine| Ok(engine.stats())).await?;
        if !params.include_banks.unwrap_or(false) {
            stats.banks.clear();
        }
        serde_json::to_string(&stats).map_err(|e| format!("serialization failed: {e}"))
    }

    /// Classify the last paragraph of a draft into a lane.
    #[tool(description = "Detect the writing lane (narration, dialogue, interiority, action) of a draft's last paragraph.")]
    async fn detect_lane(
        &self,
        Parameters(params): Parameters<DetectLaneParams>,
    ) -> Result<String, String> {
        let lane = olivetti::memory::detect_lane(&params.text);
        Ok(serde_json::json!({ "lane": lane, "label": lane.label() }).to_string())
    }
}

#[tool_handler]
impl ServerHandler for OlivettiTools {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo {
            instructions: Some(
                "Olivetti stores writing samples per lane and per style or voice. Use \
                 detect_lane on the draft, retrieve_exemplars with the draft's tail as the \
                 query, and ingest_sample to teach new samples."
                    .into(),
            ),
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}
