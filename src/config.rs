use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::MemoryError;
use crate::storage::MAX_BACKUPS;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OlivettiConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub embedding: EmbeddingConfig,
    pub memory: MemoryConfig,
    pub retrieval: RetrievalConfig,
    pub provider: ProviderConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub transport: String,
    pub log_level: String,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub snapshot_path: String,
    pub backup_count: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: String,
    pub dimensions: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MemoryConfig {
    pub style_capacity: usize,
    pub voice_capacity: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RetrievalConfig {
    pub default_k: usize,
    /// Only the tail of a draft is used as the retrieval query.
    pub query_tail_chars: usize,
    /// Exemplars are clipped to this many characters in assembled prompts.
    pub excerpt_chars: usize,
}

/// Which hosted (or local) text-generation backend `draft` talks to.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[serde(rename = "openai")]
    OpenAi,
    Anthropic,
    Ollama,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Ollama => "ollama",
        }
    }

    /// Environment variable consulted for the API key, if the backend needs one.
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            Self::OpenAi => Some("OPENAI_API_KEY"),
            Self::Anthropic => Some("ANTHROPIC_API_KEY"),
            Self::Ollama => None,
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4",
            Self::Anthropic => "claude-3-5-sonnet-20241022",
            Self::Ollama => "llama2",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            "ollama" => Ok(Self::Ollama),
            _ => Err(format!(
                "unknown provider: {s}. Supported: openai, anthropic, ollama"
            )),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    /// Empty means "use the backend's default model".
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub api_key: Option<String>,
    /// Base URL for the Ollama backend.
    pub host: String,
    pub timeout_secs: u64,
}

impl Default for OlivettiConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            embedding: EmbeddingConfig::default(),
            memory: MemoryConfig::default(),
            retrieval: RetrievalConfig::default(),
            provider: ProviderConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: "stdio".into(),
            log_level: "info".into(),
            host: "127.0.0.1".into(),
            port: 8765,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let snapshot_path = default_olivetti_dir()
            .join("autosave")
            .join("olivetti_state.json")
            .to_string_lossy()
            .into_owned();
        Self {
            snapshot_path,
            backup_count: 3,
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "hashing".into(),
            dimensions: crate::embedding::DEFAULT_DIMENSIONS,
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            style_capacity: 250,
            voice_capacity: 60,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_k: 2,
            query_tail_chars: 500,
            excerpt_chars: 200,
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::OpenAi,
            model: String::new(),
            temperature: 0.8,
            max_tokens: 2000,
            api_key: None,
            host: "http://localhost:11434".into(),
            timeout_secs: 60,
        }
    }
}

/// Returns `~/.olivetti/`
pub fn default_olivetti_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".olivetti")
}

/// Returns the default config file path: `~/.olivetti/config.toml`
pub fn default_config_path() -> PathBuf {
    default_olivetti_dir().join("config.toml")
}

impl OlivettiConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides and validate.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            OlivettiConfig::default()
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides (OLIVETTI_STATE, OLIVETTI_LOG_LEVEL, OLIVETTI_PROVIDER).
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("OLIVETTI_STATE") {
            self.storage.snapshot_path = val;
        }
        if let Ok(val) = std::env::var("OLIVETTI_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("OLIVETTI_PROVIDER") {
            self.provider.kind = val.parse().map_err(|e: String| anyhow::anyhow!(e))?;
        }
        Ok(())
    }

    /// Reject settings the engine cannot honor.
    pub fn validate(&self) -> Result<(), MemoryError> {
        if self.embedding.dimensions == 0 {
            return Err(MemoryError::InvalidConfig(
                "embedding.dimensions must be greater than zero".into(),
            ));
        }
        if self.memory.style_capacity == 0 || self.memory.voice_capacity == 0 {
            return Err(MemoryError::InvalidConfig(
                "bank capacities must be greater than zero".into(),
            ));
        }
        if self.storage.backup_count > MAX_BACKUPS {
            return Err(MemoryError::InvalidConfig(format!(
                "storage.backup_count must be at most {MAX_BACKUPS}, got {}",
                self.storage.backup_count
            )));
        }
        Ok(())
    }

    /// Resolve the snapshot path, expanding `~` if needed.
    pub fn resolved_snapshot_path(&self) -> PathBuf {
        expand_tilde(&self.storage.snapshot_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = OlivettiConfig::default();
        assert_eq!(config.server.transport, "stdio");
        assert_eq!(config.server.log_level, "info");
        assert_eq!(config.embedding.dimensions, 512);
        assert_eq!(config.memory.style_capacity, 250);
        assert_eq!(config.memory.voice_capacity, 60);
        assert_eq!(config.storage.backup_count, 3);
        assert_eq!(config.provider.kind, ProviderKind::OpenAi);
        assert!(config.storage.snapshot_path.ends_with("olivetti_state.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[server]
log_level = "debug"

[storage]
snapshot_path = "/tmp/olivetti/state.json"
backup_count = 4

[memory]
voice_capacity = 10

[provider]
kind = "anthropic"
"#;
        let config: OlivettiConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.log_level, "debug");
        assert_eq!(config.storage.snapshot_path, "/tmp/olivetti/state.json");
        assert_eq!(config.storage.backup_count, 4);
        assert_eq!(config.memory.voice_capacity, 10);
        assert_eq!(config.provider.kind, ProviderKind::Anthropic);
        // defaults still apply for unset fields
        assert_eq!(config.memory.style_capacity, 250);
        assert_eq!(config.retrieval.default_k, 2);
    }

    #[test]
    fn validate_rejects_too_many_backups() {
        let mut config = OlivettiConfig::default();
        config.storage.backup_count = 5;
        assert!(matches!(
            config.validate(),
            Err(MemoryError::InvalidConfig(_))
        ));
    }

    #[test]
    fn validate_rejects_zero_dimensions() {
        let mut config = OlivettiConfig::default();
        config.embedding.dimensions = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = OlivettiConfig::default();
        std::env::set_var("OLIVETTI_STATE", "/tmp/override.json");
        std::env::set_var("OLIVETTI_LOG_LEVEL", "trace");
        std::env::set_var("OLIVETTI_PROVIDER", "ollama");

        config.apply_env_overrides().unwrap();

        assert_eq!(config.storage.snapshot_path, "/tmp/override.json");
        assert_eq!(config.server.log_level, "trace");
        assert_eq!(config.provider.kind, ProviderKind::Ollama);

        // Clean up
        std::env::remove_var("OLIVETTI_STATE");
        std::env::remove_var("OLIVETTI_LOG_LEVEL");
        std::env::remove_var("OLIVETTI_PROVIDER");
    }

    #[test]
    fn provider_kind_parses_case_insensitively() {
        assert_eq!("OpenAI".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert!("gemini".parse::<ProviderKind>().is_err());
    }
}
