//! Configuration management for the helpdesk RAG service.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Config files (.helpdesk/config.yaml)
//! - Environment variables
//! - Command-line flags
//!
//! The configuration is workspace-centric, with most state stored in `.helpdesk/`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Completion providers the service knows how to construct.
pub const KNOWN_PROVIDERS: [&str; 1] = ["ollama"];

/// Embedding providers the corpus index knows how to construct.
pub const KNOWN_EMBEDDING_PROVIDERS: [&str; 2] = ["trigram", "ollama"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .helpdesk/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Completion provider (e.g. "ollama")
    pub provider: String,

    /// Completion model identifier
    pub model: String,

    /// Custom provider endpoint
    pub endpoint: Option<String>,

    /// Sampling temperature used for every pipeline call
    pub temperature: f32,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Retrieval breadth for the first and the expanded pass
    pub retrieval: RetrievalConfig,

    /// Corpus location, chunking and embeddings
    pub corpus: CorpusConfig,

    /// Conversation history storage
    pub history: HistoryConfig,
}

/// Retrieval parameters for the two search passes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalConfig {
    /// Documents kept by the first pass
    #[serde(default = "default_k")]
    pub k: usize,

    /// Candidate pool of the first pass
    #[serde(default = "default_fetch_k")]
    pub fetch_k: usize,

    /// Documents kept by the expanded pass
    #[serde(default = "default_expanded_k")]
    pub expanded_k: usize,

    /// Candidate pool of the expanded pass
    #[serde(default = "default_expanded_fetch_k")]
    pub expanded_fetch_k: usize,

    /// Relevance/diversity balance for MMR (1.0 = pure relevance)
    #[serde(default = "default_mmr_lambda")]
    pub mmr_lambda: f32,
}

fn default_k() -> usize {
    8
}

fn default_fetch_k() -> usize {
    24
}

fn default_expanded_k() -> usize {
    12
}

fn default_expanded_fetch_k() -> usize {
    32
}

fn default_mmr_lambda() -> f32 {
    0.5
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            k: default_k(),
            fetch_k: default_fetch_k(),
            expanded_k: default_expanded_k(),
            expanded_fetch_k: default_expanded_fetch_k(),
            mmr_lambda: default_mmr_lambda(),
        }
    }
}

/// Corpus loading and embedding settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CorpusConfig {
    /// File or directory holding the knowledge corpus
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Chunk size in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Overlap between consecutive chunks
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Embedding provider ("trigram" or "ollama")
    #[serde(default = "default_embedding_provider")]
    pub embedding_provider: String,

    /// Embedding model (provider-specific)
    #[serde(default)]
    pub embedding_model: Option<String>,

    /// Embedding vector dimension
    #[serde(default = "default_embedding_dim")]
    pub embedding_dim: usize,
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_embedding_provider() -> String {
    "trigram".to_string()
}

fn default_embedding_dim() -> usize {
    384
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            path: None,
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            embedding_provider: default_embedding_provider(),
            embedding_model: None,
            embedding_dim: default_embedding_dim(),
        }
    }
}

/// Conversation history settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryConfig {
    /// SQLite database path (default: .helpdesk/memory.sqlite)
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Keep history in process memory only
    #[serde(default)]
    pub in_memory: bool,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmSection>,
    retrieval: Option<RetrievalConfig>,
    corpus: Option<CorpusConfig>,
    history: Option<HistoryConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LlmSection {
    provider: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
    temperature: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "ollama".to_string(), // Local-first default
            model: "llama3.2".to_string(),
            endpoint: None,
            temperature: 0.2,
            log_level: None,
            verbose: false,
            no_color: false,
            retrieval: RetrievalConfig::default(),
            corpus: CorpusConfig::default(),
            history: HistoryConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the workspace config file and
    /// environment variables.
    ///
    /// Environment variables:
    /// - `HELPDESK_WORKSPACE`: Override workspace path
    /// - `HELPDESK_CONFIG`: Path to config file
    /// - `HELPDESK_PROVIDER`: Completion provider
    /// - `HELPDESK_MODEL`: Model identifier
    /// - `HELPDESK_ENDPOINT`: Provider endpoint
    /// - `HELPDESK_CORPUS`: Corpus file or directory
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use helpdesk_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Workspace: {:?}", config.workspace);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_from(None, None)
    }

    /// Load configuration with an explicit workspace and/or config file.
    ///
    /// Explicit arguments win over `HELPDESK_WORKSPACE` / `HELPDESK_CONFIG`.
    pub fn load_from(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        let workspace =
            workspace.or_else(|| std::env::var("HELPDESK_WORKSPACE").ok().map(PathBuf::from));
        if let Some(workspace) = workspace {
            config.workspace = workspace;
        }

        config.config_file =
            config_file.or_else(|| std::env::var("HELPDESK_CONFIG").ok().map(PathBuf::from));

        // Validate workspace exists
        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        // Load from YAML config file if it exists
        let config_path = match config.config_file {
            Some(ref cf) => cf.clone(),
            None => config.helpdesk_dir().join("config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("HELPDESK_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("HELPDESK_MODEL") {
            config.model = model;
        }

        if let Ok(endpoint) = std::env::var("HELPDESK_ENDPOINT") {
            config.endpoint = Some(endpoint);
        }

        if let Ok(corpus) = std::env::var("HELPDESK_CORPUS") {
            config.corpus.path = Some(PathBuf::from(corpus));
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(llm) = config_file.llm {
            if let Some(provider) = llm.provider {
                result.provider = provider;
            }
            if let Some(model) = llm.model {
                result.model = model;
            }
            if llm.endpoint.is_some() {
                result.endpoint = llm.endpoint;
            }
            if let Some(temperature) = llm.temperature {
                result.temperature = temperature;
            }
        }

        if let Some(retrieval) = config_file.retrieval {
            result.retrieval = retrieval;
        }

        if let Some(corpus) = config_file.corpus {
            result.corpus = corpus;
        }

        if let Some(history) = config_file.history {
            result.history = history;
        }

        tracing::debug!("Merged config file {:?}", path);
        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables and
    /// the config file.
    pub fn with_overrides(
        mut self,
        provider: Option<String>,
        model: Option<String>,
        corpus: Option<PathBuf>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(corpus) = corpus {
            self.corpus.path = Some(corpus);
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .helpdesk directory.
    pub fn helpdesk_dir(&self) -> PathBuf {
        self.workspace.join(".helpdesk")
    }

    /// Ensure the .helpdesk directory exists.
    pub fn ensure_helpdesk_dir(&self) -> AppResult<()> {
        let dir = self.helpdesk_dir();
        if !dir.exists() {
            std::fs::create_dir_all(&dir).map_err(|e| {
                AppError::Config(format!("Failed to create .helpdesk directory: {}", e))
            })?;
        }
        Ok(())
    }

    /// Resolve the corpus location (default: .helpdesk/corpus).
    pub fn corpus_path(&self) -> PathBuf {
        match self.corpus.path {
            Some(ref path) if path.is_absolute() => path.clone(),
            Some(ref path) => self.workspace.join(path),
            None => self.helpdesk_dir().join("corpus"),
        }
    }

    /// Resolve the SQLite history database path (default: .helpdesk/memory.sqlite).
    pub fn history_path(&self) -> PathBuf {
        match self.history.path {
            Some(ref path) if path.is_absolute() => path.clone(),
            Some(ref path) => self.workspace.join(path),
            None => self.helpdesk_dir().join("memory.sqlite"),
        }
    }

    /// Validate provider names and retrieval parameters.
    pub fn validate(&self) -> AppResult<()> {
        if !KNOWN_PROVIDERS.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if !KNOWN_EMBEDDING_PROVIDERS.contains(&self.corpus.embedding_provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.corpus.embedding_provider,
                KNOWN_EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        let r = &self.retrieval;
        if r.k == 0 {
            return Err(AppError::Config("retrieval.k must be at least 1".to_string()));
        }
        if r.fetch_k < r.k {
            return Err(AppError::Config(format!(
                "retrieval.fetchK ({}) must not be smaller than retrieval.k ({})",
                r.fetch_k, r.k
            )));
        }
        if r.expanded_k < r.k || r.expanded_fetch_k < r.expanded_k {
            return Err(AppError::Config(format!(
                "Expanded retrieval ({}/{}) must be at least as broad as the first pass ({}/{})",
                r.expanded_k, r.expanded_fetch_k, r.k, r.fetch_k
            )));
        }
        if !(0.0..=1.0).contains(&r.mmr_lambda) {
            return Err(AppError::Config(format!(
                "retrieval.mmrLambda must be within 0.0..=1.0, got {}",
                r.mmr_lambda
            )));
        }

        if self.corpus.chunk_size == 0 {
            return Err(AppError::Config("corpus.chunkSize must be at least 1".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "ollama");
        assert_eq!(config.model, "llama3.2");
        assert_eq!(config.retrieval.k, 8);
        assert_eq!(config.retrieval.fetch_k, 24);
        assert_eq!(config.retrieval.expanded_k, 12);
        assert_eq!(config.retrieval.expanded_fetch_k, 32);
        assert_eq!(config.corpus.chunk_size, 1000);
        assert_eq!(config.corpus.chunk_overlap, 200);
        assert!(!config.verbose);
    }

    #[test]
    fn test_default_paths() {
        let config = AppConfig::default();
        assert!(config.helpdesk_dir().ends_with(".helpdesk"));
        assert!(config.history_path().ends_with(".helpdesk/memory.sqlite"));
        assert!(config.corpus_path().ends_with(".helpdesk/corpus"));
    }

    #[test]
    fn test_with_overrides() {
        let overridden = AppConfig::default().with_overrides(
            None,
            Some("qwen2.5".to_string()),
            Some(PathBuf::from("faq.txt")),
            None,
            true,
            false,
        );

        assert_eq!(overridden.provider, "ollama");
        assert_eq!(overridden.model, "qwen2.5");
        assert!(overridden.corpus_path().ends_with("faq.txt"));
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_merge_yaml_sections() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(
            &path,
            r#"
llm:
  model: mistral
  temperature: 0.0
retrieval:
  k: 4
  fetchK: 10
corpus:
  path: data/info.txt
  chunkSize: 500
history:
  inMemory: true
logging:
  level: warn
  color: false
"#,
        )
        .unwrap();

        let base = AppConfig {
            workspace: temp.path().to_path_buf(),
            ..AppConfig::default()
        };
        let merged = base.merge_yaml(&path).unwrap();

        assert_eq!(merged.provider, "ollama");
        assert_eq!(merged.model, "mistral");
        assert_eq!(merged.temperature, 0.0);
        assert_eq!(merged.retrieval.k, 4);
        assert_eq!(merged.retrieval.fetch_k, 10);
        assert_eq!(merged.retrieval.expanded_k, 12);
        assert_eq!(merged.corpus.chunk_size, 500);
        assert_eq!(merged.corpus.chunk_overlap, 200);
        assert!(merged.history.in_memory);
        assert_eq!(merged.log_level, Some("warn".to_string()));
        assert!(merged.no_color);
        assert!(merged.corpus_path().ends_with("data/info.txt"));
    }

    #[test]
    fn test_merge_yaml_invalid() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, "retrieval: [not, a, map]").unwrap();

        assert!(AppConfig::default().merge_yaml(&path).is_err());
    }

    #[test]
    fn test_validate_unknown_provider() {
        let config = AppConfig {
            provider: "unknown".to_string(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_retrieval_breadth() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_ok());

        config.retrieval.fetch_k = 4;
        assert!(config.validate().is_err());

        config.retrieval = RetrievalConfig {
            expanded_k: 6,
            ..RetrievalConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
