//! Configuration management for FinStep.
//!
//! This module handles loading and merging configuration from multiple
//! sources:
//! - Environment variables
//! - Command-line flags
//! - Config files (.finstep/config.yaml)
//!
//! The configuration is workspace-centric, with all persistent state stored
//! under `.finstep/`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Main application configuration.
///
/// This struct holds all global configuration options that affect
/// CLI behavior across commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .finstep/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// LLM provider for both pipeline stages ("gemini" or "ollama")
    pub provider: String,

    /// Model used by the drafting stage
    pub draft_model: String,

    /// Model used by the compliance-review stage
    pub review_model: String,

    /// Embedding provider for the knowledge store ("trigram" or "gemini")
    pub embedding_provider: String,

    /// Environment variable holding the provider API key
    pub api_key_env: String,

    /// Explicit API key (overrides `api_key_env`)
    pub api_key: Option<String>,

    /// Provider endpoint override (used by the Ollama provider)
    pub endpoint: Option<String>,

    /// Directory holding the reference corpus text files
    pub corpus_dir: Option<PathBuf>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmSection>,
    knowledge: Option<KnowledgeSection>,
    workspace: Option<WorkspaceSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LlmSection {
    provider: Option<String>,
    #[serde(rename = "draftModel")]
    draft_model: Option<String>,
    #[serde(rename = "reviewModel")]
    review_model: Option<String>,
    #[serde(rename = "apiKeyEnv")]
    api_key_env: Option<String>,
    endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct KnowledgeSection {
    #[serde(rename = "embeddingProvider")]
    embedding_provider: Option<String>,
    #[serde(rename = "corpusDir")]
    corpus_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceSection {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "gemini".to_string(),
            draft_model: "gemini-2.5-flash".to_string(),
            review_model: "gemini-2.5-pro".to_string(),
            embedding_provider: "trigram".to_string(), // Offline-capable default
            api_key_env: "GEMINI_API_KEY".to_string(),
            api_key: None,
            endpoint: None,
            corpus_dir: None,
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// Environment variables:
    /// - `FINSTEP_WORKSPACE`: Override workspace path
    /// - `FINSTEP_CONFIG`: Path to config file
    /// - `FINSTEP_PROVIDER`: LLM provider
    /// - `FINSTEP_DRAFT_MODEL`: Drafting model identifier
    /// - `FINSTEP_REVIEW_MODEL`: Review model identifier
    /// - `FINSTEP_EMBEDDING_PROVIDER`: Embedding provider
    /// - `FINSTEP_CORPUS_DIR`: Corpus directory
    /// - `FINSTEP_API_KEY`: Explicit API key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use finstep_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Workspace: {:?}", config.workspace);
    /// ```
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        // Load from environment variables
        if let Ok(workspace) = std::env::var("FINSTEP_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Ok(config_file) = std::env::var("FINSTEP_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        // Validate workspace exists
        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        // Load from YAML config file if it exists
        let config_path = if let Some(ref cf) = config.config_file {
            cf.clone()
        } else {
            config.workspace.join(".finstep/config.yaml")
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("FINSTEP_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("FINSTEP_DRAFT_MODEL") {
            config.draft_model = model;
        }

        if let Ok(model) = std::env::var("FINSTEP_REVIEW_MODEL") {
            config.review_model = model;
        }

        if let Ok(provider) = std::env::var("FINSTEP_EMBEDDING_PROVIDER") {
            config.embedding_provider = provider;
        }

        if let Ok(dir) = std::env::var("FINSTEP_CORPUS_DIR") {
            config.corpus_dir = Some(PathBuf::from(dir));
        }

        config.api_key = std::env::var("FINSTEP_API_KEY").ok();
        config.log_level = std::env::var("RUST_LOG").ok();

        // Check for NO_COLOR environment variable
        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &PathBuf) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        // Merge workspace settings
        if let Some(ws) = config_file.workspace {
            if let Some(path) = ws.path {
                result.workspace = PathBuf::from(path);
            }
        }

        // Merge logging settings
        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        // Merge LLM settings
        if let Some(llm) = config_file.llm {
            if let Some(provider) = llm.provider {
                result.provider = provider;
            }
            if let Some(model) = llm.draft_model {
                result.draft_model = model;
            }
            if let Some(model) = llm.review_model {
                result.review_model = model;
            }
            if let Some(env) = llm.api_key_env {
                result.api_key_env = env;
            }
            if let Some(endpoint) = llm.endpoint {
                result.endpoint = Some(endpoint);
            }
        }

        // Merge knowledge settings
        if let Some(knowledge) = config_file.knowledge {
            if let Some(provider) = knowledge.embedding_provider {
                result.embedding_provider = provider;
            }
            if let Some(dir) = knowledge.corpus_dir {
                result.corpus_dir = Some(PathBuf::from(dir));
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// This method merges command-line flags with the loaded configuration,
    /// giving precedence to CLI flags over environment variables.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        draft_model: Option<String>,
        review_model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = draft_model {
            self.draft_model = model;
        }

        if let Some(model) = review_model {
            self.review_model = model;
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

    /// Get the path to the .finstep directory.
    pub fn finstep_dir(&self) -> PathBuf {
        self.workspace.join(".finstep")
    }

    /// Ensure the .finstep directory exists.
    pub fn ensure_finstep_dir(&self) -> AppResult<()> {
        let finstep_dir = self.finstep_dir();
        if !finstep_dir.exists() {
            std::fs::create_dir_all(&finstep_dir).map_err(|e| {
                AppError::Config(format!("Failed to create .finstep directory: {}", e))
            })?;
        }
        Ok(())
    }

    /// Get the corpus directory (explicit setting or `<workspace>/corpus`).
    pub fn corpus_dir(&self) -> PathBuf {
        self.corpus_dir
            .clone()
            .unwrap_or_else(|| self.workspace.join("corpus"))
    }

    /// Resolve the API key for the active provider.
    ///
    /// An explicit `FINSTEP_API_KEY` wins; otherwise the variable named by
    /// `api_key_env` (default `GEMINI_API_KEY`) is read.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }
        std::env::var(&self.api_key_env).ok()
    }

    /// Validate configuration for the active providers.
    pub fn validate(&self) -> AppResult<()> {
        let known_providers = ["gemini", "ollama"];
        if !known_providers.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                known_providers.join(", ")
            )));
        }

        let known_embedding_providers = ["trigram", "gemini"];
        if !known_embedding_providers.contains(&self.embedding_provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding_provider,
                known_embedding_providers.join(", ")
            )));
        }

        // The Gemini provider requires an API key; Ollama and the local
        // trigram embedder do not.
        let needs_key = self.provider == "gemini" || self.embedding_provider == "gemini";
        if needs_key && self.resolve_api_key().is_none() {
            return Err(AppError::Config(format!(
                "API key not found in environment variable: {}",
                self.api_key_env
            )));
        }

        Ok(())
    }
}
