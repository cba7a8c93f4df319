//! Configuration management for docsearch.
//!
//! Configuration is layered from lowest to highest precedence:
//! - Built-in defaults
//! - YAML config file (`docsearch.yaml`, or the path in `DOCSEARCH_CONFIG`)
//! - Environment variables
//! - Command-line flags (see [`AppConfig::with_overrides`])
//!
//! Secrets are never stored in the file itself; the file names the
//! environment variables that hold them.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "docsearch.yaml";

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Config file that was merged, if any
    #[serde(skip)]
    pub config_file: Option<PathBuf>,

    /// OpenAI-compatible endpoints and model identifiers
    pub openai: OpenAiConfig,

    /// Passage store (PostgREST remote procedure)
    pub store: StoreConfig,

    /// Similarity search parameters
    pub retrieval: RetrievalConfig,

    /// Context assembly parameters
    pub context: ContextConfig,

    /// Completion sampling parameters
    pub completion: CompletionConfig,

    /// Outbound HTTP settings
    pub http: HttpConfig,

    /// HTTP server settings
    pub server: ServerConfig,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Emit logs as JSON lines
    pub log_json: bool,
}

/// OpenAI-compatible service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OpenAiConfig {
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub base_url: String,
    pub moderation_model: String,
    pub embedding_model: String,
    pub completion_model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key_env: "OPENAI_KEY".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            moderation_model: "text-moderation-latest".to_string(),
            embedding_model: "text-embedding-ada-002".to_string(),
            completion_model: "gpt-3.5-turbo-16k".to_string(),
        }
    }
}

/// Passage store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreConfig {
    /// Environment variable holding the project URL
    pub url_env: String,
    /// Environment variable holding the service role key
    pub service_key_env: String,
    /// Remote procedure performing the similarity match
    pub match_function: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url_env: "SUPABASE_URL".to_string(),
            service_key_env: "SUPABASE_SERVICE_ROLE_KEY".to_string(),
            match_function: "match_page_sections".to_string(),
        }
    }
}

/// Similarity search parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetrievalConfig {
    pub match_threshold: f32,
    pub match_count: u32,
    pub min_content_length: u32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            match_threshold: 0.78,
            match_count: 10,
            min_content_length: 50,
        }
    }
}

/// BPE vocabulary used to size the context block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TokenizerEncoding {
    /// GPT-3 vocabulary
    #[default]
    R50kBase,
    P50kBase,
    Cl100kBase,
}

/// Context assembly parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContextConfig {
    pub token_budget: usize,
    pub encoding: TokenizerEncoding,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            token_budget: 1500,
            encoding: TokenizerEncoding::default(),
        }
    }
}

/// Completion sampling parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompletionConfig {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            temperature: 0.05,
            max_tokens: 4096,
        }
    }
}

/// Outbound HTTP settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HttpConfig {
    /// Per-call deadline for collaborator calls; 0 disables it
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 60 }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Option<std::time::Duration> {
        (self.timeout_secs > 0).then(|| std::time::Duration::from_secs(self.timeout_secs))
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    openai: Option<OpenAiConfig>,
    store: Option<StoreConfig>,
    retrieval: Option<RetrievalConfig>,
    context: Option<ContextConfig>,
    completion: Option<CompletionConfig>,
    http: Option<HttpConfig>,
    server: Option<ServerConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
    json: Option<bool>,
}

/// Secrets resolved from the environment.
#[derive(Clone)]
pub struct Secrets {
    pub openai_api_key: String,
    pub store_url: String,
    pub store_service_key: String,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("openai_api_key", &"<redacted>")
            .field("store_url", &self.store_url)
            .field("store_service_key", &"<redacted>")
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            openai: OpenAiConfig::default(),
            store: StoreConfig::default(),
            retrieval: RetrievalConfig::default(),
            context: ContextConfig::default(),
            completion: CompletionConfig::default(),
            http: HttpConfig::default(),
            server: ServerConfig::default(),
            log_level: None,
            verbose: false,
            no_color: false,
            log_json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration using `DOCSEARCH_CONFIG` to locate the file.
    ///
    /// Environment variables:
    /// - `DOCSEARCH_CONFIG`: Path to config file
    /// - `DOCSEARCH_BIND`: Server bind address
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use docsearch_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Bind: {}", config.server.bind);
    /// ```
    pub fn load() -> AppResult<Self> {
        let config_file = std::env::var("DOCSEARCH_CONFIG").ok().map(PathBuf::from);
        Self::load_from(config_file)
    }

    /// Load configuration from an explicit file (or the default file if present).
    ///
    /// An explicitly named file must exist; the default file is optional.
    pub fn load_from(config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        match config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Config file does not exist: {:?}",
                        path
                    )));
                }
                config = config.merge_yaml(&path)?;
            }
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    config = config.merge_yaml(&path)?;
                }
            }
        }

        // Environment variables override YAML config
        if let Ok(bind) = std::env::var("DOCSEARCH_BIND") {
            config.server.bind = bind;
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

        let mut result = self.clone().merge_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;
        result.config_file = Some(path.to_path_buf());

        tracing::debug!("Merged config file {:?}", path);

        Ok(result)
    }

    /// Merge YAML text into this config. Sections present in the text replace
    /// the current ones; fields missing inside a section take their defaults.
    pub fn merge_str(mut self, yaml: &str) -> AppResult<Self> {
        let file: ConfigFile = if yaml.trim().is_empty() {
            ConfigFile::default()
        } else {
            serde_yaml::from_str(yaml)?
        };

        if let Some(openai) = file.openai {
            self.openai = openai;
        }
        if let Some(store) = file.store {
            self.store = store;
        }
        if let Some(retrieval) = file.retrieval {
            self.retrieval = retrieval;
        }
        if let Some(context) = file.context {
            self.context = context;
        }
        if let Some(completion) = file.completion {
            self.completion = completion;
        }
        if let Some(http) = file.http {
            self.http = http;
        }
        if let Some(server) = file.server {
            self.server = server;
        }
        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                self.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                self.no_color = !color;
            }
            if let Some(json) = logging.json {
                self.log_json = json;
            }
        }

        Ok(self)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the file.
    pub fn with_overrides(
        mut self,
        bind: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
        log_json: bool,
    ) -> Self {
        if let Some(bind) = bind {
            self.server.bind = bind;
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

        if log_json {
            self.log_json = true;
        }

        self
    }

    /// Validate numeric ranges and identifiers.
    pub fn validate(&self) -> AppResult<()> {
        let threshold = self.retrieval.match_threshold;
        if !(-1.0..=1.0).contains(&threshold) {
            return Err(AppError::Config(format!(
                "matchThreshold must be within [-1, 1], got {}",
                threshold
            )));
        }

        if self.retrieval.match_count == 0 {
            return Err(AppError::Config(
                "matchCount must be greater than zero".to_string(),
            ));
        }

        if self.context.token_budget == 0 {
            return Err(AppError::Config(
                "tokenBudget must be greater than zero".to_string(),
            ));
        }

        let temperature = self.completion.temperature;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(AppError::Config(format!(
                "temperature must be within [0, 2], got {}",
                temperature
            )));
        }

        if self.completion.max_tokens == 0 {
            return Err(AppError::Config(
                "maxTokens must be greater than zero".to_string(),
            ));
        }

        for (name, value) in [
            ("moderationModel", &self.openai.moderation_model),
            ("embeddingModel", &self.openai.embedding_model),
            ("completionModel", &self.openai.completion_model),
            ("matchFunction", &self.store.match_function),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::Config(format!("{} cannot be empty", name)));
            }
        }

        Ok(())
    }

    /// Resolve API keys and endpoints from the environment.
    pub fn resolve_secrets(&self) -> AppResult<Secrets> {
        Ok(Secrets {
            openai_api_key: require_env(&self.openai.api_key_env)?,
            store_url: require_env(&self.store.url_env)?,
            store_service_key: require_env(&self.store.service_key_env)?,
        })
    }

    /// Render the effective configuration as YAML (secrets are never part of it).
    pub fn to_yaml(&self) -> AppResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

fn require_env(name: &str) -> AppResult<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::Config(format!(
            "Missing environment variable {}",
            name
        ))),
    }
}
