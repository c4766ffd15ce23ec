//! Configuration management for askdocs.
//!
//! Configuration is assembled once per process from, in increasing order of
//! precedence:
//! - Built-in defaults
//! - A YAML config file (`--config`, `ASKDOCS_CONFIG`, or `./askdocs.yaml`)
//! - Environment variables (`ASKDOCS_*`)
//! - Command-line flags
//!
//! The resulting [`AppConfig`] is validated and then shared read-only by
//! every pipeline component.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{AppError, AppResult};

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "askdocs.yaml";

/// Providers accepted for chat completion and embeddings.
pub const OPENAI_PROVIDERS: [&str; 2] = ["azure-openai", "mock"];

/// Providers accepted for the search index.
pub const SEARCH_PROVIDERS: [&str; 2] = ["azure", "mock"];

/// Default system instruction template.
///
/// Rendered with Handlebars; `today`, `week_start` and `week_end` are
/// supplied by the prompt builder on every request.
pub const DEFAULT_PROMPT_TEMPLATE: &str = "You are an assistant that answers employee questions \
using the internal documentation. Answer only from the [Context] section when it contains \
results and cite the <Url> of every result you use as a markdown link. If the context tells you \
that nothing was found, say so before answering. Today is {{today}}. The current week starts on \
{{week_start}} and ends on {{week_end}}.";

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    /// Config file the values were read from, if any
    #[serde(skip)]
    pub config_file: Option<PathBuf>,

    /// Chat completion and embedding backend
    pub openai: OpenAiConfig,

    /// Search index backend
    pub search: SearchConfig,

    /// Tunable sampling parameters
    pub completion: CompletionSettings,

    /// System prompt template
    pub prompt: PromptConfig,

    /// Link rewriting
    pub links: LinksConfig,

    /// Agent HTTP endpoint
    pub server: ServerConfig,

    /// Logging defaults
    pub logging: LoggingConfig,

    /// Verbose mode (enables debug logging)
    #[serde(skip)]
    pub verbose: bool,
}

/// Azure OpenAI (or mock) backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OpenAiConfig {
    /// "azure-openai" or "mock"
    pub provider: String,
    /// Resource endpoint, e.g. `https://my-resource.openai.azure.com`
    pub endpoint: String,
    /// API key sent as the `api-key` header
    pub api_key: Option<String>,
    /// Chat completion deployment identifier
    pub deployment_id: String,
    /// Embedding model deployment identifier
    pub embedding_model: String,
    /// REST API version query parameter
    pub api_version: String,
    /// Optional transport timeout in seconds
    pub timeout_secs: Option<u64>,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            provider: "azure-openai".to_string(),
            endpoint: String::new(),
            api_key: None,
            deployment_id: String::new(),
            embedding_model: "text-embedding-ada-002".to_string(),
            api_version: "2024-02-01".to_string(),
            timeout_secs: None,
        }
    }
}

/// What the retriever returns when the search round-trip itself fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalFailurePolicy {
    /// Empty context, no fallback instruction
    #[default]
    Empty,
    /// Same sentinel as "no confident match"
    Sentinel,
}

impl FromStr for RetrievalFailurePolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "empty" => Ok(Self::Empty),
            "sentinel" => Ok(Self::Sentinel),
            other => Err(AppError::Config(format!(
                "Unknown retrieval failure policy: {}. Supported: empty, sentinel",
                other
            ))),
        }
    }
}

/// Azure AI Search (or mock) backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchConfig {
    /// "azure" or "mock"
    pub provider: String,
    /// Service name; the endpoint is `https://{service_name}.search.windows.net`
    pub service_name: String,
    /// Query key sent as the `api-key` header
    pub query_key: Option<String>,
    /// Index name; a `vi-` prefix enables the vector sub-query
    pub index_name: String,
    /// Number of documents requested and kept
    pub top_k: usize,
    /// REST API version query parameter
    pub api_version: String,
    /// Behaviour when the search round-trip fails
    pub failure_policy: RetrievalFailurePolicy,
    /// Optional transport timeout in seconds
    pub timeout_secs: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider: "azure".to_string(),
            service_name: String::new(),
            query_key: None,
            index_name: String::new(),
            top_k: 5,
            api_version: "2023-11-01".to_string(),
            failure_policy: RetrievalFailurePolicy::default(),
            timeout_secs: None,
        }
    }
}

/// Sampling parameters that operators may tune.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompletionSettings {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 800,
        }
    }
}

/// System prompt settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PromptConfig {
    /// Inline Handlebars template
    pub template: String,
    /// YAML prompt definition; takes precedence over `template`
    pub template_file: Option<PathBuf>,
    /// Locale used for the long dates, e.g. "tr_TR"
    pub locale: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            template: DEFAULT_PROMPT_TEMPLATE.to_string(),
            template_file: None,
            locale: "en_US".to_string(),
        }
    }
}

/// Link rewriting settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LinksConfig {
    /// Host prepended to site-relative links (no scheme)
    pub docs_host: String,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            docs_host: "confluence.intertech.com.tr".to_string(),
        }
    }
}

/// Agent endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerConfig {
    pub address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            openai: OpenAiConfig::default(),
            search: SearchConfig::default(),
            completion: CompletionSettings::default(),
            prompt: PromptConfig::default(),
            links: LinksConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            verbose: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the config file and environment variables.
    ///
    /// `config_file` wins over `ASKDOCS_CONFIG`, which wins over
    /// `./askdocs.yaml`. A missing default file is not an error; a missing
    /// explicit file is.
    ///
    /// Environment variables:
    /// - `ASKDOCS_OPENAI_PROVIDER`, `ASKDOCS_OPENAI_ENDPOINT`, `ASKDOCS_OPENAI_KEY`
    /// - `ASKDOCS_OPENAI_DEPLOYMENT`, `ASKDOCS_EMBEDDING_MODEL`
    /// - `ASKDOCS_SEARCH_PROVIDER`, `ASKDOCS_SEARCH_SERVICE`, `ASKDOCS_SEARCH_KEY`
    /// - `ASKDOCS_SEARCH_INDEX`, `ASKDOCS_TOP_K`, `ASKDOCS_RETRIEVAL_FAILURE`
    /// - `ASKDOCS_PROMPT`, `ASKDOCS_PROMPT_FILE`, `ASKDOCS_LOCALE`
    /// - `ASKDOCS_TEMPERATURE`, `ASKDOCS_MAX_TOKENS`
    /// - `ASKDOCS_DOCS_HOST`, `ASKDOCS_SERVER_ADDRESS`
    /// - `RUST_LOG`, `NO_COLOR`
    ///
    /// # Example
    /// ```no_run
    /// use askdocs_core::config::AppConfig;
    ///
    /// let config = AppConfig::load(None).expect("Failed to load config");
    /// println!("Index: {}", config.search.index_name);
    /// ```
    pub fn load(config_file: Option<&Path>) -> AppResult<Self> {
        let explicit = config_file
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("ASKDOCS_CONFIG").ok().map(PathBuf::from));

        let mut config = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Config file does not exist: {:?}",
                        path
                    )));
                }
                Self::from_yaml_file(&path)?
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_yaml_file(&default_path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env(|key| std::env::var(key).ok())?;

        Ok(config)
    }

    /// Parse a YAML config file; absent keys keep their defaults.
    pub fn from_yaml_file(path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let mut config: AppConfig = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        config.config_file = Some(path.to_path_buf());
        tracing::debug!("Loaded configuration from {:?}", path);

        Ok(config)
    }

    /// Overlay environment variables using the given lookup.
    ///
    /// The lookup is injected so tests need not mutate the process
    /// environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("ASKDOCS_OPENAI_PROVIDER") {
            self.openai.provider = v;
        }
        if let Some(v) = lookup("ASKDOCS_OPENAI_ENDPOINT") {
            self.openai.endpoint = v;
        }
        if let Some(v) = lookup("ASKDOCS_OPENAI_KEY") {
            self.openai.api_key = Some(v);
        }
        if let Some(v) = lookup("ASKDOCS_OPENAI_DEPLOYMENT") {
            self.openai.deployment_id = v;
        }
        if let Some(v) = lookup("ASKDOCS_EMBEDDING_MODEL") {
            self.openai.embedding_model = v;
        }

        if let Some(v) = lookup("ASKDOCS_SEARCH_PROVIDER") {
            self.search.provider = v;
        }
        if let Some(v) = lookup("ASKDOCS_SEARCH_SERVICE") {
            self.search.service_name = v;
        }
        if let Some(v) = lookup("ASKDOCS_SEARCH_KEY") {
            self.search.query_key = Some(v);
        }
        if let Some(v) = lookup("ASKDOCS_SEARCH_INDEX") {
            self.search.index_name = v;
        }
        if let Some(v) = lookup("ASKDOCS_TOP_K") {
            self.search.top_k = parse_env("ASKDOCS_TOP_K", &v)?;
        }
        if let Some(v) = lookup("ASKDOCS_RETRIEVAL_FAILURE") {
            self.search.failure_policy = v.parse()?;
        }

        if let Some(v) = lookup("ASKDOCS_PROMPT") {
            self.prompt.template = v;
        }
        if let Some(v) = lookup("ASKDOCS_PROMPT_FILE") {
            self.prompt.template_file = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("ASKDOCS_LOCALE") {
            self.prompt.locale = v;
        }

        if let Some(v) = lookup("ASKDOCS_TEMPERATURE") {
            self.completion.temperature = parse_env("ASKDOCS_TEMPERATURE", &v)?;
        }
        if let Some(v) = lookup("ASKDOCS_MAX_TOKENS") {
            self.completion.max_tokens = parse_env("ASKDOCS_MAX_TOKENS", &v)?;
        }

        if let Some(v) = lookup("ASKDOCS_DOCS_HOST") {
            self.links.docs_host = v;
        }
        if let Some(v) = lookup("ASKDOCS_SERVER_ADDRESS") {
            self.server.address = v;
        }

        if let Some(v) = lookup("RUST_LOG") {
            self.logging.level = Some(v);
        }
        if lookup("NO_COLOR").is_some() {
            self.logging.color = Some(false);
        }

        Ok(())
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables and the
    /// config file.
    pub fn with_overrides(
        mut self,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
        top_k: Option<usize>,
    ) -> Self {
        if let Some(log_level) = log_level {
            self.logging.level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.logging.level.is_none() {
                self.logging.level = Some("debug".to_string());
            }
        }

        if no_color {
            self.logging.color = Some(false);
        }

        if let Some(top_k) = top_k {
            self.search.top_k = top_k;
        }

        self
    }

    /// Whether colored log output is disabled.
    pub fn no_color(&self) -> bool {
        self.logging.color == Some(false)
    }

    /// Validate the configuration before any client is built.
    pub fn validate(&self) -> AppResult<()> {
        if !OPENAI_PROVIDERS.contains(&self.openai.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown OpenAI provider: {}. Supported: {}",
                self.openai.provider,
                OPENAI_PROVIDERS.join(", ")
            )));
        }

        if self.openai.provider == "azure-openai" {
            require("openai.endpoint", &self.openai.endpoint)?;
            require_secret("openai.apiKey (ASKDOCS_OPENAI_KEY)", &self.openai.api_key)?;
            require("openai.deploymentId", &self.openai.deployment_id)?;
            require("openai.embeddingModel", &self.openai.embedding_model)?;
        }

        if !SEARCH_PROVIDERS.contains(&self.search.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown search provider: {}. Supported: {}",
                self.search.provider,
                SEARCH_PROVIDERS.join(", ")
            )));
        }

        if self.search.provider == "azure" {
            require("search.serviceName", &self.search.service_name)?;
            require_secret("search.queryKey (ASKDOCS_SEARCH_KEY)", &self.search.query_key)?;
            require("search.indexName", &self.search.index_name)?;
        }

        if self.search.top_k == 0 {
            return Err(AppError::Config(
                "search.topK must be at least 1".to_string(),
            ));
        }

        let temperature = self.completion.temperature;
        if !temperature.is_finite() || !(0.0..=2.0).contains(&temperature) {
            return Err(AppError::Config(format!(
                "completion.temperature must be between 0.0 and 2.0, got {}",
                temperature
            )));
        }

        if self.completion.max_tokens == 0 {
            return Err(AppError::Config(
                "completion.maxTokens must be at least 1".to_string(),
            ));
        }

        if self.prompt.template_file.is_none() && self.prompt.template.trim().is_empty() {
            return Err(AppError::Config(
                "prompt.template cannot be empty".to_string(),
            ));
        }

        chrono::Locale::try_from(self.prompt.locale.as_str()).map_err(|_| {
            AppError::Config(format!("Unknown locale: {}", self.prompt.locale))
        })?;

        let host = self.links.docs_host.trim();
        if host.is_empty() || host.contains("://") || host.contains('/') {
            return Err(AppError::Config(format!(
                "links.docsHost must be a bare host name, got {:?}",
                self.links.docs_host
            )));
        }

        Ok(())
    }
}

fn parse_env<T>(key: &str, value: &str) -> AppResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid value for {}: {:?} ({})", key, value, e)))
}

fn require(name: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Config(format!("{} is required", name)));
    }
    Ok(())
}

fn require_secret(name: &str, value: &Option<String>) -> AppResult<()> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(()),
        _ => Err(AppError::Config(format!("{} is required", name))),
    }
}
