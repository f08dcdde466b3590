use crate::error::{FinragError, Result};
use crate::models::pipeline::{DEFAULT_CHAT_MODEL, DEFAULT_EMBEDDING_MODEL, DEFAULT_TOP_K};
use crate::models::{PipelineConfig, PromptTemplate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::fs;
use std::path::Path;

pub const DEFAULT_INDEX_NAME: &str = "financial-10k";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_DOCUMENT_LABEL: &str = "Apple Inc. (AAPL) 10-K Filing (2023)";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;
pub const FISCAL_YEARS: [&str; 3] = ["2023", "2022", "2021"];

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConfigSource::Default => "default",
            ConfigSource::File => "file",
            ConfigSource::Environment => "environment",
            ConfigSource::Cli => "cli",
        };
        f.write_str(label)
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for finrag
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub chat_model: ConfigValue<String>,
    pub temperature: ConfigValue<f32>,
    pub top_k: ConfigValue<usize>,
    pub embedding_model: ConfigValue<String>,
    pub index_name: ConfigValue<String>,
    pub index_host: ConfigValue<Option<String>>,
    pub namespace: ConfigValue<Option<String>>,
    pub openai_base_url: ConfigValue<String>,
    pub document_label: ConfigValue<String>,
    pub prompt_template: ConfigValue<PromptTemplate>,
    pub http_timeout_secs: ConfigValue<u64>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            chat_model: ConfigValue::new(DEFAULT_CHAT_MODEL.to_string(), ConfigSource::Default),
            temperature: ConfigValue::new(0.0, ConfigSource::Default),
            top_k: ConfigValue::new(DEFAULT_TOP_K, ConfigSource::Default),
            embedding_model: ConfigValue::new(
                DEFAULT_EMBEDDING_MODEL.to_string(),
                ConfigSource::Default,
            ),
            index_name: ConfigValue::new(DEFAULT_INDEX_NAME.to_string(), ConfigSource::Default),
            index_host: ConfigValue::new(None, ConfigSource::Default),
            namespace: ConfigValue::new(None, ConfigSource::Default),
            openai_base_url: ConfigValue::new(
                DEFAULT_OPENAI_BASE_URL.to_string(),
                ConfigSource::Default,
            ),
            document_label: ConfigValue::new(
                DEFAULT_DOCUMENT_LABEL.to_string(),
                ConfigSource::Default,
            ),
            prompt_template: ConfigValue::new(PromptTemplate::default(), ConfigSource::Default),
            http_timeout_secs: ConfigValue::new(DEFAULT_HTTP_TIMEOUT_SECS, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| FinragError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| FinragError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(chat_model) = file_config.chat_model {
            self.chat_model.update(chat_model, ConfigSource::File);
        }

        if let Some(temperature) = file_config.temperature {
            self.temperature.update(validate_temperature(temperature)?, ConfigSource::File);
        }

        if let Some(top_k) = file_config.top_k {
            self.top_k.update(validate_top_k(top_k)?, ConfigSource::File);
        }

        if let Some(embedding_model) = file_config.embedding_model {
            self.embedding_model.update(embedding_model, ConfigSource::File);
        }

        if let Some(index_name) = file_config.index_name {
            self.index_name.update(index_name, ConfigSource::File);
        }

        if let Some(index_host) = file_config.index_host {
            self.index_host.update(Some(index_host), ConfigSource::File);
        }

        if let Some(namespace) = file_config.namespace {
            self.namespace.update(Some(namespace), ConfigSource::File);
        }

        if let Some(base_url) = file_config.openai_base_url {
            self.openai_base_url.update(base_url, ConfigSource::File);
        }

        if let Some(label) = file_config.document_label {
            self.document_label.update(label, ConfigSource::File);
        }

        if let Some(template) = file_config.prompt_template {
            self.prompt_template.update(PromptTemplate::new(template)?, ConfigSource::File);
        }

        if let Some(timeout) = file_config.http_timeout_secs {
            self.http_timeout_secs.update(validate_timeout(timeout)?, ConfigSource::File);
        }

        tracing::debug!(
            path = %path.as_ref().display(),
            keys = ?self.keys_from(ConfigSource::File),
            "Applied configuration file"
        );

        Ok(self)
    }

    /// Load configuration from the process environment
    pub fn load_from_env(self) -> Result<Self> {
        self.load_from_vars(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup
    pub fn load_from_vars<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(chat_model) = lookup("FINRAG_CHAT_MODEL") {
            self.chat_model.update(chat_model, ConfigSource::Environment);
        }

        if let Some(raw) = lookup("FINRAG_TEMPERATURE") {
            self.temperature.update(parse_temperature(&raw)?, ConfigSource::Environment);
        }

        if let Some(raw) = lookup("FINRAG_TOP_K") {
            self.top_k.update(parse_top_k(&raw)?, ConfigSource::Environment);
        }

        if let Some(embedding_model) = lookup("FINRAG_EMBEDDING_MODEL") {
            self.embedding_model.update(embedding_model, ConfigSource::Environment);
        }

        if let Some(index_name) = lookup("FINRAG_INDEX_NAME") {
            self.index_name.update(index_name, ConfigSource::Environment);
        }

        if let Some(index_host) = lookup("PINECONE_INDEX_HOST") {
            self.index_host.update(Some(index_host), ConfigSource::Environment);
        }

        if let Some(namespace) = lookup("PINECONE_NAMESPACE") {
            self.namespace.update(Some(namespace), ConfigSource::Environment);
        }

        if let Some(base_url) = lookup("OPENAI_BASE_URL") {
            self.openai_base_url.update(base_url, ConfigSource::Environment);
        }

        if let Some(label) = lookup("FINRAG_DOCUMENT_LABEL") {
            self.document_label.update(label, ConfigSource::Environment);
        }

        if let Some(raw) = lookup("FINRAG_HTTP_TIMEOUT_SECS") {
            self.http_timeout_secs.update(parse_timeout(&raw)?, ConfigSource::Environment);
        }

        tracing::debug!(keys = ?self.keys_from(ConfigSource::Environment), "Applied environment overrides");

        Ok(self)
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) -> Result<()> {
        if let Some(chat_model) = overrides.chat_model {
            self.chat_model.update(chat_model, ConfigSource::Cli);
        }

        if let Some(temperature) = overrides.temperature {
            self.temperature.update(validate_temperature(temperature)?, ConfigSource::Cli);
        }

        if let Some(top_k) = overrides.top_k {
            self.top_k.update(validate_top_k(top_k)?, ConfigSource::Cli);
        }

        if let Some(index_name) = overrides.index_name {
            self.index_name.update(index_name, ConfigSource::Cli);
        }

        tracing::debug!(keys = ?self.keys_from(ConfigSource::Cli), "Applied command-line overrides");

        Ok(())
    }

    /// Keys whose current value came from `source`
    pub fn keys_from(&self, source: ConfigSource) -> Vec<String> {
        self.to_inspection_map()
            .into_iter()
            .filter(|(_, (_, s))| *s == source)
            .map(|(key, _)| key)
            .collect()
    }

    /// Freeze the pipeline-relevant values
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            chat_model: self.chat_model.value.clone(),
            temperature: self.temperature.value,
            top_k: self.top_k.value,
            embedding_model: self.embedding_model.value.clone(),
            prompt_template: self.prompt_template.value.clone(),
        }
    }

    /// Read-only values for the presentation layers
    pub fn display_settings(&self) -> DisplaySettings {
        DisplaySettings {
            document_label: self.document_label.value.clone(),
            fiscal_years: FISCAL_YEARS.iter().map(|y| y.to_string()).collect(),
            strict_citation: true,
            chat_model: self.chat_model.value.clone(),
            index_name: self.index_name.value.clone(),
        }
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> BTreeMap<String, (String, ConfigSource)> {
        let mut map = BTreeMap::new();

        map.insert(
            "chat_model".to_string(),
            (self.chat_model.value.clone(), self.chat_model.source),
        );
        map.insert(
            "temperature".to_string(),
            (format!("{:.2}", self.temperature.value), self.temperature.source),
        );
        map.insert("top_k".to_string(), (self.top_k.value.to_string(), self.top_k.source));
        map.insert(
            "embedding_model".to_string(),
            (self.embedding_model.value.clone(), self.embedding_model.source),
        );
        map.insert(
            "index_name".to_string(),
            (self.index_name.value.clone(), self.index_name.source),
        );
        map.insert(
            "index_host".to_string(),
            (
                self.index_host.value.clone().unwrap_or_else(|| "(resolved by name)".to_string()),
                self.index_host.source,
            ),
        );
        map.insert(
            "namespace".to_string(),
            (
                self.namespace.value.clone().unwrap_or_else(|| "(default)".to_string()),
                self.namespace.source,
            ),
        );
        map.insert(
            "openai_base_url".to_string(),
            (self.openai_base_url.value.clone(), self.openai_base_url.source),
        );
        map.insert(
            "document_label".to_string(),
            (self.document_label.value.clone(), self.document_label.source),
        );
        map.insert(
            "http_timeout_secs".to_string(),
            (self.http_timeout_secs.value.to_string(), self.http_timeout_secs.source),
        );
        map.insert(
            "prompt_template".to_string(),
            (
                if self.prompt_template.source == ConfigSource::Default {
                    "built-in".to_string()
                } else {
                    "custom".to_string()
                },
                self.prompt_template.source,
            ),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    chat_model: Option<String>,
    temperature: Option<f32>,
    top_k: Option<usize>,
    embedding_model: Option<String>,
    index_name: Option<String>,
    index_host: Option<String>,
    namespace: Option<String>,
    openai_base_url: Option<String>,
    document_label: Option<String>,
    prompt_template: Option<String>,
    http_timeout_secs: Option<u64>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub chat_model: Option<String>,
    pub temperature: Option<f32>,
    pub top_k: Option<usize>,
    pub index_name: Option<String>,
}

/// Static information shown next to the conversation
///
/// The fiscal year and citation settings are cosmetic; they do not reach the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplaySettings {
    pub document_label: String,
    pub fiscal_years: Vec<String>,
    pub strict_citation: bool,
    pub chat_model: String,
    pub index_name: String,
}

/// API credentials for the hosted collaborators
#[derive(Clone)]
pub struct Credentials {
    pub openai_api_key: String,
    pub pinecone_api_key: String,
}

impl Credentials {
    /// Read credentials from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            openai_api_key: required(&lookup, "OPENAI_API_KEY")?,
            pinecone_api_key: required(&lookup, "PINECONE_API_KEY")?,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("openai_api_key", &"<redacted>")
            .field("pinecone_api_key", &"<redacted>")
            .finish()
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(FinragError::ConfigMissing { key: key.to_string() }),
    }
}

/// Parse sampling temperature from string
pub fn parse_temperature(s: &str) -> Result<f32> {
    let value = s.trim().parse::<f32>().map_err(|_| FinragError::ConfigInvalid {
        key: "temperature".to_string(),
        reason: format!("Invalid temperature: {}. Expected a number between 0.0 and 2.0", s),
    })?;
    validate_temperature(value)
}

/// Parse retrieval depth from string
pub fn parse_top_k(s: &str) -> Result<usize> {
    let value = s.trim().parse::<usize>().map_err(|_| FinragError::ConfigInvalid {
        key: "top_k".to_string(),
        reason: format!("Invalid top_k: {}. Expected a positive integer", s),
    })?;
    validate_top_k(value)
}

/// Parse HTTP request timeout (seconds) from string
pub fn parse_timeout(s: &str) -> Result<u64> {
    let value = s.trim().parse::<u64>().map_err(|_| FinragError::ConfigInvalid {
        key: "http_timeout_secs".to_string(),
        reason: format!("Invalid timeout: {}. Expected a whole number of seconds", s),
    })?;
    validate_timeout(value)
}

fn validate_timeout(value: u64) -> Result<u64> {
    if value >= 1 {
        Ok(value)
    } else {
        Err(FinragError::ConfigInvalid {
            key: "http_timeout_secs".to_string(),
            reason: "timeout must be at least 1 second".to_string(),
        })
    }
}

fn validate_temperature(value: f32) -> Result<f32> {
    if (0.0..=2.0).contains(&value) {
        Ok(value)
    } else {
        Err(FinragError::ConfigInvalid {
            key: "temperature".to_string(),
            reason: format!("Temperature {} is outside 0.0..=2.0", value),
        })
    }
}

fn validate_top_k(value: usize) -> Result<usize> {
    if value >= 1 {
        Ok(value)
    } else {
        Err(FinragError::ConfigInvalid {
            key: "top_k".to_string(),
            reason: "top_k must be at least 1".to_string(),
        })
    }
}
