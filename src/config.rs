//! Agent endpoint configuration.
//!
//! Values come from three places, in increasing precedence: built-in defaults that
//! match the production deployment, an optional YAML file, and environment
//! variables. Builder-style `with_*` methods cover tests and embedding.

use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const DEFAULT_DATABASE: &str = "APEX_CAPITAL_DEMO";
pub const DEFAULT_SCHEMA: &str = "ANALYTICS";
pub const DEFAULT_AGENT: &str = "APEX_BROKER_AGENT";
pub const DEFAULT_TOKEN_PATH: &str = "/snowflake/session/token";
pub const DEFAULT_STREAM_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

/// Resolved configuration for one agent endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    /// Account host, e.g. `xy12345.snowflakecomputing.com`. `None` means the agent is unavailable.
    pub host: Option<String>,
    pub database: String,
    pub schema: String,
    pub agent: String,
    pub token_path: PathBuf,
    pub stream_timeout: Duration,
    pub request_timeout: Duration,
    /// Replaces `https://<host>` when set (mock servers, local proxies).
    pub base_url_override: Option<String>,
    pub proxy_url: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            host: None,
            database: DEFAULT_DATABASE.to_string(),
            schema: DEFAULT_SCHEMA.to_string(),
            agent: DEFAULT_AGENT.to_string(),
            token_path: PathBuf::from(DEFAULT_TOKEN_PATH),
            stream_timeout: DEFAULT_STREAM_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            base_url_override: None,
            proxy_url: None,
        }
    }
}

/// On-disk shape; every field is optional and falls back to the defaults.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    database: Option<String>,
    #[serde(default)]
    schema: Option<String>,
    #[serde(default)]
    agent: Option<String>,
    #[serde(default)]
    token_path: Option<PathBuf>,
    #[serde(default)]
    stream_timeout_secs: Option<u64>,
    #[serde(default)]
    request_timeout_secs: Option<u64>,
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    proxy_url: Option<String>,
}

fn env_nonempty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn env_secs(key: &str) -> Option<Duration> {
    env_nonempty(key)
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
}

impl AgentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overlaid with environment variables.
    pub fn from_env() -> Self {
        Self::default().overlay_env()
    }

    /// Parse a YAML document. Unknown keys are rejected so typos don't go unnoticed.
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let file: ConfigFile = serde_yaml::from_str(raw).map_err(|e| {
            Error::configuration_with_context(
                "invalid agent config",
                ErrorContext::new()
                    .with_details(e.to_string())
                    .with_source("config"),
            )
        })?;

        let defaults = Self::default();
        Ok(Self {
            host: file.host.filter(|h| !h.trim().is_empty()),
            database: file.database.unwrap_or(defaults.database),
            schema: file.schema.unwrap_or(defaults.schema),
            agent: file.agent.unwrap_or(defaults.agent),
            token_path: file.token_path.unwrap_or(defaults.token_path),
            stream_timeout: file
                .stream_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.stream_timeout),
            request_timeout: file
                .request_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            base_url_override: file.base_url,
            proxy_url: file.proxy_url,
        })
    }

    /// Load a YAML file, then let environment variables override it.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        Ok(Self::from_yaml_str(&raw)?.overlay_env())
    }

    fn overlay_env(mut self) -> Self {
        if let Some(host) = env_nonempty("SNOWFLAKE_HOST") {
            self.host = Some(host);
        }
        if let Some(db) = env_nonempty("LOADSTAR_AGENT_DATABASE") {
            self.database = db;
        }
        if let Some(schema) = env_nonempty("LOADSTAR_AGENT_SCHEMA") {
            self.schema = schema;
        }
        if let Some(agent) = env_nonempty("LOADSTAR_AGENT_NAME") {
            self.agent = agent;
        }
        if let Some(path) = env_nonempty("LOADSTAR_TOKEN_PATH") {
            self.token_path = PathBuf::from(path);
        }
        if let Some(t) = env_secs("LOADSTAR_STREAM_TIMEOUT_SECS") {
            self.stream_timeout = t;
        }
        if let Some(t) = env_secs("LOADSTAR_REQUEST_TIMEOUT_SECS") {
            self.request_timeout = t;
        }
        if let Some(base) = env_nonempty("LOADSTAR_AGENT_BASE_URL") {
            self.base_url_override = Some(base);
        }
        if let Some(proxy) = env_nonempty("AI_PROXY_URL") {
            self.proxy_url = Some(proxy);
        }
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_agent(
        mut self,
        database: impl Into<String>,
        schema: impl Into<String>,
        agent: impl Into<String>,
    ) -> Self {
        self.database = database.into();
        self.schema = schema.into();
        self.agent = agent.into();
        self
    }

    pub fn with_token_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_path = path.into();
        self
    }

    pub fn with_timeouts(mut self, stream: Duration, request: Duration) -> Self {
        self.stream_timeout = stream;
        self.request_timeout = request;
        self
    }

    /// Override base URL (primarily for testing with mock servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url_override = Some(base_url.into());
        self
    }

    /// The agent `:run` endpoint.
    ///
    /// Fails with a configuration error when neither a host nor a base-URL override is set.
    pub fn endpoint_url(&self) -> Result<Url> {
        let base = match (&self.base_url_override, &self.host) {
            (Some(base), _) => base.trim_end_matches('/').to_string(),
            (None, Some(host)) => format!("https://{}", host.trim().trim_end_matches('/')),
            (None, None) => {
                return Err(Error::configuration_with_context(
                    "SNOWFLAKE_HOST not set",
                    ErrorContext::new()
                        .with_field_path("config.host")
                        .with_source("config"),
                ))
            }
        };

        let raw = format!(
            "{}/api/v2/databases/{}/schemas/{}/agents/{}:run",
            base, self.database, self.schema, self.agent
        );
        Url::parse(&raw).map_err(|e| {
            Error::configuration_with_context(
                "invalid agent endpoint",
                ErrorContext::new()
                    .with_field_path("config.host")
                    .with_details(format!("{}: {}", raw, e)),
            )
        })
    }
}
